//! Generation-checked session state.

/// The studio session state machine.
pub mod studio;
