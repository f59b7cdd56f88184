//! Export encoding.

/// PNG export of flattened compositions.
pub mod png;
