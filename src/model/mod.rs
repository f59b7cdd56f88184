//! Session value types: captured frames, cutouts and the caption overlay.

/// Captured frames and background-removed cutouts.
pub mod frame;
/// Caption text, placement and pure update helpers.
pub mod overlay;
