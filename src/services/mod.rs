//! External collaborators: background removal and caption suggestions.
//!
//! Both are traits so callers can plug in any backend; the bundled adapters shell out to
//! external programs.

/// Caption suggestion requests and permissive reply parsing.
pub mod caption;
pub(crate) mod process;
/// Background removal.
pub mod segmentation;
