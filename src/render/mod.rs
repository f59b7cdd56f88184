//! Compositing: composition → [`plan::RenderPlan`] → pixels.

/// Raster output type.
pub mod backend;
/// `vello_cpu` compositor.
pub mod cpu;
/// Backend-agnostic plan compiler (layer order, stretch, text anchoring).
pub mod plan;
