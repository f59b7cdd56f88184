//! Fanframe captures a moment from a video, cuts out the subject, and composites it over a
//! background template with a caption.
//!
//! The core is a deterministic CPU compositor:
//!
//! - Capture a [`Frame`] from a [`FrameSource`]
//! - Obtain a [`Cutout`] from a [`Segmenter`] and caption ideas from a [`CaptionService`]
//! - Pick a template and edit the [`TextOverlay`]
//! - Render with a [`CpuCompositor`]; preview and export share one render path
//!
//! [`StudioSession`] sequences these steps and rejects collaborator results that arrive for a
//! frame that has since been replaced.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Frame sources and still capture.
pub mod capture;
/// Export encoding.
pub mod encode;
/// Frames, cutouts and the caption overlay.
pub mod model;
/// Composition compiler and CPU compositor.
pub mod render;
/// External collaborators.
pub mod services;
/// Generation-checked session state.
pub mod session;

pub use crate::assets::decode::{PreparedImage, decode_image, load_image_file};
pub use crate::assets::font::{FontSource, PreparedFont, TextBrushRgba8, TextLayoutEngine};
pub use crate::assets::templates::{TemplateEntry, TemplateId, TemplateLibrary};
pub use crate::foundation::config::{
    CaptionConfig, ENV_CAPTION_ENDPOINT, ENV_LOG, ENV_SEGMENT_CMD, LoggingConfig,
    SegmentationConfig, StudioConfig, TemplateSetConfig,
};
pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{FanframeError, FanframeResult};
pub use crate::foundation::logging::init_logging;

pub use crate::capture::media::{VideoInfo, VideoSource};
pub use crate::capture::source::{
    FrameSource, PlaybackCursor, SKIP_LARGE_SECS, SKIP_SMALL_SECS, StillSource, capture,
};
pub use crate::encode::png::{EXPORT_FILENAME, EncodedImage, encode_png};
pub use crate::model::frame::{CropRect, Cutout, Frame};
pub use crate::model::overlay::{Alignment, OverlayEdit, StackOrder, TextOverlay};
pub use crate::render::backend::RasterImage;
pub use crate::render::cpu::CpuCompositor;
pub use crate::render::plan::{Composition, RenderPlan, compile_composition};
pub use crate::services::caption::{
    CaptionResponse, CaptionService, CaptionSource, CaptionSuggestions, CurlCaptionService,
    build_caption_prompt, suggest_captions,
};
pub use crate::services::segmentation::{CommandSegmenter, SegmentationOptions, Segmenter};
pub use crate::session::studio::{ApplyOutcome, ProcessReport, ProcessTicket, StudioSession};
