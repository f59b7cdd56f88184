use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::FanframeResult,
    model::frame::Frame,
};

/// Step for the small skip buttons, in seconds.
pub const SKIP_SMALL_SECS: f64 = 1.0;
/// Step for the large skip buttons, in seconds.
pub const SKIP_LARGE_SECS: f64 = 10.0;

/// Anything that can hand out a still at its current playback position.
pub trait FrameSource {
    /// Native pixel size of the source.
    fn native_size(&self) -> (u32, u32);

    /// Current playback position in seconds.
    fn position_secs(&self) -> f64;

    /// Straight RGBA8 pixels at the current position, sized to [`FrameSource::native_size`].
    fn read_rgba8(&self) -> FanframeResult<Vec<u8>>;
}

/// Capture one still from `source` at its native resolution.
#[tracing::instrument(skip_all, fields(position_secs = source.position_secs()))]
pub fn capture(source: &dyn FrameSource) -> FanframeResult<Frame> {
    let (width, height) = source.native_size();
    let rgba = source.read_rgba8()?;
    let frame = Frame::from_rgba8(width, height, rgba)?;
    tracing::debug!(width, height, "frame captured");
    Ok(frame)
}

/// A decoded still image treated as a zero-length video.
#[derive(Clone, Debug)]
pub struct StillSource {
    frame: Frame,
}

impl StillSource {
    /// Wrap an existing frame.
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    /// Decode an encoded image.
    pub fn from_bytes(bytes: &[u8]) -> FanframeResult<Self> {
        Ok(Self::new(Frame::from_encoded(bytes)?))
    }

    /// Read and decode an image file.
    pub fn from_path(path: &Path) -> FanframeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read frame image '{}'", path.display()))?;
        Self::from_bytes(&bytes)
    }
}

impl FrameSource for StillSource {
    fn native_size(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn position_secs(&self) -> f64 {
        0.0
    }

    fn read_rgba8(&self) -> FanframeResult<Vec<u8>> {
        Ok(self.frame.rgba8().to_vec())
    }
}

/// Playback position within `[0, duration]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackCursor {
    position: f64,
    duration: f64,
}

impl PlaybackCursor {
    /// Cursor at 0 over a source `duration_secs` long (invalid durations become 0).
    pub fn new(duration_secs: f64) -> Self {
        let duration = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            position: 0.0,
            duration,
        }
    }

    /// Current position in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Jump to `secs`, clamped to the source; NaN is ignored.
    pub fn seek(&mut self, secs: f64) -> f64 {
        if !secs.is_nan() {
            self.position = secs.clamp(0.0, self.duration);
        }
        self.position
    }

    /// Move by `delta_secs` relative to the current position, clamped.
    pub fn skip(&mut self, delta_secs: f64) -> f64 {
        self.seek(self.position + delta_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/source.rs"]
mod tests;
