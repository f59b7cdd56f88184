use std::path::{Path, PathBuf};

use crate::{
    capture::source::{FrameSource, PlaybackCursor},
    foundation::error::{FanframeError, FanframeResult},
};

/// Stream properties reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Source file.
    pub path: PathBuf,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Container duration in seconds (0 when unknown).
    pub duration_secs: f64,
}

/// A video file with a playback cursor; capture grabs the frame under the cursor.
#[derive(Clone, Debug)]
pub struct VideoSource {
    info: VideoInfo,
    cursor: PlaybackCursor,
}

impl VideoSource {
    /// Probe `path` and place the cursor at 0.
    pub fn open(path: &Path) -> FanframeResult<Self> {
        let info = probe_video(path)?;
        tracing::debug!(
            width = info.width,
            height = info.height,
            duration_secs = info.duration_secs,
            "video probed"
        );
        Ok(Self::from_info(info))
    }

    /// Use already known stream properties.
    pub fn from_info(info: VideoInfo) -> Self {
        let cursor = PlaybackCursor::new(info.duration_secs);
        Self { info, cursor }
    }

    /// Stream properties.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Playback cursor.
    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    /// Mutable playback cursor (seek / skip).
    pub fn cursor_mut(&mut self) -> &mut PlaybackCursor {
        &mut self.cursor
    }
}

impl FrameSource for VideoSource {
    fn native_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn position_secs(&self) -> f64 {
        self.cursor.position()
    }

    fn read_rgba8(&self) -> FanframeResult<Vec<u8>> {
        decode_frame_rgba8(&self.info, self.cursor.position())
    }
}

#[cfg(feature = "media-ffmpeg")]
fn probe_video(path: &Path) -> FanframeResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| FanframeError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(FanframeError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| FanframeError::decode(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FanframeError::decode("no video stream found"))?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(FanframeError::decode("ffprobe did not report video size"));
    };
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
        duration_secs,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
fn probe_video(_path: &Path) -> FanframeResult<VideoInfo> {
    Err(FanframeError::decode(
        "video capture requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_frame_rgba8(info: &VideoInfo, at_secs: f64) -> FanframeResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{at_secs:.6}")])
        .arg("-i")
        .arg(&info.path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| FanframeError::decode(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(FanframeError::decode(format!(
            "ffmpeg frame grab failed for '{}': {}",
            info.path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected = (info.width as usize)
        .saturating_mul(info.height as usize)
        .saturating_mul(4);
    if expected == 0 || out.stdout.len() < expected {
        return Err(FanframeError::decode(format!(
            "ffmpeg returned {} bytes, expected {expected}",
            out.stdout.len()
        )));
    }
    let mut rgba = out.stdout;
    rgba.truncate(expected);
    Ok(rgba)
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_frame_rgba8(_info: &VideoInfo, _at_secs: f64) -> FanframeResult<Vec<u8>> {
    Err(FanframeError::decode(
        "video capture requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/capture/media.rs"]
mod tests;
