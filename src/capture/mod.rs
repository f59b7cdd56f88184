//! Frame sources and still capture.

/// `ffprobe`/`ffmpeg` backed video source.
pub mod media;
/// [`source::FrameSource`] trait, still images and the playback cursor.
pub mod source;
