use super::*;

fn info() -> VideoInfo {
    VideoInfo {
        path: PathBuf::from("clip.mp4"),
        width: 640,
        height: 360,
        duration_secs: 12.0,
    }
}

#[test]
fn cursor_is_bounded_by_probed_duration() {
    let mut v = VideoSource::from_info(info());
    assert_eq!(v.native_size(), (640, 360));
    v.cursor_mut().skip(10.0);
    v.cursor_mut().skip(10.0);
    assert_eq!(v.position_secs(), 12.0);
    assert_eq!(v.cursor().duration(), 12.0);
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn without_ffmpeg_feature_capture_fails_cleanly() {
    let v = VideoSource::from_info(info());
    let err = crate::capture::source::capture(&v).unwrap_err();
    assert!(err.to_string().contains("media-ffmpeg"));
    assert!(VideoSource::open(Path::new("clip.mp4")).is_err());
}
