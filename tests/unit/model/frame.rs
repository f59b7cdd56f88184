use super::*;

fn solid_frame(w: u32, h: u32, px: [u8; 4]) -> Frame {
    Frame::from_rgba8(w, h, px.repeat((w * h) as usize)).unwrap()
}

#[test]
fn frame_rejects_bad_buffers() {
    assert!(Frame::from_rgba8(0, 4, Vec::new()).is_err());
    assert!(Frame::from_rgba8(2, 2, vec![0; 15]).is_err());
}

#[test]
fn frame_png_round_trips_through_decoder() {
    let frame = solid_frame(3, 2, [10, 20, 30, 255]);
    let png = frame.to_png_bytes().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(Frame::from_encoded(&png).unwrap(), frame);
}

#[test]
fn data_url_prefix_is_truncated_base64_png() {
    let frame = solid_frame(2, 2, [0, 0, 0, 255]);
    let prefix = frame.data_url_prefix(50).unwrap();
    assert_eq!(prefix.len(), 50);
    // The PNG signature always encodes to "iVBORw0KGgo".
    assert!(prefix.starts_with("data:image/png;base64,iVBORw0KGgo"));
    assert_eq!(frame.data_url_prefix(4).unwrap(), "data");
}

#[test]
fn data_url_prefix_matches_full_encoding() {
    use base64::Engine as _;

    let frame = solid_frame(5, 3, [200, 10, 60, 255]);
    let full = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(frame.to_png_bytes().unwrap())
    );
    for n in [22, 23, 25, 50, 61] {
        assert_eq!(frame.data_url_prefix(n).unwrap(), &full[..n]);
    }
}

#[test]
fn cutout_crop_copies_the_requested_window() {
    let mut px = Vec::new();
    for y in 0..3u8 {
        for x in 0..4u8 {
            px.extend_from_slice(&[x, y, 0, 255]);
        }
    }
    let cutout = Cutout::from_image(PreparedImage::from_straight_rgba8(4, 3, px).unwrap()).unwrap();
    let crop = cutout
        .crop(CropRect {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        })
        .unwrap();
    assert_eq!((crop.width(), crop.height()), (2, 2));
    assert_eq!(crop.image().pixel(0, 0), Some([1, 1, 0, 255]));
    assert_eq!(crop.image().pixel(1, 1), Some([2, 2, 0, 255]));
}

#[test]
fn cutout_crop_bounds_are_checked() {
    let cutout =
        Cutout::from_image(PreparedImage::from_straight_rgba8(2, 2, vec![0; 16]).unwrap()).unwrap();
    for rect in [
        CropRect { x: 0, y: 0, width: 0, height: 1 },
        CropRect { x: 1, y: 0, width: 2, height: 1 },
        CropRect { x: 0, y: 2, width: 1, height: 1 },
        CropRect { x: u32::MAX, y: 0, width: 2, height: 1 },
    ] {
        assert!(matches!(cutout.crop(rect), Err(FanframeError::Validation(_))));
    }
}

#[test]
fn cutout_rejects_undecodable_png() {
    assert!(Cutout::from_png(b"nope").is_err());
}
