use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, vec![100u8, 50u8, 200u8, 128u8]);

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, FanframeError::Decode(_)));
}

#[test]
fn ensure_loaded_checks_buffer_length() {
    let img = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![0; 4]),
    };
    assert!(img.ensure_loaded().is_err());

    let empty = PreparedImage {
        width: 0,
        height: 0,
        rgba8_premul: Arc::new(Vec::new()),
    };
    assert!(empty.ensure_loaded().is_err());
}

#[test]
fn pixel_reads_row_major() {
    let img = PreparedImage::from_straight_rgba8(
        2,
        1,
        vec![255, 0, 0, 255, 0, 255, 0, 255],
    )
    .unwrap();
    assert_eq!(img.pixel(1, 0), Some([0, 255, 0, 255]));
    assert_eq!(img.pixel(2, 0), None);
}

#[test]
fn svg_is_sniffed_and_stretched_to_requested_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;
    assert!(looks_like_svg(svg));
    assert!(!looks_like_svg(&png_bytes(1, 1, vec![0, 0, 0, 255])));

    let img = decode_any(svg, Canvas::new(40, 20).unwrap()).unwrap();
    assert_eq!((img.width, img.height), (40, 20));
    assert_eq!(img.pixel(20, 10), Some([0, 255, 0, 255]));
}

#[test]
fn parse_svg_err_on_truncated_input() {
    assert!(parse_svg(br#"<svg"#).is_err());
}
