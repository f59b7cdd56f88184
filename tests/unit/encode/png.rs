use super::*;

fn raster(data: Vec<u8>, w: u32, h: u32, premultiplied: bool) -> RasterImage {
    RasterImage {
        width: w,
        height: h,
        data,
        premultiplied,
    }
}

#[test]
fn png_is_unpremultiplied() {
    let r = raster(vec![64, 0, 0, 128, 0, 0, 0, 0], 2, 1, true);
    let enc = encode_png(&r, EXPORT_FILENAME).unwrap();
    assert_eq!((enc.width, enc.height), (2, 1));
    assert_eq!(enc.filename, "composition.png");

    let back = image::load_from_memory(&enc.bytes).unwrap().to_rgba8();
    assert_eq!(back.get_pixel(0, 0).0, [128, 0, 0, 128]);
    assert_eq!(back.get_pixel(1, 0).0, [0, 0, 0, 0]);
}

#[test]
fn rejects_bad_inputs() {
    assert!(encode_png(&raster(vec![0; 3], 1, 1, false), "a.png").is_err());
    assert!(encode_png(&raster(vec![0; 4], 1, 1, false), "").is_err());
    assert!(encode_png(&raster(vec![0; 4], 1, 1, false), "../a.png").is_err());
}

#[test]
fn writes_into_directory() {
    let dir = std::env::temp_dir().join(format!("fanframe-png-{}", std::process::id()));
    let enc = encode_png(&raster(vec![1, 2, 3, 255], 1, 1, false), "out.png").unwrap();
    let path = enc.write_to_dir(&dir).unwrap();
    assert_eq!(path, dir.join("out.png"));
    assert_eq!(std::fs::read(&path).unwrap(), enc.bytes);
    std::fs::remove_dir_all(&dir).ok();
}
