use super::*;

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(800, 600).unwrap(), Canvas::EXPORT);
    assert_eq!(Canvas::default().as_u16().unwrap(), (800, 600));
}

#[test]
fn canvas_center_is_half_extent() {
    let c = Canvas::new(640, 360).unwrap();
    assert_eq!(c.center(), Point::new(320.0, 180.0));
    assert_eq!(c.rgba8_len(), 640 * 360 * 4);
}

#[test]
fn parses_hex_rgb_and_rgba() {
    assert_eq!(
        Rgba8::parse_hex("#de35b1").unwrap(),
        Rgba8::rgb(0xde, 0x35, 0xb1)
    );
    let c: Rgba8 = "0000FF80".parse().unwrap();
    assert_eq!(
        c,
        Rgba8 {
            r: 0,
            g: 0,
            b: 255,
            a: 128
        }
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#zzzzzz").is_err());
}

#[test]
fn hex_color_serde_roundtrips_through_string() {
    let c: Rgba8 = serde_json::from_value(serde_json::json!("#FF0000")).unwrap();
    assert_eq!(c, Rgba8::rgb(255, 0, 0));
    assert_eq!(serde_json::to_value(c).unwrap(), serde_json::json!("#ff0000"));
    assert!(serde_json::from_value::<Rgba8>(serde_json::json!("red")).is_err());
}

#[test]
fn premultiply_rounds_half_up() {
    let p = Rgba8 {
        r: 100,
        g: 50,
        b: 200,
        a: 128,
    }
    .premultiplied();
    assert_eq!(p.r, ((100u16 * 128 + 127) / 255) as u8);
    assert_eq!(p.g, ((50u16 * 128 + 127) / 255) as u8);
    assert_eq!(p.b, ((200u16 * 128 + 127) / 255) as u8);
    assert_eq!(p.a, 128);
}
