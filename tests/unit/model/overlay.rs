use super::*;

#[test]
fn defaults_match_studio_overlay() {
    let o = TextOverlay::default();
    assert_eq!(o.content, "");
    assert_eq!(o.color.to_string(), "#de35b1");
    assert_eq!(o.size_px, 32.0);
    assert_eq!(o.alignment, Alignment::Center);
    assert_eq!(o.stack_order, StackOrder::AboveCutout);
    assert_eq!((o.horizontal_offset_px, o.vertical_offset_px), (0.0, 0.0));
}

#[test]
fn updates_return_new_values() {
    let base = TextOverlay::default();
    let next = base.with_content("GO ROYALS").with_alignment(Alignment::Left);
    assert_eq!(base.content, "");
    assert_eq!(next.content, "GO ROYALS");
    assert_eq!(next.alignment, Alignment::Left);
    assert_eq!(next.toggle_stack_order().stack_order, StackOrder::BelowCutout);
    assert_eq!(
        next.toggle_stack_order().toggle_stack_order().stack_order,
        StackOrder::AboveCutout
    );
}

#[test]
fn numeric_coercion() {
    assert_eq!(coerce_number("").unwrap(), 0.0);
    assert_eq!(coerce_number("  ").unwrap(), 0.0);
    assert_eq!(coerce_number(" -12.5 ").unwrap(), -12.5);
    assert!(coerce_number("12px").is_err());
    assert!(coerce_number("NaN").is_err());
}

#[test]
fn apply_coerces_and_ignores_garbage() {
    let o = TextOverlay::default();
    let o = o.apply(&OverlayEdit::SizePx("48".into()));
    assert_eq!(o.size_px, 48.0);
    let o = o.apply(&OverlayEdit::SizePx("big".into()));
    assert_eq!(o.size_px, 48.0);
    let o = o.apply(&OverlayEdit::VerticalOffsetPx("".into()));
    assert_eq!(o.vertical_offset_px, 0.0);
    let o = o.apply(&OverlayEdit::HorizontalOffsetPx("20".into()));
    assert_eq!(o.horizontal_offset_px, 20.0);
    let o = o.apply(&OverlayEdit::Color("#00FF00".into()));
    assert_eq!(o.color, Rgba8::rgb(0, 255, 0));
    let o = o.apply(&OverlayEdit::Color("green".into()));
    assert_eq!(o.color, Rgba8::rgb(0, 255, 0));
    let o = o.apply(&OverlayEdit::Alignment("RIGHT".into()));
    assert_eq!(o.alignment, Alignment::Right);
    let o = o.apply(&OverlayEdit::StackOrder("below-cutout".into()));
    assert_eq!(o.stack_order, StackOrder::BelowCutout);
    let o = o.apply(&OverlayEdit::ToggleStackOrder);
    assert_eq!(o.stack_order, StackOrder::AboveCutout);
}

#[test]
fn serde_uses_kebab_stack_order_and_hex_color() {
    let o = TextOverlay::default()
        .with_content("hi")
        .with_stack_order(StackOrder::BelowCutout);
    let v = serde_json::to_value(&o).unwrap();
    assert_eq!(v["stack_order"], "below-cutout");
    assert_eq!(v["alignment"], "center");
    assert_eq!(v["color"], "#de35b1");

    let parsed: TextOverlay = serde_json::from_str(r##"{"content":"x","color":"#112233"}"##).unwrap();
    assert_eq!(parsed.size_px, 32.0);
    assert_eq!(parsed.color, Rgba8::rgb(0x11, 0x22, 0x33));

    let edit: OverlayEdit = serde_json::from_str(r#"{"field":"size_px","value":"40"}"#).unwrap();
    assert_eq!(edit, OverlayEdit::SizePx("40".into()));
}
