use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = StudioConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, StudioConfig::default());
    assert_eq!(cfg.canvas, Canvas::EXPORT);
    assert_eq!(cfg.templates.entries.len(), 6);
    assert_eq!(
        cfg.templates.entries[2].source,
        "background-templates/template3.webp"
    );
    assert_eq!(cfg.export_filename, "composition.png");
    assert_eq!(cfg.caption.model, "gpt-4o");
}

#[test]
fn json_roundtrip_preserves_values() {
    let mut cfg = StudioConfig::default();
    cfg.canvas = Canvas::new(320, 240).unwrap();
    cfg.logging.json = true;
    let text = serde_json::to_string(&cfg).unwrap();
    assert_eq!(StudioConfig::from_json_str(&text).unwrap(), cfg);
}

#[test]
fn rejects_empty_template_set_and_bad_canvas() {
    let err = StudioConfig::from_json_str(r#"{"templates": {"entries": []}}"#).unwrap_err();
    assert!(err.to_string().contains("template set"));

    let err = StudioConfig::from_json_str(r#"{"canvas": {"width": 0, "height": 10}}"#)
        .unwrap_err();
    assert!(err.to_string().contains("config error"));

    assert!(StudioConfig::from_json_str("not json").is_err());
}

#[test]
fn env_overrides_apply_and_split_command() {
    let cfg = StudioConfig::default().with_overrides_from(|k| match k {
        ENV_CAPTION_ENDPOINT => Some(" http://localhost:9/v1 ".to_string()),
        ENV_SEGMENT_CMD => Some("my-seg --model u2net".to_string()),
        ENV_LOG => Some("debug".to_string()),
        _ => None,
    });
    assert_eq!(cfg.caption.endpoint, "http://localhost:9/v1");
    assert_eq!(cfg.segmentation.program, "my-seg");
    assert_eq!(cfg.segmentation.args, vec!["--model", "u2net"]);
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn blank_env_values_are_ignored() {
    let cfg = StudioConfig::default().with_overrides_from(|_| Some("  ".to_string()));
    assert_eq!(cfg, StudioConfig::default());
}
