use super::*;

fn entries(n: usize) -> Vec<TemplateEntry> {
    (0..n)
        .map(|i| TemplateEntry {
            name: format!("t{i}"),
            source: format!("bg/t{i}.png"),
        })
        .collect()
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("../up.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn rejects_empty_set_and_bad_sources() {
    assert!(TemplateLibrary::new(".", vec![], Canvas::EXPORT).is_err());
    let bad = vec![TemplateEntry {
        name: "x".to_string(),
        source: "../x.png".to_string(),
    }];
    assert!(TemplateLibrary::new(".", bad, Canvas::EXPORT).is_err());
}

#[test]
fn ids_are_bounds_checked() {
    let lib = TemplateLibrary::new("root", entries(3), Canvas::EXPORT).unwrap();
    assert_eq!(lib.len(), 3);
    assert!(lib.check(TemplateId(2)).is_ok());
    assert!(lib.check(TemplateId(3)).is_err());
    assert_eq!(
        lib.path_for(TemplateId(1)).unwrap(),
        PathBuf::from("root").join("bg/t1.png")
    );
    let names: Vec<_> = lib.entries().map(|(id, e)| (id.0, e.name.clone())).collect();
    assert_eq!(names[0], (0, "t0".to_string()));
}

#[test]
fn preload_serves_from_cache_without_io() {
    let mut lib = TemplateLibrary::new("does-not-exist", entries(2), Canvas::EXPORT).unwrap();
    let img = PreparedImage::from_straight_rgba8(1, 1, vec![1, 2, 3, 255]).unwrap();
    lib.preload(TemplateId(1), img.clone()).unwrap();
    assert_eq!(lib.load(TemplateId(1)).unwrap(), img);
    assert!(lib.load(TemplateId(0)).is_err());
}

#[test]
fn load_decodes_from_disk() {
    let dir = std::env::temp_dir().join(format!("fanframe-templates-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("bg")).unwrap();
    image::RgbaImage::from_pixel(4, 3, image::Rgba([9, 8, 7, 255]))
        .save(dir.join("bg/t0.png"))
        .unwrap();

    let mut lib = TemplateLibrary::new(&dir, entries(1), Canvas::EXPORT).unwrap();
    let img = lib.load(TemplateId(0)).unwrap();
    assert_eq!((img.width, img.height), (4, 3));
    assert_eq!(img.pixel(0, 0), Some([9, 8, 7, 255]));

    std::fs::remove_dir_all(&dir).ok();
}
