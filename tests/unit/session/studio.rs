use super::*;
use crate::{
    assets::decode::PreparedImage,
    assets::templates::TemplateEntry,
    capture::source::StillSource,
    services::caption::CaptionResponse,
};

fn session() -> StudioSession {
    let entries = (0..3)
        .map(|i| TemplateEntry {
            name: format!("t{i}"),
            source: format!("t{i}.png"),
        })
        .collect();
    let mut lib = TemplateLibrary::new("unused", entries, Canvas::new(32, 24).unwrap()).unwrap();
    for i in 0..3 {
        let shade = 40 * i as u8;
        lib.preload(
            TemplateId(i),
            PreparedImage::from_straight_rgba8(2, 2, [shade, 0, 0, 255].repeat(4)).unwrap(),
        )
        .unwrap();
    }
    StudioSession::new(lib, Canvas::new(32, 24).unwrap(), "composition.png").unwrap()
}

fn frame(shade: u8) -> Frame {
    Frame::from_rgba8(4, 4, [shade, shade, shade, 255].repeat(16)).unwrap()
}

fn cutout(alpha: u8) -> Cutout {
    Cutout::from_image(PreparedImage::from_straight_rgba8(4, 4, [0, 0, 255, alpha].repeat(16)).unwrap())
        .unwrap()
}

fn generated(items: &[&str]) -> CaptionSuggestions {
    CaptionSuggestions {
        items: items.iter().map(|s| s.to_string()).collect(),
        source: CaptionSource::Generated,
    }
}

#[test]
fn stale_cutout_never_overwrites_newer_frame() {
    let mut s = session();
    s.install_frame(frame(10));
    let ticket_a = s.begin_processing().unwrap();

    s.install_frame(frame(20));
    assert_eq!(s.apply_cutout(&ticket_a, Ok(cutout(255))), ApplyOutcome::Stale);
    assert!(s.cutout().is_none());

    let ticket_b = s.begin_processing().unwrap();
    assert_eq!(s.apply_cutout(&ticket_b, Ok(cutout(128))), ApplyOutcome::Applied);
    assert_eq!(s.apply_cutout(&ticket_a, Ok(cutout(255))), ApplyOutcome::Stale);
    assert_eq!(s.cutout().unwrap().image().pixel(0, 0).unwrap()[3], 128);
}

#[test]
fn stale_captions_are_dropped() {
    let mut s = session();
    s.install_frame(frame(1));
    let old = s.begin_processing().unwrap();
    s.recapture();
    assert_eq!(
        s.apply_captions(&old, generated(&["late"])),
        ApplyOutcome::Stale
    );
    assert!(s.captions().is_none());
    assert!(s.begin_processing().is_err());
}

#[test]
fn capture_resets_derived_state() {
    let mut s = session();
    let g1 = s.capture(&StillSource::new(frame(5))).unwrap();
    let t = s.begin_processing().unwrap();
    s.apply_cutout(&t, Ok(cutout(255)));
    s.apply_captions(&t, generated(&["Pink Army", "Halla Bol"]));
    assert_eq!(s.overlay().content, "Pink Army");

    let g2 = s.capture(&StillSource::new(frame(6))).unwrap();
    assert!(g2 > g1);
    assert!(s.cutout().is_none());
    assert!(s.captions().is_none());
    assert_eq!(s.overlay().content, "");
}

#[test]
fn collaborator_failure_keeps_prior_cutout() {
    let mut s = session();
    s.install_frame(frame(1));
    let t = s.begin_processing().unwrap();
    s.apply_cutout(&t, Ok(cutout(255)));
    let before = s.cutout().cloned();

    let outcome = s.apply_cutout(&t, Err(FanframeError::service("model offline")));
    assert_eq!(outcome, ApplyOutcome::Failed);
    assert_eq!(s.cutout().cloned(), before);
    assert!(s.last_error().unwrap().contains("model offline"));
}

#[test]
fn process_runs_both_collaborators() {
    let mut s = session();
    s.install_frame(frame(3));
    let seg = |_: &Frame, _: &SegmentationOptions| -> FanframeResult<Cutout> { Ok(cutout(255)) };
    let cap = |_: &str| -> FanframeResult<CaptionResponse> {
        Ok(CaptionResponse {
            status: 200,
            body: r#"{"choices":[{"message":{"content":"[\"Halla Bol\"]"}}]}"#.into(),
        })
    };
    let report = s
        .process(
            &seg,
            &SegmentationOptions::default(),
            Some(&cap as &dyn CaptionService),
        )
        .unwrap();
    assert_eq!(report.cutout, ApplyOutcome::Applied);
    assert_eq!(report.captions, Some(ApplyOutcome::Applied));
    assert_eq!(s.overlay().content, "Halla Bol");
    assert!(s.cutout().is_some());
}

#[test]
fn empty_caption_reply_keeps_overlay_text() {
    let mut s = session();
    s.install_frame(frame(3));
    s.apply_edit(&OverlayEdit::Content("mine".into()));
    let t = s.begin_processing().unwrap();
    s.apply_captions(
        &t,
        CaptionSuggestions {
            items: vec!["No suggestions available.".into()],
            source: CaptionSource::Empty,
        },
    );
    assert_eq!(s.overlay().content, "mine");
}

#[test]
fn export_requires_cutout_and_uses_fixed_name() {
    let mut s = session();
    let mut compositor = CpuCompositor::new();
    assert!(matches!(
        s.export(&mut compositor),
        Err(FanframeError::Validation(_))
    ));

    s.install_frame(frame(0));
    let t = s.begin_processing().unwrap();
    s.apply_cutout(&t, Ok(cutout(0)));
    s.select_template(TemplateId(2)).unwrap();
    let enc = s.export(&mut compositor).unwrap();
    assert_eq!(enc.filename, "composition.png");
    assert_eq!((enc.width, enc.height), (32, 24));

    let preview = s.preview(&mut compositor).unwrap();
    let px = preview.pixel(16, 12).unwrap();
    assert!(px[0].abs_diff(80) <= 1 && px[3] == 255, "{px:?}");
}

#[test]
fn template_selection_is_validated() {
    let mut s = session();
    assert!(s.select_template(TemplateId(3)).is_err());
    assert_eq!(s.template(), TemplateId(0));
}

#[test]
fn choose_caption_and_crop() {
    let mut s = session();
    s.install_frame(frame(0));
    let t = s.begin_processing().unwrap();
    assert!(s.crop_cutout(CropRect { x: 0, y: 0, width: 1, height: 1 }).is_err());
    s.apply_cutout(&t, Ok(cutout(255)));
    s.apply_captions(&t, generated(&["a", "b"]));
    s.choose_caption(1).unwrap();
    assert_eq!(s.overlay().content, "b");
    assert!(s.choose_caption(2).is_err());

    s.crop_cutout(CropRect { x: 1, y: 1, width: 2, height: 3 }).unwrap();
    assert_eq!((s.cutout().unwrap().width(), s.cutout().unwrap().height()), (2, 3));
    assert!(s.crop_cutout(CropRect { x: 0, y: 0, width: 3, height: 1 }).is_err());
}
