use std::sync::Arc;

use crate::{
    assets::templates::{TemplateId, TemplateLibrary},
    capture::source::{FrameSource, capture},
    encode::png::EncodedImage,
    foundation::config::StudioConfig,
    foundation::core::Canvas,
    foundation::error::{FanframeError, FanframeResult},
    model::frame::{CropRect, Cutout, Frame},
    model::overlay::{OverlayEdit, TextOverlay},
    render::backend::RasterImage,
    render::cpu::CpuCompositor,
    services::caption::{
        CaptionService, CaptionSource, CaptionSuggestions, FALLBACK_UNEXPECTED_ERROR,
        build_caption_prompt, suggest_captions,
    },
    services::segmentation::{SegmentationOptions, Segmenter},
};

/// Proof of which frame a collaborator request was made for.
///
/// Results are only applied while `generation` is still the session's current one.
#[derive(Clone, Debug)]
pub struct ProcessTicket {
    /// Generation the request was issued in.
    pub generation: u64,
    /// The frame to send.
    pub frame: Arc<Frame>,
}

/// Result of applying a collaborator completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// State was updated.
    Applied,
    /// The frame was replaced since the request; the result was dropped.
    Stale,
    /// The collaborator failed; prior state is untouched.
    Failed,
}

/// Outcomes of [`StudioSession::process`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessReport {
    /// Segmentation result.
    pub cutout: ApplyOutcome,
    /// Caption result, when a caption service was given.
    pub captions: Option<ApplyOutcome>,
}

/// In-memory state of one compositing session.
///
/// Holds the captured frame and everything derived from it. A new capture bumps the generation,
/// which discards the cutout and caption suggestions and turns every in-flight request stale.
#[derive(Debug)]
pub struct StudioSession {
    canvas: Canvas,
    export_filename: String,
    templates: TemplateLibrary,
    generation: u64,
    frame: Option<Arc<Frame>>,
    cutout: Option<Cutout>,
    captions: Option<CaptionSuggestions>,
    template: TemplateId,
    overlay: TextOverlay,
    last_error: Option<String>,
}

impl StudioSession {
    /// Empty session over `templates`, template 0 selected.
    pub fn new(
        templates: TemplateLibrary,
        canvas: Canvas,
        export_filename: impl Into<String>,
    ) -> FanframeResult<Self> {
        canvas.validate()?;
        Ok(Self {
            canvas,
            export_filename: export_filename.into(),
            templates,
            generation: 0,
            frame: None,
            cutout: None,
            captions: None,
            template: TemplateId::default(),
            overlay: TextOverlay::default(),
            last_error: None,
        })
    }

    /// Session configured from `cfg`.
    pub fn from_config(cfg: &StudioConfig) -> FanframeResult<Self> {
        let templates = TemplateLibrary::from_config(&cfg.templates, cfg.canvas)?;
        Self::new(templates, cfg.canvas, cfg.export_filename.clone())
    }

    /// Current generation token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Captured frame, if any.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_deref()
    }

    /// Current cutout, if any.
    pub fn cutout(&self) -> Option<&Cutout> {
        self.cutout.as_ref()
    }

    /// Caption suggestions for the current frame, if any.
    pub fn captions(&self) -> Option<&CaptionSuggestions> {
        self.captions.as_ref()
    }

    /// Selected template.
    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// Template set.
    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Current overlay.
    pub fn overlay(&self) -> &TextOverlay {
        &self.overlay
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Last user-visible collaborator error.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Capture from `source` and make it the current frame.
    ///
    /// A failed capture leaves the session untouched.
    pub fn capture(&mut self, source: &dyn FrameSource) -> FanframeResult<u64> {
        let frame = capture(source)?;
        Ok(self.install_frame(frame))
    }

    /// Make `frame` current, resetting everything derived from the previous one.
    #[tracing::instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn install_frame(&mut self, frame: Frame) -> u64 {
        self.generation += 1;
        self.frame = Some(Arc::new(frame));
        self.cutout = None;
        self.captions = None;
        self.overlay = self.overlay.with_content("");
        self.last_error = None;
        tracing::debug!(generation = self.generation, "frame installed");
        self.generation
    }

    /// Drop the frame and everything derived from it.
    pub fn recapture(&mut self) {
        self.generation += 1;
        self.frame = None;
        self.cutout = None;
        self.captions = None;
        self.last_error = None;
    }

    /// Ticket for sending the current frame to collaborators.
    pub fn begin_processing(&self) -> FanframeResult<ProcessTicket> {
        let frame = self
            .frame
            .clone()
            .ok_or_else(|| FanframeError::validation("no frame captured"))?;
        Ok(ProcessTicket {
            generation: self.generation,
            frame,
        })
    }

    fn is_current(&self, ticket: &ProcessTicket, what: &str) -> bool {
        let current = ticket.generation == self.generation;
        if !current {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale {what}"
            );
        }
        current
    }

    /// Apply a segmentation completion.
    pub fn apply_cutout(
        &mut self,
        ticket: &ProcessTicket,
        result: FanframeResult<Cutout>,
    ) -> ApplyOutcome {
        if !self.is_current(ticket, "cutout") {
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(cutout) => {
                self.cutout = Some(cutout);
                ApplyOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "background removal failed");
                self.last_error = Some(e.to_string());
                ApplyOutcome::Failed
            }
        }
    }

    /// Apply caption suggestions; may also replace the overlay caption.
    pub fn apply_captions(
        &mut self,
        ticket: &ProcessTicket,
        suggestions: CaptionSuggestions,
    ) -> ApplyOutcome {
        if !self.is_current(ticket, "captions") {
            return ApplyOutcome::Stale;
        }
        if matches!(
            suggestions.source,
            CaptionSource::ServiceError | CaptionSource::Transport
        ) {
            self.last_error = suggestions.items.first().cloned();
        }
        if let Some(text) = suggestions.overlay_text() {
            self.overlay = self.overlay.with_content(text);
        }
        self.captions = Some(suggestions);
        ApplyOutcome::Applied
    }

    /// Run segmentation and (optionally) captioning concurrently for the current frame.
    #[tracing::instrument(skip_all, fields(generation = self.generation))]
    pub fn process(
        &mut self,
        segmenter: &dyn Segmenter,
        options: &SegmentationOptions,
        captioner: Option<&dyn CaptionService>,
    ) -> FanframeResult<ProcessReport> {
        let ticket = self.begin_processing()?;
        let frame = ticket.frame.as_ref();
        let (cutout, captions) = rayon::join(
            || segmenter.remove_background(frame, options),
            || captioner.map(|service| caption_frame(service, frame)),
        );
        Ok(ProcessReport {
            cutout: self.apply_cutout(&ticket, cutout),
            captions: captions.map(|c| self.apply_captions(&ticket, c)),
        })
    }

    /// Select a template by index.
    pub fn select_template(&mut self, id: TemplateId) -> FanframeResult<()> {
        self.templates.check(id)?;
        self.template = id;
        Ok(())
    }

    /// Replace the overlay.
    pub fn set_overlay(&mut self, overlay: TextOverlay) {
        self.overlay = overlay;
    }

    /// Apply a raw edit to the overlay.
    pub fn apply_edit(&mut self, edit: &OverlayEdit) {
        self.overlay = self.overlay.apply(edit);
    }

    /// Use suggestion `index` as the caption.
    pub fn choose_caption(&mut self, index: usize) -> FanframeResult<()> {
        let text = self
            .captions
            .as_ref()
            .and_then(|c| c.items.get(index))
            .ok_or_else(|| FanframeError::validation(format!("no caption suggestion #{index}")))?;
        self.overlay = self.overlay.with_content(text.clone());
        Ok(())
    }

    /// Replace the cutout with a crop of itself.
    pub fn crop_cutout(&mut self, rect: CropRect) -> FanframeResult<()> {
        let cutout = self
            .cutout
            .as_ref()
            .ok_or_else(|| FanframeError::validation("no cutout to crop"))?;
        self.cutout = Some(cutout.crop(rect)?);
        Ok(())
    }

    /// Render the current composition.
    pub fn preview(&mut self, compositor: &mut CpuCompositor) -> FanframeResult<RasterImage> {
        let template = self.templates.load(self.template)?;
        let cutout = self.require_cutout()?;
        compositor.preview(&template, cutout.image(), &self.overlay, self.canvas)
    }

    /// Render and encode the current composition for download.
    #[tracing::instrument(skip_all, fields(template = %self.template))]
    pub fn export(&mut self, compositor: &mut CpuCompositor) -> FanframeResult<EncodedImage> {
        let template = self.templates.load(self.template)?;
        let cutout = self.require_cutout()?;
        compositor.export(
            &template,
            cutout.image(),
            &self.overlay,
            self.canvas,
            &self.export_filename,
        )
    }

    fn require_cutout(&self) -> FanframeResult<&Cutout> {
        self.cutout.as_ref().ok_or_else(|| {
            FanframeError::validation("no cutout yet: capture and process a frame first")
        })
    }
}

fn caption_frame(service: &dyn CaptionService, frame: &Frame) -> CaptionSuggestions {
    match build_caption_prompt(frame) {
        Ok(prompt) => suggest_captions(service, &prompt),
        Err(e) => {
            tracing::warn!(error = %e, "could not build caption prompt");
            CaptionSuggestions::fallback(CaptionSource::Transport, FALLBACK_UNEXPECTED_ERROR)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
