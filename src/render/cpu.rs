use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    assets::font::{FontSource, PreparedFont, TextBrushRgba8, TextLayoutEngine},
    encode::png::{EncodedImage, encode_png},
    foundation::core::{Affine, Canvas},
    foundation::error::{FanframeError, FanframeResult},
    model::overlay::TextOverlay,
    render::backend::RasterImage,
    render::plan::{
        Composition, DrawOp, ImageSlot, RenderPlan, TextAnchor, compile_composition,
    },
};

/// CPU compositor powered by `vello_cpu`.
///
/// This is the explicit rendering context: it owns the raster context (reused while the canvas
/// size stays the same) and the caption font. Rendering never mutates the inputs.
pub struct CpuCompositor {
    ctx: Option<vello_cpu::RenderContext>,
    text: Option<CaptionFont>,
}

struct CaptionFont {
    engine: TextLayoutEngine,
    data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for CpuCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCompositor")
            .field("has_ctx", &self.ctx.is_some())
            .field(
                "font_family",
                &self.text.as_ref().map(|t| t.engine.family_name()),
            )
            .finish()
    }
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCompositor {
    /// Compositor without a caption font; compositions with visible text fail to render.
    pub fn new() -> Self {
        Self {
            ctx: None,
            text: None,
        }
    }

    /// Compositor drawing captions with `font`.
    pub fn with_font(font: PreparedFont) -> FanframeResult<Self> {
        let data = font.font_data();
        let engine = TextLayoutEngine::new(font)?;
        tracing::debug!(family = engine.family_name(), "caption font registered");
        Ok(Self {
            ctx: None,
            text: Some(CaptionFont { engine, data }),
        })
    }

    /// Resolve `source` and build a compositor around it.
    pub fn from_font_source(source: &FontSource) -> FanframeResult<Self> {
        Self::with_font(PreparedFont::load(source)?)
    }

    /// Family name of the caption font, if any.
    pub fn font_family(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.engine.family_name())
    }

    /// Flatten template, cutout and caption into a `canvas`-sized premultiplied raster.
    ///
    /// Both images are stretched to fill the canvas. Fails without output if either image is not
    /// fully decoded.
    #[tracing::instrument(skip_all, fields(width = canvas.width, height = canvas.height))]
    pub fn render(
        &mut self,
        template: &PreparedImage,
        cutout: &PreparedImage,
        overlay: &TextOverlay,
        canvas: Canvas,
    ) -> FanframeResult<RasterImage> {
        let comp = Composition {
            template,
            cutout,
            overlay,
        };
        let plan = compile_composition(&comp, canvas)?;
        self.execute_plan(&plan, &comp)
    }

    /// Live preview; identical pixels to [`CpuCompositor::export`].
    pub fn preview(
        &mut self,
        template: &PreparedImage,
        cutout: &PreparedImage,
        overlay: &TextOverlay,
        canvas: Canvas,
    ) -> FanframeResult<RasterImage> {
        self.render(template, cutout, overlay, canvas)
    }

    /// Render and encode as PNG under `filename`.
    pub fn export(
        &mut self,
        template: &PreparedImage,
        cutout: &PreparedImage,
        overlay: &TextOverlay,
        canvas: Canvas,
        filename: &str,
    ) -> FanframeResult<EncodedImage> {
        let raster = self.render(template, cutout, overlay, canvas)?;
        encode_png(&raster, filename)
    }

    /// Execute a compiled plan against the images of `comp`.
    pub fn execute_plan(
        &mut self,
        plan: &RenderPlan,
        comp: &Composition<'_>,
    ) -> FanframeResult<RasterImage> {
        let (w, h) = plan.canvas.as_u16()?;
        // Decode everything before touching the raster context so failures emit nothing.
        let template = image_paint(comp.template)?;
        let cutout = image_paint(comp.cutout)?;

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(w, h, |this, ctx| {
            for op in &plan.ops {
                match op {
                    DrawOp::Image { slot, transform } => {
                        let (paint, img) = match slot {
                            ImageSlot::Template => (&template, comp.template),
                            ImageSlot::Cutout => (&cutout, comp.cutout),
                        };
                        draw_image(ctx, paint, img, *transform);
                    }
                    DrawOp::Text {
                        content,
                        anchor,
                        size_px,
                        color,
                    } => {
                        let font = this.text.as_mut().ok_or_else(|| {
                            FanframeError::render("caption text requires a font")
                        })?;
                        let brush = TextBrushRgba8 {
                            r: color.r,
                            g: color.g,
                            b: color.b,
                            a: color.a,
                        };
                        draw_text(ctx, font, content, *anchor, *size_px, brush)?;
                    }
                }
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;

        Ok(RasterImage {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> FanframeResult<R>,
    ) -> FanframeResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

fn image_paint(img: &PreparedImage) -> FanframeResult<vello_cpu::Image> {
    img.ensure_loaded()?;
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: &vello_cpu::Image,
    img: &PreparedImage,
    transform: Affine,
) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(img.width),
        f64::from(img.height),
    ));
}

fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    font: &mut CaptionFont,
    content: &str,
    anchor: TextAnchor,
    size_px: f32,
    brush: TextBrushRgba8,
) -> FanframeResult<()> {
    let layout = font.engine.layout_line(content, size_px, brush)?;
    let Some(first) = layout.lines().next() else {
        return Ok(());
    };
    let baseline = f64::from(first.metrics().baseline);
    // Trailing whitespace counts toward the advance, as with canvas `fillText`.
    let x0 = anchor.origin_x(f64::from(layout.full_width()));
    let y0 = anchor.point.y - baseline;

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(Affine::translate((x0, y0))));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font.data)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    Ok(())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FanframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FanframeError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FanframeError::render("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FanframeError::render("image byte length mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
