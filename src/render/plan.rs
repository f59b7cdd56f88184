use crate::{
    assets::decode::PreparedImage,
    foundation::core::{Affine, Canvas, Point, Rgba8},
    foundation::error::{FanframeError, FanframeResult},
    model::overlay::{Alignment, StackOrder, TextOverlay},
};

/// Everything that contributes to one flattened image.
///
/// Derived on every render request and never stored.
#[derive(Clone, Copy, Debug)]
pub struct Composition<'a> {
    /// Background, stretched to the canvas.
    pub template: &'a PreparedImage,
    /// Foreground with transparency, stretched to the canvas.
    pub cutout: &'a PreparedImage,
    /// Caption and its layering.
    pub overlay: &'a TextOverlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// One of the three layers of a composition.
pub enum Layer {
    /// Background template.
    Template,
    /// Foreground cutout.
    Cutout,
    /// Caption text.
    Text,
}

/// Bottom-to-top draw order for `stack_order`.
pub fn layer_order(stack_order: StackOrder) -> [Layer; 3] {
    match stack_order {
        StackOrder::AboveCutout => [Layer::Template, Layer::Cutout, Layer::Text],
        StackOrder::BelowCutout => [Layer::Template, Layer::Text, Layer::Cutout],
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Where caption text is placed: `point.y` is the alphabetic baseline.
pub struct TextAnchor {
    /// Anchor in canvas pixels.
    pub point: Point,
    /// How the line extends from `point.x`.
    pub alignment: Alignment,
}

impl TextAnchor {
    /// Left edge of a line `text_width` wide placed at this anchor.
    ///
    /// `text_width` is the full advance, trailing whitespace included.
    pub fn origin_x(&self, text_width: f64) -> f64 {
        match self.alignment {
            Alignment::Left => self.point.x,
            Alignment::Center => self.point.x - text_width / 2.0,
            Alignment::Right => self.point.x - text_width,
        }
    }
}

/// Anchor for `overlay` on `canvas`.
pub fn text_anchor(canvas: Canvas, overlay: &TextOverlay) -> TextAnchor {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let y = h / 2.0 + overlay.vertical_offset_px;
    let x = match overlay.alignment {
        Alignment::Left => overlay.horizontal_offset_px,
        Alignment::Center => w / 2.0 + overlay.horizontal_offset_px,
        Alignment::Right => w - overlay.horizontal_offset_px,
    };
    TextAnchor {
        point: Point::new(x, y),
        alignment: overlay.alignment,
    }
}

/// Scale mapping a `src_w`x`src_h` image exactly onto `canvas` (aspect ratio not kept).
pub fn stretch_transform(src_w: u32, src_h: u32, canvas: Canvas) -> Affine {
    Affine::scale_non_uniform(
        f64::from(canvas.width) / f64::from(src_w.max(1)),
        f64::from(canvas.height) / f64::from(src_h.max(1)),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which composition input an image op draws.
pub enum ImageSlot {
    /// [`Composition::template`].
    Template,
    /// [`Composition::cutout`].
    Cutout,
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by [`compile_composition`].
pub enum DrawOp {
    /// Draw a composition image through `transform`.
    Image {
        /// Which image.
        slot: ImageSlot,
        /// Image space to canvas space.
        transform: Affine,
    },
    /// Draw one line of caption text.
    Text {
        /// Text to shape.
        content: String,
        /// Baseline anchor.
        anchor: TextAnchor,
        /// Font size in pixels.
        size_px: f32,
        /// Straight-alpha fill color.
        color: Rgba8,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Backend-agnostic plan for one composition: ops in bottom-to-top order over `canvas`.
pub struct RenderPlan {
    /// Output size.
    pub canvas: Canvas,
    /// Ops to execute in order.
    pub ops: Vec<DrawOp>,
}

/// Compile a composition into a [`RenderPlan`].
///
/// Fails if either image is not fully loaded. Text that would not be visible (empty content,
/// non-positive or non-finite size) is omitted rather than rejected.
pub fn compile_composition(comp: &Composition<'_>, canvas: Canvas) -> FanframeResult<RenderPlan> {
    canvas.validate()?;
    comp.template
        .ensure_loaded()
        .map_err(|e| FanframeError::decode(format!("template not ready: {e}")))?;
    comp.cutout
        .ensure_loaded()
        .map_err(|e| FanframeError::decode(format!("cutout not ready: {e}")))?;

    let overlay = comp.overlay;
    let mut ops = Vec::with_capacity(3);
    for layer in layer_order(overlay.stack_order) {
        match layer {
            Layer::Template => ops.push(DrawOp::Image {
                slot: ImageSlot::Template,
                transform: stretch_transform(comp.template.width, comp.template.height, canvas),
            }),
            Layer::Cutout => ops.push(DrawOp::Image {
                slot: ImageSlot::Cutout,
                transform: stretch_transform(comp.cutout.width, comp.cutout.height, canvas),
            }),
            Layer::Text => {
                let size_px = overlay.size_px as f32;
                if overlay.content.is_empty() || !size_px.is_finite() || size_px <= 0.0 {
                    continue;
                }
                ops.push(DrawOp::Text {
                    content: overlay.content.clone(),
                    anchor: text_anchor(canvas, overlay),
                    size_px,
                    color: overlay.color,
                });
            }
        }
    }

    Ok(RenderPlan { canvas, ops })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
