use std::{fmt, str::FromStr};

use crate::foundation::{
    core::Rgba8,
    error::{FanframeError, FanframeResult},
};

/// Horizontal text alignment relative to the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Text grows rightward from the anchor.
    Left,
    /// Text is centered on the anchor.
    #[default]
    Center,
    /// Text grows leftward from the anchor.
    Right,
}

impl FromStr for Alignment {
    type Err = FanframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(FanframeError::validation(format!(
                "unknown alignment \"{other}\" (expected left, center or right)"
            ))),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// Whether the caption is drawn over or under the cutout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackOrder {
    /// Template, cutout, text.
    #[default]
    AboveCutout,
    /// Template, text, cutout.
    BelowCutout,
}

impl StackOrder {
    /// The other order.
    pub fn toggled(self) -> Self {
        match self {
            Self::AboveCutout => Self::BelowCutout,
            Self::BelowCutout => Self::AboveCutout,
        }
    }
}

impl FromStr for StackOrder {
    type Err = FanframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above-cutout" | "above" | "front" => Ok(Self::AboveCutout),
            "below-cutout" | "below" | "behind" => Ok(Self::BelowCutout),
            other => Err(FanframeError::validation(format!(
                "unknown stack order \"{other}\" (expected above-cutout or below-cutout)"
            ))),
        }
    }
}

impl fmt::Display for StackOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AboveCutout => "above-cutout",
            Self::BelowCutout => "below-cutout",
        })
    }
}

/// Caption text and its placement.
///
/// Every field is user-mutable. Updates go through the `with_*` helpers or [`TextOverlay::apply`],
/// which return a new value and leave `self` untouched.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextOverlay {
    /// Caption text; empty draws nothing.
    pub content: String,
    /// Fill color.
    pub color: Rgba8,
    /// Font size in pixels.
    pub size_px: f64,
    /// Horizontal alignment.
    pub alignment: Alignment,
    /// Offset added to the canvas vertical center (positive moves down).
    pub vertical_offset_px: f64,
    /// Offset from the aligned edge or center (see [`Alignment`]).
    pub horizontal_offset_px: f64,
    /// Layering relative to the cutout.
    pub stack_order: StackOrder,
}

impl TextOverlay {
    /// Caption color used until the user picks another.
    pub const DEFAULT_COLOR: Rgba8 = Rgba8::rgb(0xde, 0x35, 0xb1);
    /// Caption size used until the user picks another.
    pub const DEFAULT_SIZE_PX: f64 = 32.0;
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            content: String::new(),
            color: Self::DEFAULT_COLOR,
            size_px: Self::DEFAULT_SIZE_PX,
            alignment: Alignment::Center,
            vertical_offset_px: 0.0,
            horizontal_offset_px: 0.0,
            stack_order: StackOrder::AboveCutout,
        }
    }
}

impl TextOverlay {
    /// Replace the caption text.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    /// Replace the fill color.
    pub fn with_color(&self, color: Rgba8) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    /// Replace the font size.
    pub fn with_size_px(&self, size_px: f64) -> Self {
        Self {
            size_px,
            ..self.clone()
        }
    }

    /// Replace the alignment.
    pub fn with_alignment(&self, alignment: Alignment) -> Self {
        Self {
            alignment,
            ..self.clone()
        }
    }

    /// Replace both offsets.
    pub fn with_offsets(&self, horizontal_px: f64, vertical_px: f64) -> Self {
        Self {
            horizontal_offset_px: horizontal_px,
            vertical_offset_px: vertical_px,
            ..self.clone()
        }
    }

    /// Replace the stack order.
    pub fn with_stack_order(&self, stack_order: StackOrder) -> Self {
        Self {
            stack_order,
            ..self.clone()
        }
    }

    /// Swap between above and below the cutout.
    pub fn toggle_stack_order(&self) -> Self {
        self.with_stack_order(self.stack_order.toggled())
    }

    /// Apply one raw (form-style) edit.
    ///
    /// Inputs that cannot be coerced leave the overlay unchanged.
    pub fn apply(&self, edit: &OverlayEdit) -> Self {
        match edit {
            OverlayEdit::Content(text) => self.with_content(text.clone()),
            OverlayEdit::Color(raw) => match Rgba8::parse_hex(raw) {
                Ok(color) => self.with_color(color),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::SizePx(raw) => match coerce_number(raw) {
                Ok(v) => self.with_size_px(v),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::Alignment(raw) => match raw.parse() {
                Ok(a) => self.with_alignment(a),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::VerticalOffsetPx(raw) => match coerce_number(raw) {
                Ok(v) => self.with_offsets(self.horizontal_offset_px, v),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::HorizontalOffsetPx(raw) => match coerce_number(raw) {
                Ok(v) => self.with_offsets(v, self.vertical_offset_px),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::StackOrder(raw) => match raw.parse() {
                Ok(s) => self.with_stack_order(s),
                Err(e) => self.ignored(edit, e),
            },
            OverlayEdit::ToggleStackOrder => self.toggle_stack_order(),
        }
    }

    fn ignored(&self, edit: &OverlayEdit, err: FanframeError) -> Self {
        tracing::debug!(?edit, %err, "overlay edit ignored");
        self.clone()
    }
}

/// A single overlay field edit as it arrives from a form or command line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum OverlayEdit {
    /// New caption text.
    Content(String),
    /// New color, `#RRGGBB` or `#RRGGBBAA`.
    Color(String),
    /// New font size.
    SizePx(String),
    /// `left`, `center` or `right`.
    Alignment(String),
    /// New vertical offset.
    VerticalOffsetPx(String),
    /// New horizontal offset.
    HorizontalOffsetPx(String),
    /// `above-cutout` or `below-cutout`.
    StackOrder(String),
    /// Swap the stack order.
    ToggleStackOrder,
}

/// Coerce numeric form input: blank is `0`, otherwise a finite number.
pub fn coerce_number(raw: &str) -> FanframeResult<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FanframeError::validation(format!("\"{s}\" is not a number"))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/overlay.rs"]
mod tests;
