use std::{path::PathBuf, sync::Arc};

use anyhow::Context;

use crate::foundation::error::{FanframeError, FanframeResult};

/// Where the caption font comes from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// A TTF/OTF/TTC file on disk (first face).
    File(PathBuf),
    /// An installed system font, looked up by family with a serif fallback.
    System {
        /// Preferred family name; `None` selects the generic serif family.
        #[serde(default)]
        family: Option<String>,
    },
}

impl Default for FontSource {
    fn default() -> Self {
        Self::System { family: None }
    }
}

#[derive(Clone)]
/// Font bytes ready for shaping and glyph rasterization.
pub struct PreparedFont {
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes` (non-zero for collections).
    pub index: u32,
}

impl std::fmt::Debug for PreparedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl PreparedFont {
    /// Resolve a [`FontSource`] into font bytes.
    pub fn load(source: &FontSource) -> FanframeResult<Self> {
        match source {
            FontSource::File(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read font bytes from '{}'", path.display()))?;
                Self::from_bytes(bytes, 0)
            }
            FontSource::System { family } => load_system_font(family.as_deref()),
        }
    }

    /// Wrap raw font bytes.
    pub fn from_bytes(bytes: Vec<u8>, index: u32) -> FanframeResult<Self> {
        if bytes.is_empty() {
            return Err(FanframeError::decode("font data is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
        })
    }

    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            self.index,
        )
    }
}

fn load_system_font(family: Option<&str>) -> FanframeResult<PreparedFont> {
    use usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let mut families = Vec::<fontdb::Family<'_>>::new();
    if let Some(name) = family {
        families.push(fontdb::Family::Name(name));
    }
    families.push(fontdb::Family::Serif);
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| FanframeError::decode("no system fonts available"))?;
    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| FanframeError::decode("system font data unavailable"))?;
    tracing::debug!(?family, bytes = bytes.len(), index, "resolved system font");
    PreparedFont::from_bytes(bytes, index)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Builds single-line Parley layouts for one registered font.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: PreparedFont,
}

impl TextLayoutEngine {
    /// Register `font` with a fresh Parley font context.
    pub fn new(font: PreparedFont) -> FanframeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            FanframeError::decode("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FanframeError::decode("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    /// Family name detected from the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// The registered font.
    pub fn font(&self) -> &PreparedFont {
        &self.font
    }

    /// Shape `text` as a single unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> FanframeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FanframeError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
