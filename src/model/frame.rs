use std::{io::Cursor, sync::Arc};

use base64::Engine as _;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::error::{FanframeError, FanframeResult},
};

/// One captured still, straight-alpha RGBA8.
///
/// Immutable once captured; a recapture replaces the whole value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl Frame {
    /// Wrap tightly packed straight RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> FanframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(FanframeError::decode(format!(
                "frame has empty dimensions {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8.len() != expected {
            return Err(FanframeError::decode(format!(
                "frame byte length mismatch: got {}, expected {expected}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Decode an encoded still (PNG, JPEG, WebP, ...).
    pub fn from_encoded(bytes: &[u8]) -> FanframeResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| FanframeError::decode(format!("decode frame: {e}")))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba8(w, h, img.into_raw())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight RGBA8 pixel bytes.
    pub fn rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// PNG encoding of the frame; this is the segmentation payload.
    pub fn to_png_bytes(&self) -> FanframeResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.rgba8.to_vec())
            .ok_or_else(|| FanframeError::render("frame buffer does not match its dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| FanframeError::render(format!("encode frame png: {e}")))?;
        Ok(out)
    }

    /// First `max_chars` characters of the frame's `data:image/png;base64,` URL.
    pub fn data_url_prefix(&self, max_chars: usize) -> FanframeResult<String> {
        const HEADER: &str = "data:image/png;base64,";
        if max_chars <= HEADER.len() {
            return Ok(HEADER[..max_chars].to_string());
        }
        let payload_chars = max_chars - HEADER.len();
        // Every 3 input bytes become 4 output characters.
        let needed = payload_chars.div_ceil(4) * 3;
        let png = self.to_png_bytes()?;
        let mut url = String::with_capacity(max_chars + 4);
        url.push_str(HEADER);
        base64::engine::general_purpose::STANDARD
            .encode_string(&png[..needed.min(png.len())], &mut url);
        url.truncate(max_chars);
        Ok(url)
    }
}

/// Pixel rectangle inside a cutout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Background-removed foreground, premultiplied RGBA8 with per-pixel transparency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cutout {
    image: PreparedImage,
}

impl Cutout {
    /// Decode the PNG (or any raster) returned by a segmentation collaborator.
    pub fn from_png(bytes: &[u8]) -> FanframeResult<Self> {
        Self::from_image(decode_image(bytes)?)
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: PreparedImage) -> FanframeResult<Self> {
        image.ensure_loaded()?;
        Ok(Self { image })
    }

    /// Decoded pixels.
    pub fn image(&self) -> &PreparedImage {
        &self.image
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Copy out `rect`, which must be non-empty and lie inside the cutout.
    pub fn crop(&self, rect: CropRect) -> FanframeResult<Self> {
        let right = rect.x.checked_add(rect.width);
        let bottom = rect.y.checked_add(rect.height);
        let inside = matches!((right, bottom), (Some(r), Some(b)) if r <= self.width() && b <= self.height());
        if rect.width == 0 || rect.height == 0 || !inside {
            return Err(FanframeError::validation(format!(
                "crop {}x{}+{}+{} is outside the {}x{} cutout",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                self.width(),
                self.height()
            )));
        }

        let src = self.image.rgba8_premul.as_slice();
        let stride = self.image.width as usize * 4;
        let row_len = rect.width as usize * 4;
        let mut out = Vec::with_capacity(row_len * rect.height as usize);
        for row in rect.y..rect.y + rect.height {
            let start = row as usize * stride + rect.x as usize * 4;
            out.extend_from_slice(&src[start..start + row_len]);
        }
        Self::from_image(PreparedImage {
            width: rect.width,
            height: rect.height,
            rgba8_premul: Arc::new(out),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/frame.rs"]
mod tests;
