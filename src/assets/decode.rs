use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    foundation::core::Canvas,
    foundation::error::{FanframeError, FanframeResult},
    foundation::math::premultiply_rgba8_in_place,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> FanframeResult<Self> {
        premultiply_rgba8_in_place(&mut rgba);
        let img = Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        };
        img.ensure_loaded()?;
        Ok(img)
    }

    /// Fail unless the image has non-zero dimensions and a matching pixel buffer.
    pub fn ensure_loaded(&self) -> FanframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FanframeError::decode(format!(
                "image has empty dimensions {}x{}",
                self.width, self.height
            )));
        }
        let expected = (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4);
        if self.rgba8_premul.len() != expected {
            return Err(FanframeError::decode(format!(
                "image byte length mismatch: got {}, expected {expected}",
                self.rgba8_premul.len()
            )));
        }
        Ok(())
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8_premul.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decode any raster format supported by `image` into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FanframeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FanframeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PreparedImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> FanframeResult<usvg::Tree> {
    let mut opts = usvg::Options::default();
    opts.fontdb_mut().load_system_fonts();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FanframeError::decode(format!("parse svg tree: {e}")))
}

/// Rasterize an SVG tree stretched to exactly `size`.
pub fn rasterize_svg(tree: &usvg::Tree, size: Canvas) -> FanframeResult<PreparedImage> {
    size.validate()?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width, size.height)
        .ok_or_else(|| FanframeError::render("failed to allocate svg pixmap"))?;

    let tree_size = tree.size();
    if !(tree_size.width() > 0.0 && tree_size.height() > 0.0) {
        return Err(FanframeError::decode("svg has invalid width/height"));
    }
    let sx = (size.width as f32) / tree_size.width();
    let sy = (size.height as f32) / tree_size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width: size.width,
        height: size.height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Whether `bytes` look like an SVG document rather than a raster image.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Decode image bytes, rasterizing SVG documents at `svg_size`.
pub fn decode_any(bytes: &[u8], svg_size: Canvas) -> FanframeResult<PreparedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        rasterize_svg(&tree, svg_size)
    } else {
        decode_image(bytes)
    }
}

/// Read and decode an image file, rasterizing SVG documents at `svg_size`.
pub fn load_image_file(path: &Path, svg_size: Canvas) -> FanframeResult<PreparedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image bytes from '{}'", path.display()))?;
    decode_any(&bytes, svg_size).map_err(|e| match e {
        FanframeError::Decode(msg) => {
            FanframeError::decode(format!("'{}': {msg}", path.display()))
        }
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
