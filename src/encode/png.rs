use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::error::{FanframeError, FanframeResult},
    foundation::math::unpremultiply_rgba8_in_place,
    render::backend::RasterImage,
};

/// Default download name of an exported composition.
pub const EXPORT_FILENAME: &str = "composition.png";

/// An encoded still ready to be saved or offered for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// PNG bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Suggested file name.
    pub filename: String,
}

impl EncodedImage {
    /// Write to `dir/filename`, returning the path written.
    pub fn write_to_dir(&self, dir: &Path) -> FanframeResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write '{}'", path.display()))?;
        Ok(path)
    }
}

/// Encode `raster` as a straight-alpha PNG.
pub fn encode_png(raster: &RasterImage, filename: &str) -> FanframeResult<EncodedImage> {
    let name = filename.trim();
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(FanframeError::validation(format!(
            "export filename \"{filename}\" must be a plain file name"
        )));
    }

    let mut rgba = raster.data.clone();
    if raster.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    let img = image::RgbaImage::from_raw(raster.width, raster.height, rgba)
        .ok_or_else(|| FanframeError::render("raster buffer does not match its dimensions"))?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| FanframeError::render(format!("encode png: {e}")))?;

    Ok(EncodedImage {
        bytes,
        width: raster.width,
        height: raster.height,
        filename: name.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
