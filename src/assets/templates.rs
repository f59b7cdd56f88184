use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    assets::decode::{PreparedImage, load_image_file},
    foundation::config::TemplateSetConfig,
    foundation::core::Canvas,
    foundation::error::{FanframeError, FanframeResult},
};

/// One selectable background template.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateEntry {
    /// Display name.
    pub name: String,
    /// Image path relative to the template root.
    pub source: String,
}

/// Index into the fixed template set.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TemplateId(pub usize);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only template set with a decode cache.
///
/// Entries never change after construction; decoded images are cached per [`TemplateId`].
#[derive(Clone, Debug)]
pub struct TemplateLibrary {
    root: PathBuf,
    entries: Vec<TemplateEntry>,
    svg_size: Canvas,
    cache: HashMap<TemplateId, PreparedImage>,
}

impl TemplateLibrary {
    /// Build from configuration. SVG templates rasterize at `canvas`.
    pub fn from_config(cfg: &TemplateSetConfig, canvas: Canvas) -> FanframeResult<Self> {
        Self::new(cfg.root.clone(), cfg.entries.clone(), canvas)
    }

    /// Build from an explicit root and entry list.
    pub fn new(
        root: impl Into<PathBuf>,
        entries: Vec<TemplateEntry>,
        canvas: Canvas,
    ) -> FanframeResult<Self> {
        if entries.is_empty() {
            return Err(FanframeError::validation("template set must not be empty"));
        }
        for e in &entries {
            normalize_rel_path(&e.source)?;
        }
        Ok(Self {
            root: root.into(),
            entries,
            svg_size: canvas,
            cache: HashMap::new(),
        })
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in selection order.
    pub fn entries(&self) -> impl Iterator<Item = (TemplateId, &TemplateEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TemplateId(i), e))
    }

    /// Validate `id` against the set.
    pub fn check(&self, id: TemplateId) -> FanframeResult<()> {
        self.entry(id).map(|_| ())
    }

    /// Lookup an entry.
    pub fn entry(&self, id: TemplateId) -> FanframeResult<&TemplateEntry> {
        self.entries.get(id.0).ok_or_else(|| {
            FanframeError::validation(format!(
                "unknown template {id} (set has {} entries)",
                self.entries.len()
            ))
        })
    }

    /// Filesystem path of a template.
    pub fn path_for(&self, id: TemplateId) -> FanframeResult<PathBuf> {
        let entry = self.entry(id)?;
        Ok(self.root.join(Path::new(&normalize_rel_path(&entry.source)?)))
    }

    /// Decode (or fetch from cache) the template image.
    #[tracing::instrument(skip(self))]
    pub fn load(&mut self, id: TemplateId) -> FanframeResult<PreparedImage> {
        if let Some(img) = self.cache.get(&id) {
            return Ok(img.clone());
        }
        let path = self.path_for(id)?;
        let img = load_image_file(&path, self.svg_size)?;
        img.ensure_loaded()?;
        tracing::debug!(width = img.width, height = img.height, "template decoded");
        self.cache.insert(id, img.clone());
        Ok(img)
    }

    /// Seed the cache with an already decoded image for `id`.
    pub fn preload(&mut self, id: TemplateId, image: PreparedImage) -> FanframeResult<()> {
        self.check(id)?;
        image.ensure_loaded()?;
        self.cache.insert(id, image);
        Ok(())
    }
}

/// Normalize and validate template-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> FanframeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(FanframeError::validation("template paths must be relative"));
    }
    if s.is_empty() {
        return Err(FanframeError::validation("template path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FanframeError::validation(
                "template paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FanframeError::validation(
            "template path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/templates.rs"]
mod tests;
