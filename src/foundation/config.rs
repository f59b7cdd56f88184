//! Studio configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields a working
//! configuration. A handful of values can be overridden through `FANFRAME_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::font::FontSource,
    assets::templates::TemplateEntry,
    foundation::core::Canvas,
    foundation::error::{FanframeError, FanframeResult},
};

/// Overrides `caption.endpoint`.
pub const ENV_CAPTION_ENDPOINT: &str = "FANFRAME_CAPTION_ENDPOINT";
/// Overrides `segmentation.program` and `segmentation.args` (whitespace separated).
pub const ENV_SEGMENT_CMD: &str = "FANFRAME_SEGMENT_CMD";
/// Overrides `logging.level`.
pub const ENV_LOG: &str = "FANFRAME_LOG";

/// Top-level configuration for a compositing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Output canvas; both preview and export use it.
    pub canvas: Canvas,
    /// Background template set.
    pub templates: TemplateSetConfig,
    /// Font used for the caption overlay.
    pub font: FontSource,
    /// File name offered for the exported composition.
    pub export_filename: String,
    /// Caption suggestion endpoint settings.
    pub caption: CaptionConfig,
    /// Background removal command settings.
    pub segmentation: SegmentationConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Fixed, ordered set of background templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSetConfig {
    /// Directory that relative template sources resolve against.
    pub root: PathBuf,
    /// Templates in selection order.
    pub entries: Vec<TemplateEntry>,
}

/// Caption suggestion endpoint (OpenAI chat-completions compatible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    /// Model name sent with each request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// External background-removal program.
///
/// The program receives the frame as PNG on stdin and must write a PNG with alpha to stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Executable name or path.
    pub program: String,
    /// Arguments passed before any per-request options.
    pub args: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "fanframe=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::EXPORT,
            templates: TemplateSetConfig::default(),
            font: FontSource::default(),
            export_filename: "composition.png".to_string(),
            caption: CaptionConfig::default(),
            segmentation: SegmentationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TemplateSetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entries: (1..=6)
                .map(|i| TemplateEntry {
                    name: format!("template{i}"),
                    source: format!("background-templates/template{i}.webp"),
                })
                .collect(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            program: "rembg".to_string(),
            args: vec!["i".to_string(), "-".to_string(), "-".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StudioConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(s: &str) -> FanframeResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| FanframeError::serde(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// A relative `templates.root` is resolved against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> FanframeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let mut cfg = Self::from_json_str(&text)?;
        if cfg.templates.root.is_relative()
            && let Some(dir) = path.parent()
        {
            cfg.templates.root = dir.join(&cfg.templates.root);
        }
        Ok(cfg)
    }

    /// Apply `FANFRAME_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    /// Apply `FANFRAME_*` overrides from an arbitrary lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENV_CAPTION_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.caption.endpoint = endpoint.trim().to_string();
        }
        if let Some(cmd) = lookup(ENV_SEGMENT_CMD) {
            let mut parts = cmd.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                self.segmentation.program = program;
                self.segmentation.args = parts.collect();
            }
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
        self
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> FanframeResult<()> {
        self.canvas
            .validate()
            .map_err(|e| FanframeError::config(e.to_string()))?;
        if self.templates.entries.is_empty() {
            return Err(FanframeError::config("template set must not be empty"));
        }
        if self.export_filename.trim().is_empty() {
            return Err(FanframeError::config("export_filename must be non-empty"));
        }
        if !self.caption.temperature.is_finite() {
            return Err(FanframeError::config("caption.temperature must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
