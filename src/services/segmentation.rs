use std::process::Command;

use crate::{
    foundation::config::SegmentationConfig,
    foundation::error::{FanframeError, FanframeResult},
    model::frame::{Cutout, Frame},
    services::process::run_with_stdin,
};

/// Per-request segmentation options.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Extra arguments appended to the configured command line.
    pub extra_args: Vec<String>,
}

/// Background removal collaborator.
///
/// Implementations may block; the session never holds a borrow across the call.
pub trait Segmenter: Send + Sync {
    /// Produce a cutout with transparency from `frame`.
    fn remove_background(
        &self,
        frame: &Frame,
        options: &SegmentationOptions,
    ) -> FanframeResult<Cutout>;
}

impl<F> Segmenter for F
where
    F: Fn(&Frame, &SegmentationOptions) -> FanframeResult<Cutout> + Send + Sync,
{
    fn remove_background(
        &self,
        frame: &Frame,
        options: &SegmentationOptions,
    ) -> FanframeResult<Cutout> {
        self(frame, options)
    }
}

/// Runs an external program: frame PNG on stdin, cutout PNG on stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSegmenter {
    program: String,
    args: Vec<String>,
}

impl CommandSegmenter {
    /// Explicit program and leading arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// From the `segmentation` config section.
    pub fn from_config(cfg: &SegmentationConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.args.clone())
    }

    /// Program to run.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Segmenter for CommandSegmenter {
    #[tracing::instrument(skip_all, fields(program = %self.program))]
    fn remove_background(
        &self,
        frame: &Frame,
        options: &SegmentationOptions,
    ) -> FanframeResult<Cutout> {
        let png = frame.to_png_bytes()?;
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(&options.extra_args);

        let out = run_with_stdin(cmd, png, &self.program)?;
        if out.stdout.is_empty() {
            return Err(FanframeError::service(format!(
                "{} produced no image",
                self.program
            )));
        }
        let cutout = Cutout::from_png(&out.stdout).map_err(|e| {
            FanframeError::service(format!("{} returned an unreadable image: {e}", self.program))
        })?;
        tracing::debug!(
            width = cutout.width(),
            height = cutout.height(),
            "cutout received"
        );
        Ok(cutout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/segmentation.rs"]
mod tests;
