/// Convenience result type used across fanframe.
pub type FanframeResult<T> = Result<T, FanframeError>;

/// Top-level error taxonomy used by compositor, session and collaborator APIs.
#[derive(thiserror::Error, Debug)]
pub enum FanframeError {
    /// Invalid user-provided data or a missing required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An image, font or frame could not be loaded or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rasterization or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// An external collaborator (segmentation, captioning) failed.
    #[error("service error: {0}")]
    Service(String),

    /// Configuration could not be read or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FanframeError {
    /// Build a [`FanframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FanframeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FanframeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FanframeError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`FanframeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FanframeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
