/// Convenience result type used across gradix.
pub type GradixResult<T> = Result<T, GradixError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum GradixError {
    /// Invalid user-provided configuration or palette data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while sampling or clustering an uploaded image.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Errors while compositing or post-processing a pixel buffer.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GradixError {
    /// Build a [`GradixError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GradixError::Extraction`] value.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Build a [`GradixError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
