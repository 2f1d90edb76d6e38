//! Render errors.

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font registration failed: {0}")]
    FontRegistration(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
