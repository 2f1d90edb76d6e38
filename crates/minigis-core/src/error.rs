//! Error types shared by the core crate.

use crate::layer::LayerId;
use thiserror::Error;

/// Map engine errors.
///
/// These report precondition violations at the call site. The failing
/// operation leaves all state untouched.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Index {index} out of range for {len} layers")]
    OutOfRange { index: usize, len: usize },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid scale factor: {0}")]
    InvalidScale(f64),
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),
    #[error("GeoJSON error: {0}")]
    Ingest(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for map operations.
pub type MapResult<T> = Result<T, MapError>;
