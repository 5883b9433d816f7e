use thiserror::Error;

/// Errors that halt a caller. Reference rejections and ambiguity are values
/// (`ResolutionResult`), never errors.
#[derive(Debug, Error)]
pub enum ScriptureLmError {
    #[error("Configuration mismatch: {0}")]
    ConfigMismatch(String),
    #[error("Canon data failed its consistency check: {0}")]
    CanonData(String),
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    SafeTensors(#[from] safetensors::SafeTensorError),
    #[error(transparent)]
    Ndarray(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, ScriptureLmError>;
