//! Error types for the preparation pipeline.

use thiserror::Error;

/// Result type alias using OceanError.
pub type OceanResult<T> = Result<T, OceanError>;

/// Primary error type shared by every pipeline stage.
///
/// None of these are retried inside the core; each is terminal to the
/// operation that raised it.
#[derive(Debug, Error)]
pub enum OceanError {
    // === Data model errors ===
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("invalid axis '{0}'")]
    InvalidAxis(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("undefined value in {what} at flat index {index}")]
    UndefinedValue { what: String, index: usize },

    // === Algorithm errors ===
    #[error("insufficient data: {message} (need {required}, found {found})")]
    InsufficientData {
        required: usize,
        found: usize,
        message: String,
    },

    #[error("projection domain error: {0}")]
    ProjectionDomain(String),

    #[error("interpolation error: {0}")]
    Interpolation(String),

    // === Infrastructure errors ===
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OceanError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InsufficientData error.
    pub fn insufficient_data(required: usize, found: usize, message: impl Into<String>) -> Self {
        Self::InsufficientData {
            required,
            found,
            message: message.into(),
        }
    }

    /// Create an UndefinedValue error.
    pub fn undefined_value(what: impl Into<String>, index: usize) -> Self {
        Self::UndefinedValue {
            what: what.into(),
            index,
        }
    }

    /// Create a ProjectionDomain error.
    pub fn projection_domain(msg: impl Into<String>) -> Self {
        Self::ProjectionDomain(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Short machine-readable code, used in structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            OceanError::ShapeMismatch { .. } => "shape_mismatch",
            OceanError::InvalidAxis(_) => "invalid_axis",
            OceanError::FieldNotFound(_) => "field_not_found",
            OceanError::UndefinedValue { .. } => "undefined_value",
            OceanError::InsufficientData { .. } => "insufficient_data",
            OceanError::ProjectionDomain(_) => "projection_domain",
            OceanError::Interpolation(_) => "interpolation",
            OceanError::UnsupportedFormat(_) => "unsupported_format",
            OceanError::InvalidConfig(_) => "invalid_config",
            OceanError::Io(_) => "io",
            OceanError::Json(_) => "json",
        }
    }
}
