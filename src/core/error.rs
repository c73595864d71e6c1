use thiserror::Error;

/// Errors that can occur while importing, matching, or validating.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KonteraError {
    /// Input could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A matching operation was asked to act on something it cannot.
    #[error("matching error: {0}")]
    Matching(String),

    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// A single validation error with field name and message.
///
/// Messages are user-facing Swedish, since they surface directly in the
/// host application's forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the invalid field (e.g. "from_account").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for KonteraError {
    fn from(err: ValidationError) -> Self {
        KonteraError::Validation(err.to_string())
    }
}
