use models::errors::ModelError;
use thiserror::Error;

/// Business errors for the review workflow
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl ReviewError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ReviewError::Validation(_) => 2001,
            ReviewError::Conflict(_) => 2002,
            ReviewError::NotFound(_) => 2003,
            ReviewError::InvalidState(_) => 2004,
            ReviewError::Repository(_) => 2200,
        }
    }

    pub fn already_reviewed() -> Self { ReviewError::Conflict("already reviewed".into()) }
}

impl From<ModelError> for ReviewError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => ReviewError::Validation(m),
            ModelError::NotFound(m) => ReviewError::NotFound(m),
            ModelError::Conflict(_) => ReviewError::already_reviewed(),
            ModelError::Db(m) => ReviewError::Repository(m),
        }
    }
}
