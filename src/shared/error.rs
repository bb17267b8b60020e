use thiserror::Error;

/// Error taxonomy for the sync core.
///
/// `Aborted` is special: it marks cooperative cancellation and is always
/// non-fatal. Services absorb it at their boundary with a log instead of
/// surfacing it to the UI layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(String),
    #[error("remote error {status}: {status_text}")]
    Remote { status: u16, status_text: String },
    #[error("request aborted")]
    Aborted,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, AppError::Aborted)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}
