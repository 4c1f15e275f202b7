use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_UNAVAILABLE",
            AppError::CorruptData(_) => "CORRUPT_DATA",
            AppError::MalformedCursor(_) => "INVALID_CURSOR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn not_found_post(post_id: &str) -> Self {
        AppError::NotFound(format!("post {post_id}"))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
