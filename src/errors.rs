use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::types::Status;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid hash signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid hash parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid filter configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Malformed filter record: {0}")]
    MalformedRecord(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ValidationError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Protocol status reported to the client for this error.
    pub fn status(&self) -> Status {
        match self {
            AppError::BadRequest(_) | AppError::InvalidUrl(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::InvalidSignature(_)
            | AppError::InvalidParameter(_)
            | AppError::InvalidConfiguration(_)
            | AppError::MalformedRecord(_)
            | AppError::Validation(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Internal(_) => Status::InternalServerError,
        }
    }
}
