//! Error types for signpadctl

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected during {0}")]
    Disconnected(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::DeviceNotFound(_) | CliError::Disconnected(_) => 2,
            CliError::ValidationError(_) | CliError::JsonError(_) => 4,
            CliError::IoError(_) | CliError::ImageError(_) => 1,
        }
    }
}
