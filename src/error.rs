use crate::config::ConfigError;
use crate::port::PortError;
use thiserror::Error;

/// A specialized `Result` type for the binary.
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error type.
///
/// Port operations record their own errors on the port; this type only
/// carries the failures that stop the client from running at all.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serial port error: {0}")]
    Port(#[from] PortError),

    #[error("Cannot start logging: {0}")]
    Logging(String),
}
