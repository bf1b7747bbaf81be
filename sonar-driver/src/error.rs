use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SonarError {
    #[error("Serial port error: {0}")]
    SerialError(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Operation timed out")]
    TimeoutError,

    #[error("Failed to spawn {0} thread: {1}")]
    ThreadSpawn(&'static str, io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
