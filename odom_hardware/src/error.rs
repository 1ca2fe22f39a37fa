use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("sensor read timeout")]
    Timeout,
    #[error("sensor disconnected: {0}")]
    Disconnected(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
