use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("upstream returned status {status} for {resource}")]
    Status {
        resource: String,
        status: reqwest::StatusCode,
    },
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        AppError::Malformed(msg.into())
    }
}
