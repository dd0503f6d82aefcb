use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid store url: {0}")]
    InvalidUrl(String),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Async store queue is full")]
    QueueFull,

    #[error("Async store worker is closed")]
    WorkerClosed,

    #[error("Async store worker join error: {0}")]
    WorkerJoin(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<tokio::sync::mpsc::error::TrySendError<T>> for StoreError {
    fn from(err: tokio::sync::mpsc::error::TrySendError<T>) -> Self {
        match err {
            tokio::sync::mpsc::error::TrySendError::Full(_) => Self::QueueFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => Self::WorkerClosed,
        }
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for StoreError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::WorkerClosed
    }
}
