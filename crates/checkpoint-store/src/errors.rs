//! Sink error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("artifact write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected artifact: {0}")]
    Rejected(String),
}
