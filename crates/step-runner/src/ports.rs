//! Port traits the runner drives.

use async_trait::async_trait;
use field_locator::ElementHandle;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// The action did not complete within the substrate's own deadline.
    #[error("action timed out: {0}")]
    Timeout(String),

    /// The element vanished or became inert between resolution and action.
    #[error("element gone: {0}")]
    Gone(String),

    /// Transport or protocol failure talking to the substrate.
    #[error("substrate failure: {0}")]
    Substrate(String),
}

/// Actions against a resolved element.
#[async_trait]
pub trait DriverPort: Send + Sync {
    async fn clear(&self, target: &ElementHandle) -> Result<(), DriverError>;
    async fn type_text(&self, target: &ElementHandle, text: &str) -> Result<(), DriverError>;
    async fn click(&self, target: &ElementHandle) -> Result<(), DriverError>;
}
