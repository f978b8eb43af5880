//! Substrate ports.
//!
//! One acquired browser context is exclusively owned by one session for its
//! lifetime. The handle splits into the probe the resolver walks, the driver
//! the step runner acts through, and the control surface the orchestrator
//! uses for navigation, capture, and teardown.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use field_locator::PageProbe;
use step_runner::DriverPort;

#[derive(Debug, Error, Clone)]
pub enum SubstrateError {
    /// The browser/driver could not start at all. Recovered into demo mode.
    #[error("substrate launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("close failed: {0}")]
    Close(String),
}

/// Session-level control of the browser context.
#[async_trait]
pub trait SubstrateControl: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), SubstrateError>;
    async fn screenshot(&self) -> Result<Vec<u8>, SubstrateError>;
    async fn close(&self) -> Result<(), SubstrateError>;
}

/// An acquired browser context, split along the three port seams.
///
/// Adapters implement all three traits on one type and hand out clones of
/// the same `Arc`.
#[derive(Clone)]
pub struct SubstrateHandle {
    pub probe: Arc<dyn PageProbe>,
    pub driver: Arc<dyn DriverPort>,
    pub control: Arc<dyn SubstrateControl>,
}

impl SubstrateHandle {
    pub fn from_parts(
        probe: Arc<dyn PageProbe>,
        driver: Arc<dyn DriverPort>,
        control: Arc<dyn SubstrateControl>,
    ) -> Self {
        Self {
            probe,
            driver,
            control,
        }
    }
}

/// Acquires a fresh browser context per session.
#[async_trait]
pub trait SubstrateLauncher: Send + Sync {
    async fn launch(&self) -> Result<SubstrateHandle, SubstrateError>;
}
