//! Step-level error type.
//!
//! `StepOutcome::Failed` covers expected interaction failures; `StepError`
//! is reserved for substrate faults that the session surfaces through its
//! terminal error path.

use thiserror::Error;

use crate::ports::DriverError;
use field_locator::LocatorError;

#[derive(Debug, Error, Clone)]
pub enum StepError {
    #[error("locator substrate fault: {0}")]
    Locator(#[from] LocatorError),

    #[error("driver substrate fault: {0}")]
    Driver(String),
}

impl From<DriverError> for StepError {
    fn from(err: DriverError) -> Self {
        StepError::Driver(err.to_string())
    }
}
