//! Error types for the locator system.
//!
//! Exhausting a chain is *not* an error: the resolver reports that through
//! [`crate::resolver::Resolution::NotFound`], which callers handle as a
//! normal outcome. Errors here are substrate faults only.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// The page probe itself failed (transport loss, page gone).
    #[error("probe failed: {0}")]
    Probe(String),

    /// A descriptor could not be evaluated at all.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
}
