//! Session orchestration.
//!
//! Sequences content generation, browser acquisition, the fixed step
//! sequence, and teardown. A session always reaches one of three terminal
//! states (`success`, `error`, `demo`) with a full checkpoint narrative;
//! the caller is never left with a bare error.

pub mod config;
pub mod model;
pub mod orchestrator;
pub mod plan;
pub mod ports;

pub use config::FlowConfig;
pub use model::{MailInput, SendRequest, SessionResult};
pub use orchestrator::SessionOrchestrator;
pub use ports::{SubstrateControl, SubstrateError, SubstrateHandle, SubstrateLauncher};
