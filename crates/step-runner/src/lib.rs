//! Step runner: one logical interaction against one resolved UI target.
//!
//! The runner resolves a target through the field locator, performs the
//! interaction, and pauses for a settle delay so asynchronous UI reactions
//! can catch up. It never retries beyond what the resolver already does;
//! a failed step fails the session at the orchestrator level.

pub mod errors;
pub mod model;
pub mod policy;
pub mod ports;
pub mod runner;

pub use errors::StepError;
pub use model::{StepFailure, StepKind, StepOutcome};
pub use policy::StepPolicy;
pub use ports::DriverPort;
pub use runner::StepRunner;
