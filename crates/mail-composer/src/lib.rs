//! Content generation for the compose flow.
//!
//! Turns a natural-language instruction into structured email content.
//! Two-phase when a generative backend is configured (interpret, then
//! polish with recipient context); every backend or parsing failure falls
//! back to a deterministic template. `generate` never errors past its own
//! boundary, and subject/body are non-empty for any input.

pub mod backend;
pub mod generator;
pub mod model;
pub mod parse;

pub use backend::{BackendConfig, BackendError, GenerativeBackend, HttpGenerativeBackend};
pub use generator::ContentGenerator;
pub use model::GeneratedContent;
