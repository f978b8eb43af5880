//! Checkpoint recording.
//!
//! Checkpoints are diagnostic, not critical path: a failed capture or a
//! failed artifact write is logged and the checkpoint still materializes
//! (without an artifact reference). Recording never aborts a session.

pub mod errors;
pub mod placeholder;
pub mod recorder;
pub mod sink;

pub use errors::SinkError;
pub use recorder::CheckpointRecorder;
pub use sink::{ArtifactSink, FsArtifactSink};
