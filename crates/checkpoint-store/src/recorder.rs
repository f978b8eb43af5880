//! Checkpoint recorder.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use mailwright_core_types::{Checkpoint, SessionId, StepName};

use crate::placeholder::placeholder_svg;
use crate::sink::ArtifactSink;

/// Records checkpoints and routes their artifacts into a sink.
///
/// Artifact names are `{session}_{step}_{timestamp}` so repeated steps and
/// concurrent sessions never collide.
pub struct CheckpointRecorder {
    sink: Arc<dyn ArtifactSink>,
}

impl CheckpointRecorder {
    pub fn new(sink: Arc<dyn ArtifactSink>) -> Self {
        Self { sink }
    }

    /// Record a checkpoint from a real capture.
    ///
    /// `capture` is the screenshot bytes when the substrate produced them;
    /// `None` (capture failed upstream) and sink failures both degrade to a
    /// checkpoint without an artifact reference.
    pub async fn record(
        &self,
        session: &SessionId,
        step: StepName,
        capture: Option<Vec<u8>>,
    ) -> Checkpoint {
        let artifact_ref = match capture {
            Some(bytes) => {
                let name = artifact_name(session, step, "png");
                match self.sink.persist(&name, &bytes).await {
                    Ok(reference) => Some(reference),
                    Err(err) => {
                        warn!(step = step.as_str(), error = %err, "artifact write failed; checkpoint kept without artifact");
                        None
                    }
                }
            }
            None => {
                warn!(step = step.as_str(), "capture unavailable; checkpoint kept without artifact");
                None
            }
        };

        debug!(step = step.as_str(), has_artifact = artifact_ref.is_some(), "checkpoint recorded");
        Checkpoint::new(step, artifact_ref)
    }

    /// Record a checkpoint with a synthesized placeholder artifact.
    ///
    /// Used by demo sessions, where no real capture exists but the caller
    /// still receives a step-by-step narrative.
    pub async fn record_placeholder(&self, session: &SessionId, step: StepName) -> Checkpoint {
        let stamp = timestamp();
        let bytes = placeholder_svg(session, step, &stamp);
        let name = format!("{}_{}_{}.svg", session, step.as_str(), stamp);
        let artifact_ref = match self.sink.persist(&name, &bytes).await {
            Ok(reference) => Some(reference),
            Err(err) => {
                warn!(step = step.as_str(), error = %err, "placeholder write failed; checkpoint kept without artifact");
                None
            }
        };
        Checkpoint::new(step, artifact_ref)
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S%3f").to_string()
}

fn artifact_name(session: &SessionId, step: StepName, ext: &str) -> String {
    format!("{}_{}_{}.{}", session, step.as_str(), timestamp(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SinkError;
    use crate::sink::FsArtifactSink;
    use async_trait::async_trait;

    struct RefusingSink;

    #[async_trait]
    impl ArtifactSink for RefusingSink {
        async fn persist(&self, _name: &str, _bytes: &[u8]) -> Result<String, SinkError> {
            Err(SinkError::Rejected("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn successful_capture_yields_artifact_reference() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CheckpointRecorder::new(Arc::new(FsArtifactSink::new(dir.path())));
        let session = SessionId::new();

        let cp = recorder
            .record(&session, StepName::Send, Some(b"shot".to_vec()))
            .await;

        let reference = cp.artifact_ref.expect("artifact reference");
        assert!(reference.contains(&session.0));
        assert!(reference.contains("send"));
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let recorder = CheckpointRecorder::new(Arc::new(RefusingSink));
        let session = SessionId::new();

        let cp = recorder
            .record(&session, StepName::Start, Some(b"shot".to_vec()))
            .await;

        assert!(cp.artifact_ref.is_none());
        assert_eq!(cp.step, StepName::Start);
    }

    #[tokio::test]
    async fn missing_capture_still_records() {
        let recorder = CheckpointRecorder::new(Arc::new(RefusingSink));
        let cp = recorder.record(&SessionId::new(), StepName::Verify, None).await;
        assert!(cp.artifact_ref.is_none());
    }

    #[tokio::test]
    async fn placeholder_artifacts_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CheckpointRecorder::new(Arc::new(FsArtifactSink::new(dir.path())));
        let session = SessionId::new();

        let cp = recorder
            .record_placeholder(&session, StepName::OpenComposer)
            .await;

        let reference = cp.artifact_ref.expect("placeholder reference");
        assert!(reference.ends_with(".svg"));
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn repeated_steps_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CheckpointRecorder::new(Arc::new(FsArtifactSink::new(dir.path())));
        let session = SessionId::new();

        let a = recorder
            .record(&session, StepName::Send, Some(b"one".to_vec()))
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let b = recorder
            .record(&session, StepName::Send, Some(b"two".to_vec()))
            .await;

        assert_ne!(a.artifact_ref, b.artifact_ref);
    }
}
