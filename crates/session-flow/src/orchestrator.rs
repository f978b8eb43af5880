//! The session orchestrator.

use std::sync::Arc;

use tracing::{error, info, warn};

use checkpoint_store::CheckpointRecorder;
use field_locator::{standard_chains, ChainResolver};
use mail_composer::{ContentGenerator, GeneratedContent};
use mailwright_core_types::{Checkpoint, FailureKind, SessionId, SessionStatus, StepName};
use mailwright_event_bus::ProgressNotifier;
use step_runner::{StepKind, StepOutcome, StepRunner};

use crate::config::FlowConfig;
use crate::model::{MailInput, SendRequest, SessionResult};
use crate::plan::{demo_narrative, interaction_plan};
use crate::ports::{SubstrateHandle, SubstrateLauncher};

/// Why the state machine aborted.
enum DriveError {
    Step(FailureKind),
    Substrate(String),
}

impl DriveError {
    fn reason(&self) -> String {
        match self {
            DriveError::Step(kind) => kind.to_string(),
            DriveError::Substrate(message) => message.clone(),
        }
    }
}

/// Runs one automation session end to end.
///
/// Construction takes every collaborator explicitly; one orchestrator per
/// process (or per test) and no shared state between sessions beyond the
/// notifier registry.
pub struct SessionOrchestrator {
    launcher: Arc<dyn SubstrateLauncher>,
    generator: ContentGenerator,
    recorder: Arc<CheckpointRecorder>,
    notifier: ProgressNotifier,
    config: FlowConfig,
}

impl SessionOrchestrator {
    pub fn new(
        launcher: Arc<dyn SubstrateLauncher>,
        generator: ContentGenerator,
        recorder: Arc<CheckpointRecorder>,
        notifier: ProgressNotifier,
        config: FlowConfig,
    ) -> Self {
        Self {
            launcher,
            generator,
            recorder,
            notifier,
            config,
        }
    }

    pub fn notifier(&self) -> &ProgressNotifier {
        &self.notifier
    }

    /// Run a session to one of its three terminal states.
    pub async fn run(&self, request: SendRequest) -> SessionResult {
        self.run_session(SessionId::new(), request).await
    }

    /// Like [`run`](Self::run), with a caller-chosen session id so an
    /// observer can subscribe to the progress feed before the first
    /// checkpoint fires.
    pub async fn run_session(&self, session: SessionId, request: SendRequest) -> SessionResult {
        info!(session = %session, recipient = %request.recipient, "session started");

        let content = self.finalize_content(&request).await;

        let handle = match self.launcher.launch().await {
            Ok(handle) => handle,
            Err(err) => {
                let kind = FailureKind::SubstrateInitFailure(err.to_string());
                warn!(session = %session, error = %kind, "entering demo fallback");
                return self.demo_run(session, content, kind).await;
            }
        };

        let mut checkpoints = Vec::new();
        let drive_result = self
            .drive(&session, &handle, &request, &content, &mut checkpoints)
            .await;

        // Teardown is unconditional and happens exactly once, on every
        // real-browser exit path.
        if let Err(err) = handle.control.close().await {
            warn!(session = %session, error = %err, "browser close failed");
        }

        match drive_result {
            Ok(()) => {
                info!(session = %session, "session succeeded");
                SessionResult {
                    status: SessionStatus::Success,
                    message: "Email sent successfully using generated content".to_string(),
                    session_id: session.0.clone(),
                    checkpoints,
                    generated_content: Some(content),
                    failure_reason: None,
                }
            }
            Err(err) => {
                let reason = err.reason();
                error!(session = %session, %reason, "session failed");
                SessionResult {
                    status: SessionStatus::Error,
                    message: format!("Automation failed: {reason}"),
                    session_id: session.0.clone(),
                    checkpoints,
                    generated_content: Some(content),
                    failure_reason: Some(reason),
                }
            }
        }
    }

    /// Finalize content before any browser work: generated from the
    /// instruction, or wrapped as-is when pre-composed.
    async fn finalize_content(&self, request: &SendRequest) -> GeneratedContent {
        match &request.input {
            MailInput::Instruction(instruction) => {
                self.generator
                    .generate(instruction, Some(&request.recipient))
                    .await
            }
            MailInput::Composed { subject, body } => GeneratedContent {
                subject: subject.clone(),
                body: body.clone(),
                email_type: "precomposed".to_string(),
                tone: "custom".to_string(),
                key_points: Vec::new(),
                ai_generated: false,
            },
        }
    }

    /// Execute the state machine against a live browser context.
    async fn drive(
        &self,
        session: &SessionId,
        handle: &SubstrateHandle,
        request: &SendRequest,
        content: &GeneratedContent,
        checkpoints: &mut Vec<Checkpoint>,
    ) -> Result<(), DriveError> {
        let resolver = ChainResolver::new(Arc::clone(&handle.probe));
        let runner = StepRunner::new(
            resolver,
            Arc::clone(&handle.driver),
            self.config.step_policy.clone(),
        );

        if let Err(err) = handle.control.navigate(&self.config.mail_url).await {
            self.record_error(session, handle, checkpoints).await;
            return Err(DriveError::Substrate(err.to_string()));
        }
        self.record_step(session, handle, StepName::Start, checkpoints)
            .await;

        for planned in interaction_plan(request, content) {
            for (field, kind) in &planned.actions {
                let chain = standard_chains(*field);
                let outcome = match runner.execute(&chain, kind).await {
                    Ok(outcome) => outcome,
                    Err(step_error) => {
                        self.record_error(session, handle, checkpoints).await;
                        return Err(DriveError::Substrate(step_error.to_string()));
                    }
                };

                match (kind, outcome) {
                    // The security probe finding its target is the failure.
                    (StepKind::Probe, StepOutcome::Ack { matched: true }) => {
                        self.record_error(session, handle, checkpoints).await;
                        return Err(DriveError::Step(FailureKind::SecurityChallenge));
                    }
                    (StepKind::Probe, StepOutcome::Ack { matched: false }) => {}
                    (_, StepOutcome::Ack { .. }) => {}
                    (_, StepOutcome::Failed(failure)) => {
                        self.record_error(session, handle, checkpoints).await;
                        return Err(DriveError::Step(failure.into_failure_kind()));
                    }
                }
            }
            self.record_step(session, handle, planned.state, checkpoints)
                .await;
        }

        tokio::time::sleep(self.config.verify_settle).await;
        self.record_step(session, handle, StepName::Verify, checkpoints)
            .await;
        Ok(())
    }

    /// Record and publish one checkpoint; capture failures degrade silently.
    async fn record_step(
        &self,
        session: &SessionId,
        handle: &SubstrateHandle,
        step: StepName,
        checkpoints: &mut Vec<Checkpoint>,
    ) {
        let capture = match handle.control.screenshot().await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(session = %session, step = step.as_str(), error = %err, "capture failed");
                None
            }
        };
        let checkpoint = self.recorder.record(session, step, capture).await;
        self.notifier.publish(session, checkpoint.clone());
        checkpoints.push(checkpoint);
    }

    async fn record_error(
        &self,
        session: &SessionId,
        handle: &SubstrateHandle,
        checkpoints: &mut Vec<Checkpoint>,
    ) {
        self.record_step(session, handle, StepName::Error, checkpoints)
            .await;
    }

    /// Fabricate the full checkpoint narrative without a browser.
    async fn demo_run(
        &self,
        session: SessionId,
        content: GeneratedContent,
        kind: FailureKind,
    ) -> SessionResult {
        let mut checkpoints = Vec::new();
        for step in demo_narrative() {
            let checkpoint = self.recorder.record_placeholder(&session, step).await;
            self.notifier.publish(&session, checkpoint.clone());
            checkpoints.push(checkpoint);
        }

        SessionResult {
            status: SessionStatus::Demo,
            message: "Demo mode: automation substrate unavailable; showing simulated checkpoints"
                .to_string(),
            session_id: session.0.clone(),
            checkpoints,
            generated_content: Some(content),
            failure_reason: Some(kind.to_string()),
        }
    }
}
