//! Shared primitives for the mailwright session engine.
//!
//! Everything here is serializable and crate-agnostic: session identifiers,
//! the fixed step vocabulary, the checkpoint model, and the failure
//! taxonomy that the orchestrator surfaces to callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for one automation session.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed vocabulary of step names a checkpoint can carry.
///
/// The first ten map one-to-one onto the orchestrator's machine states;
/// the content steps appear only in the demo narrative, and `Error` marks
/// the terminal checkpoint of a failed session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    Start,
    IdentifyAccount,
    EnterCredential,
    SecurityCheck,
    OpenComposer,
    FillRecipient,
    FillSubject,
    FillBody,
    Send,
    Verify,
    AiAnalysis,
    ContentGeneration,
    Error,
}

impl StepName {
    /// Stable snake_case name used in artifact filenames and event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Start => "start",
            StepName::IdentifyAccount => "identify_account",
            StepName::EnterCredential => "enter_credential",
            StepName::SecurityCheck => "security_check",
            StepName::OpenComposer => "open_composer",
            StepName::FillRecipient => "fill_recipient",
            StepName::FillSubject => "fill_subject",
            StepName::FillBody => "fill_body",
            StepName::Send => "send",
            StepName::Verify => "verify",
            StepName::AiAnalysis => "ai_analysis",
            StepName::ContentGeneration => "content_generation",
            StepName::Error => "error",
        }
    }

    /// Human-readable description attached to every checkpoint.
    pub fn description(&self) -> &'static str {
        match self {
            StepName::Start => "Starting webmail automation",
            StepName::IdentifyAccount => "Entering account identifier",
            StepName::EnterCredential => "Entering account credential",
            StepName::SecurityCheck => "Checking for security challenges",
            StepName::OpenComposer => "Opening compose window",
            StepName::FillRecipient => "Entering recipient address",
            StepName::FillSubject => "Entering message subject",
            StepName::FillBody => "Entering message body",
            StepName::Send => "Sending the message",
            StepName::Verify => "Verifying the message was sent",
            StepName::AiAnalysis => "Analyzing the instruction",
            StepName::ContentGeneration => "Generating message content",
            StepName::Error => "Error occurred during automation",
        }
    }

    /// Machine states in execution order, one checkpoint each on success.
    pub fn machine_states() -> &'static [StepName] {
        &[
            StepName::Start,
            StepName::IdentifyAccount,
            StepName::EnterCredential,
            StepName::SecurityCheck,
            StepName::OpenComposer,
            StepName::FillRecipient,
            StepName::FillSubject,
            StepName::FillBody,
            StepName::Send,
            StepName::Verify,
        ]
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded observation of session progress.
///
/// Checkpoints are append-only per session; order equals execution order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub step: StepName,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Opaque retrievable reference to the artifact, when capture succeeded.
    pub artifact_ref: Option<String>,
}

impl Checkpoint {
    pub fn new(step: StepName, artifact_ref: Option<String>) -> Self {
        Self {
            step,
            description: step.description().to_string(),
            timestamp: Utc::now(),
            artifact_ref,
        }
    }
}

/// Terminal status of a session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Success,
    Error,
    Demo,
}

/// Closed failure taxonomy surfaced through the session's terminal error path.
///
/// `BackendUnavailable` never reaches a caller (the composer recovers it
/// locally) and `SubstrateInitFailure` is recovered into a demo session;
/// both exist here so every layer names failures the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FailureKind {
    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("target not interactable: {0}")]
    NotInteractable(String),

    #[error("action timed out: {0}")]
    ActionTimeout(String),

    #[error("security challenge detected; manual intervention required")]
    SecurityChallenge,

    #[error("generative backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("automation substrate failed to start: {0}")]
    SubstrateInitFailure(String),
}
