//! Step kinds and outcomes.

use field_locator::FieldKind;
use mailwright_core_types::FailureKind;

/// What the step does to its target once resolved.
#[derive(Clone, Debug)]
pub enum StepKind {
    /// Clear the target, insert the payload text, settle.
    TypeText { text: String, clear: bool },
    /// Activate the target, settle.
    Click,
    /// Resolve only; report whether the target exists. Used by the
    /// security-check state, which must not interact with its match.
    Probe,
}

impl StepKind {
    pub fn type_text(text: impl Into<String>) -> Self {
        StepKind::TypeText {
            text: text.into(),
            clear: true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::TypeText { .. } => "type_text",
            StepKind::Click => "click",
            StepKind::Probe => "probe",
        }
    }
}

/// Why a step failed. Closed set; the orchestrator maps these onto the
/// session failure taxonomy verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepFailure {
    /// Every descriptor in the chain was exhausted.
    TargetNotFound { field: FieldKind },
    /// Resolved, but disabled or hidden at the moment of action.
    NotInteractable { field: FieldKind },
    /// The action itself exceeded its deadline.
    ActionTimeout { field: FieldKind },
}

impl StepFailure {
    pub fn field(&self) -> FieldKind {
        match self {
            StepFailure::TargetNotFound { field }
            | StepFailure::NotInteractable { field }
            | StepFailure::ActionTimeout { field } => *field,
        }
    }

    pub fn into_failure_kind(self) -> FailureKind {
        let field = self.field().name().to_string();
        match self {
            StepFailure::TargetNotFound { .. } => FailureKind::TargetNotFound(field),
            StepFailure::NotInteractable { .. } => FailureKind::NotInteractable(field),
            StepFailure::ActionTimeout { .. } => FailureKind::ActionTimeout(field),
        }
    }
}

/// Result of one step. `Probe` steps acknowledge with the match outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Interaction performed (for probes: resolution finished); for probes
    /// `matched` reports whether the indicator was present.
    Ack { matched: bool },
    Failed(StepFailure),
}

impl StepOutcome {
    pub fn ack() -> Self {
        StepOutcome::Ack { matched: true }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, StepOutcome::Ack { .. })
    }
}
