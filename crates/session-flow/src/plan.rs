//! The fixed step plan.
//!
//! State order is the contract: `Start` and `Verify` are handled by the
//! orchestrator directly (navigation and final settle), every state in
//! between maps to one or two executor actions. The plan is data derived
//! from the request and the finalized content.

use field_locator::FieldKind;
use mail_composer::GeneratedContent;
use mailwright_core_types::StepName;
use step_runner::StepKind;

use crate::model::SendRequest;

/// One machine state and the executor actions it performs.
#[derive(Clone, Debug)]
pub struct PlannedState {
    pub state: StepName,
    pub actions: Vec<(FieldKind, StepKind)>,
}

impl PlannedState {
    fn new(state: StepName, actions: Vec<(FieldKind, StepKind)>) -> Self {
        Self { state, actions }
    }
}

/// Build the interaction plan between `Start` and `Verify`.
pub fn interaction_plan(request: &SendRequest, content: &GeneratedContent) -> Vec<PlannedState> {
    vec![
        PlannedState::new(
            StepName::IdentifyAccount,
            vec![
                (
                    FieldKind::AccountIdentifier,
                    StepKind::type_text(request.credential_identity.clone()),
                ),
                (FieldKind::IdentifierNext, StepKind::Click),
            ],
        ),
        PlannedState::new(
            StepName::EnterCredential,
            vec![
                (
                    FieldKind::CredentialSecret,
                    StepKind::type_text(request.credential_secret.clone()),
                ),
                (FieldKind::CredentialNext, StepKind::Click),
            ],
        ),
        PlannedState::new(
            StepName::SecurityCheck,
            vec![(FieldKind::SecurityChallenge, StepKind::Probe)],
        ),
        PlannedState::new(
            StepName::OpenComposer,
            vec![(FieldKind::ComposeControl, StepKind::Click)],
        ),
        PlannedState::new(
            StepName::FillRecipient,
            vec![(
                FieldKind::RecipientField,
                StepKind::type_text(request.recipient.clone()),
            )],
        ),
        PlannedState::new(
            StepName::FillSubject,
            vec![(
                FieldKind::SubjectField,
                StepKind::type_text(content.subject.clone()),
            )],
        ),
        PlannedState::new(
            StepName::FillBody,
            vec![(
                FieldKind::BodyField,
                StepKind::type_text(content.body.clone()),
            )],
        ),
        PlannedState::new(StepName::Send, vec![(FieldKind::SendControl, StepKind::Click)]),
    ]
}

/// Narrative for demo sessions: the content steps plus every machine state.
pub fn demo_narrative() -> Vec<StepName> {
    let mut steps = vec![StepName::AiAnalysis, StepName::ContentGeneration];
    steps.extend_from_slice(StepName::machine_states());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MailInput;
    use mail_composer::generator::fallback_content;

    fn request() -> SendRequest {
        SendRequest {
            credential_identity: "user@example.com".to_string(),
            credential_secret: "hunter2".to_string(),
            recipient: "peer@example.org".to_string(),
            input: MailInput::Instruction("say hi".to_string()),
            session_context: None,
        }
    }

    #[test]
    fn plan_covers_every_interactive_state_in_order() {
        let plan = interaction_plan(&request(), &fallback_content("say hi"));
        let states: Vec<_> = plan.iter().map(|p| p.state).collect();
        assert_eq!(
            states,
            vec![
                StepName::IdentifyAccount,
                StepName::EnterCredential,
                StepName::SecurityCheck,
                StepName::OpenComposer,
                StepName::FillRecipient,
                StepName::FillSubject,
                StepName::FillBody,
                StepName::Send,
            ]
        );
    }

    #[test]
    fn demo_narrative_prepends_content_steps() {
        let narrative = demo_narrative();
        assert_eq!(narrative.len(), 12);
        assert_eq!(narrative[0], StepName::AiAnalysis);
        assert_eq!(narrative[1], StepName::ContentGeneration);
        assert_eq!(narrative[2], StepName::Start);
        assert_eq!(*narrative.last().unwrap(), StepName::Verify);
    }

    #[test]
    fn subject_step_carries_generated_subject() {
        let content = fallback_content("quarterly report");
        let plan = interaction_plan(&request(), &content);
        let subject_state = plan
            .iter()
            .find(|p| p.state == StepName::FillSubject)
            .unwrap();
        match &subject_state.actions[0].1 {
            StepKind::TypeText { text, .. } => assert_eq!(text, &content.subject),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
