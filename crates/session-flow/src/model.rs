//! Request and result shapes.

use serde::{Deserialize, Serialize};

use mail_composer::GeneratedContent;
use mailwright_core_types::{Checkpoint, SessionStatus};

/// What to say: either a natural-language instruction for the generator,
/// or pre-composed subject and body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum MailInput {
    Composed { subject: String, body: String },
    Instruction(String),
}

/// One automation request, as handed over by the transport layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub credential_identity: String,
    pub credential_secret: String,
    pub recipient: String,
    pub input: MailInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_context: Option<String>,
}

/// Terminal result returned to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub status: SessionStatus,
    pub message: String,
    pub session_id: String,
    pub checkpoints: Vec<Checkpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_content: Option<GeneratedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_input_deserializes_from_plain_string() {
        let raw = r#"{"credentialIdentity":"a@x","credentialSecret":"s","recipient":"b@y","input":"thank the team"}"#;
        let request: SendRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(request.input, MailInput::Instruction(ref s) if s == "thank the team"));
    }

    #[test]
    fn composed_input_deserializes_from_object() {
        let raw = r#"{"credentialIdentity":"a@x","credentialSecret":"s","recipient":"b@y","input":{"subject":"Hi","body":"There"}}"#;
        let request: SendRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(request.input, MailInput::Composed { .. }));
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = SessionResult {
            status: mailwright_core_types::SessionStatus::Demo,
            message: "demo".to_string(),
            session_id: "sid".to_string(),
            checkpoints: vec![],
            generated_content: None,
            failure_reason: Some("substrate".to_string()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "demo");
        assert_eq!(json["sessionId"], "sid");
        assert_eq!(json["failureReason"], "substrate");
        assert!(json.get("generatedContent").is_none());
    }
}
