//! Content model.

use serde::{Deserialize, Serialize};

/// Finalized email content handed to the orchestrator.
///
/// Invariant: `subject` and `body` are non-empty, whichever path produced
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub subject: String,
    pub body: String,
    /// Classification of the message ("general", "follow_up", ...).
    pub email_type: String,
    pub tone: String,
    pub key_points: Vec<String>,
    /// Whether the generative backend produced this, as opposed to the
    /// deterministic fallback.
    pub ai_generated: bool,
}

/// Structured interpretation the backend is asked to return in phase one.
///
/// Every field defaults so a partially well-formed response still parses.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Interpretation {
    #[serde(default)]
    pub email_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl Interpretation {
    /// An interpretation is only usable if it carries actual content.
    pub fn is_usable(&self) -> bool {
        !self.subject.trim().is_empty() && !self.body.trim().is_empty()
    }
}
