//! Core types for the locator system.

use serde::{Deserialize, Serialize};

/// Logical fields the automation needs to find on the page.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Account identifier (email/username) input on the sign-in page.
    AccountIdentifier,
    /// "Next" control after the identifier.
    IdentifierNext,
    /// Credential (password) input.
    CredentialSecret,
    /// "Next" control after the credential.
    CredentialNext,
    /// Indicator that a security challenge interstitial is showing.
    SecurityChallenge,
    /// Control that opens the compose window.
    ComposeControl,
    /// Recipient ("To") field inside the composer.
    RecipientField,
    /// Subject field inside the composer.
    SubjectField,
    /// Message body editable region.
    BodyField,
    /// Send control inside the composer.
    SendControl,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::AccountIdentifier => "account_identifier",
            FieldKind::IdentifierNext => "identifier_next",
            FieldKind::CredentialSecret => "credential_secret",
            FieldKind::CredentialNext => "credential_next",
            FieldKind::SecurityChallenge => "security_challenge",
            FieldKind::ComposeControl => "compose_control",
            FieldKind::RecipientField => "recipient_field",
            FieldKind::SubjectField => "subject_field",
            FieldKind::BodyField => "body_field",
            FieldKind::SendControl => "send_control",
        }
    }
}

/// Scoring rule for heuristic descriptors.
///
/// Heuristics are the last resort of a chain: they scan interactable
/// elements rather than matching a fixed selector. Among its own candidates
/// a heuristic picks by the documented rule; chain order still decides
/// priority between descriptors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum HeuristicRule {
    /// Editable region with the maximal bounding-box area.
    LargestEditable,
    /// Editable element whose placeholder, accessible label, or name
    /// contains one of the keywords (case-insensitive).
    LabelledEditable { keywords: Vec<String> },
}

/// One candidate way of finding a UI element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum TargetDescriptor {
    /// Precise attribute match, expressed as a CSS selector.
    Attribute { selector: String },
    /// Structural match on role and optional accessible-label fragment.
    Structural {
        role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Free-text match on visible text content.
    Text { contains: String },
    /// Heuristic scan, tried only when everything above is exhausted.
    Heuristic(HeuristicRule),
}

impl TargetDescriptor {
    pub fn attribute(selector: &str) -> Self {
        TargetDescriptor::Attribute {
            selector: selector.to_string(),
        }
    }

    pub fn structural(role: &str, label: Option<&str>) -> Self {
        TargetDescriptor::Structural {
            role: role.to_string(),
            label: label.map(str::to_string),
        }
    }

    pub fn text(contains: &str) -> Self {
        TargetDescriptor::Text {
            contains: contains.to_string(),
        }
    }

    /// Strategy name for logging and resolution reports.
    pub fn strategy_name(&self) -> &'static str {
        match self {
            TargetDescriptor::Attribute { .. } => "attribute",
            TargetDescriptor::Structural { .. } => "structural",
            TargetDescriptor::Text { .. } => "text",
            TargetDescriptor::Heuristic(_) => "heuristic",
        }
    }
}

/// Ordered list of descriptors for one logical field.
///
/// List position is the priority order; there is no scoring across
/// descriptors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocatorChain {
    pub field: FieldKind,
    pub candidates: Vec<TargetDescriptor>,
}

impl LocatorChain {
    pub fn new(field: FieldKind, candidates: Vec<TargetDescriptor>) -> Self {
        Self { field, candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A concrete element found by the probe.
///
/// The `node_ref` is an opaque substrate-specific handle the driver can act
/// on (for the CDP adapter it is a synthetic attribute value tagged onto
/// the node during probing).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementHandle {
    pub node_ref: String,
    pub visible: bool,
    pub enabled: bool,
    /// Bounding-box area in CSS pixels, for heuristic scoring.
    pub area: f64,
}

impl ElementHandle {
    pub fn interactable(&self) -> bool {
        self.visible && self.enabled
    }
}
