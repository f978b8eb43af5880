//! Standard locator chains for the webmail compose flow.
//!
//! Pure data. Candidates are ordered by decreasing specificity: precise
//! attribute selectors first, structural role matches next, free-text
//! matches after that, and a heuristic scan as the last resort where one
//! exists. Editing a chain never requires touching the resolver or the
//! step runner.

use crate::types::{FieldKind, HeuristicRule, LocatorChain, TargetDescriptor};

fn attr(selector: &str) -> TargetDescriptor {
    TargetDescriptor::attribute(selector)
}

/// Chain for the sign-in identifier input.
pub fn account_identifier() -> LocatorChain {
    LocatorChain::new(
        FieldKind::AccountIdentifier,
        vec![
            attr("input[type='email']"),
            attr("input[name='identifier']"),
            attr("#identifierId"),
            attr("input[aria-label*='Email' i]"),
            TargetDescriptor::structural("textbox", Some("Email")),
        ],
    )
}

/// Chain for the control that advances past the identifier.
pub fn identifier_next() -> LocatorChain {
    LocatorChain::new(
        FieldKind::IdentifierNext,
        vec![
            attr("#identifierNext button"),
            attr("#identifierNext"),
            attr("button[type='submit']"),
            attr("button[aria-label*='Next']"),
            TargetDescriptor::structural("button", Some("Next")),
            TargetDescriptor::text("Next"),
        ],
    )
}

/// Chain for the credential input.
pub fn credential_secret() -> LocatorChain {
    LocatorChain::new(
        FieldKind::CredentialSecret,
        vec![
            attr("input[type='password']"),
            attr("input[name='password']"),
            attr("input[aria-label*='Password' i]"),
            TargetDescriptor::structural("textbox", Some("Password")),
        ],
    )
}

/// Chain for the control that submits the credential.
pub fn credential_next() -> LocatorChain {
    LocatorChain::new(
        FieldKind::CredentialNext,
        vec![
            attr("#passwordNext button"),
            attr("#passwordNext"),
            attr("button[type='submit']"),
            attr("button[aria-label*='Next']"),
            TargetDescriptor::structural("button", Some("Next")),
        ],
    )
}

/// Chain probing for a security-challenge interstitial.
///
/// A match here is a stop signal, not a target to interact with.
pub fn security_challenge() -> LocatorChain {
    LocatorChain::new(
        FieldKind::SecurityChallenge,
        vec![
            attr("div[data-challenge-type]"),
            attr("#challengePickerList"),
            attr(".challenge-picker"),
            attr("div[aria-label*='verification' i]"),
            TargetDescriptor::text("Verify it's you"),
        ],
    )
}

/// Chain for the control that opens the composer.
pub fn compose_control() -> LocatorChain {
    LocatorChain::new(
        FieldKind::ComposeControl,
        vec![
            attr("div[role='button'][data-tooltip*='Compose']"),
            attr("div[role='button'][aria-label*='Compose']"),
            attr("div[data-tooltip*='Compose']"),
            attr("div[aria-label*='Compose']"),
            attr("div[aria-label*='New Message']"),
            TargetDescriptor::structural("button", Some("Compose")),
            TargetDescriptor::text("Compose"),
        ],
    )
}

/// Chain for the recipient field inside the composer.
///
/// The last entry is a best-effort scan: any editable element labelled
/// like a recipient field.
pub fn recipient_field() -> LocatorChain {
    LocatorChain::new(
        FieldKind::RecipientField,
        vec![
            attr("textarea[name='to']"),
            attr("input[name='to']"),
            attr("div[role='textbox'][aria-label*='To']"),
            attr("div[contenteditable='true'][aria-label*='To']"),
            attr("input[placeholder*='Recipients']"),
            attr("div[aria-label*='Recipients']"),
            attr("div[aria-label*='Add recipients']"),
            TargetDescriptor::structural("textbox", Some("To")),
            TargetDescriptor::Heuristic(HeuristicRule::LabelledEditable {
                keywords: vec!["to".to_string(), "recipient".to_string()],
            }),
        ],
    )
}

/// Chain for the subject field inside the composer.
pub fn subject_field() -> LocatorChain {
    LocatorChain::new(
        FieldKind::SubjectField,
        vec![
            attr("input[name='subjectbox']"),
            attr("input[name='subject']"),
            attr("input[placeholder*='Subject']"),
            attr("input[aria-label*='Subject']"),
            attr("div[role='textbox'][aria-label*='Subject']"),
            TargetDescriptor::structural("textbox", Some("Subject")),
        ],
    )
}

/// Chain for the message body editable region.
///
/// Ends in the "largest editable region" heuristic: composer bodies are
/// reliably the biggest contenteditable on screen even when every label
/// changes.
pub fn body_field() -> LocatorChain {
    LocatorChain::new(
        FieldKind::BodyField,
        vec![
            attr("div[role='textbox'][aria-label*='Message Body']"),
            attr("div[contenteditable='true'][aria-label*='Message Body']"),
            attr("div[role='textbox'][aria-label*='Body']"),
            attr("div[contenteditable='true'][aria-label*='Body']"),
            TargetDescriptor::structural("textbox", Some("Message")),
            TargetDescriptor::Heuristic(HeuristicRule::LargestEditable),
        ],
    )
}

/// Chain for the send control.
pub fn send_control() -> LocatorChain {
    LocatorChain::new(
        FieldKind::SendControl,
        vec![
            attr("div[role='button'][data-tooltip*='Send']"),
            attr("div[aria-label*='Send']"),
            attr("div[data-tooltip='Send']"),
            attr("button[type='submit']"),
            TargetDescriptor::structural("button", Some("Send")),
            TargetDescriptor::text("Send"),
        ],
    )
}

/// Look up the standard chain for a field.
pub fn standard_chains(field: FieldKind) -> LocatorChain {
    match field {
        FieldKind::AccountIdentifier => account_identifier(),
        FieldKind::IdentifierNext => identifier_next(),
        FieldKind::CredentialSecret => credential_secret(),
        FieldKind::CredentialNext => credential_next(),
        FieldKind::SecurityChallenge => security_challenge(),
        FieldKind::ComposeControl => compose_control(),
        FieldKind::RecipientField => recipient_field(),
        FieldKind::SubjectField => subject_field(),
        FieldKind::BodyField => body_field(),
        FieldKind::SendControl => send_control(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_has_a_nonempty_chain() {
        for field in [
            FieldKind::AccountIdentifier,
            FieldKind::IdentifierNext,
            FieldKind::CredentialSecret,
            FieldKind::CredentialNext,
            FieldKind::SecurityChallenge,
            FieldKind::ComposeControl,
            FieldKind::RecipientField,
            FieldKind::SubjectField,
            FieldKind::BodyField,
            FieldKind::SendControl,
        ] {
            let chain = standard_chains(field);
            assert!(!chain.is_empty(), "chain for {:?} is empty", field);
            assert_eq!(chain.field, field);
        }
    }

    #[test]
    fn heuristics_are_last_where_present() {
        for chain in [recipient_field(), body_field()] {
            let last = chain.candidates.last().unwrap();
            assert_eq!(last.strategy_name(), "heuristic");
            for candidate in &chain.candidates[..chain.len() - 1] {
                assert_ne!(candidate.strategy_name(), "heuristic");
            }
        }
    }

    #[test]
    fn attribute_candidates_lead_each_chain() {
        for field in [FieldKind::RecipientField, FieldKind::SubjectField] {
            let chain = standard_chains(field);
            assert_eq!(chain.candidates[0].strategy_name(), "attribute");
        }
    }
}
