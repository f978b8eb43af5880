//! Synthetic placeholder artifacts for demo sessions.
//!
//! The placeholder is a plain SVG document carrying the same narrative
//! metadata a real capture would. Callers treat artifact references as
//! opaque, so the format only needs to be renderable and self-describing.

use mailwright_core_types::{SessionId, StepName};

pub fn placeholder_svg(session: &SessionId, step: StepName, timestamp: &str) -> Vec<u8> {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="600">
  <rect width="800" height="600" fill="white" stroke="#cccccc"/>
  <text x="50" y="70" font-size="28" fill="black">Mailwright Demo Session</text>
  <text x="50" y="130" font-size="22" fill="#1a56db">Step: {step}</text>
  <text x="50" y="180" font-size="20" fill="black">{description}</text>
  <text x="50" y="230" font-size="16" fill="#6b7280">Session: {session}</text>
  <text x="50" y="270" font-size="16" fill="#6b7280">Timestamp: {timestamp}</text>
</svg>
"##,
        step = step.as_str(),
        description = step.description(),
        session = session,
        timestamp = timestamp,
    );
    svg.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_names_the_step() {
        let session = SessionId::new();
        let bytes = placeholder_svg(&session, StepName::FillBody, "20250101_120000");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("fill_body"));
        assert!(text.contains("Entering message body"));
        assert!(text.contains(&session.0));
    }
}
