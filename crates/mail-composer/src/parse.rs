//! Lenient parsing of backend responses.
//!
//! Backends frequently wrap the requested JSON in prose or code fences.
//! Parsing is strict first, then falls back to extracting the first
//! balanced JSON object embedded in the text. A `None` here routes the
//! caller to the deterministic template.

use tracing::debug;

use crate::model::Interpretation;

/// Parse an interpretation out of raw backend text.
pub fn parse_interpretation(raw: &str) -> Option<Interpretation> {
    if let Ok(parsed) = serde_json::from_str::<Interpretation>(raw.trim()) {
        if parsed.is_usable() {
            return Some(parsed);
        }
    }

    let fragment = extract_json_object(raw)?;
    match serde_json::from_str::<Interpretation>(fragment) {
        Ok(parsed) if parsed.is_usable() => Some(parsed),
        Ok(_) => {
            debug!("embedded object parsed but lacks subject/body");
            None
        }
        Err(err) => {
            debug!(error = %err, "embedded object is not valid JSON");
            None
        }
    }
}

/// Slice out the first balanced `{ ... }` object, respecting strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_parses() {
        let raw = r#"{"email_type":"follow_up","subject":"Checking in","body":"Hello there","tone":"professional","key_points":["status"]}"#;
        let parsed = parse_interpretation(raw).unwrap();
        assert_eq!(parsed.subject, "Checking in");
        assert_eq!(parsed.key_points, vec!["status".to_string()]);
    }

    #[test]
    fn json_wrapped_in_prose_is_extracted() {
        let raw = "Sure! Here is the analysis you asked for:\n\n{\"subject\": \"Quarterly update\", \"body\": \"Hi team\", \"tone\": \"formal\"}\n\nLet me know if you need anything else.";
        let parsed = parse_interpretation(raw).unwrap();
        assert_eq!(parsed.subject, "Quarterly update");
        assert_eq!(parsed.body, "Hi team");
    }

    #[test]
    fn nested_braces_and_strings_survive_extraction() {
        let raw = r#"prefix {"subject":"a {b} c","body":"say \"hi\"","meta":{"x":1}} suffix"#;
        let fragment = extract_json_object(raw).unwrap();
        assert!(fragment.starts_with('{'));
        assert!(fragment.ends_with('}'));
        let parsed = parse_interpretation(raw).unwrap();
        assert_eq!(parsed.subject, "a {b} c");
    }

    #[test]
    fn free_text_without_json_is_none() {
        assert!(parse_interpretation("I could not produce JSON, sorry.").is_none());
    }

    #[test]
    fn object_missing_content_is_none() {
        assert!(parse_interpretation(r#"{"tone":"casual"}"#).is_none());
    }

    #[test]
    fn unbalanced_object_is_none() {
        assert!(extract_json_object("{\"subject\": \"trunc").is_none());
    }
}
