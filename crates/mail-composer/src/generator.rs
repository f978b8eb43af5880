//! The content generator.

use std::sync::Arc;

use tracing::{info, warn};

use mailwright_core_types::FailureKind;

use crate::backend::{BackendError, GenerativeBackend};
use crate::model::{GeneratedContent, Interpretation};
use crate::parse::parse_interpretation;

const INTERPRET_MAX_TOKENS: u32 = 500;
const POLISH_MAX_TOKENS: u32 = 400;
const SUBJECT_PREVIEW_CHARS: usize = 50;

const INTERPRET_SYSTEM_PROMPT: &str = "\
You are an intelligent email assistant. Analyze the user's natural language \
instruction and return a JSON object with these fields:\n\
- email_type: the type of email (internship application, follow-up, thank you, ...)\n\
- subject: a professional subject line\n\
- body: a well-written email body (2-3 paragraphs)\n\
- tone: the tone used (professional, casual, formal, ...)\n\
- key_points: list of the main points covered\n\
Return only the JSON object.";

/// Turns an instruction into finalized email content.
///
/// Infallible at its boundary: any backend or parsing failure is recovered
/// into the deterministic fallback template.
pub struct ContentGenerator {
    backend: Option<Arc<dyn GenerativeBackend>>,
}

impl ContentGenerator {
    pub fn new(backend: Option<Arc<dyn GenerativeBackend>>) -> Self {
        Self { backend }
    }

    /// Fallback-only generator; used when no backend is configured.
    pub fn offline() -> Self {
        Self { backend: None }
    }

    pub fn backend_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Produce finalized content for the instruction.
    ///
    /// Subject and body are non-empty for any input, including an empty
    /// instruction.
    pub async fn generate(&self, instruction: &str, recipient: Option<&str>) -> GeneratedContent {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                info!("no generative backend configured; using deterministic fallback");
                return fallback_content(instruction);
            }
        };

        match self.backend_generate(backend.as_ref(), instruction, recipient).await {
            Ok(content) => content,
            Err(err) => {
                // Recovered locally; the session never sees this failure.
                let kind = FailureKind::BackendUnavailable(err.to_string());
                warn!(error = %kind, "backend path failed; using deterministic fallback");
                fallback_content(instruction)
            }
        }
    }

    /// Two-phase backend path: interpret, then polish with context.
    async fn backend_generate(
        &self,
        backend: &dyn GenerativeBackend,
        instruction: &str,
        recipient: Option<&str>,
    ) -> Result<GeneratedContent, BackendError> {
        let interpret_prompt = format!(
            "{INTERPRET_SYSTEM_PROMPT}\n\nAnalyze this instruction: {instruction}"
        );
        let raw = backend.complete(&interpret_prompt, INTERPRET_MAX_TOKENS).await?;

        // Malformed structured data is not fatal: polish the template
        // interpretation instead, exactly like a thin instruction would be.
        let interpretation = parse_interpretation(&raw)
            .unwrap_or_else(|| fallback_interpretation(instruction));

        let polish_prompt = format!(
            "Based on this interpretation, write the final email.\n\n\
             Email type: {}\nTone: {}\nSubject: {}\nDraft body:\n{}\n\n\
             Recipient: {}\n\n\
             Produce only the polished email body, with an appropriate \
             greeting and closing, 2-3 paragraphs, matching the tone.",
            nonempty_or(&interpretation.email_type, "general"),
            nonempty_or(&interpretation.tone, "professional"),
            interpretation.subject,
            interpretation.body,
            recipient.unwrap_or("recipient"),
        );
        let polished = backend.complete(&polish_prompt, POLISH_MAX_TOKENS).await?;

        let mut content = GeneratedContent {
            subject: interpretation.subject,
            body: polished.trim().to_string(),
            email_type: nonempty_or(&interpretation.email_type, "general").to_string(),
            tone: nonempty_or(&interpretation.tone, "professional").to_string(),
            key_points: if interpretation.key_points.is_empty() {
                vec![instruction.to_string()]
            } else {
                interpretation.key_points
            },
            ai_generated: true,
        };

        // Uphold the non-empty invariant even against a degenerate backend.
        if content.subject.trim().is_empty() {
            content.subject = fallback_subject(instruction);
        }
        if content.body.trim().is_empty() {
            content.body = fallback_body(instruction);
        }

        info!(email_type = %content.email_type, tone = %content.tone, "content generated by backend");
        Ok(content)
    }
}

fn nonempty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn fallback_subject(instruction: &str) -> String {
    format!("Re: {}...", truncate_chars(instruction, SUBJECT_PREVIEW_CHARS))
}

fn fallback_body(instruction: &str) -> String {
    format!("Hello,\n\n{instruction}\n\nBest regards,\n[Your Name]")
}

fn fallback_interpretation(instruction: &str) -> Interpretation {
    Interpretation {
        email_type: "general".to_string(),
        subject: fallback_subject(instruction),
        body: fallback_body(instruction),
        tone: "professional".to_string(),
        key_points: vec![instruction.to_string()],
    }
}

/// The deterministic fallback template. Identical input, identical output.
pub fn fallback_content(instruction: &str) -> GeneratedContent {
    GeneratedContent {
        subject: fallback_subject(instruction),
        body: fallback_body(instruction),
        email_type: "general".to_string(),
        tone: "professional".to_string(),
        key_points: vec![instruction.to_string()],
        ai_generated: false,
    }
}
