// Deep-Research: Structured Output
// Strict parsing of schema replies, plus a lenient scan for agent actions

use crate::error::{ResearchError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[a-zA-Z]*[ \t]*\r?\n(.*?)```").expect("valid fenced block regex")
});

static WHOLE_FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A```[a-zA-Z]*[ \t]*\r?\n(.*?)```\z").expect("valid whole fenced block regex")
});

/// The reply when it is exactly one JSON object, bare or as the only content of a fenced block
pub fn strict_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();
    let body = match WHOLE_FENCED_BLOCK.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    };
    (body.starts_with('{') && body.ends_with('}')).then_some(body)
}

/// Find a JSON object anywhere in the response, fenced or bare.
/// Returns `None` when no object is present.
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(caps) = FENCED_BLOCK.captures(response) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if body.starts_with('{') {
                return Some(body);
            }
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

/// Parse a model response into `T`. Prose around the object is a failure.
pub fn parse_structured<T: DeserializeOwned>(agent: &str, response: &str) -> Result<T> {
    let json = strict_json(response).ok_or_else(|| ResearchError::StructuredOutput {
        agent: agent.to_string(),
        message: format!("response is not a single JSON object: {}", preview(response)),
    })?;

    serde_json::from_str(json).map_err(|e| ResearchError::StructuredOutput {
        agent: agent.to_string(),
        message: format!("{} (response: {})", e, preview(response)),
    })
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DialogueTurnOutput, GuardrailVerdict};

    #[test]
    fn test_fenced_json_is_accepted() {
        let response = "```json\n{\"output_info\": \"ok\", \"tripwire_triggered\": false}\n```\n";
        let verdict: GuardrailVerdict = parse_structured("guardrail", response).unwrap();
        assert!(!verdict.tripwire_triggered);
    }

    #[test]
    fn test_bare_object_is_accepted() {
        let response = r#"  {"question": "Who is the customer?", "question_number": 1}  "#;
        let turn: DialogueTurnOutput = parse_structured("requirements", response).unwrap();
        assert_eq!(turn.question, "Who is the customer?");
    }

    #[test]
    fn test_prose_around_object_is_an_error() {
        let response = r#"Sure! Here is my verdict: {"output_info": "ok", "tripwire_triggered": false} Hope that helps."#;
        let err = parse_structured::<GuardrailVerdict>("guard_rail_agent", response).unwrap_err();
        assert!(matches!(err, ResearchError::StructuredOutput { ref agent, .. } if agent == "guard_rail_agent"));

        let fenced = "Here you go:\n```json\n{\"output_info\": \"ok\", \"tripwire_triggered\": false}\n```\nThanks";
        assert!(parse_structured::<GuardrailVerdict>("guard_rail_agent", fenced).is_err());
    }

    #[test]
    fn test_lenient_scan_still_finds_embedded_object() {
        let response = r#"Sure. {"action": "final", "output": "done"}"#;
        assert_eq!(extract_json(response), Some(r#"{"action": "final", "output": "done"}"#));
        assert_eq!(strict_json(response), None);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let err = parse_structured::<GuardrailVerdict>("guardrail", r#"{"output_info": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, ResearchError::StructuredOutput { ref agent, .. } if agent == "guardrail"));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = parse_structured::<DialogueTurnOutput>(
            "requirements",
            r#"{"question_number": "two"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_text_is_an_error() {
        assert!(extract_json("I cannot help with that").is_none());
        assert!(parse_structured::<GuardrailVerdict>("guardrail", "no").is_err());
    }
}
