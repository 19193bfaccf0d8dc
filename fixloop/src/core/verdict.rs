//! Lenient, fail-closed parsing of validator output.
//!
//! Expected shape:
//! `{"validation":"VALID"|"INVALID","reason":..,"remaining_issues":[..],"confidence":"High"|"Medium"|"Low"}`.
//! Surrounding code fences are tolerated. Anything that does not yield a JSON
//! object with `validation == "VALID"` (case-insensitive) is not valid.

use serde_json::Value;

use crate::core::types::{Confidence, ValidationVerdict};

/// Parse validator text into a verdict. Never fails; unparseable text yields
/// a rejected verdict.
pub fn parse_verdict(text: &str) -> ValidationVerdict {
    let Some(Value::Object(map)) = parse_json_lenient(text) else {
        return ValidationVerdict::rejected("validator output is not a JSON object");
    };

    let valid = map
        .get("validation")
        .and_then(Value::as_str)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("VALID"));
    let reason = map
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let remaining_issues = match map.get("remaining_issues") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    };
    let confidence = map
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::parse)
        .unwrap_or(Confidence::Low);

    ValidationVerdict {
        valid,
        reason,
        remaining_issues,
        confidence,
    }
}

/// True only for an explicit `VALID` verdict.
pub fn is_valid(text: &str) -> bool {
    parse_verdict(text).valid
}

fn parse_json_lenient(text: &str) -> Option<Value> {
    let cleaned = strip_fences(text);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }
    let fragment = extract_object_fragment(cleaned)?;
    serde_json::from_str(fragment).ok()
}

fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

/// First balanced `{...}` region, ignoring braces inside string literals.
fn extract_object_fragment(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = None;

    for (idx, ch) in text.char_indices() {
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
            '"' if start.is_some() => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| &text[s..=idx]);
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
    fn parses_full_verdict() {
        let text = r#"{"validation":"VALID","reason":"runs","remaining_issues":[],"confidence":"High"}"#;
        let verdict = parse_verdict(text);
        assert!(verdict.valid);
        assert_eq!(verdict.reason, "runs");
        assert_eq!(verdict.confidence, Confidence::High);
        assert!(verdict.remaining_issues.is_empty());
    }

    #[test]
    fn tolerates_code_fences() {
        let text = "```json\n{\"validation\": \"VALID\", \"reason\": \"ok\"}\n```";
        assert!(is_valid(text));
    }

    #[test]
    fn lowercase_valid_counts() {
        assert!(is_valid(r#"{"validation":"valid"}"#));
    }

    #[test]
    fn invalid_and_unparseable_inputs_are_false() {
        for text in [
            "",
            "   ",
            "not json",
            "{\"validation\": ",
            r#"{"reason":"missing field"}"#,
            r#"{"validation":"INVALID"}"#,
            r#"{"validation":true}"#,
            r#"["VALID"]"#,
            "AGENT ERROR: timed out",
        ] {
            assert!(!is_valid(text), "expected invalid for {text:?}");
        }
    }

    #[test]
    fn finds_object_inside_prose() {
        let text = "Here is my verdict: {\"validation\":\"VALID\",\"reason\":\"braces } in text\"} thanks";
        let verdict = parse_verdict(text);
        assert!(verdict.valid);
        assert_eq!(verdict.reason, "braces } in text");
    }

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let text = r#"{"validation":"INVALID","remaining_issues":"off by one","confidence":"absolute"}"#;
        let verdict = parse_verdict(text);
        assert!(!verdict.valid);
        assert_eq!(verdict.remaining_issues, vec!["off by one".to_string()]);
        assert_eq!(verdict.confidence, Confidence::Low);
    }
}
