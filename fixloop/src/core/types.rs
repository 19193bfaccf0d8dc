//! Shared record shapes for the repair pipeline.
//!
//! Everything here is plain data: produced once by one component and read by
//! the next. Nothing in this module performs I/O.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker embedded in agent output when the reasoning backend failed.
///
/// Agents never raise; a failed call surfaces as `AGENT ERROR: <cause>` so the
/// structural gate can treat "agent failed" and "agent produced junk" alike.
pub const AGENT_ERROR_SENTINEL: &str = "AGENT ERROR";

/// Category of a failed execution.
///
/// Serialized as the category name (`ZeroDivisionError`, `InvalidStructure`,
/// ...). Exceptions outside the named categories keep their class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UndefinedName,
    TypeMismatch,
    DivisionByZero,
    /// Candidate was rejected by the structural gate and never ran.
    InvalidStructure,
    /// Execution exceeded the hard deadline and the worker was killed.
    Timeout,
    /// The interpreter could not be started or died mid-request.
    ExecutorUnavailable,
    Other(String),
}

impl ErrorKind {
    /// Map a category name reported by the interpreter to a kind.
    pub fn from_category(name: &str) -> Self {
        match name {
            "SyntaxError" => Self::Syntax,
            "NameError" => Self::UndefinedName,
            "TypeError" => Self::TypeMismatch,
            "ZeroDivisionError" => Self::DivisionByZero,
            "InvalidStructure" => Self::InvalidStructure,
            "Timeout" => Self::Timeout,
            "ExecutorUnavailable" => Self::ExecutorUnavailable,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::UndefinedName => "NameError",
            Self::TypeMismatch => "TypeError",
            Self::DivisionByZero => "ZeroDivisionError",
            Self::InvalidStructure => "InvalidStructure",
            Self::Timeout => "Timeout",
            Self::ExecutorUnavailable => "ExecutorUnavailable",
            Self::Other(name) => name,
        }
    }

    /// Human-readable prefix used in `ExecutionResult::error`.
    pub fn label(&self) -> &str {
        match self {
            Self::Syntax => "Syntax Error",
            Self::UndefinedName => "Name Error",
            Self::TypeMismatch => "Type Error",
            Self::DivisionByZero => "Zero Division Error",
            Self::InvalidStructure => "Invalid Structure",
            Self::Timeout => "Timeout",
            Self::ExecutorUnavailable => "Executor Unavailable",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_category(&name))
    }
}

/// Outcome of running one candidate against the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// Captured stdout, followed by stderr when stderr is non-empty.
    pub output: String,
    /// `"<Category label>: <message>"` when `success` is false.
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ExecutionResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(kind: ErrorKind, message: &str, output: impl Into<String>) -> Self {
        let error = if message.is_empty() {
            kind.label().to_string()
        } else {
            format!("{}: {}", kind.label(), message)
        };
        Self {
            success: false,
            output: output.into(),
            error: Some(error),
            error_kind: Some(kind),
        }
    }

    /// Result recorded for a candidate the structural gate refused to run.
    pub fn invalid_structure(reason: &str) -> Self {
        Self::failed(ErrorKind::InvalidStructure, reason, String::new())
    }

    /// Placeholder used before any candidate has been executed.
    pub fn not_run() -> Self {
        Self {
            success: false,
            output: String::new(),
            error: None,
            error_kind: None,
        }
    }

    /// Multi-line rendering embedded in retry context for the fixer.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("success: {}", self.success)];
        if let Some(kind) = &self.error_kind {
            lines.push(format!("error_kind: {kind}"));
        }
        if let Some(error) = &self.error {
            lines.push(format!("error: {error}"));
        }
        if self.output.trim().is_empty() {
            lines.push("output: (none)".to_string());
        } else {
            lines.push(format!("output:\n{}", self.output.trim_end()));
        }
        lines.join("\n")
    }
}

/// One fixer round: what the model said and what was extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixAttempt {
    pub attempt_number: u32,
    pub candidate_code: String,
    pub raw_model_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Structured judgment parsed from validator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub reason: String,
    pub remaining_issues: Vec<String>,
    pub confidence: Confidence,
}

impl ValidationVerdict {
    /// Fail-closed verdict for text that could not be interpreted.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
            remaining_issues: Vec::new(),
            confidence: Confidence::Low,
        }
    }
}

/// Whether the validator runs on attempts whose execution already failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Skip the validator while retries remain; it only judges code that ran
    /// (or the final attempt).
    #[default]
    SkipOnExecutionFailure,
    /// Always ask the validator, so its feedback reaches the next fix.
    Always,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_round_trips_category_names() {
        for name in [
            "SyntaxError",
            "NameError",
            "TypeError",
            "ZeroDivisionError",
            "InvalidStructure",
            "Timeout",
            "ExecutorUnavailable",
            "KeyError",
        ] {
            assert_eq!(ErrorKind::from_category(name).as_str(), name);
        }
    }

    #[test]
    fn failed_result_prefixes_category_label() {
        let result = ExecutionResult::failed(ErrorKind::DivisionByZero, "division by zero", "10.0");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Zero Division Error: division by zero")
        );
        assert_eq!(result.output, "10.0");
    }

    #[test]
    fn error_kind_serializes_as_plain_string() {
        let result = ExecutionResult::failed(ErrorKind::Other("KeyError".into()), "'a'", "");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["error_kind"], "KeyError");
        let back: ExecutionResult = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, result);
    }

    #[test]
    fn describe_mentions_kind_and_output() {
        let text = ExecutionResult::failed(ErrorKind::UndefinedName, "name 'x' is not defined", "")
            .describe();
        assert!(text.contains("error_kind: NameError"));
        assert!(text.contains("output: (none)"));
    }

    #[test]
    fn confidence_parse_is_case_insensitive() {
        assert_eq!(Confidence::parse(" HIGH "), Some(Confidence::High));
        assert_eq!(Confidence::parse("medium"), Some(Confidence::Medium));
        assert_eq!(Confidence::parse("sure"), None);
    }
}
