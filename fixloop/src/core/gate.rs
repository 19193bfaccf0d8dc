//! Structural gate run on every normalized candidate before execution.
//!
//! The gate only catches gross regressions (empty output, propagated agent
//! failures, dropped imports). It says nothing about semantic correctness.

use std::fmt;

use crate::core::types::AGENT_ERROR_SENTINEL;

/// Reason a candidate was refused before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Candidate is empty or whitespace only.
    Empty,
    /// Candidate contains the agent failure sentinel.
    ///
    /// Matched anywhere in the text, so a sentinel inside a comment or string
    /// literal of otherwise valid code is also rejected.
    AgentFailure,
    /// Original imports something; the candidate imports nothing.
    MissingImports,
}

impl GateRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::AgentFailure => "agent_failure",
            Self::MissingImports => "missing_imports",
        }
    }
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("candidate code is empty"),
            Self::AgentFailure => f.write_str("candidate contains agent error text"),
            Self::MissingImports => {
                f.write_str("original code has imports but the candidate has none")
            }
        }
    }
}

/// Check `candidate` against the structural rules, using `original` as the
/// reference for the import rule.
pub fn check_structure(original: &str, candidate: &str) -> Result<(), GateRejection> {
    if candidate.trim().is_empty() {
        return Err(GateRejection::Empty);
    }
    if candidate.contains(AGENT_ERROR_SENTINEL) {
        return Err(GateRejection::AgentFailure);
    }
    if has_import(original) && !has_import(candidate) {
        return Err(GateRejection::MissingImports);
    }
    Ok(())
}

/// True when any statement is `import x` or `from x import y`.
///
/// Statements are lines split on `;`.
pub fn has_import(source: &str) -> bool {
    source
        .lines()
        .flat_map(|line| line.split(';'))
        .map(str::trim_start)
        .any(|stmt| {
            stmt.starts_with("import ") || (stmt.starts_with("from ") && stmt.contains(" import "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_candidates() {
        assert_eq!(check_structure("x = 1", ""), Err(GateRejection::Empty));
        assert_eq!(check_structure("x = 1", " \n\t"), Err(GateRejection::Empty));
    }

    #[test]
    fn rejects_agent_error_text() {
        let candidate = "AGENT ERROR: quota exceeded";
        assert_eq!(
            check_structure("x = 1", candidate),
            Err(GateRejection::AgentFailure)
        );
    }

    #[test]
    fn sentinel_inside_a_comment_is_still_rejected() {
        // Kept for parity: the sentinel is matched anywhere in the candidate.
        let candidate = "# handles AGENT ERROR strings\nprint('ok')";
        assert_eq!(
            check_structure("print('ok')", candidate),
            Err(GateRejection::AgentFailure)
        );
    }

    #[test]
    fn rejects_dropped_imports() {
        let original = "import math\nprint(math.pi)";
        assert_eq!(
            check_structure(original, "print(3.14)"),
            Err(GateRejection::MissingImports)
        );
        assert_eq!(
            check_structure(original, "from math import pi\nprint(pi)"),
            Ok(())
        );
    }

    #[test]
    fn import_rule_is_inert_without_imports_in_original() {
        let original = "def f(x)\n  return x";
        for candidate in ["def f(x):\n  return x", "print(1)", "important = True"] {
            assert_eq!(check_structure(original, candidate), Ok(()));
        }
    }

    #[test]
    fn has_import_requires_statement_form() {
        assert!(has_import("  import os"));
        assert!(has_import("from os import path"));
        assert!(!has_import("# we import nothing"));
        assert!(!has_import("from_value = 3"));
    }

    #[test]
    fn import_after_semicolon_counts() {
        assert!(has_import("x = 1; import math"));
        assert!(has_import("x = 1;from os import path"));
        assert_eq!(
            check_structure("x = 1; import math\nprint(math.pi)", "print(3.14)"),
            Err(GateRejection::MissingImports)
        );
    }
}
