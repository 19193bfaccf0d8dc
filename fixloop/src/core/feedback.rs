//! Retry context handed to the fixer after a failed attempt.
//!
//! Each builder carries strictly more diagnostic detail than the one before:
//! structural rejection -> execution failure -> execution plus verdict.

use crate::core::gate::GateRejection;
use crate::core::types::ExecutionResult;

/// Context after the structural gate refused the candidate.
pub fn structural_feedback(rejection: GateRejection) -> String {
    format!(
        "Previous attempt produced structurally invalid code ({rejection}).\n\
         Return a complete, runnable Python script that preserves the original imports."
    )
}

/// Context after the candidate ran and failed.
pub fn execution_feedback(execution: &ExecutionResult) -> String {
    format!(
        "Previous attempt failed at execution.\n\
         Execution result:\n{}\n\n\
         Fix the issues and try again.",
        execution.describe()
    )
}

/// Context after the validator rejected the candidate.
pub fn validation_feedback(execution: &ExecutionResult, verdict_text: &str) -> String {
    let verdict = verdict_text.trim();
    format!(
        "Previous attempt failed.\n\
         Execution result:\n{}\n\n\
         Validation:\n{}\n\n\
         Try a better fix.",
        execution.describe(),
        if verdict.is_empty() { "(no verdict)" } else { verdict }
    )
}
