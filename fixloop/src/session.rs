//! Per-session state carried by the coordinator between attempts.

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::history::{HistoryEntry, HistoryLog};
use crate::core::types::{ExecutionResult, FixAttempt, ValidationVerdict};

/// Coordinator state machine.
///
/// `Start -> Analyzed -> {FixGenerated -> StructureChecked -> (Skipped |
/// Executed -> Validated)}* -> Succeeded | Exhausted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Start,
    Analyzed,
    FixGenerated,
    StructureChecked,
    Skipped,
    Executed,
    Validated,
    Succeeded,
    Exhausted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted)
    }

    /// Whether `next` may directly follow `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::{
            Analyzed, Executed, Exhausted, FixGenerated, Skipped, Start, StructureChecked,
            Succeeded, Validated,
        };
        matches!(
            (self, next),
            (Start, Analyzed)
                | (Analyzed | Skipped | Executed | Validated, FixGenerated)
                | (FixGenerated, StructureChecked)
                | (StructureChecked, Skipped | Executed)
                | (Executed, Validated)
                | (Validated, Succeeded)
                | (Skipped | Validated, Exhausted)
        )
    }
}

/// Result of one debugging session.
#[derive(Debug, Clone, Serialize)]
pub struct DebugReport {
    pub success: bool,
    /// Terminal phase: `Succeeded` or `Exhausted`.
    pub phase: Phase,
    pub analysis: String,
    /// Accepted candidate, or the last normalized candidate on exhaustion.
    pub fixed_code: String,
    pub attempts: u32,
    pub execution_result: ExecutionResult,
    /// Raw verdict text of the last validation (empty if none ran).
    pub validation: String,
    pub verdict: ValidationVerdict,
    pub fix_attempts: Vec<FixAttempt>,
    pub history: Vec<HistoryEntry>,
}

/// Mutable state of a session in progress.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    pub analysis: String,
    /// Context handed to the next fix call.
    pub context: String,
    pub last_candidate: String,
    pub last_execution: ExecutionResult,
    pub last_validation: String,
    pub fix_attempts: Vec<FixAttempt>,
    pub history: HistoryLog,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Start,
            analysis: String::new(),
            context: String::new(),
            last_candidate: String::new(),
            last_execution: ExecutionResult::not_run(),
            last_validation: String::new(),
            fix_attempts: Vec::new(),
            history: HistoryLog::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, next: Phase) {
        if !self.phase.can_advance_to(next) {
            warn!(from = ?self.phase, to = ?next, "unexpected phase transition");
        }
        debug!(from = ?self.phase, to = ?next, "phase transition");
        self.phase = next;
    }

    /// Close the session and build its report.
    pub fn finish(mut self, success: bool, attempts: u32) -> DebugReport {
        self.advance(if success {
            Phase::Succeeded
        } else {
            Phase::Exhausted
        });
        let verdict = if self.last_validation.is_empty() {
            ValidationVerdict::rejected("no validation was performed")
        } else {
            crate::core::verdict::parse_verdict(&self.last_validation)
        };
        DebugReport {
            success,
            phase: self.phase,
            analysis: self.analysis,
            fixed_code: self.last_candidate,
            attempts,
            execution_result: self.last_execution,
            validation: self.last_validation,
            verdict,
            fix_attempts: self.fix_attempts,
            history: self.history.into_entries(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_paths_through_the_state_machine() {
        let path = [
            Phase::Start,
            Phase::Analyzed,
            Phase::FixGenerated,
            Phase::StructureChecked,
            Phase::Skipped,
            Phase::FixGenerated,
            Phase::StructureChecked,
            Phase::Executed,
            Phase::Validated,
            Phase::Succeeded,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn rejects_shortcuts() {
        assert!(!Phase::Start.can_advance_to(Phase::FixGenerated));
        assert!(!Phase::Executed.can_advance_to(Phase::Succeeded));
        assert!(!Phase::Skipped.can_advance_to(Phase::Succeeded));
        assert!(!Phase::Succeeded.can_advance_to(Phase::FixGenerated));
    }

    #[test]
    fn finish_without_validation_is_fail_closed() {
        let mut session = Session::new();
        session.advance(Phase::Analyzed);
        session.advance(Phase::FixGenerated);
        session.advance(Phase::StructureChecked);
        session.advance(Phase::Skipped);
        let report = session.finish(false, 2);
        assert!(report.phase.is_terminal());
        assert_eq!(report.phase, Phase::Exhausted);
        assert!(!report.verdict.valid);
        assert!(report.validation.is_empty());
        assert_eq!(report.execution_result, ExecutionResult::not_run());
    }
}
