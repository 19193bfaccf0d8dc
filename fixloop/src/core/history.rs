//! Append-only audit trail of pipeline steps.
//!
//! The history is a side channel: the coordinator writes to it after every
//! step but never reads it back to make a decision.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Component that produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentName {
    Analyzer,
    Fixer,
    Executor,
    Validator,
}

/// Outcome recorded for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Success,
    Generated,
    Empty,
    Skipped,
    Failed,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub agent: AgentName,
    pub phase: String,
    pub status: StepStatus,
    pub summary: String,
    pub extra: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current wall-clock time.
    pub fn record(
        &mut self,
        agent: AgentName,
        phase: impl Into<String>,
        status: StepStatus,
        summary: impl Into<String>,
        extra: Value,
    ) {
        self.entries.push(HistoryEntry {
            agent,
            phase: phase.into(),
            status,
            summary: summary.into(),
            extra,
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}
