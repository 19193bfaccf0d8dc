//! Role-specialized agents.
//!
//! A role is data: a [`RoleSpec`] (label, instructions, expected output
//! shape). Every role runs through the same [`RoleAgent`] adapter, which owns
//! the role's short-term memory and converts backend failures into sentinel
//! text.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::core::text::truncate_chars;
use crate::core::types::AGENT_ERROR_SENTINEL;
use crate::io::reasoning::{ReasoningClient, ReasoningRequest};

pub mod analyzer;
pub mod fixer;
pub mod validator;

pub use analyzer::Analyzer;
pub use fixer::Fixer;
pub use validator::Validator;

/// Number of recent outputs each agent remembers.
pub const MEMORY_CAPACITY: usize = 3;

/// Shape a role is expected to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    PlainReport,
    Code,
    VerdictJson,
}

impl OutputShape {
    pub fn describe(self) -> &'static str {
        match self {
            Self::PlainReport => "Plain text report. No markdown, no code blocks.",
            Self::Code => "A single complete, runnable Python program and nothing else.",
            Self::VerdictJson => "A single JSON object and nothing else.",
        }
    }
}

/// Fixed configuration of one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSpec {
    pub label: &'static str,
    pub instructions: &'static str,
    pub output: OutputShape,
}

/// Shared adapter between a role and the reasoning backend.
#[derive(Debug, Clone)]
pub struct RoleAgent {
    spec: RoleSpec,
    memory: VecDeque<String>,
    snippet_chars: usize,
}

impl RoleAgent {
    pub fn new(spec: RoleSpec, snippet_chars: usize) -> Self {
        Self {
            spec,
            memory: VecDeque::with_capacity(MEMORY_CAPACITY),
            snippet_chars,
        }
    }

    /// Remembered outputs, oldest first.
    pub fn memory(&self) -> impl Iterator<Item = &str> {
        self.memory.iter().map(String::as_str)
    }

    pub fn reset_memory(&mut self) {
        self.memory.clear();
    }

    /// Ask the backend to perform `task` in this role.
    ///
    /// Returns the trimmed reply, or `AGENT ERROR: <cause>` on any failure.
    /// Only successful replies are remembered.
    #[instrument(skip_all, fields(role = self.spec.label, task_bytes = task.len()))]
    pub fn think<C: ReasoningClient + ?Sized>(&mut self, client: &C, task: &str) -> String {
        let snippets: Vec<String> = self
            .memory
            .iter()
            .map(|m| truncate_chars(m, self.snippet_chars).to_string())
            .collect();
        let request = ReasoningRequest {
            role: self.spec.label,
            instructions: self.spec.instructions,
            output: self.spec.output,
            memory: &snippets,
            task,
        };

        match client.complete(&request) {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.is_empty() {
                    warn!("reasoning backend returned an empty reply");
                    return format!("{AGENT_ERROR_SENTINEL}: Empty response");
                }
                self.remember(reply.to_string());
                debug!(reply_bytes = reply.len(), "agent replied");
                reply.to_string()
            }
            Err(err) => {
                warn!(err = %format!("{err:#}"), "reasoning call failed");
                format!("{AGENT_ERROR_SENTINEL}: {err:#}")
            }
        }
    }

    fn remember(&mut self, reply: String) {
        if self.memory.len() == MEMORY_CAPACITY {
            self.memory.pop_front();
        }
        self.memory.push_back(reply);
    }
}
