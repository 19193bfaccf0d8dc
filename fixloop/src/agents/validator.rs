//! Validator role: judges a candidate that has been executed.

use crate::agents::{OutputShape, RoleAgent, RoleSpec};
use crate::core::types::{ExecutionResult, ValidationVerdict};
use crate::core::verdict;
use crate::io::reasoning::ReasoningClient;

pub const VALIDATOR: RoleSpec = RoleSpec {
    label: "Expert Code Validator",
    instructions: include_str!("prompts/validator.md"),
    output: OutputShape::VerdictJson,
};

#[derive(Debug, Clone)]
pub struct Validator {
    agent: RoleAgent,
}

impl Validator {
    pub fn new(snippet_chars: usize) -> Self {
        Self {
            agent: RoleAgent::new(VALIDATOR, snippet_chars),
        }
    }

    /// Ask for a verdict on `candidate`. Returns the raw verdict text.
    pub fn validate<C: ReasoningClient + ?Sized>(
        &mut self,
        client: &C,
        original: &str,
        candidate: &str,
        execution: &ExecutionResult,
    ) -> String {
        let task = format!(
            "Assess whether this code is fixed correctly.\n\
             Return ONLY JSON.\n\n\
             Original Code:\n{original}\n\n\
             Fixed Code:\n{candidate}\n\n\
             Execution Result:\n{}",
            execution.describe()
        );
        self.agent.think(client, &task)
    }

    /// Lenient, fail-closed check for an explicit `VALID` verdict.
    pub fn is_valid(verdict_text: &str) -> bool {
        verdict::is_valid(verdict_text)
    }

    pub fn parse(verdict_text: &str) -> ValidationVerdict {
        verdict::parse_verdict(verdict_text)
    }

    pub fn reset_memory(&mut self) {
        self.agent.reset_memory();
    }
}
