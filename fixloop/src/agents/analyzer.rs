//! Analyzer role: one diagnostic report per session.

use crate::agents::{OutputShape, RoleAgent, RoleSpec};
use crate::io::reasoning::ReasoningClient;

pub const ANALYZER: RoleSpec = RoleSpec {
    label: "Expert Code Analyzer",
    instructions: include_str!("prompts/analyzer.md"),
    output: OutputShape::PlainReport,
};

#[derive(Debug, Clone)]
pub struct Analyzer {
    agent: RoleAgent,
}

impl Analyzer {
    pub fn new(snippet_chars: usize) -> Self {
        Self {
            agent: RoleAgent::new(ANALYZER, snippet_chars),
        }
    }

    /// Describe every bug in `source`. Failure comes back as sentinel text.
    pub fn analyze<C: ReasoningClient + ?Sized>(&mut self, client: &C, source: &str) -> String {
        let task = format!(
            "Analyze the following Python code and describe ALL bugs.\n\
             Follow the required format strictly.\n\n\
             Code to analyze:\n{source}"
        );
        self.agent.think(client, &task)
    }

    pub fn reset_memory(&mut self) {
        self.agent.reset_memory();
    }
}
