//! Prompt rendering for reasoning backends that take a single text prompt.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::io::reasoning::ReasoningRequest;

const AGENT_TEMPLATE: &str = include_str!("prompts/agent.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("agent", AGENT_TEMPLATE)
            .expect("agent template should be valid");
        Self { env }
    }

    /// Render the role line, instructions, recent memory, and task.
    pub fn render(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        let template = self.env.get_template("agent").context("load agent template")?;
        let memory: Vec<&str> = request
            .memory
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect();
        let rendered = template
            .render(context! {
                role => request.role,
                instructions => request.instructions.trim(),
                output_format => request.output.describe(),
                memory => memory,
                task => request.task.trim(),
            })
            .context("render agent prompt")?;
        Ok(rendered)
    }
}
