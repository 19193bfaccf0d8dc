//! Reasoning backend abstraction.
//!
//! The [`ReasoningClient`] trait decouples the agents from the model that
//! answers them. [`CommandReasoner`] pipes a rendered prompt into any CLI
//! that reads a prompt on stdin and prints its answer on stdout. Tests use
//! scripted clients that return predetermined replies.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};

use crate::agents::OutputShape;
use crate::core::text::truncate_chars;
use crate::io::config::ReasoningConfig;
use crate::io::process::run_command_with_timeout;
use crate::io::prompt::PromptEngine;

/// One call into the reasoning backend.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningRequest<'a> {
    /// Role label, e.g. `Expert Code Fixer`.
    pub role: &'a str,
    /// Fixed system instructions for the role.
    pub instructions: &'a str,
    /// Expected shape of the reply.
    pub output: OutputShape,
    /// Most recent memory snippets, oldest first, already truncated.
    pub memory: &'a [String],
    pub task: &'a str,
}

/// Abstraction over reasoning backends.
///
/// Implementations may fail; the calling agent turns any error into sentinel
/// text, so nothing raised here ever reaches the coordinator.
pub trait ReasoningClient {
    fn complete(&self, request: &ReasoningRequest<'_>) -> Result<String>;
}

impl<C: ReasoningClient + ?Sized> ReasoningClient for &C {
    fn complete(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        (**self).complete(request)
    }
}

impl<C: ReasoningClient + ?Sized> ReasoningClient for Box<C> {
    fn complete(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        (**self).complete(request)
    }
}

/// Client that spawns a configured command per request.
pub struct CommandReasoner {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
    engine: PromptEngine,
}

impl CommandReasoner {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            command,
            timeout,
            output_limit_bytes,
            engine: PromptEngine::new(),
        }
    }

    pub fn from_config(config: &ReasoningConfig) -> Self {
        Self::new(
            config.command.clone(),
            Duration::from_secs(config.timeout_secs),
            config.output_limit_bytes,
        )
    }
}

impl ReasoningClient for CommandReasoner {
    #[instrument(skip_all, fields(role = request.role, timeout_secs = self.timeout.as_secs()))]
    fn complete(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        let prompt = self.engine.render(request)?;
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("reasoning command is empty"))?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        debug!(program = %program, prompt_bytes = prompt.len(), "invoking reasoning command");
        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run reasoning command {program}"))?;

        if output.timed_out {
            warn!("reasoning command timed out");
            bail!("reasoning command timed out after {:?}", self.timeout);
        }
        if !output.status.success() {
            let stderr = output.stderr_lossy();
            bail!(
                "reasoning command exited with status {:?}: {}",
                output.status.code(),
                truncate_chars(stderr.trim(), 500)
            );
        }
        if output.stdout_truncated > 0 {
            warn!(bytes = output.stdout_truncated, "reasoning output truncated");
        }
        Ok(output.stdout_lossy().trim().to_string())
    }
}
