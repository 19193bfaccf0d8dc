//! Test-only doubles for the reasoning backend and the executor.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::process::{Command, Stdio};

use anyhow::{Result, anyhow};

use crate::core::types::ExecutionResult;
use crate::io::executor::Executor;
use crate::io::reasoning::{ReasoningClient, ReasoningRequest};

/// Owned copy of a [`ReasoningRequest`] seen by [`ScriptedReasoner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub role: String,
    pub instructions: String,
    pub memory: Vec<String>,
    pub task: String,
}

/// Reasoning client with a reply queue per role label.
///
/// A role whose queue is empty fails, which agents surface as sentinel text.
#[derive(Debug, Default)]
pub struct ScriptedReasoner {
    queues: RefCell<HashMap<String, VecDeque<Result<String, String>>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, role: &str, text: impl Into<String>) -> Self {
        self.push(role, Ok(text.into()))
    }

    pub fn failure(self, role: &str, message: impl Into<String>) -> Self {
        self.push(role, Err(message.into()))
    }

    fn push(self, role: &str, entry: Result<String, String>) -> Self {
        self.queues
            .borrow_mut()
            .entry(role.to_string())
            .or_default()
            .push_back(entry);
        self
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl ReasoningClient for ScriptedReasoner {
    fn complete(&self, request: &ReasoningRequest<'_>) -> Result<String> {
        self.requests.borrow_mut().push(RecordedRequest {
            role: request.role.to_string(),
            instructions: request.instructions.to_string(),
            memory: request.memory.to_vec(),
            task: request.task.to_string(),
        });
        let next = self
            .queues
            .borrow_mut()
            .get_mut(request.role)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply for {}", request.role)),
        }
    }
}

/// Executor returning queued results; succeeds with empty output once drained.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    results: VecDeque<ExecutionResult>,
    sources: Vec<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(mut self, result: ExecutionResult) -> Self {
        self.results.push_back(result);
        self
    }

    /// Sources passed to `execute`, in call order.
    pub fn sources(&self) -> Vec<String> {
        self.sources.clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&mut self, source: &str) -> ExecutionResult {
        self.sources.push(source.to_string());
        self.results
            .pop_front()
            .unwrap_or_else(|| ExecutionResult::succeeded(""))
    }
}

/// Panic unless a `python3` interpreter is on `PATH`.
///
/// Interpreter-backed tests call this first so a missing interpreter shows up
/// as a failure instead of a silent pass.
pub fn require_python() {
    let available = Command::new("python3")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    assert!(available, "python3 must be on PATH to run interpreter-backed tests");
}
