//! Coordinator: drives one repair session from analysis to a terminal state.
//!
//! The coordinator owns the agents and the executor, records every step in
//! the session history, and decides when to retry. It never fails: reasoning
//! and execution failures arrive as data and feed the next attempt.

use serde_json::json;
use tracing::{debug, info, instrument};

use crate::agents::{Analyzer, Fixer, Validator};
use crate::core::extract::extract_code;
use crate::core::feedback::{execution_feedback, structural_feedback, validation_feedback};
use crate::core::gate::check_structure;
use crate::core::history::{AgentName, StepStatus};
use crate::core::text::truncate_chars;
use crate::core::types::{ExecutionResult, FixAttempt, ValidationPolicy};
use crate::io::config::FixloopConfig;
use crate::io::executor::Executor;
use crate::io::reasoning::ReasoningClient;
use crate::session::{DebugReport, Phase, Session};

const SUMMARY_CHARS: usize = 200;
const OUTPUT_SUMMARY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum fix attempts per session (at least 1).
    pub max_retries: u32,
    pub validation_policy: ValidationPolicy,
    pub memory_snippet_chars: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&FixloopConfig::default())
    }
}

impl From<&FixloopConfig> for CoordinatorConfig {
    fn from(cfg: &FixloopConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            validation_policy: cfg.validation_policy,
            memory_snippet_chars: cfg.reasoning.memory_snippet_chars,
        }
    }
}

pub struct Coordinator<C, E> {
    client: C,
    executor: E,
    config: CoordinatorConfig,
    analyzer: Analyzer,
    fixer: Fixer,
    validator: Validator,
}

impl<C: ReasoningClient, E: Executor> Coordinator<C, E> {
    pub fn new(client: C, executor: E, config: CoordinatorConfig) -> Self {
        let snippet_chars = config.memory_snippet_chars;
        Self {
            client,
            executor,
            config: CoordinatorConfig {
                max_retries: config.max_retries.max(1),
                ..config
            },
            analyzer: Analyzer::new(snippet_chars),
            fixer: Fixer::new(snippet_chars),
            validator: Validator::new(snippet_chars),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run one repair session on `source`.
    ///
    /// Agent memories start empty for every session. The executor namespace
    /// is not reset: definitions made by earlier executions stay visible.
    #[instrument(skip_all, fields(source_bytes = source.len(), max_retries = self.config.max_retries))]
    pub fn debug(&mut self, source: &str) -> DebugReport {
        self.analyzer.reset_memory();
        self.fixer.reset_memory();
        self.validator.reset_memory();

        let mut session = Session::new();
        info!("debug session started");

        let analysis = self.analyzer.analyze(&self.client, source);
        session.history.record(
            AgentName::Analyzer,
            "Analysis",
            StepStatus::Success,
            truncate_chars(&analysis, SUMMARY_CHARS),
            json!({ "code": source }),
        );
        session.context = analysis.clone();
        session.analysis = analysis;
        session.advance(Phase::Analyzed);

        let max_retries = self.config.max_retries;
        for attempt in 1..=max_retries {
            let retries_remain = attempt < max_retries;

            let raw = self.fixer.fix(&self.client, &session.context, source);
            let candidate = extract_code(&raw);
            session.history.record(
                AgentName::Fixer,
                format!("Fix Attempt {attempt}"),
                if candidate.is_empty() {
                    StepStatus::Empty
                } else {
                    StepStatus::Generated
                },
                truncate_chars(&raw, SUMMARY_CHARS),
                json!({ "code": candidate }),
            );
            session.fix_attempts.push(FixAttempt {
                attempt_number: attempt,
                candidate_code: candidate.clone(),
                raw_model_text: raw,
            });
            session.last_candidate = candidate.clone();
            session.advance(Phase::FixGenerated);

            let gate = check_structure(source, &candidate);
            session.advance(Phase::StructureChecked);
            if let Err(rejection) = gate {
                debug!(attempt, rejection = rejection.as_str(), "candidate rejected by gate");
                let execution = ExecutionResult::invalid_structure(&rejection.to_string());
                session.history.record(
                    AgentName::Executor,
                    format!("Execution Attempt {attempt}"),
                    StepStatus::Skipped,
                    "Skipped due to invalid structure.",
                    json!({ "reason": execution.error }),
                );
                session.last_execution = execution;
                session.advance(Phase::Skipped);
                if retries_remain {
                    session.context = structural_feedback(rejection);
                    continue;
                }
                break;
            }

            let execution = self.executor.execute(&candidate);
            session.history.record(
                AgentName::Executor,
                format!("Execution Attempt {attempt}"),
                if execution.success {
                    StepStatus::Success
                } else {
                    StepStatus::Failed
                },
                format!(
                    "Output: {}",
                    truncate_chars(&execution.output, OUTPUT_SUMMARY_CHARS)
                ),
                json!({ "error": execution.error, "error_kind": execution.error_kind }),
            );
            session.last_execution = execution;
            session.advance(Phase::Executed);

            if !session.last_execution.success
                && retries_remain
                && self.config.validation_policy == ValidationPolicy::SkipOnExecutionFailure
            {
                debug!(attempt, "execution failed; retrying without validation");
                session.context = execution_feedback(&session.last_execution);
                continue;
            }

            let verdict_text = self.validator.validate(
                &self.client,
                source,
                &candidate,
                &session.last_execution,
            );
            let valid = Validator::is_valid(&verdict_text);
            session.history.record(
                AgentName::Validator,
                format!("Validation Attempt {attempt}"),
                if valid {
                    StepStatus::Valid
                } else {
                    StepStatus::Invalid
                },
                truncate_chars(&verdict_text, SUMMARY_CHARS),
                json!({ "raw": verdict_text }),
            );
            session.last_validation = verdict_text;
            session.advance(Phase::Validated);

            if valid && session.last_execution.success {
                info!(attempt, "debug session succeeded");
                return session.finish(true, attempt);
            }

            session.context =
                validation_feedback(&session.last_execution, &session.last_validation);
        }

        info!(attempts = max_retries, "debug session exhausted retries");
        session.finish(false, max_retries)
    }
}
