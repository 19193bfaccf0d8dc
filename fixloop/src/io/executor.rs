//! Executor abstraction and the persistent Python worker behind it.
//!
//! The [`Executor`] trait decouples the coordinator from the interpreter.
//! [`PythonExecutor`] keeps one long-lived interpreter process whose globals
//! dict is the session's execution environment: definitions and imports from
//! an earlier run stay visible to later runs. Nothing else touches that
//! namespace.
//!
//! Executed code is NOT sandboxed. It can read and write files, open sockets,
//! and spend CPU until the hard deadline kills the worker.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::text::truncate_bytes_with_notice;
use crate::core::types::{ErrorKind, ExecutionResult};
use crate::io::config::ExecutorConfig;

const DRIVER: &str = include_str!("driver.py");
const REPLY_PREFIX: &str = "@@fixloop-result ";

/// Runs source text against an execution environment it owns.
///
/// Implementations never fail: every problem, including infrastructure
/// trouble, is reported as a failed [`ExecutionResult`].
pub trait Executor {
    fn execute(&mut self, source: &str) -> ExecutionResult;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, source: &str) -> ExecutionResult {
        (**self).execute(source)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&mut self, source: &str) -> ExecutionResult {
        (**self).execute(source)
    }
}

/// Executor backed by a persistent Python worker process.
pub struct PythonExecutor {
    interpreter: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
    worker: Option<Worker>,
}

impl PythonExecutor {
    pub fn new(interpreter: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            interpreter,
            timeout,
            output_limit_bytes,
            worker: None,
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(
            config.interpreter.clone(),
            Duration::from_secs(config.timeout_secs),
            config.output_limit_bytes,
        )
    }

    /// Whether a worker (and therefore a live namespace) currently exists.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn take_or_spawn_worker(&mut self) -> Result<Worker> {
        match self.worker.take() {
            Some(worker) => Ok(worker),
            None => {
                info!(interpreter = ?self.interpreter, "starting interpreter worker");
                Worker::spawn(&self.interpreter)
            }
        }
    }

    fn finish(&self, reply: WorkerReply, stray: &[String]) -> ExecutionResult {
        let mut stdout = reply.stdout;
        for line in stray {
            stdout.push_str(line);
            stdout.push('\n');
        }
        let output = truncate_bytes_with_notice(
            &combine_output(&stdout, &reply.stderr),
            self.output_limit_bytes,
        );
        if reply.ok {
            return ExecutionResult::succeeded(output);
        }
        let kind = ErrorKind::from_category(reply.category.as_deref().unwrap_or("UnknownError"));
        ExecutionResult::failed(kind, reply.message.as_deref().unwrap_or_default(), output)
    }
}

impl Executor for PythonExecutor {
    #[instrument(skip_all, fields(source_bytes = source.len(), timeout_secs = self.timeout.as_secs()))]
    fn execute(&mut self, source: &str) -> ExecutionResult {
        let mut worker = match self.take_or_spawn_worker() {
            Ok(worker) => worker,
            Err(err) => {
                warn!(err = %format!("{err:#}"), "interpreter unavailable");
                return ExecutionResult::failed(
                    ErrorKind::ExecutorUnavailable,
                    &format!("{err:#}"),
                    "",
                );
            }
        };

        if let Err(err) = worker.send(source) {
            warn!(err = %format!("{err:#}"), "interpreter worker rejected request");
            return ExecutionResult::failed(
                ErrorKind::ExecutorUnavailable,
                &format!("{err:#}"),
                "",
            );
        }

        let deadline = Instant::now() + self.timeout;
        let mut stray = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match worker.lines.recv_timeout(remaining) {
                Ok(line) => {
                    // Executed code may leave an unterminated line on the real
                    // stdout, so the reply can start mid-line.
                    let Some(at) = line.find(REPLY_PREFIX) else {
                        stray.push(line);
                        continue;
                    };
                    if at > 0 {
                        stray.push(line[..at].to_string());
                    }
                    let payload = &line[at + REPLY_PREFIX.len()..];
                    let result = match serde_json::from_str::<WorkerReply>(payload) {
                        Ok(reply) => self.finish(reply, &stray),
                        Err(err) => {
                            warn!(err = %err, "malformed worker reply, discarding worker");
                            return ExecutionResult::failed(
                                ErrorKind::ExecutorUnavailable,
                                &format!("malformed worker reply: {err}"),
                                stray.join("\n"),
                            );
                        }
                    };
                    debug!(success = result.success, kind = ?result.error_kind, "execution finished");
                    self.worker = Some(worker);
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        timeout_secs = self.timeout.as_secs(),
                        "execution timed out, killing worker and discarding namespace"
                    );
                    return ExecutionResult::failed(
                        ErrorKind::Timeout,
                        &format!(
                            "execution exceeded {:?}; the execution environment was discarded",
                            self.timeout
                        ),
                        stray.join("\n"),
                    );
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("interpreter worker exited mid-request");
                    return ExecutionResult::failed(
                        ErrorKind::ExecutorUnavailable,
                        "interpreter exited before replying; the execution environment was discarded",
                        stray.join("\n"),
                    );
                }
            }
        }
    }
}

/// Join captured streams: stdout, then stderr on a new line when non-empty.
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        format!("{}\n{}", stdout.trim_end(), stderr)
            .trim()
            .to_string()
    }
}

#[derive(Serialize)]
struct WorkerRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct WorkerReply {
    ok: bool,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
}

/// A running interpreter process plus a channel of its stdout lines.
///
/// Dropping a worker kills the process, which discards its namespace.
struct Worker {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl Worker {
    fn spawn(interpreter: &[String]) -> Result<Self> {
        let (program, args) = interpreter
            .split_first()
            .ok_or_else(|| anyhow!("interpreter command is empty"))?;
        let mut child = Command::new(program)
            .args(args)
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn interpreter {program}"))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            child,
            stdin,
            lines,
        })
    }

    fn send(&mut self, source: &str) -> Result<()> {
        let mut payload =
            serde_json::to_string(&WorkerRequest { code: source }).context("encode request")?;
        payload.push('\n');
        self.stdin
            .write_all(payload.as_bytes())
            .context("write request to interpreter")?;
        self.stdin.flush().context("flush request to interpreter")
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
