//! Session log artifacts under `<log-dir>/<session-id>/`.
//!
//! Write-only: nothing in the pipeline reads these files back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;

use crate::session::DebugReport;

const MAX_DIR_SUFFIX: u32 = 1000;

#[derive(Debug, Clone)]
pub struct SessionLogPaths {
    pub dir: PathBuf,
    pub report_path: PathBuf,
    pub history_path: PathBuf,
    pub fixed_code_path: PathBuf,
}

impl SessionLogPaths {
    pub fn new(root: &Path, session_id: &str) -> Self {
        let dir = root.join(session_id);
        Self {
            dir: dir.clone(),
            report_path: dir.join("report.json"),
            history_path: dir.join("history.jsonl"),
            fixed_code_path: dir.join("fixed.py"),
        }
    }
}

/// Session id derived from the first history timestamp (or now).
pub fn session_id(report: &DebugReport) -> String {
    let started = report
        .history
        .first()
        .map(|entry| entry.timestamp)
        .unwrap_or_else(Utc::now);
    format!("session-{}", started.format("%Y%m%dT%H%M%S%.3fZ"))
}

/// Write the session's artifacts into a fresh directory under `root`.
///
/// An existing session directory is never reused: a `-1`, `-2`, ... suffix is
/// appended to the id until an unused name is found.
pub fn write_session_log(root: &Path, report: &DebugReport) -> Result<SessionLogPaths> {
    let paths = create_session_dir(root, &session_id(report))?;

    // Write in deterministic order to keep logs stable.
    write_json(&paths.report_path, report)?;
    let mut history = String::new();
    for entry in &report.history {
        history.push_str(&serde_json::to_string(entry).context("serialize history entry")?);
        history.push('\n');
    }
    write_text(&paths.history_path, &history)?;
    if !report.fixed_code.is_empty() {
        let mut code = report.fixed_code.clone();
        code.push('\n');
        write_text(&paths.fixed_code_path, &code)?;
    }

    Ok(paths)
}

fn create_session_dir(root: &Path, id: &str) -> Result<SessionLogPaths> {
    fs::create_dir_all(root).with_context(|| format!("create log dir {}", root.display()))?;
    for n in 0..MAX_DIR_SUFFIX {
        let name = if n == 0 {
            id.to_string()
        } else {
            format!("{id}-{n}")
        };
        let paths = SessionLogPaths::new(root, &name);
        match fs::create_dir(&paths.dir) {
            Ok(()) => return Ok(paths),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("create session log dir {}", paths.dir.display())
                });
            }
        }
    }
    bail!("no free session log dir for {id} under {}", root.display())
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value).context("serialize json")?;
    buf.push('\n');
    write_text(path, &buf)
}
