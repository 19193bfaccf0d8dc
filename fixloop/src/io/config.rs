//! Configuration stored in `fixloop.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::ValidationPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "fixloop.toml";

/// Top-level configuration (TOML).
///
/// Missing fields default to the values below, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FixloopConfig {
    /// Upper bound on fix attempts per session.
    pub max_retries: u32,

    pub validation_policy: ValidationPolicy,

    pub reasoning: ReasoningConfig,

    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Command that reads a prompt on stdin and prints the reply (e.g. `["llm"]`).
    pub command: Vec<String>,

    /// Wall-clock limit for a single reasoning call.
    pub timeout_secs: u64,

    /// Truncate reasoning replies beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Characters kept from each memory snippet replayed into a prompt.
    pub memory_snippet_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Interpreter command; `-u -c <driver>` is appended.
    pub interpreter: Vec<String>,

    /// Hard deadline per execution. On expiry the worker is killed.
    pub timeout_secs: u64,

    /// Truncate captured output beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for FixloopConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            validation_policy: ValidationPolicy::default(),
            reasoning: ReasoningConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            command: vec!["llm".to_string()],
            timeout_secs: 120,
            output_limit_bytes: 200_000,
            memory_snippet_chars: 200,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: vec!["python3".to_string()],
            timeout_secs: 5,
            output_limit_bytes: 100_000,
        }
    }
}

impl FixloopConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(anyhow!("max_retries must be > 0"));
        }
        if is_blank_command(&self.reasoning.command) {
            return Err(anyhow!("reasoning.command must be a non-empty array"));
        }
        if self.reasoning.timeout_secs == 0 {
            return Err(anyhow!("reasoning.timeout_secs must be > 0"));
        }
        if self.reasoning.output_limit_bytes == 0 {
            return Err(anyhow!("reasoning.output_limit_bytes must be > 0"));
        }
        if is_blank_command(&self.executor.interpreter) {
            return Err(anyhow!("executor.interpreter must be a non-empty array"));
        }
        if self.executor.timeout_secs == 0 {
            return Err(anyhow!("executor.timeout_secs must be > 0"));
        }
        if self.executor.output_limit_bytes == 0 {
            return Err(anyhow!("executor.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

fn is_blank_command(command: &[String]) -> bool {
    command.first().is_none_or(|program| program.trim().is_empty())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `FixloopConfig::default()`.
pub fn load_config(path: &Path) -> Result<FixloopConfig> {
    if !path.exists() {
        let cfg = FixloopConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FixloopConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &FixloopConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, FixloopConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("fixloop.toml");
        let cfg = FixloopConfig {
            max_retries: 4,
            validation_policy: ValidationPolicy::Always,
            ..FixloopConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("fixloop.toml");
        fs::write(
            &path,
            "max_retries = 3\nvalidation_policy = \"always\"\n\n[executor]\ntimeout_secs = 9\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.validation_policy, ValidationPolicy::Always);
        assert_eq!(cfg.executor.timeout_secs, 9);
        assert_eq!(cfg.executor.interpreter, vec!["python3".to_string()]);
        assert_eq!(cfg.reasoning, ReasoningConfig::default());
    }

    #[test]
    fn rejects_zero_retries_and_blank_commands() {
        let zero = FixloopConfig {
            max_retries: 0,
            ..FixloopConfig::default()
        };
        assert!(zero.validate().unwrap_err().to_string().contains("max_retries"));

        let mut blank = FixloopConfig::default();
        blank.reasoning.command = vec!["  ".to_string()];
        assert!(blank.validate().unwrap_err().to_string().contains("reasoning.command"));
    }
}
