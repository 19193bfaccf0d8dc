//! Automated repair loop for short Python programs.
//!
//! `fixloop debug` analyzes a buggy program, then alternates fix, structural
//! check, execution, and validation until a fix is accepted or retries run
//! out. Reasoning is delegated to an external command configured in
//! `fixloop.toml`.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use fixloop::coordinator::{Coordinator, CoordinatorConfig};
use fixloop::core::text::truncate_chars;
use fixloop::exit_codes;
use fixloop::io::config::{DEFAULT_CONFIG_FILE, FixloopConfig, load_config, write_config};
use fixloop::io::executor::{Executor, PythonExecutor};
use fixloop::io::reasoning::CommandReasoner;
use fixloop::io::session_log::write_session_log;
use fixloop::samples::Sample;
use fixloop::session::DebugReport;

#[derive(Parser)]
#[command(
    name = "fixloop",
    version,
    about = "Analyze, fix, run, and validate buggy Python programs"
)]
struct Cli {
    /// Config file (missing file means defaults).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `fixloop.toml`.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Run one repair session on FILE, a bundled sample, or stdin.
    Debug {
        #[arg(conflicts_with = "sample")]
        file: Option<PathBuf>,

        /// Use a bundled buggy program instead of FILE.
        #[arg(long, value_enum)]
        sample: Option<Sample>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Write report.json and history.jsonl under this directory.
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
    /// Run FILE once in a fresh interpreter and print the result as JSON.
    Exec { file: PathBuf },
}

fn main() {
    fixloop::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Debug {
            file,
            sample,
            json,
            log_dir,
        } => {
            let cfg = load_config(&cli.config)?;
            let source = read_source(file.as_deref(), sample)?;
            cmd_debug(&cfg, &source, json, log_dir.as_deref())
        }
        Command::Exec { file } => {
            let cfg = load_config(&cli.config)?;
            cmd_exec(&cfg, &file)
        }
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &FixloopConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_debug(cfg: &FixloopConfig, source: &str, json: bool, log_dir: Option<&Path>) -> Result<i32> {
    let reasoner = CommandReasoner::from_config(&cfg.reasoning);
    let executor = PythonExecutor::from_config(&cfg.executor);
    let mut coordinator = Coordinator::new(reasoner, executor, CoordinatorConfig::from(cfg));

    let report = coordinator.debug(source);

    if let Some(dir) = log_dir {
        let paths = write_session_log(dir, &report)?;
        eprintln!("session log: {}", paths.dir.display());
    }
    if json {
        let payload = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{payload}");
    } else {
        print_summary(&report);
    }

    Ok(if report.success {
        exit_codes::OK
    } else {
        exit_codes::EXHAUSTED
    })
}

fn cmd_exec(cfg: &FixloopConfig, file: &Path) -> Result<i32> {
    let source = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let mut executor = PythonExecutor::from_config(&cfg.executor);
    let result = executor.execute(&source);
    let payload = serde_json::to_string_pretty(&result).context("serialize execution result")?;
    println!("{payload}");
    Ok(exit_codes::OK)
}

fn read_source(file: Option<&Path>, sample: Option<Sample>) -> Result<String> {
    let source = match (file, sample) {
        (_, Some(sample)) => sample.source().to_string(),
        (Some(path), None) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read source from stdin")?;
            buf
        }
    };
    if source.trim().is_empty() {
        bail!("source is empty");
    }
    Ok(source)
}

fn print_summary(report: &DebugReport) {
    let outcome = if report.success { "fixed" } else { "not fixed" };
    println!("{outcome} after {} attempt(s)", report.attempts);
    println!();
    println!("== analysis ==");
    println!("{}", report.analysis.trim());
    println!();
    println!("== history ==");
    for entry in &report.history {
        println!(
            "[{}] {:?} {}: {:?}",
            entry.timestamp.format("%H:%M:%S"),
            entry.agent,
            entry.phase,
            entry.status
        );
    }
    println!();
    println!("== execution ==");
    println!("{}", report.execution_result.describe());
    if !report.validation.is_empty() {
        println!();
        println!("== validation ==");
        println!("{}", truncate_chars(report.validation.trim(), 2000));
    }
    println!();
    println!("== fixed code ==");
    println!("{}", report.fixed_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_takes_precedence_over_stdin() {
        let source = read_source(None, Some(Sample::Runtime)).expect("read");
        assert!(source.contains("safe_divide"));
    }

    #[test]
    fn reads_source_from_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bug.py");
        fs::write(&path, "print(1\n").expect("write");
        assert_eq!(read_source(Some(&path), None).expect("read"), "print(1\n");
    }

    #[test]
    fn blank_file_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("blank.py");
        fs::write(&path, "  \n").expect("write");
        let err = read_source(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("source is empty"));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("fixloop.toml");
        assert_eq!(cmd_init(&path, false).expect("init"), exit_codes::OK);
        assert!(cmd_init(&path, false).is_err());
        assert_eq!(cmd_init(&path, true).expect("force"), exit_codes::OK);
        assert_eq!(load_config(&path).expect("load"), FixloopConfig::default());
    }

    #[test]
    fn cli_parses_debug_flags() {
        let cli = Cli::try_parse_from([
            "fixloop", "debug", "--sample", "logic", "--json", "--log-dir", "logs",
        ])
        .expect("parse");
        match cli.command {
            Command::Debug {
                file,
                sample,
                json,
                log_dir,
            } => {
                assert!(file.is_none());
                assert_eq!(sample, Some(Sample::Logic));
                assert!(json);
                assert_eq!(log_dir, Some(PathBuf::from("logs")));
            }
            _ => panic!("expected debug command"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }
}
