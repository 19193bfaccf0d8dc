//! Automated repair pipeline for short Python programs.
//!
//! A debugging session analyzes a buggy program once, then loops: a fixer
//! proposes a candidate, a structural gate screens it, an executor runs it in
//! a persistent interpreter namespace, and a validator judges the result.
//! The loop stops on the first accepted candidate or when retries run out.
//!
//! - **[`core`]**: Pure logic (code extraction, structural gate, verdict
//!   parsing, retry feedback, history). No I/O.
//! - **[`io`]**: Side effects (reasoning subprocess, interpreter worker,
//!   config, session logs). Behind traits so tests can script them.
//! - **[`agents`]**: Analyzer, fixer, and validator roles over one adapter.
//! - **[`coordinator`]**: The session state machine tying it all together.

pub mod agents;
pub mod coordinator;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod samples;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
