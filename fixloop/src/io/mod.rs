//! Side-effecting adapters: processes, interpreter, config, and logs.

pub mod config;
pub mod executor;
pub mod process;
pub mod prompt;
pub mod reasoning;
pub mod session_log;
