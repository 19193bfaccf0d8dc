//! Deterministic, pure logic shared by the repair pipeline.
//!
//! Core modules are free of I/O. Every function here is total over its text
//! inputs: malformed model output is represented as data, never as a panic or
//! an error.

pub mod extract;
pub mod feedback;
pub mod gate;
pub mod history;
pub mod text;
pub mod types;
pub mod verdict;
