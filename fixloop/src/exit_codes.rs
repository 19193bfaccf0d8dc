//! Stable exit codes for fixloop CLI commands.

/// Command succeeded, or the debug session produced an accepted fix.
pub const OK: i32 = 0;
/// Setup failed: unreadable input, invalid config, or other errors.
pub const INVALID: i32 = 1;
/// `fixloop debug` exhausted its retries without an accepted fix.
pub const EXHAUSTED: i32 = 2;
