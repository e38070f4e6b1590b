//! Stable exit codes for the `bran` CLI.

/// The run completed every goal.
pub const OK: i32 = 0;
/// Configuration, corpus, model or document failure; the run was aborted.
pub const FAILED: i32 = 1;
