//! Deterministic, pure logic shared by the orchestration core.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod chunks;
pub mod fence;
pub mod knowledge;
pub mod language;
pub mod plan_parser;
pub mod retry;
pub mod types;
