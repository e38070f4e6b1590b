//! Autonomous document agent.
//!
//! Given an objective, Bran asks a chat model for a plan, works through the
//! plan's goals one by one, investigates the reference corpus for goals that
//! need knowledge, and writes Markdown documents section by section from that
//! knowledge. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (plan parsing, chunking, the
//!   knowledge store, retry policy). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (configuration, prompt templates,
//!   model backends, corpus loading, document files).
//! - **[`agents`]**: Model-backed components built on the retry-until-valid
//!   structured-response contract.
//!
//! Orchestration modules ([`investigate`], [`write`], [`orchestrate`]) combine
//! agents with I/O to run one objective end to end.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod investigate;
pub mod io;
pub mod logging;
pub mod orchestrate;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod write;
