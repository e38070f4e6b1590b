//! I/O collaborators: configuration, prompts, the chat model, corpus, documents.

pub mod config;
pub mod corpus;
pub mod document;
pub mod model;
pub mod prompt;
