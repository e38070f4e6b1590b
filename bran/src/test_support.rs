//! Test-only chat models and run fixtures.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::agents::AgentContext;
use crate::core::language::Language;
use crate::io::model::ChatModel;
use crate::io::prompt::PromptEngine;

/// Chat model replaying queued replies in order and recording every prompt.
///
/// Running out of replies is an error so a test never hangs on a retry loop.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: RefCell::new(replies.into_iter().map(Into::into).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Number of `infer` calls so far, including one that ran out of replies.
    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl ChatModel for ScriptedModel {
    fn infer(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted model has no reply left"))
    }
}

/// Agent context over `model` with English output and unbounded retries.
pub fn agent_context<'a, M: ChatModel + ?Sized>(
    model: &'a M,
    prompts: &'a PromptEngine,
) -> AgentContext<'a, M> {
    AgentContext::new(model, prompts, Language::English)
}

/// `count` chunks named `chunk-0`, `chunk-1`, and so on.
pub fn numbered_chunks(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("chunk-{i}")).collect()
}
