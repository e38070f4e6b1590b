//! Model-backed components built on the structured-response contract.

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::language::Language;
use crate::core::retry::RetryPolicy;
use crate::io::model::ChatModel;
use crate::io::prompt::{PromptEngine, Template};

use self::contract::{ResponseSchema, ask_until, non_blank_text, non_empty_text};

pub mod action;
pub mod contract;
pub mod goals;
pub mod planner;
pub mod research;
pub mod writer;

/// Collaborators shared by every model-backed call of one run.
pub struct AgentContext<'a, M: ?Sized> {
    pub model: &'a M,
    pub prompts: &'a PromptEngine,
    pub retry: RetryPolicy,
    pub language: Language,
}

impl<M: ?Sized> Clone for AgentContext<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ?Sized> Copy for AgentContext<'_, M> {}

impl<'a, M: ChatModel + ?Sized> AgentContext<'a, M> {
    pub fn new(model: &'a M, prompts: &'a PromptEngine, language: Language) -> Self {
        Self {
            model,
            prompts,
            retry: RetryPolicy::default(),
            language,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Render `template` and retry until the reply is a valid `schema` instance.
    pub(crate) fn ask_json<T, C>(
        &self,
        label: &str,
        template: Template,
        schema: &ResponseSchema,
        ctx: C,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        C: Serialize,
    {
        let prompt = self.prompts.render(template, ctx)?;
        ask_until(self.model, &self.retry, label, &prompt, |raw| {
            schema.decode(raw)
        })
    }

    /// Render `template` and retry until the reply has non-empty text.
    pub(crate) fn ask_text<C: Serialize>(
        &self,
        label: &str,
        template: Template,
        ctx: C,
    ) -> Result<String> {
        let prompt = self.prompts.render(template, ctx)?;
        ask_until(self.model, &self.retry, label, &prompt, non_empty_text)
    }

    /// Render `template` and retry until the reply is not blank, keeping it as sent.
    pub(crate) fn ask_plain<C: Serialize>(
        &self,
        label: &str,
        template: Template,
        ctx: C,
    ) -> Result<String> {
        let prompt = self.prompts.render(template, ctx)?;
        ask_until(self.model, &self.retry, label, &prompt, non_blank_text)
    }

    /// Render `template` and accept whatever the model replies.
    pub(crate) fn ask_raw<C: Serialize>(
        &self,
        label: &str,
        template: Template,
        ctx: C,
    ) -> Result<String> {
        let prompt = self.prompts.render(template, ctx)?;
        ask_until(self.model, &self.retry, label, &prompt, |raw| {
            Some(raw.to_string())
        })
    }

    pub(crate) fn language(&self) -> &'static str {
        self.language.as_str()
    }
}

/// Compile an embedded schema; embedded schemas are fixed at build time.
fn embedded_schema(name: &'static str, raw: &str) -> ResponseSchema {
    ResponseSchema::compile(name, raw)
        .unwrap_or_else(|err| panic!("embedded {name} schema should be valid: {err:#}"))
}
