//! Structured-response contract: invoke the model, parse the reply, retry until valid.

use std::thread;

use anyhow::{Context, Result};
use jsonschema::{Draft, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::fence::strip_code_fence;
use crate::core::retry::{RetryExhaustedError, RetryPolicy, next_attempt};
use crate::io::model::ChatModel;

/// Compiled JSON Schema for one structured reply shape.
pub struct ResponseSchema {
    name: &'static str,
    validator: Validator,
}

impl ResponseSchema {
    /// Compile an embedded Draft 2020-12 schema.
    pub fn compile(name: &'static str, raw: &str) -> Result<Self> {
        let schema: Value =
            serde_json::from_str(raw).with_context(|| format!("parse {name} schema"))?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .with_context(|| format!("compile {name} schema"))?;
        Ok(Self { name, validator })
    }

    /// Decode a raw model reply, or `None` when it is not a valid instance.
    pub fn decode<T: DeserializeOwned>(&self, raw: &str) -> Option<T> {
        let value: Value = match serde_json::from_str(strip_code_fence(raw)) {
            Ok(value) => value,
            Err(err) => {
                debug!(schema = self.name, err = %err, "reply is not JSON");
                return None;
            }
        };
        if let Some(err) = self.validator.iter_errors(&value).next() {
            debug!(schema = self.name, err = %err, "reply does not match schema");
            return None;
        }
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!(schema = self.name, err = %err, "reply does not decode");
                None
            }
        }
    }
}

/// Accept any reply that is non-empty once fences and whitespace are stripped.
pub fn non_empty_text(raw: &str) -> Option<String> {
    let text = strip_code_fence(raw).trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Accept any reply with non-whitespace content, kept exactly as sent.
pub fn non_blank_text(raw: &str) -> Option<String> {
    (!raw.trim().is_empty()).then(|| raw.to_string())
}

/// Send `prompt` until `parse` accepts the reply.
///
/// Model and transport failures propagate immediately. Invalid replies are
/// retried with the identical prompt as long as `policy` allows.
#[instrument(skip_all, fields(label = %label))]
pub fn ask_until<M, T, F>(
    model: &M,
    policy: &RetryPolicy,
    label: &str,
    prompt: &str,
    mut parse: F,
) -> Result<T>
where
    M: ChatModel + ?Sized,
    F: FnMut(&str) -> Option<T>,
{
    let mut attempts = 0u32;
    loop {
        attempts = next_attempt(attempts);
        let reply = model
            .infer(prompt)
            .with_context(|| format!("{label}: model call"))?;
        if let Some(parsed) = parse(&reply) {
            debug!(attempts, "valid reply");
            return Ok(parsed);
        }
        if !policy.allows_another(attempts) {
            return Err(RetryExhaustedError {
                label: label.to_string(),
                attempts,
            }
            .into());
        }
        warn!(label, attempt = attempts, "invalid reply from the model, trying again");
        if !policy.backoff.is_zero() {
            thread::sleep(policy.backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GoalList;
    use crate::test_support::ScriptedModel;

    const LIST_SCHEMA: &str = include_str!("../../schemas/goal_list.schema.json");

    fn schema() -> ResponseSchema {
        ResponseSchema::compile("goal_list", LIST_SCHEMA).expect("schema")
    }

    #[test]
    fn fenced_and_bare_json_decode_alike() {
        let schema = schema();
        let fenced: GoalList = schema
            .decode("```json\n{\"list\": [\"a\"]}\n```")
            .expect("fenced");
        let bare: GoalList = schema.decode("{\"list\": [\"a\"]}").expect("bare");
        assert_eq!(fenced, bare);
    }

    #[test]
    fn missing_required_field_is_invalid() {
        let schema = schema();
        assert!(schema.decode::<GoalList>("{\"items\": []}").is_none());
        assert!(schema.decode::<GoalList>("{\"list\": [1, 2]}").is_none());
        assert!(schema.decode::<GoalList>("Sure! Here is the list").is_none());
    }

    #[test]
    fn converges_after_k_invalid_replies() {
        let model = ScriptedModel::new(["nope", "", "{\"list\": 3}", "{\"list\": [\"x\"]}"]);
        let schema = schema();

        let got: GoalList = ask_until(&model, &RetryPolicy::unbounded(), "goals", "p", |raw| {
            schema.decode(raw)
        })
        .expect("converge");

        assert_eq!(got.list, vec!["x"]);
        assert_eq!(model.calls(), 4);
        assert!(model.prompts().iter().all(|p| p == "p"));
    }

    #[test]
    fn capped_policy_reports_exhaustion() {
        let model = ScriptedModel::new(["bad", "bad", "bad"]);
        let err = ask_until(&model, &RetryPolicy::capped(2), "summary", "p", accept_ok)
            .unwrap_err();

        let exhausted = err
            .downcast_ref::<RetryExhaustedError>()
            .expect("retry exhausted");
        assert_eq!(exhausted.attempts, 2);
        assert_eq!(exhausted.label, "summary");
        assert_eq!(model.calls(), 2);
    }

    fn accept_ok(raw: &str) -> Option<String> {
        (raw == "ok").then(|| raw.to_string())
    }

    #[test]
    fn model_errors_are_not_retried() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let err = ask_until(&model, &RetryPolicy::unbounded(), "goals", "p", non_empty_text)
            .unwrap_err();
        assert!(format!("{err:#}").contains("goals: model call"));
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn text_replies_lose_fences_and_whitespace() {
        assert_eq!(
            non_empty_text("```md\n# Intro\nBody\n```").as_deref(),
            Some("# Intro\nBody")
        );
        assert_eq!(non_empty_text("```\n\n```"), None);
        assert_eq!(non_empty_text("   "), None);
    }

    #[test]
    fn plain_text_replies_are_kept_verbatim() {
        assert_eq!(
            non_blank_text("```md\nshort\n```").as_deref(),
            Some("```md\nshort\n```")
        );
        assert_eq!(non_blank_text(" x \n").as_deref(), Some(" x \n"));
        assert_eq!(non_blank_text(" \n\t"), None);
    }
}
