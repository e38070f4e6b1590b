//! Language-model backends.
//!
//! The [`ChatModel`] trait decouples orchestration from the inference service:
//! raw prompt in, raw text out. Tests use scripted models that replay canned
//! replies without network access.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::io::config::ModelConfig;

/// Single-turn, stateless text generation.
pub trait ChatModel {
    fn infer(&self, prompt: &str) -> Result<String>;
}

impl<M: ChatModel + ?Sized> ChatModel for &M {
    fn infer(&self, prompt: &str) -> Result<String> {
        (**self).infer(prompt)
    }
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn infer(&self, prompt: &str) -> Result<String> {
        (**self).infer(prompt)
    }
}

/// Where chat-completion requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// OpenAI-compatible API with bearer auth.
    Direct { base_url: String, api_key: String },
    /// Azure OpenAI deployment addressed by model id, `api-key` header auth.
    Azure {
        endpoint: String,
        api_key: String,
        api_version: String,
    },
}

impl Endpoint {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                if cfg.azure {
                    anyhow!("missing AZURE_OPENAI_API_KEY for the Azure endpoint")
                } else {
                    anyhow!("missing OPENAI_API_KEY for the OpenAI endpoint")
                }
            })?;
        if cfg.azure {
            let endpoint = cfg
                .azure_endpoint
                .clone()
                .ok_or_else(|| anyhow!("missing AZURE_OPENAI_ENDPOINT for the Azure endpoint"))?;
            return Ok(Endpoint::Azure {
                endpoint,
                api_key,
                api_version: cfg.api_version.clone(),
            });
        }
        Ok(Endpoint::Direct {
            base_url: cfg.base_url.clone(),
            api_key,
        })
    }

    fn url(&self, model_id: &str) -> String {
        match self {
            Endpoint::Direct { base_url, .. } => {
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            Endpoint::Azure {
                endpoint,
                api_version,
                ..
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                model_id,
                api_version
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenAI or Azure OpenAI.
pub struct OpenAiChatModel {
    client: reqwest::blocking::Client,
    endpoint: Endpoint,
    model_id: String,
}

impl OpenAiChatModel {
    pub fn new(endpoint: Endpoint, model_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint,
            model_id: model_id.into(),
        })
    }

    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let model_id = cfg
            .model_id
            .clone()
            .ok_or_else(|| anyhow!("missing CHAT_MODEL_ID"))?;
        Self::new(
            Endpoint::from_config(cfg)?,
            model_id,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }
}

impl ChatModel for OpenAiChatModel {
    #[instrument(skip_all, fields(model = %self.model_id, prompt_bytes = prompt.len()))]
    fn infer(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt.trim(),
            }],
        };
        let request = self.client.post(self.endpoint.url(&self.model_id)).json(&body);
        let request = match &self.endpoint {
            Endpoint::Direct { api_key, .. } => request.bearer_auth(api_key),
            Endpoint::Azure { api_key, .. } => request.header("api-key", api_key),
        };

        let completion: ChatCompletion = request
            .send()
            .context("send chat completion request")?
            .error_for_status()
            .context("chat completion request rejected")?
            .json()
            .context("decode chat completion")?;
        let text = completion_text(completion)?;
        debug!(reply_bytes = text.len(), "chat completion received");
        Ok(text)
    }
}

/// Text of the first choice; a null content counts as an empty reply.
fn completion_text(completion: ChatCompletion) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion returned no choices"))?;
    Ok(choice.message.content.unwrap_or_default())
}
