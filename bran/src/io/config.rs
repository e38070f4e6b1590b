//! Bran configuration: optional `bran.toml` overlaid with the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::chunks::DEFAULT_SENTENCES_PER_CHUNK;
use crate::core::retry::RetryPolicy;

/// Bran configuration (TOML + environment).
///
/// Missing fields default to values that work against the public OpenAI API.
/// Secrets are only ever read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BranConfig {
    /// Directory that receives `{title}.md` documents.
    pub output_dir: PathBuf,

    /// Fail the run when the planner reply contains no recognizable field.
    pub strict_plan: bool,

    pub model: ModelConfig,
    pub corpus: CorpusConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model (or Azure deployment) id; `CHAT_MODEL_ID`.
    pub model_id: Option<String>,
    /// Use Azure OpenAI instead of the direct endpoint; `CHAT_MODEL_AZURE`.
    pub azure: bool,
    /// Direct endpoint base URL; `OPENAI_BASE_URL`.
    pub base_url: String,
    /// Azure resource endpoint; `AZURE_OPENAI_ENDPOINT`.
    pub azure_endpoint: Option<String>,
    /// Azure API version; `OPENAI_API_VERSION`.
    pub api_version: String,
    /// `OPENAI_API_KEY` or `AZURE_OPENAI_API_KEY`, never read from or written to TOML.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: None,
            azure: false,
            base_url: "https://api.openai.com/v1".to_string(),
            azure_endpoint: None,
            api_version: "2024-02-01".to_string(),
            api_key: None,
            request_timeout_secs: 10 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorpusConfig {
    /// Source document to research; `DATA_PATH`.
    pub data_path: Option<PathBuf>,
    pub sentences_per_chunk: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per contract call; 0 retries forever.
    pub max_attempts: u32,
    /// Pause before each retry.
    pub backoff_ms: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::capped(self.max_attempts).with_backoff(Duration::from_millis(self.backoff_ms))
    }
}

impl Default for BranConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            strict_plan: false,
            model: ModelConfig::default(),
            corpus: CorpusConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl BranConfig {
    /// Overlay environment variables through `lookup` (usually `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model_id) = lookup("CHAT_MODEL_ID") {
            self.model.model_id = Some(model_id);
        }
        if let Some(azure) = lookup("CHAT_MODEL_AZURE") {
            self.model.azure = parse_flag(&azure);
        }
        if let Some(data_path) = lookup("DATA_PATH") {
            self.corpus.data_path = Some(PathBuf::from(data_path));
        }
        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Some(endpoint) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.model.azure_endpoint = Some(endpoint);
        }
        if let Some(version) = lookup("OPENAI_API_VERSION") {
            self.model.api_version = version;
        }
        let key_var = if self.model.azure {
            "AZURE_OPENAI_API_KEY"
        } else {
            "OPENAI_API_KEY"
        };
        if let Some(api_key) = lookup(key_var) {
            self.model.api_key = Some(api_key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.corpus.data_path.is_none() {
            return Err(anyhow!("corpus.data_path must be set (DATA_PATH)"));
        }
        if self.corpus.sentences_per_chunk == 0 {
            return Err(anyhow!("corpus.sentences_per_chunk must be > 0"));
        }
        let missing = self
            .model
            .model_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty());
        if missing {
            return Err(anyhow!("model.model_id must be set (CHAT_MODEL_ID)"));
        }
        if self.model.request_timeout_secs == 0 {
            return Err(anyhow!("model.request_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// `true`, `1` and `t` (any case) are truthy; everything else is false.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}

/// Load the TOML file (defaults if missing), without environment or validation.
pub fn load_config_file(path: &Path) -> Result<BranConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        return Ok(BranConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BranConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Load config from `path`, overlay the process environment, then validate.
pub fn load_config(path: &Path) -> Result<BranConfig> {
    let mut cfg = load_config_file(path)?;
    cfg.apply_env(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_file(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, BranConfig::default());
        assert_eq!(cfg.corpus.sentences_per_chunk, 20);
    }

    #[test]
    fn env_overlays_file_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bran.toml");
        fs::write(
            &path,
            "output_dir = \"docs\"\n[model]\nmodel_id = \"from-file\"\n[retry]\nmax_attempts = 5\n",
        )
        .expect("write");

        let mut cfg = load_config_file(&path).expect("load");
        cfg.apply_env(env(&[
            ("CHAT_MODEL_ID", "from-env"),
            ("CHAT_MODEL_AZURE", "T"),
            ("DATA_PATH", "corpus.txt"),
            ("AZURE_OPENAI_API_KEY", "azure-key"),
            ("OPENAI_API_KEY", "direct-key"),
        ]));

        assert_eq!(cfg.output_dir, PathBuf::from("docs"));
        assert_eq!(cfg.model.model_id.as_deref(), Some("from-env"));
        assert!(cfg.model.azure);
        assert_eq!(cfg.model.api_key.as_deref(), Some("azure-key"));
        assert_eq!(cfg.corpus.data_path, Some(PathBuf::from("corpus.txt")));
        assert_eq!(cfg.retry.policy(), RetryPolicy::capped(5));
        cfg.validate().expect("valid");
    }

    #[test]
    fn azure_flag_parsing() {
        for (raw, expected) in [("true", true), ("1", true), ("t", true), ("False", false), ("yes", false)] {
            assert_eq!(parse_flag(raw), expected, "flag {raw}");
        }
    }

    #[test]
    fn validate_requires_data_path_and_model() {
        let mut cfg = BranConfig::default();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("DATA_PATH"));

        cfg.corpus.data_path = Some(PathBuf::from("corpus.txt"));
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("CHAT_MODEL_ID"));

        cfg.model.model_id = Some("  ".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("CHAT_MODEL_ID"));

        cfg.model.model_id = Some("gpt-test".to_string());
        cfg.model.request_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));

        cfg.model.request_timeout_secs = 60;
        cfg.validate().expect("valid");
    }

    #[test]
    fn api_key_is_not_serialized() {
        let mut cfg = BranConfig::default();
        cfg.model.api_key = Some("secret".to_string());
        let rendered = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(!rendered.contains("secret"));
    }
}
