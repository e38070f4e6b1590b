//! Output languages supported end to end (prompts and sentence segmentation).

use std::fmt;
use std::str::FromStr;

/// Raised at startup when the requested output language has no segmentation rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0} (expected English or Russian)")]
pub struct UnsupportedLanguageError(pub String);

/// Language threaded through every prompt and used to segment the corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Russian,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Russian => "Russian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Language::English),
            "russian" => Ok(Language::Russian),
            _ => Err(UnsupportedLanguageError(raw.to_string())),
        }
    }
}
