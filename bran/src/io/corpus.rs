//! Corpus loading: read the source document, split it into sentences, and
//! group the sentences into chunks for the investigation loop.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::core::chunks::chunk_sentences;
use crate::core::language::Language;

/// Splits raw text into ordered sentences.
pub trait Segmenter {
    fn sentences(&self, language: Language, text: &str) -> Vec<String>;
}

/// Punctuation-driven sentencizer.
///
/// A boundary is a run of sentence-final punctuation, optionally followed by
/// the language's closing quotes or brackets, followed by whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSentencizer;

static ENGLISH_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?…]+["'”’)\]]*\s+"#).expect("english boundary regex should be valid")
});

static RUSSIAN_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?…]+[»"“”')\]]*\s+"#).expect("russian boundary regex should be valid")
});

fn boundary(language: Language) -> &'static Regex {
    match language {
        Language::English => &ENGLISH_BOUNDARY,
        Language::Russian => &RUSSIAN_BOUNDARY,
    }
}

impl Segmenter for RuleSentencizer {
    fn sentences(&self, language: Language, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for found in boundary(language).find_iter(text) {
            push_trimmed(&mut sentences, &text[start..found.end()]);
            start = found.end();
        }
        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }
}

fn push_trimmed(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

/// Read `path`, segment it, and group sentences into chunks of `sentences_per_chunk`.
pub fn load_corpus<S: Segmenter + ?Sized>(
    path: &Path,
    language: Language,
    segmenter: &S,
    sentences_per_chunk: usize,
) -> Result<Vec<String>> {
    info!(path = %path.display(), "loading corpus");
    let text =
        fs::read_to_string(path).with_context(|| format!("read corpus {}", path.display()))?;
    let sentences = segmenter.sentences(language, &text);
    let chunks = chunk_sentences(&sentences, sentences_per_chunk);
    info!(
        sentences = sentences.len(),
        chunks = chunks.len(),
        "corpus loaded"
    );
    Ok(chunks)
}
