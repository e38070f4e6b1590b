//! Grouping of sentences into fixed-size corpus chunks.

/// Default number of sentences per chunk.
pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 20;

/// Group sentences into newline-joined chunks of at most `size` sentences.
///
/// The final chunk holds the remainder. A `size` of zero is treated as one.
pub fn chunk_sentences<S: AsRef<str>>(sentences: &[S], size: usize) -> Vec<String> {
    sentences
        .chunks(size.max(1))
        .map(|group| {
            group
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}
