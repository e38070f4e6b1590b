//! Code-fence stripping for model replies.

/// Language tags consumed even when the body follows on the same line.
const KNOWN_TAGS: [&str; 6] = ["json", "jsonc", "md", "markdown", "text", "txt"];

/// Strip a fenced code block wrapping the whole reply.
///
/// Accepts a bare fence (```` ``` ````) and a language-tagged fence
/// (```` ```json ````, ```` ```md ````). Any tag alone on the opening line is
/// consumed. A known tag is also consumed when the body starts on the same
/// line, as in ```` ```json{"a":1}``` ````. Replies not wrapped on both ends
/// are returned trimmed but otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = after_open.strip_suffix("```") else {
        return trimmed;
    };
    strip_fence_tag(inner).trim()
}

fn strip_fence_tag(inner: &str) -> &str {
    let tag_len = inner.find(|c: char| !is_tag_char(c)).unwrap_or(inner.len());
    let (tag, body) = inner.split_at(tag_len);
    if tag.is_empty() {
        return inner;
    }
    let alone_on_line = body.starts_with(['\n', '\r']);
    let known = KNOWN_TAGS.iter().any(|known| tag.eq_ignore_ascii_case(known));
    if alone_on_line || known { body } else { inner }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+'
}
