/// Returns at most the first `max_chars` characters of `s`, never splitting a
/// multi-byte character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Body excerpt attached to diagnostics.
pub const PREVIEW_CHARS: usize = 500;

pub fn preview(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(truncate_chars(body, PREVIEW_CHARS).to_string())
    }
}
