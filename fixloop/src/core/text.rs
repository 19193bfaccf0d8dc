//! Small text helpers shared by agents, history, and logs.

/// Return the first `max_chars` characters of `text` (char-boundary safe).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate `text` to at most `limit` bytes on a char boundary, appending a
/// notice with the number of bytes dropped.
pub fn truncate_bytes_with_notice(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\n[truncated {} bytes]", &text[..cut], text.len() - cut)
}
