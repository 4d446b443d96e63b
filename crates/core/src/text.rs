//! Short textual representations of posts and comments.

/// Number of characters of a post's text used as its display name.
pub const POST_SYMBOLS: usize = 15;

/// Number of characters of a comment's text used as its display name.
pub const COMMENT_SYMBOLS: usize = 15;

/// Return the first `limit` characters of `text`.
///
/// Counts Unicode scalar values, so multi-byte text (Cyrillic, emoji) is
/// never split inside a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_chars("hello", POST_SYMBOLS), "hello");
    }

    #[test]
    fn exact_length_is_unchanged() {
        let text = "a".repeat(POST_SYMBOLS);
        assert_eq!(truncate_chars(&text, POST_SYMBOLS), text);
    }

    #[test]
    fn long_text_is_cut_at_limit() {
        assert_eq!(
            truncate_chars("The quick brown fox jumps", POST_SYMBOLS),
            "The quick brown"
        );
    }

    #[test]
    fn cyrillic_is_cut_by_characters_not_bytes() {
        let cut = truncate_chars("Тестовый текст поста", COMMENT_SYMBOLS);
        assert_eq!(cut.chars().count(), COMMENT_SYMBOLS);
        assert_eq!(cut, "Тестовый текст ");
    }

    #[test]
    fn zero_limit_yields_empty() {
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
