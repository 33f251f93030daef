use lazy_static::lazy_static;
use regex::{Match, Regex};
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    /// Letters and apostrophes, the unit the spell checker looks at.
    static ref SPELL_WORD: Regex = Regex::new(r"\b[a-zA-Z']+\b").unwrap();
    /// Any run of word characters, the unit readability counts.
    static ref PLAIN_WORD: Regex = Regex::new(r"\b\w+\b").unwrap();
}

/// Number of characters kept on each side of a match in a context snippet.
const CONTEXT_RADIUS: usize = 20;

/// Tokens eligible for spell checking, with their byte spans.
pub fn spell_words(text: &str) -> impl Iterator<Item = Match<'_>> {
    SPELL_WORD.find_iter(text)
}

/// All word-character runs in `text`.
pub fn plain_words(text: &str) -> impl Iterator<Item = Match<'_>> {
    PLAIN_WORD.find_iter(text)
}

/// Surrounding text for a match at `start..start + len`, with the match itself in
/// brackets and `...` marking truncation on either side.
pub fn context_snippet(text: &str, start: usize, len: usize) -> String {
    let end = (start + len).min(text.len());
    let start = start.min(end);

    let before_len: usize = text[..start]
        .graphemes(true)
        .rev()
        .take(CONTEXT_RADIUS)
        .map(str::len)
        .sum();
    let after_len: usize = text[end..]
        .graphemes(true)
        .take(CONTEXT_RADIUS)
        .map(str::len)
        .sum();

    let ctx_start = start - before_len;
    let ctx_end = end + after_len;

    let prefix = if ctx_start > 0 { "..." } else { "" };
    let suffix = if ctx_end < text.len() { "..." } else { "" };

    format!(
        "{}{}[{}]{}{}",
        prefix,
        &text[ctx_start..start],
        &text[start..end],
        &text[end..ctx_end],
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_words_keep_apostrophes() {
        let words: Vec<&str> = spell_words("Don't stop, it's 42 now").map(|m| m.as_str()).collect();
        assert_eq!(words, vec!["Don't", "stop", "it's", "now"]);
    }

    #[test]
    fn test_context_short_text_is_not_truncated() {
        assert_eq!(context_snippet("a apple", 0, 7), "[a apple]");
    }

    #[test]
    fn test_context_truncates_both_sides() {
        let text = "This is a fairly long sentence with a apple somewhere in the middle of it.";
        let start = text.find("a apple").unwrap();
        let snippet = context_snippet(text, start, 7);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("[a apple]"));
        assert_eq!(snippet, "... long sentence with [a apple] somewhere in the mi...");
    }

    #[test]
    fn test_context_handles_multibyte_text() {
        let text = "café naïve résumé — a apple — über straße";
        let start = text.find("a apple").unwrap();
        let snippet = context_snippet(text, start, 7);
        assert!(snippet.contains("[a apple]"));
    }
}
