use super::dictionary::Dictionary;
use super::{suggestions, tokenizer};
use crate::Suggestion;
use log::debug;
use std::collections::HashSet;

/// Dictionary lookup as seen by the spelling pass.
pub trait SpellProvider {
    fn is_available(&self) -> bool;
    fn check(&self, word: &str) -> bool;
    /// Alternatives for `word`, best first.
    fn suggest(&self, word: &str) -> Vec<String>;
}

/// A loaded dictionary, the user's personal words, and how many alternatives
/// to offer.
pub struct DictionaryProvider {
    dictionary: Dictionary,
    personal_words: HashSet<String>,
    max_suggestions: usize,
}

impl DictionaryProvider {
    pub fn new(dictionary: Dictionary, max_suggestions: usize) -> Self {
        Self {
            dictionary,
            personal_words: HashSet::new(),
            max_suggestions,
        }
    }

    pub fn with_personal_words(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.personal_words
            .extend(words.into_iter().map(|w| w.to_lowercase()));
        self
    }
}

impl SpellProvider for DictionaryProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn check(&self, word: &str) -> bool {
        self.personal_words.contains(&word.to_lowercase()) || self.dictionary.contains(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        suggestions::generate(word, &self.dictionary, self.max_suggestions)
    }
}

/// Spelling pass over a text. Either backed by a provider or unavailable
/// because no dictionary could be found.
pub enum SpellChecker {
    Ready(Box<dyn SpellProvider + Send + Sync>),
    Unavailable,
}

/// Alternatives listed in a spelling suggestion's detail.
const MAX_LISTED: usize = 5;

impl SpellChecker {
    pub fn ready(provider: impl SpellProvider + Send + Sync + 'static) -> Self {
        SpellChecker::Ready(Box::new(provider))
    }

    pub fn is_available(&self) -> bool {
        match self {
            SpellChecker::Ready(provider) => provider.is_available(),
            SpellChecker::Unavailable => false,
        }
    }

    /// Flag every distinct out-of-dictionary word once, at its first occurrence.
    pub fn check(&self, text: &str) -> Vec<Suggestion> {
        let provider = match self {
            SpellChecker::Ready(provider) if provider.is_available() => provider,
            _ => {
                return vec![Suggestion::info(
                    "Dictionary not loaded",
                    "Place en_US.dic and en_US.aff in the dictionaries folder \
                     (run `grammarchk dict download en_US`)",
                )]
            }
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for token in tokenizer::spell_words(text) {
            let word = token.as_str();
            if word.chars().count() < 2 || !seen.insert(word.to_lowercase()) {
                continue;
            }
            if provider.check(word) {
                continue;
            }

            let alternatives: Vec<String> = provider.suggest(word).into_iter().take(MAX_LISTED).collect();
            let detail = if alternatives.is_empty() {
                "No suggestions available".to_string()
            } else {
                format!("Did you mean: {}", alternatives.join(", "))
            };

            found.push(Suggestion::located(
                format!("Spelling: '{}' may be misspelled", word),
                detail,
                token.range(),
                alternatives.into_iter().next(),
            ));
        }

        debug!("Spelling pass flagged {} words", found.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWords(&'static [&'static str]);

    impl SpellProvider for FixedWords {
        fn is_available(&self) -> bool {
            true
        }

        fn check(&self, word: &str) -> bool {
            self.0.iter().any(|w| w.eq_ignore_ascii_case(word))
        }

        fn suggest(&self, word: &str) -> Vec<String> {
            if word.eq_ignore_ascii_case("teh") {
                vec!["the", "tea", "ten", "tech", "tee", "tel"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_unavailable_yields_single_notice() {
        let results = SpellChecker::Unavailable.check("Anything at all, teh end.");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, "Dictionary not loaded");
        assert!(results[0].start.is_none());
    }

    #[test]
    fn test_flags_misspelling_with_span_and_top_replacement() {
        let checker = SpellChecker::ready(FixedWords(&["the", "end"]));
        let results = checker.check("teh end");
        assert_eq!(results.len(), 1);

        let s = &results[0];
        assert_eq!(s.message, "Spelling: 'teh' may be misspelled");
        assert_eq!(s.span(), Some(0..3));
        assert_eq!(s.replacement.as_deref(), Some("the"));
        assert_eq!(
            s.detail.as_deref(),
            Some("Did you mean: the, tea, ten, tech, tee")
        );
    }

    #[test]
    fn test_repeated_misspelling_flagged_once() {
        let checker = SpellChecker::ready(FixedWords(&["and"]));
        let results = checker.check("Teh and teh and TEH");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].span(), Some(0..3));
    }

    #[test]
    fn test_short_tokens_and_missing_alternatives() {
        let checker = SpellChecker::ready(FixedWords(&[]));
        let results = checker.check("x zzqx");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].detail.as_deref(), Some("No suggestions available"));
        assert!(results[0].replacement.is_none());
        assert!(!results[0].is_fixable());
    }
}
