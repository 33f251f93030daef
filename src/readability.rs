use crate::checker::tokenizer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref SILENT_ENDING: Regex = Regex::new(r"(?:[^laeiouy]es|ed|[^laeiouy]e)$").unwrap();
    static ref LEADING_Y: Regex = Regex::new(r"^y").unwrap();
    static ref VOWEL_GROUP: Regex = Regex::new(r"[aeiouy]{1,2}").unwrap();
}

/// Flesch readability figures for a text. The default value is the
/// "not applicable" score of a text without words or sentences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReadabilityScore {
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_words_per_sentence: f64,
    /// 0 to 100, higher is easier.
    pub reading_ease: f64,
    /// US school grade, never negative.
    pub grade_level: f64,
}

impl ReadabilityScore {
    pub fn is_applicable(&self) -> bool {
        self.word_count > 0 && self.sentence_count > 0
    }

    pub fn level(&self) -> &'static str {
        if !self.is_applicable() {
            return "Not applicable";
        }
        match self.reading_ease {
            e if e >= 90.0 => "Very Easy (5th grade)",
            e if e >= 80.0 => "Easy (6th grade)",
            e if e >= 70.0 => "Fairly Easy (7th grade)",
            e if e >= 60.0 => "Standard (8th-9th grade)",
            e if e >= 50.0 => "Fairly Difficult (10th-12th grade)",
            e if e >= 30.0 => "Difficult (College)",
            _ => "Very Difficult (College graduate)",
        }
    }
}

pub fn score(text: &str) -> ReadabilityScore {
    if text.trim().is_empty() {
        return ReadabilityScore::default();
    }

    let sentences = SENTENCE_BREAK
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();
    let words: Vec<&str> = tokenizer::plain_words(text).map(|m| m.as_str()).collect();

    if sentences == 0 || words.is_empty() {
        return ReadabilityScore::default();
    }

    let syllables = words
        .iter()
        .map(|w| syllables_in_word(w))
        .sum::<usize>()
        .max(1);

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    let reading_ease = (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).clamp(0.0, 100.0);
    let grade_level = (0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59).max(0.0);

    ReadabilityScore {
        word_count: words.len(),
        sentence_count: sentences,
        average_words_per_sentence: words_per_sentence,
        reading_ease,
        grade_level,
    }
}

fn syllables_in_word(word: &str) -> usize {
    let word = word.trim().to_lowercase();
    if word.chars().count() <= 3 {
        return 1;
    }

    let stripped = SILENT_ENDING.replace(&word, "");
    let stripped = LEADING_Y.replace(&stripped, "");
    VOWEL_GROUP.find_iter(&stripped).count().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_not_applicable() {
        for text in ["", "   \n\t"] {
            let s = score(text);
            assert_eq!(s.word_count, 0);
            assert_eq!(s.sentence_count, 0);
            assert!(!s.is_applicable());
            assert_eq!(s.level(), "Not applicable");
        }
    }

    #[test]
    fn test_punctuation_only_is_not_applicable() {
        let s = score("?!...");
        assert!(!s.is_applicable());
    }

    #[test]
    fn test_simple_sentence_is_very_easy() {
        let s = score("The cat sat.");
        assert_eq!(s.word_count, 3);
        assert_eq!(s.sentence_count, 1);
        assert_eq!(s.reading_ease, 100.0);
        assert_eq!(s.grade_level, 0.0);
        assert_eq!(s.level(), "Very Easy (5th grade)");
    }

    #[test]
    fn test_dense_text_scores_lower() {
        let easy = score("The cat sat. The dog ran.");
        let hard = score(
            "Institutional considerations notwithstanding, comprehensive organizational \
             restructuring necessitates extraordinary administrative deliberation.",
        );
        assert!(hard.reading_ease < easy.reading_ease);
        assert!(hard.grade_level > easy.grade_level);
        assert_eq!(hard.level(), "Very Difficult (College graduate)");
    }

    #[test]
    fn test_syllable_heuristic() {
        assert_eq!(syllables_in_word("cat"), 1);
        assert_eq!(syllables_in_word("table"), 2);
        assert_eq!(syllables_in_word("wanted"), 1);
        assert_eq!(syllables_in_word("happy"), 2);
        assert_eq!(syllables_in_word("rhythm"), 1);
    }
}
