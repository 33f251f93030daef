use super::tokenizer::{context_snippet, plain_words};
use crate::Suggestion;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// One grammar or style check over a whole text.
pub trait Rule: Send + Sync {
    /// Stable identifier, used to disable rules from the configuration.
    fn id(&self) -> &'static str;

    fn evaluate(&self, text: &str) -> Vec<Suggestion>;
}

/// Turns the matched text into its replacement, when a mechanical fix exists.
pub type Fix = fn(&str) -> Option<String>;

fn located(diagnosis: &str, advice: &str, text: &str, start: usize, end: usize, fix: Option<String>) -> Suggestion {
    Suggestion::located(
        format!("{}: '{}'", diagnosis, &text[start..end]),
        format!("{}\nContext: {}", advice, context_snippet(text, start, end - start)),
        start..end,
        fix,
    )
}

/// A regex, a diagnosis and an optional fix for each match.
pub struct PatternRule {
    id: &'static str,
    pattern: Regex,
    diagnosis: &'static str,
    advice: &'static str,
    fix: Option<Fix>,
}

impl PatternRule {
    pub fn new(
        id: &'static str,
        pattern: &str,
        case_insensitive: bool,
        diagnosis: &'static str,
        advice: &'static str,
        fix: Option<Fix>,
    ) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .with_context(|| format!("Invalid pattern for rule {}", id))?;

        Ok(Self {
            id,
            pattern,
            diagnosis,
            advice,
            fix,
        })
    }
}

impl Rule for PatternRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, text: &str) -> Vec<Suggestion> {
        self.pattern
            .find_iter(text)
            .map(|m| {
                let replacement = self.fix.and_then(|fix| fix(m.as_str()));
                located(self.diagnosis, self.advice, text, m.start(), m.end(), replacement)
            })
            .collect()
    }
}

/// The same word twice in a row ("the the"). The fix keeps the first one.
pub struct RepeatedWordRule;

impl Rule for RepeatedWordRule {
    fn id(&self) -> &'static str {
        "repeated-word"
    }

    fn evaluate(&self, text: &str) -> Vec<Suggestion> {
        let words: Vec<_> = plain_words(text).collect();
        let mut found = Vec::new();
        let mut i = 0;

        while i + 1 < words.len() {
            let (first, second) = (&words[i], &words[i + 1]);
            let gap = &text[first.end()..second.start()];

            let repeated = !gap.is_empty()
                && gap.chars().all(char::is_whitespace)
                && first.as_str().to_lowercase() == second.as_str().to_lowercase();

            if repeated {
                found.push(located(
                    "Repeated word",
                    "Remove the duplicate word",
                    text,
                    first.start(),
                    second.end(),
                    Some(first.as_str().to_string()),
                ));
                i += 2;
            } else {
                i += 1;
            }
        }

        found
    }
}

/// Lowercase letter at the start of the text or after `.`, `!` or `?` and whitespace.
pub struct SentenceCapitalRule {
    pattern: Regex,
}

impl SentenceCapitalRule {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"(?:^|[.!?]\s+)([a-z])").context("Invalid sentence pattern")?;
        Ok(Self { pattern })
    }
}

impl Rule for SentenceCapitalRule {
    fn id(&self) -> &'static str {
        "sentence-capital"
    }

    fn evaluate(&self, text: &str) -> Vec<Suggestion> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|letter| {
                Suggestion::located(
                    "Sentence should start with a capital letter",
                    format!(
                        "Capitalize the first letter\nContext: {}",
                        context_snippet(text, letter.start(), letter.len())
                    ),
                    letter.range(),
                    Some(letter.as_str().to_uppercase()),
                )
            })
            .collect()
    }
}

/// The pronoun written as a lone lowercase `i`.
pub struct PronounIRule;

impl Rule for PronounIRule {
    fn id(&self) -> &'static str {
        "pronoun-i"
    }

    fn evaluate(&self, text: &str) -> Vec<Suggestion> {
        let bytes = text.as_bytes();
        let is_letter = |idx: Option<usize>| idx.and_then(|i| bytes.get(i)).is_some_and(u8::is_ascii_alphabetic);

        bytes
            .iter()
            .enumerate()
            .filter(|(idx, b)| **b == b'i' && !is_letter(idx.checked_sub(1)) && !is_letter(Some(idx + 1)))
            .map(|(idx, _)| {
                Suggestion::located(
                    "The pronoun 'I' should be capitalized",
                    "Use 'I' instead of 'i'",
                    idx..idx + 1,
                    Some("I".to_string()),
                )
            })
            .collect()
    }
}

/// Copy the capitalization of the first letter of `like` onto `word`.
fn with_case_of(like: &str, word: &str) -> String {
    let upper = like.chars().next().is_some_and(char::is_uppercase);
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replace the last word of the match, keeping everything before it.
fn swap_last(matched: &str, to: &str) -> Option<String> {
    let split = matched.rfind(char::is_whitespace)?;
    let ws_len = matched[split..].chars().next().map_or(1, char::len_utf8);
    Some(format!("{}{}", &matched[..split + ws_len], to))
}

/// Replace the first word of the match, keeping everything after it.
fn swap_first(matched: &str, to: &str) -> Option<String> {
    let split = matched.find(char::is_whitespace)?;
    Some(format!("{}{}", with_case_of(matched, to), &matched[split..]))
}

fn fix_i_is(m: &str) -> Option<String> {
    swap_last(m, "am")
}

fn fix_are_to_is(m: &str) -> Option<String> {
    swap_last(m, "is")
}

fn fix_a_to_an(m: &str) -> Option<String> {
    // "a" is a single byte, so the rest starts right after it.
    Some(format!("{}{}", with_case_of(m, "an"), &m[1..]))
}

fn fix_an_to_a(m: &str) -> Option<String> {
    Some(format!("{}{}", with_case_of(m, "a"), &m[2..]))
}

fn fix_of_to_have(m: &str) -> Option<String> {
    swap_last(m, "have")
}

fn fix_their_to_there(m: &str) -> Option<String> {
    swap_first(m, "there")
}

fn fix_there_to_their(m: &str) -> Option<String> {
    swap_first(m, "their")
}

fn fix_its_to_it_is(m: &str) -> Option<String> {
    swap_first(m, "it's")
}

fn fix_your_to_you_are(m: &str) -> Option<String> {
    swap_first(m, "you're")
}

fn fix_then_to_than(m: &str) -> Option<String> {
    swap_last(m, "than")
}

fn fix_affect_to_effect(m: &str) -> Option<String> {
    swap_last(m, "effect")
}

fn fix_effect_to_affect(m: &str) -> Option<String> {
    swap_last(m, "affect")
}

fn pattern_rule(
    id: &'static str,
    pattern: &str,
    case_insensitive: bool,
    diagnosis: &'static str,
    advice: &'static str,
    fix: Option<Fix>,
) -> Result<Box<dyn Rule>> {
    Ok(Box::new(PatternRule::new(id, pattern, case_insensitive, diagnosis, advice, fix)?))
}

/// The built-in rule table, in evaluation order.
pub fn standard_rules() -> Result<Vec<Box<dyn Rule>>> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    // Subject-verb agreement
    rules.push(pattern_rule(
        "agreement-i-is",
        r"\b(I)\s+is\b",
        true,
        "Subject-verb agreement error",
        "Use 'I am' instead of 'I is'",
        Some(fix_i_is),
    )?);
    rules.push(pattern_rule(
        "agreement-singular-are",
        r"\b(he|she|it)\s+are\b",
        true,
        "Subject-verb agreement error",
        "Use 'is' instead of 'are'",
        Some(fix_are_to_is),
    )?);
    rules.push(pattern_rule(
        "agreement-plural-subject",
        r"\b(I|you|we|they)\s+(is|was|has)\b",
        true,
        "Subject-verb agreement error",
        "Use 'am/are/were/have' with this subject",
        None,
    )?);
    rules.push(pattern_rule(
        "agreement-singular-subject",
        r"\b(he|she|it)\s+(are|were|have)\b",
        true,
        "Subject-verb agreement error",
        "Use 'is/was/has' with this subject",
        None,
    )?);
    // Articles
    rules.push(pattern_rule(
        "article-a-vowel",
        r"\ba\s+([aeiou]\w+)\b",
        true,
        "Article error",
        "Use 'an' before words starting with a vowel sound",
        Some(fix_a_to_an),
    )?);
    rules.push(pattern_rule(
        "article-an-consonant",
        r"\ban\s+([^aeiou\s]\w+)\b",
        true,
        "Article error",
        "Use 'a' before words starting with a consonant sound",
        Some(fix_an_to_a),
    )?);
    rules.push(pattern_rule(
        "double-negative",
        r"\b(don't|doesn't|didn't|won't|wouldn't|can't|couldn't)\s+\w*\s*(no|nothing|nobody|nowhere|never)\b",
        true,
        "Double negative",
        "Avoid using two negatives together",
        None,
    )?);
    // Common mistakes
    rules.push(pattern_rule(
        "should-of",
        r"\bshould of\b",
        true,
        "Common error",
        "Use 'should have' instead of 'should of'",
        Some(fix_of_to_have),
    )?);
    rules.push(pattern_rule(
        "could-of",
        r"\bcould of\b",
        true,
        "Common error",
        "Use 'could have' instead of 'could of'",
        Some(fix_of_to_have),
    )?);
    rules.push(pattern_rule(
        "would-of",
        r"\bwould of\b",
        true,
        "Common error",
        "Use 'would have' instead of 'would of'",
        Some(fix_of_to_have),
    )?);
    rules.push(pattern_rule(
        "must-of",
        r"\bmust of\b",
        true,
        "Common error",
        "Use 'must have' instead of 'must of'",
        Some(fix_of_to_have),
    )?);
    // Confusions
    rules.push(pattern_rule(
        "their-there",
        r"\btheir\s+(is|are|was|were)\b",
        true,
        "Possible confusion",
        "Did you mean 'there is/are'?",
        Some(fix_their_to_there),
    )?);
    rules.push(pattern_rule(
        "there-their",
        r"\bthere\s+(car|house|book|dog|cat|friend|mother|father|child)\b",
        true,
        "Possible confusion",
        "Did you mean 'their' (possessive)?",
        Some(fix_there_to_their),
    )?);
    rules.push(pattern_rule(
        "its-it-is",
        r"\bits\s+(a|the|very|really|so|quite)\b",
        true,
        "Possible confusion",
        "Did you mean 'it's' (it is)?",
        Some(fix_its_to_it_is),
    )?);
    rules.push(pattern_rule(
        "your-you-are",
        r"\byour\s+(welcome|right|wrong|correct|going|coming|doing)\b",
        true,
        "Possible confusion",
        "Did you mean 'you're' (you are)?",
        Some(fix_your_to_you_are),
    )?);
    rules.push(pattern_rule(
        "then-than",
        r"\b(more|less|better|worse|bigger|smaller|faster|slower)\s+then\b",
        true,
        "Then/than confusion",
        "Use 'than' for comparisons",
        Some(fix_then_to_than),
    )?);
    rules.push(Box::new(RepeatedWordRule));
    rules.push(pattern_rule(
        "missing-space",
        r"[.!?][A-Z]",
        false,
        "Missing space",
        "Add a space after punctuation",
        None,
    )?);
    rules.push(pattern_rule(
        "multiple-spaces",
        r"\s{2,}",
        false,
        "Multiple spaces",
        "Use a single space",
        None,
    )?);
    rules.push(pattern_rule(
        "the-affect",
        r"\bthe\s+affect\b",
        true,
        "Affect/effect confusion",
        "Did you mean 'the effect' (noun)?",
        Some(fix_affect_to_effect),
    )?);
    rules.push(pattern_rule(
        "will-effect",
        r"\bwill\s+effect\b",
        true,
        "Affect/effect confusion",
        "Did you mean 'will affect' (verb)?",
        Some(fix_effect_to_affect),
    )?);

    // Capitalization runs after every grammar rule.
    rules.push(Box::new(SentenceCapitalRule::new()?));
    rules.push(Box::new(PronounIRule));

    Ok(rules)
}

/// Ordered rule set applied to a text.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// The standard table minus any rule whose id is listed in `disabled`.
    pub fn standard(disabled: &[String]) -> Result<Self> {
        let rules = standard_rules()?
            .into_iter()
            .filter(|rule| !disabled.iter().any(|id| id == rule.id()))
            .collect();
        Ok(Self::new(rules))
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Suggestions from every rule, rule by rule, produced lazily.
    pub fn check<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Suggestion> + 'a {
        self.rules.iter().flat_map(move |rule| rule.evaluate(text))
    }
}
