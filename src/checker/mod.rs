pub mod affix;
pub mod dictionary;
pub mod rules;
pub mod spelling;
pub mod suggestions;
pub mod tokenizer;

use crate::{Config, Suggestion};
use anyhow::Result;
use dictionary::Dictionary;
use log::{debug, warn};
use rules::RuleEngine;
use spelling::{DictionaryProvider, SpellChecker};

/// The local, synchronous checker: a spelling pass followed by the grammar
/// and style rules.
pub struct GrammarChecker {
    spelling: SpellChecker,
    rules: RuleEngine,
}

impl GrammarChecker {
    pub fn new(config: &Config) -> Result<Self> {
        let dictionary = match &config.dictionary_dir {
            Some(dir) => Dictionary::load(dir, &config.language).unwrap_or_else(|e| {
                warn!("Could not load dictionary {}, spell checking disabled: {:#}", config.language, e);
                None
            }),
            None => {
                warn!("No dictionary directory configured; spell checking disabled");
                None
            }
        };

        let spelling = match dictionary {
            Some(dictionary) => {
                debug!("Dictionary {} has {} forms", config.language, dictionary.len());
                let provider = DictionaryProvider::new(dictionary, config.max_suggestions)
                    .with_personal_words(config.personal_words()?);
                SpellChecker::ready(provider)
            }
            None => SpellChecker::Unavailable,
        };

        let rules = RuleEngine::standard(&config.disabled_rules)?;

        Ok(Self::with_parts(spelling, rules))
    }

    pub fn with_parts(spelling: SpellChecker, rules: RuleEngine) -> Self {
        Self { spelling, rules }
    }

    pub fn spelling_available(&self) -> bool {
        self.spelling.is_available()
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.rule_ids()
    }

    /// Spelling results first, then rule results in rule order. Blank text
    /// yields nothing.
    pub fn check(&self, text: &str) -> Vec<Suggestion> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut found = self.spelling.check(text);
        let spelling_count = found.len();
        found.extend(self.rules.check(text));

        debug!(
            "Checked {} bytes: {} spelling, {} rule suggestions",
            text.len(),
            spelling_count,
            found.len() - spelling_count
        );
        found
    }
}
