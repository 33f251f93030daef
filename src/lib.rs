pub mod ai;
pub mod cache;
pub mod checker;
pub mod cli;
pub mod config;
pub mod corrector;
pub mod dict;
pub mod history;
pub mod readability;
pub mod session;
pub mod stats;

pub use checker::GrammarChecker;
pub use config::Config;
pub use session::Session;

use serde::{Serialize, Serializer};
use std::ops::Range;

/// One diagnosed issue, optionally anchored to a byte span of the checked text
/// and optionally carrying a mechanical fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub message: String,
    pub detail: Option<String>,
    /// Full corrected text; only set on a "corrected version available" entry.
    pub corrected_text: Option<String>,
    #[serde(rename = "start_index", serialize_with = "serialize_start")]
    pub start: Option<usize>,
    pub length: usize,
    #[serde(rename = "replacement_text")]
    pub replacement: Option<String>,
}

impl Suggestion {
    /// An informational suggestion that is not tied to any position.
    pub fn info(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
            corrected_text: None,
            start: None,
            length: 0,
            replacement: None,
        }
    }

    /// A suggestion covering `span` of the checked text.
    pub fn located(
        message: impl Into<String>,
        detail: impl Into<String>,
        span: Range<usize>,
        replacement: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
            corrected_text: None,
            start: Some(span.start),
            length: span.len(),
            replacement,
        }
    }

    /// A suggestion carrying a whole-text correction.
    pub fn corrected(
        message: impl Into<String>,
        detail: impl Into<String>,
        corrected_text: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
            corrected_text: Some(corrected_text.into()),
            start: None,
            length: 0,
            replacement: None,
        }
    }

    pub fn span(&self) -> Option<Range<usize>> {
        self.start.map(|start| start..start + self.length)
    }

    /// True when the suggestion has a replacement and a non-empty span.
    pub fn is_fixable(&self) -> bool {
        self.start.is_some() && self.length > 0 && self.replacement.is_some()
    }

    /// The message prefix before the first `:`, e.g. "Spelling" or "AI".
    pub fn category(&self) -> &str {
        self.message
            .split(':')
            .next()
            .unwrap_or(&self.message)
            .trim()
    }
}

fn serialize_start<S: Serializer>(start: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match start {
        Some(index) => serializer.serialize_i64(*index as i64),
        None => serializer.serialize_i64(-1),
    }
}

/// Outcome of one check: the suggestions to show plus the bulk correction, if any.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub suggestions: Vec<Suggestion>,
    pub corrected_text: Option<String>,
    pub from_cache: bool,
}

impl CheckResult {
    /// Number of suggestions that point at a span of the text.
    pub fn issue_count(&self) -> usize {
        self.suggestions.iter().filter(|s| s.start.is_some()).count()
    }
}
