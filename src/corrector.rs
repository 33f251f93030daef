use crate::Suggestion;
use log::debug;
use std::ops::Range;

pub const CORRECTED_MESSAGE: &str = "✓ Corrected Version Available";

/// Apply every fixable suggestion to `text`, right to left. Overlapping
/// fixes are not detected; one whose span no longer fits is skipped.
///
/// Returns the corrected text and how many suggestions were fixable, or
/// `None` when nothing is fixable or the result equals the input.
pub fn correct(text: &str, suggestions: &[Suggestion]) -> Option<(String, usize)> {
    let mut fixable: Vec<&Suggestion> = suggestions.iter().filter(|s| s.is_fixable()).collect();
    if fixable.is_empty() {
        return None;
    }
    fixable.sort_by(|a, b| b.start.cmp(&a.start));

    let mut corrected = text.to_string();
    for suggestion in &fixable {
        if let (Some(span), Some(replacement)) = (suggestion.span(), &suggestion.replacement) {
            if valid_span(&corrected, &span) {
                corrected.replace_range(span, replacement);
            } else {
                debug!("Skipping fix with stale span: {}", suggestion.message);
            }
        }
    }

    (corrected != text).then_some((corrected, fixable.len()))
}

/// `suggestions` with a leading "corrected version" entry when a bulk
/// correction exists, plus the corrected text itself.
pub fn with_correction(text: &str, suggestions: Vec<Suggestion>) -> (Vec<Suggestion>, Option<String>) {
    match correct(text, &suggestions) {
        Some((corrected, count)) => {
            let mut merged = Vec::with_capacity(suggestions.len() + 1);
            merged.push(Suggestion::corrected(
                CORRECTED_MESSAGE,
                format!("Found {} fixable issues. Apply all to fix them.", count),
                corrected.clone(),
            ));
            merged.extend(suggestions);
            (merged, Some(corrected))
        }
        None => (suggestions, None),
    }
}

/// Apply a single suggestion to `current`. Returns `None` if the suggestion
/// carries no fix or its span does not fit the current text.
pub fn apply_suggestion(current: &str, suggestion: &Suggestion) -> Option<String> {
    let span = suggestion.span()?;
    let replacement = suggestion.replacement.as_deref()?;
    if span.is_empty() || !valid_span(current, &span) {
        return None;
    }

    let mut edited = current.to_string();
    edited.replace_range(span, replacement);
    Some(edited)
}

fn valid_span(text: &str, span: &Range<usize>) -> bool {
    span.end <= text.len() && text.is_char_boundary(span.start) && text.is_char_boundary(span.end)
}

/// The suggestions still on offer for a text. Applying one removes it.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    active: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { active: suggestions }
    }

    pub fn active(&self) -> &[Suggestion] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Apply the suggestion at `index` to `current`. On success the suggestion
    /// is consumed; on failure the set is unchanged.
    pub fn apply(&mut self, index: usize, current: &str) -> Option<String> {
        let edited = apply_suggestion(current, self.active.get(index)?)?;
        self.active.remove(index);
        Some(edited)
    }
}
