use crate::config::CacheConfig;
use crate::Suggestion;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Which checker produced a cached result. AI results live in their own
/// namespace so a quick check never answers an AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Quick,
    Ai,
}

impl CheckMode {
    fn prefix(self) -> &'static str {
        match self {
            CheckMode::Quick => "",
            CheckMode::Ai => "AI:",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// The trimmed text the suggestions were produced for. Spans are
    /// relative to it.
    source: String,
    suggestions: Vec<Suggestion>,
    created_at: DateTime<Utc>,
}

/// Content-addressed check results with a time to live and a size bound.
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::hours(config.ttl_hours as i64),
            capacity: config.capacity.max(1),
        }
    }

    /// Hex SHA-256 of the mode prefix plus text, lowercased and trimmed.
    pub fn key(mode: CheckMode, text: &str) -> String {
        let normalized = format!("{}{}", mode.prefix(), text).to_lowercase();
        let digest = Sha256::digest(normalized.trim().as_bytes());
        format!("{:x}", digest)
    }

    /// Cached suggestions for `text`, with spans moved onto `text`.
    pub fn lookup(&mut self, mode: CheckMode, text: &str) -> Option<Vec<Suggestion>> {
        self.lookup_at(mode, text, Utc::now())
    }

    pub fn store(&mut self, mode: CheckMode, text: &str, suggestions: Vec<Suggestion>) {
        self.store_at(mode, text, suggestions, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn lookup_at(&mut self, mode: CheckMode, text: &str, now: DateTime<Utc>) -> Option<Vec<Suggestion>> {
        let key = Self::key(mode, text);
        let Some(entry) = self.entries.get(&key) else {
            debug!("Cache miss for {:?} check", mode);
            return None;
        };

        if now - entry.created_at >= self.ttl {
            debug!("Cache entry expired, purging");
            self.entries.remove(&key);
            return None;
        }

        if !same_layout(&entry.source, text.trim()) {
            debug!("Cached {:?} result has a different byte layout, rechecking", mode);
            return None;
        }

        debug!("Cache hit for {:?} check", mode);
        Some(shift_spans(entry.suggestions.clone(), 0, leading_whitespace(text)))
    }

    fn store_at(&mut self, mode: CheckMode, text: &str, suggestions: Vec<Suggestion>, now: DateTime<Utc>) {
        self.entries.insert(
            Self::key(mode, text),
            CacheEntry {
                source: text.trim().to_string(),
                suggestions: shift_spans(suggestions, leading_whitespace(text), 0),
                created_at: now,
            },
        );

        if self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                debug!("Cache full, evicting oldest entry");
                self.entries.remove(&key);
            }
        }
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

// Texts sharing a key can still differ in byte layout when lowercasing
// changes a character's width ("ẞ" and "ß").
fn same_layout(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.char_indices()
            .map(|(i, _)| i)
            .eq(b.char_indices().map(|(i, _)| i))
}

/// Move spans from an origin of `from` to one of `to`. Spans that start
/// before `from` (inside stripped leading whitespace) are dropped.
fn shift_spans(suggestions: Vec<Suggestion>, from: usize, to: usize) -> Vec<Suggestion> {
    suggestions
        .into_iter()
        .filter_map(|mut s| {
            if let Some(start) = s.start {
                s.start = Some(start.checked_sub(from)? + to);
            }
            Some(s)
        })
        .collect()
}
