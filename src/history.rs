use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One accepted correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub original_text: String,
    pub corrected_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Linear undo/redo over accepted corrections. The undo side is bounded and
/// drops its oldest entry when full.
#[derive(Debug)]
pub struct HistoryManager {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a correction. Anything that could have been redone is discarded.
    pub fn record(&mut self, original_text: impl Into<String>, corrected_text: impl Into<String>) {
        self.undo.push_back(HistoryEntry {
            original_text: original_text.into(),
            corrected_text: corrected_text.into(),
            timestamp: Utc::now(),
        });
        self.redo.clear();

        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        debug!("History now holds {} entries", self.undo.len());
    }

    /// Step back. The caller restores `original_text` of the returned entry.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo.pop_back()?;
        self.redo.push(entry.clone());
        Some(entry)
    }

    /// Step forward again. The caller restores `corrected_text`.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo.pop()?;
        self.undo.push_back(entry.clone());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undoable entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter().rev()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
