use super::affix::AffixRules;
use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Word list plus affix rules, expanded once and stored as an FST set of
/// lowercased surface forms.
pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Paths of the `.dic`/`.aff` pair for `language` inside `dir`.
    pub fn files_for(dir: &Path, language: &str) -> (PathBuf, PathBuf) {
        (
            dir.join(format!("{}.dic", language)),
            dir.join(format!("{}.aff", language)),
        )
    }

    /// Load the dictionary pair for `language` from `dir`.
    ///
    /// Returns `Ok(None)` when either file is missing so callers can degrade to
    /// running without spell checking.
    pub fn load(dir: &Path, language: &str) -> Result<Option<Self>> {
        let (dic_path, aff_path) = Self::files_for(dir, language);

        if !dic_path.exists() || !aff_path.exists() {
            info!(
                "No dictionary for {} in {} (need {}.dic and {}.aff)",
                language,
                dir.display(),
                language,
                language
            );
            return Ok(None);
        }

        Self::load_from_paths(&dic_path, &aff_path).map(Some)
    }

    /// Load a dictionary from explicit `.dic` and `.aff` paths. Both files are
    /// decoded with the charset named by the affix file's `SET` line.
    pub fn load_from_paths(dic_path: &Path, aff_path: &Path) -> Result<Self> {
        let aff_bytes = fs::read(aff_path)
            .with_context(|| format!("Failed to open affix file: {}", aff_path.display()))?;
        let dic_bytes = fs::read(dic_path)
            .with_context(|| format!("Failed to open dictionary: {}", dic_path.display()))?;

        let encoding = charset(&aff_bytes);
        let (aff, _, _) = encoding.decode(&aff_bytes);
        let (dic, _, _) = encoding.decode(&dic_bytes);

        let rules = AffixRules::parse(&aff)
            .with_context(|| format!("Failed to parse affix file: {}", aff_path.display()))?;

        let dict = Self::from_dic(&dic, &rules)?;
        debug!("Loaded dictionary {} ({})", dic_path.display(), encoding.name());
        Ok(dict)
    }

    /// Build from `.dic` contents. The first line of a `.dic` file is the
    /// approximate entry count and is skipped when numeric.
    pub fn from_dic(dic: &str, rules: &AffixRules) -> Result<Self> {
        let mut lines = dic.lines().peekable();
        if let Some(first) = lines.peek() {
            if first.trim().parse::<usize>().is_ok() {
                lines.next();
            }
        }

        let words: Vec<String> = lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .flat_map(|entry| rules.expand(entry))
            .collect();

        Self::from_words(&words)
    }

    /// Build an in-memory dictionary from plain words.
    pub fn from_words(words: &[String]) -> Result<Self> {
        let mut sorted_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted_words.sort();
        sorted_words.dedup();

        let mut builder = SetBuilder::memory();
        for word in &sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }
        let bytes = builder.into_inner().context("Failed to finalize dictionary")?;
        let set = Set::new(bytes).context("Failed to parse dictionary")?;

        Ok(Self { set })
    }

    /// Check if word exists in dictionary (case-insensitive)
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.to_lowercase().as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Get all words with a given prefix
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Words whose length is within one of `len`, in dictionary order.
    pub fn words_near_length(&self, len: usize, limit: usize) -> Vec<String> {
        let mut words = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if key.len().abs_diff(len) <= 1 {
                if let Ok(word) = String::from_utf8(key.to_vec()) {
                    words.push(word);
                    if words.len() >= limit {
                        break;
                    }
                }
            }
        }

        words
    }
}

/// Encoding declared by a `SET <charset>` line, UTF-8 when absent or unknown.
fn charset(aff: &[u8]) -> &'static Encoding {
    let label = aff
        .split(|&b| b == b'\n')
        .map(|line| line.trim_ascii())
        .find_map(|line| {
            line.strip_prefix(b"SET")
                .filter(|rest| rest.first().is_some_and(u8::is_ascii_whitespace))
        })
        .map(<[u8]>::trim_ascii)
        .filter(|label| !label.is_empty());

    match label {
        Some(label) => Encoding::for_label(label).unwrap_or_else(|| {
            warn!(
                "Unknown dictionary charset {}, reading as UTF-8",
                String::from_utf8_lossy(label)
            );
            UTF_8
        }),
        None => UTF_8,
    }
}
