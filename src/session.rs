use crate::ai::{AiOutcome, AiProvider, OpenRouterClient, RewriteStyle};
use crate::cache::{CheckMode, ResultCache};
use crate::checker::GrammarChecker;
use crate::corrector::{self, SuggestionSet, CORRECTED_MESSAGE};
use crate::history::HistoryManager;
use crate::stats::StatisticsCollector;
use crate::{CheckResult, Config, Suggestion};
use anyhow::Result;
use log::{debug, info, warn};

/// One user's working state: the checker plus the cache, history and
/// statistics built up across checks.
pub struct Session {
    checker: GrammarChecker,
    cache: ResultCache,
    history: HistoryManager,
    stats: StatisticsCollector,
    ai: Option<Box<dyn AiProvider>>,
    active: SuggestionSet,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let checker = GrammarChecker::new(config)?;
        let mut session = Self::with_parts(
            checker,
            ResultCache::new(&config.cache),
            HistoryManager::new(config.history_limit),
        );

        if let Some(key) = config.resolve_api_key() {
            match OpenRouterClient::new(key, &config.ai) {
                Ok(client) => session.ai = Some(Box::new(client)),
                Err(e) => warn!("AI provider unavailable: {}", e),
            }
        }

        Ok(session)
    }

    pub fn with_parts(checker: GrammarChecker, cache: ResultCache, history: HistoryManager) -> Self {
        Self {
            checker,
            cache,
            history,
            stats: StatisticsCollector::new(),
            ai: None,
            active: SuggestionSet::default(),
        }
    }

    pub fn with_ai_provider(mut self, provider: impl AiProvider + 'static) -> Self {
        self.ai = Some(Box::new(provider));
        self
    }

    pub fn checker(&self) -> &GrammarChecker {
        &self.checker
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn stats(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.as_ref().is_some_and(|ai| ai.is_configured())
    }

    /// Suggestions from the last check that have not been applied yet.
    pub fn active_suggestions(&self) -> &[Suggestion] {
        self.active.active()
    }

    /// Local spelling and rule check, served from the cache when possible.
    pub fn quick_check(&mut self, text: &str) -> CheckResult {
        if text.trim().is_empty() {
            return nothing_to_check();
        }

        if let Some(cached) = self.cache.lookup(CheckMode::Quick, text) {
            let (listed, corrected_text) = corrector::with_correction(text, cached);
            let mut suggestions = vec![Suggestion::info("✓ Results from cache", "Instant results!")];
            suggestions.extend(listed);
            self.stats.record_check();
            return self.finish(suggestions, corrected_text, true);
        }

        let results = self.checker.check(text);
        for suggestion in &results {
            self.record_error(suggestion);
        }

        let found_any = !results.is_empty();
        let (mut suggestions, corrected_text) = corrector::with_correction(text, results.clone());
        if !found_any {
            suggestions.push(Suggestion::info("No issues found!", "Your text looks good."));
        }

        self.cache.store(CheckMode::Quick, text, results);
        self.stats.record_check();
        self.finish(suggestions, corrected_text, false)
    }

    /// Check with the AI provider. Positional suggestions from the local
    /// checker follow the AI results.
    pub async fn ai_check(&mut self, text: &str) -> CheckResult {
        if text.trim().is_empty() {
            return nothing_to_check();
        }

        let local: Vec<Suggestion> = self
            .checker
            .check(text)
            .into_iter()
            .filter(|s| s.start.is_some())
            .collect();

        if let Some(cached) = self.cache.lookup(CheckMode::Ai, text) {
            let mut suggestions = vec![Suggestion::info("✓ AI Results from cache", "Instant results!")];
            suggestions.extend(cached);
            let corrected_text = first_corrected(&suggestions);
            suggestions.extend(local);
            self.stats.record_check();
            return self.finish(suggestions, corrected_text, true);
        }

        let Some(ai) = self.ai.as_ref().filter(|ai| ai.is_configured()) else {
            info!("AI check requested without a configured provider");
            return CheckResult {
                suggestions: vec![Suggestion::info(
                    "AI not configured",
                    "Set GRAMMARCHK_API_KEY or put your OpenRouter API key in api-key.txt in the \
                     config directory to enable AI-powered suggestions\n\
                     Get your key at: https://openrouter.ai/keys",
                )],
                ..Default::default()
            };
        };

        let outcome = ai.check_text(text).await;
        let mut results = match outcome {
            AiOutcome::Ok(list) => list,
            other => {
                debug!("AI check did not produce a report: {:?}", other);
                let mut suggestions = other.into_suggestions();
                let corrected_text = first_corrected(&suggestions);
                suggestions.extend(local);
                return self.finish(suggestions, corrected_text, false);
            }
        };

        if !results.is_empty() {
            if first_corrected(&results).is_none() && results.len() > 1 {
                let corrected = ai.corrected_text_only(text).await;
                if let Some(corrected) = corrected.filter(|c| c.trim() != text.trim()) {
                    results.insert(
                        0,
                        Suggestion::corrected(
                            CORRECTED_MESSAGE,
                            "Apply the corrections to replace your text",
                            corrected,
                        ),
                    );
                }
            }
            results.insert(
                0,
                Suggestion::info(
                    "✓ AI Grammar Check Complete",
                    format!("Powered by {}", ai.model()),
                ),
            );
        }

        for suggestion in &results {
            if suggestion.message.starts_with("AI:") {
                self.stats.record_error(suggestion.category());
            }
        }

        let mut suggestions = results.clone();
        if suggestions.is_empty() {
            suggestions.push(Suggestion::info(
                "No issues found!",
                "AI analysis complete - your text looks excellent.",
            ));
        }
        let corrected_text = first_corrected(&suggestions);
        suggestions.extend(local);

        self.cache.store(CheckMode::Ai, text, results);
        self.stats.record_check();
        self.finish(suggestions, corrected_text, false)
    }

    /// Apply the active suggestion at `index` to `current` and record the edit.
    pub fn apply_suggestion(&mut self, current: &str, index: usize) -> Option<String> {
        let edited = self.active.apply(index, current)?;
        self.history.record(current, edited.clone());
        Some(edited)
    }

    /// Accept the bulk correction of `result`, if it changes anything.
    pub fn apply_all(&mut self, current: &str, result: &CheckResult) -> Option<String> {
        let corrected = result
            .corrected_text
            .clone()
            .or_else(|| first_corrected(&result.suggestions))?;
        if corrected == current {
            return None;
        }
        self.history.record(current, corrected.clone());
        self.active = SuggestionSet::default();
        Some(corrected)
    }

    pub async fn rewrite(&self, text: &str, style: RewriteStyle) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let ai = self.ai.as_ref().filter(|ai| ai.is_configured())?;
        ai.rewrite_text(text, style).await
    }

    pub fn accept_rewrite(&mut self, original: &str, rewritten: &str) {
        self.history.record(original, rewritten);
        self.active = SuggestionSet::default();
    }

    /// Text to restore after stepping back, if there is anything to undo.
    pub fn undo(&mut self) -> Option<String> {
        self.history.undo().map(|entry| entry.original_text)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.history.redo().map(|entry| entry.corrected_text)
    }

    fn record_error(&mut self, suggestion: &Suggestion) {
        let message = &suggestion.message;
        if message.starts_with("Spelling:") || message.starts_with("AI:") || message.contains("error") {
            self.stats.record_error(suggestion.category());
        }
    }

    fn finish(&mut self, suggestions: Vec<Suggestion>, corrected_text: Option<String>, from_cache: bool) -> CheckResult {
        self.active = SuggestionSet::new(suggestions.clone());
        CheckResult {
            suggestions,
            corrected_text,
            from_cache,
        }
    }
}

fn nothing_to_check() -> CheckResult {
    CheckResult {
        suggestions: vec![Suggestion::info(
            "Nothing to check",
            "Paste or type some text first.",
        )],
        ..Default::default()
    }
}

fn first_corrected(suggestions: &[Suggestion]) -> Option<String> {
    suggestions.iter().find_map(|s| s.corrected_text.clone())
}
