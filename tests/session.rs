use async_trait::async_trait;
use grammarchk::ai::response::parse_response;
use grammarchk::ai::{AiOutcome, AiProvider, RewriteStyle};
use grammarchk::cache::ResultCache;
use grammarchk::checker::dictionary::Dictionary;
use grammarchk::checker::rules::RuleEngine;
use grammarchk::checker::spelling::{DictionaryProvider, SpellChecker};
use grammarchk::corrector::CORRECTED_MESSAGE;
use grammarchk::history::HistoryManager;
use grammarchk::{GrammarChecker, Session, Suggestion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const WORDS: &[&str] = &[
    "i", "have", "has", "a", "an", "apple", "the", "cat", "sat", "on", "mat", "she", "is", "here",
];

fn checker() -> GrammarChecker {
    let words: Vec<String> = WORDS.iter().map(|s| s.to_string()).collect();
    let dictionary = Dictionary::from_words(&words).unwrap();
    GrammarChecker::with_parts(
        SpellChecker::ready(DictionaryProvider::new(dictionary, 5)),
        RuleEngine::standard(&[]).unwrap(),
    )
}

fn session() -> Session {
    Session::with_parts(checker(), ResultCache::default(), HistoryManager::default())
}

/// Replays a scripted outcome and counts calls.
struct ScriptedAi {
    outcome: AiOutcome,
    corrected: Option<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AiProvider for ScriptedAi {
    fn is_configured(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn check_text(&self, _text: &str) -> AiOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    async fn corrected_text_only(&self, _text: &str) -> Option<String> {
        self.corrected.clone()
    }

    async fn rewrite_text(&self, text: &str, style: RewriteStyle) -> Option<String> {
        Some(format!("[{}] {}", style, text))
    }
}

fn ai_issue(message: &str, span: std::ops::Range<usize>, replacement: &str) -> Suggestion {
    Suggestion::located(message, "", span, Some(replacement.to_string()))
}

#[test]
fn quick_check_fix_undo_redo() {
    let mut session = session();
    let text = "I has a apple on the the mat";

    let result = session.quick_check(text);
    assert_eq!(result.suggestions[0].message, CORRECTED_MESSAGE);
    assert_eq!(result.corrected_text.as_deref(), Some("I has an apple on the mat"));

    let fixed = session.apply_all(text, &result).unwrap();
    assert_eq!(fixed, "I has an apple on the mat");

    assert_eq!(session.undo().as_deref(), Some(text));
    assert_eq!(session.redo().as_deref(), Some("I has an apple on the mat"));
    assert!(!session.history().can_redo());
}

#[test]
fn quick_check_is_cached_by_normalized_text() {
    let mut session = session();
    let first = session.quick_check("The cat sat on the the mat.");
    let second = session.quick_check("  the cat sat on the the mat.  ");

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.suggestions[0].message, "✓ Results from cache");
    assert_eq!(session.stats().total_checks(), 2);
}

#[tokio::test]
async fn ai_check_requests_corrected_text_when_missing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = ScriptedAi {
        outcome: AiOutcome::Ok(vec![
            ai_issue("AI: Subject-verb agreement", 2..5, "have"),
            ai_issue("AI: Article error", 6..13, "an apple"),
        ]),
        corrected: Some("I have an apple".to_string()),
        calls: calls.clone(),
    };
    let mut session = session().with_ai_provider(provider);

    let result = session.ai_check("I has a apple").await;
    assert_eq!(result.suggestions[0].message, "✓ AI Grammar Check Complete");
    assert_eq!(result.suggestions[1].message, CORRECTED_MESSAGE);
    assert_eq!(result.corrected_text.as_deref(), Some("I have an apple"));
    assert_eq!(session.stats().top_errors(1), vec![("AI", 2)]);

    let again = session.ai_check("i has a apple").await;
    assert!(again.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ai_check_of_correct_text_offers_no_correction() {
    let text = "The cat sat.";
    let provider = ScriptedAi {
        outcome: parse_response(r#"{"corrected_text": "The cat sat.", "issues": []}"#, text),
        corrected: Some(text.to_string()),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut session = session().with_ai_provider(provider);

    let result = session.ai_check(text).await;
    let messages: Vec<&str> = result.suggestions.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(messages, vec!["✓ AI Grammar Check Complete", "✓ No issues found"]);
    assert!(result.corrected_text.is_none());
    assert!(session.apply_all(text, &result).is_none());
}

#[tokio::test]
async fn ai_rate_limit_is_reported_and_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = ScriptedAi {
        outcome: AiOutcome::RateLimited,
        corrected: None,
        calls: calls.clone(),
    };
    let mut session = session().with_ai_provider(provider);

    let result = session.ai_check("She is here.").await;
    assert_eq!(result.suggestions[0].message, "AI service is rate limited");
    assert!(result.corrected_text.is_none());

    session.ai_check("She is here.").await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rewrite_is_recorded_in_history() {
    let provider = ScriptedAi {
        outcome: AiOutcome::Ok(Vec::new()),
        corrected: None,
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut session = session().with_ai_provider(provider);

    let rewritten = session
        .rewrite("the cat sat", "Concise".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(rewritten, "[concise] the cat sat");

    session.accept_rewrite("the cat sat", &rewritten);
    assert_eq!(session.undo().as_deref(), Some("the cat sat"));
}
