use super::AiOutcome;
use crate::corrector::CORRECTED_MESSAGE;
use crate::Suggestion;
use log::debug;
use serde::Deserialize;
use std::ops::Range;

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    corrected_text: Option<String>,
    #[serde(default)]
    issues: Option<Vec<Issue>>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    #[serde(default)]
    issue: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    original: Option<String>,
    #[serde(default)]
    replacement: Option<String>,
}

/// Read a model reply into suggestions anchored in `original_text`.
///
/// The reply may wrap its JSON in prose or code fences; the outermost braces
/// are taken as the report.
pub fn parse_response(content: &str, original_text: &str) -> AiOutcome {
    let json = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => {
            debug!("AI reply has no JSON object");
            return AiOutcome::ParseFallback {
                raw: content.to_string(),
                corrected_text: None,
            };
        }
    };

    let report: Report = match serde_json::from_str(json) {
        Ok(report) => report,
        Err(e) => {
            debug!("AI reply is not a valid report: {}", e);
            return AiOutcome::ParseFallback {
                raw: content.to_string(),
                corrected_text: extract_corrected_text(content),
            };
        }
    };

    let mut suggestions = Vec::new();
    let corrected = report
        .corrected_text
        .filter(|text| !text.is_empty() && text.trim() != original_text.trim());
    let has_corrected = corrected.is_some();

    if let Some(corrected) = corrected {
        suggestions.push(Suggestion::corrected(
            CORRECTED_MESSAGE,
            "Apply the corrections to replace your text with the corrected version",
            corrected,
        ));
    }

    let issues = report.issues.unwrap_or_default();
    if issues.is_empty() && !has_corrected {
        suggestions.push(Suggestion::info(
            "✓ No issues found",
            "Your text is grammatically correct!",
        ));
    }

    for issue in issues {
        suggestions.push(issue_suggestion(issue, original_text));
    }

    AiOutcome::Ok(suggestions)
}

fn issue_suggestion(issue: Issue, original_text: &str) -> Suggestion {
    let message = format!(
        "AI: {}",
        issue.issue.as_deref().unwrap_or("Grammar/Style issue")
    );
    let original = issue.original.filter(|s| !s.is_empty());
    let replacement = issue.replacement;

    let mut detail = issue.explanation.unwrap_or_default();
    if let (Some(from), Some(to)) = (&original, &replacement) {
        detail.push_str(&format!("\n\n'{}' → '{}'", from, to));
    }

    match original
        .as_deref()
        .and_then(|needle| find_ignore_case(original_text, needle))
    {
        Some(span) => Suggestion::located(message, detail, span, replacement),
        None => Suggestion::info(message, detail),
    }
}

/// Byte span of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return None;
    }

    for (start, _) in haystack.char_indices() {
        let mut end = start;
        let mut rest = haystack[start..].chars();
        let matched = needle.chars().all(|wanted| match rest.next() {
            Some(found) if found.to_lowercase().eq(wanted.to_lowercase()) => {
                end += found.len_utf8();
                true
            }
            _ => false,
        });
        if matched {
            return Some(start..end);
        }
    }
    None
}

/// Best-effort value of a `"corrected_text"` field in a reply that is not
/// valid JSON.
fn extract_corrected_text(content: &str) -> Option<String> {
    let key = content.find("\"corrected_text\"")?;
    let value_start = key + content[key..].find(':')? + 1;
    let value_end = content[value_start..]
        .find(',')
        .or_else(|| content[value_start..].find('}'))
        .map(|offset| value_start + offset)?;

    let value = content[value_start..value_end]
        .trim()
        .trim_matches('"')
        .replace("\\n", "\n")
        .replace("\\\"", "\"");

    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestions(outcome: AiOutcome) -> Vec<Suggestion> {
        match outcome {
            AiOutcome::Ok(list) => list,
            other => panic!("expected parsed report, got {:?}", other),
        }
    }

    #[test]
    fn test_full_report_in_code_fence() {
        let reply = r#"Here you go:
```json
{
  "corrected_text": "I have an apple",
  "issues": [
    {"issue": "Subject-verb agreement", "explanation": "'I' requires 'have'", "original": "has", "replacement": "have"},
    {"issue": "Article error", "explanation": "Use 'an'", "original": "A APPLE", "replacement": "an apple"}
  ]
}
```"#;
        let list = suggestions(parse_response(reply, "I has a apple"));
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].corrected_text.as_deref(), Some("I have an apple"));

        assert_eq!(list[1].message, "AI: Subject-verb agreement");
        assert_eq!(list[1].span(), Some(2..5));
        assert_eq!(list[1].replacement.as_deref(), Some("have"));
        assert!(list[1].detail.as_deref().unwrap().ends_with("'has' → 'have'"));

        assert_eq!(list[2].span(), Some(6..13));
        assert!(list[2].is_fixable());
    }

    #[test]
    fn test_unanchored_issue_has_no_span() {
        let reply = r#"{"issues": [{"issue": "Tone", "explanation": "Too casual", "original": "gonna"}]}"#;
        let list = suggestions(parse_response(reply, "I will go"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "AI: Tone");
        assert!(list[0].start.is_none());
        assert!(list[0].replacement.is_none());
    }

    #[test]
    fn test_empty_report_means_no_issues() {
        let list = suggestions(parse_response(r#"{"issues": []}"#, "Fine."));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "✓ No issues found");

        let list = suggestions(parse_response(
            r#"{"corrected_text": "The cat sat.", "issues": []}"#,
            "The cat sat.\n",
        ));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].message, "✓ No issues found");
        assert!(list[0].corrected_text.is_none());
    }

    #[test]
    fn test_empty_replacement_deletes_original() {
        let reply = r#"{"corrected_text": "It is done.", "issues": [
            {"issue": "Redundant word", "explanation": "Drop 'really'", "original": "really ", "replacement": ""}
        ]}"#;
        let list = suggestions(parse_response(reply, "It is really done."));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].span(), Some(6..13));
        assert_eq!(list[1].replacement.as_deref(), Some(""));
        assert!(list[1].is_fixable());

        let edited = crate::corrector::apply_suggestion("It is really done.", &list[1]);
        assert_eq!(edited.as_deref(), Some("It is done."));
    }

    #[test]
    fn test_malformed_report_extracts_corrected_text() {
        let reply = r#"{"corrected_text": "Line one\nLine two", "issues": [oops]}"#;
        match parse_response(reply, "line one") {
            AiOutcome::ParseFallback {
                raw,
                corrected_text,
            } => {
                assert_eq!(raw, reply);
                assert_eq!(corrected_text.as_deref(), Some("Line one\nLine two"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_prose_reply_falls_back() {
        match parse_response("Your text looks great.", "text") {
            AiOutcome::ParseFallback {
                raw,
                corrected_text,
            } => {
                assert_eq!(raw, "Your text looks great.");
                assert!(corrected_text.is_none());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_find_ignore_case() {
        assert_eq!(find_ignore_case("I has a apple", "A APPLE"), Some(6..13));
        assert_eq!(find_ignore_case("Café au lait", "CAFÉ"), Some(0..5));
        assert_eq!(find_ignore_case("short", "shorter"), None);
        assert_eq!(find_ignore_case("text", ""), None);
    }
}
