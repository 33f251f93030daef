pub mod openrouter;
pub mod response;

pub use openrouter::OpenRouterClient;

use crate::corrector::CORRECTED_MESSAGE;
use crate::Suggestion;
use async_trait::async_trait;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider is not configured")]
    NotConfigured,

    #[error("Rate limited by the AI service")]
    RateLimited,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("AI service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AiError::Parse(err.to_string())
        } else {
            AiError::Transport(err.to_string())
        }
    }
}

/// Result of one AI grammar check. Transport and payload problems end up
/// here rather than as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    Ok(Vec<Suggestion>),
    /// The service asked us to slow down; retrying later may succeed.
    RateLimited,
    TransportError(String),
    /// The reply could not be read as a structured report.
    ParseFallback {
        raw: String,
        corrected_text: Option<String>,
    },
}

impl From<AiError> for AiOutcome {
    fn from(err: AiError) -> Self {
        match err {
            AiError::RateLimited => AiOutcome::RateLimited,
            AiError::Parse(raw) => AiOutcome::ParseFallback {
                raw,
                corrected_text: None,
            },
            other => AiOutcome::TransportError(other.to_string()),
        }
    }
}

impl AiOutcome {
    /// Suggestions describing this outcome for display.
    pub fn into_suggestions(self) -> Vec<Suggestion> {
        match self {
            AiOutcome::Ok(suggestions) => suggestions,
            AiOutcome::RateLimited => vec![Suggestion::info(
                "AI service is rate limited",
                "Too many requests right now. Wait a moment and try again.",
            )],
            AiOutcome::TransportError(message) => vec![Suggestion::info(
                "Could not connect to AI service",
                format!(
                    "Error: {}\n\nMake sure you have credits in your OpenRouter account.\n\
                     Add credits at: https://openrouter.ai/credits",
                    message
                ),
            )],
            AiOutcome::ParseFallback {
                raw,
                corrected_text,
            } => {
                let mut suggestions = Vec::new();
                if let Some(corrected) = corrected_text {
                    suggestions.push(Suggestion::corrected(
                        CORRECTED_MESSAGE,
                        "Apply the corrections to replace your text",
                        corrected,
                    ));
                }
                suggestions.push(Suggestion::info("AI Analysis", raw));
                suggestions
            }
        }
    }
}

/// Tone requested from a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStyle {
    Professional,
    Casual,
    Formal,
    Concise,
    Elaborate,
    Friendly,
    Academic,
    /// Any other label: a general clarity pass.
    Clarity,
}

impl RewriteStyle {
    pub const ALL: [RewriteStyle; 7] = [
        RewriteStyle::Professional,
        RewriteStyle::Casual,
        RewriteStyle::Formal,
        RewriteStyle::Concise,
        RewriteStyle::Elaborate,
        RewriteStyle::Friendly,
        RewriteStyle::Academic,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            RewriteStyle::Professional => {
                "Rewrite this text in a professional, business-appropriate tone. Keep it clear and polished."
            }
            RewriteStyle::Casual => {
                "Rewrite this text in a casual, conversational tone. Make it friendly and approachable."
            }
            RewriteStyle::Formal => {
                "Rewrite this text in a formal, academic tone. Use proper language and structure."
            }
            RewriteStyle::Concise => {
                "Rewrite this text to be more concise. Remove unnecessary words while keeping the meaning."
            }
            RewriteStyle::Elaborate => {
                "Rewrite this text with more detail and elaboration. Expand on the ideas presented."
            }
            RewriteStyle::Friendly => {
                "Rewrite this text in a warm, friendly tone. Make it personable and engaging."
            }
            RewriteStyle::Academic => {
                "Rewrite this text in an academic style. Use scholarly language and proper citations format if applicable."
            }
            RewriteStyle::Clarity => "Rewrite this text to improve its clarity and flow.",
        }
    }
}

impl FromStr for RewriteStyle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "professional" => RewriteStyle::Professional,
            "casual" => RewriteStyle::Casual,
            "formal" => RewriteStyle::Formal,
            "concise" => RewriteStyle::Concise,
            "elaborate" => RewriteStyle::Elaborate,
            "friendly" => RewriteStyle::Friendly,
            "academic" => RewriteStyle::Academic,
            _ => RewriteStyle::Clarity,
        })
    }
}

impl fmt::Display for RewriteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RewriteStyle::Professional => "professional",
            RewriteStyle::Casual => "casual",
            RewriteStyle::Formal => "formal",
            RewriteStyle::Concise => "concise",
            RewriteStyle::Elaborate => "elaborate",
            RewriteStyle::Friendly => "friendly",
            RewriteStyle::Academic => "academic",
            RewriteStyle::Clarity => "clarity",
        };
        write!(f, "{}", name)
    }
}

/// A remote service that can check and rewrite text.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Model identifier shown to the user.
    fn model(&self) -> &str;

    async fn check_text(&self, text: &str) -> AiOutcome;

    /// Only the corrected text, without a report. `None` on any failure.
    async fn corrected_text_only(&self, text: &str) -> Option<String>;

    async fn rewrite_text(&self, text: &str, style: RewriteStyle) -> Option<String>;
}

/// Drop one pair of double quotes wrapping the whole reply.
pub(crate) fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
