use super::{response, strip_quotes, AiError, AiOutcome, AiProvider, RewriteStyle};
use crate::config::AiConfig;
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHECK_PROMPT: &str = r#"You are a professional grammar and writing assistant. Analyze the provided text and provide corrections.

CRITICAL: You MUST include a 'corrected_text' field with the fully corrected version of the entire input text.

Format your response as JSON with this EXACT structure:
{
  "corrected_text": "The complete corrected version of the entire input text goes here",
  "issues": [
    {
      "issue": "brief description",
      "explanation": "detailed explanation",
      "original": "the exact text that needs to be changed",
      "replacement": "the corrected text to replace it with"
    }
  ]
}

Example for input 'I has a apple':
{
  "corrected_text": "I have an apple",
  "issues": [
    {"issue": "Subject-verb agreement", "explanation": "'I' requires 'have' not 'has'", "original": "has", "replacement": "have"},
    {"issue": "Article error", "explanation": "Use 'an' before vowel sounds", "original": "a apple", "replacement": "an apple"}
  ]
}

IMPORTANT: The 'original' field must contain the EXACT text from the input that needs changing. The 'replacement' field must contain the corrected version.

If the text is perfect: {"corrected_text": "[exact original text]", "issues": []}"#;

const CORRECT_ONLY_PROMPT: &str = "You are a grammar correction assistant. Return ONLY the corrected version of the text \
with all grammar, spelling, and punctuation errors fixed. Do not add explanations or comments.";

const REWRITE_SUFFIX: &str =
    "Return ONLY the rewritten text without any explanations, comments, or quotation marks around it.";

/// Chat-completions client for OpenRouter (or any OpenAI-compatible endpoint).
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, config: &AiConfig) -> Result<Self, AiError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AiError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens,
        };

        debug!("Sending request to {} with model {}", self.endpoint, self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "https://github.com/grammarchk")
            .header("X-Title", "grammarchk")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("AI request failed: {}", e);
                AiError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || body.contains("rate") || body.contains("limit") {
                warn!("AI service rate limited the request ({})", status);
                return Err(AiError::RateLimited);
            }
            error!("AI service error ({}): {}", status, body);
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let reply: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Parse(format!("{}: {}", e, body)))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AiError::Parse("No content in response".to_string()))
    }
}

#[async_trait]
impl AiProvider for OpenRouterClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn check_text(&self, text: &str) -> AiOutcome {
        let prompt = format!("Please check this text:\n\n{}", text);
        match self.complete(CHECK_PROMPT, &prompt, 0.3, 1000).await {
            Ok(content) => response::parse_response(&content, text),
            Err(e) => e.into(),
        }
    }

    async fn corrected_text_only(&self, text: &str) -> Option<String> {
        match self.complete(CORRECT_ONLY_PROMPT, text, 0.3, 1000).await {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Corrected-text request failed: {}", e);
                None
            }
        }
    }

    async fn rewrite_text(&self, text: &str, style: RewriteStyle) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let system = format!("{} {}", style.prompt(), REWRITE_SUFFIX);
        match self.complete(&system, text, 0.7, 2000).await {
            Ok(content) => Some(strip_quotes(&content).to_string()),
            Err(e) => {
                warn!("Rewrite failed: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> OpenRouterClient {
        let config = AiConfig {
            endpoint: format!("{}/api/v1/chat/completions", server.url()),
            ..Default::default()
        };
        OpenRouterClient::new("sk-test", &config).unwrap()
    }

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let result = OpenRouterClient::new("   ", &AiConfig::default());
        assert!(matches!(result, Err(AiError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_check_text_parses_report() {
        let mut server = mockito::Server::new_async().await;
        let report = r#"{"corrected_text": "I have an apple", "issues": [{"issue": "Article error", "explanation": "Use 'an'", "original": "a apple", "replacement": "an apple"}]}"#;
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("x-title", "grammarchk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(report))
            .create_async()
            .await;

        let client = client_for(&server);
        match client.check_text("I has a apple").await {
            AiOutcome::Ok(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].corrected_text.as_deref(), Some("I have an apple"));
                assert_eq!(list[1].span(), Some(6..13));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_429_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.check_text("text").await, AiOutcome::RateLimited);
    }

    #[tokio::test]
    async fn test_error_body_mentioning_limit_is_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(402)
            .with_body(r#"{"error": "credit limit reached"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert_eq!(client.check_text("text").await, AiOutcome::RateLimited);
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(500)
            .with_body("internal failure")
            .create_async()
            .await;

        let client = client_for(&server);
        match client.check_text("text").await {
            AiOutcome::TransportError(message) => assert!(message.contains("500")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_garbled_envelope_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.check_text("text").await,
            AiOutcome::ParseFallback { .. }
        ));
    }

    #[tokio::test]
    async fn test_rewrite_strips_quotes() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_body(completion("\"Please find the report attached.\""))
            .create_async()
            .await;

        let client = client_for(&server);
        let rewritten = client
            .rewrite_text("here's the report", RewriteStyle::Professional)
            .await;
        assert_eq!(rewritten.as_deref(), Some("Please find the report attached."));
    }
}
