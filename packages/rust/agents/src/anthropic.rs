//! Minimal Anthropic Messages API client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use upscnews_shared::{LlmConfig, Result, UpscNewsError};

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// User-Agent string for LLM requests.
const USER_AGENT: &str = concat!("upscnews/", env!("CARGO_PKG_VERSION"));

/// Service name used in upstream errors.
const SERVICE: &str = "llm";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Sends single-turn completions to `{base_url}/messages`.
#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpscNewsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}/messages", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user message under `system` and return the concatenated text
    /// blocks of the reply.
    #[instrument(skip_all, fields(model = %self.model, input_chars = user.len()))]
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: [ChatMessage {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpscNewsError::Network(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status(status, text.trim()));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            UpscNewsError::upstream(SERVICE, format!("unreadable response body: {e}"))
        })?;

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(UpscNewsError::upstream(SERVICE, "response contained no text"));
        }

        debug!(
            output_chars = text.len(),
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
            "completion received"
        );
        Ok(text)
    }
}

fn map_status(status: StatusCode, body: &str) -> UpscNewsError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpscNewsError::config(format!(
            "LLM API rejected the credentials (HTTP {status}): {body}"
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            UpscNewsError::upstream(SERVICE, format!("rate limited (HTTP {status})"))
        }
        _ => UpscNewsError::upstream(SERVICE, format!("HTTP {status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            base_url: format!("{}/v1", server.uri()),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn complete_concatenates_text_blocks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-sonnet-20240620",
                "system": "be brief",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "first "},
                    {"type": "text", "text": "second"}
                ],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&config_for(&server), "sk-test").unwrap();
        let text = client.complete("be brief", "hello").await.unwrap();
        assert_eq!(text, "first second");
    }

    #[tokio::test]
    async fn unauthorized_is_a_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&config_for(&server), "bad").unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        match err {
            UpscNewsError::Config { message } => assert!(message.contains("invalid x-api-key")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&config_for(&server), "k").unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        match err {
            UpscNewsError::Upstream { service, message } => {
                assert_eq!(service, "llm");
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_reply_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"content": []})),
            )
            .mount(&server)
            .await;

        let client = AnthropicClient::new(&config_for(&server), "k").unwrap();
        assert!(matches!(
            client.complete("s", "u").await,
            Err(UpscNewsError::Upstream { .. })
        ));
    }

    #[test]
    fn server_errors_keep_body() {
        let err = map_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "llm error: HTTP 502 Bad Gateway: upstream down");
    }
}
