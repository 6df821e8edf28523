//! Chat completion clients
//!
//! Backends:
//!   OpenAiClient    - OpenAI chat completions, or any compatible `base_url`
//!   AnthropicClient - Anthropic Messages API
//!
//! Both speak plain HTTP through reqwest; the model sees the document only
//! through the system prompt built by [`ChatClient::ask`].

use crate::config::{LlmConfig, Provider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Instruction prepended to the document context.
pub const SYSTEM_PROMPT: &str = "You are a professional PDF document analysis assistant. \
Answer the user's question based on the following document content.";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
    #[error("no API key for {provider}: set llm.api_key or {env}")]
    MissingCredential {
        provider: &'static str,
        env: &'static str,
    },
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("response carried no answer text: {0}")]
    UnexpectedResponse(String),
}

// ── Messages ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Messages for one question: the document as system prompt (when given),
/// then the question.
pub fn question_messages(question: &str, context: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(context) = context {
        messages.push(Message::system(format!(
            "{SYSTEM_PROMPT}\n\nDocument content:\n{context}"
        )));
    }
    messages.push(Message::user(question));
    messages
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError>;

    fn model(&self) -> &str;

    async fn ask(&self, question: &str, context: Option<&str>) -> Result<String, LlmError> {
        let messages = question_messages(question, context);
        self.chat(&messages).await
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let text = resp.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status,
            message: error_message(&text),
        });
    }
    Ok(resp.json().await?)
}

/// `error.message` or `message` from a JSON error body, else the body itself.
fn error_message(text: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(text).ok().and_then(|body| {
        body["error"]["message"]
            .as_str()
            .or_else(|| body["message"].as_str())
            .map(str::to_string)
    });
    match from_json {
        Some(message) => message,
        None if text.trim().is_empty() => "unknown API error".to_string(),
        None => text.trim().to_string(),
    }
}

/// Answer text of a chat completions reply.
fn openai_answer(json: &serde_json::Value) -> Result<String, LlmError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::UnexpectedResponse(json.to_string()))
}

/// Text of the first content block of a Messages API reply.
fn anthropic_answer(json: &serde_json::Value) -> Result<String, LlmError> {
    json["content"]
        .as_array()
        .and_then(|blocks| blocks.first())
        .and_then(|b| b["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| LlmError::UnexpectedResponse(json.to_string()))
}

// ── OpenAI (and compatible endpoints) ─────────────────────────────────────────

pub struct OpenAiClient {
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model":    self.model,
            "messages": messages,
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = temperature.into();
        }
        body
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        debug!(model = %self.model, messages = messages.len(), "openai chat request");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages))
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        openai_answer(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ── Anthropic ─────────────────────────────────────────────────────────────────

pub struct AnthropicClient {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 4096,
            temperature: None,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Messages API body: system prompt split out of the message list.
    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let conversation: Vec<&Message> =
            messages.iter().filter(|m| m.role != Role::System).collect();

        let mut body = serde_json::json!({
            "model":      self.model,
            "messages":   conversation,
            "max_tokens": self.max_tokens,
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system);
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = temperature.into();
        }
        body
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        debug!(model = %self.model, messages = messages.len(), "anthropic chat request");
        let resp = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(messages))
            .send()
            .await?;

        let json = check_response_status(resp).await?;
        anthropic_answer(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Build the client named by `config.provider`.
pub fn client_from_config(config: &LlmConfig) -> Result<Box<dyn ChatClient>, LlmError> {
    let api_key = config
        .resolve_api_key()
        .ok_or(LlmError::MissingCredential {
            provider: config.provider.name(),
            env: config.provider.api_key_env(),
        })?;
    let model = config.model_name().to_string();

    match config.provider {
        Provider::OpenAi => {
            let mut client = OpenAiClient::new(api_key, model);
            if let Some(base_url) = config.base_url.as_deref().filter(|u| !u.is_empty()) {
                client = client.with_base_url(base_url);
            }
            client.max_tokens = Some(config.max_tokens);
            client.temperature = config.temperature;
            Ok(Box::new(client))
        }
        Provider::Anthropic => {
            let mut client = AnthropicClient::new(api_key, model);
            client.max_tokens = config.max_tokens;
            client.temperature = config.temperature;
            Ok(Box::new(client))
        }
    }
}

/// Parse a provider name as written on the command line or in old configs.
pub fn parse_provider(name: &str) -> Result<Provider, LlmError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Provider::OpenAi),
        "anthropic" | "claude" => Ok(Provider::Anthropic),
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Serve one HTTP response on a local port and return its base URL.
    async fn serve_once(status: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    /// Consume headers and a `Content-Length` body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn local_client(base_url: String) -> OpenAiClient {
        let mut client = OpenAiClient::new("sk-test", "gpt-test").with_base_url(base_url);
        client.client = reqwest::Client::builder().no_proxy().build().unwrap();
        client
    }

    #[tokio::test]
    async fn test_html_error_keeps_status() {
        let url = serve_once("502 Bad Gateway", "text/html", "<html>bad gateway</html>").await;
        let err = local_client(url).chat(&[Message::user("q")]).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>bad gateway</html>");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_error_message() {
        let url = serve_once(
            "401 Unauthorized",
            "application/json",
            r#"{"error": {"message": "invalid api key"}}"#,
        )
        .await;
        let err = local_client(url).chat(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api { status: 401, ref message } if message == "invalid api key"
        ));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let url = serve_once("200 OK", "application/json", r#"{"choices": []}"#).await;
        let err = local_client(url).chat(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, LlmError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_openai_answer_over_http() {
        let url = serve_once(
            "200 OK",
            "application/json",
            r#"{"choices": [{"message": {"role": "assistant", "content": "Jane Doe"}}]}"#,
        )
        .await;
        let answer = local_client(url).chat(&[Message::user("q")]).await.unwrap();
        assert_eq!(answer, "Jane Doe");
    }

    #[test]
    fn test_missing_answer_text() {
        let null_content = serde_json::json!({"choices": [{"message": {"content": null}}]});
        assert!(matches!(
            openai_answer(&null_content),
            Err(LlmError::UnexpectedResponse(_))
        ));

        let image_block = serde_json::json!({"content": [{"type": "image"}]});
        assert!(matches!(
            anthropic_answer(&image_block),
            Err(LlmError::UnexpectedResponse(_))
        ));
        let no_blocks = serde_json::json!({"content": []});
        assert!(anthropic_answer(&no_blocks).is_err());

        let text_block = serde_json::json!({"content": [{"type": "text", "text": "ok"}]});
        assert_eq!(anthropic_answer(&text_block).unwrap(), "ok");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(r#"{"message": "overloaded"}"#), "overloaded");
        assert_eq!(error_message("Unauthorized\n"), "Unauthorized");
        assert_eq!(error_message(""), "unknown API error");
    }

    struct Recorder {
        seen: Mutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl ChatClient for Recorder {
        async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok("recorded".to_string())
        }

        fn model(&self) -> &str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_ask_with_context() {
        let client = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        let answer = client.ask("Who applied?", Some("Name: Jane")).await.unwrap();
        assert_eq!(answer, "recorded");

        let seen = client.seen.lock().unwrap();
        let messages = &seen[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with(SYSTEM_PROMPT));
        assert!(messages[0].content.ends_with("Document content:\nName: Jane"));
        assert_eq!(messages[1], Message::user("Who applied?"));
    }

    #[test]
    fn test_question_without_context() {
        let messages = question_messages("Hello?", None);
        assert_eq!(messages, vec![Message::user("Hello?")]);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(Message::system("x")).unwrap();
        assert_eq!(json["role"], "system");
    }

    #[test]
    fn test_openai_body_and_endpoint() {
        let mut client = OpenAiClient::new("sk-test", "gpt-4o-mini")
            .with_base_url("http://localhost:1234/v1/");
        client.temperature = Some(0.5);
        assert_eq!(client.endpoint(), "http://localhost:1234/v1/chat/completions");

        let body = client.request_body(&question_messages("q", Some("ctx")));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["temperature"], 0.5);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_anthropic_splits_system_prompt() {
        let client = AnthropicClient::new("sk-ant-test", "claude-3-sonnet-20240229");
        let body = client.request_body(&question_messages("q", Some("ctx")));
        assert!(body["system"].as_str().unwrap().contains("ctx"));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_anthropic_without_system() {
        let client = AnthropicClient::new("k", "m");
        let body = client.request_body(&question_messages("q", None));
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_factory_builds_configured_client() {
        let config = LlmConfig {
            provider: Provider::Anthropic,
            api_key: Some("sk-ant-test".to_string()),
            model: Some("claude-3-haiku-20240307".to_string()),
            ..LlmConfig::default()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.model(), "claude-3-haiku-20240307");

        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(client_from_config(&config).unwrap().model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!(parse_provider("OpenAI").unwrap(), Provider::OpenAi);
        assert_eq!(parse_provider("claude").unwrap(), Provider::Anthropic);
        assert!(matches!(
            parse_provider("gemini"),
            Err(LlmError::UnsupportedProvider(p)) if p == "gemini"
        ));
    }
}
