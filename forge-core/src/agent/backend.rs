//! Backend abstraction for chat-completion services

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LlmConfig, Provider};
use crate::secrets::Secrets;
use crate::{Error, Result};

/// Trait for chat-completion backends
///
/// A backend sends one system message plus one user message and returns the
/// assistant's reply text. Every pipeline stage is a single call.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Send a message and return the reply
    async fn complete(&self, system: &str, message: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` backend
///
/// Works against api.openai.com, Groq, and any other server speaking the
/// same wire format.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    /// Create a backend for a base URL such as `https://api.openai.com/v1`
    pub fn new(base_url: impl AsRef<str>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, model, Duration::from_secs(120))
    }

    /// Create a backend with an explicit request timeout
    pub fn with_timeout(
        base_url: impl AsRef<str>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: chat_endpoint(base_url.as_ref())?,
            api_key: None,
            model: model.into(),
            temperature: 0.2,
        })
    }

    /// Create a backend from configuration and secrets
    ///
    /// Fails if no API key is available for the selected provider.
    pub fn from_config(config: &LlmConfig, secrets: &Secrets) -> Result<Self> {
        let provider = config.provider_for(secrets);
        let api_key = secrets.api_key(provider).ok_or_else(|| missing_key(provider))?;

        let backend = Self::with_timeout(
            config.base_url_for(provider),
            config.model_for(provider),
            config.timeout,
        )?
        .with_api_key(api_key)
        .with_temperature(config.temperature);

        debug!(
            provider = %provider,
            endpoint = %backend.endpoint,
            model = %backend.model,
            "Created chat backend"
        );

        Ok(backend)
    }

    /// Set the bearer token
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, message: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: self.temperature,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        debug!(model = %self.model, prompt_len = message.len(), "Sending chat completion");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Agent(format!(
                "Chat completion failed with status {}: {}",
                status,
                truncate(&text, 400)
            )));
        }

        parse_reply(&text)
    }
}

fn chat_endpoint(base_url: &str) -> Result<String> {
    let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    url::Url::parse(&endpoint)
        .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
    Ok(endpoint)
}

fn missing_key(provider: Provider) -> Error {
    Error::Config(format!(
        "No API key for {}. Set {} or add it to ~/.config/forge/secrets.toml",
        provider,
        provider.api_key_env()
    ))
}

/// Extract the first choice's content from a response body
fn parse_reply(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        Error::Agent(format!(
            "Could not decode chat response ({}): {}",
            e,
            truncate(body, 400)
        ))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::Agent("Chat response contained no message content".to_string()))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
