use crate::config::{AnthropicConfig, Config, OpenAiConfig, ProviderKind};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 256;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{provider} returned an unreadable body: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// A chat-completion backend. `chat` sends one system prompt and one user
/// prompt and returns the reply text.
pub enum ChatBackend {
    Echo,
    OpenAi(OpenAiClient),
    Anthropic(AnthropicClient),
}

impl ChatBackend {
    pub fn from_config(config: &Config) -> Self {
        match config.provider {
            ProviderKind::Echo => Self::Echo,
            ProviderKind::OpenAi => Self::OpenAi(OpenAiClient::new(&config.openai)),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicClient::new(&config.anthropic)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::OpenAi(_) => "openai",
            Self::Anthropic(_) => "anthropic",
        }
    }

    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        match self {
            Self::Echo => Ok(format!("[echo] system='{system}', user='{user}'")),
            Self::OpenAi(client) => client.chat(system, user).await,
            Self::Anthropic(client) => client.chat(system, user).await,
        }
    }
}

pub struct OpenAiClient {
    http: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    const NAME: &'static str = "openai";

    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            http: Client::new(),
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        }
    }

    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        info!(
            provider = Self::NAME,
            model = self.model.as_str(),
            "Sending chat completion request"
        );

        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response: ChatCompletionResponse = send(Self::NAME, request).await?;
        debug!(choices = response.choices.len(), "Received chat completion");

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }
}

pub struct AnthropicClient {
    http: Client,
    url: String,
    model: String,
    api_key: String,
}

impl AnthropicClient {
    const NAME: &'static str = "anthropic";

    pub fn new(config: &AnthropicConfig) -> Self {
        Self {
            http: Client::new(),
            url: format!("{}/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
        }
    }

    pub async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let payload = MessagesRequest {
            model: &self.model,
            system,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            messages: [WireMessage {
                role: "user",
                content: user,
            }],
        };

        info!(
            provider = Self::NAME,
            model = self.model.as_str(),
            "Sending messages request"
        );

        let request = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload);

        let response: MessagesResponse = send(Self::NAME, request).await?;
        debug!(blocks = response.content.len(), "Received messages response");

        Ok(response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default())
    }
}

async fn send<T>(provider: &'static str, request: RequestBuilder) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            provider,
            status,
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|source| ProviderError::Decode { provider, source })
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    max_tokens: u32,
    messages: [WireMessage<'a>; 1],
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}
