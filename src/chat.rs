//! One-shot chat completions for grounded answers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, Provider};
use crate::errors::Error;
use crate::http::HttpClient;

/// Interface for one-shot chat completions.
pub trait ChatCompleter {
    /// Send a single exchange and return the assistant's reply.
    fn complete(&self, system: Option<&str>, user: &str) -> Result<String, Error>;
}

/// HTTP chat client for OpenAI and Azure OpenAI.
pub struct ChatClient {
    http: HttpClient,
    provider: Provider,
    api_key: String,
    endpoint: String,
    api_version: String,
    model: String,
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn openai_chat_url(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/chat/completions") {
        return normalized;
    }
    if normalized.ends_with("/v1") {
        return format!("{normalized}/chat/completions");
    }
    format!("{normalized}/v1/chat/completions")
}

fn azure_chat_url(base_url: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        normalize_base_url(base_url),
        deployment,
        api_version
    )
}

impl ChatClient {
    /// Construct a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no API key is configured, or if the Azure
    /// OpenAI provider is selected without an endpoint.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::Config("No API key configured (set MUISTI_API_KEY)".to_string())
        })?;

        let endpoint = match config.provider {
            Provider::OpenAi => config
                .endpoint
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            Provider::AzureOpenAi => config.endpoint.clone().ok_or_else(|| {
                Error::Config("Azure OpenAI requires an endpoint (set MUISTI_ENDPOINT)".to_string())
            })?,
        };

        Ok(ChatClient {
            http: HttpClient::new(),
            provider: config.provider,
            api_key,
            endpoint,
            api_version: config.api_version.clone(),
            model: config.chat_model.clone(),
        })
    }

    fn url(&self) -> String {
        match self.provider {
            Provider::OpenAi => openai_chat_url(&self.endpoint),
            Provider::AzureOpenAi => {
                azure_chat_url(&self.endpoint, &self.model, self.api_version.as_str())
            }
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompleter for ChatClient {
    fn complete(&self, system: Option<&str>, user: &str) -> Result<String, Error> {
        debug!(model = %self.model, "chat request");

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });

        let request = ChatRequest {
            model: match self.provider {
                Provider::OpenAi => Some(self.model.as_str()),
                Provider::AzureOpenAi => None,
            },
            messages,
        };

        let auth_header = format!("Bearer {}", self.api_key);
        let headers: Vec<(&str, &str)> = match self.provider {
            Provider::OpenAi => vec![("Authorization", auth_header.as_str())],
            Provider::AzureOpenAi => vec![("api-key", self.api_key.as_str())],
        };

        let response: ChatResponse =
            self.http
                .send_json("POST", &self.url(), &headers, Some(&request))?;

        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("chat response contained no choices".to_string()))?;

        first
            .message
            .content
            .ok_or_else(|| Error::Provider("chat response contained no content".to_string()))
    }
}
