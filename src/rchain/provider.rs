use std::env;
use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::rchain::ai::AIMessage;
use crate::rchain::chat_models::ChatMessage;
use crate::rchain::tools::ToolDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Fireworks,
}

impl Provider {
    pub const SUPPORTED: &'static str = "openai, fireworks";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Fireworks => "fireworks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::Openai),
            "fireworks" => Some(Self::Fireworks),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn endpoint(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "https://api.openai.com/v1/chat/completions",
        Provider::Fireworks => "https://api.fireworks.ai/inference/v1/chat/completions",
    }
}

pub fn api_key_env(provider: Provider) -> &'static str {
    match provider {
        Provider::Openai => "OPENAI_API_KEY",
        Provider::Fireworks => "FIREWORKS_API_KEY",
    }
}

pub fn is_api_key_present(provider: Provider) -> bool {
    env::var(api_key_env(provider))
        .ok()
        .is_some_and(|value| !value.trim().is_empty())
}

/// Sampling and transport knobs shared by every request of a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{key_env} is not set in the environment")]
    MissingApiKey {
        provider: Provider,
        key_env: &'static str,
    },
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: Provider,
        status: StatusCode,
        body: String,
    },
    #[error("{provider} response did not contain a message")]
    EmptyResponse { provider: Provider },
}

/// A chat model that answers a message list, optionally with tool requests.
///
/// Implementations are blocking; the help desk runs one request at a time.
pub trait ChatModel: Send + Sync {
    /// Invokes the model with fully-typed role messages.
    fn invoke_messages(&self, messages: &[ChatMessage]) -> Result<AIMessage, ProviderError>;

    /// Returns a copy of this model that advertises `tools` on every request.
    fn bind_tools(&self, tools: Vec<ToolDefinition>) -> Arc<dyn ChatModel>;

    /// Single-prompt convenience used by the delegated reasoning steps.
    fn invoke_prompt(&self, prompt: &str) -> Result<AIMessage, ProviderError> {
        self.invoke_messages(&[ChatMessage::user(prompt)])
    }
}
