use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::rchain::ai::AIMessage;
use crate::rchain::chat_models::ChatMessage;
use crate::rchain::chat_runtime::{RequestFailure, RetryConfig, send_chat_request_with_retry};
use crate::rchain::provider::{
    ChatModel, ModelOptions, Provider, ProviderError, Usage, api_key_env, endpoint,
};
use crate::rchain::tools::{ToolCall, ToolDefinition};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    #[serde(default)]
    id: String,
    function: FunctionPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Blocking client for OpenAI-compatible chat-completions endpoints.
///
/// Requests have no timeout unless `ModelOptions::timeout_secs` sets one.
#[derive(Clone)]
pub struct ChatOpenAI {
    provider: Provider,
    model: String,
    options: ModelOptions,
    api_key: String,
    base_url: String,
    client: Client,
    tools: Vec<ToolDefinition>,
}

impl ChatOpenAI {
    /// Creates a client reading the provider's API key from the environment.
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        options: ModelOptions,
    ) -> Result<Self, ProviderError> {
        let key_env = api_key_env(provider);
        let api_key = env::var(key_env)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey { provider, key_env })?;
        Self::with_api_key(provider, model, options, api_key)
    }

    pub fn with_api_key(
        provider: Provider,
        model: impl Into<String>,
        options: ModelOptions,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        // reqwest's blocking client otherwise gives up after 30 s
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|source| ProviderError::Request { provider, source })?;

        Ok(Self {
            provider,
            model: model.into(),
            options,
            api_key: api_key.into(),
            base_url: endpoint(provider).to_string(),
            client,
            tools: Vec::new(),
        })
    }

    fn parse_response(&self, body: ChatCompletionResponse) -> Result<AIMessage, ProviderError> {
        if let Some(usage) = body.usage.map(Usage::from) {
            debug!(
                provider = %self.provider,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "chat completion usage"
            );
        }

        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ProviderError::EmptyResponse {
                provider: self.provider,
            })?;

        let tool_calls = message
            .tool_calls
            .into_iter()
            .filter(|call| !call.function.name.is_empty())
            .map(|call| {
                let args = match call.function.arguments {
                    Value::String(raw) => ToolCall::decode_arguments(&raw),
                    other => other,
                };
                ToolCall::new(call.id, call.function.name, args)
            })
            .collect();

        Ok(AIMessage {
            content: message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

impl fmt::Debug for ChatOpenAI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatOpenAI")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("options", &self.options)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("tools", &self.tools.len())
            .finish()
    }
}

impl From<UsagePayload> for Usage {
    fn from(usage: UsagePayload) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl ChatModel for ChatOpenAI {
    fn invoke_messages(&self, messages: &[ChatMessage]) -> Result<AIMessage, ProviderError> {
        let provider = self.provider;
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: messages.iter().map(ChatMessage::to_json).collect(),
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            tools: self.tools.iter().map(ToolDefinition::to_json).collect(),
        };
        debug!(
            %provider,
            model = %self.model,
            messages = messages.len(),
            tools = self.tools.len(),
            "sending chat completion"
        );

        let response = send_chat_request_with_retry(
            &self.client,
            &self.base_url,
            &self.api_key,
            &payload,
            RetryConfig {
                timeout_secs: self.options.timeout_secs,
                retries: self.options.retries,
                retry_delay_ms: self.options.retry_delay_ms,
            },
        )
        .map_err(|failure| match failure {
            RequestFailure::Request(source) => ProviderError::Request { provider, source },
            RequestFailure::Api { status, body } => ProviderError::Api {
                provider,
                status,
                body,
            },
        })?;

        let body: ChatCompletionResponse = response
            .json()
            .map_err(|source| ProviderError::Request { provider, source })?;
        self.parse_response(body)
    }

    fn bind_tools(&self, tools: Vec<ToolDefinition>) -> Arc<dyn ChatModel> {
        let mut bound = self.clone();
        bound.tools = tools;
        Arc::new(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatCompletionResponse, ChatOpenAI};
    use crate::rchain::chat_models::ChatMessage;
    use crate::rchain::provider::{ChatModel, ModelOptions, Provider, ProviderError};
    use serde_json::json;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use std::time::{Duration, Instant};

    fn client() -> ChatOpenAI {
        let mut client =
            ChatOpenAI::with_api_key(Provider::Openai, "gpt-test", ModelOptions::default(), "unused")
                .expect("client builds");
        client.base_url = "http://127.0.0.1:9/unused".to_string();
        client
    }

    /// Accepts one connection, reads the request and never answers.
    fn silent_server(hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buffer = [0u8; 4096];
                let _ = stream.read(&mut buffer);
                thread::sleep(hold);
            }
        });
        format!("http://{addr}/v1/chat/completions")
    }

    #[test]
    fn configured_timeout_bounds_a_stalled_request() {
        let options = ModelOptions {
            timeout_secs: Some(1),
            ..ModelOptions::default()
        };
        let mut model = ChatOpenAI::with_api_key(Provider::Openai, "gpt-test", options, "sk-test")
            .expect("client builds");
        model.base_url = silent_server(Duration::from_secs(10));

        let started = Instant::now();
        let err = model
            .invoke_messages(&[ChatMessage::user("Oi")])
            .expect_err("stalled server should time out");
        let elapsed = started.elapsed();

        match err {
            ProviderError::Request { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
        assert!(elapsed >= Duration::from_millis(900));
        assert!(elapsed < Duration::from_secs(8));
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let model = ChatOpenAI::with_api_key(
            Provider::Fireworks,
            "m",
            ModelOptions::default(),
            "sk-very-secret",
        )
        .expect("client builds");
        let rendered = format!("{model:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn parses_tool_calls_with_string_arguments() {
        let body: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "lookup", "arguments": "{\"query\":\"erros\"}" }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12 }
        }))
        .expect("fixture should deserialize");

        let message = client().parse_response(body).expect("message should parse");
        assert!(message.content.is_empty());
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "lookup");
        assert_eq!(message.tool_calls[0].args, json!({ "query": "erros" }));
    }

    #[test]
    fn plain_reply_has_no_tool_calls() {
        let body: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "Olá!" } }]
        }))
        .expect("fixture should deserialize");

        let message = client().parse_response(body).expect("message should parse");
        assert_eq!(message.content, "Olá!");
        assert!(!message.has_tool_calls());
    }

    #[test]
    fn missing_choices_is_an_empty_response() {
        let body: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).expect("fixture should deserialize");

        let err = client().parse_response(body).expect_err("should fail");
        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }
}
