use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::rchain::ai::AIMessage;
use crate::rchain::chat_models::ChatMessage;
use crate::rchain::provider::{ChatModel, Provider, ProviderError};
use crate::rchain::tools::ToolDefinition;

type Responder = dyn Fn(&[ChatMessage]) -> Result<AIMessage, ProviderError> + Send + Sync;

/// One request observed by a [`ScriptedModel`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    /// Names of the tools bound when the call was made.
    pub tools: Vec<String>,
}

impl RecordedCall {
    /// Content of the last message in the request.
    pub fn last_content(&self) -> &str {
        self.messages.last().map(ChatMessage::content).unwrap_or("")
    }
}

/// Test double for [`ChatModel`]: answers from a closure and records every request.
///
/// Clones and tool-bound copies share the same call log.
#[derive(Clone)]
pub struct ScriptedModel {
    responder: Arc<Responder>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    tools: Vec<String>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[ChatMessage]) -> Result<AIMessage, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
            tools: Vec::new(),
        }
    }

    /// Always answers with the same text.
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(AIMessage::text(text.clone())))
    }

    /// Answers with each message in turn, then fails once the script runs out.
    pub fn sequence(replies: Vec<AIMessage>) -> Self {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or(ProviderError::EmptyResponse {
                    provider: Provider::Openai,
                })
        })
    }

    /// Fails every request.
    pub fn failing() -> Self {
        Self::new(|_| {
            Err(ProviderError::EmptyResponse {
                provider: Provider::Openai,
            })
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("tools", &self.tools)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl ChatModel for ScriptedModel {
    fn invoke_messages(&self, messages: &[ChatMessage]) -> Result<AIMessage, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                messages: messages.to_vec(),
                tools: self.tools.clone(),
            });
        (self.responder)(messages)
    }

    fn bind_tools(&self, tools: Vec<ToolDefinition>) -> Arc<dyn ChatModel> {
        let mut bound = self.clone();
        bound.tools = tools.into_iter().map(|tool| tool.name).collect();
        Arc::new(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptedModel;
    use crate::rchain::ai::AIMessage;
    use crate::rchain::provider::ChatModel;
    use crate::rchain::tools::ToolDefinition;

    #[test]
    fn sequence_runs_out() {
        let model = ScriptedModel::sequence(vec![AIMessage::text("one")]);
        assert_eq!(model.invoke_prompt("a").expect("first reply").content, "one");
        assert!(model.invoke_prompt("b").is_err());
        assert_eq!(model.call_count(), 2);
    }

    #[test]
    fn bound_copies_share_the_call_log() {
        let model = ScriptedModel::replying("ok");
        let bound = model.bind_tools(vec![ToolDefinition::function("lookup", "")]);
        bound.invoke_prompt("hello").expect("reply");

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tools, vec!["lookup".to_string()]);
        assert_eq!(calls[0].last_content(), "hello");
    }
}
