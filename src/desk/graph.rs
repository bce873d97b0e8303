//! The agent/action loop that drives one conversation turn.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::desk::tools::Toolbox;
use crate::rchain::ai::AIMessage;
use crate::rchain::chat_models::ChatMessage;
use crate::rchain::provider::{ChatModel, ProviderError};

/// Node executions allowed per turn before the loop gives up.
pub const DEFAULT_RECURSION_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("recursion limit of {limit} steps reached without a final answer")]
    RecursionLimit { limit: usize },
    #[error("agent model call failed: {0}")]
    Model(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Agent,
    Action,
}

/// Two-node cyclic graph: AGENT asks the model, ACTION runs requested tools.
pub struct DecisionLoop {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    toolbox: Toolbox,
    recursion_limit: usize,
}

impl DecisionLoop {
    /// Binds the toolbox declarations to `model`.
    pub fn new(
        model: Arc<dyn ChatModel>,
        system_prompt: impl Into<String>,
        toolbox: Toolbox,
        recursion_limit: usize,
    ) -> Self {
        let model = model.bind_tools(toolbox.definitions());
        Self {
            model,
            system_prompt: system_prompt.into(),
            toolbox,
            recursion_limit,
        }
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Runs the graph from AGENT until the model stops requesting tools.
    ///
    /// Returns `history` extended with every assistant and tool message of the
    /// turn; the last entry is the reply.
    pub fn run(&self, mut history: Vec<ChatMessage>) -> Result<Vec<ChatMessage>, LoopError> {
        let mut node = Node::Agent;
        let mut steps = 0;

        loop {
            if steps >= self.recursion_limit {
                return Err(LoopError::RecursionLimit {
                    limit: self.recursion_limit,
                });
            }
            steps += 1;
            debug!(step = steps, node = ?node, "running node");

            node = match node {
                Node::Agent => {
                    let reply = self.call_agent(&history)?;
                    let pending = reply.has_tool_calls();
                    history.push(ChatMessage::assistant_from_ai(&reply));
                    if !pending {
                        debug!(steps, "agent produced final answer");
                        return Ok(history);
                    }
                    Node::Action
                }
                Node::Action => {
                    self.run_actions(&mut history);
                    Node::Agent
                }
            };
        }
    }

    fn call_agent(&self, history: &[ChatMessage]) -> Result<AIMessage, ProviderError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend_from_slice(history);
        self.model.invoke_messages(&messages)
    }

    fn run_actions(&self, history: &mut Vec<ChatMessage>) {
        let calls = history
            .last()
            .map(|message| message.tool_calls().to_vec())
            .unwrap_or_default();
        for call in calls {
            info!(tool = %call.name, call_id = %call.id, "dispatching tool call");
            let result = self.toolbox.dispatch(&call);
            history.push(ChatMessage::tool_result(call.id, result));
        }
    }
}
