//! Lightweight LLM integration helpers.
//!
//! Typed chat messages, tool schemas, and a blocking OpenAI-compatible client
//! behind the [`provider::ChatModel`] trait.

/// Generic AI response structures.
pub mod ai;
/// Role-tagged chat messages.
pub mod chat_models;
pub(crate) mod chat_runtime;
/// OpenAI-compatible chat-completions client.
pub mod openai;
/// Provider table, options, errors and the chat model trait.
pub mod provider;
/// Scripted chat model used as the test double for every reasoning step.
pub mod scripted;
/// Tool schema and invocation payload helpers.
pub mod tools;
