//! Per-turn adapter around the decision loop, holding the conversation history.

use serde::Serialize;
use tracing::{error, info};

use crate::desk::graph::DecisionLoop;
use crate::desk::language::LanguageAdapter;
use crate::rchain::chat_models::ChatMessage;

/// Reply shown when a turn fails for any reason.
pub const PROCESSING_APOLOGY: &str = "Ocorreu um erro ao processar sua solicitação.";

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    #[serde(rename = "reply")]
    pub text: String,
    /// Language detected for the user's message.
    pub language: String,
    pub translated: bool,
}

/// One conversation. History lives only as long as the session.
pub struct Session {
    graph: DecisionLoop,
    language: LanguageAdapter,
    history: Vec<ChatMessage>,
}

impl Session {
    pub fn new(graph: DecisionLoop, language: LanguageAdapter) -> Self {
        Self {
            graph,
            language,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Detects the language, runs the loop, and translates the reply back.
    pub fn respond(&mut self, utterance: &str) -> Reply {
        let language = self.detect_language(utterance);
        let native_reply = self.answer(utterance);
        self.localize(native_reply, language)
    }

    pub fn detect_language(&self, utterance: &str) -> String {
        self.language.detect(utterance)
    }

    /// Runs the decision loop and returns the reply in the native language.
    ///
    /// A failed loop leaves the history exactly as it was before the turn.
    pub fn answer(&mut self, utterance: &str) -> String {
        let mut turn = self.history.clone();
        turn.push(ChatMessage::user(utterance));
        match self.graph.run(turn) {
            Ok(messages) => {
                let reply = messages
                    .last()
                    .map(|message| message.content().to_string())
                    .unwrap_or_default();
                self.history = messages;
                reply
            }
            Err(err) => {
                error!(error = %err, "turn failed");
                PROCESSING_APOLOGY.to_string()
            }
        }
    }

    pub fn needs_translation(&self, language: &str) -> bool {
        language != self.language.native()
    }

    /// Translates `native_reply` into `language` when it is not the native one.
    pub fn localize(&self, native_reply: String, language: String) -> Reply {
        if !self.needs_translation(&language) {
            return Reply {
                text: native_reply,
                language,
                translated: false,
            };
        }

        info!(language = %language, "translating reply");
        Reply {
            text: self.language.translate(&native_reply, &language),
            language,
            translated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PROCESSING_APOLOGY, Session};
    use crate::desk::catalog::Catalog;
    use crate::desk::fetcher::PageFetcher;
    use crate::desk::graph::DecisionLoop;
    use crate::desk::language::LanguageAdapter;
    use crate::desk::orchestrator::TechnicalResearch;
    use crate::desk::tools::{TECHNICAL_RESEARCH_TOOL, Toolbox};
    use crate::rchain::ai::AIMessage;
    use crate::rchain::scripted::ScriptedModel;
    use crate::rchain::tools::ToolCall;
    use serde_json::json;
    use std::sync::Arc;

    struct NoFetch;

    impl PageFetcher for NoFetch {
        fn fetch(&self, _url: &str) -> String {
            String::new()
        }
    }

    fn session(agent: ScriptedModel, language: ScriptedModel) -> Session {
        let toolbox = Toolbox::new(TechnicalResearch::new(
            Arc::new(ScriptedModel::replying("N/A")),
            Catalog::builtin(),
            Box::new(NoFetch),
        ));
        Session::new(
            DecisionLoop::new(Arc::new(agent), "rules", toolbox, 4),
            LanguageAdapter::new(Arc::new(language), "pt"),
        )
    }

    #[test]
    fn native_turn_is_not_translated() {
        let language = ScriptedModel::replying("pt");
        let mut session = session(ScriptedModel::replying("Olá!"), language.clone());

        let reply = session.respond("Oi");
        assert_eq!(reply.text, "Olá!");
        assert_eq!(reply.language, "pt");
        assert!(!reply.translated);
        assert_eq!(session.history().len(), 2);
        assert_eq!(language.call_count(), 1);
    }

    #[test]
    fn foreign_turn_is_translated_back() {
        let language =
            ScriptedModel::sequence(vec![AIMessage::text("en"), AIMessage::text("Hello!")]);
        let mut session = session(ScriptedModel::replying("Olá!"), language);

        let reply = session.respond("Hi there");
        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.language, "en");
        assert!(reply.translated);
        assert_eq!(session.history()[1].content(), "Olá!");
    }

    #[test]
    fn history_accumulates_across_turns() {
        let agent = ScriptedModel::replying("resposta");
        let mut session = session(agent.clone(), ScriptedModel::replying("pt"));

        session.respond("primeira");
        session.respond("segunda");
        assert_eq!(session.history().len(), 4);
        assert_eq!(agent.calls()[1].messages.len(), 4);

        session.reset();
        assert!(session.history().is_empty());
    }

    #[test]
    fn failed_turn_apologizes_and_keeps_prior_history() {
        let agent = ScriptedModel::sequence(vec![AIMessage::text("primeira resposta")]);
        let mut session = session(agent, ScriptedModel::replying("pt"));
        session.respond("primeira");

        let reply = session.respond("segunda");
        assert_eq!(reply.text, PROCESSING_APOLOGY);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].content(), "primeira resposta");
    }

    #[test]
    fn recursion_limit_is_a_failed_turn() {
        let agent = ScriptedModel::new(|_| {
            Ok(AIMessage::with_tool_calls(vec![ToolCall::new(
                "c",
                TECHNICAL_RESEARCH_TOOL,
                json!({ "query": "x" }),
            )]))
        });
        let mut session = session(agent, ScriptedModel::replying("pt"));

        assert_eq!(session.respond("?").text, PROCESSING_APOLOGY);
        assert!(session.history().is_empty());
    }

    #[test]
    fn steps_can_be_driven_one_by_one() {
        let language =
            ScriptedModel::sequence(vec![AIMessage::text("es"), AIMessage::text("¡Hola!")]);
        let mut session = session(ScriptedModel::replying("Olá!"), language.clone());

        let detected = session.detect_language("Hola");
        assert_eq!(detected, "es");
        assert!(session.needs_translation(&detected));
        assert!(!session.needs_translation("pt"));

        let native = session.answer("Hola");
        assert_eq!(native, "Olá!");
        // nothing translated until localize runs
        assert_eq!(language.call_count(), 1);

        let reply = session.localize(native, detected);
        assert_eq!(reply.text, "¡Hola!");
        assert!(reply.translated);
        assert_eq!(language.call_count(), 2);
    }
}
