//! The help-desk agent.
//!
//! A user turn flows through [`session::Session`]: language detection, then the
//! [`graph::DecisionLoop`] which either answers from the built-in knowledge or
//! calls the research tool ([`orchestrator::TechnicalResearch`]: select a
//! document, fetch it, compose an answer), then translation back to the user's
//! language.

use std::sync::Arc;

pub mod catalog;
pub mod composer;
pub mod fetcher;
pub mod graph;
pub mod knowledge;
pub mod language;
pub mod orchestrator;
pub mod selector;
pub mod session;
pub mod tools;

use crate::desk::catalog::Catalog;
use crate::desk::fetcher::PageFetcher;
use crate::desk::graph::{DEFAULT_RECURSION_LIMIT, DecisionLoop};
use crate::desk::language::LanguageAdapter;
use crate::desk::orchestrator::TechnicalResearch;
use crate::desk::session::Session;
use crate::desk::tools::Toolbox;
use crate::rchain::provider::ChatModel;

/// Everything needed to assemble a [`Session`] besides the model and fetcher.
#[derive(Debug, Clone)]
pub struct DeskOptions {
    pub knowledge: String,
    pub catalog: Catalog,
    pub recursion_limit: usize,
    pub native_language: String,
}

impl Default for DeskOptions {
    fn default() -> Self {
        Self {
            knowledge: knowledge::KNOWLEDGE_BASE.to_string(),
            catalog: Catalog::builtin(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            native_language: knowledge::NATIVE_LANGUAGE.to_string(),
        }
    }
}

/// Wires one model into every reasoning step and returns a fresh session.
pub fn build_session(
    model: Arc<dyn ChatModel>,
    fetcher: Box<dyn PageFetcher>,
    options: DeskOptions,
) -> Session {
    let research = TechnicalResearch::new(Arc::clone(&model), options.catalog, fetcher);
    let graph = DecisionLoop::new(
        Arc::clone(&model),
        knowledge::system_instruction(&options.knowledge),
        Toolbox::new(research),
        options.recursion_limit,
    );
    Session::new(graph, LanguageAdapter::new(model, options.native_language))
}
