//! Select, fetch, compose: the body of the technical research tool.

use std::sync::Arc;

use tracing::{debug, info};

use crate::desk::catalog::Catalog;
use crate::desk::composer::AnswerComposer;
use crate::desk::fetcher::PageFetcher;
use crate::desk::selector::{DocumentSelector, Selection};
use crate::rchain::provider::ChatModel;

/// Returned when no catalog page matches; offers a human handoff.
pub const HANDOFF_OFFER: &str = "Não localizei uma página específica para essa dúvida em nossa documentação. Você gostaria de ser transferido para um atendente?";

/// Runs the selector, the fetcher and the composer in sequence.
///
/// Every step downgrades its own failures to text, so `run` always returns a
/// reply and never retries.
pub struct TechnicalResearch {
    selector: DocumentSelector,
    fetcher: Box<dyn PageFetcher>,
    composer: AnswerComposer,
}

impl TechnicalResearch {
    pub fn new(model: Arc<dyn ChatModel>, catalog: Catalog, fetcher: Box<dyn PageFetcher>) -> Self {
        Self {
            selector: DocumentSelector::new(Arc::clone(&model), catalog),
            fetcher,
            composer: AnswerComposer::new(model),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.selector.catalog()
    }

    pub fn run(&self, query: &str) -> String {
        let url = match self.selector.select(query) {
            Selection::Url(url) => url,
            Selection::NotApplicable => {
                info!("no documentation page matched, offering handoff");
                return HANDOFF_OFFER.to_string();
            }
        };
        info!(url = %url, "documentation page selected");

        let fetched = self.fetcher.fetch(&url);
        debug!(url = %url, chars = fetched.chars().count(), "composing answer");

        self.composer.compose(query, &url, &fetched)
    }
}
