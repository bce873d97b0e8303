//! Picks the catalog page most likely to answer a query.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::desk::catalog::Catalog;
use crate::rchain::provider::ChatModel;

/// Reply the selector model gives when nothing in the catalog fits.
pub const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Url(String),
    NotApplicable,
}

pub struct DocumentSelector {
    model: Arc<dyn ChatModel>,
    catalog: Catalog,
}

impl DocumentSelector {
    pub fn new(model: Arc<dyn ChatModel>, catalog: Catalog) -> Self {
        Self { model, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn select(&self, query: &str) -> Selection {
        let prompt = self.prompt(query);
        let reply = match self.model.invoke_prompt(&prompt) {
            Ok(reply) => reply.content,
            Err(err) => {
                warn!(error = %err, "document selection failed");
                return Selection::NotApplicable;
            }
        };

        let selection = parse_selection(&reply);
        if let Selection::Url(url) = &selection {
            if !self.catalog.contains_url(url) {
                debug!(url = %url, "selected URL is not a catalog entry");
            }
        }
        selection
    }

    fn prompt(&self, query: &str) -> String {
        format!(
            "Analise a pergunta do usuário: \"{query}\".
Sua tarefa é encontrar a URL do documento mais relevante na lista de 'Documentos Conhecidos' para responder a essa pergunta.
Concentre-se no significado da pergunta e no 'Título do Documento'.
Responda APENAS com a URL exata, copiada da lista. Se nenhum documento for relevante, responda '{NOT_APPLICABLE}'.

Documentos Conhecidos:
{documents}",
            documents = self.catalog.render_numbered(),
        )
    }
}

/// Normalizes a selector reply into a URL or [`Selection::NotApplicable`].
pub fn parse_selection(reply: &str) -> Selection {
    let candidate = reply.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '<' | '>' | '.' | ',' | ';')
    });

    if candidate.contains(NOT_APPLICABLE) || !candidate.starts_with("http") {
        Selection::NotApplicable
    } else {
        Selection::Url(candidate.to_string())
    }
}
