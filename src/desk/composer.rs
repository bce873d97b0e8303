//! Turns fetched documentation into the final technical answer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::desk::fetcher::is_fetch_error;
use crate::rchain::provider::ChatModel;

/// Reply used when the page could not be fetched.
pub fn fetch_failure_reply(url: &str) -> String {
    format!(
        "Houve um erro ao tentar processar a documentação. Você pode continuar acessando o conteúdo diretamente através deste link: {url}"
    )
}

/// Reply used when composition produced nothing.
pub fn empty_result_reply(url: &str) -> String {
    format!("Não foi possível processar a solicitação para a URL: {url}")
}

pub struct AnswerComposer {
    model: Arc<dyn ChatModel>,
}

impl AnswerComposer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub fn compose(&self, query: &str, url: &str, fetched: &str) -> String {
        if is_fetch_error(fetched) {
            debug!(url, "page fetch failed, using link fallback");
            return fetch_failure_reply(url);
        }

        let prompt = format!(
            "Produza uma resposta técnica objetiva para a pergunta '{query}', usando o conteúdo extraído abaixo.
Sua resposta deve ser em português, profissional, competente e concisa, e deve citar a fonte oficial: {url}

Conteúdo extraído:
{fetched}"
        );

        match self.model.invoke_prompt(&prompt) {
            Ok(reply) if !reply.content.trim().is_empty() => reply.content.trim().to_string(),
            Ok(_) => {
                warn!(url, "composer returned an empty answer");
                empty_result_reply(url)
            }
            Err(err) => {
                warn!(url, error = %err, "answer composition failed");
                empty_result_reply(url)
            }
        }
    }
}
