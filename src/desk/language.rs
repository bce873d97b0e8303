//! Language detection and reply translation around the Portuguese-native loop.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::rchain::provider::ChatModel;

pub struct LanguageAdapter {
    model: Arc<dyn ChatModel>,
    native: String,
}

impl LanguageAdapter {
    pub fn new(model: Arc<dyn ChatModel>, native: impl Into<String>) -> Self {
        Self {
            model,
            native: native.into(),
        }
    }

    pub fn native(&self) -> &str {
        &self.native
    }

    /// ISO 639-1 code of `text`, or the native language when unsure.
    pub fn detect(&self, text: &str) -> String {
        let prompt = format!(
            "Qual é o idioma do texto a seguir? Responda APENAS com o código de idioma ISO 639-1 de duas letras (ex: 'en', 'es', 'pt').

Texto: \"{text}\""
        );
        match self.model.invoke_prompt(&prompt) {
            Ok(reply) => match normalize_language_code(&reply.content) {
                Some(code) => code,
                None => {
                    debug!(reply = %reply.content, "unrecognized language code");
                    self.native.clone()
                }
            },
            Err(err) => {
                warn!(error = %err, "language detection failed");
                self.native.clone()
            }
        }
    }

    /// Translates `text` into `target`, returning it unchanged on failure.
    pub fn translate(&self, text: &str, target: &str) -> String {
        let prompt = format!(
            "Traduza o seguinte texto para o idioma com o código '{target}'.
Mantenha o tom, a formatação e os emojis o máximo possível. Responda apenas com a tradução.

Texto para traduzir:
\"{text}\""
        );
        match self.model.invoke_prompt(&prompt) {
            Ok(reply) if !reply.content.trim().is_empty() => reply.content.trim().to_string(),
            Ok(_) => {
                warn!(language = target, "translation came back empty");
                text.to_string()
            }
            Err(err) => {
                warn!(language = target, error = %err, "translation failed");
                text.to_string()
            }
        }
    }
}

/// Reduces a model reply to a lowercase two-letter code.
pub fn normalize_language_code(reply: &str) -> Option<String> {
    let code = reply
        .trim()
        .trim_matches(|c: char| !c.is_ascii_alphabetic())
        .to_ascii_lowercase();
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())).then_some(code)
}
