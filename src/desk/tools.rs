//! Tools the decision loop can request, and their dispatch.

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::desk::orchestrator::TechnicalResearch;
use crate::rchain::tools::{ToolCall, ToolDefinition, ToolParam};

pub const TECHNICAL_RESEARCH_TOOL: &str = "pesquisa_tecnica_avancada_robbu";

const TECHNICAL_RESEARCH_DESCRIPTION: &str = "Use esta ferramenta para responder a perguntas técnicas específicas sobre a plataforma Robbu, funcionalidades como 'templates' e 'relatórios', ou sobre a API do WhatsApp, como 'códigos de erro' e 'contas comerciais'. A ferramenta busca na documentação oficial e retorna uma resposta técnica completa.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("ferramenta desconhecida '{0}'")]
    UnknownTool(String),
    #[error("argumento 'query' ausente para '{0}'")]
    MissingQuery(String),
}

/// A decoded tool request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    TechnicalResearch { query: String },
}

impl ToolInvocation {
    /// Decodes a model tool call into a typed invocation.
    pub fn decode(call: &ToolCall) -> Result<Self, ToolError> {
        match call.name.as_str() {
            TECHNICAL_RESEARCH_TOOL => query_argument(&call.args)
                .map(|query| Self::TechnicalResearch { query })
                .ok_or_else(|| ToolError::MissingQuery(call.name.clone())),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn query_argument(args: &Value) -> Option<String> {
    let query = match args {
        Value::String(raw) => raw.as_str(),
        Value::Object(map) => map.get("query")?.as_str()?,
        _ => return None,
    };
    let query = query.trim();
    (!query.is_empty()).then(|| query.to_string())
}

/// Declarations advertised to the model.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(TECHNICAL_RESEARCH_TOOL, TECHNICAL_RESEARCH_DESCRIPTION).with_param(
            ToolParam::required_string("query", "A pergunta técnica do usuário, completa."),
        ),
    ]
}

/// Binds tool names to their implementations.
pub struct Toolbox {
    research: TechnicalResearch,
}

impl Toolbox {
    pub fn new(research: TechnicalResearch) -> Self {
        Self { research }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Runs one tool call and returns the text to append as its result.
    pub fn dispatch(&self, call: &ToolCall) -> String {
        match ToolInvocation::decode(call) {
            Ok(ToolInvocation::TechnicalResearch { query }) => {
                info!(tool = %call.name, call_id = %call.id, "running technical research");
                self.research.run(&query)
            }
            Err(err) => {
                warn!(tool = %call.name, error = %err, "rejected tool call");
                format!("Erro ao executar ferramenta: {err}")
            }
        }
    }
}
