use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::{Overrides, Settings, load_documents, resolve_settings};
use crate::desk::fetcher::WebFetcher;
use crate::desk::build_session;
use crate::desk::session::Session;
use crate::rchain::openai::ChatOpenAI;
use crate::rchain::provider::is_api_key_present;

pub mod ask;
pub mod catalog;
pub mod chat;
pub mod config;

/// Model and loop settings shared by `ask` and `chat`.
#[derive(Debug, Args, Clone, Default)]
pub struct ModelArgs {
    /// Profile name from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// LLM provider (openai, fireworks).
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Per-request timeout for model calls, in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Retries for throttled or transient model failures.
    #[arg(long)]
    pub retries: Option<u32>,
    /// Maximum agent/tool steps per turn.
    #[arg(long)]
    pub recursion_limit: Option<usize>,
}

impl ModelArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
            retries: self.retries,
            recursion_limit: self.recursion_limit,
        }
    }

    pub fn resolve(&self) -> Result<Settings> {
        let settings = resolve_settings(self.profile.as_deref(), &self.overrides())?;
        info!(
            provider = %settings.provider,
            model = %settings.model,
            recursion_limit = settings.recursion_limit,
            api_key_present = is_api_key_present(settings.provider),
            "resolved settings"
        );
        Ok(settings)
    }
}

/// Builds a live session: provider client, web fetcher, configured catalog.
pub fn open_session(settings: &Settings) -> Result<Session> {
    let model = ChatOpenAI::new(settings.provider, &settings.model, settings.model_options())?;
    let fetcher = WebFetcher::new(settings.fetch_timeout(), settings.fetch_max_chars)
        .context("Failed to prepare the documentation fetcher")?;
    let documents = load_documents()?;
    let options = settings.desk_options(documents)?;
    Ok(build_session(Arc::new(model), Box::new(fetcher), options))
}
