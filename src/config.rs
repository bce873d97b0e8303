use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::desk::DeskOptions;
use crate::desk::catalog::{Catalog, DocumentRef};
use crate::desk::fetcher::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CHARS};
use crate::desk::graph::DEFAULT_RECURSION_LIMIT;
use crate::desk::knowledge::{KNOWLEDGE_BASE, NATIVE_LANGUAGE};
use crate::rchain::provider::{ModelOptions, Provider};

pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay: Option<u64>,
    pub recursion_limit: Option<usize>,
    pub native_language: Option<String>,
    pub fetch_timeout: Option<u64>,
    pub fetch_max_chars: Option<usize>,
    pub knowledge_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
    #[serde(default)]
    documents: Vec<DocumentRef>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot resolve config path: set DESK_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' does not contain a [profiles] section.", .path.display())]
    MissingProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", .path.display())]
    ProfileNotFound { name: String, path: PathBuf },
    #[error("Invalid {origin} '{value}'. {expected}")]
    InvalidValue {
        origin: String,
        value: String,
        expected: String,
    },
    #[error("Failed to read knowledge file '{}': {source}", .path.display())]
    Knowledge { path: PathBuf, source: io::Error },
}

/// Settings given on the command line; `None` means "not passed".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub recursion_limit: Option<usize>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub profile: Option<String>,
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub recursion_limit: usize,
    pub native_language: String,
    pub fetch_timeout_secs: u64,
    pub fetch_max_chars: usize,
    pub knowledge_file: Option<PathBuf>,
}

impl Settings {
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
            retries: self.retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Builds desk options, reading the knowledge file when one is configured.
    pub fn desk_options(&self, extra_documents: Vec<DocumentRef>) -> Result<DeskOptions, ConfigError> {
        let knowledge = match &self.knowledge_file {
            Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::Knowledge {
                path: path.clone(),
                source,
            })?,
            None => KNOWLEDGE_BASE.to_string(),
        };
        Ok(DeskOptions {
            knowledge,
            catalog: Catalog::builtin().extended(extra_documents),
            recursion_limit: self.recursion_limit,
            native_language: self.native_language.clone(),
        })
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var("DESK_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("deskbot").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("deskbot")
        .join("config.toml"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn profile_from(file: ConfigFile, name: &str, path: &Path) -> Result<ProfileConfig, ConfigError> {
    let profiles = file.profiles.ok_or_else(|| ConfigError::MissingProfiles {
        path: path.to_path_buf(),
    })?;
    profiles
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, ConfigError> {
    let path = config_path()?;
    let file = read_config_file(&path)?;
    profile_from(file, name, &path)
}

/// Extra catalog entries from the config file; none when the file is absent.
pub fn load_documents() -> Result<Vec<DocumentRef>, ConfigError> {
    let path = match config_path() {
        Ok(path) => path,
        Err(_) => return Ok(Vec::new()),
    };
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(read_config_file(&path)?.documents)
}

/// Checks that the config file parses, and that `profile` exists and resolves.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    let file = read_config_file(&path)?;

    for document in &file.documents {
        if !document.url.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                origin: format!("document URL for '{}'", document.title),
                value: document.url.clone(),
                expected: "Document URLs must start with http:// or https://.".to_string(),
            });
        }
    }

    if let Some(name) = profile {
        let profile = profile_from(file, name, &path)?;
        resolve_settings_with(Some((name, profile)), |_| None, &Overrides::default())?;
    }
    Ok(path)
}

/// Resolves settings from the process environment and an optional named profile.
pub fn resolve_settings(profile: Option<&str>, cli: &Overrides) -> Result<Settings, ConfigError> {
    let profile = match profile {
        Some(name) => Some((name, load_profile(name)?)),
        None => None,
    };
    resolve_settings_with(profile, |key| env::var(key).ok(), cli)
}

/// Applies precedence CLI > environment > profile > defaults.
pub fn resolve_settings_with<F>(
    profile: Option<(&str, ProfileConfig)>,
    env_lookup: F,
    cli: &Overrides,
) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (profile_name, profile) = match profile {
        Some((name, config)) => (Some(name.to_string()), config),
        None => (None, ProfileConfig::default()),
    };
    let env_value = |key: &str| {
        env_lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let provider = match (&cli.provider, env_value("DESK_PROVIDER"), &profile.provider) {
        (Some(value), _, _) => parse_provider("--provider", value)?,
        (None, Some(value), _) => parse_provider("DESK_PROVIDER", &value)?,
        (None, None, Some(value)) => parse_provider(
            &format!("profile '{}' provider", profile_name.as_deref().unwrap_or("")),
            value,
        )?,
        (None, None, None) => Provider::Openai,
    };

    let model = cli
        .model
        .clone()
        .or_else(|| env_value("DESK_MODEL"))
        .or(profile.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let temperature = pick(cli.temperature, env_value("DESK_TEMPERATURE"), "DESK_TEMPERATURE", profile.temperature)?
        .unwrap_or(DEFAULT_TEMPERATURE);
    let timeout_secs = pick(cli.timeout, env_value("DESK_TIMEOUT"), "DESK_TIMEOUT", profile.timeout)?;
    let retries = pick(cli.retries, env_value("DESK_RETRIES"), "DESK_RETRIES", profile.retries)?
        .unwrap_or(0);
    let recursion_limit = pick(
        cli.recursion_limit,
        env_value("DESK_RECURSION_LIMIT"),
        "DESK_RECURSION_LIMIT",
        profile.recursion_limit,
    )?
    .unwrap_or(DEFAULT_RECURSION_LIMIT);
    if recursion_limit == 0 {
        return Err(ConfigError::InvalidValue {
            origin: "recursion limit".to_string(),
            value: "0".to_string(),
            expected: "The recursion limit must be at least 1.".to_string(),
        });
    }

    let fetch_timeout_secs = profile.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
    if fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            origin: "fetch_timeout".to_string(),
            value: "0".to_string(),
            expected: "The fetch timeout must be at least 1 second.".to_string(),
        });
    }
    let fetch_max_chars = profile.fetch_max_chars.unwrap_or(DEFAULT_MAX_CHARS);
    if fetch_max_chars == 0 {
        return Err(ConfigError::InvalidValue {
            origin: "fetch_max_chars".to_string(),
            value: "0".to_string(),
            expected: "At least one character of page text must be kept.".to_string(),
        });
    }

    let native_language = profile
        .native_language
        .map(|code| code.trim().to_ascii_lowercase())
        .unwrap_or_else(|| NATIVE_LANGUAGE.to_string());

    Ok(Settings {
        profile: profile_name,
        provider,
        model,
        temperature,
        max_tokens: cli.max_tokens.or(profile.max_tokens),
        timeout_secs,
        retries,
        retry_delay_ms: profile.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY_MS),
        recursion_limit,
        native_language,
        fetch_timeout_secs,
        fetch_max_chars,
        knowledge_file: profile.knowledge_file,
    })
}

fn parse_provider(origin: &str, value: &str) -> Result<Provider, ConfigError> {
    Provider::parse(value).ok_or_else(|| ConfigError::InvalidValue {
        origin: origin.to_string(),
        value: value.to_string(),
        expected: format!("Supported values: {}.", Provider::SUPPORTED),
    })
}

fn pick<T: FromStr>(
    cli: Option<T>,
    env_raw: Option<String>,
    env_key: &str,
    profile: Option<T>,
) -> Result<Option<T>, ConfigError> {
    if cli.is_some() {
        return Ok(cli);
    }
    if let Some(raw) = env_raw {
        return raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                origin: env_key.to_string(),
                value: raw.clone(),
                expected: "Expected a number.".to_string(),
            });
    }
    Ok(profile)
}
