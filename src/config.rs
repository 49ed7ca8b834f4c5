//! Configuration loading.
//!
//! Settings come from three layers:
//!
//! 1. A TOML file (`--config`, default `./config/chatadv.toml`) holding the
//!    non-secret knobs. Every field has a default, so the file is optional.
//! 2. The process environment, usually seeded from a `.env` file:
//!    `OPENAI_API_KEY`, `VECTOR_STORE_ID` and `OPENAI_MODEL`.
//! 3. The instructions file named by `openai.instructions_path`.
//!
//! [`load_config`] handles layer 1 and fails fast on malformed files.
//! [`RelaySettings::resolve`] combines all three; its failure is a
//! [`RelayError::Configuration`] which the server reports on every chat
//! request instead of refusing to start.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RelayError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const VECTOR_STORE_VAR: &str = "VECTOR_STORE_ID";
pub const MODEL_VAR: &str = "OPENAI_MODEL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Route the chat handler is mounted on.
    #[serde(default = "default_path")]
    pub path: String,
    /// Echo the raw upstream response under `debug` in every success body.
    #[serde(default)]
    pub include_debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            path: default_path(),
            include_debug: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_path() -> String {
    "/chat".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Used when `OPENAI_MODEL` is unset or empty.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_instructions_path")]
    pub instructions_path: PathBuf,
    /// Ask the API to echo `file_search_call.results` back.
    #[serde(default = "default_true")]
    pub include_search_results: bool,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            instructions_path: default_instructions_path(),
            include_search_results: true,
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/responses".to_string()
}
fn default_model() -> String {
    "gpt-5.2-2025-12-11".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_instructions_path() -> PathBuf {
    PathBuf::from("system_prompt.txt")
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResponseConfig {
    /// Return only the text inside `<answer>...</answer>` when present.
    #[serde(default)]
    pub answer_tag: bool,
}

/// Outcome of [`load_env_file`]. Returned rather than logged because the
/// file may set `RUST_LOG` and has to be read before tracing starts.
#[derive(Debug)]
pub enum EnvFile {
    Loaded,
    Missing,
    Failed(String),
}

/// Load a `.env` file into the process environment, overriding existing
/// variables.
pub fn load_env_file(path: &Path) -> EnvFile {
    match dotenvy::from_path_override(path) {
        Ok(()) => EnvFile::Loaded,
        Err(e) if e.not_found() => EnvFile::Missing,
        Err(e) => EnvFile::Failed(e.to_string()),
    }
}

/// Load and validate the TOML config file.
///
/// A missing file yields [`Config::default`]; a file that exists but cannot
/// be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate config file contents.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config file")?;

    if config.openai.timeout_secs == 0 {
        anyhow::bail!("openai.timeout_secs must be > 0");
    }

    validate_route(&config.server.path)?;

    if config.openai.endpoint.trim().is_empty() {
        anyhow::bail!("openai.endpoint must not be empty");
    }

    Ok(config)
}

/// The chat route must be a literal path: axum panics on malformed routes
/// and would treat captures or wildcards as parameters.
fn validate_route(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        anyhow::bail!("server.path must start with '/'");
    }
    if path.contains('{') || path.contains('}') {
        anyhow::bail!("server.path must not contain '{{' or '}}': {}", path);
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        anyhow::bail!(
            "server.path segments must not start with ':' or '*': {}",
            path
        );
    }
    Ok(())
}

/// Everything a chat request needs, resolved once at startup.
#[derive(Clone)]
pub struct RelaySettings {
    pub api_key: String,
    pub vector_store_id: String,
    pub model: String,
    pub instructions: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub include_search_results: bool,
    pub include_debug: bool,
    pub answer_tag: bool,
}

impl std::fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySettings")
            .field("api_key", &"<redacted>")
            .field("vector_store_id", &self.vector_store_id)
            .field("model", &self.model)
            .field("instructions", &format_args!("<{} bytes>", self.instructions.len()))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("include_search_results", &self.include_search_results)
            .field("include_debug", &self.include_debug)
            .field("answer_tag", &self.answer_tag)
            .finish()
    }
}

impl RelaySettings {
    /// Resolve settings from the config file plus an environment lookup.
    ///
    /// `env` is usually `|k| std::env::var(k).ok()`. A relative
    /// `instructions_path` is taken relative to `base_dir`.
    pub fn resolve<F>(config: &Config, base_dir: &Path, env: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

        let api_key = non_empty(API_KEY_VAR).ok_or_else(|| {
            RelayError::Configuration(format!("Missing {} in .env", API_KEY_VAR))
        })?;
        let vector_store_id = non_empty(VECTOR_STORE_VAR).ok_or_else(|| {
            RelayError::Configuration(format!("Missing {} in .env", VECTOR_STORE_VAR))
        })?;
        let model = non_empty(MODEL_VAR).unwrap_or_else(|| config.openai.model.clone());

        let instructions_path = if config.openai.instructions_path.is_absolute() {
            config.openai.instructions_path.clone()
        } else {
            base_dir.join(&config.openai.instructions_path)
        };
        let instructions = load_instructions(&instructions_path)?;

        Ok(Self {
            api_key,
            vector_store_id,
            model,
            instructions,
            endpoint: config.openai.endpoint.clone(),
            timeout: Duration::from_secs(config.openai.timeout_secs),
            include_search_results: config.openai.include_search_results,
            include_debug: config.server.include_debug,
            answer_tag: config.response.answer_tag,
        })
    }
}

/// Read the system instructions. Whitespace-only content counts as missing.
fn load_instructions(path: &Path) -> Result<String, RelayError> {
    let missing = || {
        RelayError::Configuration(format!(
            "Missing or empty {}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        ))
    };

    let text = std::fs::read_to_string(path).map_err(|_| missing())?;
    if text.trim().is_empty() {
        return Err(missing());
    }
    Ok(text)
}
