//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.teams-llm-bot/config.json`);
//! environment variables override file values. Everything the dispatcher needs
//! is materialized once at startup into [`LlmSettings`] — nothing reads the
//! environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Bot Framework channel credentials (consumed by the connector).
    #[serde(default)]
    pub channel: ChannelConfig,

    /// LLM backend settings (automation webhook or completion API).
    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the messaging and health endpoints (default 3978).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0" — the channel service must reach us).
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    3978
}

fn default_server_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Bot Framework app registration. When `app_id` is empty the connector sends
/// unauthenticated requests (local emulator mode).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    /// Microsoft app id. Overridden by TEAMS_APP_ID env when set.
    pub app_id: Option<String>,
    /// Microsoft app password/secret. Overridden by TEAMS_APP_PASSWORD env.
    pub app_password: Option<String>,
    /// "MultiTenant" (default) or "SingleTenant".
    #[serde(default)]
    pub app_type: AppType,
    /// Tenant id, required for SingleTenant. Overridden by TEAMS_APP_TENANT_ID env.
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppType {
    #[default]
    MultiTenant,
    SingleTenant,
}

/// LLM backend options. `use_automation` with a non-empty automation URL picks
/// the automation webhook; otherwise a non-empty completion key picks the
/// completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// Automation webhook URL. Overridden by AUTOMATION_ENDPOINT_URL env.
    pub automation_endpoint_url: Option<String>,
    /// Completion API key. Overridden by COMPLETION_API_KEY env.
    pub completion_api_key: Option<String>,
    /// Completion API endpoint (default public chat-completions URL).
    /// Overridden by COMPLETION_API_ENDPOINT env.
    #[serde(default = "default_completion_endpoint")]
    pub completion_api_endpoint: String,
    /// Model identifier for the completion API. Overridden by LLM_MODEL env.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Prefer the automation webhook over the completion API.
    /// Overridden by USE_AUTOMATION env ("true").
    #[serde(default)]
    pub use_automation: bool,
}

fn default_completion_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model_name() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            automation_endpoint_url: None,
            completion_api_key: None,
            completion_api_endpoint: default_completion_endpoint(),
            model_name: default_model_name(),
            use_automation: false,
        }
    }
}

/// Non-empty trimmed env value, or None.
fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the automation webhook URL: env AUTOMATION_ENDPOINT_URL overrides config.
pub fn resolve_automation_url(config: &Config) -> Option<String> {
    env_override("AUTOMATION_ENDPOINT_URL").or_else(|| {
        config
            .llm
            .automation_endpoint_url
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Resolve the completion API key: env COMPLETION_API_KEY overrides config.
pub fn resolve_completion_api_key(config: &Config) -> Option<String> {
    env_override("COMPLETION_API_KEY").or_else(|| {
        config
            .llm
            .completion_api_key
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Resolve the completion endpoint: env COMPLETION_API_ENDPOINT overrides config.
pub fn resolve_completion_endpoint(config: &Config) -> String {
    env_override("COMPLETION_API_ENDPOINT")
        .unwrap_or_else(|| config.llm.completion_api_endpoint.trim().to_string())
}

/// Resolve the model name: env LLM_MODEL overrides config.
pub fn resolve_model_name(config: &Config) -> String {
    env_override("LLM_MODEL").unwrap_or_else(|| config.llm.model_name.trim().to_string())
}

/// Resolve the automation preference: env USE_AUTOMATION ("true") overrides config.
pub fn resolve_use_automation(config: &Config) -> bool {
    match env_override("USE_AUTOMATION") {
        Some(v) => v.eq_ignore_ascii_case("true"),
        None => config.llm.use_automation,
    }
}

/// Merged LLM settings as the dispatcher sees them. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct LlmSettings {
    pub automation_url: Option<String>,
    pub completion_api_key: Option<String>,
    pub completion_endpoint: String,
    pub model_name: String,
    pub use_automation: bool,
}

impl LlmSettings {
    /// Merge the config file with environment overrides.
    pub fn resolve(config: &Config) -> Self {
        Self {
            automation_url: resolve_automation_url(config),
            completion_api_key: resolve_completion_api_key(config),
            completion_endpoint: resolve_completion_endpoint(config),
            model_name: resolve_model_name(config),
            use_automation: resolve_use_automation(config),
        }
    }
}

/// Merged channel credentials for the connector.
#[derive(Debug, Clone, Default)]
pub struct ChannelSettings {
    pub app_id: Option<String>,
    pub app_password: Option<String>,
    pub app_type: AppType,
    pub tenant_id: Option<String>,
}

impl ChannelSettings {
    /// Merge the config file with environment overrides.
    pub fn resolve(config: &Config) -> Self {
        Self {
            app_id: env_override("TEAMS_APP_ID").or_else(|| {
                config
                    .channel
                    .app_id
                    .as_ref()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            }),
            app_password: env_override("TEAMS_APP_PASSWORD")
                .or_else(|| config.channel.app_password.clone()),
            app_type: config.channel.app_type,
            tenant_id: env_override("TEAMS_APP_TENANT_ID")
                .or_else(|| config.channel.tenant_id.clone()),
        }
    }
}

/// Resolve config path from env or default (~/.teams-llm-bot/config.json).
pub fn default_config_path() -> PathBuf {
    std::env::var("TEAMS_BOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".teams-llm-bot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or TEAMS_BOT_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
