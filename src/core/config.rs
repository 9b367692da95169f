//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.ideabot/config.toml` unless `--config` points
//! elsewhere. If the default file is missing on first run, a commented-out
//! template is generated so users can discover all options. Secrets are
//! normally supplied through the environment (`.env` is loaded first).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::ProviderKind;
use crate::core::idea::DEFAULT_IDEA_MARKER;
use crate::core::pipeline::PipelineSettings;
use crate::core::store::{SqliteIdeaStore, StoreError};
use crate::delivery::TelegramMessenger;
use crate::delivery::telegram::DEFAULT_TELEGRAM_BASE_URL;
use crate::inference::providers::yandex::DEFAULT_TEMPERATURE;
use crate::inference::providers::{DEFAULT_MAX_TOKENS, YandexSettings};
use crate::inference::{
    AnthropicProvider, GeminiProvider, GenerationProvider, OpenAiProvider, PromptPair,
    YandexProvider,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct IdeabotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub proxy_api: ProxyApiConfig,
    #[serde(default)]
    pub yandex: YandexConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub project_name: Option<String>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub log_file: Option<String>,
    pub generation_timeout_secs: Option<u64>,
    pub token_timeout_secs: Option<u64>,
    pub delivery_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PromptsConfig {
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub additional_prompt: Option<String>,
    pub idea_marker: Option<String>,
    pub admin_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProxyApiConfig {
    pub api_key: Option<String>,
    pub openai_url: Option<String>,
    pub anthropic_url: Option<String>,
    pub google_url: Option<String>,
    pub deepseek_url: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct YandexConfig {
    pub oauth_token: Option<String>,
    pub folder_id: Option<String>,
    pub iam_token_url: Option<String>,
    pub model_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub admin_chat_id: Option<String>,
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROJECT_NAME: &str = "ideabot";
pub const DEFAULT_DB_PATH: &str = "ideas.db";
pub const DEFAULT_DB_TABLE: &str = "ideas";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOKEN_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_OPENAI_URL: &str = "https://api.proxyapi.ru/openai/v1/chat/completions";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.proxyapi.ru/anthropic/v1/messages";
pub const DEFAULT_GOOGLE_URL: &str = "https://api.proxyapi.ru/google/v1beta/models/";
pub const DEFAULT_DEEPSEEK_URL: &str = "https://api.proxyapi.ru/deepseek/chat/completions";
pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.api.cloud.yandex.net/iam/v1/tokens";
pub const DEFAULT_YANDEX_MODEL_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

const DEFAULT_ADDITIONAL_PROMPT: &str = "Не предлагай идеи, которые уже были:";
const DEFAULT_ADMIN_PREFIX: &str = "Ответ от GPT с ошибкой:";

// ============================================================================
// Resolved Config (concrete values; credentials stay optional until used)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project_name: String,
    pub log_file: PathBuf,
    pub provider: ProviderKind,
    pub model: String,
    pub generation_timeout: Duration,
    pub token_timeout: Duration,
    pub delivery_timeout: Duration,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
    pub additional_prompt: String,
    pub idea_marker: String,
    pub admin_prefix: String,
    pub db_path: PathBuf,
    pub db_table: String,
    pub proxy_api_key: Option<String>,
    pub openai_url: String,
    pub anthropic_url: String,
    pub google_url: String,
    pub deepseek_url: String,
    pub proxy_max_tokens: u32,
    pub yandex_oauth_token: Option<String>,
    pub yandex_folder_id: Option<String>,
    pub yandex_iam_token_url: String,
    pub yandex_model_url: String,
    pub yandex_temperature: f32,
    pub yandex_max_tokens: u32,
    pub yandex_stream: bool,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_admin_chat_id: Option<String>,
    pub telegram_base_url: String,
}

/// Values taken from command-line flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// A required setting is absent; the payload names where to set it.
    Missing(&'static str),
    Invalid(String),
    Store(StoreError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Missing(what) => write!(f, "missing setting: {what}"),
            ConfigError::Invalid(msg) => write!(f, "invalid setting: {msg}"),
            ConfigError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.ideabot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ideabot").join("config.toml"))
}

/// Load config from `explicit` or from `~/.ideabot/config.toml`.
///
/// An explicit path must exist. A missing default file is generated as a
/// commented template and `IdeabotConfig::default()` is returned.
///
/// Runs before the file logger is set up, so notices go to stderr.
pub fn load_config(explicit: Option<&Path>) -> Result<IdeabotConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                eprintln!("ideabot: could not determine home directory, using default config");
                return Ok(IdeabotConfig::default());
            }
        },
    };

    if explicit.is_none() && !path.exists() {
        match generate_default_config(&path) {
            Ok(()) => eprintln!("ideabot: wrote config template to {}", path.display()),
            Err(e) => eprintln!(
                "ideabot: failed to write config template {}: {e}",
                path.display()
            ),
        }
        return Ok(IdeabotConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    toml::from_str(&contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ideabot configuration
# All settings are optional unless marked required.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# project_name = "ideabot"           # also names the log file: <project_name>.log
# log_file = "ideabot.log"           # overrides the name derived from project_name
# provider = "openai"                # openai, deepseek, anthropic, gemini, yandex
# model = "gpt-4o"                   # Or set IDEABOT_MODEL
# generation_timeout_secs = 30
# token_timeout_secs = 10
# delivery_timeout_secs = 10

# [prompts]
# system_prompt = "..."              # required
# user_prompt = "..."                # required
# additional_prompt = "Не предлагай идеи, которые уже были:"
# idea_marker = "Идея: "
# admin_prefix = "Ответ от GPT с ошибкой:"

# [database]
# path = "ideas.db"
# table = "ideas"

# [proxy_api]
# api_key = "..."                    # Or set PROXY_API_KEY
# openai_url = "https://api.proxyapi.ru/openai/v1/chat/completions"
# anthropic_url = "https://api.proxyapi.ru/anthropic/v1/messages"
# google_url = "https://api.proxyapi.ru/google/v1beta/models/"
# deepseek_url = "https://api.proxyapi.ru/deepseek/chat/completions"
# max_tokens = 1000

# [yandex]
# oauth_token = "..."                # Or set YANDEX_OAUTH_TOKEN
# folder_id = "..."                  # Or set YANDEX_FOLDER_ID
# iam_token_url = "https://iam.api.cloud.yandex.net/iam/v1/tokens"
# model_url = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion"
# temperature = 0.6
# max_tokens = 1000
# stream = false

# [telegram]
# bot_token = "..."                  # Or set TELEGRAM_BOT_TOKEN
# chat_id = "..."                    # Or set TELEGRAM_CHAT_ID
# admin_chat_id = "..."              # Or set TELEGRAM_ADMIN_CHAT_ID
# base_url = "https://api.telegram.org"
"#;

/// Writes the commented template to `path`, creating parent directories.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve against the process environment.
pub fn resolve(config: &IdeabotConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// Resolve the final config by collapsing: defaults → config file → env → CLI.
///
/// `env` looks up environment variables; tests pass a fixed map.
pub fn resolve_with<F>(
    config: &IdeabotConfig,
    cli: &CliOverrides,
    env: F,
) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Provider: CLI → env → config → default
    let provider = match (cli.provider, env("IDEABOT_PROVIDER")) {
        (Some(kind), _) => kind,
        (None, Some(name)) => ProviderKind::from_str(&name, true)
            .map_err(|_| ConfigError::Invalid(format!("IDEABOT_PROVIDER={name}")))?,
        (None, None) => config.general.provider.unwrap_or_default(),
    };

    // Model: CLI → env → config → provider default
    let model = cli
        .model
        .clone()
        .or_else(|| env("IDEABOT_MODEL"))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    let project_name = config
        .general
        .project_name
        .clone()
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

    let log_file = config
        .general
        .log_file
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{project_name}.log")));

    let secs = |value: Option<u64>, default: u64| Duration::from_secs(value.unwrap_or(default));

    Ok(ResolvedConfig {
        log_file,
        provider,
        model,
        generation_timeout: secs(
            config.general.generation_timeout_secs,
            DEFAULT_GENERATION_TIMEOUT_SECS,
        ),
        token_timeout: secs(config.general.token_timeout_secs, DEFAULT_TOKEN_TIMEOUT_SECS),
        delivery_timeout: secs(
            config.general.delivery_timeout_secs,
            DEFAULT_DELIVERY_TIMEOUT_SECS,
        ),
        system_prompt: config.prompts.system_prompt.clone(),
        user_prompt: config.prompts.user_prompt.clone(),
        additional_prompt: config
            .prompts
            .additional_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_ADDITIONAL_PROMPT.to_string()),
        idea_marker: config
            .prompts
            .idea_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_IDEA_MARKER.to_string()),
        admin_prefix: config
            .prompts
            .admin_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_ADMIN_PREFIX.to_string()),
        db_path: PathBuf::from(
            config
                .database
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        ),
        db_table: config
            .database
            .table
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_TABLE.to_string()),
        // Secrets: env → config
        proxy_api_key: env("PROXY_API_KEY").or_else(|| config.proxy_api.api_key.clone()),
        openai_url: or_default(&config.proxy_api.openai_url, DEFAULT_OPENAI_URL),
        anthropic_url: or_default(&config.proxy_api.anthropic_url, DEFAULT_ANTHROPIC_URL),
        google_url: or_default(&config.proxy_api.google_url, DEFAULT_GOOGLE_URL),
        deepseek_url: or_default(&config.proxy_api.deepseek_url, DEFAULT_DEEPSEEK_URL),
        proxy_max_tokens: config.proxy_api.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        yandex_oauth_token: env("YANDEX_OAUTH_TOKEN").or_else(|| config.yandex.oauth_token.clone()),
        yandex_folder_id: env("YANDEX_FOLDER_ID").or_else(|| config.yandex.folder_id.clone()),
        yandex_iam_token_url: or_default(&config.yandex.iam_token_url, DEFAULT_IAM_TOKEN_URL),
        yandex_model_url: or_default(&config.yandex.model_url, DEFAULT_YANDEX_MODEL_URL),
        yandex_temperature: config.yandex.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        yandex_max_tokens: config.yandex.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        yandex_stream: config.yandex.stream.unwrap_or(false),
        telegram_bot_token: env("TELEGRAM_BOT_TOKEN").or_else(|| config.telegram.bot_token.clone()),
        telegram_chat_id: env("TELEGRAM_CHAT_ID").or_else(|| config.telegram.chat_id.clone()),
        telegram_admin_chat_id: env("TELEGRAM_ADMIN_CHAT_ID")
            .or_else(|| config.telegram.admin_chat_id.clone()),
        telegram_base_url: or_default(&config.telegram.base_url, DEFAULT_TELEGRAM_BASE_URL),
        project_name,
    })
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

fn required(value: &Option<String>, what: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(what))
}

// ============================================================================
// Component construction
// ============================================================================

impl ResolvedConfig {
    /// Builds the selected provider, checking only the credentials it needs.
    pub fn build_provider(&self) -> Result<Box<dyn GenerationProvider>, ConfigError> {
        let provider: Box<dyn GenerationProvider> = match self.provider {
            ProviderKind::OpenAi => Box::new(
                OpenAiProvider::new(self.proxy_api_key()?, self.openai_url.clone())
                    .with_max_tokens(self.proxy_max_tokens)
                    .with_timeout(self.generation_timeout),
            ),
            ProviderKind::DeepSeek => Box::new(
                OpenAiProvider::deepseek(self.proxy_api_key()?, self.deepseek_url.clone())
                    .with_max_tokens(self.proxy_max_tokens)
                    .with_timeout(self.generation_timeout),
            ),
            ProviderKind::Anthropic => Box::new(
                AnthropicProvider::new(self.proxy_api_key()?, self.anthropic_url.clone())
                    .with_max_tokens(self.proxy_max_tokens)
                    .with_timeout(self.generation_timeout),
            ),
            ProviderKind::Gemini => Box::new(
                GeminiProvider::new(self.proxy_api_key()?, self.google_url.clone())
                    .with_timeout(self.generation_timeout),
            ),
            ProviderKind::Yandex => {
                let mut settings = YandexSettings::new(
                    required(
                        &self.yandex_oauth_token,
                        "yandex.oauth_token / YANDEX_OAUTH_TOKEN",
                    )?,
                    required(&self.yandex_folder_id, "yandex.folder_id / YANDEX_FOLDER_ID")?,
                    self.yandex_iam_token_url.clone(),
                    self.yandex_model_url.clone(),
                );
                settings.temperature = self.yandex_temperature;
                settings.max_tokens = self.yandex_max_tokens;
                settings.stream = self.yandex_stream;
                settings.token_timeout = self.token_timeout;
                settings.generation_timeout = self.generation_timeout;
                Box::new(YandexProvider::new(settings))
            }
        };
        Ok(provider)
    }

    fn proxy_api_key(&self) -> Result<String, ConfigError> {
        required(&self.proxy_api_key, "proxy_api.api_key / PROXY_API_KEY")
    }

    pub fn build_store(&self) -> Result<SqliteIdeaStore, ConfigError> {
        SqliteIdeaStore::new(&self.db_path, &self.db_table).map_err(ConfigError::Store)
    }

    pub fn build_messenger(&self) -> Result<TelegramMessenger, ConfigError> {
        let token = required(&self.telegram_bot_token, "telegram.bot_token / TELEGRAM_BOT_TOKEN")?;
        Ok(
            TelegramMessenger::new(token, Some(self.telegram_base_url.clone()))
                .with_timeout(self.delivery_timeout),
        )
    }

    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        Ok(PipelineSettings {
            prompt: PromptPair::new(
                required(&self.system_prompt, "prompts.system_prompt")?,
                required(&self.user_prompt, "prompts.user_prompt")?,
            ),
            model: self.model.clone(),
            dedup_lead_in: self.additional_prompt.clone(),
            idea_marker: self.idea_marker.clone(),
            chat_id: required(&self.telegram_chat_id, "telegram.chat_id / TELEGRAM_CHAT_ID")?,
            admin_chat_id: required(
                &self.telegram_admin_chat_id,
                "telegram.admin_chat_id / TELEGRAM_ADMIN_CHAT_ID",
            )?,
            admin_prefix: self.admin_prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_config() -> IdeabotConfig {
        toml::from_str(
            r#"
[prompts]
system_prompt = "You suggest hobbies."
user_prompt = "Suggest one."

[proxy_api]
api_key = "file-key"

[telegram]
bot_token = "123:ABC"
chat_id = "-1001"
admin_chat_id = "42"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_config_parses() {
        let config = IdeabotConfig::default();
        assert!(config.general.provider.is_none());
        assert!(config.prompts.user_prompt.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&IdeabotConfig::default(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.provider, ProviderKind::OpenAi);
        assert_eq!(resolved.model, "gpt-4o");
        assert_eq!(resolved.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(resolved.log_file, PathBuf::from("ideabot.log"));
        assert_eq!(resolved.generation_timeout, Duration::from_secs(30));
        assert_eq!(resolved.token_timeout, Duration::from_secs(10));
        assert_eq!(resolved.delivery_timeout, Duration::from_secs(10));
        assert_eq!(resolved.idea_marker, "Идея: ");
        assert_eq!(resolved.db_table, "ideas");
        assert_eq!(resolved.openai_url, DEFAULT_OPENAI_URL);
    }

    #[test]
    fn test_log_file_follows_project_name() {
        let config: IdeabotConfig = toml::from_str("[general]\nproject_name = \"weekend\"\n").unwrap();
        let resolved = resolve_with(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.log_file, PathBuf::from("weekend.log"));
    }

    #[test]
    fn test_provider_precedence_cli_env_file() {
        let config: IdeabotConfig = toml::from_str("[general]\nprovider = \"gemini\"\n").unwrap();

        let from_file = resolve_with(&config, &CliOverrides::default(), no_env).unwrap();
        assert_eq!(from_file.provider, ProviderKind::Gemini);
        assert_eq!(from_file.model, "gemini-1.5-flash");

        let env = env_of(&[("IDEABOT_PROVIDER", "yandex")]);
        let from_env = resolve_with(&config, &CliOverrides::default(), &env).unwrap();
        assert_eq!(from_env.provider, ProviderKind::Yandex);

        let cli = CliOverrides {
            provider: Some(ProviderKind::DeepSeek),
            model: Some("deepseek-reasoner".to_string()),
        };
        let from_cli = resolve_with(&config, &cli, &env).unwrap();
        assert_eq!(from_cli.provider, ProviderKind::DeepSeek);
        assert_eq!(from_cli.model, "deepseek-reasoner");
    }

    #[test]
    fn test_invalid_env_provider_is_rejected() {
        let env = env_of(&[("IDEABOT_PROVIDER", "mistral")]);
        let err = resolve_with(&IdeabotConfig::default(), &CliOverrides::default(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_secrets_override_file() {
        let env = env_of(&[("PROXY_API_KEY", "env-key"), ("TELEGRAM_CHAT_ID", "-2002")]);
        let resolved = resolve_with(&full_config(), &CliOverrides::default(), env).unwrap();
        assert_eq!(resolved.proxy_api_key.as_deref(), Some("env-key"));
        assert_eq!(resolved.telegram_chat_id.as_deref(), Some("-2002"));
        assert_eq!(resolved.telegram_admin_chat_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_pipeline_settings_from_full_config() {
        let resolved = resolve_with(&full_config(), &CliOverrides::default(), no_env).unwrap();
        let settings = resolved.pipeline_settings().unwrap();
        assert_eq!(settings.prompt.system_prompt, "You suggest hobbies.");
        assert_eq!(settings.prompt.user_prompt, "Suggest one.");
        assert_eq!(settings.chat_id, "-1001");
        assert_eq!(settings.admin_chat_id, "42");
        assert_eq!(settings.dedup_lead_in, DEFAULT_ADDITIONAL_PROMPT);
    }

    #[test]
    fn test_missing_prompts_are_reported() {
        let resolved = resolve_with(&IdeabotConfig::default(), &CliOverrides::default(), no_env).unwrap();
        assert!(matches!(
            resolved.pipeline_settings(),
            Err(ConfigError::Missing("prompts.system_prompt"))
        ));
    }

    #[test]
    fn test_build_provider_checks_only_selected_credentials() {
        let resolved = resolve_with(&full_config(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(resolved.build_provider().unwrap().name(), "openai");

        let cli = CliOverrides {
            provider: Some(ProviderKind::Yandex),
            model: None,
        };
        let yandex = resolve_with(&full_config(), &cli, no_env).unwrap();
        assert!(matches!(
            yandex.build_provider(),
            Err(ConfigError::Missing(what)) if what.contains("YANDEX_OAUTH_TOKEN")
        ));

        let env = env_of(&[("YANDEX_OAUTH_TOKEN", "y0_oauth"), ("YANDEX_FOLDER_ID", "b1g")]);
        let yandex = resolve_with(&full_config(), &cli, env).unwrap();
        assert_eq!(yandex.build_provider().unwrap().name(), "yandex");
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let env = env_of(&[("PROXY_API_KEY", "  ")]);
        let resolved = resolve_with(&IdeabotConfig::default(), &CliOverrides::default(), env).unwrap();
        assert!(matches!(resolved.build_provider(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_invalid_table_is_store_error() {
        let config: IdeabotConfig = toml::from_str("[database]\ntable = \"bad name\"\n").unwrap();
        let resolved = resolve_with(&config, &CliOverrides::default(), no_env).unwrap();
        assert!(matches!(
            resolved.build_store(),
            Err(ConfigError::Store(StoreError::InvalidTable(_)))
        ));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: IdeabotConfig = toml::from_str(
            r#"
[general]
provider = "anthropic"

[yandex]
temperature = 0.3
stream = false
"#,
        )
        .unwrap();
        assert_eq!(config.general.provider, Some(ProviderKind::Anthropic));
        assert_eq!(config.yandex.temperature, Some(0.3));
        assert!(config.telegram.bot_token.is_none());
    }

    #[test]
    fn test_explicit_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_explicit_path_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ideabot.toml");
        fs::write(&path, "[database]\npath = \"/tmp/x.db\"\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.database.path.as_deref(), Some("/tmp/x.db"));
    }

    #[test]
    fn test_template_is_written_with_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ideabot").join("config.toml");
        generate_default_config(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TEMPLATE);
    }

    #[test]
    fn test_template_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        assert!(generate_default_config(&blocker.join("config.toml")).is_err());
    }

    #[test]
    fn test_uncommented_template_covers_every_key() {
        let uncommented: String = DEFAULT_CONFIG_TEMPLATE
            .lines()
            .filter_map(|line| line.strip_prefix("# "))
            .filter(|line| line.starts_with('[') || line.contains(" = "))
            .map(|line| format!("{line}\n"))
            .collect();
        let config: IdeabotConfig = toml::from_str(&uncommented).unwrap();

        assert_eq!(config.general.log_file.as_deref(), Some("ideabot.log"));
        assert_eq!(config.proxy_api.openai_url.as_deref(), Some(DEFAULT_OPENAI_URL));
        assert_eq!(config.proxy_api.anthropic_url.as_deref(), Some(DEFAULT_ANTHROPIC_URL));
        assert_eq!(config.proxy_api.google_url.as_deref(), Some(DEFAULT_GOOGLE_URL));
        assert_eq!(config.proxy_api.deepseek_url.as_deref(), Some(DEFAULT_DEEPSEEK_URL));
        assert_eq!(config.yandex.iam_token_url.as_deref(), Some(DEFAULT_IAM_TOKEN_URL));
        assert_eq!(config.yandex.model_url.as_deref(), Some(DEFAULT_YANDEX_MODEL_URL));
        assert_eq!(config.yandex.stream, Some(false));
        assert_eq!(
            config.telegram.base_url.as_deref(),
            Some(DEFAULT_TELEGRAM_BASE_URL)
        );
    }
}
