use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

/// Environment variable holding the bot token. The token is never read from
/// the config file.
pub const TOKEN_ENV: &str = "BOT_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(skip)]
    pub bot_token: String,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub inline: InlineConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    /// Publish the command list to Telegram at startup
    #[serde(default = "default_register_commands")]
    pub register_commands: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InlineConfig {
    /// Seconds Telegram may cache inline results
    #[serde(default)]
    pub cache_time: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplyConfig {
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_register_commands() -> bool {
    true
}

// Telegram caps messages at 4096 characters
fn default_max_message_len() -> usize {
    4000
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            register_commands: default_register_commands(),
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
        }
    }
}

impl Config {
    /// Load settings from `path` (optional; defaults apply when missing) and
    /// the token from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            info!("No config file at {}, using defaults", path.display());
            String::new()
        };

        Self::from_parts(&content, std::env::var(TOKEN_ENV).ok())
    }

    /// Build a config from TOML text and an optional token value.
    pub fn from_parts(content: &str, token: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken(TOKEN_ENV))?;

        let mut config: Config = toml::from_str(content)?;
        config.bot_token = token;

        if config.reply.max_message_len == 0 {
            return Err(ConfigError::Invalid(
                "reply.max_message_len must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}
