//! Configuration loading.
//!
//! Settings come from a TOML file (config.toml, falling back to
//! config.example.toml and then built-in defaults), with GOLDENDOG_* env
//! vars overriding the secret-bearing fields so tokens never need to live
//! in the file. A .env file is honored if present.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::memory::FileStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL, e.g. http://localhost:8080
    pub base_url: String,
    pub api_key: String,
    pub user_id: String,
    /// Shared secret for HMAC request signing. Empty disables signing.
    pub hmac_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            user_id: String::new(),
            hmac_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Seconds between scan cycles
    pub interval_secs: u64,
    /// How many pending tokens to request per cycle
    pub fetch_limit: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            fetch_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Memory file location. Empty means GOLDENDOG_MEMORY_PATH or
    /// ~/.goldendog/memory.json.
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// "telegram" (or "tg") enables Telegram alerts; anything else disables
    pub channel: String,
    pub bot_token: String,
    /// Chat id, optionally prefixed "telegram:" or "tg:"
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from a specific TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try config.toml, fall back to config.example.toml, then to built-in
    /// defaults.
    pub fn load_or_default() -> Result<Self> {
        if std::path::Path::new("config.toml").exists() {
            Self::load("config.toml")
        } else if std::path::Path::new("config.example.toml").exists() {
            Self::load("config.example.toml")
        } else {
            let mut config = Config::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        let _ = dotenv::dotenv();

        if let Some(url) = env_value("GOLDENDOG_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Some(key) = env_value("GOLDENDOG_API_KEY") {
            self.server.api_key = key;
        }
        if let Some(user) = env_value("GOLDENDOG_USER_ID") {
            self.server.user_id = user;
        }
        if let Some(secret) = env_value("GOLDENDOG_API_HMAC_SECRET") {
            self.server.hmac_secret = secret;
        }
        if let Some(path) = env_value("GOLDENDOG_MEMORY_PATH") {
            self.memory.path = path;
        }
        if let Some(channel) = env_value("GOLDENDOG_NOTIFY_CHANNEL") {
            self.notify.channel = channel;
        }
        if let Some(chat) = env_value("GOLDENDOG_NOTIFY_TO") {
            self.notify.chat_id = chat;
        }
        if let Some(token) =
            env_value("GOLDENDOG_NOTIFY_TOKEN").or_else(|| env_value("TELEGRAM_BOT_TOKEN"))
        {
            self.notify.bot_token = token;
        }
    }

    /// Resolved memory file path.
    pub fn memory_path(&self) -> PathBuf {
        if self.memory.path.trim().is_empty() {
            FileStore::default_path()
        } else {
            PathBuf::from(self.memory.path.trim())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            bail!("server.base_url must be set");
        }
        if !self.server.base_url.starts_with("http://")
            && !self.server.base_url.starts_with("https://")
        {
            bail!("server.base_url must start with http:// or https://");
        }
        if self.scanner.interval_secs == 0 {
            bail!("scanner.interval_secs must be greater than 0");
        }

        let channel = self.notify.channel.trim().to_lowercase();
        if (channel == "telegram" || channel == "tg")
            && (self.notify.bot_token.is_empty() || self.notify.chat_id.is_empty())
        {
            warn!("⚠️  Telegram channel selected but bot_token/chat_id missing, notifications will be disabled");
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
