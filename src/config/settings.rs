//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the lottery client.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Main configuration settings for the lottery client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Account credentials
    pub account: AccountSettings,
    /// Operator endpoints and HTTP behaviour
    pub network: NetworkSettings,
    /// Purchase business rules
    pub purchase: PurchaseSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Account credentials. `Debug` never prints the password.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Operator endpoints and HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Main site (login, account, draw info)
    pub base_url: String,
    /// Game host (readiness token and transaction endpoints)
    pub game_url: String,
    /// Default request timeout in seconds
    pub timeout_secs: u64,
    /// Timeout for the purchase transaction in seconds
    pub transaction_timeout_secs: u64,
    /// Browser user agent sent with every request
    pub user_agent: String,
    /// Accept-Language header value
    pub accept_language: String,
}

/// Purchase rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseSettings {
    /// Price of one game in KRW
    pub unit_price: i64,
    /// Maximum undrawn games per account per week
    pub weekly_limit: u32,
    /// Maximum slots per transaction
    pub max_slots: usize,
    /// Retry budget for authenticated requests
    pub max_retries: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.dhlottery.co.kr".to_string(),
            game_url: "https://ol.dhlottery.co.kr".to_string(),
            timeout_secs: 30,
            transaction_timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

impl Default for PurchaseSettings {
    fn default() -> Self {
        Self {
            unit_price: 1000,
            weekly_limit: 5,
            max_slots: 5,
            max_retries: 2,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl NetworkSettings {
    /// Default request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Timeout for the purchase transaction
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_with_env()
    }

    /// Load settings from a TOML file; missing sections keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Apply environment variable overrides
    pub fn merge_with_env(mut self) -> Result<Self> {
        if let Ok(username) = std::env::var("DHLOTTERY_USERNAME") {
            self.account.username = username;
        }

        if let Ok(password) = std::env::var("DHLOTTERY_PASSWORD") {
            self.account.password = password;
        }

        if let Ok(base_url) = std::env::var("DHLOTTERY_BASE_URL") {
            self.network.base_url = base_url;
        }

        if let Ok(game_url) = std::env::var("DHLOTTERY_GAME_URL") {
            self.network.game_url = game_url;
        }

        if let Ok(timeout) = std::env::var("DHLOTTERY_TIMEOUT") {
            self.network.timeout_secs = timeout
                .parse()
                .map_err(|e| Error::Config(format!("Invalid timeout: {}", e)))?;
        }

        if let Ok(level) = std::env::var("DHLOTTERY_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Check endpoint URLs and numeric limits
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("base_url", &self.network.base_url),
            ("game_url", &self.network.game_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::config(format!("Invalid {}: {} ({})", name, value, e)))?;
        }

        if self.network.timeout_secs == 0 || self.network.transaction_timeout_secs == 0 {
            return Err(Error::config("Timeouts must be greater than zero"));
        }

        if self.purchase.unit_price <= 0 {
            return Err(Error::config("unit_price must be positive"));
        }

        if self.purchase.max_slots == 0 || self.purchase.max_slots > 5 {
            return Err(Error::config("max_slots must be within 1..=5"));
        }

        if self.purchase.weekly_limit == 0 {
            return Err(Error::config("weekly_limit must be positive"));
        }

        Ok(())
    }

    /// Whether credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.account.username.is_empty() && !self.account.password.is_empty()
    }
}
