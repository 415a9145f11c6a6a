//! Client configuration.
//!
//! Configuration is stored in `.projectdesk/config.yaml` (or under
//! `$PROJECTDESK_ROOT`) and includes:
//! - The backend base URL and API token
//! - Display preferences: page size, timezone and currency symbol
//!
//! `PROJECTDESK_API_URL` and `PROJECTDESK_TOKEN` take precedence over the
//! file when set.

use std::env;
use std::fs;
use std::path::PathBuf;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::filter::DEFAULT_PAGE_SIZE;
use crate::render::RenderOptions;
use crate::render::formatters::CurrencyFormat;

pub const ROOT_ENV: &str = "PROJECTDESK_ROOT";
pub const API_URL_ENV: &str = "PROJECTDESK_API_URL";
pub const TOKEN_ENV: &str = "PROJECTDESK_TOKEN";

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "api.base_url",
    "api.token",
    "display.page_size",
    "display.timezone",
    "display.currency_symbol",
];

/// Directory holding the configuration file
pub fn desk_root() -> PathBuf {
    match env::var(ROOT_ENV) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(".projectdesk"),
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Table presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// IANA zone name; dates are shown as calendar days in this zone
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_currency_symbol() -> String {
    CurrencyFormat::default().symbol
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timezone: default_timezone(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        desk_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.display.page_size == 0 {
            return Err(DeskError::Config(
                "display.page_size must be greater than zero".to_string(),
            ));
        }
        TimeZone::get(&self.display.timezone).map_err(|e| {
            DeskError::Config(format!(
                "unknown timezone '{}': {e}",
                self.display.timezone
            ))
        })?;
        Ok(())
    }

    /// Base URL from the environment or the config file
    pub fn base_url(&self) -> Option<String> {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return Some(url);
        }
        self.api.base_url.clone().filter(|u| !u.is_empty())
    }

    /// API token from the environment or the config file
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.api.token.clone().filter(|t| !t.is_empty())
    }

    pub fn page_size(&self) -> usize {
        self.display.page_size
    }

    /// Display timezone; an unknown name falls back to UTC
    pub fn timezone(&self) -> TimeZone {
        TimeZone::get(&self.display.timezone).unwrap_or_else(|e| {
            tracing::warn!("unknown timezone '{}': {e}; using UTC", self.display.timezone);
            TimeZone::UTC
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            timezone: self.timezone(),
            currency: CurrencyFormat {
                symbol: self.display.currency_symbol.clone(),
                ..CurrencyFormat::default()
            },
            ..RenderOptions::default()
        }
    }

    /// Value of a key as stored in the file; the token is masked
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match validate_key(key)? {
            "api.base_url" => self.api.base_url.clone(),
            "api.token" => self.api.token.as_deref().map(mask_sensitive_value),
            "display.page_size" => Some(self.display.page_size.to_string()),
            "display.timezone" => Some(self.display.timezone.clone()),
            "display.currency_symbol" => Some(self.display.currency_symbol.clone()),
            _ => None,
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match validate_key(key)? {
            "api.base_url" => {
                url::Url::parse(value)?;
                self.api.base_url = Some(value.to_string());
            }
            "api.token" => self.api.token = Some(value.to_string()),
            "display.page_size" => {
                let size = value.parse::<usize>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    DeskError::Config(format!(
                        "invalid value '{value}' for display.page_size. Expected a positive number"
                    ))
                })?;
                self.display.page_size = size;
            }
            "display.timezone" => {
                TimeZone::get(value).map_err(|e| {
                    DeskError::Config(format!("unknown timezone '{value}': {e}"))
                })?;
                self.display.timezone = value.to_string();
            }
            "display.currency_symbol" => self.display.currency_symbol = value.to_string(),
            _ => {}
        }
        Ok(())
    }

    /// Every key with its displayable value
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        CONFIG_KEYS
            .iter()
            .map(|key| (*key, self.get(key).ok().flatten()))
            .collect()
    }
}

fn validate_key(key: &str) -> Result<&'static str> {
    CONFIG_KEYS
        .iter()
        .copied()
        .find(|k| *k == key)
        .ok_or_else(|| {
            DeskError::Config(format!(
                "unknown config key '{key}'. Valid keys: {}",
                CONFIG_KEYS.join(", ")
            ))
        })
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
pub fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.display.timezone, "UTC");
        assert_eq!(config.display.currency_symbol, "Rp");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("api:\n  base_url: https://erp.example.com/api\n").unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://erp.example.com/api"));
        assert_eq!(config.display, DisplayConfig::default());

        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_yaml_validation() {
        assert!(Config::from_yaml("display:\n  page_size: 0\n").is_err());
        assert!(Config::from_yaml("display:\n  timezone: Mars/Olympus\n").is_err());
        assert!(Config::from_yaml("api: [1, 2]\n").is_err());
    }

    #[test]
    fn test_serialization_skips_unset_api_fields() {
        let yaml = serde_yaml_ng::to_string(&Config::default()).unwrap();
        assert!(!yaml.contains("base_url"));
        assert!(!yaml.contains("token"));
        assert!(yaml.contains("page_size: 10"));
    }

    #[test]
    fn test_set_and_get_keys() {
        let mut config = Config::default();
        config.set("display.page_size", "25").unwrap();
        config.set("display.timezone", "Asia/Jakarta").unwrap();
        config.set("api.token", "tok_123456").unwrap();

        assert_eq!(config.get("display.page_size").unwrap().as_deref(), Some("25"));
        assert_eq!(config.get("api.token").unwrap().as_deref(), Some("to...56"));
        assert_eq!(config.get("api.base_url").unwrap(), None);

        assert!(config.set("display.page_size", "0").is_err());
        assert!(config.set("display.page_size", "ten").is_err());
        assert!(config.set("display.timezone", "Nowhere/City").is_err());
        assert!(config.set("api.base_url", "not a url").is_err());
        assert!(matches!(config.set("api_token", "x"), Err(DeskError::Config(_))));
    }

    #[test]
    fn test_render_options_follow_display_settings() {
        let mut config = Config::default();
        config.display.currency_symbol = "IDR".to_string();
        config.display.timezone = "Asia/Jakarta".to_string();
        let options = config.render_options();
        assert_eq!(options.currency.symbol, "IDR");
        assert_eq!(options.timezone.iana_name(), Some("Asia/Jakarta"));
    }

    #[test]
    fn test_mask_sensitive_value() {
        assert_eq!(mask_sensitive_value("abcdef"), "ab...ef");
        assert_eq!(mask_sensitive_value("abcd"), "****");
        assert_eq!(mask_sensitive_value("日本語中文"), "日本...中文");
    }
}
