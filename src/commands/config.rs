//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::{Config, mask_sensitive_value};
use crate::error::{DeskError, Result};

/// Show current configuration, with the token masked
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;

    let mut json_output = serde_json::Map::new();
    let mut text_output = format!("{}\n\n", "Configuration:".cyan().bold());

    for (key, value) in config.entries() {
        json_output.insert(key.to_string(), json!(value));
        let shown = match value {
            Some(v) => v,
            None => "not configured".dimmed().to_string(),
        };
        text_output.push_str(&format!("  {}: {shown}\n", key.cyan()));
    }

    let effective_url = config.base_url();
    let token_configured = config.api_token().is_some();
    json_output.insert("effective_base_url".to_string(), json!(effective_url));
    json_output.insert("token_configured".to_string(), json!(token_configured));
    json_output.insert(
        "config_file".to_string(),
        json!(Config::config_path().to_string_lossy()),
    );

    if effective_url != config.api.base_url {
        text_output.push_str(&format!(
            "\n  {}: {}\n",
            "effective api.base_url".cyan(),
            effective_url.as_deref().unwrap_or("-")
        ));
    }
    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(serde_json::Value::Object(json_output))
        .with_text(text_output)
        .print(json)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let value = config
        .get(key)?
        .ok_or_else(|| DeskError::Config(format!("{key} not set")))?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
        "masked": key == "api.token",
    }))
    .with_text(value)
    .print(json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json: bool) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let shown = if key == "api.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {shown}", key.cyan()))
    .print(json)
}
