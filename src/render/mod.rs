//! Renderer registry.
//!
//! Maps a semantic value kind (date, currency, status code, ...) to a pure
//! formatter producing a declarative [`Rendered`] descriptor. Descriptors
//! carry text and a tone; turning a tone into colour is left to the output
//! layer (`display`), so formatters stay free of presentation concerns.

pub mod formatters;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DeskError, Result};

pub use formatters::{CurrencyFormat, PLACEHOLDER, StatusLabel, StatusTable};

/// Visual emphasis of a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Plain,
    Muted,
    Success,
    Info,
    Warning,
    Danger,
}

/// Display form of one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub text: String,
    pub tone: Tone,
}

impl Rendered {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Plain)
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Muted)
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Semantic kind of a column's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Date,
    Currency,
    Percentage,
    Status,
    Boolean,
    #[default]
    Text,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Date,
        ValueKind::Currency,
        ValueKind::Percentage,
        ValueKind::Status,
        ValueKind::Boolean,
        ValueKind::Text,
    ];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Date => "date",
            ValueKind::Currency => "currency",
            ValueKind::Percentage => "percentage",
            ValueKind::Status => "status",
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ValueKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeskError::Other(format!("unknown value kind '{s}'")))
    }
}

/// Settings shared by the default formatters
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub timezone: TimeZone,
    pub currency: CurrencyFormat,
    pub statuses: StatusTable,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timezone: TimeZone::UTC,
            currency: CurrencyFormat::default(),
            statuses: StatusTable::default(),
        }
    }
}

/// A pure formatter for one value kind
pub type Formatter = Arc<dyn Fn(&Value) -> Rendered + Send + Sync>;

/// Kind → formatter mapping, shared by every list view
#[derive(Clone)]
pub struct RendererRegistry {
    formatters: HashMap<ValueKind, Formatter>,
    timezone: TimeZone,
}

impl RendererRegistry {
    pub fn new(options: RenderOptions) -> Self {
        let RenderOptions {
            timezone,
            currency,
            statuses,
        } = options;

        let mut table: HashMap<ValueKind, Formatter> = HashMap::new();
        let tz = timezone.clone();
        table.insert(
            ValueKind::Date,
            Arc::new(move |v: &Value| formatters::format_date(v, &tz)),
        );
        table.insert(
            ValueKind::Currency,
            Arc::new(move |v: &Value| formatters::format_currency(v, &currency)),
        );
        table.insert(ValueKind::Percentage, Arc::new(formatters::format_percentage));
        table.insert(
            ValueKind::Status,
            Arc::new(move |v: &Value| formatters::format_status(v, &statuses)),
        );
        table.insert(ValueKind::Boolean, Arc::new(formatters::format_boolean));
        table.insert(ValueKind::Text, Arc::new(formatters::format_text));

        Self {
            formatters: table,
            timezone,
        }
    }

    /// Replace the formatter for a kind
    pub fn register<F>(&mut self, kind: ValueKind, formatter: F)
    where
        F: Fn(&Value) -> Rendered + Send + Sync + 'static,
    {
        self.formatters.insert(kind, Arc::new(formatter));
    }

    pub fn render(&self, kind: ValueKind, value: &Value) -> Rendered {
        match self.formatters.get(&kind) {
            Some(formatter) => formatter(value),
            None => formatters::format_text(value),
        }
    }

    /// Time zone dates are displayed (and range-filtered) in
    pub fn timezone(&self) -> &TimeZone {
        &self.timezone
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self.formatters.keys().map(ToString::to_string).collect();
        kinds.sort();
        f.debug_struct("RendererRegistry")
            .field("kinds", &kinds)
            .field("timezone", &self.timezone)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_dispatches_by_kind() {
        let registry = RendererRegistry::default();
        assert_eq!(
            registry.render(ValueKind::Currency, &json!(1500000)).text,
            "Rp 1.500.000"
        );
        assert_eq!(
            registry.render(ValueKind::Date, &json!("2024-03-05T00:00:00Z")).text,
            "05-03-2024"
        );
        assert_eq!(registry.render(ValueKind::Boolean, &json!(1)).text, "Yes");
        assert_eq!(registry.render(ValueKind::Percentage, &Value::Null).text, "0%");
    }

    #[test]
    fn test_every_kind_is_total() {
        let registry = RendererRegistry::default();
        let inputs = [
            Value::Null,
            json!(""),
            json!("garbage"),
            json!(f64::MAX),
            json!(-1),
            json!(true),
            json!([null]),
            json!({"nested": {"x": null}}),
        ];
        for kind in ValueKind::ALL {
            for input in &inputs {
                let rendered = registry.render(kind, input);
                assert!(!rendered.text.is_empty(), "{kind} produced empty text for {input}");
            }
        }
    }

    #[test]
    fn test_register_overrides_formatter() {
        let mut registry = RendererRegistry::default();
        registry.register(ValueKind::Boolean, |v| {
            Rendered::plain(if v.as_bool() == Some(true) { "Y" } else { "N" })
        });
        assert_eq!(registry.render(ValueKind::Boolean, &json!(true)).text, "Y");
        assert_eq!(registry.render(ValueKind::Boolean, &json!(1)).text, "N");
    }

    #[test]
    fn test_custom_options() {
        let registry = RendererRegistry::new(RenderOptions {
            currency: CurrencyFormat {
                symbol: "$".to_string(),
                group_separator: ',',
            },
            statuses: StatusTable::empty().with("P", "Pending", Tone::Warning),
            ..RenderOptions::default()
        });
        assert_eq!(registry.render(ValueKind::Currency, &json!(12345)).text, "$ 12,345");
        assert_eq!(registry.render(ValueKind::Status, &json!("P")).text, "Pending");
        assert_eq!(registry.render(ValueKind::Status, &json!("A")).text, "A");
    }

    #[test]
    fn test_value_kind_from_str() {
        assert_eq!("Currency".parse::<ValueKind>().unwrap(), ValueKind::Currency);
        assert_eq!("date".parse::<ValueKind>().unwrap(), ValueKind::Date);
        assert!("money".parse::<ValueKind>().is_err());
    }
}
