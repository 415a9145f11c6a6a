//! Pure cell formatters.
//!
//! Every function here is total: any JSON value, including `null`, malformed
//! dates and non-numeric strings, produces a displayable [`Rendered`].

use std::collections::BTreeMap;

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde_json::Value;

use super::{Rendered, Tone};

/// Placeholder shown for missing or unusable values
pub const PLACEHOLDER: &str = "-";

/// Currency display settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub group_separator: char,
}

impl Default for CurrencyFormat {
    /// Indonesian Rupiah, as rendered by the id-ID locale
    fn default() -> Self {
        Self {
            symbol: "Rp".to_string(),
            group_separator: '.',
        }
    }
}

/// Label and tone for one status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabel {
    pub label: String,
    pub tone: Tone,
}

/// Mapping from status code to label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    entries: BTreeMap<String, StatusLabel>,
}

impl StatusTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, code: &str, label: &str, tone: Tone) -> Self {
        self.insert(code, label, tone);
        self
    }

    pub fn insert(&mut self, code: &str, label: &str, tone: Tone) {
        self.entries.insert(
            code.to_string(),
            StatusLabel {
                label: label.to_string(),
                tone,
            },
        );
    }

    /// Exact lookup first, then case-insensitive
    pub fn lookup(&self, code: &str) -> Option<&StatusLabel> {
        self.entries.get(code).or_else(|| {
            self.entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code))
                .map(|(_, label)| label)
        })
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::empty()
            .with("A", "Completed", Tone::Success)
            .with("D", "Draft", Tone::Muted)
            .with("E", "Expired", Tone::Warning)
            .with("F", "Failed", Tone::Danger)
            .with("O", "On Progress", Tone::Info)
    }
}

/// JavaScript-style falsiness, used to decide when a date is absent
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Read a value as a finite number, accepting numeric strings
pub fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Interpret a value as a calendar date in the given display time zone.
///
/// Accepts RFC 3339 timestamps (converted into `tz`), civil date-times,
/// plain dates and epoch milliseconds. Returns `None` for anything else.
pub fn parse_date(value: &Value, tz: &TimeZone) -> Option<Date> {
    if is_falsy(value) {
        return None;
    }
    match value {
        Value::String(s) => parse_date_str(s.trim(), tz),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            let ts = Timestamp::from_millisecond(millis).ok()?;
            Some(ts.to_zoned(tz.clone()).date())
        }
        _ => None,
    }
}

fn parse_date_str(s: &str, tz: &TimeZone) -> Option<Date> {
    if let Ok(ts) = s.parse::<Timestamp>() {
        return Some(ts.to_zoned(tz.clone()).date());
    }
    if let Ok(dt) = s.parse::<DateTime>() {
        return Some(dt.date());
    }
    s.parse::<Date>().ok()
}

/// `DD-MM-YYYY`, or `-` when the value is absent or not a date
pub fn format_date(value: &Value, tz: &TimeZone) -> Rendered {
    match parse_date(value, tz) {
        Some(date) => Rendered::plain(date.strftime("%d-%m-%Y").to_string()),
        None => Rendered::muted(PLACEHOLDER),
    }
}

/// Whole-unit currency with grouped thousands, e.g. `Rp 1.500.000`
pub fn format_currency(value: &Value, currency: &CurrencyFormat) -> Rendered {
    let Some(amount) = numeric(value) else {
        return Rendered::muted(PLACEHOLDER);
    };

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits, currency.group_separator);
    let sign = if rounded < 0.0 { "-" } else { "" };

    Rendered::plain(format!("{sign}{} {grouped}", currency.symbol))
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// `<value>%`, with absent values shown as `0%`
pub fn format_percentage(value: &Value) -> Rendered {
    let text = match value {
        Value::Null => "0".to_string(),
        Value::String(s) if s.trim().is_empty() => "0".to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    Rendered::plain(format!("{text}%"))
}

/// Integers without a fractional part, everything else in shortest form
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Status code lookup; unknown codes fall back to the raw value
pub fn format_status(value: &Value, statuses: &StatusTable) -> Rendered {
    let code = match value {
        Value::Null => return Rendered::muted(PLACEHOLDER),
        Value::String(s) if s.trim().is_empty() => return Rendered::muted(PLACEHOLDER),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return format_text(other),
    };

    match statuses.lookup(&code) {
        Some(status) => Rendered::new(status.label.clone(), status.tone),
        None => Rendered::plain(code),
    }
}

/// `Yes` for 1 / true / "1", `No` for everything else
pub fn format_boolean(value: &Value) -> Rendered {
    let truthy = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s.trim() == "1",
        _ => false,
    };
    if truthy {
        Rendered::new("Yes", Tone::Success)
    } else {
        Rendered::muted("No")
    }
}

/// Free text: strings verbatim, other JSON compact
pub fn format_text(value: &Value) -> Rendered {
    match value {
        Value::Null => Rendered::muted(PLACEHOLDER),
        Value::String(s) if s.is_empty() => Rendered::muted(PLACEHOLDER),
        Value::String(s) => Rendered::plain(s.clone()),
        Value::Number(n) => Rendered::plain(n.to_string()),
        Value::Bool(b) => Rendered::plain(b.to_string()),
        other => Rendered::plain(serde_json::to_string(other).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> TimeZone {
        TimeZone::UTC
    }

    #[test]
    fn test_format_date_iso_timestamp() {
        assert_eq!(
            format_date(&json!("2024-03-05T00:00:00Z"), &utc()).text,
            "05-03-2024"
        );
    }

    #[test]
    fn test_format_date_plain_and_civil() {
        assert_eq!(format_date(&json!("2024-12-31"), &utc()).text, "31-12-2024");
        assert_eq!(
            format_date(&json!("2024-01-09T17:45:00"), &utc()).text,
            "09-01-2024"
        );
    }

    #[test]
    fn test_format_date_converts_into_display_zone() {
        let jakarta = TimeZone::fixed(jiff::tz::offset(7));
        assert_eq!(
            format_date(&json!("2024-03-04T20:00:00Z"), &jakarta).text,
            "05-03-2024"
        );
    }

    #[test]
    fn test_format_date_epoch_millis() {
        assert_eq!(format_date(&json!(1709596800000i64), &utc()).text, "05-03-2024");
    }

    #[test]
    fn test_format_date_fallbacks() {
        for value in [
            Value::Null,
            json!(""),
            json!(0),
            json!(false),
            json!("not a date"),
            json!("2024-13-45"),
            json!([1, 2]),
            json!({"y": 2024}),
        ] {
            let rendered = format_date(&value, &utc());
            assert_eq!(rendered.text, "-", "value {value} should render as '-'");
            assert_eq!(rendered.tone, Tone::Muted);
        }
    }

    #[test]
    fn test_format_currency_rupiah() {
        let idr = CurrencyFormat::default();
        assert_eq!(format_currency(&json!(1500000), &idr).text, "Rp 1.500.000");
        assert_eq!(format_currency(&json!(0), &idr).text, "Rp 0");
        assert_eq!(format_currency(&json!(999), &idr).text, "Rp 999");
        assert_eq!(format_currency(&json!(1000), &idr).text, "Rp 1.000");
        assert_eq!(format_currency(&json!(1234567.5), &idr).text, "Rp 1.234.568");
        assert_eq!(format_currency(&json!("250000"), &idr).text, "Rp 250.000");
        assert_eq!(format_currency(&json!(-45000), &idr).text, "-Rp 45.000");
    }

    #[test]
    fn test_format_currency_fallbacks() {
        let idr = CurrencyFormat::default();
        for value in [Value::Null, json!(""), json!("  "), json!("abc"), json!(true)] {
            let rendered = format_currency(&value, &idr);
            assert_eq!(rendered.text, "-");
            assert_eq!(rendered.tone, Tone::Muted);
        }
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(&json!(45)).text, "45%");
        assert_eq!(format_percentage(&json!(12.5)).text, "12.5%");
        assert_eq!(format_percentage(&json!(100.0)).text, "100%");
        assert_eq!(format_percentage(&json!("80")).text, "80%");
        assert_eq!(format_percentage(&Value::Null).text, "0%");
        assert_eq!(format_percentage(&json!("")).text, "0%");
    }

    #[test]
    fn test_format_status_known_and_unknown() {
        let table = StatusTable::default();
        let completed = format_status(&json!("A"), &table);
        assert!(completed.text.contains("Completed"));
        assert_eq!(completed.tone, Tone::Success);

        assert_eq!(format_status(&json!("o"), &table).text, "On Progress");
        assert_eq!(format_status(&json!("Z"), &table).text, "Z");
        assert_eq!(format_status(&json!(7), &table).text, "7");
        assert_eq!(format_status(&Value::Null, &table).text, "-");
        assert_eq!(format_status(&json!(""), &table).text, "-");
    }

    #[test]
    fn test_format_boolean() {
        assert_eq!(format_boolean(&json!(1)).text, "Yes");
        assert_eq!(format_boolean(&json!(1)).tone, Tone::Success);
        assert_eq!(format_boolean(&json!(true)).text, "Yes");
        assert_eq!(format_boolean(&json!("1")).text, "Yes");
        assert_eq!(format_boolean(&json!(0)).text, "No");
        assert_eq!(format_boolean(&Value::Null).text, "No");
        assert_eq!(format_boolean(&json!(2)).text, "No");
        assert_eq!(format_boolean(&json!("yes")).text, "No");
    }

    #[test]
    fn test_format_text() {
        assert_eq!(format_text(&json!("Tower A")).text, "Tower A");
        assert_eq!(format_text(&json!(12)).text, "12");
        assert_eq!(format_text(&Value::Null).text, "-");
        assert_eq!(format_text(&json!({"a": 1})).text, r#"{"a":1}"#);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1", '.'), "1");
        assert_eq!(group_thousands("123", '.'), "123");
        assert_eq!(group_thousands("1234", '.'), "1.234");
        assert_eq!(group_thousands("123456789", ','), "123,456,789");
    }
}
