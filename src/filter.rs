//! Search, field filters and pagination for list views.

use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde_json::Value;

use crate::error::{DeskError, Result};
use crate::record::Record;
use crate::render::formatters::parse_date;

/// Page size used when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// True if `query` is empty or a case-insensitive substring of any
/// stringifiable value in the record (nested arrays and objects included).
pub fn matches_query(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.fields().values().any(|v| value_contains(v, &needle))
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Number(n) => n.to_string().contains(needle),
        Value::Bool(b) => b.to_string().contains(needle),
        Value::Array(items) => items.iter().any(|v| value_contains(v, needle)),
        Value::Object(fields) => fields.values().any(|v| value_contains(v, needle)),
    }
}

/// Loose equality: a number equals a string holding the same number, so
/// `"5"` equals `5` the way a form select would treat it. Two strings only
/// match on identical text (`"0812"` is not `"812"`).
pub fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => s
            .trim()
            .parse::<f64>()
            .is_ok_and(|parsed| Some(parsed) == n.as_f64()),
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            b.to_string() == *s
        }
        _ => false,
    }
}

/// A field-level condition layered on top of the free-text search
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Field equals a value (status, client, ...)
    Equals { field: String, value: Value },
    /// Field equals any of the values
    OneOf { field: String, values: Vec<Value> },
    /// Field is a date within `[from, to]`; open ends are unbounded
    DateRange {
        field: String,
        from: Option<Date>,
        to: Option<Date>,
    },
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        FieldFilter::Equals {
            field: field.into(),
            value,
        }
    }

    pub fn date_range(field: impl Into<String>, from: Option<Date>, to: Option<Date>) -> Self {
        FieldFilter::DateRange {
            field: field.into(),
            from,
            to,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldFilter::Equals { field, .. }
            | FieldFilter::OneOf { field, .. }
            | FieldFilter::DateRange { field, .. } => field,
        }
    }

    /// Parse `field=value` into an equality filter
    pub fn parse(input: &str) -> Result<Self> {
        let (field, value) = input.split_once('=').ok_or_else(|| {
            DeskError::InvalidFilter(format!("'{input}' is not of the form field=value"))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(DeskError::InvalidFilter(format!("'{input}' has no field name")));
        }
        Ok(FieldFilter::equals(field, crate::record::parse_cli_value(value)))
    }

    /// Dates are interpreted in `tz`; records whose date cannot be parsed
    /// never fall within a range.
    pub fn matches(&self, record: &Record, tz: &TimeZone) -> bool {
        match self {
            FieldFilter::Equals { field, value } => loosely_equal(record.value(field), value),
            FieldFilter::OneOf { field, values } => {
                let actual = record.value(field);
                values.iter().any(|v| loosely_equal(actual, v))
            }
            FieldFilter::DateRange { field, from, to } => {
                let Some(date) = parse_date(record.value(field), tz) else {
                    return false;
                };
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }
        }
    }
}

/// Search, field filters and page position of one list view
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    query: String,
    field_filters: Vec<FieldFilter>,
    page: usize,
    page_size: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            field_filters: Vec::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Result<Self> {
        let mut state = Self::default();
        state.set_page_size(page_size)?;
        Ok(state)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn field_filters(&self) -> &[FieldFilter] {
        &self.field_filters
    }

    /// Changing the query always returns to the first page
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 0;
    }

    /// No clamping: a page past the end shows as empty
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(DeskError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    /// Add a field filter, replacing any existing filter on the same field
    pub fn set_field_filter(&mut self, filter: FieldFilter) {
        self.field_filters.retain(|f| f.field() != filter.field());
        self.field_filters.push(filter);
        self.page = 0;
    }

    pub fn clear_field_filter(&mut self, field: &str) {
        self.field_filters.retain(|f| f.field() != field);
        self.page = 0;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.field_filters.clear();
        self.page = 0;
    }

    /// Free-text search AND every field filter
    pub fn matches(&self, record: &Record, tz: &TimeZone) -> bool {
        matches_query(record, &self.query)
            && self.field_filters.iter().all(|f| f.matches(record, tz))
    }

    /// Records passing the filter, in original order
    pub fn apply<'a>(&self, records: &'a [Record], tz: &TimeZone) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r, tz)).collect()
    }
}

/// Slice out one page; pages past the end are empty
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `len` items
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}
