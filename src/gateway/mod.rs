//! Remote resource gateway.
//!
//! A gateway translates list/get/create/update/delete calls for one
//! resource collection into backend requests. It owns no view state, does
//! no validation beyond dropping empty query parameters, and makes exactly
//! one attempt per call: any failure is returned to the caller.

pub mod error;
pub mod http;
pub mod memory;

use std::collections::BTreeMap;
use std::future::Future;

use jiff::civil::Date;
use serde_json::Value;

use crate::error::{DeskError, Result};
use crate::record::{Fields, Record, RecordId, value_type_name};
use crate::resources::ResourceSpec;

pub use error::ApiError;
pub use http::HttpGateway;
pub use memory::{Fixture, MemoryGateway, Operation};

/// Optional query parameters for a list call, forwarded verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub year: Option<i32>,
    /// Backend-defined range selector (`monthly`, `yearly`, `custom`, ...)
    pub range_type: Option<String>,
    pub month: Option<u8>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub search: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl ListFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query pairs in a stable order, with empty values omitted
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value
                && !value.trim().is_empty()
            {
                pairs.push((key.to_string(), value));
            }
        };

        push("year", self.year.map(|y| y.to_string()));
        push("rangeType", self.range_type.clone());
        push("month", self.month.map(|m| m.to_string()));
        push("from", self.from.map(|d| d.to_string()));
        push("to", self.to.map(|d| d.to_string()));
        push("search", self.search.clone());
        for (key, value) in &self.extra {
            push(key.as_str(), Some(value.clone()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Result of a list call, normalized from either response shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub records: Vec<Record>,
    /// Years the backend reports data for, when it sends them
    pub available_years: Vec<i32>,
    /// Any other envelope fields, untouched
    pub meta: Fields,
}

impl ListPage {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Accept a bare array or an envelope `{ data: [...], availableYears: [...] }`.
    ///
    /// Array entries that are not objects are skipped with a warning rather
    /// than failing the whole list.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self::from_records(collect_records(items))),
            Value::Object(mut envelope) => {
                let items = match envelope.remove("data") {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) => Vec::new(),
                    Some(other) => {
                        return Err(DeskError::UnexpectedShape(format!(
                            "list envelope 'data' is {}, expected an array",
                            value_type_name(&other)
                        )));
                    }
                    None => {
                        return Err(DeskError::UnexpectedShape(
                            "list response is an object without a 'data' array".to_string(),
                        ));
                    }
                };
                let available_years = envelope
                    .remove("availableYears")
                    .map(parse_years)
                    .unwrap_or_default();
                Ok(Self {
                    records: collect_records(items),
                    available_years,
                    meta: envelope,
                })
            }
            Value::Null => Ok(Self::default()),
            other => Err(DeskError::UnexpectedShape(format!(
                "list response is {}, expected an array or an object",
                value_type_name(&other)
            ))),
        }
    }
}

fn collect_records(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match Record::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping list entry {index}: {e}");
                None
            }
        })
        .collect()
}

fn parse_years(value: Value) -> Vec<i32> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

/// Unwrap a single-record response: a bare object or `{ data: {...} }`
pub fn unwrap_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Object(inner)) => Ok(Record::from_fields(inner)),
            Some(other) => {
                fields.insert("data".to_string(), other);
                Ok(Record::from_fields(fields))
            }
            None => Ok(Record::from_fields(fields)),
        },
        other => Err(DeskError::UnexpectedShape(format!(
            "record response is {}, expected an object",
            value_type_name(&other)
        ))),
    }
}

/// CRUD access to one backend resource collection
pub trait ResourceGateway: Send + Sync {
    /// The resource this gateway serves
    fn resource(&self) -> &ResourceSpec;

    fn list(&self, filters: &ListFilters) -> impl Future<Output = Result<ListPage>> + Send;

    fn get(&self, id: &RecordId) -> impl Future<Output = Result<Record>> + Send;

    fn create(&self, payload: &Record) -> impl Future<Output = Result<Record>> + Send;

    /// Apply a partial update; returns the record as the backend sees it
    fn update(&self, id: &RecordId, changes: &Record)
    -> impl Future<Output = Result<Record>> + Send;

    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<()>> + Send;
}

/// Runtime choice between the HTTP backend and a fixture file
#[derive(Debug)]
pub enum AnyGateway {
    Http(HttpGateway),
    Memory(MemoryGateway),
}

impl ResourceGateway for AnyGateway {
    fn resource(&self) -> &ResourceSpec {
        match self {
            AnyGateway::Http(g) => g.resource(),
            AnyGateway::Memory(g) => g.resource(),
        }
    }

    async fn list(&self, filters: &ListFilters) -> Result<ListPage> {
        match self {
            AnyGateway::Http(g) => g.list(filters).await,
            AnyGateway::Memory(g) => g.list(filters).await,
        }
    }

    async fn get(&self, id: &RecordId) -> Result<Record> {
        match self {
            AnyGateway::Http(g) => g.get(id).await,
            AnyGateway::Memory(g) => g.get(id).await,
        }
    }

    async fn create(&self, payload: &Record) -> Result<Record> {
        match self {
            AnyGateway::Http(g) => g.create(payload).await,
            AnyGateway::Memory(g) => g.create(payload).await,
        }
    }

    async fn update(&self, id: &RecordId, changes: &Record) -> Result<Record> {
        match self {
            AnyGateway::Http(g) => g.update(id, changes).await,
            AnyGateway::Memory(g) => g.update(id, changes).await,
        }
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        match self {
            AnyGateway::Http(g) => g.delete(id).await,
            AnyGateway::Memory(g) => g.delete(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_omit_empty_values() {
        let mut filters = ListFilters::new();
        assert!(filters.is_empty());

        filters.year = Some(2024);
        filters.month = Some(3);
        filters.search = Some("  ".to_string());
        filters.range_type = Some("monthly".to_string());
        filters.from = Some(jiff::civil::date(2024, 3, 1));
        filters.extra.insert("client_id".to_string(), "9".to_string());
        filters.extra.insert("blank".to_string(), String::new());

        assert_eq!(
            filters.query_pairs(),
            vec![
                ("year".to_string(), "2024".to_string()),
                ("rangeType".to_string(), "monthly".to_string()),
                ("month".to_string(), "3".to_string()),
                ("from".to_string(), "2024-03-01".to_string()),
                ("client_id".to_string(), "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_page_from_bare_array() {
        let page = ListPage::from_value(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.available_years.is_empty());
    }

    #[test]
    fn test_list_page_from_envelope() {
        let page = ListPage::from_value(json!({
            "data": [{"id": 1}],
            "availableYears": [2023, "2024", "n/a"],
            "total": 1
        }))
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.available_years, vec![2023, 2024]);
        assert_eq!(page.meta.get("total"), Some(&json!(1)));
    }

    #[test]
    fn test_list_page_skips_non_object_entries() {
        let page = ListPage::from_value(json!([{"id": 1}, 5, null, {"id": 2}])).unwrap();
        assert_eq!(page.records.len(), 2);
    }

    #[test]
    fn test_list_page_rejects_unknown_shapes() {
        assert!(ListPage::from_value(json!({"rows": []})).is_err());
        assert!(ListPage::from_value(json!({"data": {"id": 1}})).is_err());
        assert!(ListPage::from_value(json!("oops")).is_err());
        assert!(ListPage::from_value(json!({"data": null})).unwrap().records.is_empty());
        assert!(ListPage::from_value(Value::Null).unwrap().records.is_empty());
    }

    #[test]
    fn test_unwrap_record_shapes() {
        let bare = unwrap_record(json!({"id": 1, "name": "A"})).unwrap();
        assert_eq!(bare.value("name"), &json!("A"));

        let wrapped = unwrap_record(json!({"data": {"id": 2}, "message": "ok"})).unwrap();
        assert_eq!(wrapped.value("id"), &json!(2));
        assert!(wrapped.get("message").is_none());

        let scalar_data = unwrap_record(json!({"id": 3, "data": "raw"})).unwrap();
        assert_eq!(scalar_data.value("data"), &json!("raw"));

        assert!(unwrap_record(json!([1])).is_err());
    }
}
