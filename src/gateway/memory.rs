//! In-memory gateway and JSON fixture files.
//!
//! `MemoryGateway` serves one resource collection from memory, with
//! per-operation failure injection for exercising rollback paths. A
//! [`Fixture`] is a JSON file holding collections for several resources
//! (`{ "projects": [...], "users": [...] }`), used for offline work.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{DeskError, Result};
use crate::filter::matches_query;
use crate::record::{IdentityKey, Record, RecordId};
use crate::resources::ResourceSpec;

use super::{ApiError, ListFilters, ListPage, ResourceGateway};

/// Gateway operations, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Record>,
    available_years: Vec<i32>,
    failing: HashSet<Operation>,
    calls: Vec<Operation>,
}

/// Gateway backed by an in-memory collection
pub struct MemoryGateway {
    spec: ResourceSpec,
    state: Mutex<MemoryState>,
}

impl fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryGateway")
            .field("resource", &self.spec.name)
            .field("records", &state.records.len())
            .finish()
    }
}

impl MemoryGateway {
    pub fn new(spec: ResourceSpec, records: Vec<Record>) -> Self {
        Self {
            spec,
            state: Mutex::new(MemoryState {
                records,
                ..Default::default()
            }),
        }
    }

    pub fn with_available_years(self, years: Vec<i32>) -> Self {
        self.state.lock().available_years = years;
        self
    }

    /// Make every call of `operation` fail until [`recover`](Self::recover)
    pub fn fail(&self, operation: Operation) {
        self.state.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.state.lock().failing.remove(&operation);
    }

    /// Current contents of the collection
    pub fn records(&self) -> Vec<Record> {
        self.state.lock().records.clone()
    }

    /// How many times `operation` was attempted, failed calls included
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state.lock().calls.iter().filter(|&&op| op == operation).count()
    }

    fn identity(&self) -> &IdentityKey {
        &self.spec.identity
    }

    /// Record the call and apply any injected failure
    fn begin(&self, state: &mut MemoryState, operation: Operation) -> Result<()> {
        state.calls.push(operation);
        if state.failing.contains(&operation) {
            return Err(ApiError::with_status(
                format!("HTTP 500 simulated {operation} failure"),
                self.spec.title.clone(),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into());
        }
        Ok(())
    }

    fn position(&self, records: &[Record], id: &RecordId) -> Option<usize> {
        records
            .iter()
            .position(|r| self.identity().resolve(r).ok().as_ref() == Some(id))
    }

    fn not_found(&self, id: &RecordId) -> DeskError {
        DeskError::RecordNotFound(format!("{} {}", self.spec.title, id))
    }

    /// Next numeric id for single-field identities
    fn next_id(&self, records: &[Record]) -> Option<u64> {
        let IdentityKey::Field(field) = self.identity() else {
            return None;
        };
        let max = records
            .iter()
            .filter_map(|r| match r.value(field) {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Some(max + 1)
    }

    fn list_sync(&self, filters: &ListFilters) -> Result<ListPage> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::List)?;

        let search = filters.search.as_deref().unwrap_or("");
        let records = state
            .records
            .iter()
            .filter(|r| matches_query(r, search))
            .filter(|r| {
                filters.extra.iter().all(|(key, expected)| match r.value(key) {
                    Value::String(s) => s == expected,
                    Value::Null => false,
                    other => other.to_string() == *expected,
                })
            })
            .cloned()
            .collect();

        Ok(ListPage {
            records,
            available_years: state.available_years.clone(),
            meta: Map::new(),
        })
    }

    fn get_sync(&self, id: &RecordId) -> Result<Record> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::Get)?;
        let index = self
            .position(&state.records, id)
            .ok_or_else(|| self.not_found(id))?;
        Ok(state.records[index].clone())
    }

    fn create_sync(&self, payload: &Record) -> Result<Record> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::Create)?;

        let mut record = payload.clone();
        if self.identity().resolve(&record).is_err()
            && let (IdentityKey::Field(field), Some(next)) =
                (self.identity(), self.next_id(&state.records))
        {
            record.set(field.clone(), Value::from(next));
        }

        let id = self.identity().resolve(&record)?;
        if self.position(&state.records, &id).is_some() {
            return Err(ApiError::with_status(
                format!("HTTP 409 {} {} already exists", self.spec.title, id),
                self.spec.title.clone(),
                StatusCode::CONFLICT,
            )
            .into());
        }
        state.records.push(record.clone());
        Ok(record)
    }

    fn update_sync(&self, id: &RecordId, changes: &Record) -> Result<Record> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::Update)?;
        let index = self
            .position(&state.records, id)
            .ok_or_else(|| self.not_found(id))?;
        let record = &mut state.records[index];
        record.merge(changes);
        Ok(record.clone())
    }

    fn delete_sync(&self, id: &RecordId) -> Result<()> {
        let mut state = self.state.lock();
        self.begin(&mut state, Operation::Delete)?;
        let index = self
            .position(&state.records, id)
            .ok_or_else(|| self.not_found(id))?;
        state.records.remove(index);
        Ok(())
    }
}

impl ResourceGateway for MemoryGateway {
    fn resource(&self) -> &ResourceSpec {
        &self.spec
    }

    async fn list(&self, filters: &ListFilters) -> Result<ListPage> {
        self.list_sync(filters)
    }

    async fn get(&self, id: &RecordId) -> Result<Record> {
        self.get_sync(id)
    }

    async fn create(&self, payload: &Record) -> Result<Record> {
        self.create_sync(payload)
    }

    async fn update(&self, id: &RecordId, changes: &Record) -> Result<Record> {
        self.update_sync(id, changes)
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.delete_sync(id)
    }
}

/// Collections for several resources, stored as one JSON object
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    collections: Map<String, Value>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(collections) => Ok(Self { collections }),
            _ => Err(DeskError::UnexpectedShape(format!(
                "fixture {} must be a JSON object keyed by resource name",
                path.display()
            ))),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.collections)?;
        fs::write(path, content + "\n")?;
        Ok(())
    }

    /// Gateway over the collection for `spec`; a missing collection is empty
    pub fn gateway(&self, spec: ResourceSpec) -> Result<MemoryGateway> {
        let page = match self.collections.get(&spec.name) {
            Some(value) => ListPage::from_value(value.clone())?,
            None => ListPage::default(),
        };
        Ok(MemoryGateway::new(spec, page.records).with_available_years(page.available_years))
    }

    /// Replace the collection for `resource` with the gateway's contents
    pub fn store(&mut self, gateway: &MemoryGateway) {
        let records = gateway
            .records()
            .into_iter()
            .map(|r| Value::Object(r.into_fields()))
            .collect();
        self.collections
            .insert(gateway.resource().name.clone(), Value::Array(records));
    }
}
