//! Resource records and their identities.
//!
//! A record is an opaque JSON object as returned by the backend. The only
//! structure the client relies on is the identity: either a single field
//! (usually `id`) or a composite of foreign keys when the backend has no
//! surrogate key (man-power allocation rows, for example).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DeskError, Result};

/// Field name to value mapping for one record
pub type Fields = Map<String, Value>;

/// One backend-owned record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value, rejecting anything but an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(DeskError::UnexpectedShape(format!(
                "expected a JSON object for a record, got {}",
                value_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of a field, with missing fields read as `null`
    pub fn value(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&Value::Null)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay every field of `other` onto this record
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in other.fields() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}

/// How a resource identifies its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityKey {
    Field(String),
    Composite(Vec<String>),
}

impl IdentityKey {
    pub fn field(name: impl Into<String>) -> Self {
        IdentityKey::Field(name.into())
    }

    pub fn composite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdentityKey::Composite(names.into_iter().map(Into::into).collect())
    }

    /// Field names making up the identity, in order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            IdentityKey::Field(name) => vec![name.as_str()],
            IdentityKey::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Resolve the identity of a record
    pub fn resolve(&self, record: &Record) -> Result<RecordId> {
        let mut parts = Vec::new();
        for field in self.fields() {
            match record.get(field) {
                None | Some(Value::Null) => {
                    return Err(DeskError::MissingIdentity(field.to_string()));
                }
                Some(Value::String(s)) if s.is_empty() => {
                    return Err(DeskError::MissingIdentity(field.to_string()));
                }
                Some(Value::String(s)) => parts.push(s.clone()),
                Some(other) => parts.push(other.to_string()),
            }
        }
        Ok(RecordId(parts))
    }

    /// Parse a user-supplied id (`12` or `4/7` for composite keys)
    pub fn parse_id(&self, input: &str) -> Result<RecordId> {
        let parts: Vec<String> = input.trim().split('/').map(|p| p.trim().to_string()).collect();
        let expected = self.fields().len();
        if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
            return Err(DeskError::InvalidId(
                input.to_string(),
                format!("expected {}", self.fields().join("/")),
            ));
        }
        Ok(RecordId(parts))
    }
}

/// Resolved identity of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Vec<String>);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(vec![id.into()])
    }

    pub fn composite<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Path segments used when addressing the record on the backend
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Parse a command-line value: valid JSON is taken as JSON, anything else
/// becomes a string
pub fn parse_cli_value(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

/// Parse `field=value` assignments into a record
pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Record> {
    let mut record = Record::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let (field, value) = assignment
            .split_once('=')
            .ok_or_else(|| DeskError::InvalidAssignment(assignment.to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(DeskError::InvalidAssignment(assignment.to_string()));
        }
        record.set(field, parse_cli_value(value));
    }
    Ok(record)
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
