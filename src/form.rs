//! Create/edit form for a single record.
//!
//! The form holds a draft and sends it as-is: no client-side validation.
//! In edit mode only the fields that differ from the loaded record are
//! sent. A failed submit leaves the form open with the draft intact.

use serde_json::Value;

use crate::error::Result;
use crate::gateway::ResourceGateway;
use crate::record::{Record, RecordId};

/// Whether the form creates a record or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone)]
pub struct FormModal {
    mode: FormMode,
    original: Record,
    draft: Record,
    open: bool,
}

impl FormModal {
    pub fn create() -> Self {
        Self::create_with(Record::new())
    }

    /// Create mode with prefilled fields
    pub fn create_with(draft: Record) -> Self {
        Self {
            mode: FormMode::Create,
            original: Record::new(),
            draft,
            open: true,
        }
    }

    /// Edit mode over an existing record
    pub fn edit(id: RecordId, record: Record) -> Self {
        Self {
            mode: FormMode::Edit(id),
            draft: record.clone(),
            original: record,
            open: true,
        }
    }

    /// Whether this form creates or edits a record
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Current field values, including unsaved changes
    pub fn draft(&self) -> &Record {
        &self.draft
    }

    /// Change one field of the draft
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.draft.set(field, value);
    }

    /// Overlay several fields onto the draft
    pub fn apply(&mut self, fields: &Record) {
        self.draft.merge(fields);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Payload for the next submit
    pub fn changes(&self) -> Record {
        match self.mode {
            FormMode::Create => self.draft.clone(),
            FormMode::Edit(_) => self
                .draft
                .fields()
                .iter()
                .filter(|(key, value)| self.original.get(key) != Some(*value))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<serde_json::Map<_, _>>()
                .into(),
        }
    }

    /// Send the draft; the form closes on success.
    ///
    /// An edit with nothing changed closes without calling the backend.
    pub async fn submit<G: ResourceGateway>(&mut self, gateway: &G) -> Result<Record> {
        let saved = match &self.mode {
            FormMode::Create => gateway.create(&self.draft).await?,
            FormMode::Edit(id) => {
                let changes = self.changes();
                if changes.is_empty() {
                    tracing::debug!(%id, "form submitted without changes");
                    self.draft.clone()
                } else {
                    gateway.update(id, &changes).await?
                }
            }
        };
        self.close();
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryGateway, Operation};
    use crate::resources;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn users() -> MemoryGateway {
        MemoryGateway::new(
            resources::find("users").unwrap(),
            vec![record(json!({"id": 1, "name": "Sari", "role": "admin"}))],
        )
    }

    #[tokio::test]
    async fn test_create_submits_whole_draft() {
        let gateway = users();
        let mut form = FormModal::create();
        form.set("name", json!("Budi"));
        form.set("role", json!("finance"));

        let saved = form.submit(&gateway).await.unwrap();
        assert_eq!(saved.value("id"), &json!(2));
        assert!(!form.is_open());
        assert_eq!(gateway.records().len(), 2);
    }

    #[tokio::test]
    async fn test_edit_sends_only_changed_fields() {
        let gateway = users();
        let original = gateway.records()[0].clone();
        let mut form = FormModal::edit(RecordId::new("1"), original);
        form.set("role", json!("viewer"));
        form.set("name", json!("Sari"));

        assert_eq!(form.changes(), record(json!({"role": "viewer"})));
        form.submit(&gateway).await.unwrap();
        assert_eq!(gateway.records()[0].value("role"), &json!("viewer"));
        assert_eq!(gateway.call_count(Operation::Update), 1);
    }

    #[tokio::test]
    async fn test_unchanged_edit_skips_backend() {
        let gateway = users();
        let mut form = FormModal::edit(RecordId::new("1"), gateway.records()[0].clone());
        form.submit(&gateway).await.unwrap();
        assert!(!form.is_open());
        assert_eq!(gateway.call_count(Operation::Update), 0);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form_open() {
        let gateway = users();
        gateway.fail(Operation::Create);
        let mut form = FormModal::create();
        form.set("name", json!("Budi"));

        assert!(form.submit(&gateway).await.is_err());
        assert!(form.is_open());
        assert_eq!(form.draft().value("name"), &json!("Budi"));
        assert_eq!(gateway.records().len(), 1);
    }
}
