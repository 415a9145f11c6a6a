//! Column definitions, visibility and the rendered row projection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{Record, RecordId};
use crate::render::{Rendered, RendererRegistry, ValueKind};

/// One column of a list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Record field the column reads
    pub key: String,
    /// Header text
    pub title: String,
    pub kind: ValueKind,
    /// Whether inline edits are offered for this column
    pub editable: bool,
}

impl ColumnDef {
    pub fn new(key: &str, title: &str, kind: ValueKind) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            kind,
            editable: false,
        }
    }

    pub fn text(key: &str, title: &str) -> Self {
        Self::new(key, title, ValueKind::Text)
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn render(&self, record: &Record, registry: &RendererRegistry) -> Rendered {
        registry.render(self.kind, record.value(&self.key))
    }
}

/// Per-view column visibility; every column is visible until hidden
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    overrides: BTreeMap<String, bool>,
}

impl ColumnVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.overrides.get(key).copied().unwrap_or(true)
    }

    pub fn set(&mut self, key: &str, visible: bool) {
        self.overrides.insert(key.to_string(), visible);
    }

    pub fn hide(&mut self, key: &str) {
        self.set(key, false);
    }

    pub fn show(&mut self, key: &str) {
        self.set(key, true);
    }

    /// Flip a column and return its new visibility
    pub fn toggle(&mut self, key: &str) -> bool {
        let visible = !self.is_visible(key);
        self.set(key, visible);
        visible
    }

    pub fn reset(&mut self) {
        self.overrides.clear();
    }

    /// Columns currently shown, in definition order
    pub fn visible<'a>(&self, columns: &'a [ColumnDef]) -> Vec<&'a ColumnDef> {
        columns.iter().filter(|c| self.is_visible(&c.key)).collect()
    }
}

/// Declarative per-row action, dispatched through the list controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

/// Display projection of one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRow {
    /// Identity of the source record; `None` if the backend omitted it
    pub id: Option<String>,
    pub cells: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

/// One rendered cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub column: String,
    #[serde(flatten)]
    pub rendered: Rendered,
}

impl VisibleRow {
    pub fn project(
        id: Option<&RecordId>,
        record: &Record,
        columns: &[&ColumnDef],
        registry: &RendererRegistry,
        actions: &[RowAction],
    ) -> Self {
        Self {
            id: id.map(ToString::to_string),
            cells: columns
                .iter()
                .map(|c| Cell {
                    column: c.key.clone(),
                    rendered: c.render(record, registry),
                })
                .collect(),
            actions: actions.to_vec(),
        }
    }

    pub fn cell(&self, column: &str) -> Option<&Rendered> {
        self.cells
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::text("name", "Name"),
            ColumnDef::new("budget", "Budget", ValueKind::Currency),
            ColumnDef::new("status", "Status", ValueKind::Status).editable(),
        ]
    }

    #[test]
    fn test_all_columns_visible_by_default() {
        let visibility = ColumnVisibility::new();
        let cols = columns();
        assert_eq!(visibility.visible(&cols).len(), 3);
    }

    #[test]
    fn test_hide_and_toggle() {
        let mut visibility = ColumnVisibility::new();
        let cols = columns();
        visibility.hide("budget");
        let keys: Vec<_> = visibility.visible(&cols).iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "status"]);

        assert!(visibility.toggle("budget"));
        assert!(!visibility.toggle("name"));
        assert!(!visibility.is_visible("name"));

        visibility.reset();
        assert!(visibility.is_visible("name"));
    }

    #[test]
    fn test_project_renders_visible_columns() {
        let registry = RendererRegistry::default();
        let cols = columns();
        let visible: Vec<&ColumnDef> = cols.iter().collect();
        let record = Record::from_value(json!({
            "id": 3, "name": "Gudang", "budget": 1500000, "status": "A"
        }))
        .unwrap();
        let id = RecordId::new("3");

        let row = VisibleRow::project(Some(&id), &record, &visible, &registry, &[RowAction::Edit]);
        assert_eq!(row.id.as_deref(), Some("3"));
        assert_eq!(row.cell("budget").unwrap().text, "Rp 1.500.000");
        assert_eq!(row.cell("status").unwrap().text, "Completed");
        assert!(row.cell("id").is_none());
        assert_eq!(row.actions, vec![RowAction::Edit]);
    }
}
