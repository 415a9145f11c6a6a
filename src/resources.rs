//! Catalog of backend resources and how each one is listed.

use crate::columns::{ColumnDef, RowAction};
use crate::error::{DeskError, Result};
use crate::record::IdentityKey;
use crate::render::ValueKind;

/// Everything a list view needs to know about one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Catalog name (`projects`, `man-power`, ...)
    pub name: String,
    /// Human-readable name used in messages
    pub title: String,
    /// Collection path on the backend, e.g. `/finance/invoices`
    pub path: String,
    pub identity: IdentityKey,
    pub columns: Vec<ColumnDef>,
    pub actions: Vec<RowAction>,
}

impl ResourceSpec {
    pub fn new(name: &str, title: &str, path: &str, identity: IdentityKey) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            path: path.to_string(),
            identity,
            columns: Vec::new(),
            actions: vec![RowAction::View, RowAction::Edit, RowAction::Delete],
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn actions(mut self, actions: &[RowAction]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    pub fn find_column(&self, key: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Header text for a field, falling back to the raw key
    pub fn column_title<'a>(&'a self, key: &'a str) -> &'a str {
        self.find_column(key).map(|c| c.title.as_str()).unwrap_or(key)
    }

    /// Value kind for a field, text when the field has no column
    pub fn kind_of(&self, key: &str) -> ValueKind {
        self.find_column(key).map(|c| c.kind).unwrap_or_default()
    }

    /// Path segments of the collection, without empty parts
    pub fn path_segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

fn projects() -> ResourceSpec {
    ResourceSpec::new("projects", "Project", "/projects", IdentityKey::field("id"))
        .column(ColumnDef::text("id", "ID"))
        .column(ColumnDef::text("project_code", "Code"))
        .column(ColumnDef::text("name", "Name").editable())
        .column(ColumnDef::text("client", "Client"))
        .column(ColumnDef::new("start_date", "Start", ValueKind::Date).editable())
        .column(ColumnDef::new("end_date", "End", ValueKind::Date).editable())
        .column(ColumnDef::new("contract_value", "Contract Value", ValueKind::Currency).editable())
        .column(ColumnDef::new("progress", "Progress", ValueKind::Percentage).editable())
        .column(ColumnDef::new("status", "Status", ValueKind::Status).editable())
}

fn quotations() -> ResourceSpec {
    ResourceSpec::new("quotations", "Quotation", "/quotations", IdentityKey::field("id"))
        .column(ColumnDef::text("id", "ID"))
        .column(ColumnDef::text("quotation_no", "Quotation No"))
        .column(ColumnDef::text("client", "Client"))
        .column(ColumnDef::new("quotation_date", "Date", ValueKind::Date))
        .column(ColumnDef::new("amount", "Amount", ValueKind::Currency).editable())
        .column(ColumnDef::new("approved", "Approved", ValueKind::Boolean).editable())
        .column(ColumnDef::new("status", "Status", ValueKind::Status).editable())
}

fn invoices() -> ResourceSpec {
    ResourceSpec::new("invoices", "Invoice", "/finance/invoices", IdentityKey::field("id"))
        .column(ColumnDef::text("id", "ID"))
        .column(ColumnDef::text("invoice_no", "Invoice No"))
        .column(ColumnDef::text("project", "Project"))
        .column(ColumnDef::new("issue_date", "Issued", ValueKind::Date))
        .column(ColumnDef::new("due_date", "Due", ValueKind::Date).editable())
        .column(ColumnDef::new("amount", "Amount", ValueKind::Currency).editable())
        .column(ColumnDef::new("paid", "Paid", ValueKind::Boolean).editable())
        .column(ColumnDef::new("status", "Status", ValueKind::Status).editable())
}

fn material_requests() -> ResourceSpec {
    ResourceSpec::new(
        "material-requests",
        "Material request",
        "/material-requests",
        IdentityKey::field("id"),
    )
    .column(ColumnDef::text("id", "ID"))
    .column(ColumnDef::text("request_no", "Request No"))
    .column(ColumnDef::text("project", "Project"))
    .column(ColumnDef::text("item", "Item").editable())
    .column(ColumnDef::text("quantity", "Qty").editable())
    .column(ColumnDef::new("requested_at", "Requested", ValueKind::Date))
    .column(ColumnDef::new("estimated_cost", "Est. Cost", ValueKind::Currency).editable())
    .column(ColumnDef::new("approved", "Approved", ValueKind::Boolean).editable())
}

fn man_power() -> ResourceSpec {
    ResourceSpec::new(
        "man-power",
        "Man-power allocation",
        "/man-power",
        IdentityKey::composite(["project_id", "user_id"]),
    )
    .column(ColumnDef::text("project_id", "Project"))
    .column(ColumnDef::text("user_id", "User"))
    .column(ColumnDef::text("user_name", "Name"))
    .column(ColumnDef::text("role", "Role").editable())
    .column(ColumnDef::new("allocation", "Allocation", ValueKind::Percentage).editable())
    .column(ColumnDef::new("start_date", "Start", ValueKind::Date).editable())
    .column(ColumnDef::new("end_date", "End", ValueKind::Date).editable())
    .actions(&[RowAction::Edit, RowAction::Delete])
}

fn work_orders() -> ResourceSpec {
    ResourceSpec::new("work-orders", "Work order", "/work-orders", IdentityKey::field("id"))
        .column(ColumnDef::text("id", "ID"))
        .column(ColumnDef::text("wo_number", "WO No"))
        .column(ColumnDef::text("project", "Project"))
        .column(ColumnDef::text("description", "Description").editable())
        .column(ColumnDef::new("due_date", "Due", ValueKind::Date).editable())
        .column(ColumnDef::new("progress", "Progress", ValueKind::Percentage).editable())
        .column(ColumnDef::new("status", "Status", ValueKind::Status).editable())
}

fn users() -> ResourceSpec {
    ResourceSpec::new("users", "User", "/users", IdentityKey::field("id"))
        .column(ColumnDef::text("id", "ID"))
        .column(ColumnDef::text("name", "Name").editable())
        .column(ColumnDef::text("email", "Email").editable())
        .column(ColumnDef::text("role", "Role").editable())
        .column(ColumnDef::new("active", "Active", ValueKind::Boolean).editable())
}

/// Every resource the desk knows about
pub fn catalog() -> Vec<ResourceSpec> {
    vec![
        projects(),
        quotations(),
        invoices(),
        material_requests(),
        man_power(),
        work_orders(),
        users(),
    ]
}

/// Look up a resource by name; singular forms and underscores are accepted
pub fn find(name: &str) -> Result<ResourceSpec> {
    let wanted = name.trim().to_lowercase().replace('_', "-");
    catalog()
        .into_iter()
        .find(|spec| {
            spec.name == wanted
                || spec.name.strip_suffix('s') == Some(wanted.as_str())
                || spec.name.replace('-', "") == wanted
        })
        .ok_or_else(|| DeskError::UnknownResource(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<_> = catalog().into_iter().map(|s| s.name).collect();
        let len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), len);
    }

    #[test]
    fn test_every_identity_field_has_a_column() {
        for spec in catalog() {
            for field in spec.identity.fields() {
                assert!(
                    spec.find_column(field).is_some(),
                    "{} is missing a column for identity field {field}",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_find_accepts_aliases() {
        assert_eq!(find("projects").unwrap().name, "projects");
        assert_eq!(find("Project").unwrap().name, "projects");
        assert_eq!(find("work_orders").unwrap().name, "work-orders");
        assert_eq!(find("manpower").unwrap().name, "man-power");
        assert_eq!(find("invoice").unwrap().path, "/finance/invoices");
        assert!(matches!(find("payroll"), Err(DeskError::UnknownResource(_))));
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(find("invoices").unwrap().path_segments(), vec!["finance", "invoices"]);
    }

    #[test]
    fn test_column_lookup_helpers() {
        let spec = find("projects").unwrap();
        assert_eq!(spec.column_title("contract_value"), "Contract Value");
        assert_eq!(spec.column_title("unknown"), "unknown");
        assert_eq!(spec.kind_of("progress"), ValueKind::Percentage);
        assert_eq!(spec.kind_of("unknown"), ValueKind::Text);
    }
}
