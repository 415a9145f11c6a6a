use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::CommandOutput;
use crate::error::Result;
use crate::resources::catalog;

/// A row in the resource catalog table
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Identity")]
    identity: String,
    #[tabled(rename = "Editable")]
    editable: String,
}

/// List the resources the desk can manage
pub fn cmd_resources(json: bool) -> Result<()> {
    let specs = catalog();

    let json_output = json!(
        specs
            .iter()
            .map(|spec| json!({
                "name": spec.name,
                "title": spec.title,
                "path": spec.path,
                "identity": spec.identity.fields(),
                "columns": spec.columns.iter().map(|c| json!({
                    "key": c.key,
                    "title": c.title,
                    "kind": c.kind,
                    "editable": c.editable,
                })).collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>()
    );

    let rows: Vec<ResourceRow> = specs
        .iter()
        .map(|spec| ResourceRow {
            name: spec.name.clone(),
            path: spec.path.clone(),
            identity: spec.identity.fields().join("/"),
            editable: spec
                .columns
                .iter()
                .filter(|c| c.editable)
                .map(|c| c.key.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    CommandOutput::new(json_output)
        .with_text(table.to_string())
        .print(json)
}
