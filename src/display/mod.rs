//! Terminal output for list views and records.
//!
//! Cells arrive as [`Rendered`] descriptors; this module turns tones into
//! colours and lays rows out with `tabled`. Colour is opt-in per call so
//! piped output stays plain.

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::columns::{ColumnDef, VisibleRow};
use crate::controller::ListController;
use crate::filter::FilterState;
use crate::gateway::ResourceGateway;
use crate::notify::{Level, Notification};
use crate::record::Record;
use crate::render::{Rendered, RendererRegistry, Tone, ValueKind};
use crate::resources::ResourceSpec;

/// Apply a tone's colour to rendered text
pub fn paint(rendered: &Rendered, colored: bool) -> String {
    if !colored {
        return rendered.text.clone();
    }
    let text = rendered.text.as_str();
    match rendered.tone {
        Tone::Plain => text.to_string(),
        Tone::Muted => text.dimmed().to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Danger => text.red().to_string(),
    }
}

/// Table of rendered rows under the given column headers
pub fn rows_table(columns: &[&ColumnDef], rows: &[VisibleRow], colored: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.title.clone()));
    for row in rows {
        builder.push_record(row.cells.iter().map(|cell| paint(&cell.rendered, colored)));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// `page X of Y (N matching)`, with pages counted from one
pub fn list_footer(page: usize, page_count: usize, matching: usize) -> String {
    format!("page {} of {} ({matching} matching)", page + 1, page_count.max(1))
}

/// Message shown when the current page has no rows
pub fn empty_state(spec: &ResourceSpec, filter: &FilterState, matching: usize) -> String {
    if matching > 0 {
        format!("No {} on this page.", spec.name)
    } else if !filter.query().is_empty() {
        format!("No {} match '{}'.", spec.name, filter.query())
    } else if !filter.field_filters().is_empty() {
        format!("No {} match the given filters.", spec.name)
    } else {
        format!("No {} found.", spec.name)
    }
}

/// Current page of a controller: table and footer, or the empty state
pub fn render_list<G: ResourceGateway>(controller: &ListController<G>, colored: bool) -> String {
    let filter = controller.filter_state();
    let matching = controller.total_matching();
    let rows = controller.visible_rows();

    let body = if rows.is_empty() {
        let message = empty_state(controller.spec(), filter, matching);
        if colored {
            message.dimmed().to_string()
        } else {
            message
        }
    } else {
        rows_table(&controller.visible_columns(), &rows, colored)
    };

    format!(
        "{body}\n{}",
        list_footer(filter.page(), controller.page_count(), matching)
    )
}

/// Field/value table for one record: catalog columns first, then any
/// other fields the backend returned
pub fn record_table(
    spec: &ResourceSpec,
    record: &Record,
    registry: &RendererRegistry,
    colored: bool,
) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field".to_string(), "Value".to_string()]);
    for column in &spec.columns {
        let rendered = column.render(record, registry);
        builder.push_record([column.title.clone(), paint(&rendered, colored)]);
    }
    for (key, value) in record.fields() {
        if spec.find_column(key).is_none() {
            let rendered = registry.render(ValueKind::Text, value);
            builder.push_record([key.clone(), paint(&rendered, colored)]);
        }
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// One line per notification, prefixed with its level
pub fn notification_line(notification: &Notification, colored: bool) -> String {
    let (label, tone) = match notification.level {
        Level::Info => ("info", Tone::Info),
        Level::Success => ("ok", Tone::Success),
        Level::Warning => ("warning", Tone::Warning),
        Level::Error => ("error", Tone::Danger),
    };
    let label = paint(&Rendered::new(label, tone), colored);
    format!("{label}: {}", notification.message)
}

/// Pretty JSON for machine output
pub fn to_json_string(value: &Value) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
