use serde_json::json;

use super::{CommandContext, CommandOutput};
use crate::controller::LoadState;
use crate::display::render_list;
use crate::error::{DeskError, Result};
use crate::filter::FieldFilter;
use crate::gateway::ListFilters;

/// Options for the `ls` command
#[derive(Debug, Clone, Default)]
pub struct LsOptions {
    pub resource: String,
    /// Free-text search across every field
    pub search: Option<String>,
    /// One-based page number
    pub page: usize,
    pub page_size: Option<usize>,
    /// Backend query parameters (year, month, date range)
    pub remote: ListFilters,
    /// `field=value` conditions applied locally
    pub wheres: Vec<String>,
    pub hide: Vec<String>,
    pub json: bool,
}

/// List one page of a resource
pub async fn cmd_ls(ctx: &CommandContext, options: LsOptions) -> Result<()> {
    let mut controller = ctx.controller(&options.resource)?;
    if let Some(size) = options.page_size {
        controller.set_page_size(size)?;
    }
    for column in &options.hide {
        controller.hide_column(column)?;
    }

    if options.remote.is_empty() {
        controller.load().await;
    } else {
        controller.set_remote_filters(options.remote.clone()).await;
    }
    if let LoadState::Error(message) = controller.state() {
        return Err(DeskError::Other(format!(
            "Failed to load {}: {message}",
            controller.spec().name
        )));
    }

    for condition in &options.wheres {
        controller.set_field_filter(FieldFilter::parse(condition)?);
    }
    if let Some(query) = &options.search {
        controller.set_query(query.clone());
    }
    controller.set_page(options.page.saturating_sub(1));

    let filter = controller.filter_state();
    let json_output = json!({
        "resource": controller.spec().name,
        "page": filter.page() + 1,
        "page_size": filter.page_size(),
        "page_count": controller.page_count(),
        "matching": controller.total_matching(),
        "total": controller.records().len(),
        "available_years": controller.available_years(),
        "rows": controller.visible_rows(),
    });

    CommandOutput::new(json_output)
        .with_text(render_list(&controller, ctx.colored))
        .print(options.json)
}
