use serde_json::json;

use super::interactive::{confirm, is_stdin_tty};
use super::{CommandContext, CommandOutput, parse_record_id};
use crate::edit::EditOutcome;
use crate::error::{DeskError, Result};
use crate::record::parse_cli_value;

/// Change one field through the edit/confirm workflow
pub async fn cmd_set(
    ctx: &CommandContext,
    resource: &str,
    id: &str,
    field: &str,
    value: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    let mut controller = ctx.loaded_controller(resource).await?;
    let spec = controller.spec().clone();
    let id = parse_record_id(&spec, id)?;

    if !spec.find_column(field).is_some_and(|c| c.editable) {
        return Err(DeskError::NotEditable(field.to_string(), spec.name.clone()));
    }

    let new_value = parse_cli_value(value);
    let Some(prompt) = controller.begin_edit(&id, field, new_value.clone())? else {
        return CommandOutput::new(json!({
            "action": "set",
            "resource": spec.name,
            "id": id.to_string(),
            "field": field,
            "changed": false,
        }))
        .with_text(format!("{} is unchanged", spec.column_title(field)))
        .print(json);
    };

    if !yes {
        if !is_stdin_tty() {
            controller.cancel_edit()?;
            return Err(DeskError::ConfirmationRequired(format!(
                "{prompt} Re-run with --yes to confirm"
            )));
        }
        if !confirm(&prompt)? {
            controller.cancel_edit()?;
            return CommandOutput::new(json!({
                "action": "set",
                "resource": spec.name,
                "id": id.to_string(),
                "field": field,
                "changed": false,
                "cancelled": true,
            }))
            .with_text("Cancelled")
            .print(json);
        }
    }

    let outcome = controller.confirm_edit().await?;
    if outcome == EditOutcome::Saved {
        ctx.persist(controller.gateway())?;
    }
    ctx.report(controller.notifications_mut().drain())?;

    let shown = controller
        .record(&id)
        .map(|r| r.value(field).clone())
        .unwrap_or(new_value);
    let rendered = ctx.registry().render(spec.kind_of(field), &shown);

    CommandOutput::new(json!({
        "action": "set",
        "resource": spec.name,
        "id": id.to_string(),
        "field": field,
        "value": shown,
        "changed": true,
    }))
    .with_text(format!(
        "{} {}: {} = {}",
        spec.title,
        id,
        spec.column_title(field),
        rendered
    ))
    .print(json)
}
