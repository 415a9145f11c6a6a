use serde_json::{Value, json};

use super::{CommandContext, CommandOutput, parse_record_id};
use crate::error::{DeskError, Result};
use crate::form::FormModal;
use crate::record::{Record, parse_assignments};

fn saved_output(action: &str, resource: &str, record: Record, title: &str) -> CommandOutput {
    let id = record
        .get("id")
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let text = if id.is_empty() {
        format!("{action} {title}")
    } else {
        format!("{action} {title} {id}")
    };
    CommandOutput::new(json!({
        "action": action.to_lowercase(),
        "resource": resource,
        "record": Value::Object(record.into_fields()),
    }))
    .with_text(text)
}

/// Create a record from `field=value` assignments
pub async fn cmd_create(
    ctx: &CommandContext,
    resource: &str,
    assignments: &[String],
    json: bool,
) -> Result<()> {
    let draft = parse_assignments(assignments)?;
    let mut controller = ctx.controller(resource)?;
    let spec = controller.spec().clone();

    let mut form = FormModal::create_with(draft);
    let saved = controller.save_form(&mut form).await;
    if saved.is_some() {
        ctx.persist(controller.gateway())?;
    }
    ctx.report(controller.notifications_mut().drain())?;

    let record = saved.ok_or_else(|| DeskError::Other(format!("Failed to save {}", spec.title)))?;
    saved_output("Created", &spec.name, record, &spec.title).print(json)
}

/// Update several fields of a record at once
pub async fn cmd_update(
    ctx: &CommandContext,
    resource: &str,
    id: &str,
    assignments: &[String],
    json: bool,
) -> Result<()> {
    let changes = parse_assignments(assignments)?;
    let mut controller = ctx.loaded_controller(resource).await?;
    let spec = controller.spec().clone();
    let id = parse_record_id(&spec, id)?;

    let current = controller
        .record(&id)
        .cloned()
        .ok_or_else(|| DeskError::RecordNotFound(format!("{} {}", spec.title, id)))?;
    let mut form = FormModal::edit(id, current);
    form.apply(&changes);

    let saved = controller.save_form(&mut form).await;
    if saved.is_some() {
        ctx.persist(controller.gateway())?;
    }
    ctx.report(controller.notifications_mut().drain())?;

    let record = saved.ok_or_else(|| DeskError::Other(format!("Failed to save {}", spec.title)))?;
    saved_output("Updated", &spec.name, record, &spec.title).print(json)
}
