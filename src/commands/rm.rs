use serde_json::json;

use super::interactive::{confirm, is_stdin_tty};
use super::{CommandContext, CommandOutput, parse_record_id};
use crate::error::{DeskError, Result};

/// Delete a record after confirmation
pub async fn cmd_rm(
    ctx: &CommandContext,
    resource: &str,
    id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let mut controller = ctx.loaded_controller(resource).await?;
    let spec = controller.spec().clone();
    let id = parse_record_id(&spec, id)?;

    if controller.record(&id).is_none() {
        return Err(DeskError::RecordNotFound(format!("{} {}", spec.title, id)));
    }

    if !force {
        let prompt = format!("Delete {} {}?", spec.title, id);
        if !is_stdin_tty() {
            return Err(DeskError::ConfirmationRequired(format!(
                "{prompt} Re-run with --force to delete"
            )));
        }
        if !confirm(&prompt)? {
            return CommandOutput::new(json!({
                "action": "delete",
                "resource": spec.name,
                "id": id.to_string(),
                "deleted": false,
            }))
            .with_text("Cancelled")
            .print(json);
        }
    }

    if controller.delete_record(&id).await? {
        ctx.persist(controller.gateway())?;
    }
    ctx.report(controller.notifications_mut().drain())?;

    CommandOutput::new(json!({
        "action": "delete",
        "resource": spec.name,
        "id": id.to_string(),
        "deleted": true,
    }))
    .with_text(format!("Deleted {} {}", spec.title, id))
    .print(json)
}
