use serde_json::Value;

use super::{CommandContext, CommandOutput, parse_record_id};
use crate::display::record_table;
use crate::error::Result;
use crate::gateway::ResourceGateway;
use crate::resources;

/// Display a single record
pub async fn cmd_show(ctx: &CommandContext, resource: &str, id: &str, json: bool) -> Result<()> {
    let spec = resources::find(resource)?;
    let id = parse_record_id(&spec, id)?;
    let gateway = ctx.gateway(spec.clone())?;

    let record = gateway.get(&id).await?;
    let text = record_table(&spec, &record, &ctx.registry(), ctx.colored);

    CommandOutput::new(Value::Object(record.into_fields()))
        .with_text(text)
        .print(json)
}
