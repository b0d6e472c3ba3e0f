//! REAPER actions, by numeric ID or by named command.
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::{Param, ToolAnnotations};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("perform_action", perform_action)
            .description(
                "Execute a REAPER action by its numeric command ID.\n\n\
                 Command IDs are listed in REAPER's Actions dialog (e.g. 40044 = Transport: \
                 Play/stop). Actions manage their own undo points.",
            )
            .failure_context("perform action")
            .params(vec![
                Param::integer("action_id", "Numeric command ID of the action").min(1.0)
            ])
            .annotations(ToolAnnotations::mutator().open_world()),
        ToolDef::new("lookup_command_id", lookup_command_id)
            .description(
                "Look up the numeric command ID of a named command.\n\n\
                 Named commands are registered by extensions and scripts, e.g. \"_SWS_ABOUT\". \
                 The returned ID can be passed to perform_action.",
            )
            .failure_context("look up command ID")
            .params(vec![command_name()])
            .read_only(),
        ToolDef::new("perform_named_action", perform_named_action)
            .description(
                "Execute a REAPER action by its named command string.\n\n\
                 Useful for actions registered by extensions (SWS, scripts) whose numeric IDs \
                 differ between installations.",
            )
            .failure_context("perform named action")
            .params(vec![command_name()])
            .annotations(ToolAnnotations::mutator().open_world()),
    ]
}

fn command_name() -> Param {
    Param::string(
        "command_name",
        "Named command string as shown in the Actions dialog (e.g. \"_SWS_ABOUT\")",
    )
}

fn resolve(daw: &dyn Daw, name: &str) -> ToolResult<i32> {
    daw.lookup_command(name)?.ok_or_else(|| {
        ToolError::invalid(format!(
            "Command not found: '{}'. Verify the name in REAPER's Actions dialog.",
            name
        ))
    })
}

#[derive(Deserialize)]
struct PerformActionArgs {
    action_id: i32,
}

fn perform_action(daw: &mut dyn Daw, args: PerformActionArgs) -> ToolResult<Value> {
    daw.run_command(args.action_id)?;
    Ok(json!({"action_id": args.action_id, "executed": true}))
}

#[derive(Deserialize)]
struct CommandNameArgs {
    command_name: String,
}

fn lookup_command_id(daw: &mut dyn Daw, args: CommandNameArgs) -> ToolResult<Value> {
    let id = resolve(daw, &args.command_name)?;
    Ok(json!({"command_name": args.command_name, "command_id": id}))
}

fn perform_named_action(daw: &mut dyn Daw, args: CommandNameArgs) -> ToolResult<Value> {
    let id = resolve(daw, &args.command_name)?;
    tracing::debug!(msg = "Running named command", name = %args.command_name, id);
    daw.run_command(id)?;
    Ok(json!({
        "command_name": args.command_name,
        "command_id": id,
        "executed": true,
    }))
}
