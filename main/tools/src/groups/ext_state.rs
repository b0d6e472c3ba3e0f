//! Extended state, REAPER's global key/value store.
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("get_ext_state", get_ext_state)
            .description(
                "Read a value from REAPER's extended state.\n\n\
                 Returns an empty value and exists=false if the key has never been set.",
            )
            .failure_context("get ext state")
            .params(vec![section(), key()])
            .read_only(),
        ToolDef::new("set_ext_state", set_ext_state)
            .description(
                "Write a value to REAPER's extended state.\n\n\
                 With persist=true the value is stored in reaper-extstate.ini and survives a \
                 REAPER restart.",
            )
            .failure_context("set ext state")
            .params(vec![
                section(),
                key(),
                Param::string("value", "Value to store"),
                persist(),
            ]),
        ToolDef::new("delete_ext_state", delete_ext_state)
            .description(
                "Delete a key from REAPER's extended state.\n\n\
                 WARNING: With persist=true the key is also removed from reaper-extstate.ini.",
            )
            .failure_context("delete ext state")
            .params(vec![section(), key(), persist()])
            .destructive(),
    ]
}

fn section() -> Param {
    Param::string("section", "Section name, usually the name of the script or extension")
}

fn key() -> Param {
    Param::string("key", "Key within the section")
}

fn persist() -> Param {
    Param::boolean("persist", "True to persist across REAPER restarts")
        .default_value(json!(false))
}

fn check_names(section: &str, key: &str) -> ToolResult<()> {
    if section.is_empty() || key.is_empty() {
        return Err(ToolError::invalid("'section' and 'key' must not be empty."));
    }
    Ok(())
}

#[derive(Deserialize)]
struct GetExtStateArgs {
    section: String,
    key: String,
}

fn get_ext_state(daw: &mut dyn Daw, args: GetExtStateArgs) -> ToolResult<Value> {
    check_names(&args.section, &args.key)?;
    let value = daw.ext_state(&args.section, &args.key)?;
    Ok(json!({
        "section": args.section,
        "key": args.key,
        "exists": !value.is_empty(),
        "value": value,
    }))
}

#[derive(Deserialize)]
struct SetExtStateArgs {
    section: String,
    key: String,
    value: String,
    #[serde(default)]
    persist: bool,
}

fn set_ext_state(daw: &mut dyn Daw, args: SetExtStateArgs) -> ToolResult<Value> {
    check_names(&args.section, &args.key)?;
    daw.set_ext_state(&args.section, &args.key, &args.value, args.persist)?;
    Ok(json!({
        "section": args.section,
        "key": args.key,
        "value": args.value,
        "persisted": args.persist,
    }))
}

#[derive(Deserialize)]
struct DeleteExtStateArgs {
    section: String,
    key: String,
    #[serde(default)]
    persist: bool,
}

fn delete_ext_state(daw: &mut dyn Daw, args: DeleteExtStateArgs) -> ToolResult<Value> {
    check_names(&args.section, &args.key)?;
    daw.delete_ext_state(&args.section, &args.key, args.persist)?;
    Ok(json!({
        "section": args.section,
        "key": args.key,
        "deleted": true,
    }))
}
