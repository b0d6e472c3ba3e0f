//! Time selection and loop points.
use crate::helpers::undoable;
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::{Daw, TimeRange};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("get_time_selection", get_time_selection)
            .description(
                "Get the current time selection and loop points.\n\n\
                 Returns start, end and length of the time selection in seconds, plus the loop \
                 start/end and whether looping (repeat) is enabled.",
            )
            .failure_context("get time selection")
            .read_only(),
        ToolDef::new("set_time_selection", set_time_selection)
            .description(
                "Set the time selection to the given range in seconds.\n\n\
                 Pass equal start and end to clear the time selection.",
            )
            .failure_context("set time selection")
            .params(vec![
                Param::number("start", "Selection start in seconds").min(0.0),
                Param::number("end", "Selection end in seconds").min(0.0),
            ]),
        ToolDef::new("set_loop", set_loop)
            .description(
                "Enable or disable looping and optionally set the loop points.\n\n\
                 Provide both start and end to move the loop points, or neither to keep the \
                 current ones.",
            )
            .failure_context("set loop")
            .params(vec![
                Param::boolean("enabled", "True to enable looping (repeat), False to disable"),
                Param::number("start", "Loop start in seconds. Omit to keep the current one.")
                    .min(0.0)
                    .optional(),
                Param::number("end", "Loop end in seconds. Omit to keep the current one.")
                    .min(0.0)
                    .optional(),
            ]),
    ]
}

fn get_time_selection(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let selection = daw.time_selection()?;
    let loop_points = daw.loop_points()?;
    Ok(json!({
        "start": selection.start,
        "end": selection.end,
        "length": selection.length(),
        "loop_start": loop_points.start,
        "loop_end": loop_points.end,
        "loop_enabled": daw.repeat_is_enabled()?,
    }))
}

#[derive(Deserialize)]
struct SetTimeSelectionArgs {
    start: f64,
    end: f64,
}

fn set_time_selection(daw: &mut dyn Daw, args: SetTimeSelectionArgs) -> ToolResult<Value> {
    if args.end < args.start {
        return Err(ToolError::invalid(format!(
            "Selection end ({}) must not be before start ({}).",
            args.end, args.start
        )));
    }
    let range = TimeRange::new(args.start, args.end);
    undoable(daw, "Set time selection", |daw| {
        Ok(daw.set_time_selection(range)?)
    })?;
    Ok(json!({
        "start": range.start,
        "end": range.end,
        "length": range.length(),
    }))
}

#[derive(Deserialize)]
struct SetLoopArgs {
    enabled: bool,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
}

fn set_loop(daw: &mut dyn Daw, args: SetLoopArgs) -> ToolResult<Value> {
    let range = match (args.start, args.end) {
        (None, None) => None,
        (Some(start), Some(end)) if end <= start => {
            return Err(ToolError::invalid(format!(
                "Loop end ({}) must be greater than start ({}).",
                end, start
            )));
        }
        (Some(start), Some(end)) => Some(TimeRange::new(start, end)),
        _ => {
            return Err(ToolError::invalid(
                "Provide both 'start' and 'end' to move the loop points, or neither.",
            ));
        }
    };
    undoable(daw, "Set loop", |daw| {
        if let Some(range) = range {
            daw.set_loop_points(range)?;
        }
        Ok(daw.set_repeat_enabled(args.enabled)?)
    })?;
    let loop_points = daw.loop_points()?;
    Ok(json!({
        "loop_enabled": daw.repeat_is_enabled()?,
        "loop_start": loop_points.start,
        "loop_end": loop_points.end,
    }))
}
