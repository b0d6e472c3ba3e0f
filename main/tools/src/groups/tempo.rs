//! Master tempo and tempo/time signature markers.
use crate::helpers::undoable;
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::{Daw, TempoMarker};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("get_tempo_info", get_tempo_info)
            .description(
                "Get the current master tempo and all tempo/time-signature markers.\n\n\
                 Returns the current BPM, the total number of tempo markers, and a list of \
                 marker details (position, BPM, time signature, linear tempo flag).",
            )
            .failure_context("get tempo info")
            .read_only(),
        ToolDef::new("add_tempo_marker", add_tempo_marker)
            .description(
                "Add a new tempo marker at the specified position.\n\n\
                 Optionally set a new time signature at that point. Pass 0 for numerator and \
                 denominator to inherit the current project time signature.",
            )
            .failure_context("add tempo marker")
            .params(vec![
                Param::number("position", "Position in seconds").min(0.0),
                Param::number("bpm", "Beats per minute").above(0.0),
                Param::integer(
                    "time_sig_num",
                    "Time signature numerator (e.g. 4 for 4/4). 0 to keep project default.",
                )
                .default_value(json!(0)),
                Param::integer(
                    "time_sig_denom",
                    "Time signature denominator (e.g. 4 for 4/4). 0 to keep project default.",
                )
                .default_value(json!(0)),
            ]),
        ToolDef::new("edit_tempo_marker", edit_tempo_marker)
            .description(
                "Edit an existing tempo marker's BPM and/or time signature.\n\n\
                 Only the provided values are changed; omitted parameters keep their current \
                 values.",
            )
            .failure_context("edit tempo marker")
            .params(vec![
                marker_index(),
                Param::number("bpm", "New BPM value. Omit to leave unchanged.")
                    .above(0.0)
                    .optional(),
                Param::integer(
                    "time_sig_num",
                    "New time signature numerator. Omit to leave unchanged.",
                )
                .optional(),
                Param::integer(
                    "time_sig_denom",
                    "New time signature denominator. Omit to leave unchanged.",
                )
                .optional(),
            ]),
        ToolDef::new("delete_tempo_marker", delete_tempo_marker)
            .description(
                "Delete a tempo/time-signature marker by its index.\n\n\
                 WARNING: This permanently removes the tempo marker.",
            )
            .failure_context("delete tempo marker")
            .params(vec![marker_index()])
            .destructive(),
    ]
}

fn marker_index() -> Param {
    Param::integer("marker_index", "Zero-based tempo marker index").min(0.0)
}

fn marker_json(index: u32, marker: &TempoMarker) -> Value {
    json!({
        "index": index,
        "position": marker.position,
        "bpm": marker.bpm,
        "time_sig_num": marker.time_sig_num,
        "time_sig_denom": marker.time_sig_denom,
        "linear_tempo": marker.linear,
    })
}

fn validate_marker(daw: &dyn Daw, index: u32) -> ToolResult<TempoMarker> {
    let n = daw.tempo_marker_count()?;
    if index >= n {
        return Err(ToolError::invalid(format!(
            "Tempo marker index {} out of range. Project has {} tempo marker(s) (valid: 0-{}).",
            index,
            n,
            n as i64 - 1
        )));
    }
    Ok(daw.tempo_marker(index)?)
}

fn get_tempo_info(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let n = daw.tempo_marker_count()?;
    let markers = (0..n)
        .map(|i| Ok(marker_json(i, &daw.tempo_marker(i)?)))
        .collect::<ToolResult<Vec<_>>>()?;
    Ok(json!({
        "current_bpm": daw.master_tempo()?,
        "n_tempo_markers": n,
        "tempo_markers": markers,
    }))
}

#[derive(Deserialize)]
struct AddTempoMarkerArgs {
    position: f64,
    bpm: f64,
    #[serde(default)]
    time_sig_num: i32,
    #[serde(default)]
    time_sig_denom: i32,
}

fn add_tempo_marker(daw: &mut dyn Daw, args: AddTempoMarkerArgs) -> ToolResult<Value> {
    let marker = TempoMarker {
        position: args.position,
        bpm: args.bpm,
        time_sig_num: args.time_sig_num,
        time_sig_denom: args.time_sig_denom,
        linear: false,
    };
    let created = undoable(daw, "Add tempo marker", |daw| {
        Ok(daw.set_tempo_marker(None, &marker)?)
    })?;
    if !created {
        return Err(ToolError::invalid(
            "REAPER refused to create the tempo marker.",
        ));
    }
    Ok(json!({
        "position": args.position,
        "bpm": args.bpm,
        "time_sig_num": args.time_sig_num,
        "time_sig_denom": args.time_sig_denom,
        "n_tempo_markers": daw.tempo_marker_count()?,
    }))
}

#[derive(Deserialize)]
struct EditTempoMarkerArgs {
    marker_index: u32,
    #[serde(default)]
    bpm: Option<f64>,
    #[serde(default)]
    time_sig_num: Option<i32>,
    #[serde(default)]
    time_sig_denom: Option<i32>,
}

fn edit_tempo_marker(daw: &mut dyn Daw, args: EditTempoMarkerArgs) -> ToolResult<Value> {
    if args.bpm.is_none() && args.time_sig_num.is_none() && args.time_sig_denom.is_none() {
        return Err(ToolError::invalid(
            "At least one of 'bpm', 'time_sig_num', or 'time_sig_denom' must be provided.",
        ));
    }
    let index = args.marker_index;
    let existing = validate_marker(daw, index)?;
    let edited = TempoMarker {
        bpm: args.bpm.unwrap_or(existing.bpm),
        time_sig_num: args.time_sig_num.unwrap_or(existing.time_sig_num),
        time_sig_denom: args.time_sig_denom.unwrap_or(existing.time_sig_denom),
        ..existing
    };
    let ok = undoable(daw, "Edit tempo marker", |daw| {
        Ok(daw.set_tempo_marker(Some(index), &edited)?)
    })?;
    if !ok {
        return Err(ToolError::invalid(format!(
            "REAPER refused to update tempo marker at index {}.",
            index
        )));
    }
    Ok(marker_json(index, &daw.tempo_marker(index)?))
}

#[derive(Deserialize)]
struct DeleteTempoMarkerArgs {
    marker_index: u32,
}

fn delete_tempo_marker(daw: &mut dyn Daw, args: DeleteTempoMarkerArgs) -> ToolResult<Value> {
    let index = args.marker_index;
    validate_marker(daw, index)?;
    let ok = undoable(daw, "Delete tempo marker", |daw| {
        Ok(daw.delete_tempo_marker(index)?)
    })?;
    if !ok {
        return Err(ToolError::invalid(format!(
            "REAPER refused to delete tempo marker at index {}.",
            index
        )));
    }
    Ok(json!({
        "deleted_index": index,
        "n_tempo_markers": daw.tempo_marker_count()?,
    }))
}
