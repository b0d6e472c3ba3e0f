//! Track envelopes, FX parameter envelopes, automation mode and automation items.
//!
//! REAPER exposes envelope properties like "active" only through the envelope state chunk, so
//! these tools read the chunk, patch single lines and write it back.
use crate::helpers::{
    undoable, validate_envelope, validate_fx, validate_param, validate_track,
};
use crate::{ToolDef, ToolError, ToolResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scythe_daw::{Daw, EnvelopePoint, FxChain};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_track_envelopes", list_track_envelopes)
            .description(
                "List all envelopes on a track.\n\n\
                 Returns each envelope's index, name, point count, and internal envelope ID.",
            )
            .failure_context("list track envelopes")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("get_envelope_points", get_envelope_points)
            .description(
                "Get all points on a track envelope.\n\n\
                 Returns each point's index, time, value, shape, tension, and selected state. \
                 Shape values: 0=linear, 1=square, 2=slow start/end, 3=fast start, 4=fast end, \
                 5=bezier.",
            )
            .failure_context("get envelope points")
            .params(vec![track_index(), envelope_index()])
            .read_only(),
        ToolDef::new("add_envelope_point", add_envelope_point)
            .description(
                "Add a point to a track envelope.\n\n\
                 The point is inserted and the envelope is sorted afterwards. Shape values: \
                 0=linear, 1=square, 2=slow start/end, 3=fast start, 4=fast end, 5=bezier.",
            )
            .failure_context("add envelope point")
            .params(vec![
                track_index(),
                envelope_index(),
                Param::number("time", "Time position in seconds").min(0.0),
                Param::number("value", "Envelope value (range depends on envelope type)"),
                shape("shape", SHAPE_DESCRIPTION).default_value(json!(0)),
                Param::number("tension", "Tension for bezier curves (-1.0 to 1.0)")
                    .range(-1.0, 1.0)
                    .default_value(json!(0.0)),
            ]),
        ToolDef::new("delete_envelope_points", delete_envelope_points)
            .description(
                "Delete all envelope points within a time range.\n\n\
                 WARNING: All points between time_start and time_end (exclusive) will be \
                 permanently removed.",
            )
            .failure_context("delete envelope points")
            .params(vec![
                track_index(),
                envelope_index(),
                Param::number("time_start", "Start of the time range in seconds").min(0.0),
                Param::number("time_end", "End of the time range in seconds").above(0.0),
            ])
            .destructive(),
        ToolDef::new("create_fx_envelope", create_fx_envelope)
            .description(
                "Create an automation envelope for an FX parameter.\n\n\
                 Returns the envelope name, point count, and its index in the track's envelope \
                 list. If the envelope already exists it is returned as-is (no duplicate is \
                 created).",
            )
            .failure_context("create FX envelope")
            .params(vec![
                track_index(),
                Param::integer("fx_index", "Zero-based FX slot index").min(0.0),
                Param::integer("param_index", "Zero-based FX parameter index").min(0.0),
                Param::boolean("activate", "Activate the envelope after creation")
                    .default_value(json!(true)),
                shape("default_shape", SHAPE_DESCRIPTION).default_value(json!(1)),
            ]),
        ToolDef::new("delete_envelope", delete_envelope)
            .description(
                "Deactivate and clear an envelope.\n\n\
                 REAPER does not support permanently deleting envelopes via the API. This tool \
                 clears all points and deactivates the envelope lane. The lane still exists in \
                 the track but will be invisible and inactive.",
            )
            .failure_context("deactivate envelope")
            .params(vec![track_index(), envelope_index()])
            .destructive(),
        ToolDef::new("set_envelope_properties", set_envelope_properties)
            .description(
                "Modify envelope properties via chunk editing.\n\n\
                 Changes active state, visibility, and/or default point shape. At least one of \
                 active, visible, or default_shape must be provided.",
            )
            .failure_context("set envelope properties")
            .params(vec![
                track_index(),
                envelope_index(),
                Param::boolean(
                    "active",
                    "Set envelope active state. None to leave unchanged.",
                )
                .optional(),
                Param::boolean("visible", "Set envelope visibility. None to leave unchanged.")
                    .optional(),
                shape(
                    "default_shape",
                    "Default point shape: 0=linear, 1=square, 2=slow start/end, 3=fast start, \
                     4=fast end, 5=bezier. None to leave unchanged.",
                )
                .optional(),
            ]),
        ToolDef::new("add_fx_envelope_points", add_fx_envelope_points)
            .description(
                "Add multiple points to an envelope in one operation.\n\n\
                 All points are inserted in a single undo block with one final sort for \
                 efficiency. Optionally clear all existing points first.",
            )
            .failure_context("add envelope points")
            .params(vec![
                track_index(),
                envelope_index(),
                Param::array_of(
                    "points",
                    "List of point objects, each with keys: 'time' (float, seconds), 'value' \
                     (float), and optionally 'shape' (int 0-5, default 0) and 'tension' (float \
                     -1.0 to 1.0, default 0.0).",
                    vec![
                        Param::number("time", "Time position in seconds").min(0.0),
                        Param::number("value", "Envelope value"),
                        shape("shape", SHAPE_DESCRIPTION).default_value(json!(0)),
                        Param::number("tension", "Tension for bezier curves")
                            .range(-1.0, 1.0)
                            .default_value(json!(0.0)),
                    ],
                ),
                Param::boolean(
                    "clear_existing",
                    "If true, delete all existing points before adding new ones",
                )
                .default_value(json!(false)),
            ]),
        ToolDef::new("set_track_automation_mode", set_track_automation_mode)
            .description(
                "Set the automation mode for a track.\n\n\
                 Modes: 0=trim/off, 1=read, 2=touch, 3=write, 4=latch.",
            )
            .failure_context("set track automation mode")
            .params(vec![
                track_index(),
                Param::integer(
                    "mode",
                    "Automation mode: 0=trim/off, 1=read, 2=touch, 3=write, 4=latch",
                )
                .range(0.0, 4.0),
            ]),
        ToolDef::new("add_automation_item", add_automation_item)
            .description(
                "Add an automation item to a track envelope.\n\n\
                 Creates a new automation item (not pooled) at the given position and length. \
                 Returns the index of the newly created automation item.",
            )
            .failure_context("add automation item")
            .params(vec![
                track_index(),
                envelope_index(),
                Param::number("position", "Start position in seconds").min(0.0),
                Param::number("length", "Length of the automation item in seconds")
                    .above(0.0),
            ]),
    ]
}

const SHAPE_DESCRIPTION: &str =
    "Point shape: 0=linear, 1=square, 2=slow start/end, 3=fast start, 4=fast end, 5=bezier";

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn envelope_index() -> Param {
    Param::integer("envelope_index", "Zero-based envelope index on the track").min(0.0)
}

fn shape(name: &'static str, description: &'static str) -> Param {
    Param::integer(name, description).range(0.0, 5.0)
}

fn shape_name(shape: i32) -> &'static str {
    match shape {
        0 => "linear",
        1 => "square",
        2 => "slow start/end",
        3 => "fast start",
        4 => "fast end",
        5 => "bezier",
        _ => "unknown",
    }
}

fn automation_mode_name(mode: i32) -> &'static str {
    match mode {
        0 => "trim/off",
        1 => "read",
        2 => "touch",
        3 => "write",
        4 => "latch",
        _ => "unknown",
    }
}

/// Line-level edits of an envelope state chunk. `None` leaves the line alone.
///
/// Patterns are anchored at line starts so that e.g. `LVIS` or `VOLENV2_ACT` never match.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
struct ChunkEdit {
    active: Option<bool>,
    visible: Option<bool>,
    default_shape: Option<i32>,
}

static ACT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(ACT )\d").unwrap());
static VIS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(VIS )\d").unwrap());
static DEFSHAPE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(DEFSHAPE )\d+").unwrap());

fn replace_flag(regex: &Regex, chunk: &str, value: impl std::fmt::Display) -> String {
    regex
        .replace_all(chunk, |caps: &Captures| format!("{}{}", &caps[1], value))
        .into_owned()
}

impl ChunkEdit {
    fn apply(&self, chunk: &str) -> String {
        let mut chunk = chunk.to_string();
        if let Some(active) = self.active {
            chunk = replace_flag(&ACT_LINE, &chunk, active as u8);
        }
        if let Some(visible) = self.visible {
            chunk = replace_flag(&VIS_LINE, &chunk, visible as u8);
        }
        if let Some(shape) = self.default_shape {
            if DEFSHAPE_LINE.is_match(&chunk) {
                chunk = replace_flag(&DEFSHAPE_LINE, &chunk, shape);
            } else {
                let body = chunk.trim_end().trim_end_matches('>').trim_end();
                chunk = format!("{}\nDEFSHAPE {}\n>", body, shape);
            }
        }
        chunk
    }

    /// Reads the chunk of the envelope, applies the edit and writes it back.
    fn write(&self, daw: &mut dyn Daw, track: u32, envelope: u32) -> ToolResult<()> {
        let chunk = daw.envelope_chunk(track, envelope)?;
        if chunk.is_empty() {
            return Err(ToolError::invalid("Failed to read envelope state chunk."));
        }
        daw.set_envelope_chunk(track, envelope, &self.apply(&chunk))?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct TrackArgs {
    track_index: u32,
}

fn list_track_envelopes(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    let n = daw.envelope_count(args.track_index)?;
    let mut envelopes = Vec::with_capacity(n as usize);
    for i in 0..n {
        let info = daw.envelope_info(args.track_index, i)?;
        envelopes.push(json!({
            "index": i,
            "name": info.name,
            "n_points": info.point_count,
            "envelope_id": info.id,
        }));
    }
    Ok(json!({"n_envelopes": n, "envelopes": envelopes}))
}

#[derive(Deserialize)]
struct EnvelopeArgs {
    track_index: u32,
    envelope_index: u32,
}

fn get_envelope_points(daw: &mut dyn Daw, args: EnvelopeArgs) -> ToolResult<Value> {
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    let info = validate_envelope(daw, track, &track_name, envelope)?;
    let mut points = Vec::with_capacity(info.point_count as usize);
    for i in 0..info.point_count {
        let p = daw.envelope_point(track, envelope, i)?;
        points.push(json!({
            "index": i,
            "time": p.time,
            "value": p.value,
            "shape": p.shape,
            "shape_name": shape_name(p.shape),
            "tension": p.tension,
            "selected": p.selected,
        }));
    }
    Ok(json!({"n_points": info.point_count, "points": points}))
}

#[derive(Deserialize)]
struct AddEnvelopePointArgs {
    track_index: u32,
    envelope_index: u32,
    time: f64,
    value: f64,
    #[serde(default)]
    shape: i32,
    #[serde(default)]
    tension: f64,
}

fn add_envelope_point(daw: &mut dyn Daw, args: AddEnvelopePointArgs) -> ToolResult<Value> {
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    validate_envelope(daw, track, &track_name, envelope)?;
    let point = EnvelopePoint {
        time: args.time,
        value: args.value,
        shape: args.shape,
        tension: args.tension,
        selected: false,
    };
    undoable(daw, "Add envelope point", |daw| {
        daw.insert_envelope_point(track, envelope, &point)?;
        Ok(daw.sort_envelope_points(track, envelope)?)
    })?;
    Ok(json!({
        "time": args.time,
        "value": args.value,
        "shape": args.shape,
        "shape_name": shape_name(args.shape),
        "tension": args.tension,
    }))
}

#[derive(Deserialize)]
struct DeleteEnvelopePointsArgs {
    track_index: u32,
    envelope_index: u32,
    time_start: f64,
    time_end: f64,
}

fn delete_envelope_points(
    daw: &mut dyn Daw,
    args: DeleteEnvelopePointsArgs,
) -> ToolResult<Value> {
    if args.time_end <= args.time_start {
        return Err(ToolError::invalid(format!(
            "time_end ({}) must be greater than time_start ({}).",
            args.time_end, args.time_start
        )));
    }
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    validate_envelope(daw, track, &track_name, envelope)?;
    undoable(daw, "Delete envelope points", |daw| {
        Ok(daw.delete_envelope_points(track, envelope, args.time_start, args.time_end)?)
    })?;
    Ok(json!({
        "time_start": args.time_start,
        "time_end": args.time_end,
    }))
}

#[derive(Deserialize)]
struct CreateFxEnvelopeArgs {
    track_index: u32,
    fx_index: u32,
    param_index: u32,
    #[serde(default = "yes")]
    activate: bool,
    #[serde(default = "square")]
    default_shape: i32,
}

fn yes() -> bool {
    true
}

fn square() -> i32 {
    1
}

fn create_fx_envelope(daw: &mut dyn Daw, args: CreateFxEnvelopeArgs) -> ToolResult<Value> {
    let track = args.track_index;
    let track_name = validate_track(daw, track)?;
    let fx_name = validate_fx(daw, track, &track_name, args.fx_index)?;
    let param_name = validate_param(
        daw,
        FxChain::Track(track),
        args.fx_index,
        &fx_name,
        args.param_index,
    )?;
    let label = format!(
        "Create FX envelope for '{}' on '{}' (track '{}')",
        param_name, fx_name, track_name
    );
    let envelope = undoable(daw, &label, |daw| {
        let envelope = daw
            .fx_envelope(track, args.fx_index, args.param_index, true)?
            .ok_or_else(|| {
                ToolError::invalid(format!(
                    "Failed to create envelope for parameter '{}' on FX '{}'.",
                    param_name, fx_name
                ))
            })?;
        if args.activate || args.default_shape != 0 {
            let edit = ChunkEdit {
                active: Some(args.activate),
                visible: if args.activate { Some(true) } else { None },
                default_shape: Some(args.default_shape),
            };
            edit.write(daw, track, envelope)?;
        }
        Ok(envelope)
    })?;
    let info = daw.envelope_info(track, envelope)?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "param_index": args.param_index,
        "param_name": param_name,
        "envelope_index": envelope,
        "envelope_name": info.name,
        "n_points": info.point_count,
        "activated": args.activate,
        "default_shape": args.default_shape,
        "default_shape_name": shape_name(args.default_shape),
    }))
}

fn delete_envelope(daw: &mut dyn Daw, args: EnvelopeArgs) -> ToolResult<Value> {
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    let info = validate_envelope(daw, track, &track_name, envelope)?;
    let label = format!(
        "Deactivate envelope '{}' on track '{}'",
        info.name, track_name
    );
    undoable(daw, &label, |daw| {
        daw.clear_envelope(track, envelope)?;
        let edit = ChunkEdit {
            active: Some(false),
            visible: Some(false),
            default_shape: None,
        };
        edit.write(daw, track, envelope)
    })?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "envelope_index": envelope,
        "envelope_name": info.name,
        "deactivated": true,
        "note": "Envelope lane still exists but is inactive and hidden.",
    }))
}

#[derive(Deserialize)]
struct SetEnvelopePropertiesArgs {
    track_index: u32,
    envelope_index: u32,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    visible: Option<bool>,
    #[serde(default)]
    default_shape: Option<i32>,
}

fn set_envelope_properties(
    daw: &mut dyn Daw,
    args: SetEnvelopePropertiesArgs,
) -> ToolResult<Value> {
    let edit = ChunkEdit {
        active: args.active,
        visible: args.visible,
        default_shape: args.default_shape,
    };
    if edit == ChunkEdit::default() {
        return Err(ToolError::invalid(
            "At least one of 'active', 'visible', or 'default_shape' must be provided.",
        ));
    }
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    let info = validate_envelope(daw, track, &track_name, envelope)?;
    let label = format!(
        "Set envelope properties on '{}' (track '{}')",
        info.name, track_name
    );
    undoable(daw, &label, |daw| edit.write(daw, track, envelope))?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "envelope_index": envelope,
        "envelope_name": info.name,
        "active": args.active,
        "visible": args.visible,
        "default_shape": args.default_shape,
        "default_shape_name": args.default_shape.map(shape_name),
    }))
}

#[derive(Deserialize)]
struct AddFxEnvelopePointsArgs {
    track_index: u32,
    envelope_index: u32,
    points: Vec<Map<String, Value>>,
    #[serde(default)]
    clear_existing: bool,
}

/// Checks a single element of the `points` argument.
fn parse_point(index: usize, point: &Map<String, Value>) -> ToolResult<EnvelopePoint> {
    let number = |key: &str, default: Option<f64>| -> ToolResult<f64> {
        match point.get(key) {
            None | Some(Value::Null) => default.ok_or_else(|| {
                ToolError::invalid(format!(
                    "Point at index {} must have 'time' and 'value' keys.",
                    index
                ))
            }),
            Some(v) => v.as_f64().ok_or_else(|| {
                ToolError::invalid(format!(
                    "Point at index {}: '{}' must be a number, got {}.",
                    index, key, v
                ))
            }),
        }
    };
    let time = number("time", None)?;
    let value = number("value", None)?;
    let shape = number("shape", Some(0.0))?;
    let tension = number("tension", Some(0.0))?;
    if time < 0.0 {
        return Err(ToolError::invalid(format!(
            "Point at index {}: time must be >= 0, got {}.",
            index, time
        )));
    }
    if !(0.0..=5.0).contains(&shape) || shape.fract() != 0.0 {
        return Err(ToolError::invalid(format!(
            "Point at index {}: shape must be 0-5, got {}.",
            index, shape
        )));
    }
    if !(-1.0..=1.0).contains(&tension) {
        return Err(ToolError::invalid(format!(
            "Point at index {}: tension must be -1.0 to 1.0, got {}.",
            index, tension
        )));
    }
    Ok(EnvelopePoint {
        time,
        value,
        shape: shape as i32,
        tension,
        selected: false,
    })
}

fn add_fx_envelope_points(daw: &mut dyn Daw, args: AddFxEnvelopePointsArgs) -> ToolResult<Value> {
    if args.points.is_empty() {
        return Err(ToolError::invalid("The 'points' list must not be empty."));
    }
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    let info = validate_envelope(daw, track, &track_name, envelope)?;
    let points = args
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| parse_point(i, p))
        .collect::<ToolResult<Vec<_>>>()?;
    let label = format!(
        "Add {} envelope points to '{}' (track '{}')",
        points.len(),
        info.name,
        track_name
    );
    undoable(daw, &label, |daw| {
        if args.clear_existing {
            daw.clear_envelope(track, envelope)?;
        }
        for point in &points {
            daw.insert_envelope_point(track, envelope, point)?;
        }
        Ok(daw.sort_envelope_points(track, envelope)?)
    })?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "envelope_index": envelope,
        "envelope_name": info.name,
        "points_added": points.len(),
        "cleared_existing": args.clear_existing,
        "total_points": daw.envelope_info(track, envelope)?.point_count,
    }))
}

#[derive(Deserialize)]
struct SetAutomationModeArgs {
    track_index: u32,
    mode: i32,
}

fn set_track_automation_mode(daw: &mut dyn Daw, args: SetAutomationModeArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Set track automation mode", |daw| {
        Ok(daw.set_track_automation_mode(args.track_index, args.mode)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "mode": args.mode,
        "mode_name": automation_mode_name(args.mode),
    }))
}

#[derive(Deserialize)]
struct AddAutomationItemArgs {
    track_index: u32,
    envelope_index: u32,
    position: f64,
    length: f64,
}

fn add_automation_item(daw: &mut dyn Daw, args: AddAutomationItemArgs) -> ToolResult<Value> {
    let (track, envelope) = (args.track_index, args.envelope_index);
    let track_name = validate_track(daw, track)?;
    validate_envelope(daw, track, &track_name, envelope)?;
    let index = undoable(daw, "Add automation item", |daw| {
        Ok(daw.insert_automation_item(track, envelope, args.position, args.length)?)
    })?;
    Ok(json!({
        "automation_item_index": index,
        "position": args.position,
        "length": args.length,
    }))
}
