//! Track listing, creation, deletion and mixer properties.
use crate::helpers::{undoable, validate_track};
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::{db_to_linear, linear_to_db, Daw, FxChain, RgbColor};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_tracks", list_tracks)
            .description(
                "List all tracks in the current REAPER project.\n\n\
                 Returns a summary of each track including name, volume, pan, mute/solo state, \
                 record arm status, color, and FX count.",
            )
            .failure_context("list tracks")
            .read_only(),
        ToolDef::new("get_track_info", get_track_info)
            .description(
                "Get detailed information about a single track.\n\n\
                 Returns all summary fields plus item count and automation mode.",
            )
            .failure_context("get track info")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("add_track", add_track)
            .description("Add a new track to the project at the given index.")
            .failure_context("add track")
            .params(vec![
                Param::integer(
                    "index",
                    "Position to insert the new track (zero-based). Defaults to end of track \
                     list.",
                )
                .optional(),
                Param::string("name", "Name for the new track. Defaults to empty string.")
                    .optional(),
            ]),
        ToolDef::new("delete_track", delete_track)
            .description(
                "Delete a track from the project.\n\n\
                 WARNING: This permanently removes the track and all its items, FX, and \
                 automation data. This action cannot be undone if the undo history is exhausted.",
            )
            .failure_context("delete track")
            .params(vec![track_index()])
            .destructive(),
        ToolDef::new("set_track_name", set_track_name)
            .description("Rename a track.")
            .failure_context("set track name")
            .params(vec![
                track_index(),
                Param::string("name", "New name for the track"),
            ]),
        ToolDef::new("set_track_volume", set_track_volume)
            .description("Set a track's volume in decibels (0.0 dB = unity gain).")
            .failure_context("set track volume")
            .params(vec![
                track_index(),
                Param::number("volume_db", "Volume in decibels (0.0 = unity gain)"),
            ]),
        ToolDef::new("set_track_pan", set_track_pan)
            .description(
                "Set a track's pan position (-1.0 = full left, 0.0 = center, 1.0 = full right).",
            )
            .failure_context("set track pan")
            .params(vec![
                track_index(),
                Param::number(
                    "pan",
                    "Pan value from -1.0 (full left) to 1.0 (full right)",
                )
                .range(-1.0, 1.0),
            ]),
        ToolDef::new("set_track_mute_solo", set_track_mute_solo)
            .description(
                "Set the mute and/or solo state on a track.\n\n\
                 Either or both of mute and solo can be provided. Omitted values are left \
                 unchanged.",
            )
            .failure_context("set track mute/solo")
            .params(vec![
                track_index(),
                Param::boolean("mute", "Set mute state. Pass null/omit to leave unchanged.")
                    .optional(),
                Param::boolean("solo", "Set solo state. Pass null/omit to leave unchanged.")
                    .optional(),
            ]),
        ToolDef::new("set_track_record_arm", set_track_record_arm)
            .description("Arm or disarm a track for recording.")
            .failure_context("set track record arm")
            .params(vec![
                track_index(),
                Param::boolean("armed", "True to arm, False to disarm"),
            ]),
        ToolDef::new("set_track_color", set_track_color)
            .description("Set a track's display color using RGB values (0-255 per channel).")
            .failure_context("set track color")
            .params(vec![
                track_index(),
                Param::integer("r", "Red channel (0-255)").range(0.0, 255.0),
                Param::integer("g", "Green channel (0-255)").range(0.0, 255.0),
                Param::integer("b", "Blue channel (0-255)").range(0.0, 255.0),
            ]),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

/// `[r, g, b]`, black when there is no custom color.
pub(crate) fn color_json(color: Option<RgbColor>) -> Value {
    match color {
        None => json!([0, 0, 0]),
        Some(c) => json!(c.to_array()),
    }
}

fn track_summary(daw: &dyn Daw, index: u32) -> ToolResult<Value> {
    Ok(json!({
        "index": index,
        "name": daw.track_name(index)?,
        "volume_db": linear_to_db(daw.track_volume(index)?),
        "pan": daw.track_pan(index)?,
        "muted": daw.track_is_muted(index)?,
        "soloed": daw.track_is_solo(index)?,
        "armed": daw.track_is_armed(index)?,
        "color": color_json(daw.track_color(index)?),
        "n_fxs": daw.fx_count(FxChain::Track(index))?,
    }))
}

fn list_tracks(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let n = daw.track_count()?;
    let tracks = (0..n)
        .map(|i| track_summary(&*daw, i))
        .collect::<ToolResult<Vec<_>>>()?;
    Ok(json!({"n_tracks": n, "tracks": tracks}))
}

#[derive(Deserialize)]
struct TrackArgs {
    track_index: u32,
}

fn get_track_info(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    let mut info = track_summary(daw, args.track_index)?;
    info["n_items"] = json!(daw.item_count(args.track_index)?);
    info["automation_mode"] = json!(daw.track_automation_mode(args.track_index)?);
    Ok(info)
}

#[derive(Deserialize)]
struct AddTrackArgs {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    name: Option<String>,
}

fn add_track(daw: &mut dyn Daw, args: AddTrackArgs) -> ToolResult<Value> {
    let insert_at = match args.index {
        Some(i) => i,
        None => daw.track_count()?,
    };
    let name = args.name.unwrap_or_default();
    undoable(daw, "Add track", |daw| Ok(daw.insert_track(insert_at, &name)?))?;
    Ok(json!({
        "index": insert_at,
        "name": name,
        "n_tracks": daw.track_count()?,
    }))
}

fn delete_track(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    let name = validate_track(daw, args.track_index)?;
    undoable(daw, "Delete track", |daw| {
        Ok(daw.remove_track(args.track_index)?)
    })?;
    Ok(json!({
        "deleted_index": args.track_index,
        "deleted_name": name,
        "n_tracks": daw.track_count()?,
    }))
}

#[derive(Deserialize)]
struct SetTrackNameArgs {
    track_index: u32,
    name: String,
}

fn set_track_name(daw: &mut dyn Daw, args: SetTrackNameArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Set track name", |daw| {
        Ok(daw.set_track_name(args.track_index, &args.name)?)
    })?;
    Ok(json!({
        "index": args.track_index,
        "name": daw.track_name(args.track_index)?,
    }))
}

#[derive(Deserialize)]
struct SetTrackVolumeArgs {
    track_index: u32,
    volume_db: f64,
}

fn set_track_volume(daw: &mut dyn Daw, args: SetTrackVolumeArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Set track volume", |daw| {
        Ok(daw.set_track_volume(args.track_index, db_to_linear(args.volume_db))?)
    })?;
    Ok(json!({
        "index": args.track_index,
        "volume_db": linear_to_db(daw.track_volume(args.track_index)?),
    }))
}

#[derive(Deserialize)]
struct SetTrackPanArgs {
    track_index: u32,
    pan: f64,
}

fn set_track_pan(daw: &mut dyn Daw, args: SetTrackPanArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Set track pan", |daw| {
        Ok(daw.set_track_pan(args.track_index, args.pan)?)
    })?;
    Ok(json!({
        "index": args.track_index,
        "pan": daw.track_pan(args.track_index)?,
    }))
}

#[derive(Deserialize)]
struct SetTrackMuteSoloArgs {
    track_index: u32,
    #[serde(default)]
    mute: Option<bool>,
    #[serde(default)]
    solo: Option<bool>,
}

fn set_track_mute_solo(daw: &mut dyn Daw, args: SetTrackMuteSoloArgs) -> ToolResult<Value> {
    if args.mute.is_none() && args.solo.is_none() {
        return Err(ToolError::invalid(
            "At least one of 'mute' or 'solo' must be provided.",
        ));
    }
    let track = args.track_index;
    validate_track(daw, track)?;
    undoable(daw, "Set track mute/solo", |daw| {
        if let Some(mute) = args.mute {
            daw.set_track_muted(track, mute)?;
        }
        if let Some(solo) = args.solo {
            daw.set_track_solo(track, solo)?;
        }
        Ok(())
    })?;
    Ok(json!({
        "index": track,
        "muted": daw.track_is_muted(track)?,
        "soloed": daw.track_is_solo(track)?,
    }))
}

#[derive(Deserialize)]
struct SetTrackRecordArmArgs {
    track_index: u32,
    armed: bool,
}

fn set_track_record_arm(daw: &mut dyn Daw, args: SetTrackRecordArmArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Set track record arm", |daw| {
        Ok(daw.set_track_armed(args.track_index, args.armed)?)
    })?;
    Ok(json!({
        "index": args.track_index,
        "armed": daw.track_is_armed(args.track_index)?,
    }))
}

#[derive(Deserialize)]
struct SetTrackColorArgs {
    track_index: u32,
    r: u8,
    g: u8,
    b: u8,
}

fn set_track_color(daw: &mut dyn Daw, args: SetTrackColorArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    let color = RgbColor::rgb(args.r, args.g, args.b);
    undoable(daw, "Set track color", |daw| {
        Ok(daw.set_track_color(args.track_index, color)?)
    })?;
    Ok(json!({
        "index": args.track_index,
        "color": color_json(daw.track_color(args.track_index)?),
    }))
}
