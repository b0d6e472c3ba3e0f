//! Track sends and receives.
use crate::helpers::{round_to, undoable, validate_send, validate_track};
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::{db_to_linear, linear_to_db, Daw, SendCategory};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_track_sends", list_track_sends)
            .description(
                "List all sends on a track.\n\n\
                 Returns each send's index, destination track name, volume in dB, pan position \
                 (-1.0 left to 1.0 right), and mute state.",
            )
            .failure_context("list track sends")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("list_track_receives", list_track_receives)
            .description(
                "List all receives on a track.\n\n\
                 Returns each receive's index, source track name, volume in dB, pan position, \
                 and mute state.",
            )
            .failure_context("list track receives")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("create_send", create_send)
            .description(
                "Create a new send from one track to another.\n\n\
                 Returns the new send index on the source track.",
            )
            .failure_context("create send")
            .params(vec![
                Param::integer("src_track_index", "Zero-based source track index").min(0.0),
                Param::integer("dst_track_index", "Zero-based destination track index")
                    .min(0.0),
            ]),
        ToolDef::new("remove_send", remove_send)
            .description(
                "Remove a send from a track.\n\n\
                 WARNING: This permanently removes the send. Subsequent send indices will shift \
                 down by one.",
            )
            .failure_context("remove send")
            .params(vec![track_index(), send_index()])
            .destructive(),
        ToolDef::new("set_send_volume_pan", set_send_volume_pan)
            .description(
                "Set volume and/or pan on a track send.\n\n\
                 At least one of volume_db or pan must be provided. Volume is specified in \
                 decibels (0.0 = unity gain). Pan ranges from -1.0 (left) to 1.0 (right).",
            )
            .failure_context("set send volume/pan")
            .params(vec![
                track_index(),
                send_index(),
                Param::number(
                    "volume_db",
                    "Send volume in dB (0.0 = unity, -inf = silence). Omit to leave unchanged.",
                )
                .optional(),
                Param::number(
                    "pan",
                    "Send pan position (-1.0 = full left, 0.0 = center, 1.0 = full right). \
                     Omit to leave unchanged.",
                )
                .range(-1.0, 1.0)
                .optional(),
            ]),
        ToolDef::new("set_send_mute", set_send_mute)
            .description("Mute or unmute a track send.")
            .failure_context("set send mute")
            .params(vec![
                track_index(),
                send_index(),
                Param::boolean("muted", "True to mute the send, False to unmute"),
            ]),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn send_index() -> Param {
    Param::integer("send_index", "Zero-based send index on the track").min(0.0)
}

/// Volume and pan the way all send tools report them.
fn send_summary(
    daw: &dyn Daw,
    track: u32,
    category: SendCategory,
    index: u32,
    partner_key: &str,
) -> ToolResult<Value> {
    let info = daw.send_info(track, category, index)?;
    let mut summary = json!({
        "index": index,
        "volume_db": round_to(linear_to_db(info.volume), 2),
        "pan": round_to(info.pan, 4),
        "muted": info.is_muted,
    });
    summary[partner_key] = json!(info.partner_name);
    Ok(summary)
}

#[derive(Deserialize)]
struct TrackArgs {
    track_index: u32,
}

fn list_track_sends(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let n = daw.send_count(args.track_index, SendCategory::Send)?;
    let sends = (0..n)
        .map(|i| send_summary(&*daw, args.track_index, SendCategory::Send, i, "dest_track"))
        .collect::<ToolResult<Vec<_>>>()?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "n_sends": n,
        "sends": sends,
    }))
}

fn list_track_receives(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let n = daw.send_count(args.track_index, SendCategory::Receive)?;
    let receives = (0..n)
        .map(|i| send_summary(&*daw, args.track_index, SendCategory::Receive, i, "src_track"))
        .collect::<ToolResult<Vec<_>>>()?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "n_receives": n,
        "receives": receives,
    }))
}

#[derive(Deserialize)]
struct CreateSendArgs {
    src_track_index: u32,
    dst_track_index: u32,
}

fn create_send(daw: &mut dyn Daw, args: CreateSendArgs) -> ToolResult<Value> {
    let src_name = validate_track(daw, args.src_track_index)?;
    let dst_name = validate_track(daw, args.dst_track_index)?;
    if args.src_track_index == args.dst_track_index {
        return Err(ToolError::invalid(
            "Cannot create a send from a track to itself.",
        ));
    }
    let label = format!("Create send from '{}' to '{}'", src_name, dst_name);
    let created = undoable(daw, &label, |daw| {
        Ok(daw.create_send(args.src_track_index, args.dst_track_index)?)
    })?;
    let send_index = created.ok_or_else(|| {
        ToolError::invalid(format!(
            "Failed to create send from track '{}' to track '{}'.",
            src_name, dst_name
        ))
    })?;
    Ok(json!({
        "src_track_index": args.src_track_index,
        "src_track_name": src_name,
        "dst_track_index": args.dst_track_index,
        "dst_track_name": dst_name,
        "send_index": send_index,
    }))
}

#[derive(Deserialize)]
struct SendArgs {
    track_index: u32,
    send_index: u32,
}

fn remove_send(daw: &mut dyn Daw, args: SendArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    validate_send(
        daw,
        args.track_index,
        &track_name,
        SendCategory::Send,
        args.send_index,
    )?;
    let dest_name = daw
        .send_info(args.track_index, SendCategory::Send, args.send_index)?
        .partner_name;
    let label = format!(
        "Remove send {} from track '{}'",
        args.send_index, track_name
    );
    undoable(daw, &label, |daw| {
        Ok(daw.remove_send(args.track_index, SendCategory::Send, args.send_index)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "removed_send_index": args.send_index,
        "removed_dest_track": dest_name,
    }))
}

#[derive(Deserialize)]
struct SetSendVolumePanArgs {
    track_index: u32,
    send_index: u32,
    #[serde(default)]
    volume_db: Option<f64>,
    #[serde(default)]
    pan: Option<f64>,
}

fn set_send_volume_pan(daw: &mut dyn Daw, args: SetSendVolumePanArgs) -> ToolResult<Value> {
    if args.volume_db.is_none() && args.pan.is_none() {
        return Err(ToolError::invalid(
            "Provide at least one of 'volume_db' or 'pan'.",
        ));
    }
    let (track, send) = (args.track_index, args.send_index);
    let track_name = validate_track(daw, track)?;
    validate_send(daw, track, &track_name, SendCategory::Send, send)?;
    let label = format!("Set send {} vol/pan on track '{}'", send, track_name);
    let changes = undoable(daw, &label, |daw| {
        let mut changes = vec![];
        if let Some(db) = args.volume_db {
            daw.set_send_volume(track, SendCategory::Send, send, db_to_linear(db))?;
            changes.push(format!("volume={:.2} dB", db));
        }
        if let Some(pan) = args.pan {
            daw.set_send_pan(track, SendCategory::Send, send, pan)?;
            changes.push(format!("pan={:.4}", pan));
        }
        Ok(changes)
    })?;
    let info = daw.send_info(track, SendCategory::Send, send)?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "send_index": send,
        "volume_db": round_to(linear_to_db(info.volume), 2),
        "pan": round_to(info.pan, 4),
        "changes_applied": changes,
    }))
}

#[derive(Deserialize)]
struct SetSendMuteArgs {
    track_index: u32,
    send_index: u32,
    muted: bool,
}

fn set_send_mute(daw: &mut dyn Daw, args: SetSendMuteArgs) -> ToolResult<Value> {
    let (track, send) = (args.track_index, args.send_index);
    let track_name = validate_track(daw, track)?;
    validate_send(daw, track, &track_name, SendCategory::Send, send)?;
    let verb = if args.muted { "Mute" } else { "Unmute" };
    let label = format!("{} send {} on track '{}'", verb, send, track_name);
    undoable(daw, &label, |daw| {
        Ok(daw.set_send_muted(track, SendCategory::Send, send, args.muted)?)
    })?;
    Ok(json!({
        "track_index": track,
        "track_name": track_name,
        "send_index": send,
        "muted": args.muted,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;

    fn routed() -> FakeDaw {
        let mut daw = FakeDaw::with_tracks(&["Drums", "Bass", "Bus"]);
        call(
            &mut daw,
            "create_send",
            json!({"src_track_index": 0, "dst_track_index": 2}),
        )
        .unwrap();
        call(
            &mut daw,
            "create_send",
            json!({"src_track_index": 1, "dst_track_index": 2}),
        )
        .unwrap();
        daw
    }

    #[test]
    fn sends_and_receives() {
        let mut daw = routed();
        assert_eq!(daw.last_undo_label(), Some("Create send from 'Bass' to 'Bus'"));
        let sends = call(&mut daw, "list_track_sends", json!({"track_index": 0})).unwrap();
        assert_eq!(
            sends,
            json!({
                "track_index": 0,
                "track_name": "Drums",
                "n_sends": 1,
                "sends": [{
                    "index": 0,
                    "dest_track": "Bus",
                    "volume_db": 0.0,
                    "pan": 0.0,
                    "muted": false,
                }],
            })
        );
        let receives = call(&mut daw, "list_track_receives", json!({"track_index": 2})).unwrap();
        assert_eq!(receives["n_receives"], json!(2));
        assert_eq!(receives["receives"][1]["src_track"], json!("Bass"));
    }

    #[test]
    fn send_to_itself() {
        let mut daw = FakeDaw::with_tracks(&["Drums"]);
        assert_eq!(
            call_err(
                &mut daw,
                "create_send",
                json!({"src_track_index": 0, "dst_track_index": 0})
            ),
            "Cannot create a send from a track to itself."
        );
        assert!(daw.undo_history.is_empty());
    }

    #[test]
    fn volume_and_pan() {
        let mut daw = routed();
        assert_eq!(
            call_err(
                &mut daw,
                "set_send_volume_pan",
                json!({"track_index": 0, "send_index": 0})
            ),
            "Provide at least one of 'volume_db' or 'pan'."
        );
        let result = call(
            &mut daw,
            "set_send_volume_pan",
            json!({"track_index": 0, "send_index": 0, "volume_db": -6.0, "pan": -0.5}),
        )
        .unwrap();
        assert_eq!(result["volume_db"], json!(-6.0));
        assert_eq!(result["pan"], json!(-0.5));
        assert_eq!(
            result["changes_applied"],
            json!(["volume=-6.00 dB", "pan=-0.5000"])
        );
        assert_eq!(
            call_err(
                &mut daw,
                "set_send_mute",
                json!({"track_index": 0, "send_index": 1, "muted": true})
            ),
            "Send index 1 out of range on track 'Drums'. Track has 1 send (valid: 0–0)."
        );
    }

    #[test]
    fn mute_and_remove() {
        let mut daw = routed();
        call(
            &mut daw,
            "set_send_mute",
            json!({"track_index": 1, "send_index": 0, "muted": true}),
        )
        .unwrap();
        assert!(daw.tracks[1].sends[0].muted);
        let removed = call(
            &mut daw,
            "remove_send",
            json!({"track_index": 1, "send_index": 0}),
        )
        .unwrap();
        assert_eq!(removed["removed_dest_track"], json!("Bus"));
        assert_eq!(daw.last_undo_label(), Some("Remove send 0 from track 'Bass'"));
        assert!(daw.tracks[1].sends.is_empty());
    }
}
