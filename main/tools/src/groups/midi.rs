//! MIDI items, notes and CC events. Notes and events live in the active take of an item.
use crate::helpers::{plural, undoable, validate_active_take, validate_track};
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::{Daw, MidiCc, MidiNote, CONTROL_CHANGE};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("create_midi_item", create_midi_item)
            .description(
                "Create a new empty MIDI item on a track.\n\n\
                 Returns the position and length of the newly created item.",
            )
            .failure_context("create MIDI item")
            .params(vec![
                track_index(),
                Param::number("position", "Start position in seconds").min(0.0),
                Param::number("length", "Length of the MIDI item in seconds").above(0.0),
            ]),
        ToolDef::new("list_midi_notes", list_midi_notes)
            .description(
                "List all MIDI notes in an item's active take.\n\n\
                 Returns each note's index, pitch, velocity, start/end PPQ positions, channel, \
                 muted state, and selected state.",
            )
            .failure_context("list MIDI notes")
            .params(vec![track_index(), item_index()])
            .read_only(),
        ToolDef::new("add_midi_note", add_midi_note)
            .description(
                "Add a MIDI note to an item's active take.\n\n\
                 The note is inserted and the MIDI data is sorted afterwards.",
            )
            .failure_context("add MIDI note")
            .params(vec![
                track_index(),
                item_index(),
                Param::integer("pitch", "MIDI note number (0-127, where 60 = middle C)")
                    .range(0.0, 127.0),
                Param::integer("velocity", "MIDI velocity (1-127)").range(1.0, 127.0),
                ppq("start_ppq"),
                Param::integer(
                    "end_ppq",
                    "End position in PPQ ticks (must be > start_ppq)",
                )
                .above(0.0),
                channel().default_value(json!(0)),
                Param::boolean("selected", "Whether the note is selected")
                    .default_value(json!(false)),
                Param::boolean("muted", "Whether the note is muted").default_value(json!(false)),
            ]),
        ToolDef::new("delete_midi_note", delete_midi_note)
            .description(
                "Delete a MIDI note by index from an item's active take.\n\n\
                 WARNING: Note indices may shift after deletion. Re-query with list_midi_notes \
                 to get updated indices.",
            )
            .failure_context("delete MIDI note")
            .params(vec![track_index(), item_index(), note_index()])
            .destructive(),
        ToolDef::new("set_midi_note", set_midi_note)
            .description(
                "Edit an existing MIDI note's properties.\n\n\
                 Only provided fields are changed; omitted fields keep their current values. The \
                 MIDI data is re-sorted after modification.",
            )
            .failure_context("set MIDI note")
            .params(vec![
                track_index(),
                item_index(),
                note_index(),
                Param::integer("pitch", "New pitch (0-127). Omit to keep current.")
                    .range(0.0, 127.0)
                    .optional(),
                Param::integer("velocity", "New velocity (1-127). Omit to keep current.")
                    .range(1.0, 127.0)
                    .optional(),
                Param::integer("start_ppq", "New start PPQ. Omit to keep current.")
                    .min(0.0)
                    .optional(),
                Param::integer("end_ppq", "New end PPQ. Omit to keep current.")
                    .above(0.0)
                    .optional(),
                Param::integer("channel", "New channel (0-15). Omit to keep current.")
                    .range(0.0, 15.0)
                    .optional(),
                Param::boolean("muted", "New muted state. Omit to keep current.").optional(),
            ]),
        ToolDef::new("list_midi_cc", list_midi_cc)
            .description(
                "List all MIDI CC events in an item's active take.\n\n\
                 Returns each CC event's index, ppq position, CC number (msg2), CC value (msg3), \
                 channel, channel message type, muted state, and selected state.",
            )
            .failure_context("list MIDI CC events")
            .params(vec![track_index(), item_index()])
            .read_only(),
        ToolDef::new("add_midi_cc", add_midi_cc)
            .description(
                "Add a MIDI CC event to an item's active take.\n\n\
                 Inserts a Control Change message (status byte 0xB0 / 176) and sorts the MIDI \
                 data afterwards.",
            )
            .failure_context("add MIDI CC event")
            .params(vec![
                track_index(),
                item_index(),
                Param::integer("cc_num", "MIDI CC number (0-127)").range(0.0, 127.0),
                Param::integer("value", "MIDI CC value (0-127)").range(0.0, 127.0),
                ppq("ppq_position"),
                channel().default_value(json!(0)),
            ]),
        ToolDef::new("delete_midi_cc", delete_midi_cc)
            .description(
                "Delete a MIDI CC event by index from an item's active take.\n\n\
                 WARNING: CC event indices may shift after deletion. Re-query with list_midi_cc \
                 to get updated indices.",
            )
            .failure_context("delete MIDI CC event")
            .params(vec![
                track_index(),
                item_index(),
                Param::integer(
                    "cc_index",
                    "Zero-based CC event index within the MIDI take",
                )
                .min(0.0),
            ])
            .destructive(),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn item_index() -> Param {
    Param::integer("item_index", "Zero-based item index on the track").min(0.0)
}

fn note_index() -> Param {
    Param::integer("note_index", "Zero-based note index within the MIDI take").min(0.0)
}

fn ppq(name: &'static str) -> Param {
    Param::integer(name, "Position in PPQ (pulses per quarter note) ticks").min(0.0)
}

fn channel() -> Param {
    Param::integer("channel", "MIDI channel (0-15)").range(0.0, 15.0)
}

/// Makes sure the item has an active take which can hold MIDI.
fn validate_take(daw: &dyn Daw, track: u32, item: u32) -> ToolResult<()> {
    let track_name = validate_track(daw, track)?;
    validate_active_take(daw, track, &track_name, item)?;
    Ok(())
}

fn validate_note(daw: &dyn Daw, track: u32, item: u32, note: u32) -> ToolResult<MidiNote> {
    let n = daw.midi_note_count(track, item)?;
    if note >= n {
        return Err(ToolError::invalid(format!(
            "Note index {} out of range. Take has {} note{} (valid: 0-{}).",
            note,
            n,
            plural(n),
            n as i64 - 1
        )));
    }
    Ok(daw.midi_note(track, item, note)?)
}

#[derive(Deserialize)]
struct CreateMidiItemArgs {
    track_index: u32,
    position: f64,
    length: f64,
}

fn create_midi_item(daw: &mut dyn Daw, args: CreateMidiItemArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    undoable(daw, "Create MIDI item", |daw| {
        Ok(daw.create_midi_item(
            args.track_index,
            args.position,
            args.position + args.length,
        )?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "position": args.position,
        "length": args.length,
    }))
}

#[derive(Deserialize)]
struct ItemArgs {
    track_index: u32,
    item_index: u32,
}

fn list_midi_notes(daw: &mut dyn Daw, args: ItemArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    let n = daw.midi_note_count(track, item)?;
    let mut notes = Vec::with_capacity(n as usize);
    for i in 0..n {
        let note = daw.midi_note(track, item, i)?;
        notes.push(json!({
            "index": i,
            "pitch": note.pitch,
            "velocity": note.velocity,
            "start_ppq": note.start_ppq,
            "end_ppq": note.end_ppq,
            "channel": note.channel,
            "muted": note.muted,
            "selected": note.selected,
        }));
    }
    Ok(json!({"n_notes": n, "notes": notes}))
}

#[derive(Deserialize)]
struct AddMidiNoteArgs {
    track_index: u32,
    item_index: u32,
    pitch: u8,
    velocity: u8,
    start_ppq: u64,
    end_ppq: u64,
    #[serde(default)]
    channel: u8,
    #[serde(default)]
    selected: bool,
    #[serde(default)]
    muted: bool,
}

fn add_midi_note(daw: &mut dyn Daw, args: AddMidiNoteArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    let note = MidiNote {
        selected: args.selected,
        muted: args.muted,
        start_ppq: args.start_ppq as f64,
        end_ppq: args.end_ppq as f64,
        channel: args.channel,
        pitch: args.pitch,
        velocity: args.velocity,
    };
    undoable(daw, "Add MIDI note", |daw| {
        daw.insert_midi_note(track, item, &note)?;
        Ok(daw.sort_midi(track, item)?)
    })?;
    Ok(json!({
        "pitch": args.pitch,
        "velocity": args.velocity,
        "start_ppq": args.start_ppq,
        "end_ppq": args.end_ppq,
        "channel": args.channel,
        "selected": args.selected,
        "muted": args.muted,
    }))
}

#[derive(Deserialize)]
struct NoteArgs {
    track_index: u32,
    item_index: u32,
    note_index: u32,
}

fn delete_midi_note(daw: &mut dyn Daw, args: NoteArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    validate_note(daw, track, item, args.note_index)?;
    undoable(daw, "Delete MIDI note", |daw| {
        Ok(daw.delete_midi_note(track, item, args.note_index)?)
    })?;
    Ok(json!({"deleted_note_index": args.note_index}))
}

#[derive(Deserialize)]
struct SetMidiNoteArgs {
    track_index: u32,
    item_index: u32,
    note_index: u32,
    #[serde(default)]
    pitch: Option<u8>,
    #[serde(default)]
    velocity: Option<u8>,
    #[serde(default)]
    start_ppq: Option<u64>,
    #[serde(default)]
    end_ppq: Option<u64>,
    #[serde(default)]
    channel: Option<u8>,
    #[serde(default)]
    muted: Option<bool>,
}

fn set_midi_note(daw: &mut dyn Daw, args: SetMidiNoteArgs) -> ToolResult<Value> {
    let (track, item, index) = (args.track_index, args.item_index, args.note_index);
    validate_take(daw, track, item)?;
    let current = validate_note(daw, track, item, index)?;
    let note = MidiNote {
        selected: current.selected,
        muted: args.muted.unwrap_or(current.muted),
        start_ppq: args.start_ppq.map_or(current.start_ppq, |p| p as f64),
        end_ppq: args.end_ppq.map_or(current.end_ppq, |p| p as f64),
        channel: args.channel.unwrap_or(current.channel),
        pitch: args.pitch.unwrap_or(current.pitch),
        velocity: args.velocity.unwrap_or(current.velocity),
    };
    undoable(daw, "Set MIDI note", |daw| {
        daw.set_midi_note(track, item, index, &note)?;
        Ok(daw.sort_midi(track, item)?)
    })?;
    Ok(json!({
        "note_index": index,
        "pitch": note.pitch,
        "velocity": note.velocity,
        "start_ppq": note.start_ppq,
        "end_ppq": note.end_ppq,
        "channel": note.channel,
        "muted": note.muted,
        "selected": note.selected,
    }))
}

fn list_midi_cc(daw: &mut dyn Daw, args: ItemArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    let n = daw.midi_cc_count(track, item)?;
    let mut events = Vec::with_capacity(n as usize);
    for i in 0..n {
        let cc = daw.midi_cc(track, item, i)?;
        events.push(json!({
            "index": i,
            "ppq_position": cc.ppq_position,
            "cc_num": cc.msg2,
            "value": cc.msg3,
            "channel": cc.channel,
            "chanmsg": cc.chan_msg,
            "muted": cc.muted,
            "selected": cc.selected,
        }));
    }
    Ok(json!({"n_cc_events": n, "cc_events": events}))
}

#[derive(Deserialize)]
struct AddMidiCcArgs {
    track_index: u32,
    item_index: u32,
    cc_num: u8,
    value: u8,
    ppq_position: u64,
    #[serde(default)]
    channel: u8,
}

fn add_midi_cc(daw: &mut dyn Daw, args: AddMidiCcArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    let cc = MidiCc {
        selected: false,
        muted: false,
        ppq_position: args.ppq_position as f64,
        chan_msg: CONTROL_CHANGE,
        channel: args.channel,
        msg2: args.cc_num,
        msg3: args.value,
    };
    undoable(daw, "Add MIDI CC", |daw| {
        daw.insert_midi_cc(track, item, &cc)?;
        Ok(daw.sort_midi(track, item)?)
    })?;
    Ok(json!({
        "cc_num": args.cc_num,
        "value": args.value,
        "ppq_position": args.ppq_position,
        "channel": args.channel,
    }))
}

#[derive(Deserialize)]
struct CcArgs {
    track_index: u32,
    item_index: u32,
    cc_index: u32,
}

fn delete_midi_cc(daw: &mut dyn Daw, args: CcArgs) -> ToolResult<Value> {
    let (track, item) = (args.track_index, args.item_index);
    validate_take(daw, track, item)?;
    let n = daw.midi_cc_count(track, item)?;
    if args.cc_index >= n {
        return Err(ToolError::invalid(format!(
            "CC index {} out of range. Take has {} CC event{} (valid: 0-{}).",
            args.cc_index,
            n,
            plural(n),
            n as i64 - 1
        )));
    }
    undoable(daw, "Delete MIDI CC", |daw| {
        Ok(daw.delete_midi_cc(track, item, args.cc_index)?)
    })?;
    Ok(json!({"deleted_cc_index": args.cc_index}))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;

    fn daw_with_midi_item() -> FakeDaw {
        let mut daw = FakeDaw::with_tracks(&["Keys"]);
        call(
            &mut daw,
            "create_midi_item",
            json!({"track_index": 0, "position": 0.0, "length": 2.0}),
        )
        .unwrap();
        daw
    }

    fn add_note(daw: &mut FakeDaw, pitch: u8, start: u32) {
        call(
            daw,
            "add_midi_note",
            json!({
                "track_index": 0,
                "item_index": 0,
                "pitch": pitch,
                "velocity": 100,
                "start_ppq": start,
                "end_ppq": start + 240,
            }),
        )
        .unwrap();
    }

    #[test]
    fn notes_are_sorted() {
        let mut daw = daw_with_midi_item();
        assert_eq!(daw.tracks[0].items[0].length, 2.0);
        add_note(&mut daw, 64, 960);
        add_note(&mut daw, 60, 0);
        let notes = call(
            &mut daw,
            "list_midi_notes",
            json!({"track_index": 0, "item_index": 0}),
        )
        .unwrap();
        assert_eq!(notes["n_notes"], json!(2));
        assert_eq!(
            notes["notes"][0],
            json!({
                "index": 0,
                "pitch": 60,
                "velocity": 100,
                "start_ppq": 0.0,
                "end_ppq": 240.0,
                "channel": 0,
                "muted": false,
                "selected": false,
            })
        );
        assert_eq!(daw.last_undo_label(), Some("Add MIDI note"));
    }

    #[test]
    fn set_note_partially() {
        let mut daw = daw_with_midi_item();
        add_note(&mut daw, 60, 0);
        add_note(&mut daw, 62, 480);
        let result = call(
            &mut daw,
            "set_midi_note",
            json!({"track_index": 0, "item_index": 0, "note_index": 0, "start_ppq": 960, "muted": true}),
        )
        .unwrap();
        assert_eq!(result["pitch"], json!(60));
        assert_eq!(result["start_ppq"], json!(960.0));
        assert_eq!(result["end_ppq"], json!(240.0));
        let notes = &daw.tracks[0].items[0].takes[0].notes;
        assert_eq!(notes[0].pitch, 62);
        assert!(notes[1].muted);
        assert_eq!(
            call_err(
                &mut daw,
                "set_midi_note",
                json!({"track_index": 0, "item_index": 0, "note_index": 0, "velocity": 0})
            ),
            "Invalid argument 'velocity': must be >= 1, got 0."
        );
    }

    #[test]
    fn delete_note_out_of_range() {
        let mut daw = daw_with_midi_item();
        add_note(&mut daw, 60, 0);
        assert_eq!(
            call_err(
                &mut daw,
                "delete_midi_note",
                json!({"track_index": 0, "item_index": 0, "note_index": 1})
            ),
            "Note index 1 out of range. Take has 1 note (valid: 0-0)."
        );
        call(
            &mut daw,
            "delete_midi_note",
            json!({"track_index": 0, "item_index": 0, "note_index": 0}),
        )
        .unwrap();
        assert!(daw.tracks[0].items[0].takes[0].notes.is_empty());
    }

    #[test]
    fn control_changes() {
        let mut daw = daw_with_midi_item();
        for (cc_num, ppq) in [(1, 480), (7, 0)] {
            call(
                &mut daw,
                "add_midi_cc",
                json!({
                    "track_index": 0,
                    "item_index": 0,
                    "cc_num": cc_num,
                    "value": 64,
                    "ppq_position": ppq,
                    "channel": 2,
                }),
            )
            .unwrap();
        }
        let events = call(
            &mut daw,
            "list_midi_cc",
            json!({"track_index": 0, "item_index": 0}),
        )
        .unwrap();
        assert_eq!(
            events["cc_events"][0],
            json!({
                "index": 0,
                "ppq_position": 0.0,
                "cc_num": 7,
                "value": 64,
                "channel": 2,
                "chanmsg": 176,
                "muted": false,
                "selected": false,
            })
        );
        assert_eq!(
            call_err(
                &mut daw,
                "delete_midi_cc",
                json!({"track_index": 0, "item_index": 0, "cc_index": 2})
            ),
            "CC index 2 out of range. Take has 2 CC events (valid: 0-1)."
        );
        call(
            &mut daw,
            "delete_midi_cc",
            json!({"track_index": 0, "item_index": 0, "cc_index": 0}),
        )
        .unwrap();
        assert_eq!(daw.tracks[0].items[0].takes[0].ccs[0].msg2, 1);
    }
}
