//! Project information and transport control.
use crate::helpers::undoable;
use crate::{NoArgs, ToolDef, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("get_project_info", get_project_info)
            .description(
                "Get current REAPER project information.\n\n\
                 Returns project name, file path, BPM, time signature, track count, project \
                 length, sample rate, and dirty (unsaved changes) flag.",
            )
            .failure_context("get project info")
            .read_only(),
        ToolDef::new("get_transport_state", get_transport_state)
            .description(
                "Get the current transport state (play, pause, record, cursor position).\n\n\
                 Returns booleans for is_playing, is_paused, is_recording, is_stopped, plus the \
                 edit cursor position and the current play position in seconds.",
            )
            .failure_context("get transport state")
            .read_only(),
        ToolDef::new("set_cursor_position", set_cursor_position)
            .description("Move the edit cursor to the specified position in seconds.")
            .failure_context("set cursor position")
            .params(vec![
                Param::number("position", "New cursor position in seconds").min(0.0)
            ]),
        ToolDef::new("transport_play", transport_play)
            .description("Start playback in the current project.")
            .failure_context("start playback"),
        ToolDef::new("transport_stop", transport_stop)
            .description("Stop playback or recording in the current project.")
            .failure_context("stop transport"),
        ToolDef::new("transport_pause", transport_pause)
            .description("Pause playback in the current project.")
            .failure_context("pause transport"),
        ToolDef::new("transport_record", transport_record)
            .description(
                "Start recording in the current project.\n\n\
                 WARNING: This is a destructive operation that writes audio data to disk. \
                 Ensure record-armed tracks and input monitoring are configured correctly.",
            )
            .failure_context("start recording")
            .destructive(),
        ToolDef::new("save_project", save_project)
            .description("Save the current project, optionally to a new file path.")
            .failure_context("save project")
            .params(vec![Param::string(
                "path",
                "Optional file path to save as. If omitted, saves to the current project path.",
            )
            .optional()]),
    ]
}

fn get_project_info(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let info = daw.project_info()?;
    Ok(json!({
        "name": info.name,
        "path": info.path,
        "bpm": info.bpm,
        "time_signature": {
            "beats_per_measure": info.beats_per_measure,
            "beat_value": info.beat_value,
        },
        "n_tracks": info.track_count,
        "length": info.length,
        "sample_rate": info.sample_rate,
        "is_dirty": info.is_dirty,
    }))
}

fn get_transport_state(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let state = daw.play_state()?;
    Ok(json!({
        "is_playing": state.is_playing,
        "is_paused": state.is_paused,
        "is_recording": state.is_recording,
        "is_stopped": state.is_stopped(),
        "cursor_position": daw.cursor_position()?,
        "play_position": daw.play_position()?,
    }))
}

#[derive(Deserialize)]
struct SetCursorPositionArgs {
    position: f64,
}

fn set_cursor_position(daw: &mut dyn Daw, args: SetCursorPositionArgs) -> ToolResult<Value> {
    undoable(daw, "Set cursor position", |daw| {
        Ok(daw.set_cursor_position(args.position)?)
    })?;
    Ok(json!({ "cursor_position": daw.cursor_position()? }))
}

fn transport_play(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    daw.play()?;
    Ok(json!({"status": "playing"}))
}

fn transport_stop(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    daw.stop()?;
    Ok(json!({"status": "stopped"}))
}

fn transport_pause(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    daw.pause()?;
    Ok(json!({"status": "paused"}))
}

fn transport_record(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    daw.record()?;
    Ok(json!({"status": "recording"}))
}

#[derive(Deserialize)]
struct SaveProjectArgs {
    #[serde(default)]
    path: Option<String>,
}

fn save_project(daw: &mut dyn Daw, args: SaveProjectArgs) -> ToolResult<Value> {
    daw.save_project(args.path.as_deref())?;
    let path = match args.path.filter(|p| !p.is_empty()) {
        Some(p) => Some(p),
        None => daw.project_info()?.path,
    };
    Ok(json!({"saved": true, "path": path}))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::{FakeDaw, FakeItem};
    use serde_json::json;

    #[test]
    fn project_info() {
        let mut daw = FakeDaw::with_tracks(&["Drums", "Bass"]);
        daw.beats_per_measure = 7;
        daw.beat_value = 8;
        daw.push_item(1, FakeItem::new(10.0, 2.5));
        let info = call(&mut daw, "get_project_info", json!({})).unwrap();
        assert_eq!(
            info,
            json!({
                "name": "",
                "path": null,
                "bpm": 120.0,
                "time_signature": {"beats_per_measure": 7, "beat_value": 8},
                "n_tracks": 2,
                "length": 12.5,
                "sample_rate": 44100,
                "is_dirty": false,
            })
        );
    }

    #[test]
    fn transport() {
        let mut daw = FakeDaw::new();
        let state = call(&mut daw, "get_transport_state", json!({})).unwrap();
        assert_eq!(state["is_stopped"], json!(true));
        assert_eq!(
            call(&mut daw, "transport_record", json!({})).unwrap(),
            json!({"status": "recording"})
        );
        let state = call(&mut daw, "get_transport_state", json!({})).unwrap();
        assert_eq!(state["is_recording"], json!(true));
        assert_eq!(state["is_stopped"], json!(false));
        call(&mut daw, "transport_stop", json!({})).unwrap();
        call(&mut daw, "transport_pause", json!({})).unwrap();
        assert!(daw.play_state.is_paused);
        assert!(daw.undo_history.is_empty());
    }

    #[test]
    fn play_starts_at_cursor() {
        let mut daw = FakeDaw::new();
        daw.cursor = 8.0;
        assert_eq!(
            call(&mut daw, "transport_play", json!({})).unwrap(),
            json!({"status": "playing"})
        );
        let state = call(&mut daw, "get_transport_state", json!({})).unwrap();
        assert_eq!(state["is_playing"], json!(true));
        assert_eq!(state["is_stopped"], json!(false));
        assert_eq!(daw.play_position, 8.0);
        assert!(daw.undo_history.is_empty());
    }

    #[test]
    fn cursor() {
        let mut daw = FakeDaw::new();
        assert_eq!(
            call(&mut daw, "set_cursor_position", json!({"position": 4.5})).unwrap(),
            json!({"cursor_position": 4.5})
        );
        assert_eq!(daw.last_undo_label(), Some("Set cursor position"));
        assert_eq!(
            call_err(&mut daw, "set_cursor_position", json!({"position": -1})),
            "Invalid argument 'position': must be >= 0, got -1."
        );
    }

    #[test]
    fn save() {
        let mut daw = FakeDaw::new();
        daw.project_path = Some("/music/song.rpp".to_string());
        assert_eq!(
            call(&mut daw, "save_project", json!({})).unwrap(),
            json!({"saved": true, "path": "/music/song.rpp"})
        );
        assert_eq!(
            call(&mut daw, "save_project", json!({"path": "/music/copy.rpp"})).unwrap(),
            json!({"saved": true, "path": "/music/copy.rpp"})
        );
        assert_eq!(daw.project_name, "copy.rpp");
        daw.failing.insert("Main_SaveProjectEx");
        assert_eq!(
            call_err(&mut daw, "save_project", json!({})),
            "Failed to save project: REAPER function Main_SaveProjectEx failed"
        );
    }
}
