//! Media import and rendering.
use crate::helpers::{undoable, validate_track};
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

/// "File: Render project, using the most recent render settings"
const RENDER_WITH_LAST_SETTINGS: i32 = 41824;

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("insert_media", insert_media)
            .description(
                "Insert an audio or MIDI file as a new item on a track.\n\n\
                 The track is selected and the edit cursor is moved to the given position before \
                 the file is inserted.",
            )
            .failure_context("insert media")
            .params(vec![
                Param::string("file_path", "Absolute path of the media file to insert"),
                Param::integer("track_index", "Zero-based index of the target track").min(0.0),
                Param::number("position", "Insert position in seconds")
                    .min(0.0)
                    .default_value(json!(0.0)),
            ]),
        ToolDef::new("render_project", render_project)
            .description(
                "Render the project using the most recent render settings.\n\n\
                 Configure the output format and path in REAPER's render dialog first. The \
                 render blocks REAPER until it is finished.",
            )
            .failure_context("render project"),
    ]
}

#[derive(Deserialize)]
struct InsertMediaArgs {
    file_path: String,
    track_index: u32,
    #[serde(default)]
    position: f64,
}

fn insert_media(daw: &mut dyn Daw, args: InsertMediaArgs) -> ToolResult<Value> {
    if !Path::new(&args.file_path).is_file() {
        return Err(ToolError::invalid(format!(
            "File not found: '{}'.",
            args.file_path
        )));
    }
    let track_name = validate_track(daw, args.track_index)?;
    let inserted = undoable(daw, "Insert media", |daw| {
        daw.select_track_exclusively(args.track_index)?;
        daw.set_cursor_position(args.position)?;
        Ok(daw.insert_media(&args.file_path)?)
    })?;
    if !inserted {
        return Err(ToolError::invalid(format!(
            "REAPER failed to insert media file '{}'.",
            args.file_path
        )));
    }
    Ok(json!({
        "file_path": args.file_path,
        "track_index": args.track_index,
        "track_name": track_name,
        "position": args.position,
    }))
}

fn render_project(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    tracing::info!(msg = "Rendering project with most recent settings");
    daw.run_command(RENDER_WITH_LAST_SETTINGS)?;
    Ok(json!({"rendered": true, "action_id": RENDER_WITH_LAST_SETTINGS}))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;

    #[test]
    fn insert_media() {
        let mut daw = FakeDaw::with_tracks(&["Drums", "Bass"]);
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let result = call(
            &mut daw,
            "insert_media",
            json!({"file_path": path, "track_index": 1, "position": 2.0}),
        )
        .unwrap();
        assert_eq!(result["track_name"], json!("Bass"));
        assert_eq!(daw.inserted_media.len(), 1);
        assert_eq!(daw.inserted_media[0].track, 1);
        assert_eq!(daw.inserted_media[0].position, 2.0);
        assert_eq!(daw.tracks[1].items.len(), 1);
        assert_eq!(daw.last_undo_label(), Some("Insert media"));
    }

    #[test]
    fn missing_file() {
        let mut daw = FakeDaw::with_tracks(&["Drums"]);
        assert_eq!(
            call_err(
                &mut daw,
                "insert_media",
                json!({"file_path": "/nonexistent/kick.wav", "track_index": 0})
            ),
            "File not found: '/nonexistent/kick.wav'."
        );
    }

    #[test]
    fn render() {
        let mut daw = FakeDaw::new();
        call(&mut daw, "render_project", json!({})).unwrap();
        assert_eq!(daw.executed_commands, vec![41824]);
    }
}
