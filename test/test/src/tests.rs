use crate::api::{step, TestStep};
use serde_json::json;

/// Section used for ext state written by the steps.
const TEST_SECTION: &str = "scythe_integration_test";

/// Creates all integration test steps to be executed. The order matters!
pub fn create_test_steps() -> impl Iterator<Item = TestStep> {
    let project_and_tracks = vec![
        empty_scratch_project(),
        add_tracks(),
        rename_track(),
        set_track_volume_and_pan(),
        set_track_mute_solo_and_arm(),
        set_track_color(),
        track_index_out_of_range(),
    ];
    let routing_and_fx = vec![
        create_and_remove_send(),
        add_track_fx(),
        set_track_fx_param(),
        disable_track_fx(),
        copy_track_fx(),
    ];
    let timeline = vec![
        add_and_delete_marker(),
        add_region(),
        add_and_delete_tempo_marker(),
        set_time_selection_and_loop(),
        set_cursor_position(),
    ];
    let items_and_midi = vec![
        add_split_and_delete_items(),
        create_midi_item_with_notes(),
        add_midi_cc(),
        create_fx_envelope_with_points(),
    ];
    let misc = vec![
        ext_state_round_trip(),
        perform_action(),
        run_lua_script_with_result(),
        query_devices(),
    ];
    project_and_tracks
        .into_iter()
        .chain(routing_and_fx)
        .chain(timeline)
        .chain(items_and_midi)
        .chain(misc)
}

fn empty_scratch_project() -> TestStep {
    step("Empty scratch project", |ctx| {
        // When
        let info = ctx.call("get_project_info", json!({}))?;
        let tracks = ctx.call("list_tracks", json!({}))?;
        // Then
        assert_eq!(info["n_tracks"], json!(0));
        assert_eq!(tracks, json!({"n_tracks": 0, "tracks": []}));
        assert!(info["sample_rate"].is_number());
        Ok(())
    })
}

fn add_tracks() -> TestStep {
    step("Add tracks", |ctx| {
        // When
        let first = ctx.call("add_track", json!({"name": "Drums"}))?;
        let second = ctx.call("add_track", json!({"name": "Bass"}))?;
        let inserted = ctx.call("add_track", json!({"name": "Bus", "index": 0}))?;
        // Then
        assert_eq!(first["index"], json!(0));
        assert_eq!(second["index"], json!(1));
        assert_eq!(inserted["index"], json!(0));
        assert_eq!(inserted["n_tracks"], json!(3));
        let tracks = ctx.call("list_tracks", json!({}))?;
        let names: Vec<_> = tracks["tracks"]
            .as_array()
            .ok_or("tracks isn't an array")?
            .iter()
            .map(|t| t["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Bus"), json!("Drums"), json!("Bass")]);
        Ok(())
    })
}

fn rename_track() -> TestStep {
    step("Rename track", |ctx| {
        // When
        let result = ctx.call("set_track_name", json!({"track_index": 2, "name": "Synth"}))?;
        // Then
        assert_eq!(result, json!({"index": 2, "name": "Synth"}));
        let info = ctx.call("get_track_info", json!({"track_index": 2}))?;
        assert_eq!(info["name"], json!("Synth"));
        Ok(())
    })
}

fn set_track_volume_and_pan() -> TestStep {
    step("Set track volume and pan", |ctx| {
        // When
        ctx.call("set_track_volume", json!({"track_index": 1, "volume_db": -6.0}))?;
        ctx.call("set_track_pan", json!({"track_index": 1, "pan": -0.5}))?;
        // Then
        let info = ctx.call("get_track_info", json!({"track_index": 1}))?;
        assert_approx!(info["volume_db"], -6.0);
        assert_approx!(info["pan"], -0.5);
        Ok(())
    })
}

fn set_track_mute_solo_and_arm() -> TestStep {
    step("Set track mute, solo and record arm", |ctx| {
        // When
        let solo = ctx.call(
            "set_track_mute_solo",
            json!({"track_index": 1, "mute": true, "solo": true}),
        )?;
        let unmuted = ctx.call("set_track_mute_solo", json!({"track_index": 1, "mute": false}))?;
        let armed = ctx.call("set_track_record_arm", json!({"track_index": 1, "armed": true}))?;
        // Then
        assert_eq!(solo, json!({"index": 1, "muted": true, "soloed": true}));
        assert_eq!(unmuted, json!({"index": 1, "muted": false, "soloed": true}));
        assert_eq!(armed, json!({"index": 1, "armed": true}));
        ctx.call(
            "set_track_mute_solo",
            json!({"track_index": 1, "solo": false}),
        )?;
        ctx.call("set_track_record_arm", json!({"track_index": 1, "armed": false}))?;
        Ok(())
    })
}

fn set_track_color() -> TestStep {
    step("Set track color", |ctx| {
        // When
        let result = ctx.call(
            "set_track_color",
            json!({"track_index": 0, "r": 200, "g": 100, "b": 50}),
        )?;
        // Then
        assert_eq!(result["color"], json!([200, 100, 50]));
        let info = ctx.call("get_track_info", json!({"track_index": 0}))?;
        assert_eq!(info["color"], json!([200, 100, 50]));
        Ok(())
    })
}

fn track_index_out_of_range() -> TestStep {
    step("Track index out of range", |ctx| {
        // When
        let msg = ctx.call_err("get_track_info", json!({"track_index": 99}))?;
        // Then
        assert!(
            msg.starts_with("Track index 99 out of range. Project has 3 tracks"),
            "unexpected error: {}",
            msg
        );
        Ok(())
    })
}

fn create_and_remove_send() -> TestStep {
    step("Create and remove send", |ctx| {
        // When
        let created = ctx.call(
            "create_send",
            json!({"src_track_index": 1, "dst_track_index": 0}),
        )?;
        ctx.call(
            "set_send_volume_pan",
            json!({"track_index": 1, "send_index": 0, "volume_db": -3.0, "pan": 0.25}),
        )?;
        // Then
        assert_eq!(created["send_index"], json!(0));
        let sends = ctx.call("list_track_sends", json!({"track_index": 1}))?;
        assert_eq!(sends["n_sends"], json!(1));
        assert_eq!(sends["sends"][0]["dest_track"], json!("Bus"));
        assert_approx!(sends["sends"][0]["volume_db"], -3.0);
        assert_approx!(sends["sends"][0]["pan"], 0.25);
        let receives = ctx.call("list_track_receives", json!({"track_index": 0}))?;
        assert_eq!(receives["n_receives"], json!(1));
        ctx.call("remove_send", json!({"track_index": 1, "send_index": 0}))?;
        let sends = ctx.call("list_track_sends", json!({"track_index": 1}))?;
        assert_eq!(sends["n_sends"], json!(0));
        Ok(())
    })
}

fn add_track_fx() -> TestStep {
    step("Add track FX", |ctx| {
        // When
        let added = ctx.call("add_track_fx", json!({"track_index": 1, "fx_name": "ReaEQ"}))?;
        // Then
        assert_eq!(added["fx_index"], json!(0));
        let fx = ctx.call("list_track_fx", json!({"track_index": 1}))?;
        assert_eq!(fx["n_fx"], json!(1));
        let name = fx["fx"][0]["name"].as_str().ok_or("FX name missing")?;
        assert!(name.contains("ReaEQ"), "unexpected FX name: {}", name);
        assert_eq!(fx["fx"][0]["is_enabled"], json!(true));
        let msg = ctx.call_err(
            "add_track_fx",
            json!({"track_index": 1, "fx_name": "No such plug-in 4711"}),
        )?;
        assert!(msg.contains("No such plug-in 4711"), "unexpected error: {}", msg);
        Ok(())
    })
}

fn set_track_fx_param() -> TestStep {
    step("Set track FX parameter", |ctx| {
        // Given
        let params = ctx.call(
            "get_track_fx_params",
            json!({"track_index": 1, "fx_index": 0}),
        )?;
        assert!(params["n_params"].as_u64().unwrap_or(0) > 0);
        // When
        let result = ctx.call(
            "set_track_fx_param",
            json!({"track_index": 1, "fx_index": 0, "param_index": 0, "value": 0.25}),
        )?;
        // Then
        assert_eq!(result["param_name"], params["params"][0]["name"]);
        assert!(result["formatted"].is_string());
        let params = ctx.call(
            "get_track_fx_params",
            json!({"track_index": 1, "fx_index": 0}),
        )?;
        assert_approx!(params["params"][0]["value"], 0.25);
        Ok(())
    })
}

fn disable_track_fx() -> TestStep {
    step("Disable track FX", |ctx| {
        // When
        ctx.call(
            "set_track_fx_enabled",
            json!({"track_index": 1, "fx_index": 0, "enabled": false}),
        )?;
        // Then
        let fx = ctx.call("list_track_fx", json!({"track_index": 1}))?;
        assert_eq!(fx["fx"][0]["is_enabled"], json!(false));
        ctx.call(
            "set_track_fx_enabled",
            json!({"track_index": 1, "fx_index": 0, "enabled": true}),
        )?;
        Ok(())
    })
}

fn copy_track_fx() -> TestStep {
    step("Copy track FX", |ctx| {
        // When
        ctx.call(
            "copy_track_fx",
            json!({"src_track_index": 1, "src_fx_index": 0, "dst_track_index": 2}),
        )?;
        // Then
        let source = ctx.call("list_track_fx", json!({"track_index": 1}))?;
        let target = ctx.call("list_track_fx", json!({"track_index": 2}))?;
        assert_eq!(source["n_fx"], json!(1));
        assert_eq!(target["n_fx"], json!(1));
        assert_eq!(target["fx"][0]["name"], source["fx"][0]["name"]);
        ctx.call("remove_track_fx", json!({"track_index": 2, "fx_index": 0}))?;
        let target = ctx.call("list_track_fx", json!({"track_index": 2}))?;
        assert_eq!(target["n_fx"], json!(0));
        Ok(())
    })
}

fn add_and_delete_marker() -> TestStep {
    step("Add and delete marker", |ctx| {
        // When
        let added = ctx.call(
            "add_marker",
            json!({"position": 2.0, "name": "Verse", "r": 255, "g": 0, "b": 0}),
        )?;
        // Then
        let index = added["index"].clone();
        let markers = ctx.call("list_markers", json!({}))?;
        assert_eq!(markers["n_markers"], json!(1));
        assert_eq!(markers["markers"][0]["index"], index);
        assert_eq!(markers["markers"][0]["name"], json!("Verse"));
        assert_eq!(markers["markers"][0]["color"], json!([255, 0, 0]));
        let navigated = ctx.call("go_to_marker", json!({"marker_index": index}))?;
        assert_approx!(navigated["cursor_position"], 2.0);
        ctx.call(
            "delete_marker_or_region",
            json!({"index": index, "is_region": false}),
        )?;
        let markers = ctx.call("list_markers", json!({}))?;
        assert_eq!(markers["n_markers"], json!(0));
        Ok(())
    })
}

fn add_region() -> TestStep {
    step("Add region", |ctx| {
        // When
        ctx.call("add_region", json!({"start": 4.0, "end": 8.0, "name": "Chorus"}))?;
        // Then
        let regions = ctx.call("list_regions", json!({}))?;
        assert_eq!(regions["n_regions"], json!(1));
        assert_approx!(regions["regions"][0]["position"], 4.0);
        assert_approx!(regions["regions"][0]["end"], 8.0);
        let msg = ctx.call_err("add_region", json!({"start": 8.0, "end": 4.0}))?;
        assert!(!msg.is_empty());
        Ok(())
    })
}

fn add_and_delete_tempo_marker() -> TestStep {
    step("Add and delete tempo marker", |ctx| {
        // Given
        let before = ctx.call("get_tempo_info", json!({}))?;
        let n = before["n_tempo_markers"].as_u64().ok_or("marker count missing")?;
        // When
        ctx.call(
            "add_tempo_marker",
            json!({"position": 16.0, "bpm": 90.0, "time_sig_num": 3, "time_sig_denom": 4}),
        )?;
        // Then
        let after = ctx.call("get_tempo_info", json!({}))?;
        assert_eq!(after["n_tempo_markers"], json!(n + 1));
        let added = &after["tempo_markers"][n as usize];
        assert_approx!(added["bpm"], 90.0);
        assert_eq!(added["time_sig_num"], json!(3));
        ctx.call("delete_tempo_marker", json!({"marker_index": n}))?;
        let after = ctx.call("get_tempo_info", json!({}))?;
        assert_eq!(after["n_tempo_markers"], json!(n));
        Ok(())
    })
}

fn set_time_selection_and_loop() -> TestStep {
    step("Set time selection and loop", |ctx| {
        // When
        ctx.call("set_time_selection", json!({"start": 1.0, "end": 3.0}))?;
        ctx.call("set_loop", json!({"enabled": true, "start": 2.0, "end": 6.0}))?;
        // Then
        let selection = ctx.call("get_time_selection", json!({}))?;
        assert_approx!(selection["start"], 1.0);
        assert_approx!(selection["end"], 3.0);
        assert_approx!(selection["length"], 2.0);
        assert_approx!(selection["loop_start"], 2.0);
        assert_approx!(selection["loop_end"], 6.0);
        assert_eq!(selection["loop_enabled"], json!(true));
        ctx.call("set_loop", json!({"enabled": false}))?;
        Ok(())
    })
}

fn set_cursor_position() -> TestStep {
    step("Set cursor position", |ctx| {
        // When
        ctx.call("set_cursor_position", json!({"position": 4.5}))?;
        // Then
        let state = ctx.call("get_transport_state", json!({}))?;
        assert_approx!(state["cursor_position"], 4.5);
        assert_eq!(state["is_stopped"], json!(true));
        Ok(())
    })
}

fn add_split_and_delete_items() -> TestStep {
    step("Add, split and delete items", |ctx| {
        // When
        ctx.call(
            "add_empty_item",
            json!({"track_index": 0, "position": 1.0, "length": 4.0}),
        )?;
        ctx.call(
            "split_item",
            json!({"track_index": 0, "item_index": 0, "position": 3.0}),
        )?;
        // Then
        let items = ctx.call("list_items_on_track", json!({"track_index": 0}))?;
        assert_eq!(items["n_items"], json!(2));
        assert_approx!(items["items"][0]["length"], 2.0);
        assert_approx!(items["items"][1]["position"], 3.0);
        let msg = ctx.call_err(
            "split_item",
            json!({"track_index": 0, "item_index": 0, "position": 10.0}),
        )?;
        assert!(!msg.is_empty());
        ctx.call("delete_item", json!({"track_index": 0, "item_index": 1}))?;
        ctx.call("delete_item", json!({"track_index": 0, "item_index": 0}))?;
        let items = ctx.call("list_items_on_track", json!({"track_index": 0}))?;
        assert_eq!(items["n_items"], json!(0));
        Ok(())
    })
}

fn create_midi_item_with_notes() -> TestStep {
    step("Create MIDI item with notes", |ctx| {
        // Given
        ctx.call(
            "create_midi_item",
            json!({"track_index": 2, "position": 0.0, "length": 2.0}),
        )?;
        // When
        ctx.call(
            "add_midi_note",
            json!({
                "track_index": 2, "item_index": 0,
                "pitch": 60, "velocity": 100, "start_ppq": 0, "end_ppq": 960
            }),
        )?;
        ctx.call(
            "add_midi_note",
            json!({
                "track_index": 2, "item_index": 0,
                "pitch": 64, "velocity": 90, "start_ppq": 960, "end_ppq": 1920
            }),
        )?;
        ctx.call(
            "set_midi_note",
            json!({"track_index": 2, "item_index": 0, "note_index": 1, "velocity": 127}),
        )?;
        // Then
        let notes = ctx.call("list_midi_notes", json!({"track_index": 2, "item_index": 0}))?;
        assert_eq!(notes["n_notes"], json!(2));
        assert_eq!(notes["notes"][0]["pitch"], json!(60));
        assert_eq!(notes["notes"][1]["velocity"], json!(127));
        ctx.call(
            "delete_midi_note",
            json!({"track_index": 2, "item_index": 0, "note_index": 0}),
        )?;
        let notes = ctx.call("list_midi_notes", json!({"track_index": 2, "item_index": 0}))?;
        assert_eq!(notes["n_notes"], json!(1));
        assert_eq!(notes["notes"][0]["pitch"], json!(64));
        Ok(())
    })
}

fn add_midi_cc() -> TestStep {
    step("Add MIDI CC", |ctx| {
        // When
        ctx.call(
            "add_midi_cc",
            json!({
                "track_index": 2, "item_index": 0,
                "cc_num": 7, "value": 100, "ppq_position": 480
            }),
        )?;
        // Then
        let events = ctx.call("list_midi_cc", json!({"track_index": 2, "item_index": 0}))?;
        assert_eq!(events["n_cc_events"], json!(1));
        assert_eq!(events["cc_events"][0]["cc_num"], json!(7));
        assert_eq!(events["cc_events"][0]["value"], json!(100));
        Ok(())
    })
}

fn create_fx_envelope_with_points() -> TestStep {
    step("Create FX envelope with points", |ctx| {
        // Given
        let created = ctx.call(
            "create_fx_envelope",
            json!({"track_index": 1, "fx_index": 0, "param_index": 0}),
        )?;
        let envelope = created["envelope_index"].clone();
        let before = ctx.call(
            "get_envelope_points",
            json!({"track_index": 1, "envelope_index": envelope}),
        )?;
        let n = before["n_points"].as_u64().ok_or("point count missing")?;
        // When
        ctx.call(
            "add_envelope_point",
            json!({"track_index": 1, "envelope_index": envelope, "time": 1.0, "value": 0.5}),
        )?;
        // Then
        let after = ctx.call(
            "get_envelope_points",
            json!({"track_index": 1, "envelope_index": envelope}),
        )?;
        assert_eq!(after["n_points"], json!(n + 1));
        let envelopes = ctx.call("list_track_envelopes", json!({"track_index": 1}))?;
        assert!(envelopes["n_envelopes"].as_u64().unwrap_or(0) >= 1);
        Ok(())
    })
}

fn ext_state_round_trip() -> TestStep {
    step("Set, get and delete ext state", |ctx| {
        // When
        ctx.call(
            "set_ext_state",
            json!({"section": TEST_SECTION, "key": "greeting", "value": "hello"}),
        )?;
        // Then
        let state = ctx.call(
            "get_ext_state",
            json!({"section": TEST_SECTION, "key": "greeting"}),
        )?;
        assert_eq!(state["exists"], json!(true));
        assert_eq!(state["value"], json!("hello"));
        ctx.call(
            "delete_ext_state",
            json!({"section": TEST_SECTION, "key": "greeting"}),
        )?;
        let state = ctx.call(
            "get_ext_state",
            json!({"section": TEST_SECTION, "key": "greeting"}),
        )?;
        assert_eq!(state["exists"], json!(false));
        Ok(())
    })
}

fn perform_action() -> TestStep {
    step("Perform action", |ctx| {
        // Given
        let before = ctx.call("list_tracks", json!({}))?;
        let n = before["n_tracks"].as_u64().ok_or("track count missing")?;
        // When
        // "Track: Insert new track"
        ctx.call("perform_action", json!({"action_id": 40001}))?;
        // Then
        let after = ctx.call("list_tracks", json!({}))?;
        assert_eq!(after["n_tracks"], json!(n + 1));
        let msg = ctx.call_err(
            "lookup_command_id",
            json!({"command_name": "_SCYTHE_NO_SUCH_COMMAND"}),
        )?;
        assert!(msg.contains("_SCYTHE_NO_SUCH_COMMAND"), "unexpected error: {}", msg);
        Ok(())
    })
}

fn run_lua_script_with_result() -> TestStep {
    step("Run Lua script with result", |ctx| {
        // When
        let result = ctx.call(
            "run_lua_script",
            json!({
                "script": "reaper.SetExtState('scythe_script_ipc', 'result', tostring(6 * 7), false)",
                "return_result": true
            }),
        )?;
        // Then
        assert_eq!(result["executed"], json!(true));
        assert_eq!(result["result"], json!("42"));
        Ok(())
    })
}

fn query_devices() -> TestStep {
    step("Query devices", |ctx| {
        // When
        let audio = ctx.call("list_audio_devices", json!({}))?;
        let midi = ctx.call("list_midi_devices", json!({}))?;
        // Then
        assert!(audio["n_inputs"].is_u64());
        assert!(midi["inputs"].is_array());
        assert!(midi["outputs"].is_array());
        Ok(())
    })
}
