//! Audio and MIDI hardware.
use crate::{NoArgs, ToolDef, ToolResult};
use scythe_daw::{Daw, MidiDevice};
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_audio_devices", list_audio_devices)
            .description(
                "Get information about the active audio device.\n\n\
                 Returns the number of hardware input and output channels and the input/output \
                 latency in samples.",
            )
            .failure_context("list audio devices")
            .read_only(),
        ToolDef::new("list_midi_devices", list_midi_devices)
            .description(
                "List the available MIDI input and output devices.\n\n\
                 Device indices are the ones REAPER uses for track MIDI input and hardware MIDI \
                 output routing.",
            )
            .failure_context("list MIDI devices")
            .read_only(),
    ]
}

fn list_audio_devices(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let info = daw.audio_device_info()?;
    Ok(json!({
        "n_inputs": info.input_count,
        "n_outputs": info.output_count,
        "input_latency_samples": info.input_latency,
        "output_latency_samples": info.output_latency,
    }))
}

fn device_list(devices: &[MidiDevice]) -> Vec<Value> {
    devices
        .iter()
        .map(|d| json!({"index": d.index, "name": d.name}))
        .collect()
}

fn list_midi_devices(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let inputs = daw.midi_input_devices()?;
    let outputs = daw.midi_output_devices()?;
    Ok(json!({
        "n_inputs": inputs.len(),
        "inputs": device_list(&inputs),
        "n_outputs": outputs.len(),
        "outputs": device_list(&outputs),
    }))
}
