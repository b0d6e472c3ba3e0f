use crate::{
    AudioDeviceInfo, Bookmark, DawResult, EnvelopeInfo, EnvelopePoint, FxChain, FxInfo, FxPreset,
    ItemInfo, MidiCc, MidiDevice, MidiNote, PlayState, ProjectInfo, RgbColor, SelectedItem,
    SendCategory, SendInfo, TempoMarker, TimeRange,
};
use std::path::Path;

/// Operations on the current project of a running DAW.
///
/// All objects are addressed by zero-based indices, re-resolved on every call. Callers are
/// expected to validate indices before use. Implementations report stale or invalid indices with
/// [`DawError::ObjectNotFound`](crate::DawError::ObjectNotFound) instead of panicking.
///
/// Item-level MIDI and take-FX operations act on the active take of the item.
pub trait Daw {
    // Project

    /// Succeeds if there's a project to work on.
    fn check_connection(&self) -> DawResult<()>;

    fn project_info(&self) -> DawResult<ProjectInfo>;

    fn play_state(&self) -> DawResult<PlayState>;

    fn cursor_position(&self) -> DawResult<f64>;

    fn set_cursor_position(&mut self, position: f64) -> DawResult<()>;

    fn play_position(&self) -> DawResult<f64>;

    fn play(&mut self) -> DawResult<()>;

    fn stop(&mut self) -> DawResult<()>;

    fn pause(&mut self) -> DawResult<()>;

    fn record(&mut self) -> DawResult<()>;

    /// Saves to the current file or, if given, to a new file path.
    fn save_project(&mut self, path: Option<&str>) -> DawResult<()>;

    fn begin_undo_block(&mut self) -> DawResult<()>;

    fn end_undo_block(&mut self, label: &str) -> DawResult<()>;

    // Tracks

    fn track_count(&self) -> DawResult<u32>;

    fn track_name(&self, track: u32) -> DawResult<String>;

    fn set_track_name(&mut self, track: u32, name: &str) -> DawResult<()>;

    /// Inserts a new track so that it ends up at `index`.
    fn insert_track(&mut self, index: u32, name: &str) -> DawResult<()>;

    fn remove_track(&mut self, track: u32) -> DawResult<()>;

    /// Linear volume.
    fn track_volume(&self, track: u32) -> DawResult<f64>;

    fn set_track_volume(&mut self, track: u32, volume: f64) -> DawResult<()>;

    fn track_pan(&self, track: u32) -> DawResult<f64>;

    fn set_track_pan(&mut self, track: u32, pan: f64) -> DawResult<()>;

    fn track_is_muted(&self, track: u32) -> DawResult<bool>;

    fn set_track_muted(&mut self, track: u32, muted: bool) -> DawResult<()>;

    fn track_is_solo(&self, track: u32) -> DawResult<bool>;

    fn set_track_solo(&mut self, track: u32, solo: bool) -> DawResult<()>;

    fn track_is_armed(&self, track: u32) -> DawResult<bool>;

    fn set_track_armed(&mut self, track: u32, armed: bool) -> DawResult<()>;

    /// `None` if the track uses the theme's default color.
    fn track_color(&self, track: u32) -> DawResult<Option<RgbColor>>;

    fn set_track_color(&mut self, track: u32, color: RgbColor) -> DawResult<()>;

    fn track_automation_mode(&self, track: u32) -> DawResult<i32>;

    fn set_track_automation_mode(&mut self, track: u32, mode: i32) -> DawResult<()>;

    /// Selects the given track and unselects all others.
    fn select_track_exclusively(&mut self, track: u32) -> DawResult<()>;

    // FX

    fn fx_count(&self, chain: FxChain) -> DawResult<u32>;

    fn fx_info(&self, chain: FxChain, fx: u32) -> DawResult<FxInfo>;

    fn fx_param_count(&self, chain: FxChain, fx: u32) -> DawResult<u32>;

    fn fx_param_name(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String>;

    /// Normalized value (0.0 to 1.0).
    fn fx_param_value(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<f64>;

    /// The value as displayed by the plug-in, e.g. "-6.0 dB".
    fn fx_param_formatted(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String>;

    fn set_fx_param_value(&mut self, chain: FxChain, fx: u32, param: u32, value: f64)
        -> DawResult<()>;

    /// Appends the FX with the given name. Returns `None` if no such plug-in exists.
    fn add_fx(&mut self, chain: FxChain, name: &str) -> DawResult<Option<u32>>;

    fn remove_fx(&mut self, chain: FxChain, fx: u32) -> DawResult<()>;

    fn set_fx_enabled(&mut self, chain: FxChain, fx: u32, enabled: bool) -> DawResult<()>;

    fn fx_preset(&self, chain: FxChain, fx: u32) -> DawResult<FxPreset>;

    /// Returns `false` if there's no preset with that name.
    fn set_fx_preset(&mut self, chain: FxChain, fx: u32, name: &str) -> DawResult<bool>;

    /// Steps through the preset list. Returns `false` if REAPER refused.
    fn navigate_fx_presets(&mut self, chain: FxChain, fx: u32, delta: i32) -> DawResult<bool>;

    /// Copies a track FX to another track. A negative `dst_position` appends.
    fn copy_fx_to_track(
        &mut self,
        src_track: u32,
        src_fx: u32,
        dst_track: u32,
        dst_position: i32,
    ) -> DawResult<()>;

    // Sends

    fn send_count(&self, track: u32, category: SendCategory) -> DawResult<u32>;

    fn send_info(&self, track: u32, category: SendCategory, index: u32) -> DawResult<SendInfo>;

    /// Returns the index of the new send on the source track, `None` if REAPER refused.
    fn create_send(&mut self, src_track: u32, dst_track: u32) -> DawResult<Option<u32>>;

    fn remove_send(&mut self, track: u32, category: SendCategory, index: u32) -> DawResult<()>;

    /// Linear volume.
    fn set_send_volume(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        volume: f64,
    ) -> DawResult<()>;

    fn set_send_pan(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        pan: f64,
    ) -> DawResult<()>;

    fn set_send_muted(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        muted: bool,
    ) -> DawResult<()>;

    // Markers and regions

    /// All markers and regions in timeline order.
    fn bookmarks(&self) -> DawResult<Vec<Bookmark>>;

    /// Returns the displayed number of the new marker.
    fn add_marker(&mut self, position: f64, name: &str, color: Option<RgbColor>)
        -> DawResult<i32>;

    /// Returns the displayed number of the new region.
    fn add_region(
        &mut self,
        start: f64,
        end: f64,
        name: &str,
        color: Option<RgbColor>,
    ) -> DawResult<i32>;

    /// Returns `false` if there's no such marker or region.
    fn delete_bookmark(&mut self, number: i32, is_region: bool) -> DawResult<bool>;

    fn go_to_marker(&mut self, number: i32) -> DawResult<()>;

    // Tempo

    fn master_tempo(&self) -> DawResult<f64>;

    fn tempo_marker_count(&self) -> DawResult<u32>;

    fn tempo_marker(&self, index: u32) -> DawResult<TempoMarker>;

    /// Creates a new tempo marker (`index == None`) or replaces an existing one.
    fn set_tempo_marker(&mut self, index: Option<u32>, marker: &TempoMarker) -> DawResult<bool>;

    fn delete_tempo_marker(&mut self, index: u32) -> DawResult<bool>;

    // Items

    fn item_count(&self, track: u32) -> DawResult<u32>;

    fn item_info(&self, track: u32, item: u32) -> DawResult<ItemInfo>;

    fn selected_items(&self) -> DawResult<Vec<SelectedItem>>;

    /// Adds an empty item without takes and returns what REAPER made of it.
    fn add_item(&mut self, track: u32, position: f64, length: f64) -> DawResult<ItemInfo>;

    fn delete_item(&mut self, track: u32, item: u32) -> DawResult<()>;

    fn set_item_position(&mut self, track: u32, item: u32, position: f64) -> DawResult<()>;

    fn set_item_length(&mut self, track: u32, item: u32, length: f64) -> DawResult<()>;

    /// Returns `false` if REAPER refused to split.
    fn split_item(&mut self, track: u32, item: u32, position: f64) -> DawResult<bool>;

    fn create_midi_item(&mut self, track: u32, start: f64, end: f64) -> DawResult<()>;

    // MIDI

    fn midi_note_count(&self, track: u32, item: u32) -> DawResult<u32>;

    fn midi_note(&self, track: u32, item: u32, index: u32) -> DawResult<MidiNote>;

    /// Inserts without sorting. Call [`Daw::sort_midi`] afterwards.
    fn insert_midi_note(&mut self, track: u32, item: u32, note: &MidiNote) -> DawResult<()>;

    fn set_midi_note(&mut self, track: u32, item: u32, index: u32, note: &MidiNote)
        -> DawResult<()>;

    fn delete_midi_note(&mut self, track: u32, item: u32, index: u32) -> DawResult<()>;

    fn midi_cc_count(&self, track: u32, item: u32) -> DawResult<u32>;

    fn midi_cc(&self, track: u32, item: u32, index: u32) -> DawResult<MidiCc>;

    /// Inserts without sorting. Call [`Daw::sort_midi`] afterwards.
    fn insert_midi_cc(&mut self, track: u32, item: u32, cc: &MidiCc) -> DawResult<()>;

    fn delete_midi_cc(&mut self, track: u32, item: u32, index: u32) -> DawResult<()>;

    fn sort_midi(&mut self, track: u32, item: u32) -> DawResult<()>;

    // Envelopes

    fn envelope_count(&self, track: u32) -> DawResult<u32>;

    fn envelope_info(&self, track: u32, envelope: u32) -> DawResult<EnvelopeInfo>;

    fn envelope_point(&self, track: u32, envelope: u32, index: u32) -> DawResult<EnvelopePoint>;

    /// Inserts without sorting. Call [`Daw::sort_envelope_points`] afterwards.
    fn insert_envelope_point(
        &mut self,
        track: u32,
        envelope: u32,
        point: &EnvelopePoint,
    ) -> DawResult<()>;

    fn sort_envelope_points(&mut self, track: u32, envelope: u32) -> DawResult<()>;

    /// Deletes points with `start <= time < end` from the underlying envelope.
    fn delete_envelope_points(
        &mut self,
        track: u32,
        envelope: u32,
        start: f64,
        end: f64,
    ) -> DawResult<()>;

    /// Deletes all points of the underlying envelope (automation items are left alone).
    fn clear_envelope(&mut self, track: u32, envelope: u32) -> DawResult<()>;

    /// Returns the track envelope index of the parameter envelope, creating it if desired.
    fn fx_envelope(&mut self, track: u32, fx: u32, param: u32, create: bool)
        -> DawResult<Option<u32>>;

    fn envelope_chunk(&self, track: u32, envelope: u32) -> DawResult<String>;

    fn set_envelope_chunk(&mut self, track: u32, envelope: u32, chunk: &str) -> DawResult<()>;

    /// Returns the index of the new, non-pooled automation item.
    fn insert_automation_item(
        &mut self,
        track: u32,
        envelope: u32,
        position: f64,
        length: f64,
    ) -> DawResult<i32>;

    // Time selection and loop

    fn time_selection(&self) -> DawResult<TimeRange>;

    fn set_time_selection(&mut self, range: TimeRange) -> DawResult<()>;

    fn loop_points(&self) -> DawResult<TimeRange>;

    fn set_loop_points(&mut self, range: TimeRange) -> DawResult<()>;

    fn repeat_is_enabled(&self) -> DawResult<bool>;

    fn set_repeat_enabled(&mut self, enabled: bool) -> DawResult<()>;

    // Actions

    /// Executes an action of the main section.
    fn run_command(&mut self, command_id: i32) -> DawResult<()>;

    /// Resolves a named command such as "_SWS_ABOUT". `None` if unknown.
    fn lookup_command(&self, name: &str) -> DawResult<Option<i32>>;

    // Extended state

    /// Empty string if the key doesn't exist.
    fn ext_state(&self, section: &str, key: &str) -> DawResult<String>;

    fn set_ext_state(&mut self, section: &str, key: &str, value: &str, persist: bool)
        -> DawResult<()>;

    fn delete_ext_state(&mut self, section: &str, key: &str, persist: bool) -> DawResult<()>;

    // Devices

    fn audio_device_info(&self) -> DawResult<AudioDeviceInfo>;

    fn midi_input_devices(&self) -> DawResult<Vec<MidiDevice>>;

    fn midi_output_devices(&self) -> DawResult<Vec<MidiDevice>>;

    // Media and scripts

    /// Inserts a media file on the selected track at the edit cursor.
    fn insert_media(&mut self, file_path: &str) -> DawResult<bool>;

    /// Registers a script file as action in the main section. `None` if REAPER refused.
    fn register_script(&mut self, path: &Path) -> DawResult<Option<i32>>;

    fn unregister_script(&mut self, path: &Path) -> DawResult<()>;
}
