//! In-memory [`Daw`] which behaves like a small REAPER project.
//!
//! Good enough to exercise tools end-to-end without a running REAPER. Everything is public so
//! tests can arrange a project directly and inspect the result afterwards.

use crate::{
    AudioDeviceInfo, Bookmark, Daw, DawError, DawResult, EnvelopeInfo, EnvelopePoint, FxChain,
    FxInfo, FxPreset, ItemInfo, MidiCc, MidiDevice, MidiNote, PlayState, ProjectInfo, RgbColor,
    SelectedItem, SendCategory, SendInfo, TempoMarker, TimeRange,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

const FIRST_SCRIPT_COMMAND_ID: i32 = 60000;

#[derive(Clone, PartialEq, Debug)]
pub struct FakeParam {
    pub name: String,
    pub value: f64,
}

impl FakeParam {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    fn formatted(&self) -> String {
        format!("{:.1}", self.value * 100.0)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FakeFx {
    pub name: String,
    pub enabled: bool,
    pub online: bool,
    pub params: Vec<FakeParam>,
    pub presets: Vec<String>,
    pub preset: Option<usize>,
}

impl FakeFx {
    pub fn new(name: &str, params: &[&str], presets: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            online: true,
            params: params.iter().map(|p| FakeParam::new(p, 0.5)).collect(),
            presets: presets.iter().map(|p| p.to_string()).collect(),
            preset: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FakeSend {
    pub dest: u32,
    pub volume: f64,
    pub pan: f64,
    pub muted: bool,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct FakeTake {
    pub name: String,
    pub fx: Vec<FakeFx>,
    pub notes: Vec<MidiNote>,
    pub ccs: Vec<MidiCc>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FakeItem {
    pub position: f64,
    pub length: f64,
    pub takes: Vec<FakeTake>,
    pub active_take: Option<usize>,
    pub selected: bool,
}

impl FakeItem {
    pub fn new(position: f64, length: f64) -> Self {
        Self {
            position,
            length,
            takes: vec![],
            active_take: None,
            selected: false,
        }
    }

    pub fn with_take(position: f64, length: f64, take_name: &str) -> Self {
        Self {
            takes: vec![FakeTake {
                name: take_name.to_string(),
                ..Default::default()
            }],
            active_take: Some(0),
            ..Self::new(position, length)
        }
    }

    fn end(&self) -> f64 {
        self.position + self.length
    }

    fn info(&self) -> ItemInfo {
        ItemInfo {
            position: self.position,
            length: self.length,
            take_count: self.takes.len() as u32,
            active_take_name: self
                .active_take
                .and_then(|i| self.takes.get(i))
                .map(|t| t.name.clone()),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct FakeEnvelope {
    pub id: u32,
    pub name: String,
    pub points: Vec<EnvelopePoint>,
    pub chunk: String,
    pub automation_items: Vec<TimeRange>,
    /// FX and parameter index if this is a parameter envelope.
    pub fx_param: Option<(u32, u32)>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FakeTrack {
    pub name: String,
    pub volume: f64,
    pub pan: f64,
    pub muted: bool,
    pub solo: bool,
    pub armed: bool,
    pub color: Option<RgbColor>,
    pub automation_mode: i32,
    pub selected: bool,
    pub fx: Vec<FakeFx>,
    pub sends: Vec<FakeSend>,
    pub items: Vec<FakeItem>,
    pub envelopes: Vec<FakeEnvelope>,
}

impl FakeTrack {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            volume: 1.0,
            pan: 0.0,
            muted: false,
            solo: false,
            armed: false,
            color: None,
            automation_mode: 0,
            selected: false,
            fx: vec![],
            sends: vec![],
            items: vec![],
            envelopes: vec![],
        }
    }
}

/// Media file inserted via [`Daw::insert_media`].
#[derive(Clone, PartialEq, Debug)]
pub struct InsertedMedia {
    pub track: u32,
    pub position: f64,
    pub file_path: String,
}

/// Ext state written whenever a registered script runs, simulating a script reporting back.
#[derive(Clone, PartialEq, Debug)]
pub struct ScriptOutput {
    pub section: String,
    pub key: String,
    pub value: String,
}

#[derive(Clone, Debug)]
pub struct FakeDaw {
    pub connected: bool,
    pub project_name: String,
    pub project_path: Option<String>,
    pub bpm: f64,
    pub beats_per_measure: i32,
    pub beat_value: i32,
    pub sample_rate: u32,
    pub is_dirty: bool,
    pub play_state: PlayState,
    pub cursor: f64,
    pub play_position: f64,
    pub tracks: Vec<FakeTrack>,
    pub bookmarks: Vec<Bookmark>,
    pub tempo_markers: Vec<TempoMarker>,
    pub time_selection: TimeRange,
    pub loop_points: TimeRange,
    pub repeat: bool,
    /// Plug-ins which can be added by name.
    pub plugins: Vec<FakeFx>,
    /// Named commands known to [`Daw::lookup_command`].
    pub commands: HashMap<String, i32>,
    pub executed_commands: Vec<i32>,
    pub ext_state: BTreeMap<(String, String), String>,
    pub persisted_ext_state: HashSet<(String, String)>,
    pub audio_devices: AudioDeviceInfo,
    pub midi_inputs: Vec<MidiDevice>,
    pub midi_outputs: Vec<MidiDevice>,
    pub inserted_media: Vec<InsertedMedia>,
    pub registered_scripts: BTreeMap<i32, PathBuf>,
    /// Contents of each script at the time it ran.
    pub script_runs: Vec<String>,
    pub script_output: Option<ScriptOutput>,
    pub saved_paths: Vec<Option<String>>,
    /// Labels of all closed undo blocks, oldest first.
    pub undo_history: Vec<String>,
    pub open_undo_blocks: u32,
    /// Names of REAPER functions which should fail when called.
    pub failing: HashSet<&'static str>,
    next_command_id: i32,
    next_envelope_id: u32,
}

impl Default for FakeDaw {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDaw {
    /// An empty, unsaved project with a small plug-in catalog.
    pub fn new() -> Self {
        let mut commands = HashMap::new();
        commands.insert("_SWS_ABOUT".to_string(), 53000);
        commands.insert("_S&M_CYCLACTION_1".to_string(), 53001);
        Self {
            connected: true,
            project_name: String::new(),
            project_path: None,
            bpm: 120.0,
            beats_per_measure: 4,
            beat_value: 4,
            sample_rate: 44100,
            is_dirty: false,
            play_state: PlayState::default(),
            cursor: 0.0,
            play_position: 0.0,
            tracks: vec![],
            bookmarks: vec![],
            tempo_markers: vec![],
            time_selection: TimeRange::default(),
            loop_points: TimeRange::default(),
            repeat: false,
            plugins: vec![
                FakeFx::new(
                    "VST: ReaEQ (Cockos)",
                    &["Freq-Low Shelf", "Gain-Low Shelf", "Q-Low Shelf"],
                    &["Default", "Bright", "Warm"],
                ),
                FakeFx::new(
                    "VST: ReaComp (Cockos)",
                    &["Thresh", "Ratio", "Attack"],
                    &[],
                ),
            ],
            commands,
            executed_commands: vec![],
            ext_state: BTreeMap::new(),
            persisted_ext_state: HashSet::new(),
            audio_devices: AudioDeviceInfo {
                input_count: 2,
                output_count: 2,
                input_latency: 256,
                output_latency: 512,
            },
            midi_inputs: vec![MidiDevice {
                index: 0,
                name: "Keystation 49".to_string(),
            }],
            midi_outputs: vec![
                MidiDevice {
                    index: 0,
                    name: "Microsoft GS Wavetable Synth".to_string(),
                },
                MidiDevice {
                    index: 2,
                    name: "IAC Bus 1".to_string(),
                },
            ],
            inserted_media: vec![],
            registered_scripts: BTreeMap::new(),
            script_runs: vec![],
            script_output: None,
            saved_paths: vec![],
            undo_history: vec![],
            open_undo_blocks: 0,
            failing: HashSet::new(),
            next_command_id: FIRST_SCRIPT_COMMAND_ID,
            next_envelope_id: 1,
        }
    }

    pub fn with_tracks(names: &[&str]) -> Self {
        let mut daw = Self::new();
        daw.tracks = names.iter().map(|n| FakeTrack::new(n)).collect();
        daw
    }

    /// Appends a plug-in from the catalog to a track. Panics if the plug-in is unknown.
    pub fn push_track_fx(&mut self, track: usize, plugin: &str) -> &mut FakeFx {
        let fx = self
            .find_plugin(plugin)
            .unwrap_or_else(|| panic!("unknown plug-in {}", plugin));
        let chain = &mut self.tracks[track].fx;
        chain.push(fx);
        chain.last_mut().unwrap()
    }

    /// Appends a plain track envelope with the given state chunk.
    pub fn push_envelope(&mut self, track: usize, name: &str, chunk: &str) -> &mut FakeEnvelope {
        let envelope = FakeEnvelope {
            id: self.take_envelope_id(),
            name: name.to_string(),
            points: vec![],
            chunk: chunk.to_string(),
            automation_items: vec![],
            fx_param: None,
        };
        let envelopes = &mut self.tracks[track].envelopes;
        envelopes.push(envelope);
        envelopes.last_mut().unwrap()
    }

    pub fn push_item(&mut self, track: usize, item: FakeItem) -> &mut FakeItem {
        let items = &mut self.tracks[track].items;
        items.push(item);
        items.last_mut().unwrap()
    }

    pub fn last_undo_label(&self) -> Option<&str> {
        self.undo_history.last().map(|s| s.as_str())
    }

    fn take_envelope_id(&mut self) -> u32 {
        let id = self.next_envelope_id;
        self.next_envelope_id += 1;
        id
    }

    fn find_plugin(&self, name: &str) -> Option<FakeFx> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.plugins
            .iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
    }

    fn call(&self, function: &'static str) -> DawResult<()> {
        if !self.connected {
            return Err(DawError::NoProject);
        }
        if self.failing.contains(function) {
            return Err(DawError::failed(function));
        }
        Ok(())
    }

    fn track(&self, track: u32) -> DawResult<&FakeTrack> {
        self.tracks
            .get(track as usize)
            .ok_or_else(|| DawError::not_found("track", track))
    }

    fn track_mut(&mut self, track: u32) -> DawResult<&mut FakeTrack> {
        self.tracks
            .get_mut(track as usize)
            .ok_or_else(|| DawError::not_found("track", track))
    }

    fn item(&self, track: u32, item: u32) -> DawResult<&FakeItem> {
        self.track(track)?
            .items
            .get(item as usize)
            .ok_or_else(|| DawError::not_found("item", item))
    }

    fn item_mut(&mut self, track: u32, item: u32) -> DawResult<&mut FakeItem> {
        self.track_mut(track)?
            .items
            .get_mut(item as usize)
            .ok_or_else(|| DawError::not_found("item", item))
    }

    fn take(&self, track: u32, item: u32) -> DawResult<&FakeTake> {
        let it = self.item(track, item)?;
        it.active_take
            .and_then(|i| it.takes.get(i))
            .ok_or_else(|| DawError::not_found("take", item))
    }

    fn take_mut(&mut self, track: u32, item: u32) -> DawResult<&mut FakeTake> {
        let it = self.item_mut(track, item)?;
        match it.active_take {
            Some(i) if i < it.takes.len() => Ok(&mut it.takes[i]),
            _ => Err(DawError::not_found("take", item)),
        }
    }

    fn chain(&self, chain: FxChain) -> DawResult<&Vec<FakeFx>> {
        match chain {
            FxChain::Track(t) => Ok(&self.track(t)?.fx),
            FxChain::Take { track, item } => Ok(&self.take(track, item)?.fx),
        }
    }

    fn chain_mut(&mut self, chain: FxChain) -> DawResult<&mut Vec<FakeFx>> {
        match chain {
            FxChain::Track(t) => Ok(&mut self.track_mut(t)?.fx),
            FxChain::Take { track, item } => Ok(&mut self.take_mut(track, item)?.fx),
        }
    }

    fn fx(&self, chain: FxChain, fx: u32) -> DawResult<&FakeFx> {
        self.chain(chain)?
            .get(fx as usize)
            .ok_or_else(|| DawError::not_found("FX", fx))
    }

    fn fx_mut(&mut self, chain: FxChain, fx: u32) -> DawResult<&mut FakeFx> {
        self.chain_mut(chain)?
            .get_mut(fx as usize)
            .ok_or_else(|| DawError::not_found("FX", fx))
    }

    fn param(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<&FakeParam> {
        self.fx(chain, fx)?
            .params
            .get(param as usize)
            .ok_or_else(|| DawError::not_found("parameter", param))
    }

    fn envelope(&self, track: u32, envelope: u32) -> DawResult<&FakeEnvelope> {
        self.track(track)?
            .envelopes
            .get(envelope as usize)
            .ok_or_else(|| DawError::not_found("envelope", envelope))
    }

    fn envelope_mut(&mut self, track: u32, envelope: u32) -> DawResult<&mut FakeEnvelope> {
        self.track_mut(track)?
            .envelopes
            .get_mut(envelope as usize)
            .ok_or_else(|| DawError::not_found("envelope", envelope))
    }

    /// (source track, send index) of each receive of the given track, in source track order.
    fn receives_of(&self, track: u32) -> Vec<(usize, usize)> {
        self.tracks
            .iter()
            .enumerate()
            .flat_map(|(t, tr)| {
                tr.sends
                    .iter()
                    .enumerate()
                    .filter(move |(_, s)| s.dest == track)
                    .map(move |(s, _)| (t, s))
            })
            .collect()
    }

    /// Resolves a send or receive to (owning track, send index).
    fn resolve_send(
        &self,
        track: u32,
        category: SendCategory,
        index: u32,
    ) -> DawResult<(usize, usize)> {
        let tr = self.track(track)?;
        let not_found = || DawError::not_found(category.label(), index);
        match category {
            SendCategory::Send => {
                if (index as usize) < tr.sends.len() {
                    Ok((track as usize, index as usize))
                } else {
                    Err(not_found())
                }
            }
            SendCategory::Receive => self
                .receives_of(track)
                .get(index as usize)
                .copied()
                .ok_or_else(not_found),
            SendCategory::HardwareOutput => Err(not_found()),
        }
    }

    fn send_mut(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
    ) -> DawResult<&mut FakeSend> {
        let (t, s) = self.resolve_send(track, category, index)?;
        Ok(&mut self.tracks[t].sends[s])
    }

    fn sort_bookmarks(&mut self) {
        self.bookmarks
            .sort_by(|a, b| a.position.total_cmp(&b.position));
    }

    fn next_bookmark_number(&self, is_region: bool) -> i32 {
        self.bookmarks
            .iter()
            .filter(|b| b.is_region == is_region)
            .map(|b| b.number)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn insert_item_sorted(&mut self, track: u32, item: FakeItem) -> DawResult<usize> {
        let items = &mut self.track_mut(track)?.items;
        let index = items
            .iter()
            .position(|i| i.position > item.position)
            .unwrap_or(items.len());
        items.insert(index, item);
        Ok(index)
    }
}

impl Daw for FakeDaw {
    fn check_connection(&self) -> DawResult<()> {
        self.call("EnumProjects")
    }

    fn project_info(&self) -> DawResult<ProjectInfo> {
        self.call("GetProjectName")?;
        let length = self
            .tracks
            .iter()
            .flat_map(|t| t.items.iter())
            .map(|i| i.end())
            .fold(0.0, f64::max);
        Ok(ProjectInfo {
            name: self.project_name.clone(),
            path: self.project_path.clone(),
            bpm: self.bpm,
            beats_per_measure: self.beats_per_measure,
            beat_value: self.beat_value,
            track_count: self.tracks.len() as u32,
            length,
            sample_rate: self.sample_rate,
            is_dirty: self.is_dirty,
        })
    }

    fn play_state(&self) -> DawResult<PlayState> {
        self.call("GetPlayStateEx")?;
        Ok(self.play_state)
    }

    fn cursor_position(&self) -> DawResult<f64> {
        self.call("GetCursorPositionEx")?;
        Ok(self.cursor)
    }

    fn set_cursor_position(&mut self, position: f64) -> DawResult<()> {
        self.call("SetEditCurPos2")?;
        self.cursor = position;
        Ok(())
    }

    fn play_position(&self) -> DawResult<f64> {
        self.call("GetPlayPositionEx")?;
        Ok(if self.play_state.is_stopped() {
            self.cursor
        } else {
            self.play_position
        })
    }

    fn play(&mut self) -> DawResult<()> {
        self.call("OnPlayButtonEx")?;
        self.play_position = self.cursor;
        self.play_state = PlayState {
            is_playing: true,
            ..Default::default()
        };
        Ok(())
    }

    fn stop(&mut self) -> DawResult<()> {
        self.call("OnStopButtonEx")?;
        self.play_state = PlayState::default();
        Ok(())
    }

    fn pause(&mut self) -> DawResult<()> {
        self.call("OnPauseButtonEx")?;
        self.play_state = PlayState {
            is_paused: true,
            ..Default::default()
        };
        Ok(())
    }

    fn record(&mut self) -> DawResult<()> {
        self.call("CSurf_OnRecord")?;
        self.play_state = PlayState {
            is_playing: true,
            is_recording: true,
            ..Default::default()
        };
        Ok(())
    }

    fn save_project(&mut self, path: Option<&str>) -> DawResult<()> {
        self.call("Main_SaveProjectEx")?;
        if let Some(p) = path {
            self.project_path = Some(p.to_string());
            self.project_name = Path::new(p)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        self.saved_paths.push(path.map(|p| p.to_string()));
        self.is_dirty = false;
        Ok(())
    }

    fn begin_undo_block(&mut self) -> DawResult<()> {
        self.call("Undo_BeginBlock2")?;
        self.open_undo_blocks += 1;
        Ok(())
    }

    fn end_undo_block(&mut self, label: &str) -> DawResult<()> {
        self.call("Undo_EndBlock2")?;
        self.open_undo_blocks = self.open_undo_blocks.saturating_sub(1);
        self.undo_history.push(label.to_string());
        self.is_dirty = true;
        Ok(())
    }

    fn track_count(&self) -> DawResult<u32> {
        self.call("CountTracks")?;
        Ok(self.tracks.len() as u32)
    }

    fn track_name(&self, track: u32) -> DawResult<String> {
        self.call("GetTrackName")?;
        Ok(self.track(track)?.name.clone())
    }

    fn set_track_name(&mut self, track: u32, name: &str) -> DawResult<()> {
        self.call("GetSetMediaTrackInfo_String")?;
        self.track_mut(track)?.name = name.to_string();
        Ok(())
    }

    fn insert_track(&mut self, index: u32, name: &str) -> DawResult<()> {
        self.call("InsertTrackAtIndex")?;
        let index = (index as usize).min(self.tracks.len());
        for send in self.tracks.iter_mut().flat_map(|t| t.sends.iter_mut()) {
            if send.dest as usize >= index {
                send.dest += 1;
            }
        }
        self.tracks.insert(index, FakeTrack::new(name));
        Ok(())
    }

    fn remove_track(&mut self, track: u32) -> DawResult<()> {
        self.call("DeleteTrack")?;
        self.track(track)?;
        self.tracks.remove(track as usize);
        for tr in &mut self.tracks {
            tr.sends.retain(|s| s.dest != track);
            for send in &mut tr.sends {
                if send.dest > track {
                    send.dest -= 1;
                }
            }
        }
        Ok(())
    }

    fn track_volume(&self, track: u32) -> DawResult<f64> {
        self.call("GetMediaTrackInfo_Value")?;
        Ok(self.track(track)?.volume)
    }

    fn set_track_volume(&mut self, track: u32, volume: f64) -> DawResult<()> {
        self.call("SetMediaTrackInfo_Value")?;
        self.track_mut(track)?.volume = volume;
        Ok(())
    }

    fn track_pan(&self, track: u32) -> DawResult<f64> {
        self.call("GetMediaTrackInfo_Value")?;
        Ok(self.track(track)?.pan)
    }

    fn set_track_pan(&mut self, track: u32, pan: f64) -> DawResult<()> {
        self.call("SetMediaTrackInfo_Value")?;
        self.track_mut(track)?.pan = pan;
        Ok(())
    }

    fn track_is_muted(&self, track: u32) -> DawResult<bool> {
        self.call("GetMediaTrackInfo_Value")?;
        Ok(self.track(track)?.muted)
    }

    fn set_track_muted(&mut self, track: u32, muted: bool) -> DawResult<()> {
        self.call("SetMediaTrackInfo_Value")?;
        self.track_mut(track)?.muted = muted;
        Ok(())
    }

    fn track_is_solo(&self, track: u32) -> DawResult<bool> {
        self.call("GetMediaTrackInfo_Value")?;
        Ok(self.track(track)?.solo)
    }

    fn set_track_solo(&mut self, track: u32, solo: bool) -> DawResult<()> {
        self.call("SetMediaTrackInfo_Value")?;
        self.track_mut(track)?.solo = solo;
        Ok(())
    }

    fn track_is_armed(&self, track: u32) -> DawResult<bool> {
        self.call("GetMediaTrackInfo_Value")?;
        Ok(self.track(track)?.armed)
    }

    fn set_track_armed(&mut self, track: u32, armed: bool) -> DawResult<()> {
        self.call("SetMediaTrackInfo_Value")?;
        self.track_mut(track)?.armed = armed;
        Ok(())
    }

    fn track_color(&self, track: u32) -> DawResult<Option<RgbColor>> {
        self.call("GetTrackColor")?;
        Ok(self.track(track)?.color)
    }

    fn set_track_color(&mut self, track: u32, color: RgbColor) -> DawResult<()> {
        self.call("SetTrackColor")?;
        self.track_mut(track)?.color = Some(color);
        Ok(())
    }

    fn track_automation_mode(&self, track: u32) -> DawResult<i32> {
        self.call("GetTrackAutomationMode")?;
        Ok(self.track(track)?.automation_mode)
    }

    fn set_track_automation_mode(&mut self, track: u32, mode: i32) -> DawResult<()> {
        self.call("SetTrackAutomationMode")?;
        self.track_mut(track)?.automation_mode = mode;
        Ok(())
    }

    fn select_track_exclusively(&mut self, track: u32) -> DawResult<()> {
        self.call("SetOnlyTrackSelected")?;
        self.track(track)?;
        for (i, tr) in self.tracks.iter_mut().enumerate() {
            tr.selected = i == track as usize;
        }
        Ok(())
    }

    fn fx_count(&self, chain: FxChain) -> DawResult<u32> {
        self.call("TrackFX_GetCount")?;
        Ok(self.chain(chain)?.len() as u32)
    }

    fn fx_info(&self, chain: FxChain, fx: u32) -> DawResult<FxInfo> {
        self.call("TrackFX_GetFXName")?;
        let f = self.fx(chain, fx)?;
        Ok(FxInfo {
            name: f.name.clone(),
            is_enabled: f.enabled,
            is_online: f.online,
        })
    }

    fn fx_param_count(&self, chain: FxChain, fx: u32) -> DawResult<u32> {
        self.call("TrackFX_GetNumParams")?;
        Ok(self.fx(chain, fx)?.params.len() as u32)
    }

    fn fx_param_name(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String> {
        self.call("TrackFX_GetParamName")?;
        Ok(self.param(chain, fx, param)?.name.clone())
    }

    fn fx_param_value(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<f64> {
        self.call("TrackFX_GetParamNormalized")?;
        Ok(self.param(chain, fx, param)?.value)
    }

    fn fx_param_formatted(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String> {
        self.call("TrackFX_GetFormattedParamValue")?;
        Ok(self.param(chain, fx, param)?.formatted())
    }

    fn set_fx_param_value(
        &mut self,
        chain: FxChain,
        fx: u32,
        param: u32,
        value: f64,
    ) -> DawResult<()> {
        self.call("TrackFX_SetParamNormalized")?;
        let f = self.fx_mut(chain, fx)?;
        let p = f
            .params
            .get_mut(param as usize)
            .ok_or_else(|| DawError::not_found("parameter", param))?;
        p.value = value.clamp(0.0, 1.0);
        f.preset = None;
        Ok(())
    }

    fn add_fx(&mut self, chain: FxChain, name: &str) -> DawResult<Option<u32>> {
        self.call("TrackFX_AddByName")?;
        let plugin = match self.find_plugin(name) {
            None => return Ok(None),
            Some(p) => p,
        };
        let fx_chain = self.chain_mut(chain)?;
        fx_chain.push(plugin);
        Ok(Some(fx_chain.len() as u32 - 1))
    }

    fn remove_fx(&mut self, chain: FxChain, fx: u32) -> DawResult<()> {
        self.call("TrackFX_Delete")?;
        self.fx(chain, fx)?;
        self.chain_mut(chain)?.remove(fx as usize);
        Ok(())
    }

    fn set_fx_enabled(&mut self, chain: FxChain, fx: u32, enabled: bool) -> DawResult<()> {
        self.call("TrackFX_SetEnabled")?;
        self.fx_mut(chain, fx)?.enabled = enabled;
        Ok(())
    }

    fn fx_preset(&self, chain: FxChain, fx: u32) -> DawResult<FxPreset> {
        self.call("TrackFX_GetPresetIndex")?;
        let f = self.fx(chain, fx)?;
        Ok(FxPreset {
            name: f.preset.map(|i| f.presets[i].clone()),
            index: f.preset.map(|i| i as i32).unwrap_or(-1),
            count: f.presets.len() as u32,
        })
    }

    fn set_fx_preset(&mut self, chain: FxChain, fx: u32, name: &str) -> DawResult<bool> {
        self.call("TrackFX_SetPreset")?;
        let f = self.fx_mut(chain, fx)?;
        match f.presets.iter().position(|p| p == name) {
            None => Ok(false),
            Some(i) => {
                f.preset = Some(i);
                Ok(true)
            }
        }
    }

    fn navigate_fx_presets(&mut self, chain: FxChain, fx: u32, delta: i32) -> DawResult<bool> {
        self.call("TrackFX_NavigatePresets")?;
        let f = self.fx_mut(chain, fx)?;
        let count = f.presets.len() as i32;
        if count == 0 {
            return Ok(false);
        }
        let current = f.preset.map(|i| i as i32).unwrap_or(-1);
        let next = (current + delta).rem_euclid(count);
        f.preset = Some(next as usize);
        Ok(true)
    }

    fn copy_fx_to_track(
        &mut self,
        src_track: u32,
        src_fx: u32,
        dst_track: u32,
        dst_position: i32,
    ) -> DawResult<()> {
        self.call("TrackFX_CopyToTrack")?;
        let fx = self.fx(FxChain::Track(src_track), src_fx)?.clone();
        let chain = &mut self.track_mut(dst_track)?.fx;
        if dst_position < 0 || dst_position as usize >= chain.len() {
            chain.push(fx);
        } else {
            chain.insert(dst_position as usize, fx);
        }
        Ok(())
    }

    fn send_count(&self, track: u32, category: SendCategory) -> DawResult<u32> {
        self.call("GetTrackNumSends")?;
        let tr = self.track(track)?;
        let count = match category {
            SendCategory::Send => tr.sends.len(),
            SendCategory::Receive => self.receives_of(track).len(),
            SendCategory::HardwareOutput => 0,
        };
        Ok(count as u32)
    }

    fn send_info(&self, track: u32, category: SendCategory, index: u32) -> DawResult<SendInfo> {
        self.call("GetTrackSendInfo_Value")?;
        let (t, s) = self.resolve_send(track, category, index)?;
        let send = &self.tracks[t].sends[s];
        let partner = match category {
            SendCategory::Receive => t,
            _ => send.dest as usize,
        };
        Ok(SendInfo {
            partner_name: self.tracks.get(partner).map(|tr| tr.name.clone()),
            volume: send.volume,
            pan: send.pan,
            is_muted: send.muted,
        })
    }

    fn create_send(&mut self, src_track: u32, dst_track: u32) -> DawResult<Option<u32>> {
        self.call("CreateTrackSend")?;
        self.track(dst_track)?;
        if src_track == dst_track {
            return Ok(None);
        }
        let sends = &mut self.track_mut(src_track)?.sends;
        sends.push(FakeSend {
            dest: dst_track,
            volume: 1.0,
            pan: 0.0,
            muted: false,
        });
        Ok(Some(sends.len() as u32 - 1))
    }

    fn remove_send(&mut self, track: u32, category: SendCategory, index: u32) -> DawResult<()> {
        self.call("RemoveTrackSend")?;
        let (t, s) = self.resolve_send(track, category, index)?;
        self.tracks[t].sends.remove(s);
        Ok(())
    }

    fn set_send_volume(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        volume: f64,
    ) -> DawResult<()> {
        self.call("SetTrackSendInfo_Value")?;
        self.send_mut(track, category, index)?.volume = volume;
        Ok(())
    }

    fn set_send_pan(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        pan: f64,
    ) -> DawResult<()> {
        self.call("SetTrackSendInfo_Value")?;
        self.send_mut(track, category, index)?.pan = pan;
        Ok(())
    }

    fn set_send_muted(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        muted: bool,
    ) -> DawResult<()> {
        self.call("SetTrackSendInfo_Value")?;
        self.send_mut(track, category, index)?.muted = muted;
        Ok(())
    }

    fn bookmarks(&self) -> DawResult<Vec<Bookmark>> {
        self.call("EnumProjectMarkers3")?;
        Ok(self.bookmarks.clone())
    }

    fn add_marker(
        &mut self,
        position: f64,
        name: &str,
        color: Option<RgbColor>,
    ) -> DawResult<i32> {
        self.call("AddProjectMarker2")?;
        let number = self.next_bookmark_number(false);
        self.bookmarks.push(Bookmark {
            is_region: false,
            number,
            position,
            end: position,
            name: name.to_string(),
            color,
        });
        self.sort_bookmarks();
        Ok(number)
    }

    fn add_region(
        &mut self,
        start: f64,
        end: f64,
        name: &str,
        color: Option<RgbColor>,
    ) -> DawResult<i32> {
        self.call("AddProjectMarker2")?;
        let number = self.next_bookmark_number(true);
        self.bookmarks.push(Bookmark {
            is_region: true,
            number,
            position: start,
            end,
            name: name.to_string(),
            color,
        });
        self.sort_bookmarks();
        Ok(number)
    }

    fn delete_bookmark(&mut self, number: i32, is_region: bool) -> DawResult<bool> {
        self.call("DeleteProjectMarker")?;
        let found = self
            .bookmarks
            .iter()
            .position(|b| b.is_region == is_region && b.number == number);
        match found {
            None => Ok(false),
            Some(i) => {
                self.bookmarks.remove(i);
                Ok(true)
            }
        }
    }

    fn go_to_marker(&mut self, number: i32) -> DawResult<()> {
        self.call("GoToMarker")?;
        let position = self
            .bookmarks
            .iter()
            .find(|b| !b.is_region && b.number == number)
            .map(|b| b.position);
        if let Some(p) = position {
            self.cursor = p;
        }
        Ok(())
    }

    fn master_tempo(&self) -> DawResult<f64> {
        self.call("Master_GetTempo")?;
        Ok(self.bpm)
    }

    fn tempo_marker_count(&self) -> DawResult<u32> {
        self.call("CountTempoTimeSigMarkers")?;
        Ok(self.tempo_markers.len() as u32)
    }

    fn tempo_marker(&self, index: u32) -> DawResult<TempoMarker> {
        self.call("GetTempoTimeSigMarker")?;
        self.tempo_markers
            .get(index as usize)
            .copied()
            .ok_or_else(|| DawError::not_found("tempo marker", index))
    }

    fn set_tempo_marker(&mut self, index: Option<u32>, marker: &TempoMarker) -> DawResult<bool> {
        self.call("SetTempoTimeSigMarker")?;
        if marker.bpm <= 0.0 {
            return Ok(false);
        }
        match index {
            None => self.tempo_markers.push(*marker),
            Some(i) => match self.tempo_markers.get_mut(i as usize) {
                None => return Ok(false),
                Some(existing) => *existing = *marker,
            },
        }
        self.tempo_markers
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(true)
    }

    fn delete_tempo_marker(&mut self, index: u32) -> DawResult<bool> {
        self.call("DeleteTempoTimeSigMarker")?;
        if (index as usize) < self.tempo_markers.len() {
            self.tempo_markers.remove(index as usize);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn item_count(&self, track: u32) -> DawResult<u32> {
        self.call("CountTrackMediaItems")?;
        Ok(self.track(track)?.items.len() as u32)
    }

    fn item_info(&self, track: u32, item: u32) -> DawResult<ItemInfo> {
        self.call("GetTrackMediaItem")?;
        Ok(self.item(track, item)?.info())
    }

    fn selected_items(&self) -> DawResult<Vec<SelectedItem>> {
        self.call("CountSelectedMediaItems")?;
        let items = self
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(t, tr)| {
                tr.items
                    .iter()
                    .filter(|i| i.selected)
                    .map(move |i| SelectedItem {
                        position: i.position,
                        length: i.length,
                        track_index: t as i32,
                    })
            })
            .collect();
        Ok(items)
    }

    fn add_item(&mut self, track: u32, position: f64, length: f64) -> DawResult<ItemInfo> {
        self.call("AddMediaItemToTrack")?;
        let item = FakeItem::new(position, length);
        let info = item.info();
        self.insert_item_sorted(track, item)?;
        Ok(info)
    }

    fn delete_item(&mut self, track: u32, item: u32) -> DawResult<()> {
        self.call("DeleteTrackMediaItem")?;
        self.item(track, item)?;
        self.track_mut(track)?.items.remove(item as usize);
        Ok(())
    }

    fn set_item_position(&mut self, track: u32, item: u32, position: f64) -> DawResult<()> {
        self.call("SetMediaItemInfo_Value")?;
        self.item_mut(track, item)?.position = position;
        Ok(())
    }

    fn set_item_length(&mut self, track: u32, item: u32, length: f64) -> DawResult<()> {
        self.call("SetMediaItemInfo_Value")?;
        self.item_mut(track, item)?.length = length;
        Ok(())
    }

    fn split_item(&mut self, track: u32, item: u32, position: f64) -> DawResult<bool> {
        self.call("SplitMediaItem")?;
        let it = self.item_mut(track, item)?;
        if position <= it.position || position >= it.end() {
            return Ok(false);
        }
        let mut right = it.clone();
        right.position = position;
        right.length = it.end() - position;
        it.length = position - it.position;
        self.track_mut(track)?
            .items
            .insert(item as usize + 1, right);
        Ok(true)
    }

    fn create_midi_item(&mut self, track: u32, start: f64, end: f64) -> DawResult<()> {
        self.call("CreateNewMIDIItemInProj")?;
        self.insert_item_sorted(track, FakeItem::with_take(start, end - start, ""))?;
        Ok(())
    }

    fn midi_note_count(&self, track: u32, item: u32) -> DawResult<u32> {
        self.call("MIDI_CountEvts")?;
        Ok(self.take(track, item)?.notes.len() as u32)
    }

    fn midi_note(&self, track: u32, item: u32, index: u32) -> DawResult<MidiNote> {
        self.call("MIDI_GetNote")?;
        self.take(track, item)?
            .notes
            .get(index as usize)
            .copied()
            .ok_or_else(|| DawError::not_found("note", index))
    }

    fn insert_midi_note(&mut self, track: u32, item: u32, note: &MidiNote) -> DawResult<()> {
        self.call("MIDI_InsertNote")?;
        self.take_mut(track, item)?.notes.push(*note);
        Ok(())
    }

    fn set_midi_note(
        &mut self,
        track: u32,
        item: u32,
        index: u32,
        note: &MidiNote,
    ) -> DawResult<()> {
        self.call("MIDI_SetNote")?;
        let existing = self
            .take_mut(track, item)?
            .notes
            .get_mut(index as usize)
            .ok_or_else(|| DawError::not_found("note", index))?;
        *existing = *note;
        Ok(())
    }

    fn delete_midi_note(&mut self, track: u32, item: u32, index: u32) -> DawResult<()> {
        self.call("MIDI_DeleteNote")?;
        let notes = &mut self.take_mut(track, item)?.notes;
        if index as usize >= notes.len() {
            return Err(DawError::not_found("note", index));
        }
        notes.remove(index as usize);
        Ok(())
    }

    fn midi_cc_count(&self, track: u32, item: u32) -> DawResult<u32> {
        self.call("MIDI_CountEvts")?;
        Ok(self.take(track, item)?.ccs.len() as u32)
    }

    fn midi_cc(&self, track: u32, item: u32, index: u32) -> DawResult<MidiCc> {
        self.call("MIDI_GetCC")?;
        self.take(track, item)?
            .ccs
            .get(index as usize)
            .copied()
            .ok_or_else(|| DawError::not_found("CC event", index))
    }

    fn insert_midi_cc(&mut self, track: u32, item: u32, cc: &MidiCc) -> DawResult<()> {
        self.call("MIDI_InsertCC")?;
        self.take_mut(track, item)?.ccs.push(*cc);
        Ok(())
    }

    fn delete_midi_cc(&mut self, track: u32, item: u32, index: u32) -> DawResult<()> {
        self.call("MIDI_DeleteCC")?;
        let ccs = &mut self.take_mut(track, item)?.ccs;
        if index as usize >= ccs.len() {
            return Err(DawError::not_found("CC event", index));
        }
        ccs.remove(index as usize);
        Ok(())
    }

    fn sort_midi(&mut self, track: u32, item: u32) -> DawResult<()> {
        self.call("MIDI_Sort")?;
        let take = self.take_mut(track, item)?;
        take.notes
            .sort_by(|a, b| a.start_ppq.total_cmp(&b.start_ppq));
        take.ccs
            .sort_by(|a, b| a.ppq_position.total_cmp(&b.ppq_position));
        Ok(())
    }

    fn envelope_count(&self, track: u32) -> DawResult<u32> {
        self.call("CountTrackEnvelopes")?;
        Ok(self.track(track)?.envelopes.len() as u32)
    }

    fn envelope_info(&self, track: u32, envelope: u32) -> DawResult<EnvelopeInfo> {
        self.call("GetEnvelopeName")?;
        let env = self.envelope(track, envelope)?;
        Ok(EnvelopeInfo {
            name: env.name.clone(),
            point_count: env.points.len() as u32,
            id: format!("{:#x}", env.id),
        })
    }

    fn envelope_point(&self, track: u32, envelope: u32, index: u32) -> DawResult<EnvelopePoint> {
        self.call("GetEnvelopePoint")?;
        self.envelope(track, envelope)?
            .points
            .get(index as usize)
            .copied()
            .ok_or_else(|| DawError::not_found("envelope point", index))
    }

    fn insert_envelope_point(
        &mut self,
        track: u32,
        envelope: u32,
        point: &EnvelopePoint,
    ) -> DawResult<()> {
        self.call("InsertEnvelopePoint")?;
        self.envelope_mut(track, envelope)?.points.push(*point);
        Ok(())
    }

    fn sort_envelope_points(&mut self, track: u32, envelope: u32) -> DawResult<()> {
        self.call("Envelope_SortPoints")?;
        self.envelope_mut(track, envelope)?
            .points
            .sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(())
    }

    fn delete_envelope_points(
        &mut self,
        track: u32,
        envelope: u32,
        start: f64,
        end: f64,
    ) -> DawResult<()> {
        self.call("DeleteEnvelopePointRange")?;
        self.envelope_mut(track, envelope)?
            .points
            .retain(|p| p.time < start || p.time >= end);
        Ok(())
    }

    fn clear_envelope(&mut self, track: u32, envelope: u32) -> DawResult<()> {
        self.call("DeleteEnvelopePointRangeEx")?;
        self.envelope_mut(track, envelope)?.points.clear();
        Ok(())
    }

    fn fx_envelope(
        &mut self,
        track: u32,
        fx: u32,
        param: u32,
        create: bool,
    ) -> DawResult<Option<u32>> {
        self.call("GetFXEnvelope")?;
        let (fx_name, param_name) = {
            let f = self.fx(FxChain::Track(track), fx)?;
            let p = self.param(FxChain::Track(track), fx, param)?;
            (f.name.clone(), p.name.clone())
        };
        let existing = self
            .track(track)?
            .envelopes
            .iter()
            .position(|e| e.fx_param == Some((fx, param)));
        if let Some(i) = existing {
            return Ok(Some(i as u32));
        }
        if !create {
            return Ok(None);
        }
        let envelope = FakeEnvelope {
            id: self.take_envelope_id(),
            name: format!("{} / {}", param_name, fx_name),
            points: vec![],
            chunk: format!(
                "<PARMENV {}:{} 0 1 0.5\nACT 0 -1\nVIS 0 1 1\nLANEHEIGHT 0 0\nARM 0\nDEFSHAPE 0 -1 -1\n>",
                param, fx
            ),
            automation_items: vec![],
            fx_param: Some((fx, param)),
        };
        let envelopes = &mut self.track_mut(track)?.envelopes;
        envelopes.push(envelope);
        Ok(Some(envelopes.len() as u32 - 1))
    }

    fn envelope_chunk(&self, track: u32, envelope: u32) -> DawResult<String> {
        self.call("GetEnvelopeStateChunk")?;
        Ok(self.envelope(track, envelope)?.chunk.clone())
    }

    fn set_envelope_chunk(&mut self, track: u32, envelope: u32, chunk: &str) -> DawResult<()> {
        self.call("SetEnvelopeStateChunk")?;
        self.envelope_mut(track, envelope)?.chunk = chunk.to_string();
        Ok(())
    }

    fn insert_automation_item(
        &mut self,
        track: u32,
        envelope: u32,
        position: f64,
        length: f64,
    ) -> DawResult<i32> {
        self.call("InsertAutomationItem")?;
        let items = &mut self.envelope_mut(track, envelope)?.automation_items;
        items.push(TimeRange::new(position, position + length));
        Ok(items.len() as i32 - 1)
    }

    fn time_selection(&self) -> DawResult<TimeRange> {
        self.call("GetSet_LoopTimeRange2")?;
        Ok(self.time_selection)
    }

    fn set_time_selection(&mut self, range: TimeRange) -> DawResult<()> {
        self.call("GetSet_LoopTimeRange2")?;
        self.time_selection = range;
        Ok(())
    }

    fn loop_points(&self) -> DawResult<TimeRange> {
        self.call("GetSet_LoopTimeRange2")?;
        Ok(self.loop_points)
    }

    fn set_loop_points(&mut self, range: TimeRange) -> DawResult<()> {
        self.call("GetSet_LoopTimeRange2")?;
        self.loop_points = range;
        Ok(())
    }

    fn repeat_is_enabled(&self) -> DawResult<bool> {
        self.call("GetSetRepeatEx")?;
        Ok(self.repeat)
    }

    fn set_repeat_enabled(&mut self, enabled: bool) -> DawResult<()> {
        self.call("GetSetRepeatEx")?;
        self.repeat = enabled;
        Ok(())
    }

    fn run_command(&mut self, command_id: i32) -> DawResult<()> {
        self.call("Main_OnCommand")?;
        if command_id <= 0 {
            return Err(DawError::InvalidCommandId { id: command_id });
        }
        self.executed_commands.push(command_id);
        if let Some(path) = self.registered_scripts.get(&command_id) {
            self.script_runs
                .push(std::fs::read_to_string(path).unwrap_or_default());
            if let Some(output) = self.script_output.clone() {
                self.ext_state
                    .insert((output.section, output.key), output.value);
            }
        }
        Ok(())
    }

    fn lookup_command(&self, name: &str) -> DawResult<Option<i32>> {
        self.call("NamedCommandLookup")?;
        Ok(self.commands.get(name).copied())
    }

    fn ext_state(&self, section: &str, key: &str) -> DawResult<String> {
        self.call("GetExtState")?;
        Ok(self
            .ext_state
            .get(&(section.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn set_ext_state(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
        persist: bool,
    ) -> DawResult<()> {
        self.call("SetExtState")?;
        let k = (section.to_string(), key.to_string());
        if persist {
            self.persisted_ext_state.insert(k.clone());
        }
        self.ext_state.insert(k, value.to_string());
        Ok(())
    }

    fn delete_ext_state(&mut self, section: &str, key: &str, persist: bool) -> DawResult<()> {
        self.call("DeleteExtState")?;
        let k = (section.to_string(), key.to_string());
        if persist {
            self.persisted_ext_state.remove(&k);
        }
        self.ext_state.remove(&k);
        Ok(())
    }

    fn audio_device_info(&self) -> DawResult<AudioDeviceInfo> {
        self.call("GetNumAudioInputs")?;
        Ok(self.audio_devices)
    }

    fn midi_input_devices(&self) -> DawResult<Vec<MidiDevice>> {
        self.call("GetMIDIInputName")?;
        Ok(self.midi_inputs.clone())
    }

    fn midi_output_devices(&self) -> DawResult<Vec<MidiDevice>> {
        self.call("GetMIDIOutputName")?;
        Ok(self.midi_outputs.clone())
    }

    fn insert_media(&mut self, file_path: &str) -> DawResult<bool> {
        self.call("InsertMedia")?;
        let track = match self.tracks.iter().position(|t| t.selected) {
            None => return Ok(false),
            Some(t) => t as u32,
        };
        let take_name = Path::new(file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let position = self.cursor;
        self.insert_item_sorted(track, FakeItem::with_take(position, 1.0, &take_name))?;
        self.inserted_media.push(InsertedMedia {
            track,
            position,
            file_path: file_path.to_string(),
        });
        Ok(true)
    }

    fn register_script(&mut self, path: &Path) -> DawResult<Option<i32>> {
        self.call("AddRemoveReaScript")?;
        if !path.exists() {
            return Ok(None);
        }
        let id = self.next_command_id;
        self.next_command_id += 1;
        self.registered_scripts.insert(id, path.to_path_buf());
        Ok(Some(id))
    }

    fn unregister_script(&mut self, path: &Path) -> DawResult<()> {
        self.call("AddRemoveReaScript")?;
        self.registered_scripts.retain(|_, p| p != path);
        Ok(())
    }
}
