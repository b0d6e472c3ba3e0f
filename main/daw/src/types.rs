use crate::RgbColor;

#[derive(Clone, PartialEq, Debug)]
pub struct ProjectInfo {
    /// File name of the project, empty if never saved.
    pub name: String,
    /// Full path of the project file, `None` if never saved.
    pub path: Option<String>,
    pub bpm: f64,
    pub beats_per_measure: i32,
    pub beat_value: i32,
    pub track_count: u32,
    /// Length in seconds.
    pub length: f64,
    pub sample_rate: u32,
    pub is_dirty: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct PlayState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_recording: bool,
}

impl PlayState {
    pub fn is_stopped(&self) -> bool {
        !self.is_playing && !self.is_paused && !self.is_recording
    }
}

/// Addresses an FX chain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FxChain {
    Track(u32),
    /// FX chain of the active take of the given item.
    Take { track: u32, item: u32 },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FxInfo {
    pub name: String,
    pub is_enabled: bool,
    pub is_online: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FxPreset {
    /// `None` if no preset is loaded.
    pub name: Option<String>,
    /// -1 if the current state doesn't correspond to a preset.
    pub index: i32,
    pub count: u32,
}

/// Which kind of routing of a track is addressed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SendCategory {
    Receive,
    Send,
    HardwareOutput,
}

impl SendCategory {
    pub fn label(self) -> &'static str {
        use SendCategory::*;
        match self {
            Receive => "receive",
            Send => "send",
            HardwareOutput => "hardware output",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct SendInfo {
    /// Destination track for sends, source track for receives.
    pub partner_name: Option<String>,
    /// Linear volume.
    pub volume: f64,
    pub pan: f64,
    pub is_muted: bool,
}

/// A project marker or region.
#[derive(Clone, PartialEq, Debug)]
pub struct Bookmark {
    pub is_region: bool,
    /// The number displayed in REAPER (not the enumeration index).
    pub number: i32,
    pub position: f64,
    /// Region end. Equals `position` for markers.
    pub end: f64,
    pub name: String,
    pub color: Option<RgbColor>,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TempoMarker {
    pub position: f64,
    pub bpm: f64,
    /// 0 means "inherit".
    pub time_sig_num: i32,
    /// 0 means "inherit".
    pub time_sig_denom: i32,
    pub linear: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ItemInfo {
    pub position: f64,
    pub length: f64,
    pub take_count: u32,
    /// `None` if the item has no active take.
    pub active_take_name: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SelectedItem {
    pub position: f64,
    pub length: f64,
    pub track_index: i32,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MidiNote {
    pub selected: bool,
    pub muted: bool,
    pub start_ppq: f64,
    pub end_ppq: f64,
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MidiCc {
    pub selected: bool,
    pub muted: bool,
    pub ppq_position: f64,
    /// Status byte without channel, e.g. 0xB0 for control change.
    pub chan_msg: u8,
    pub channel: u8,
    /// Controller number for control changes.
    pub msg2: u8,
    /// Controller value for control changes.
    pub msg3: u8,
}

pub const CONTROL_CHANGE: u8 = 0xB0;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EnvelopeInfo {
    pub name: String,
    pub point_count: u32,
    /// Opaque identifier, stable as long as the envelope exists.
    pub id: String,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EnvelopePoint {
    pub time: f64,
    pub value: f64,
    pub shape: i32,
    pub tension: f64,
    pub selected: bool,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct AudioDeviceInfo {
    pub input_count: u32,
    pub output_count: u32,
    pub input_latency: i32,
    pub output_latency: i32,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MidiDevice {
    pub index: u32,
    pub name: String,
}
