use crate::util::{
    copy_str, ok_or_failed, path_to_c_string, to_c_string, with_string_buffer, CUSTOM_COLOR_FLAG,
};
use c_str_macro::c_str;
use reaper_medium::ProjectContext::CurrentProject;
use reaper_medium::{
    AddFxBehavior, CommandId, MasterTrackBehavior, MediaItem, MediaItemTake, MediaTrack,
    MidiInputDeviceId, MidiOutputDeviceId, ProjectRef, ReaProject, ReaperNormalizedFxParamValue,
    SendTarget, TrackDefaultsBehavior, TrackEnvelope, TrackFxChainType, TrackFxLocation,
    TrackInfoKey, TrackSendCategory, TrackSendDirection, TransferBehavior, UndoScope,
};
use scythe_daw::{
    AudioDeviceInfo, Bookmark, Daw, DawError, DawResult, EnvelopeInfo, EnvelopePoint, FxChain,
    FxInfo, FxPreset, ItemInfo, MidiCc, MidiDevice, MidiNote, PlayState, ProjectInfo, RgbColor,
    SelectedItem, SendCategory, SendInfo, TempoMarker, TimeRange,
};
use std::ffi::{c_int, CStr};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::{null, NonNull};

const MAX_PATH_LENGTH: u32 = 4096;
const NAME_BUFFER_SIZE: u32 = 512;
const PRESET_NAME_BUFFER_SIZE: u32 = 2000;
const INITIAL_CHUNK_SIZE: u32 = 64 * 1024;
const MAX_CHUNK_SIZE: u32 = 64 * 1024 * 1024;

/// Talks to the current project of the REAPER instance this extension is loaded into.
///
/// Not `Send`: REAPER functions must be called from the main thread only.
#[derive(Debug, Default)]
pub struct ReaperDaw {
    _main_thread_only: PhantomData<*const ()>,
}

/// FX chain owner, resolved from an [`FxChain`].
#[derive(Copy, Clone)]
enum FxOwner {
    Track(MediaTrack),
    Take(MediaItemTake),
}

impl ReaperDaw {
    pub fn new() -> Self {
        Self::default()
    }

    /// REAPER's resource directory, e.g. `~/.config/REAPER` on Linux.
    pub fn resource_path() -> PathBuf {
        reaper_high::Reaper::get().resource_path()
    }

    fn project(&self) -> DawResult<ReaProject> {
        medium()
            .enum_projects(ProjectRef::Current, 0)
            .map(|r| r.project)
            .ok_or(DawError::NoProject)
    }

    fn track(&self, index: u32) -> DawResult<MediaTrack> {
        self.project()?;
        medium()
            .get_track(CurrentProject, index)
            .ok_or(DawError::not_found("track", index))
    }

    fn item(&self, track: u32, index: u32) -> DawResult<MediaItem> {
        let track = self.track(track)?;
        let ptr = unsafe { low().GetTrackMediaItem(track.as_ptr(), index as c_int) };
        NonNull::new(ptr).ok_or(DawError::not_found("item", index))
    }

    fn take(&self, track: u32, item: u32) -> DawResult<MediaItemTake> {
        let item_ptr = self.item(track, item)?;
        let ptr = unsafe { low().GetActiveTake(item_ptr.as_ptr()) };
        NonNull::new(ptr).ok_or(DawError::not_found("active take of item", item))
    }

    fn envelope(&self, track: u32, index: u32) -> DawResult<TrackEnvelope> {
        let track = self.track(track)?;
        let ptr = unsafe { low().GetTrackEnvelope(track.as_ptr(), index as c_int) };
        NonNull::new(ptr).ok_or(DawError::not_found("envelope", index))
    }

    fn fx_owner(&self, chain: FxChain) -> DawResult<FxOwner> {
        match chain {
            FxChain::Track(track) => Ok(FxOwner::Track(self.track(track)?)),
            FxChain::Take { track, item } => Ok(FxOwner::Take(self.take(track, item)?)),
        }
    }

    fn track_value(&self, track: u32, key: TrackInfoKey) -> DawResult<f64> {
        let track = self.track(track)?;
        Ok(unsafe { medium().get_media_track_info_value(track, key) })
    }

    fn set_track_value(&mut self, track: u32, key: TrackInfoKey, value: f64) -> DawResult<()> {
        let track = self.track(track)?;
        unsafe { medium().set_media_track_info_value(track, key, value) }
            .map_err(|_| DawError::failed("SetMediaTrackInfo_Value"))
    }

    fn item_info_of(&self, item: MediaItem) -> ItemInfo {
        let reaper = low();
        let item = item.as_ptr();
        unsafe {
            let take = reaper.GetActiveTake(item);
            ItemInfo {
                position: reaper.GetMediaItemInfo_Value(item, c_str!("D_POSITION").as_ptr()),
                length: reaper.GetMediaItemInfo_Value(item, c_str!("D_LENGTH").as_ptr()),
                take_count: reaper.CountTakes(item).max(0) as u32,
                active_take_name: if take.is_null() {
                    None
                } else {
                    Some(copy_str(reaper.GetTakeName(take)))
                },
            }
        }
    }

    fn track_name_of(&self, track: MediaTrack) -> String {
        unsafe { medium().get_set_media_track_info_get_name(track, |n| n.to_str().to_owned()) }
            .unwrap_or_default()
    }

    fn color_from_native(&self, native: c_int) -> Option<RgbColor> {
        if native & CUSTOM_COLOR_FLAG == 0 {
            return None;
        }
        let (mut r, mut g, mut b) = (0, 0, 0);
        unsafe {
            low().ColorFromNative(native & 0x00FF_FFFF, &mut r, &mut g, &mut b);
        }
        Some(RgbColor::rgb(r as u8, g as u8, b as u8))
    }

    fn color_to_native(&self, color: Option<RgbColor>) -> c_int {
        match color {
            None => 0,
            Some(c) => {
                let native = low().ColorToNative(c.r as c_int, c.g as c_int, c.b as c_int);
                native | CUSTOM_COLOR_FLAG
            }
        }
    }

    fn midi_counts(&self, track: u32, item: u32) -> DawResult<(u32, u32)> {
        let take = self.take(track, item)?;
        let (mut notes, mut ccs, mut sysex) = (0, 0, 0);
        unsafe {
            low().MIDI_CountEvts(take.as_ptr(), &mut notes, &mut ccs, &mut sysex);
        }
        Ok((notes.max(0) as u32, ccs.max(0) as u32))
    }

    fn send_value(
        &self,
        track: u32,
        category: SendCategory,
        index: u32,
        key: &CStr,
    ) -> DawResult<f64> {
        let track = self.track(track)?;
        let category = send_category(category).to_raw();
        Ok(unsafe {
            low().GetTrackSendInfo_Value(track.as_ptr(), category, index as c_int, key.as_ptr())
        })
    }

    fn set_send_value(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        key: &CStr,
        value: f64,
    ) -> DawResult<()> {
        let track = self.track(track)?;
        let category = send_category(category).to_raw();
        let ok = unsafe {
            low().SetTrackSendInfo_Value(
                track.as_ptr(),
                category,
                index as c_int,
                key.as_ptr(),
                value,
            )
        };
        ok_or_failed(ok, "SetTrackSendInfo_Value")
    }

    fn loop_time_range(&self, is_loop: bool) -> DawResult<TimeRange> {
        let project = self.project()?;
        let (mut start, mut end) = (0.0, 0.0);
        unsafe {
            low().GetSet_LoopTimeRange2(project.as_ptr(), false, is_loop, &mut start, &mut end, false);
        }
        Ok(TimeRange::new(start, end))
    }

    fn set_loop_time_range(&mut self, is_loop: bool, range: TimeRange) -> DawResult<()> {
        let project = self.project()?;
        let (mut start, mut end) = (range.start, range.end);
        unsafe {
            low().GetSet_LoopTimeRange2(project.as_ptr(), true, is_loop, &mut start, &mut end, false);
        }
        Ok(())
    }
}

fn medium() -> &'static reaper_medium::Reaper {
    reaper_high::Reaper::get().medium_reaper()
}

/// For the functions `reaper-medium` doesn't wrap.
fn low() -> &'static reaper_low::Reaper {
    medium().low()
}

fn normal_fx(index: u32) -> TrackFxLocation {
    TrackFxLocation::NormalFxChain(index)
}

fn send_category(category: SendCategory) -> TrackSendCategory {
    match category {
        SendCategory::Receive => TrackSendCategory::Receive,
        SendCategory::Send => TrackSendCategory::Send,
        SendCategory::HardwareOutput => TrackSendCategory::HardwareOutput,
    }
}

/// Rejects strings REAPER would silently cut off at the first nul byte.
fn valid_str<'a>(value: &'a str, what: &'static str) -> DawResult<&'a str> {
    if value.contains('\0') {
        return Err(DawError::InvalidString { what });
    }
    Ok(value)
}

/// Keeps connected devices only. `name_of` returns whether a device is present and its name.
fn midi_devices(max: u32, name_of: impl Fn(u32) -> (bool, Option<String>)) -> Vec<MidiDevice> {
    (0..max)
        .filter_map(|i| match name_of(i) {
            (true, Some(name)) => Some(MidiDevice { index: i, name }),
            _ => None,
        })
        .collect()
}

impl Daw for ReaperDaw {
    fn check_connection(&self) -> DawResult<()> {
        self.project().map(|_| ())
    }

    fn project_info(&self) -> DawResult<ProjectInfo> {
        let project = self.project()?;
        let reaper = low();
        let path = medium()
            .enum_projects(ProjectRef::Current, MAX_PATH_LENGTH)
            .and_then(|r| r.file_path)
            .map(|p| p.to_string_lossy().into_owned());
        let (name, _) = with_string_buffer(MAX_PATH_LENGTH, |buf, size| unsafe {
            reaper.GetProjectName(project.as_ptr(), buf, size)
        });
        let (mut num, mut denom, mut tempo) = (0, 0, 0.0);
        unsafe {
            reaper.TimeMap_GetTimeSigAtTime(project.as_ptr(), 0.0, &mut num, &mut denom, &mut tempo);
        }
        let project_rate = unsafe {
            reaper.GetSetProjectInfo(project.as_ptr(), c_str!("PROJECT_SRATE").as_ptr(), 0.0, false)
        };
        let sample_rate = if project_rate > 0.0 {
            project_rate
        } else {
            let (rate, ok) = with_string_buffer(NAME_BUFFER_SIZE, |buf, size| unsafe {
                reaper.GetAudioDeviceInfo(c_str!("SRATE").as_ptr(), buf, size)
            });
            if ok {
                rate.trim().parse().unwrap_or(0.0)
            } else {
                0.0
            }
        };
        Ok(ProjectInfo {
            name,
            path,
            bpm: medium().master_get_tempo().get(),
            beats_per_measure: num,
            beat_value: denom,
            track_count: medium().count_tracks(CurrentProject),
            length: unsafe { reaper.GetProjectLength(project.as_ptr()) },
            sample_rate: sample_rate as u32,
            is_dirty: medium().is_project_dirty(CurrentProject),
        })
    }

    fn play_state(&self) -> DawResult<PlayState> {
        let project = self.project()?;
        let bits = unsafe { low().GetPlayStateEx(project.as_ptr()) };
        Ok(PlayState {
            is_playing: bits & 1 != 0,
            is_paused: bits & 2 != 0,
            is_recording: bits & 4 != 0,
        })
    }

    fn cursor_position(&self) -> DawResult<f64> {
        let project = self.project()?;
        Ok(unsafe { low().GetCursorPositionEx(project.as_ptr()) })
    }

    fn set_cursor_position(&mut self, position: f64) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().SetEditCurPos2(project.as_ptr(), position, true, true) };
        Ok(())
    }

    fn play_position(&self) -> DawResult<f64> {
        let project = self.project()?;
        Ok(unsafe { low().GetPlayPositionEx(project.as_ptr()) })
    }

    fn play(&mut self) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().OnPlayButtonEx(project.as_ptr()) };
        Ok(())
    }

    fn stop(&mut self) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().OnStopButtonEx(project.as_ptr()) };
        Ok(())
    }

    fn pause(&mut self) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().OnPauseButtonEx(project.as_ptr()) };
        Ok(())
    }

    fn record(&mut self) -> DawResult<()> {
        self.project()?;
        low().CSurf_OnRecord();
        Ok(())
    }

    fn save_project(&mut self, path: Option<&str>) -> DawResult<()> {
        let project = self.project()?;
        match path.filter(|p| !p.is_empty()) {
            None => unsafe { low().Main_SaveProject(project.as_ptr(), false) },
            Some(p) => {
                let p = to_c_string(p, "project path")?;
                unsafe { low().Main_SaveProjectEx(project.as_ptr(), p.as_ptr(), 0) }
            }
        }
        Ok(())
    }

    fn begin_undo_block(&mut self) -> DawResult<()> {
        self.project()?;
        medium().undo_begin_block_2(CurrentProject);
        Ok(())
    }

    fn end_undo_block(&mut self, label: &str) -> DawResult<()> {
        self.project()?;
        let label = valid_str(label, "undo label")?;
        medium().undo_end_block_2(CurrentProject, label, UndoScope::All);
        Ok(())
    }

    fn track_count(&self) -> DawResult<u32> {
        self.project()?;
        Ok(medium().count_tracks(CurrentProject))
    }

    fn track_name(&self, track: u32) -> DawResult<String> {
        let track = self.track(track)?;
        Ok(self.track_name_of(track))
    }

    fn set_track_name(&mut self, track: u32, name: &str) -> DawResult<()> {
        let track = self.track(track)?;
        let name = valid_str(name, "track name")?;
        unsafe { medium().get_set_media_track_info_set_name(track, name) };
        Ok(())
    }

    fn insert_track(&mut self, index: u32, name: &str) -> DawResult<()> {
        self.project()?;
        medium().insert_track_at_index(index, TrackDefaultsBehavior::AddDefaultEnvAndFx);
        low().TrackList_AdjustWindows(false);
        if !name.is_empty() {
            self.set_track_name(index, name)?;
        }
        Ok(())
    }

    fn remove_track(&mut self, track: u32) -> DawResult<()> {
        let track = self.track(track)?;
        unsafe { medium().delete_track(track) };
        Ok(())
    }

    fn track_volume(&self, track: u32) -> DawResult<f64> {
        self.track_value(track, TrackInfoKey::Vol)
    }

    fn set_track_volume(&mut self, track: u32, volume: f64) -> DawResult<()> {
        self.set_track_value(track, TrackInfoKey::Vol, volume)
    }

    fn track_pan(&self, track: u32) -> DawResult<f64> {
        self.track_value(track, TrackInfoKey::Pan)
    }

    fn set_track_pan(&mut self, track: u32, pan: f64) -> DawResult<()> {
        self.set_track_value(track, TrackInfoKey::Pan, pan)
    }

    fn track_is_muted(&self, track: u32) -> DawResult<bool> {
        Ok(self.track_value(track, TrackInfoKey::Mute)? != 0.0)
    }

    fn set_track_muted(&mut self, track: u32, muted: bool) -> DawResult<()> {
        self.set_track_value(track, TrackInfoKey::Mute, muted as u8 as f64)
    }

    fn track_is_solo(&self, track: u32) -> DawResult<bool> {
        Ok(self.track_value(track, TrackInfoKey::Solo)? != 0.0)
    }

    fn set_track_solo(&mut self, track: u32, solo: bool) -> DawResult<()> {
        self.set_track_value(track, TrackInfoKey::Solo, solo as u8 as f64)
    }

    fn track_is_armed(&self, track: u32) -> DawResult<bool> {
        Ok(self.track_value(track, TrackInfoKey::RecArm)? != 0.0)
    }

    fn set_track_armed(&mut self, track: u32, armed: bool) -> DawResult<()> {
        self.set_track_value(track, TrackInfoKey::RecArm, armed as u8 as f64)
    }

    fn track_color(&self, track: u32) -> DawResult<Option<RgbColor>> {
        let native = self.track_value(track, TrackInfoKey::CustomColor)? as c_int;
        Ok(self.color_from_native(native))
    }

    fn set_track_color(&mut self, track: u32, color: RgbColor) -> DawResult<()> {
        let native = self.color_to_native(Some(color));
        self.set_track_value(track, TrackInfoKey::CustomColor, native as f64)
    }

    fn track_automation_mode(&self, track: u32) -> DawResult<i32> {
        let track = self.track(track)?;
        // The medium wrapper panics on modes it doesn't know.
        Ok(unsafe { low().GetTrackAutomationMode(track.as_ptr()) })
    }

    fn set_track_automation_mode(&mut self, track: u32, mode: i32) -> DawResult<()> {
        let track = self.track(track)?;
        unsafe { low().SetTrackAutomationMode(track.as_ptr(), mode) };
        Ok(())
    }

    fn select_track_exclusively(&mut self, track: u32) -> DawResult<()> {
        let track = self.track(track)?;
        unsafe { medium().set_only_track_selected(Some(track)) };
        Ok(())
    }

    fn fx_count(&self, chain: FxChain) -> DawResult<u32> {
        Ok(match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe { medium().track_fx_get_count(t) },
            FxOwner::Take(t) => unsafe { low().TakeFX_GetCount(t.as_ptr()) }.max(0) as u32,
        })
    }

    fn fx_info(&self, chain: FxChain, fx: u32) -> DawResult<FxInfo> {
        let not_found = || DawError::not_found("FX", fx);
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                let reaper = medium();
                let name = reaper
                    .track_fx_get_fx_name(t, normal_fx(fx), NAME_BUFFER_SIZE)
                    .map_err(|_| not_found())?;
                Ok(FxInfo {
                    name: name.into_string(),
                    is_enabled: reaper.track_fx_get_enabled(t, normal_fx(fx)),
                    is_online: !reaper.track_fx_get_offline(t, normal_fx(fx)),
                })
            },
            FxOwner::Take(t) => unsafe {
                let reaper = low();
                let (take, fx) = (t.as_ptr(), fx as c_int);
                let (name, found) = with_string_buffer(NAME_BUFFER_SIZE, |buf, size| {
                    reaper.TakeFX_GetFXName(take, fx, buf, size)
                });
                if !found {
                    return Err(not_found());
                }
                Ok(FxInfo {
                    name,
                    is_enabled: reaper.TakeFX_GetEnabled(take, fx),
                    is_online: !reaper.TakeFX_GetOffline(take, fx),
                })
            },
        }
    }

    fn fx_param_count(&self, chain: FxChain, fx: u32) -> DawResult<u32> {
        Ok(match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe { medium().track_fx_get_num_params(t, normal_fx(fx)) },
            FxOwner::Take(t) => {
                unsafe { low().TakeFX_GetNumParams(t.as_ptr(), fx as c_int) }.max(0) as u32
            }
        })
    }

    fn fx_param_name(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String> {
        let not_found = || DawError::not_found("parameter", param);
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                medium().track_fx_get_param_name(t, normal_fx(fx), param, NAME_BUFFER_SIZE)
            }
            .map(|name| name.into_string())
            .map_err(|_| not_found()),
            FxOwner::Take(t) => {
                let (name, found) = with_string_buffer(NAME_BUFFER_SIZE, |buf, size| unsafe {
                    low().TakeFX_GetParamName(t.as_ptr(), fx as c_int, param as c_int, buf, size)
                });
                if found {
                    Ok(name)
                } else {
                    Err(not_found())
                }
            }
        }
    }

    fn fx_param_value(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<f64> {
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                medium().track_fx_get_param_normalized(t, normal_fx(fx), param)
            }
            .map(|v| v.get())
            .map_err(|_| DawError::not_found("parameter", param)),
            FxOwner::Take(t) => Ok(unsafe {
                low().TakeFX_GetParamNormalized(t.as_ptr(), fx as c_int, param as c_int)
            }),
        }
    }

    fn fx_param_formatted(&self, chain: FxChain, fx: u32, param: u32) -> DawResult<String> {
        let failed = || DawError::failed("TrackFX_GetFormattedParamValue");
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                medium().track_fx_get_formatted_param_value(
                    t,
                    normal_fx(fx),
                    param,
                    NAME_BUFFER_SIZE,
                )
            }
            .map(|value| value.into_string())
            .map_err(|_| failed()),
            FxOwner::Take(t) => {
                let (value, ok) = with_string_buffer(NAME_BUFFER_SIZE, |buf, size| unsafe {
                    low().TakeFX_GetFormattedParamValue(
                        t.as_ptr(),
                        fx as c_int,
                        param as c_int,
                        buf,
                        size,
                    )
                });
                if ok {
                    Ok(value)
                } else {
                    Err(failed())
                }
            }
        }
    }

    fn set_fx_param_value(
        &mut self,
        chain: FxChain,
        fx: u32,
        param: u32,
        value: f64,
    ) -> DawResult<()> {
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                medium().track_fx_set_param_normalized(
                    t,
                    normal_fx(fx),
                    param,
                    ReaperNormalizedFxParamValue::new(value),
                )
            }
            .map_err(|_| DawError::failed("TrackFX_SetParamNormalized")),
            FxOwner::Take(t) => {
                let ok = unsafe {
                    low().TakeFX_SetParamNormalized(t.as_ptr(), fx as c_int, param as c_int, value)
                };
                ok_or_failed(ok, "TakeFX_SetParamNormalized")
            }
        }
    }

    fn add_fx(&mut self, chain: FxChain, name: &str) -> DawResult<Option<u32>> {
        let owner = self.fx_owner(chain)?;
        let index = match owner {
            FxOwner::Track(t) => {
                let name = valid_str(name, "FX name")?;
                unsafe {
                    medium().track_fx_add_by_name_add(
                        t,
                        name,
                        TrackFxChainType::NormalFxChain,
                        AddFxBehavior::AlwaysAdd,
                    )
                }
                .ok()
            }
            FxOwner::Take(t) => {
                let c_name = to_c_string(name, "FX name")?;
                // -1 always instantiates a new FX
                let index = unsafe { low().TakeFX_AddByName(t.as_ptr(), c_name.as_ptr(), -1) };
                u32::try_from(index).ok()
            }
        };
        if index.is_none() {
            tracing::debug!(msg = "REAPER couldn't instantiate FX", name, ?chain);
        }
        Ok(index)
    }

    fn remove_fx(&mut self, chain: FxChain, fx: u32) -> DawResult<()> {
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe { medium().track_fx_delete(t, normal_fx(fx)) }
                .map_err(|_| DawError::failed("TrackFX_Delete")),
            FxOwner::Take(t) => {
                let ok = unsafe { low().TakeFX_Delete(t.as_ptr(), fx as c_int) };
                ok_or_failed(ok, "TakeFX_Delete")
            }
        }
    }

    fn set_fx_enabled(&mut self, chain: FxChain, fx: u32, enabled: bool) -> DawResult<()> {
        match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                medium().track_fx_set_enabled(t, normal_fx(fx), enabled)
            },
            FxOwner::Take(t) => unsafe { low().TakeFX_SetEnabled(t.as_ptr(), fx as c_int, enabled) },
        }
        Ok(())
    }

    fn fx_preset(&self, chain: FxChain, fx: u32) -> DawResult<FxPreset> {
        let (name, index, count) = match self.fx_owner(chain)? {
            FxOwner::Track(t) => unsafe {
                let reaper = medium();
                let name = reaper
                    .track_fx_get_preset(t, normal_fx(fx), PRESET_NAME_BUFFER_SIZE)
                    .name
                    .map(|n| n.into_string());
                let position = reaper.track_fx_get_preset_index(t, normal_fx(fx));
                (
                    name,
                    position.index.map_or(-1, |i| i as i32),
                    position.count,
                )
            },
            FxOwner::Take(t) => unsafe {
                let reaper = low();
                let (take, fx) = (t.as_ptr(), fx as c_int);
                let (name, _) = with_string_buffer(PRESET_NAME_BUFFER_SIZE, |buf, size| {
                    reaper.TakeFX_GetPreset(take, fx, buf, size)
                });
                let mut count = 0;
                let index = reaper.TakeFX_GetPresetIndex(take, fx, &mut count);
                (Some(name), index, count.max(0) as u32)
            },
        };
        Ok(FxPreset {
            name: name.filter(|n| !n.is_empty()),
            index,
            count,
        })
    }

    fn set_fx_preset(&mut self, chain: FxChain, fx: u32, name: &str) -> DawResult<bool> {
        Ok(match self.fx_owner(chain)? {
            FxOwner::Track(t) => {
                let name = valid_str(name, "preset name")?;
                unsafe { medium().track_fx_set_preset(t, normal_fx(fx), name) }.is_ok()
            }
            FxOwner::Take(t) => {
                let name = to_c_string(name, "preset name")?;
                unsafe { low().TakeFX_SetPreset(t.as_ptr(), fx as c_int, name.as_ptr()) }
            }
        })
    }

    fn navigate_fx_presets(&mut self, chain: FxChain, fx: u32, delta: i32) -> DawResult<bool> {
        Ok(match self.fx_owner(chain)? {
            FxOwner::Track(t) => {
                unsafe { medium().track_fx_navigate_presets(t, normal_fx(fx), delta) }.is_ok()
            }
            FxOwner::Take(t) => unsafe {
                low().TakeFX_NavigatePresets(t.as_ptr(), fx as c_int, delta)
            },
        })
    }

    fn copy_fx_to_track(
        &mut self,
        src_track: u32,
        src_fx: u32,
        dst_track: u32,
        dst_position: i32,
    ) -> DawResult<()> {
        let src = self.track(src_track)?;
        let dst = self.track(dst_track)?;
        let reaper = medium();
        unsafe {
            let position = u32::try_from(dst_position)
                .unwrap_or_else(|_| reaper.track_fx_get_count(dst));
            reaper.track_fx_copy_to_track(
                (src, normal_fx(src_fx)),
                (dst, normal_fx(position)),
                TransferBehavior::Copy,
            );
        }
        Ok(())
    }

    fn send_count(&self, track: u32, category: SendCategory) -> DawResult<u32> {
        let track = self.track(track)?;
        Ok(unsafe { medium().get_track_num_sends(track, send_category(category)) })
    }

    fn send_info(&self, track: u32, category: SendCategory, index: u32) -> DawResult<SendInfo> {
        let track_ptr = self.track(track)?;
        let partner = unsafe {
            match category {
                SendCategory::Send => medium()
                    .get_track_send_info_desttrack(track_ptr, TrackSendDirection::Send, index)
                    .ok(),
                SendCategory::Receive => medium()
                    .get_track_send_info_srctrack(track_ptr, TrackSendDirection::Receive, index)
                    .ok(),
                SendCategory::HardwareOutput => None,
            }
        };
        Ok(SendInfo {
            partner_name: partner.map(|t| self.track_name_of(t)),
            volume: self.send_value(track, category, index, c_str!("D_VOL"))?,
            pan: self.send_value(track, category, index, c_str!("D_PAN"))?,
            is_muted: self.send_value(track, category, index, c_str!("B_MUTE"))? != 0.0,
        })
    }

    fn create_send(&mut self, src_track: u32, dst_track: u32) -> DawResult<Option<u32>> {
        let src = self.track(src_track)?;
        let dst = self.track(dst_track)?;
        Ok(unsafe { medium().create_track_send(src, SendTarget::OtherTrack(dst)) }.ok())
    }

    fn remove_send(&mut self, track: u32, category: SendCategory, index: u32) -> DawResult<()> {
        let track = self.track(track)?;
        let category = send_category(category).to_raw();
        let ok = unsafe { low().RemoveTrackSend(track.as_ptr(), category, index as c_int) };
        ok_or_failed(ok, "RemoveTrackSend")
    }

    fn set_send_volume(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        volume: f64,
    ) -> DawResult<()> {
        self.set_send_value(track, category, index, c_str!("D_VOL"), volume)
    }

    fn set_send_pan(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        pan: f64,
    ) -> DawResult<()> {
        self.set_send_value(track, category, index, c_str!("D_PAN"), pan)
    }

    fn set_send_muted(
        &mut self,
        track: u32,
        category: SendCategory,
        index: u32,
        muted: bool,
    ) -> DawResult<()> {
        self.set_send_value(track, category, index, c_str!("B_MUTE"), muted as u8 as f64)
    }

    fn bookmarks(&self) -> DawResult<Vec<Bookmark>> {
        let project = self.project()?;
        let reaper = low();
        let mut bookmarks = vec![];
        for i in 0.. {
            let mut is_region = false;
            let (mut position, mut end) = (0.0, 0.0);
            let mut name = null();
            let (mut number, mut color) = (0, 0);
            let next = unsafe {
                reaper.EnumProjectMarkers3(
                    project.as_ptr(),
                    i,
                    &mut is_region,
                    &mut position,
                    &mut end,
                    &mut name,
                    &mut number,
                    &mut color,
                )
            };
            if next == 0 {
                break;
            }
            bookmarks.push(Bookmark {
                is_region,
                number,
                position,
                end: if is_region { end } else { position },
                name: unsafe { copy_str(name) },
                color: self.color_from_native(color),
            });
        }
        Ok(bookmarks)
    }

    fn add_marker(&mut self, position: f64, name: &str, color: Option<RgbColor>) -> DawResult<i32> {
        let project = self.project()?;
        let name = to_c_string(name, "marker name")?;
        let color = self.color_to_native(color);
        let number = unsafe {
            low().AddProjectMarker2(project.as_ptr(), false, position, 0.0, name.as_ptr(), -1, color)
        };
        if number < 0 {
            return Err(DawError::failed("AddProjectMarker2"));
        }
        Ok(number)
    }

    fn add_region(
        &mut self,
        start: f64,
        end: f64,
        name: &str,
        color: Option<RgbColor>,
    ) -> DawResult<i32> {
        let project = self.project()?;
        let name = to_c_string(name, "region name")?;
        let color = self.color_to_native(color);
        let number = unsafe {
            low().AddProjectMarker2(project.as_ptr(), true, start, end, name.as_ptr(), -1, color)
        };
        if number < 0 {
            return Err(DawError::failed("AddProjectMarker2"));
        }
        Ok(number)
    }

    fn delete_bookmark(&mut self, number: i32, is_region: bool) -> DawResult<bool> {
        let project = self.project()?;
        Ok(unsafe { low().DeleteProjectMarker(project.as_ptr(), number, is_region) })
    }

    fn go_to_marker(&mut self, number: i32) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().GoToMarker(project.as_ptr(), number, false) };
        Ok(())
    }

    fn master_tempo(&self) -> DawResult<f64> {
        self.project()?;
        Ok(medium().master_get_tempo().get())
    }

    fn tempo_marker_count(&self) -> DawResult<u32> {
        let project = self.project()?;
        Ok(unsafe { low().CountTempoTimeSigMarkers(project.as_ptr()) }.max(0) as u32)
    }

    fn tempo_marker(&self, index: u32) -> DawResult<TempoMarker> {
        let project = self.project()?;
        let (mut position, mut beat_position, mut bpm) = (0.0, 0.0, 0.0);
        let (mut measure_position, mut num, mut denom) = (0, 0, 0);
        let mut linear = false;
        let found = unsafe {
            low().GetTempoTimeSigMarker(
                project.as_ptr(),
                index as c_int,
                &mut position,
                &mut measure_position,
                &mut beat_position,
                &mut bpm,
                &mut num,
                &mut denom,
                &mut linear,
            )
        };
        if !found {
            return Err(DawError::not_found("tempo marker", index));
        }
        Ok(TempoMarker {
            position,
            bpm,
            time_sig_num: num,
            time_sig_denom: denom,
            linear,
        })
    }

    fn set_tempo_marker(&mut self, index: Option<u32>, marker: &TempoMarker) -> DawResult<bool> {
        let project = self.project()?;
        let index = index.map(|i| i as c_int).unwrap_or(-1);
        let ok = unsafe {
            low().SetTempoTimeSigMarker(
                project.as_ptr(),
                index,
                marker.position,
                -1,
                -1.0,
                marker.bpm,
                marker.time_sig_num,
                marker.time_sig_denom,
                marker.linear,
            )
        };
        medium().update_timeline();
        Ok(ok)
    }

    fn delete_tempo_marker(&mut self, index: u32) -> DawResult<bool> {
        let project = self.project()?;
        let ok = unsafe { low().DeleteTempoTimeSigMarker(project.as_ptr(), index as c_int) };
        medium().update_timeline();
        Ok(ok)
    }

    fn item_count(&self, track: u32) -> DawResult<u32> {
        let track = self.track(track)?;
        Ok(unsafe { low().CountTrackMediaItems(track.as_ptr()) }.max(0) as u32)
    }

    fn item_info(&self, track: u32, item: u32) -> DawResult<ItemInfo> {
        let item = self.item(track, item)?;
        Ok(self.item_info_of(item))
    }

    fn selected_items(&self) -> DawResult<Vec<SelectedItem>> {
        let project = self.project()?;
        let reaper = low();
        let count = unsafe { reaper.CountSelectedMediaItems(project.as_ptr()) };
        let mut items = Vec::with_capacity(count.max(0) as usize);
        for i in 0..count {
            let item = match NonNull::new(unsafe { reaper.GetSelectedMediaItem(project.as_ptr(), i) })
            {
                Some(item) => item,
                None => continue,
            };
            let track = NonNull::new(unsafe { reaper.GetMediaItem_Track(item.as_ptr()) });
            let track_number = track.map_or(0.0, |t| unsafe {
                medium().get_media_track_info_value(t, TrackInfoKey::TrackNumber)
            });
            let info = self.item_info_of(item);
            items.push(SelectedItem {
                position: info.position,
                length: info.length,
                track_index: track_number as i32 - 1,
            });
        }
        Ok(items)
    }

    fn add_item(&mut self, track: u32, position: f64, length: f64) -> DawResult<ItemInfo> {
        let track = self.track(track)?;
        let reaper = low();
        let item = NonNull::new(unsafe { reaper.AddMediaItemToTrack(track.as_ptr()) })
            .ok_or(DawError::failed("AddMediaItemToTrack"))?;
        unsafe {
            reaper.SetMediaItemPosition(item.as_ptr(), position, false);
            reaper.SetMediaItemLength(item.as_ptr(), length, false);
        }
        reaper.UpdateArrange();
        Ok(self.item_info_of(item))
    }

    fn delete_item(&mut self, track: u32, item: u32) -> DawResult<()> {
        let track_ptr = self.track(track)?;
        let item = self.item(track, item)?;
        let ok = unsafe { low().DeleteTrackMediaItem(track_ptr.as_ptr(), item.as_ptr()) };
        low().UpdateArrange();
        ok_or_failed(ok, "DeleteTrackMediaItem")
    }

    fn set_item_position(&mut self, track: u32, item: u32, position: f64) -> DawResult<()> {
        let item = self.item(track, item)?;
        let ok = unsafe { low().SetMediaItemPosition(item.as_ptr(), position, true) };
        ok_or_failed(ok, "SetMediaItemPosition")
    }

    fn set_item_length(&mut self, track: u32, item: u32, length: f64) -> DawResult<()> {
        let item = self.item(track, item)?;
        let ok = unsafe { low().SetMediaItemLength(item.as_ptr(), length, true) };
        ok_or_failed(ok, "SetMediaItemLength")
    }

    fn split_item(&mut self, track: u32, item: u32, position: f64) -> DawResult<bool> {
        let item = self.item(track, item)?;
        let right = unsafe { low().SplitMediaItem(item.as_ptr(), position) };
        low().UpdateArrange();
        Ok(!right.is_null())
    }

    fn create_midi_item(&mut self, track: u32, start: f64, end: f64) -> DawResult<()> {
        let track = self.track(track)?;
        let item = unsafe { low().CreateNewMIDIItemInProj(track.as_ptr(), start, end, null()) };
        if item.is_null() {
            return Err(DawError::failed("CreateNewMIDIItemInProj"));
        }
        Ok(())
    }

    fn midi_note_count(&self, track: u32, item: u32) -> DawResult<u32> {
        Ok(self.midi_counts(track, item)?.0)
    }

    fn midi_note(&self, track: u32, item: u32, index: u32) -> DawResult<MidiNote> {
        let take = self.take(track, item)?;
        let (mut selected, mut muted) = (false, false);
        let (mut start, mut end) = (0.0, 0.0);
        let (mut channel, mut pitch, mut velocity) = (0, 0, 0);
        let found = unsafe {
            low().MIDI_GetNote(
                take.as_ptr(),
                index as c_int,
                &mut selected,
                &mut muted,
                &mut start,
                &mut end,
                &mut channel,
                &mut pitch,
                &mut velocity,
            )
        };
        if !found {
            return Err(DawError::not_found("note", index));
        }
        Ok(MidiNote {
            selected,
            muted,
            start_ppq: start,
            end_ppq: end,
            channel: channel as u8,
            pitch: pitch as u8,
            velocity: velocity as u8,
        })
    }

    fn insert_midi_note(&mut self, track: u32, item: u32, note: &MidiNote) -> DawResult<()> {
        let take = self.take(track, item)?;
        let no_sort = true;
        let ok = unsafe {
            low().MIDI_InsertNote(
                take.as_ptr(),
                note.selected,
                note.muted,
                note.start_ppq,
                note.end_ppq,
                note.channel as c_int,
                note.pitch as c_int,
                note.velocity as c_int,
                &no_sort,
            )
        };
        ok_or_failed(ok, "MIDI_InsertNote")
    }

    fn set_midi_note(
        &mut self,
        track: u32,
        item: u32,
        index: u32,
        note: &MidiNote,
    ) -> DawResult<()> {
        let take = self.take(track, item)?;
        let (channel, pitch, velocity) = (
            note.channel as c_int,
            note.pitch as c_int,
            note.velocity as c_int,
        );
        let no_sort = true;
        let ok = unsafe {
            low().MIDI_SetNote(
                take.as_ptr(),
                index as c_int,
                &note.selected,
                &note.muted,
                &note.start_ppq,
                &note.end_ppq,
                &channel,
                &pitch,
                &velocity,
                &no_sort,
            )
        };
        ok_or_failed(ok, "MIDI_SetNote")
    }

    fn delete_midi_note(&mut self, track: u32, item: u32, index: u32) -> DawResult<()> {
        let take = self.take(track, item)?;
        let ok = unsafe { low().MIDI_DeleteNote(take.as_ptr(), index as c_int) };
        ok_or_failed(ok, "MIDI_DeleteNote")
    }

    fn midi_cc_count(&self, track: u32, item: u32) -> DawResult<u32> {
        Ok(self.midi_counts(track, item)?.1)
    }

    fn midi_cc(&self, track: u32, item: u32, index: u32) -> DawResult<MidiCc> {
        let take = self.take(track, item)?;
        let (mut selected, mut muted, mut position) = (false, false, 0.0);
        let (mut chan_msg, mut channel, mut msg2, mut msg3) = (0, 0, 0, 0);
        let found = unsafe {
            low().MIDI_GetCC(
                take.as_ptr(),
                index as c_int,
                &mut selected,
                &mut muted,
                &mut position,
                &mut chan_msg,
                &mut channel,
                &mut msg2,
                &mut msg3,
            )
        };
        if !found {
            return Err(DawError::not_found("CC event", index));
        }
        Ok(MidiCc {
            selected,
            muted,
            ppq_position: position,
            chan_msg: chan_msg as u8,
            channel: channel as u8,
            msg2: msg2 as u8,
            msg3: msg3 as u8,
        })
    }

    fn insert_midi_cc(&mut self, track: u32, item: u32, cc: &MidiCc) -> DawResult<()> {
        let take = self.take(track, item)?;
        let ok = unsafe {
            low().MIDI_InsertCC(
                take.as_ptr(),
                cc.selected,
                cc.muted,
                cc.ppq_position,
                cc.chan_msg as c_int,
                cc.channel as c_int,
                cc.msg2 as c_int,
                cc.msg3 as c_int,
            )
        };
        ok_or_failed(ok, "MIDI_InsertCC")
    }

    fn delete_midi_cc(&mut self, track: u32, item: u32, index: u32) -> DawResult<()> {
        let take = self.take(track, item)?;
        let ok = unsafe { low().MIDI_DeleteCC(take.as_ptr(), index as c_int) };
        ok_or_failed(ok, "MIDI_DeleteCC")
    }

    fn sort_midi(&mut self, track: u32, item: u32) -> DawResult<()> {
        let take = self.take(track, item)?;
        unsafe { low().MIDI_Sort(take.as_ptr()) };
        Ok(())
    }

    fn envelope_count(&self, track: u32) -> DawResult<u32> {
        let track = self.track(track)?;
        Ok(unsafe { low().CountTrackEnvelopes(track.as_ptr()) }.max(0) as u32)
    }

    fn envelope_info(&self, track: u32, envelope: u32) -> DawResult<EnvelopeInfo> {
        let envelope = self.envelope(track, envelope)?;
        let reaper = low();
        let (name, _) = with_string_buffer(NAME_BUFFER_SIZE, |buf, size| unsafe {
            reaper.GetEnvelopeName(envelope.as_ptr(), buf, size)
        });
        Ok(EnvelopeInfo {
            name,
            point_count: unsafe { reaper.CountEnvelopePoints(envelope.as_ptr()) }.max(0) as u32,
            id: format!("{:p}", envelope),
        })
    }

    fn envelope_point(&self, track: u32, envelope: u32, index: u32) -> DawResult<EnvelopePoint> {
        let envelope = self.envelope(track, envelope)?;
        let (mut time, mut value, mut tension) = (0.0, 0.0, 0.0);
        let (mut shape, mut selected) = (0, false);
        let found = unsafe {
            low().GetEnvelopePoint(
                envelope.as_ptr(),
                index as c_int,
                &mut time,
                &mut value,
                &mut shape,
                &mut tension,
                &mut selected,
            )
        };
        if !found {
            return Err(DawError::not_found("envelope point", index));
        }
        Ok(EnvelopePoint {
            time,
            value,
            shape,
            tension,
            selected,
        })
    }

    fn insert_envelope_point(
        &mut self,
        track: u32,
        envelope: u32,
        point: &EnvelopePoint,
    ) -> DawResult<()> {
        let envelope = self.envelope(track, envelope)?;
        let mut no_sort = true;
        let ok = unsafe {
            low().InsertEnvelopePoint(
                envelope.as_ptr(),
                point.time,
                point.value,
                point.shape,
                point.tension,
                point.selected,
                &mut no_sort,
            )
        };
        ok_or_failed(ok, "InsertEnvelopePoint")
    }

    fn sort_envelope_points(&mut self, track: u32, envelope: u32) -> DawResult<()> {
        let envelope = self.envelope(track, envelope)?;
        unsafe { low().Envelope_SortPoints(envelope.as_ptr()) };
        Ok(())
    }

    fn delete_envelope_points(
        &mut self,
        track: u32,
        envelope: u32,
        start: f64,
        end: f64,
    ) -> DawResult<()> {
        let envelope = self.envelope(track, envelope)?;
        let ok = unsafe { low().DeleteEnvelopePointRange(envelope.as_ptr(), start, end) };
        ok_or_failed(ok, "DeleteEnvelopePointRange")
    }

    fn clear_envelope(&mut self, track: u32, envelope: u32) -> DawResult<()> {
        let envelope = self.envelope(track, envelope)?;
        // -1 addresses the underlying envelope, not an automation item
        let ok = unsafe {
            low().DeleteEnvelopePointRangeEx(envelope.as_ptr(), -1, f64::MIN, f64::MAX)
        };
        ok_or_failed(ok, "DeleteEnvelopePointRangeEx")
    }

    fn fx_envelope(
        &mut self,
        track: u32,
        fx: u32,
        param: u32,
        create: bool,
    ) -> DawResult<Option<u32>> {
        let track_ptr = self.track(track)?.as_ptr();
        let reaper = low();
        let envelope =
            unsafe { reaper.GetFXEnvelope(track_ptr, fx as c_int, param as c_int, create) };
        if envelope.is_null() {
            return Ok(None);
        }
        let count = unsafe { reaper.CountTrackEnvelopes(track_ptr) };
        let index = (0..count)
            .find(|i| unsafe { reaper.GetTrackEnvelope(track_ptr, *i) } == envelope)
            .ok_or(DawError::failed("GetFXEnvelope"))?;
        Ok(Some(index as u32))
    }

    fn envelope_chunk(&self, track: u32, envelope: u32) -> DawResult<String> {
        let envelope = self.envelope(track, envelope)?;
        let mut size = INITIAL_CHUNK_SIZE;
        loop {
            let (chunk, ok) = with_string_buffer(size, |buf, size| unsafe {
                low().GetEnvelopeStateChunk(envelope.as_ptr(), buf, size, false)
            });
            if !ok {
                return Err(DawError::failed("GetEnvelopeStateChunk"));
            }
            // A chunk filling the whole buffer might have been cut off.
            if (chunk.len() as u32) + 1 < size || size >= MAX_CHUNK_SIZE {
                return Ok(chunk);
            }
            size *= 2;
        }
    }

    fn set_envelope_chunk(&mut self, track: u32, envelope: u32, chunk: &str) -> DawResult<()> {
        let envelope = self.envelope(track, envelope)?;
        let chunk = to_c_string(chunk, "envelope chunk")?;
        let ok = unsafe { low().SetEnvelopeStateChunk(envelope.as_ptr(), chunk.as_ptr(), false) };
        ok_or_failed(ok, "SetEnvelopeStateChunk")
    }

    fn insert_automation_item(
        &mut self,
        track: u32,
        envelope: u32,
        position: f64,
        length: f64,
    ) -> DawResult<i32> {
        let envelope = self.envelope(track, envelope)?;
        // Pool ID -1 creates a new non-pooled item
        let index = unsafe { low().InsertAutomationItem(envelope.as_ptr(), -1, position, length) };
        if index < 0 {
            return Err(DawError::failed("InsertAutomationItem"));
        }
        Ok(index)
    }

    fn time_selection(&self) -> DawResult<TimeRange> {
        self.loop_time_range(false)
    }

    fn set_time_selection(&mut self, range: TimeRange) -> DawResult<()> {
        self.set_loop_time_range(false, range)
    }

    fn loop_points(&self) -> DawResult<TimeRange> {
        self.loop_time_range(true)
    }

    fn set_loop_points(&mut self, range: TimeRange) -> DawResult<()> {
        self.set_loop_time_range(true, range)
    }

    fn repeat_is_enabled(&self) -> DawResult<bool> {
        let project = self.project()?;
        Ok(unsafe { low().GetSetRepeatEx(project.as_ptr(), -1) } == 1)
    }

    fn set_repeat_enabled(&mut self, enabled: bool) -> DawResult<()> {
        let project = self.project()?;
        unsafe { low().GetSetRepeatEx(project.as_ptr(), enabled as c_int) };
        Ok(())
    }

    fn run_command(&mut self, command_id: i32) -> DawResult<()> {
        self.project()?;
        let id = u32::try_from(command_id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or(DawError::InvalidCommandId { id: command_id })?;
        medium().main_on_command_ex(CommandId::new(id), 0, CurrentProject);
        Ok(())
    }

    fn lookup_command(&self, name: &str) -> DawResult<Option<i32>> {
        let name = valid_str(name, "command name")?;
        Ok(medium()
            .named_command_lookup(name)
            .map(|id| id.get() as i32))
    }

    fn ext_state(&self, section: &str, key: &str) -> DawResult<String> {
        let section = to_c_string(section, "section")?;
        let key = to_c_string(key, "key")?;
        Ok(unsafe { copy_str(low().GetExtState(section.as_ptr(), key.as_ptr())) })
    }

    fn set_ext_state(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
        persist: bool,
    ) -> DawResult<()> {
        let section = to_c_string(section, "section")?;
        let key = to_c_string(key, "key")?;
        let value = to_c_string(value, "value")?;
        unsafe { low().SetExtState(section.as_ptr(), key.as_ptr(), value.as_ptr(), persist) };
        Ok(())
    }

    fn delete_ext_state(&mut self, section: &str, key: &str, persist: bool) -> DawResult<()> {
        let section = to_c_string(section, "section")?;
        let key = to_c_string(key, "key")?;
        unsafe { low().DeleteExtState(section.as_ptr(), key.as_ptr(), persist) };
        Ok(())
    }

    fn audio_device_info(&self) -> DawResult<AudioDeviceInfo> {
        let reaper = low();
        let (mut input_latency, mut output_latency) = (0, 0);
        unsafe { reaper.GetInputOutputLatency(&mut input_latency, &mut output_latency) };
        Ok(AudioDeviceInfo {
            input_count: reaper.GetNumAudioInputs().max(0) as u32,
            output_count: reaper.GetNumAudioOutputs().max(0) as u32,
            input_latency,
            output_latency,
        })
    }

    fn midi_input_devices(&self) -> DawResult<Vec<MidiDevice>> {
        let reaper = medium();
        Ok(midi_devices(reaper.get_max_midi_inputs(), |i| {
            let result =
                reaper.get_midi_input_name(MidiInputDeviceId::new(i as u8), NAME_BUFFER_SIZE);
            (result.is_present, result.name.map(|n| n.into_string()))
        }))
    }

    fn midi_output_devices(&self) -> DawResult<Vec<MidiDevice>> {
        let reaper = medium();
        Ok(midi_devices(reaper.get_max_midi_outputs(), |i| {
            let result =
                reaper.get_midi_output_name(MidiOutputDeviceId::new(i as u8), NAME_BUFFER_SIZE);
            (result.is_present, result.name.map(|n| n.into_string()))
        }))
    }

    fn insert_media(&mut self, file_path: &str) -> DawResult<bool> {
        self.project()?;
        if medium().count_selected_tracks_2(CurrentProject, MasterTrackBehavior::ExcludeMasterTrack) == 0 {
            return Ok(false);
        }
        let file = to_c_string(file_path, "file path")?;
        // Mode 0 adds to the current track at the edit cursor
        let result = unsafe { low().InsertMedia(file.as_ptr(), 0) };
        Ok(result >= 0)
    }

    fn register_script(&mut self, path: &Path) -> DawResult<Option<i32>> {
        let path = path_to_c_string(path)?;
        let id = unsafe { low().AddRemoveReaScript(true, 0, path.as_ptr(), true) };
        tracing::debug!(msg = "Registered script", ?path, id);
        Ok(if id == 0 { None } else { Some(id) })
    }

    fn unregister_script(&mut self, path: &Path) -> DawResult<()> {
        let path = path_to_c_string(path)?;
        unsafe { low().AddRemoveReaScript(false, 0, path.as_ptr(), true) };
        Ok(())
    }
}
