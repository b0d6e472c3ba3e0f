//! Validation and bookkeeping shared by all tool groups.
//!
//! Validators return the data callers usually need next (mostly names for messages) so a
//! tool needs one round trip per object.
use crate::{ToolError, ToolResult};
use scythe_daw::{Daw, EnvelopeInfo, FxChain, ItemInfo, SendCategory};
use std::fmt::Display;

/// Builds the error reported whenever the DAW can't be reached.
pub fn connection_error(cause: impl Display) -> ToolError {
    ToolError::invalid(format!(
        "Cannot connect to REAPER. Ensure REAPER is running with the Scythe extension loaded. \
         Error: {}",
        cause
    ))
}

/// Makes sure there's a project to work on.
pub fn connect(daw: &dyn Daw) -> ToolResult<()> {
    daw.check_connection().map_err(connection_error)
}

/// "s" unless there's exactly one.
pub fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn last_index(n: u32) -> i64 {
    n as i64 - 1
}

/// Returns the track name.
pub fn validate_track(daw: &dyn Daw, track: u32) -> ToolResult<String> {
    let n = daw.track_count()?;
    if track >= n {
        return Err(ToolError::invalid(format!(
            "Track index {} out of range. Project has {} track{} (valid: 0–{}).",
            track,
            n,
            plural(n),
            last_index(n)
        )));
    }
    Ok(daw.track_name(track)?)
}

/// Returns the FX name.
pub fn validate_fx(daw: &dyn Daw, track: u32, track_name: &str, fx: u32) -> ToolResult<String> {
    let n = daw.fx_count(FxChain::Track(track))?;
    if fx >= n {
        return Err(ToolError::invalid(format!(
            "FX index {} out of range on track '{}'. Track has {} FX (valid: 0–{}).",
            fx,
            track_name,
            n,
            last_index(n)
        )));
    }
    Ok(daw.fx_info(FxChain::Track(track), fx)?.name)
}

/// Returns the FX name. The take is the active take of the item.
pub fn validate_take_fx(daw: &dyn Daw, track: u32, item: u32, fx: u32) -> ToolResult<String> {
    let chain = FxChain::Take { track, item };
    let n = daw.fx_count(chain)?;
    if fx >= n {
        return Err(ToolError::invalid(format!(
            "FX index {} out of range on take. Take has {} FX (valid: 0-{}).",
            fx,
            n,
            last_index(n)
        )));
    }
    Ok(daw.fx_info(chain, fx)?.name)
}

pub fn validate_item(
    daw: &dyn Daw,
    track: u32,
    track_name: &str,
    item: u32,
) -> ToolResult<ItemInfo> {
    let n = daw.item_count(track)?;
    if item >= n {
        return Err(ToolError::invalid(format!(
            "Item index {} out of range on track '{}'. Track has {} item{} (valid: 0–{}).",
            item,
            track_name,
            n,
            plural(n),
            last_index(n)
        )));
    }
    Ok(daw.item_info(track, item)?)
}

/// Validates the item and makes sure it has an active take.
pub fn validate_active_take(
    daw: &dyn Daw,
    track: u32,
    track_name: &str,
    item: u32,
) -> ToolResult<ItemInfo> {
    let info = validate_item(daw, track, track_name, item)?;
    if info.active_take_name.is_none() {
        return Err(ToolError::invalid(format!(
            "Item {} on track '{}' has no active take.",
            item, track_name
        )));
    }
    Ok(info)
}

pub fn validate_send(
    daw: &dyn Daw,
    track: u32,
    track_name: &str,
    category: SendCategory,
    index: u32,
) -> ToolResult<()> {
    let n = daw.send_count(track, category)?;
    if index >= n {
        let label = category.label();
        return Err(ToolError::invalid(format!(
            "{} index {} out of range on track '{}'. Track has {} {}{} (valid: 0–{}).",
            capitalize(label),
            index,
            track_name,
            n,
            label,
            plural(n),
            last_index(n)
        )));
    }
    Ok(())
}

pub fn validate_envelope(
    daw: &dyn Daw,
    track: u32,
    track_name: &str,
    envelope: u32,
) -> ToolResult<EnvelopeInfo> {
    let n = daw.envelope_count(track)?;
    if envelope >= n {
        return Err(ToolError::invalid(format!(
            "Envelope index {} out of range on track '{}'. Track has {} envelope{} (valid: 0-{}).",
            envelope,
            track_name,
            n,
            plural(n),
            last_index(n)
        )));
    }
    Ok(daw.envelope_info(track, envelope)?)
}

/// Returns the parameter name.
pub fn validate_param(
    daw: &dyn Daw,
    chain: FxChain,
    fx: u32,
    fx_name: &str,
    param: u32,
) -> ToolResult<String> {
    let n = daw.fx_param_count(chain, fx)?;
    if param >= n {
        return Err(ToolError::invalid(format!(
            "Parameter index {} out of range. FX '{}' has {} parameters (valid: 0-{}).",
            param,
            fx_name,
            n,
            last_index(n)
        )));
    }
    Ok(daw.fx_param_name(chain, fx, param)?)
}

/// Runs the operation within an undo block with the given label.
///
/// The block is closed even if the operation fails.
pub fn undoable<R>(
    daw: &mut dyn Daw,
    label: &str,
    operation: impl FnOnce(&mut dyn Daw) -> ToolResult<R>,
) -> ToolResult<R> {
    daw.begin_undo_block()?;
    let result = operation(&mut *daw);
    let ended = daw.end_undo_block(label);
    let value = result?;
    ended?;
    Ok(value)
}

/// Rounds to the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
