//! FX chains of tracks: listing, parameters, presets, copying and probing.
use crate::helpers::{undoable, validate_fx, validate_param, validate_track};
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::{Daw, FxChain};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_track_fx", list_track_fx)
            .description(
                "List all FX on a track.\n\n\
                 Returns slot index, name, enabled state, and online state for every FX in the \
                 track's FX chain.",
            )
            .failure_context("list track FX")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("get_track_fx_params", get_track_fx_params)
            .description(
                "Get all parameters of a track FX plugin.\n\n\
                 Returns each parameter's name, normalized value (0-1), and formatted display \
                 string (e.g. \"-6.0 dB\", \"100 Hz\").",
            )
            .failure_context("get FX params")
            .params(vec![track_index(), fx_index()])
            .read_only(),
        ToolDef::new("get_track_fx_preset", get_track_fx_preset)
            .description(
                "Get the current preset name and index for a track FX.\n\n\
                 Returns the active preset name, its index, and the total number of available \
                 presets.",
            )
            .failure_context("get FX preset")
            .params(vec![track_index(), fx_index()])
            .read_only(),
        ToolDef::new("add_track_fx", add_track_fx)
            .description(
                "Add an FX plugin to a track's FX chain.\n\n\
                 The FX is appended to the end of the chain. Returns the new FX slot index, or \
                 raises an error if the plugin was not found.",
            )
            .failure_context("add FX")
            .params(vec![
                track_index(),
                Param::string(
                    "fx_name",
                    "FX plugin name to add (e.g. 'ReaEQ', 'VST: Compressor')",
                ),
            ]),
        ToolDef::new("remove_track_fx", remove_track_fx)
            .description(
                "Remove an FX plugin from a track's FX chain.\n\n\
                 WARNING: This permanently removes the FX and its settings from the chain. \
                 Subsequent FX indices will shift down by one.",
            )
            .failure_context("remove FX")
            .params(vec![
                track_index(),
                Param::integer("fx_index", "Zero-based FX slot index to remove").min(0.0),
            ])
            .destructive(),
        ToolDef::new("set_track_fx_enabled", set_track_fx_enabled)
            .description("Enable or bypass an FX plugin on a track.")
            .failure_context("set FX enabled state")
            .params(vec![
                track_index(),
                fx_index(),
                Param::boolean("enabled", "True to enable the FX, False to bypass it"),
            ]),
        ToolDef::new("set_track_fx_param", set_track_fx_param)
            .description(
                "Set a normalized parameter value on a track FX.\n\n\
                 The value must be between 0.0 and 1.0. Use get_track_fx_params first to \
                 discover available parameters and their current values.",
            )
            .failure_context("set FX parameter")
            .params(vec![
                track_index(),
                fx_index(),
                param_index(),
                Param::number("value", "Normalized parameter value (0.0 to 1.0)")
                    .range(0.0, 1.0),
            ]),
        ToolDef::new("set_track_fx_preset", set_track_fx_preset)
            .description(
                "Set or navigate FX presets on a track.\n\n\
                 Provide either preset_name to load a specific preset by name, or delta to step \
                 through presets relative to the current one (+1 for next, -1 for previous). \
                 Exactly one of the two must be specified.",
            )
            .failure_context("set FX preset")
            .params(vec![
                track_index(),
                fx_index(),
                Param::string(
                    "preset_name",
                    "Exact preset name to load. Mutually exclusive with delta.",
                )
                .optional(),
                Param::integer(
                    "delta",
                    "Navigate presets by offset (+1 = next, -1 = previous). Mutually exclusive \
                     with preset_name.",
                )
                .optional(),
            ]),
        ToolDef::new("copy_track_fx", copy_track_fx)
            .description(
                "Copy an FX plugin from one track to another.\n\n\
                 The FX and all its parameter settings are duplicated to the destination track. \
                 Use dst_position=-1 to append at the end of the destination chain.",
            )
            .failure_context("copy FX")
            .params(vec![
                Param::integer("src_track_index", "Zero-based source track index").min(0.0),
                Param::integer(
                    "src_fx_index",
                    "Zero-based FX slot index on the source track",
                )
                .min(0.0),
                Param::integer("dst_track_index", "Zero-based destination track index")
                    .min(0.0),
                Param::integer(
                    "dst_position",
                    "Position in destination FX chain (-1 to append at end)",
                )
                .default_value(json!(-1)),
            ]),
        ToolDef::new("probe_fx_param_value", probe_fx_param_value)
            .description(
                "Discover the normalized value that produces a target display string.\n\n\
                 Probes the parameter across a range of normalized values, reading the formatted \
                 display at each step to find a match. The original parameter value is ALWAYS \
                 restored, making this effectively read-only.",
            )
            .failure_context("probe FX parameter")
            .params(vec![
                track_index(),
                fx_index(),
                param_index(),
                Param::string(
                    "target_display",
                    "Target display string to search for (e.g. '1000 Hz', '-6.0 dB')",
                ),
                Param::number("probe_min", "Minimum normalized value to probe")
                    .range(0.0, 1.0)
                    .default_value(json!(0.0)),
                Param::number("probe_max", "Maximum normalized value to probe")
                    .range(0.0, 1.0)
                    .default_value(json!(1.0)),
                Param::integer("probe_steps", "Number of probe steps (higher = more precise)")
                    .range(10.0, 10000.0)
                    .default_value(json!(1000)),
            ])
            .read_only(),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn fx_index() -> Param {
    Param::integer("fx_index", "Zero-based FX slot index").min(0.0)
}

fn param_index() -> Param {
    Param::integer("param_index", "Zero-based parameter index").min(0.0)
}

#[derive(Deserialize)]
struct TrackArgs {
    track_index: u32,
}

fn list_track_fx(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let chain = FxChain::Track(args.track_index);
    let n = daw.fx_count(chain)?;
    let fx = (0..n)
        .map(|i| {
            let info = daw.fx_info(chain, i)?;
            Ok(json!({
                "index": i,
                "name": info.name,
                "is_enabled": info.is_enabled,
                "is_online": info.is_online,
            }))
        })
        .collect::<ToolResult<Vec<_>>>()?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "n_fx": n,
        "fx": fx,
    }))
}

/// Lists all parameters of an FX as index, name, value and formatted value.
pub(crate) fn param_list(daw: &dyn Daw, chain: FxChain, fx: u32) -> ToolResult<Vec<Value>> {
    let n = daw.fx_param_count(chain, fx)?;
    (0..n)
        .map(|i| {
            Ok(json!({
                "index": i,
                "name": daw.fx_param_name(chain, fx, i)?,
                "value": daw.fx_param_value(chain, fx, i)?,
                "formatted": daw.fx_param_formatted(chain, fx, i)?,
            }))
        })
        .collect()
}

#[derive(Deserialize)]
struct FxArgs {
    track_index: u32,
    fx_index: u32,
}

fn get_track_fx_params(daw: &mut dyn Daw, args: FxArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let params = param_list(daw, FxChain::Track(args.track_index), args.fx_index)?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "n_params": params.len(),
        "params": params,
    }))
}

fn get_track_fx_preset(daw: &mut dyn Daw, args: FxArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let preset = daw.fx_preset(FxChain::Track(args.track_index), args.fx_index)?;
    Ok(json!({
        "track_index": args.track_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "preset_name": preset.name,
        "preset_index": preset.index,
        "n_presets": preset.count,
    }))
}

#[derive(Deserialize)]
struct AddFxArgs {
    track_index: u32,
    fx_name: String,
}

fn add_track_fx(daw: &mut dyn Daw, args: AddFxArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let label = format!("Add FX '{}' to track '{}'", args.fx_name, track_name);
    let added = undoable(daw, &label, |daw| {
        Ok(daw.add_fx(FxChain::Track(args.track_index), &args.fx_name)?)
    })?;
    let fx_index = added.ok_or_else(|| fx_not_found(&args.fx_name))?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "fx_index": fx_index,
        "fx_name": args.fx_name,
    }))
}

pub(crate) fn fx_not_found(fx_name: &str) -> ToolError {
    ToolError::invalid(format!(
        "FX '{}' not found. Check the plugin name and ensure it is installed.",
        fx_name
    ))
}

fn remove_track_fx(daw: &mut dyn Daw, args: FxArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let label = format!("Remove FX '{}' from track '{}'", fx_name, track_name);
    undoable(daw, &label, |daw| {
        Ok(daw.remove_fx(FxChain::Track(args.track_index), args.fx_index)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "removed_fx_index": args.fx_index,
        "removed_fx_name": fx_name,
    }))
}

#[derive(Deserialize)]
struct SetFxEnabledArgs {
    track_index: u32,
    fx_index: u32,
    enabled: bool,
}

fn set_track_fx_enabled(daw: &mut dyn Daw, args: SetFxEnabledArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let verb = if args.enabled { "Enable" } else { "Bypass" };
    let label = format!("{} FX '{}' on track '{}'", verb, fx_name, track_name);
    undoable(daw, &label, |daw| {
        Ok(daw.set_fx_enabled(FxChain::Track(args.track_index), args.fx_index, args.enabled)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "is_enabled": args.enabled,
    }))
}

#[derive(Deserialize)]
struct SetFxParamArgs {
    track_index: u32,
    fx_index: u32,
    param_index: u32,
    value: f64,
}

fn set_track_fx_param(daw: &mut dyn Daw, args: SetFxParamArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let chain = FxChain::Track(args.track_index);
    let param_name = validate_param(daw, chain, args.fx_index, &fx_name, args.param_index)?;
    let label = format!(
        "Set '{}' to {:.4} on '{}' (track '{}')",
        param_name, args.value, fx_name, track_name
    );
    undoable(daw, &label, |daw| {
        Ok(daw.set_fx_param_value(chain, args.fx_index, args.param_index, args.value)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "param_index": args.param_index,
        "param_name": param_name,
        "value": args.value,
        "formatted": daw.fx_param_formatted(chain, args.fx_index, args.param_index)?,
    }))
}

#[derive(Deserialize)]
struct SetFxPresetArgs {
    track_index: u32,
    fx_index: u32,
    #[serde(default)]
    preset_name: Option<String>,
    #[serde(default)]
    delta: Option<i32>,
}

fn set_track_fx_preset(daw: &mut dyn Daw, args: SetFxPresetArgs) -> ToolResult<Value> {
    let selection = match (&args.preset_name, args.delta) {
        (None, None) => {
            return Err(ToolError::invalid(
                "Provide either 'preset_name' or 'delta', not neither.",
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ToolError::invalid(
                "Provide either 'preset_name' or 'delta', not both.",
            ))
        }
        (Some(name), None) => Ok(name.as_str()),
        (None, Some(delta)) => Err(delta),
    };
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let chain = FxChain::Track(args.track_index);
    match selection {
        Ok(preset_name) => {
            let label = format!(
                "Set preset '{}' on '{}' (track '{}')",
                preset_name, fx_name, track_name
            );
            let ok = undoable(daw, &label, |daw| {
                Ok(daw.set_fx_preset(chain, args.fx_index, preset_name)?)
            })?;
            if !ok {
                return Err(ToolError::invalid(format!(
                    "Preset '{}' not found for FX '{}'.",
                    preset_name, fx_name
                )));
            }
        }
        Err(delta) => {
            let label = format!(
                "Navigate preset by {:+} on '{}' (track '{}')",
                delta, fx_name, track_name
            );
            let ok = undoable(daw, &label, |daw| {
                Ok(daw.navigate_fx_presets(chain, args.fx_index, delta)?)
            })?;
            if !ok {
                return Err(ToolError::invalid(format!(
                    "Failed to navigate presets by {:+} on FX '{}'.",
                    delta, fx_name
                )));
            }
        }
    }
    let preset = daw.fx_preset(chain, args.fx_index)?;
    Ok(json!({
        "track_index": args.track_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "preset_name": preset.name.unwrap_or_default(),
        "preset_index": preset.index,
        "n_presets": preset.count,
    }))
}

#[derive(Deserialize)]
struct CopyFxArgs {
    src_track_index: u32,
    src_fx_index: u32,
    dst_track_index: u32,
    #[serde(default = "append")]
    dst_position: i32,
}

fn append() -> i32 {
    -1
}

fn copy_track_fx(daw: &mut dyn Daw, args: CopyFxArgs) -> ToolResult<Value> {
    let src_name = validate_track(daw, args.src_track_index)?;
    let fx_name = validate_fx(daw, args.src_track_index, &src_name, args.src_fx_index)?;
    let dst_name = validate_track(daw, args.dst_track_index)?;
    if args.dst_position >= 0 {
        let n = daw.fx_count(FxChain::Track(args.dst_track_index))?;
        if args.dst_position as u32 > n {
            return Err(ToolError::invalid(format!(
                "Destination position {} out of range. Destination track '{}' has {} FX \
                 (valid: 0-{}, or -1 to append).",
                args.dst_position, dst_name, n, n
            )));
        }
    }
    let label = format!(
        "Copy FX '{}' from track '{}' to track '{}'",
        fx_name, src_name, dst_name
    );
    undoable(daw, &label, |daw| {
        Ok(daw.copy_fx_to_track(
            args.src_track_index,
            args.src_fx_index,
            args.dst_track_index,
            args.dst_position,
        )?)
    })?;
    Ok(json!({
        "src_track_index": args.src_track_index,
        "src_track_name": src_name,
        "src_fx_index": args.src_fx_index,
        "fx_name": fx_name,
        "dst_track_index": args.dst_track_index,
        "dst_track_name": dst_name,
        "dst_position": args.dst_position,
    }))
}

#[derive(Deserialize)]
struct ProbeArgs {
    track_index: u32,
    fx_index: u32,
    param_index: u32,
    target_display: String,
    #[serde(default)]
    probe_min: f64,
    #[serde(default = "probe_max")]
    probe_max: f64,
    #[serde(default = "probe_steps")]
    probe_steps: u32,
}

fn probe_max() -> f64 {
    1.0
}

fn probe_steps() -> u32 {
    1000
}

/// A match found while sweeping a parameter.
struct ProbeHit {
    value: f64,
    display: String,
}

fn probe_fx_param_value(daw: &mut dyn Daw, args: ProbeArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let fx_name = validate_fx(daw, args.track_index, &track_name, args.fx_index)?;
    let chain = FxChain::Track(args.track_index);
    let (fx, param) = (args.fx_index, args.param_index);
    validate_param(daw, chain, fx, &fx_name, param)?;
    if args.probe_min >= args.probe_max {
        return Err(ToolError::invalid(format!(
            "probe_min ({}) must be less than probe_max ({}).",
            args.probe_min, args.probe_max
        )));
    }
    let original_value = daw.fx_param_value(chain, fx, param)?;
    let original_display = daw.fx_param_formatted(chain, fx, param)?;
    let target = args.target_display.trim().to_lowercase();
    let step = (args.probe_max - args.probe_min) / args.probe_steps as f64;
    let sweep = |daw: &mut dyn Daw| -> ToolResult<Option<ProbeHit>> {
        for i in 0..=args.probe_steps {
            let value = (args.probe_min + i as f64 * step).clamp(0.0, 1.0);
            daw.set_fx_param_value(chain, fx, param, value)?;
            let display = daw.fx_param_formatted(chain, fx, param)?;
            if display.trim().to_lowercase() == target {
                return Ok(Some(ProbeHit { value, display }));
            }
        }
        Ok(None)
    };
    let hit = sweep(daw);
    daw.set_fx_param_value(chain, fx, param, original_value)?;
    let hit = hit?;
    tracing::debug!(
        msg = "Probed FX parameter",
        fx = %fx_name,
        param,
        found = hit.is_some()
    );
    Ok(json!({
        "found": hit.is_some(),
        "internal_value": hit.as_ref().map(|h| h.value),
        "matched_display": hit.as_ref().map(|h| h.display.clone()),
        "target_display": args.target_display,
        "original_value": original_value,
        "original_display": original_display,
        "restored": true,
        "probe_steps": args.probe_steps,
        "probe_min": args.probe_min,
        "probe_max": args.probe_max,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use approx::assert_abs_diff_eq;
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;

    fn daw_with_eq() -> FakeDaw {
        let mut daw = FakeDaw::with_tracks(&["Drums", "Bass"]);
        daw.push_track_fx(0, "ReaEQ");
        daw
    }

    #[test]
    fn list_and_params() {
        let mut daw = daw_with_eq();
        daw.tracks[0].fx[0].enabled = false;
        let result = call(&mut daw, "list_track_fx", json!({"track_index": 0})).unwrap();
        assert_eq!(
            result,
            json!({
                "track_index": 0,
                "track_name": "Drums",
                "n_fx": 1,
                "fx": [{
                    "index": 0,
                    "name": "VST: ReaEQ (Cockos)",
                    "is_enabled": false,
                    "is_online": true,
                }],
            })
        );
        let params = call(
            &mut daw,
            "get_track_fx_params",
            json!({"track_index": 0, "fx_index": 0}),
        )
        .unwrap();
        assert_eq!(params["n_params"], json!(3));
        assert_eq!(
            params["params"][1],
            json!({"index": 1, "name": "Gain-Low Shelf", "value": 0.5, "formatted": "50.0"})
        );
        assert_eq!(
            call_err(
                &mut daw,
                "get_track_fx_params",
                json!({"track_index": 1, "fx_index": 0})
            ),
            "FX index 0 out of range on track 'Bass'. Track has 0 FX (valid: 0–-1)."
        );
    }

    #[test]
    fn add_and_remove() {
        let mut daw = daw_with_eq();
        let added = call(
            &mut daw,
            "add_track_fx",
            json!({"track_index": 1, "fx_name": "ReaComp"}),
        )
        .unwrap();
        assert_eq!(
            added,
            json!({"track_index": 1, "track_name": "Bass", "fx_index": 0, "fx_name": "ReaComp"})
        );
        assert_eq!(daw.last_undo_label(), Some("Add FX 'ReaComp' to track 'Bass'"));
        assert_eq!(
            call_err(
                &mut daw,
                "add_track_fx",
                json!({"track_index": 1, "fx_name": "Serum"})
            ),
            "FX 'Serum' not found. Check the plugin name and ensure it is installed."
        );
        let removed = call(
            &mut daw,
            "remove_track_fx",
            json!({"track_index": 0, "fx_index": 0}),
        )
        .unwrap();
        assert_eq!(removed["removed_fx_name"], json!("VST: ReaEQ (Cockos)"));
        assert!(daw.tracks[0].fx.is_empty());
    }

    #[test]
    fn enable_and_set_param() {
        let mut daw = daw_with_eq();
        call(
            &mut daw,
            "set_track_fx_enabled",
            json!({"track_index": 0, "fx_index": 0, "enabled": false}),
        )
        .unwrap();
        assert_eq!(
            daw.last_undo_label(),
            Some("Bypass FX 'VST: ReaEQ (Cockos)' on track 'Drums'")
        );
        let result = call(
            &mut daw,
            "set_track_fx_param",
            json!({"track_index": 0, "fx_index": 0, "param_index": 2, "value": 0.25}),
        )
        .unwrap();
        assert_eq!(result["param_name"], json!("Q-Low Shelf"));
        assert_eq!(result["formatted"], json!("25.0"));
        assert_eq!(
            daw.last_undo_label(),
            Some("Set 'Q-Low Shelf' to 0.2500 on 'VST: ReaEQ (Cockos)' (track 'Drums')")
        );
        assert_eq!(
            call_err(
                &mut daw,
                "set_track_fx_param",
                json!({"track_index": 0, "fx_index": 0, "param_index": 3, "value": 0.25})
            ),
            "Parameter index 3 out of range. FX 'VST: ReaEQ (Cockos)' has 3 parameters \
             (valid: 0-2)."
        );
    }

    #[test]
    fn presets() {
        let mut daw = daw_with_eq();
        let args = json!({"track_index": 0, "fx_index": 0});
        let preset = call(&mut daw, "get_track_fx_preset", args.clone()).unwrap();
        assert_eq!(preset["preset_name"], json!(null));
        assert_eq!(preset["preset_index"], json!(-1));
        assert_eq!(preset["n_presets"], json!(3));
        assert_eq!(
            call_err(&mut daw, "set_track_fx_preset", args.clone()),
            "Provide either 'preset_name' or 'delta', not neither."
        );
        assert_eq!(
            call_err(
                &mut daw,
                "set_track_fx_preset",
                json!({"track_index": 0, "fx_index": 0, "preset_name": "Warm", "delta": 1})
            ),
            "Provide either 'preset_name' or 'delta', not both."
        );
        let result = call(
            &mut daw,
            "set_track_fx_preset",
            json!({"track_index": 0, "fx_index": 0, "preset_name": "Bright"}),
        )
        .unwrap();
        assert_eq!(result["preset_name"], json!("Bright"));
        assert_eq!(result["preset_index"], json!(1));
        let result = call(
            &mut daw,
            "set_track_fx_preset",
            json!({"track_index": 0, "fx_index": 0, "delta": 1}),
        )
        .unwrap();
        assert_eq!(result["preset_name"], json!("Warm"));
        assert_eq!(
            daw.last_undo_label(),
            Some("Navigate preset by +1 on 'VST: ReaEQ (Cockos)' (track 'Drums')")
        );
        assert_eq!(
            call_err(
                &mut daw,
                "set_track_fx_preset",
                json!({"track_index": 0, "fx_index": 0, "preset_name": "Loud"})
            ),
            "Preset 'Loud' not found for FX 'VST: ReaEQ (Cockos)'."
        );
    }

    #[test]
    fn copy() {
        let mut daw = daw_with_eq();
        daw.tracks[0].fx[0].params[0].value = 0.8;
        assert_eq!(
            call_err(
                &mut daw,
                "copy_track_fx",
                json!({
                    "src_track_index": 0,
                    "src_fx_index": 0,
                    "dst_track_index": 1,
                    "dst_position": 2,
                })
            ),
            "Destination position 2 out of range. Destination track 'Bass' has 0 FX \
             (valid: 0-0, or -1 to append)."
        );
        let result = call(
            &mut daw,
            "copy_track_fx",
            json!({"src_track_index": 0, "src_fx_index": 0, "dst_track_index": 1}),
        )
        .unwrap();
        assert_eq!(result["dst_position"], json!(-1));
        assert_eq!(result["dst_track_name"], json!("Bass"));
        assert_eq!(daw.tracks[1].fx[0].params[0].value, 0.8);
    }

    #[test]
    fn probe_restores_original_value() {
        let mut daw = daw_with_eq();
        daw.tracks[0].fx[0].params[0].value = 0.7;
        let result = call(
            &mut daw,
            "probe_fx_param_value",
            json!({
                "track_index": 0,
                "fx_index": 0,
                "param_index": 0,
                "target_display": " 25.0 ",
            }),
        )
        .unwrap();
        assert_eq!(result["found"], json!(true));
        assert_abs_diff_eq!(
            result["internal_value"].as_f64().unwrap(),
            0.25,
            epsilon = 0.001
        );
        assert_eq!(result["matched_display"], json!("25.0"));
        assert_eq!(result["original_display"], json!("70.0"));
        assert_eq!(result["restored"], json!(true));
        assert_eq!(daw.tracks[0].fx[0].params[0].value, 0.7);
        assert!(daw.undo_history.is_empty());
        let missing = call(
            &mut daw,
            "probe_fx_param_value",
            json!({
                "track_index": 0,
                "fx_index": 0,
                "param_index": 0,
                "target_display": "loud",
                "probe_steps": 10,
            }),
        )
        .unwrap();
        assert_eq!(missing["found"], json!(false));
        assert_eq!(missing["internal_value"], json!(null));
        assert_eq!(daw.tracks[0].fx[0].params[0].value, 0.7);
    }

    #[test]
    fn probe_range_is_checked() {
        let mut daw = daw_with_eq();
        assert_eq!(
            call_err(
                &mut daw,
                "probe_fx_param_value",
                json!({
                    "track_index": 0,
                    "fx_index": 0,
                    "param_index": 0,
                    "target_display": "x",
                    "probe_min": 0.5,
                    "probe_max": 0.5,
                })
            ),
            "probe_min (0.5) must be less than probe_max (0.5)."
        );
        assert_eq!(
            call_err(
                &mut daw,
                "probe_fx_param_value",
                json!({
                    "track_index": 0,
                    "fx_index": 0,
                    "param_index": 0,
                    "target_display": "x",
                    "probe_steps": 5,
                })
            ),
            "Invalid argument 'probe_steps': must be >= 10, got 5."
        );
    }
}
