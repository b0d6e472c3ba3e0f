//! FX chains of takes. All tools act on the active take of an item.
use crate::groups::track_fx::{fx_not_found, param_list};
use crate::helpers::{
    undoable, validate_active_take, validate_param, validate_take_fx, validate_track,
};
use crate::{ToolDef, ToolResult};
use scythe_daw::{Daw, FxChain};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_take_fx", list_take_fx)
            .description(
                "List all FX on the active take of a media item.\n\n\
                 Returns slot index, name, enabled state, and online state for every FX in the \
                 take's FX chain.",
            )
            .failure_context("list take FX")
            .params(vec![track_index(), item_index()])
            .read_only(),
        ToolDef::new("get_take_fx_params", get_take_fx_params)
            .description(
                "Get all parameters of a take FX plugin.\n\n\
                 Returns each parameter's name, normalized value (0-1), and formatted display \
                 string.",
            )
            .failure_context("get take FX params")
            .params(vec![track_index(), item_index(), fx_index()])
            .read_only(),
        ToolDef::new("add_take_fx", add_take_fx)
            .description(
                "Add an FX plugin to the active take's FX chain.\n\n\
                 The FX is appended to the end of the chain. Returns the new FX slot index, or \
                 raises an error if the plugin was not found.",
            )
            .failure_context("add take FX")
            .params(vec![
                track_index(),
                item_index(),
                Param::string(
                    "fx_name",
                    "FX plugin name to add (e.g. 'ReaEQ', 'VST: Compressor')",
                ),
            ]),
        ToolDef::new("remove_take_fx", remove_take_fx)
            .description(
                "Remove an FX plugin from the active take's FX chain.\n\n\
                 WARNING: This permanently removes the FX and its settings from the chain. \
                 Subsequent FX indices will shift down by one.",
            )
            .failure_context("remove take FX")
            .params(vec![
                track_index(),
                item_index(),
                Param::integer("fx_index", "Zero-based FX slot index to remove").min(0.0),
            ])
            .destructive(),
        ToolDef::new("set_take_fx_param", set_take_fx_param)
            .description(
                "Set a normalized parameter value on a take FX.\n\n\
                 The value must be between 0.0 and 1.0. Use get_take_fx_params first to \
                 discover available parameters and their current values.",
            )
            .failure_context("set take FX parameter")
            .params(vec![
                track_index(),
                item_index(),
                fx_index(),
                Param::integer("param_index", "Zero-based parameter index").min(0.0),
                Param::number("value", "Normalized parameter value (0.0 to 1.0)")
                    .range(0.0, 1.0),
            ]),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn item_index() -> Param {
    Param::integer("item_index", "Zero-based item index on the track").min(0.0)
}

fn fx_index() -> Param {
    Param::integer("fx_index", "Zero-based FX slot index").min(0.0)
}

/// Validates track and item, returns the track name and the chain of the active take.
fn take_chain(daw: &dyn Daw, track: u32, item: u32) -> ToolResult<(String, FxChain)> {
    let track_name = validate_track(daw, track)?;
    validate_active_take(daw, track, &track_name, item)?;
    Ok((track_name, FxChain::Take { track, item }))
}

#[derive(Deserialize)]
struct ItemArgs {
    track_index: u32,
    item_index: u32,
}

fn list_take_fx(daw: &mut dyn Daw, args: ItemArgs) -> ToolResult<Value> {
    let (track_name, chain) = take_chain(daw, args.track_index, args.item_index)?;
    let n = daw.fx_count(chain)?;
    let mut fx = Vec::with_capacity(n as usize);
    for i in 0..n {
        let info = daw.fx_info(chain, i)?;
        fx.push(json!({
            "index": i,
            "name": info.name,
            "is_enabled": info.is_enabled,
            "is_online": info.is_online,
        }));
    }
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "item_index": args.item_index,
        "n_fx": n,
        "fx": fx,
    }))
}

#[derive(Deserialize)]
struct TakeFxArgs {
    track_index: u32,
    item_index: u32,
    fx_index: u32,
}

fn get_take_fx_params(daw: &mut dyn Daw, args: TakeFxArgs) -> ToolResult<Value> {
    let (track_name, chain) = take_chain(daw, args.track_index, args.item_index)?;
    let fx_name = validate_take_fx(daw, args.track_index, args.item_index, args.fx_index)?;
    let params = param_list(daw, chain, args.fx_index)?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "item_index": args.item_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "n_params": params.len(),
        "params": params,
    }))
}

#[derive(Deserialize)]
struct AddTakeFxArgs {
    track_index: u32,
    item_index: u32,
    fx_name: String,
}

fn add_take_fx(daw: &mut dyn Daw, args: AddTakeFxArgs) -> ToolResult<Value> {
    let (track_name, chain) = take_chain(daw, args.track_index, args.item_index)?;
    let label = format!(
        "Add FX '{}' to take on track '{}'",
        args.fx_name, track_name
    );
    let added = undoable(daw, &label, |daw| Ok(daw.add_fx(chain, &args.fx_name)?))?;
    let fx_index = added.ok_or_else(|| fx_not_found(&args.fx_name))?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "item_index": args.item_index,
        "fx_index": fx_index,
        "fx_name": args.fx_name,
    }))
}

fn remove_take_fx(daw: &mut dyn Daw, args: TakeFxArgs) -> ToolResult<Value> {
    let (track_name, chain) = take_chain(daw, args.track_index, args.item_index)?;
    let fx_name = validate_take_fx(daw, args.track_index, args.item_index, args.fx_index)?;
    let label = format!(
        "Remove FX '{}' from take on track '{}'",
        fx_name, track_name
    );
    undoable(daw, &label, |daw| Ok(daw.remove_fx(chain, args.fx_index)?))?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "item_index": args.item_index,
        "removed_fx_index": args.fx_index,
        "removed_fx_name": fx_name,
    }))
}

#[derive(Deserialize)]
struct SetTakeFxParamArgs {
    track_index: u32,
    item_index: u32,
    fx_index: u32,
    param_index: u32,
    value: f64,
}

fn set_take_fx_param(daw: &mut dyn Daw, args: SetTakeFxParamArgs) -> ToolResult<Value> {
    let (track_name, chain) = take_chain(daw, args.track_index, args.item_index)?;
    let fx_name = validate_take_fx(daw, args.track_index, args.item_index, args.fx_index)?;
    let param_name = validate_param(daw, chain, args.fx_index, &fx_name, args.param_index)?;
    let label = format!(
        "Set '{}' to {:.4} on take FX '{}' (track '{}')",
        param_name, args.value, fx_name, track_name
    );
    undoable(daw, &label, |daw| {
        Ok(daw.set_fx_param_value(chain, args.fx_index, args.param_index, args.value)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "item_index": args.item_index,
        "fx_index": args.fx_index,
        "fx_name": fx_name,
        "param_index": args.param_index,
        "param_name": param_name,
        "value": args.value,
        "formatted": daw.fx_param_formatted(chain, args.fx_index, args.param_index)?,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::{FakeDaw, FakeItem};
    use serde_json::json;

    fn daw_with_item() -> FakeDaw {
        let mut daw = FakeDaw::with_tracks(&["Vox"]);
        daw.push_item(0, FakeItem::with_take(1.0, 4.0, "vox.wav"));
        daw.push_item(0, FakeItem::new(8.0, 1.0));
        daw
    }

    #[test]
    fn add_list_and_remove() {
        let mut daw = daw_with_item();
        let added = call(
            &mut daw,
            "add_take_fx",
            json!({"track_index": 0, "item_index": 0, "fx_name": "reacomp"}),
        )
        .unwrap();
        assert_eq!(added["fx_index"], json!(0));
        assert_eq!(
            daw.last_undo_label(),
            Some("Add FX 'reacomp' to take on track 'Vox'")
        );
        let listed = call(
            &mut daw,
            "list_take_fx",
            json!({"track_index": 0, "item_index": 0}),
        )
        .unwrap();
        assert_eq!(listed["n_fx"], json!(1));
        assert_eq!(listed["fx"][0]["name"], json!("VST: ReaComp (Cockos)"));
        let removed = call(
            &mut daw,
            "remove_take_fx",
            json!({"track_index": 0, "item_index": 0, "fx_index": 0}),
        )
        .unwrap();
        assert_eq!(removed["removed_fx_name"], json!("VST: ReaComp (Cockos)"));
        assert!(daw.tracks[0].items[0].takes[0].fx.is_empty());
    }

    #[test]
    fn empty_item_has_no_take() {
        let mut daw = daw_with_item();
        assert_eq!(
            call_err(
                &mut daw,
                "list_take_fx",
                json!({"track_index": 0, "item_index": 1})
            ),
            "Item 1 on track 'Vox' has no active take."
        );
        assert_eq!(
            call_err(
                &mut daw,
                "get_take_fx_params",
                json!({"track_index": 0, "item_index": 0, "fx_index": 0})
            ),
            "FX index 0 out of range on take. Take has 0 FX (valid: 0--1)."
        );
    }

    #[test]
    fn set_param() {
        let mut daw = daw_with_item();
        call(
            &mut daw,
            "add_take_fx",
            json!({"track_index": 0, "item_index": 0, "fx_name": "ReaComp"}),
        )
        .unwrap();
        let result = call(
            &mut daw,
            "set_take_fx_param",
            json!({
                "track_index": 0,
                "item_index": 0,
                "fx_index": 0,
                "param_index": 1,
                "value": 1.0,
            }),
        )
        .unwrap();
        assert_eq!(result["param_name"], json!("Ratio"));
        assert_eq!(result["formatted"], json!("100.0"));
        assert_eq!(
            daw.last_undo_label(),
            Some("Set 'Ratio' to 1.0000 on take FX 'VST: ReaComp (Cockos)' (track 'Vox')")
        );
        let params = call(
            &mut daw,
            "get_take_fx_params",
            json!({"track_index": 0, "item_index": 0, "fx_index": 0}),
        )
        .unwrap();
        assert_eq!(params["params"][1]["value"], json!(1.0));
    }
}
