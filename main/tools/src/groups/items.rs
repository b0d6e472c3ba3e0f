//! Media items on tracks.
use crate::helpers::{undoable, validate_item, validate_track};
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_items_on_track", list_items_on_track)
            .description(
                "List all media items on the specified track.\n\n\
                 Returns each item's index, position, length, number of takes, and the active \
                 take name.",
            )
            .failure_context("list items on track")
            .params(vec![track_index()])
            .read_only(),
        ToolDef::new("get_selected_items", get_selected_items)
            .description(
                "Get all currently selected media items across all tracks.\n\n\
                 Returns each item's position, length, and the index of the track it belongs to.",
            )
            .failure_context("get selected items")
            .read_only(),
        ToolDef::new("add_empty_item", add_empty_item)
            .description(
                "Add an empty media item to the specified track.\n\n\
                 The item will have no takes. Use this to create placeholder items or containers \
                 that can receive audio/MIDI data later.",
            )
            .failure_context("add empty item")
            .params(vec![track_index(), position(), length()]),
        ToolDef::new("delete_item", delete_item)
            .description(
                "Delete a media item from the specified track.\n\n\
                 WARNING: This permanently removes the item and all its takes. This action \
                 cannot be undone if the undo history is exhausted.",
            )
            .failure_context("delete item")
            .params(vec![track_index(), item_index()])
            .destructive(),
        ToolDef::new("set_item_position", set_item_position)
            .description("Move a media item to a new position in seconds.")
            .failure_context("set item position")
            .params(vec![track_index(), item_index(), position()]),
        ToolDef::new("set_item_length", set_item_length)
            .description("Set the length of a media item in seconds.")
            .failure_context("set item length")
            .params(vec![track_index(), item_index(), length()]),
        ToolDef::new("split_item", split_item)
            .description(
                "Split a media item at the specified position.\n\n\
                 The original item is trimmed to end at the split point, and a new item is \
                 created starting at the split point with the remaining content. The position \
                 must fall within the item's start and end boundaries.",
            )
            .failure_context("split item")
            .params(vec![
                track_index(),
                item_index(),
                Param::number(
                    "position",
                    "Split point in seconds (absolute timeline position). Must be within the \
                     item's start and end boundaries.",
                )
                .min(0.0),
            ]),
    ]
}

fn track_index() -> Param {
    Param::integer("track_index", "Zero-based track index").min(0.0)
}

fn item_index() -> Param {
    Param::integer("item_index", "Zero-based item index on the track").min(0.0)
}

fn position() -> Param {
    Param::number("position", "Position in seconds").min(0.0)
}

fn length() -> Param {
    Param::number("length", "Length in seconds").above(0.0)
}

#[derive(Deserialize)]
struct TrackArgs {
    track_index: u32,
}

fn list_items_on_track(daw: &mut dyn Daw, args: TrackArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let n = daw.item_count(args.track_index)?;
    let mut items = Vec::with_capacity(n as usize);
    for i in 0..n {
        let info = daw.item_info(args.track_index, i)?;
        items.push(json!({
            "index": i,
            "position": info.position,
            "length": info.length,
            "n_takes": info.take_count,
            "active_take_name": info.active_take_name.unwrap_or_default(),
        }));
    }
    Ok(json!({
        "track_index": args.track_index,
        "track_name": track_name,
        "n_items": n,
        "items": items,
    }))
}

fn get_selected_items(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let items: Vec<_> = daw
        .selected_items()?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            json!({
                "selection_index": i,
                "position": item.position,
                "length": item.length,
                "track_index": item.track_index,
            })
        })
        .collect();
    Ok(json!({"n_selected": items.len(), "items": items}))
}

#[derive(Deserialize)]
struct AddEmptyItemArgs {
    track_index: u32,
    position: f64,
    length: f64,
}

fn add_empty_item(daw: &mut dyn Daw, args: AddEmptyItemArgs) -> ToolResult<Value> {
    validate_track(daw, args.track_index)?;
    let item = undoable(daw, "Add empty item", |daw| {
        Ok(daw.add_item(args.track_index, args.position, args.length)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "position": item.position,
        "length": item.length,
    }))
}

#[derive(Deserialize)]
struct ItemArgs {
    track_index: u32,
    item_index: u32,
}

fn delete_item(daw: &mut dyn Daw, args: ItemArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let item = validate_item(daw, args.track_index, &track_name, args.item_index)?;
    undoable(daw, "Delete media item", |daw| {
        Ok(daw.delete_item(args.track_index, args.item_index)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "deleted_item_index": args.item_index,
        "deleted_position": item.position,
        "deleted_length": item.length,
    }))
}

#[derive(Deserialize)]
struct SetItemPositionArgs {
    track_index: u32,
    item_index: u32,
    position: f64,
}

fn set_item_position(daw: &mut dyn Daw, args: SetItemPositionArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    validate_item(daw, args.track_index, &track_name, args.item_index)?;
    undoable(daw, "Set item position", |daw| {
        Ok(daw.set_item_position(args.track_index, args.item_index, args.position)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "item_index": args.item_index,
        "position": daw.item_info(args.track_index, args.item_index)?.position,
    }))
}

#[derive(Deserialize)]
struct SetItemLengthArgs {
    track_index: u32,
    item_index: u32,
    length: f64,
}

fn set_item_length(daw: &mut dyn Daw, args: SetItemLengthArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    validate_item(daw, args.track_index, &track_name, args.item_index)?;
    undoable(daw, "Set item length", |daw| {
        Ok(daw.set_item_length(args.track_index, args.item_index, args.length)?)
    })?;
    Ok(json!({
        "track_index": args.track_index,
        "item_index": args.item_index,
        "length": daw.item_info(args.track_index, args.item_index)?.length,
    }))
}

#[derive(Deserialize)]
struct SplitItemArgs {
    track_index: u32,
    item_index: u32,
    position: f64,
}

fn split_item(daw: &mut dyn Daw, args: SplitItemArgs) -> ToolResult<Value> {
    let track_name = validate_track(daw, args.track_index)?;
    let item = validate_item(daw, args.track_index, &track_name, args.item_index)?;
    let (start, end) = (item.position, item.position + item.length);
    if args.position <= start || args.position >= end {
        return Err(ToolError::invalid(format!(
            "Split position {} is outside the item boundaries ({} - {}). Position must be \
             strictly between the item's start and end.",
            args.position, start, end
        )));
    }
    let split = undoable(daw, "Split media item", |daw| {
        Ok(daw.split_item(args.track_index, args.item_index, args.position)?)
    })?;
    if !split {
        return Err(ToolError::invalid(format!(
            "REAPER refused to split the item at position {}.",
            args.position
        )));
    }
    Ok(json!({
        "track_index": args.track_index,
        "original_item_index": args.item_index,
        "split_position": args.position,
        "left_item_end": args.position,
        "right_item_start": args.position,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::{FakeDaw, FakeItem};
    use serde_json::json;

    #[test]
    fn list_and_select() {
        let mut daw = FakeDaw::with_tracks(&["Drums", "Bass"]);
        daw.push_item(0, FakeItem::with_take(0.0, 2.0, "kick.wav"));
        daw.push_item(1, FakeItem::new(4.0, 1.0)).selected = true;
        let listed = call(&mut daw, "list_items_on_track", json!({"track_index": 0})).unwrap();
        assert_eq!(
            listed,
            json!({
                "track_index": 0,
                "track_name": "Drums",
                "n_items": 1,
                "items": [{
                    "index": 0,
                    "position": 0.0,
                    "length": 2.0,
                    "n_takes": 1,
                    "active_take_name": "kick.wav",
                }],
            })
        );
        let selected = call(&mut daw, "get_selected_items", json!({})).unwrap();
        assert_eq!(
            selected,
            json!({
                "n_selected": 1,
                "items": [{"selection_index": 0, "position": 4.0, "length": 1.0, "track_index": 1}],
            })
        );
    }

    #[test]
    fn add_move_and_delete() {
        let mut daw = FakeDaw::with_tracks(&["Drums"]);
        assert_eq!(
            call_err(
                &mut daw,
                "add_empty_item",
                json!({"track_index": 0, "position": 1.0, "length": 0.0})
            ),
            "Invalid argument 'length': must be > 0, got 0.0."
        );
        let added = call(
            &mut daw,
            "add_empty_item",
            json!({"track_index": 0, "position": 1.0, "length": 3.0}),
        )
        .unwrap();
        assert_eq!(added, json!({"track_index": 0, "position": 1.0, "length": 3.0}));
        let moved = call(
            &mut daw,
            "set_item_position",
            json!({"track_index": 0, "item_index": 0, "position": 2.5}),
        )
        .unwrap();
        assert_eq!(moved["position"], json!(2.5));
        let resized = call(
            &mut daw,
            "set_item_length",
            json!({"track_index": 0, "item_index": 0, "length": 0.5}),
        )
        .unwrap();
        assert_eq!(resized["length"], json!(0.5));
        let deleted = call(
            &mut daw,
            "delete_item",
            json!({"track_index": 0, "item_index": 0}),
        )
        .unwrap();
        assert_eq!(deleted["deleted_position"], json!(2.5));
        assert_eq!(daw.last_undo_label(), Some("Delete media item"));
        assert_eq!(
            call_err(
                &mut daw,
                "delete_item",
                json!({"track_index": 0, "item_index": 0})
            ),
            "Item index 0 out of range on track 'Drums'. Track has 0 items (valid: 0–-1)."
        );
    }

    #[test]
    fn split() {
        let mut daw = FakeDaw::with_tracks(&["Drums"]);
        daw.push_item(0, FakeItem::with_take(1.0, 4.0, "loop.wav"));
        assert_eq!(
            call_err(
                &mut daw,
                "split_item",
                json!({"track_index": 0, "item_index": 0, "position": 5.0})
            ),
            "Split position 5 is outside the item boundaries (1 - 5). Position must be strictly \
             between the item's start and end."
        );
        let result = call(
            &mut daw,
            "split_item",
            json!({"track_index": 0, "item_index": 0, "position": 2.0}),
        )
        .unwrap();
        assert_eq!(result["right_item_start"], json!(2.0));
        let items = &daw.tracks[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].length, 1.0);
        assert_eq!(items[1].position, 2.0);
    }
}
