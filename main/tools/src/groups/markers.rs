//! Project markers and regions.
//!
//! Markers and regions are identified by the number REAPER displays, which is also what
//! `list_markers` and `list_regions` report as `index`.
use crate::groups::tracks::color_json;
use crate::helpers::undoable;
use crate::{NoArgs, ToolDef, ToolError, ToolResult};
use scythe_daw::{Bookmark, Daw, RgbColor};
use scythe_protocol::Param;
use serde::Deserialize;
use serde_json::{json, Value};

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("list_markers", list_markers)
            .description(
                "List all markers in the current REAPER project.\n\n\
                 Returns each marker's index, position in seconds, name, and RGB color.",
            )
            .failure_context("list markers")
            .read_only(),
        ToolDef::new("list_regions", list_regions)
            .description(
                "List all regions in the current REAPER project.\n\n\
                 Returns each region's index, start/end positions in seconds, name, and RGB \
                 color.",
            )
            .failure_context("list regions")
            .read_only(),
        ToolDef::new("add_marker", add_marker)
            .description(
                "Add a marker at the specified position in seconds.\n\n\
                 Optionally provide a name and an RGB color. If all color channels are zero the \
                 marker uses the default REAPER color.",
            )
            .failure_context("add marker")
            .params(
                vec![
                    Param::number("position", "Position in seconds").min(0.0),
                    name_param("Display name for the marker"),
                ]
                .into_iter()
                .chain(color_params())
                .collect(),
            ),
        ToolDef::new("add_region", add_region)
            .description(
                "Add a region spanning from start to end in seconds.\n\n\
                 Optionally provide a name and an RGB color. If all color channels are zero the \
                 region uses the default REAPER color.",
            )
            .failure_context("add region")
            .params(
                vec![
                    Param::number("start", "Region start position in seconds").min(0.0),
                    Param::number("end", "Region end position in seconds").min(0.0),
                    name_param("Display name for the region"),
                ]
                .into_iter()
                .chain(color_params())
                .collect(),
            ),
        ToolDef::new("delete_marker_or_region", delete_marker_or_region)
            .description(
                "Delete a marker or region by its index.\n\n\
                 WARNING: This permanently removes the marker or region. Use is_region to \
                 indicate whether the index refers to a region (True) or a marker (False, the \
                 default).",
            )
            .failure_context("delete marker/region")
            .params(vec![
                Param::integer("index", "Zero-based marker/region index").min(0.0),
                Param::boolean(
                    "is_region",
                    "True to delete a region, False to delete a marker",
                )
                .default_value(json!(false)),
            ])
            .destructive(),
        ToolDef::new("go_to_marker", go_to_marker)
            .description(
                "Move the edit cursor to the specified marker number.\n\n\
                 The marker_index corresponds to the marker number displayed in REAPER, not the \
                 internal zero-based index.",
            )
            .failure_context("navigate to marker")
            .params(vec![Param::integer(
                "marker_index",
                "Marker number to navigate to (as shown in REAPER)",
            )]),
    ]
}

fn name_param(description: &'static str) -> Param {
    Param::string("name", description).default_value(json!(""))
}

fn color_params() -> Vec<Param> {
    [("r", "Red channel (0-255)"), ("g", "Green channel (0-255)"), ("b", "Blue channel (0-255)")]
        .iter()
        .map(|&(name, description)| {
            Param::integer(name, description)
                .range(0.0, 255.0)
                .default_value(json!(0))
        })
        .collect()
}

fn bookmark_json(b: &Bookmark) -> Value {
    let mut entry = json!({
        "index": b.number,
        "position": b.position,
        "name": b.name,
        "color": color_json(b.color),
    });
    if b.is_region {
        entry["end"] = json!(b.end);
    }
    entry
}

fn list_markers(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let markers: Vec<_> = daw
        .bookmarks()?
        .iter()
        .filter(|b| !b.is_region)
        .map(bookmark_json)
        .collect();
    Ok(json!({"n_markers": markers.len(), "markers": markers}))
}

fn list_regions(daw: &mut dyn Daw, _: NoArgs) -> ToolResult<Value> {
    let regions: Vec<_> = daw
        .bookmarks()?
        .iter()
        .filter(|b| b.is_region)
        .map(bookmark_json)
        .collect();
    Ok(json!({"n_regions": regions.len(), "regions": regions}))
}

#[derive(Deserialize)]
struct ColorArgs {
    #[serde(default)]
    r: u8,
    #[serde(default)]
    g: u8,
    #[serde(default)]
    b: u8,
}

impl ColorArgs {
    /// `None` if all channels are zero, which means "theme default".
    fn color(&self) -> Option<RgbColor> {
        let color = RgbColor::rgb(self.r, self.g, self.b);
        if color.is_black() {
            None
        } else {
            Some(color)
        }
    }
}

#[derive(Deserialize)]
struct AddMarkerArgs {
    position: f64,
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    color: ColorArgs,
}

fn add_marker(daw: &mut dyn Daw, args: AddMarkerArgs) -> ToolResult<Value> {
    let number = undoable(daw, "Add marker", |daw| {
        Ok(daw.add_marker(args.position, &args.name, args.color.color())?)
    })?;
    Ok(json!({
        "index": number,
        "position": args.position,
        "name": args.name,
    }))
}

#[derive(Deserialize)]
struct AddRegionArgs {
    start: f64,
    end: f64,
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    color: ColorArgs,
}

fn add_region(daw: &mut dyn Daw, args: AddRegionArgs) -> ToolResult<Value> {
    if args.end <= args.start {
        return Err(ToolError::invalid(format!(
            "Region end ({}) must be greater than start ({}).",
            args.end, args.start
        )));
    }
    let number = undoable(daw, "Add region", |daw| {
        Ok(daw.add_region(args.start, args.end, &args.name, args.color.color())?)
    })?;
    Ok(json!({
        "index": number,
        "start": args.start,
        "end": args.end,
        "name": args.name,
    }))
}

#[derive(Deserialize)]
struct DeleteArgs {
    index: i32,
    #[serde(default)]
    is_region: bool,
}

fn delete_marker_or_region(daw: &mut dyn Daw, args: DeleteArgs) -> ToolResult<Value> {
    let deleted = undoable(daw, "Delete marker/region", |daw| {
        Ok(daw.delete_bookmark(args.index, args.is_region)?)
    })?;
    if !deleted {
        let kind = if args.is_region { "region" } else { "marker" };
        return Err(ToolError::invalid(format!(
            "Failed to delete {} at index {}. Check that the index exists.",
            kind, args.index
        )));
    }
    Ok(json!({
        "deleted_index": args.index,
        "was_region": args.is_region,
    }))
}

#[derive(Deserialize)]
struct GoToMarkerArgs {
    marker_index: i32,
}

fn go_to_marker(daw: &mut dyn Daw, args: GoToMarkerArgs) -> ToolResult<Value> {
    daw.go_to_marker(args.marker_index)?;
    Ok(json!({
        "navigated_to_marker": args.marker_index,
        "cursor_position": daw.cursor_position()?,
    }))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, call_err};
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;

    #[test]
    fn markers_and_regions_are_listed_separately() {
        let mut daw = FakeDaw::new();
        call(
            &mut daw,
            "add_marker",
            json!({"position": 8.0, "name": "Chorus", "r": 255}),
        )
        .unwrap();
        let first = call(&mut daw, "add_marker", json!({"position": 2.0})).unwrap();
        assert_eq!(first, json!({"index": 2, "position": 2.0, "name": ""}));
        let region = call(
            &mut daw,
            "add_region",
            json!({"start": 0.0, "end": 4.0, "name": "Intro"}),
        )
        .unwrap();
        assert_eq!(region["index"], json!(1));
        assert_eq!(daw.last_undo_label(), Some("Add region"));
        let markers = call(&mut daw, "list_markers", json!({})).unwrap();
        assert_eq!(
            markers,
            json!({
                "n_markers": 2,
                "markers": [
                    {"index": 2, "position": 2.0, "name": "", "color": [0, 0, 0]},
                    {"index": 1, "position": 8.0, "name": "Chorus", "color": [255, 0, 0]},
                ],
            })
        );
        let regions = call(&mut daw, "list_regions", json!({})).unwrap();
        assert_eq!(
            regions["regions"][0],
            json!({"index": 1, "position": 0.0, "end": 4.0, "name": "Intro", "color": [0, 0, 0]})
        );
    }

    #[test]
    fn region_must_have_positive_length() {
        let mut daw = FakeDaw::new();
        assert_eq!(
            call_err(&mut daw, "add_region", json!({"start": 4.0, "end": 4.0})),
            "Region end (4) must be greater than start (4)."
        );
        assert_eq!(
            call_err(&mut daw, "add_marker", json!({"position": 1.0, "g": 256})),
            "Invalid argument 'g': must be <= 255, got 256."
        );
    }

    #[test]
    fn delete_and_navigate() {
        let mut daw = FakeDaw::new();
        call(&mut daw, "add_marker", json!({"position": 3.5})).unwrap();
        call(&mut daw, "add_region", json!({"start": 0.0, "end": 1.0})).unwrap();
        let result = call(&mut daw, "go_to_marker", json!({"marker_index": 1})).unwrap();
        assert_eq!(
            result,
            json!({"navigated_to_marker": 1, "cursor_position": 3.5})
        );
        assert_eq!(
            call(
                &mut daw,
                "delete_marker_or_region",
                json!({"index": 1, "is_region": true})
            )
            .unwrap(),
            json!({"deleted_index": 1, "was_region": true})
        );
        assert_eq!(
            call_err(
                &mut daw,
                "delete_marker_or_region",
                json!({"index": 1, "is_region": true})
            ),
            "Failed to delete region at index 1. Check that the index exists."
        );
        assert_eq!(daw.bookmarks.len(), 1);
    }
}
