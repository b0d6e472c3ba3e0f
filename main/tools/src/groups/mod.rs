use crate::ToolDef;

mod actions;
mod devices;
mod envelopes;
mod ext_state;
mod items;
mod markers;
mod midi;
mod project;
mod render;
mod scripting;
mod sends;
mod take_fx;
mod tempo;
mod time_selection;
mod track_fx;
mod tracks;

/// All groups in mounting order.
pub fn all() -> Vec<(&'static str, Vec<ToolDef>)> {
    vec![
        ("project", project::tools()),
        ("tracks", tracks::tools()),
        ("track_fx", track_fx::tools()),
        ("take_fx", take_fx::tools()),
        ("sends", sends::tools()),
        ("markers", markers::tools()),
        ("tempo", tempo::tools()),
        ("items", items::tools()),
        ("midi", midi::tools()),
        ("envelopes", envelopes::tools()),
        ("time_selection", time_selection::tools()),
        ("actions", actions::tools()),
        ("ext_state", ext_state::tools()),
        ("devices", devices::tools()),
        ("render", render::tools()),
        ("scripting", scripting::tools()),
    ]
}
