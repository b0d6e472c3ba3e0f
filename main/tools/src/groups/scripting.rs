//! Running Lua and EEL2 code inside REAPER.
//!
//! The script is written to a temporary file, registered as ReaScript action, run once and
//! unregistered again. Scripts hand back a result by writing the ext state key
//! [`RESULT_KEY`] in section [`IPC_SECTION`].
use crate::{ToolDef, ToolError, ToolResult};
use scythe_daw::Daw;
use scythe_protocol::{Param, ToolAnnotations};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::io::Write;

pub const IPC_SECTION: &str = "scythe_script_ipc";
pub const RESULT_KEY: &str = "result";

pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new("run_lua_script", run_lua_script)
            .description(
                "Run a Lua script inside REAPER.\n\n\
                 The script has full access to the REAPER Lua API (reaper.*, gfx.*, etc.) and \
                 runs synchronously on REAPER's main thread. To return data, set \
                 return_result=true and call reaper.SetExtState('scythe_script_ipc', 'result', \
                 your_string, false) at the end of the script.\n\n\
                 WARNING: The script can modify the project, change settings, and access the \
                 filesystem. Use with care.",
            )
            .failure_context("run Lua script")
            .params(vec![
                Param::string("script", "Lua source code to execute inside REAPER"),
                Param::boolean(
                    "return_result",
                    "If true, the script should write its result via \
                     reaper.SetExtState('scythe_script_ipc', 'result', value, false) and the \
                     tool will return that value. Defaults to false.",
                )
                .default_value(json!(false)),
            ])
            .annotations(ToolAnnotations::mutator().open_world()),
        ToolDef::new("run_eel_script", run_eel_script)
            .description(
                "Run an EEL2 script inside REAPER.\n\n\
                 EEL2 is REAPER's built-in scripting language and runs synchronously on REAPER's \
                 main thread. To return data, set return_result=true and write the ext state \
                 key 'result' in section 'scythe_script_ipc' at the end of the script.\n\n\
                 WARNING: The script can modify the project, change settings, and access the \
                 filesystem. Use with care.",
            )
            .failure_context("run EEL script")
            .params(vec![
                Param::string("script", "EEL2 source code to execute inside REAPER"),
                Param::boolean(
                    "return_result",
                    "If true, the script should write its result via \
                     extension_api('SetExtState', 'scythe_script_ipc', 'result', value, 0) and \
                     the tool will return that value. Defaults to false.",
                )
                .default_value(json!(false)),
            ])
            .annotations(ToolAnnotations::mutator().open_world()),
    ]
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Language {
    Lua,
    Eel,
}

impl Language {
    fn extension(self) -> &'static str {
        match self {
            Language::Lua => ".lua",
            Language::Eel => ".eel",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Lua => "Lua",
            Language::Eel => "EEL",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize)]
struct RunScriptArgs {
    script: String,
    #[serde(default)]
    return_result: bool,
}

fn run_lua_script(daw: &mut dyn Daw, args: RunScriptArgs) -> ToolResult<Value> {
    run_script(daw, Language::Lua, args)
}

fn run_eel_script(daw: &mut dyn Daw, args: RunScriptArgs) -> ToolResult<Value> {
    run_script(daw, Language::Eel, args)
}

fn run_script(daw: &mut dyn Daw, language: Language, args: RunScriptArgs) -> ToolResult<Value> {
    let io_error = |e: std::io::Error| {
        ToolError::invalid(format!("Failed to run {} script: {}", language, e))
    };
    // Removed from disk when dropped, so only after REAPER has run and forgotten it.
    let mut file = tempfile::Builder::new()
        .prefix("scythe-")
        .suffix(language.extension())
        .tempfile()
        .map_err(io_error)?;
    file.write_all(args.script.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    if args.return_result {
        daw.delete_ext_state(IPC_SECTION, RESULT_KEY, false)?;
    }
    let command_id = daw.register_script(file.path())?.ok_or_else(|| {
        ToolError::invalid(format!(
            "REAPER failed to register the {0} script. Check that {0} scripting is enabled.",
            language
        ))
    })?;
    tracing::debug!(msg = "Running script", %language, command_id);
    let ran = daw.run_command(command_id);
    let unregistered = daw.unregister_script(file.path());
    ran?;
    unregistered?;
    let mut response = Map::new();
    response.insert("executed".to_string(), json!(true));
    response.insert("command_id".to_string(), json!(command_id));
    if args.return_result {
        let result = daw.ext_state(IPC_SECTION, RESULT_KEY)?;
        daw.delete_ext_state(IPC_SECTION, RESULT_KEY, false)?;
        response.insert("result".to_string(), json!(result));
    }
    Ok(Value::Object(response))
}

#[cfg(test)]
mod tests {
    use super::{IPC_SECTION, RESULT_KEY};
    use crate::testing::call;
    use scythe_daw::fake::{FakeDaw, ScriptOutput};
    use serde_json::json;

    #[test]
    fn script_runs_once_and_is_unregistered() {
        let mut daw = FakeDaw::new();
        let script = "reaper.ShowConsoleMsg('hi')";
        let result = call(&mut daw, "run_lua_script", json!({"script": script})).unwrap();
        assert_eq!(result, json!({"executed": true, "command_id": 60000}));
        assert_eq!(daw.script_runs, vec![script.to_string()]);
        assert_eq!(daw.executed_commands, vec![60000]);
        assert!(daw.registered_scripts.is_empty());
    }

    #[test]
    fn result_comes_back_via_ext_state() {
        let mut daw = FakeDaw::new();
        daw.ext_state.insert(
            (IPC_SECTION.to_string(), RESULT_KEY.to_string()),
            "stale".to_string(),
        );
        daw.script_output = Some(ScriptOutput {
            section: IPC_SECTION.to_string(),
            key: RESULT_KEY.to_string(),
            value: "42".to_string(),
        });
        let result = call(
            &mut daw,
            "run_eel_script",
            json!({"script": "x = 42;", "return_result": true}),
        )
        .unwrap();
        assert_eq!(result["result"], json!("42"));
        assert!(daw.ext_state.is_empty());
    }

    #[test]
    fn missing_result_is_empty() {
        let mut daw = FakeDaw::new();
        daw.ext_state.insert(
            (IPC_SECTION.to_string(), RESULT_KEY.to_string()),
            "stale".to_string(),
        );
        let result = call(
            &mut daw,
            "run_lua_script",
            json!({"script": "-- nothing", "return_result": true}),
        )
        .unwrap();
        assert_eq!(result["result"], json!(""));
    }
}
