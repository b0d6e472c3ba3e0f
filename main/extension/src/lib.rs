//! REAPER extension which serves Scythe's MCP tools over TCP.
//!
//! Network threads never touch REAPER. They queue tool calls which a control surface executes on
//! the main thread.

pub mod config;
mod logging;
pub mod main_thread;
mod server_control;

use crate::config::{ConfigError, ScytheConfig};
use crate::logging::init_logging;
use crate::main_thread::{job_channel, MainThreadExecutor, ScytheControlSurfaceMiddleware};
use crate::server_control::ServerControl;
use camino::Utf8PathBuf;
use reaper_high::{ActionKind, MiddlewareControlSurface, Reaper};
use reaper_macros::reaper_extension_plugin;
use scythe_reaper::ReaperDaw;
use scythe_tools::ToolRegistry;
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

#[reaper_extension_plugin(
    name = "Scythe",
    support_email_address = "support@example.org",
    update_url = "https://www.reaper.fm"
)]
fn plugin_main() -> Result<(), Box<dyn Error>> {
    let reaper = Reaper::get();
    reaper.wake_up()?;
    let (config, config_error) = match load_config() {
        Ok(c) => (c, None),
        Err(e) => (ScytheConfig::default(), Some(e)),
    };
    init_logging(&config.log_level);
    if let Some(error) = config_error {
        tracing::warn!(msg = "Using default config", %error);
        reaper.show_console_msg(format!("Scythe: {}. Using defaults.\n", error));
    }
    let (job_sender, job_receiver) = job_channel();
    let surface = MiddlewareControlSurface::new(ScytheControlSurfaceMiddleware::new(job_receiver));
    reaper
        .medium_session()
        .plugin_register_add_csurf_inst(Box::new(surface))?;
    let executor = Arc::new(MainThreadExecutor::new(
        ToolRegistry::new().descriptors(),
        job_sender,
        Duration::from_millis(config.call_timeout_ms),
    ));
    let autostart = config.enabled;
    let control = Rc::new(RefCell::new(ServerControl::new(config, executor)));
    if autostart {
        start_server(&control);
    } else {
        tracing::info!(msg = "Server disabled in config, start it via action");
    }
    register_actions(reaper, control);
    Ok(())
}

fn load_config() -> Result<ScytheConfig, ConfigError> {
    let resource_dir = Utf8PathBuf::try_from(ReaperDaw::resource_path())
        .map_err(|_| ConfigError::NonUtf8ResourcePath)?;
    let path = ScytheConfig::file_path(&resource_dir);
    let mut config = ScytheConfig::load_or_create(&path)?;
    config.apply_env(|name| std::env::var(name).ok())?;
    Ok(config)
}

fn start_server(control: &RefCell<ServerControl>) {
    let mut control = control.borrow_mut();
    match control.start() {
        Ok(()) => Reaper::get().show_console_msg(format!("{}\n", control.status())),
        Err(error) => {
            tracing::error!(msg = "Couldn't start MCP server", %error);
            Reaper::get().show_console_msg(format!("Scythe: {}\n", error));
        }
    }
}

fn register_actions(reaper: &Reaper, control: Rc<RefCell<ServerControl>>) {
    let start_control = control.clone();
    reaper.register_action(
        "SCYTHE_START_SERVER",
        "Scythe: Start MCP server",
        None,
        move || start_server(&start_control),
        ActionKind::NotToggleable,
    );
    let stop_control = control.clone();
    reaper.register_action(
        "SCYTHE_STOP_SERVER",
        "Scythe: Stop MCP server",
        None,
        move || {
            let mut control = stop_control.borrow_mut();
            control.stop();
            Reaper::get().show_console_msg(format!("{}\n", control.status()));
        },
        ActionKind::NotToggleable,
    );
    reaper.register_action(
        "SCYTHE_SHOW_STATUS",
        "Scythe: Show MCP server status",
        None,
        move || {
            Reaper::get().show_console_msg(format!("{}\n", control.borrow().status()));
        },
        ActionKind::NotToggleable,
    );
}
