#![cfg(feature = "run-reaper-integration-test")]
//! Runs the Scythe integration test inside a headless REAPER on Linux.
//!
//! Uses the REAPER found at `SCYTHE_REAPER_HOME` if set. Otherwise a portable REAPER is
//! downloaded once into `target/reaper`.
use std::error::Error;
use std::fs::{self, File};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use wait_timeout::ChildExt;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Exit code with which the test plug-in signals a failed test.
const TEST_FAILED_EXIT_CODE: i32 = 172;
const REAPER_TARBALL_URL: &str = "https://www.reaper.fm/files/6.x/reaper611_linux_x86_64.tar.xz";
const REAPER_TIMEOUT: Duration = Duration::from_secs(120);

#[test]
fn run_scythe_integration_test_in_reaper() {
    if !cfg!(target_os = "linux") {
        println!("Scythe integration test only runs on Linux");
        return;
    }
    let target_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../target");
    let result = reaper_home(&target_dir).and_then(|home| {
        install_plugins(&target_dir, &home)?;
        run_in_reaper(&home.join("reaper"))
    });
    result.expect("Running the Scythe integration test in REAPER failed");
}

fn reaper_home(target_dir: &Path) -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("SCYTHE_REAPER_HOME") {
        return Ok(PathBuf::from(home));
    }
    let download_dir = target_dir.join("reaper");
    let home = download_dir.join("reaper_linux_x86_64/REAPER");
    if home.exists() {
        return Ok(home);
    }
    let tarball = download_dir.join("reaper-linux.tar.xz");
    if !tarball.exists() {
        println!("Downloading REAPER to {:?}...", &tarball);
        fs::create_dir_all(&download_dir)?;
        let mut response = reqwest::blocking::get(REAPER_TARBALL_URL)?.error_for_status()?;
        response.copy_to(&mut File::create(&tarball)?)?;
    }
    println!("Unpacking {:?}...", &tarball);
    let decoder = xz2::read::XzDecoder::new(File::open(&tarball)?);
    tar::Archive::new(decoder).unpack(&download_dir)?;
    // Portable mode with dummy audio, so it runs on machines without a sound card.
    fs::write(home.join("reaper.ini"), "[REAPER]\nlinux_audio_mode=2\n")?;
    Ok(home)
}

/// Installs the test plug-in next to the Scythe extension, so the extension's server is up in
/// the same REAPER instance.
fn install_plugins(target_dir: &Path, reaper_home: &Path) -> Result<()> {
    let user_plugins = reaper_home.join("UserPlugins");
    fs::create_dir_all(&user_plugins)?;
    let plugins = [
        ("scythe_test_extension_plugin", "reaper_scythe_test"),
        ("reaper_scythe", "reaper_scythe"),
    ];
    for (lib_name, plugin_name) in plugins {
        let source = target_dir.join("debug").join(format!("lib{}.so", lib_name));
        if !source.exists() {
            return Err(format!(
                "{:?} doesn't exist, build the workspace before running this test",
                source
            ))?;
        }
        let target = user_plugins.join(format!("{}.so", plugin_name));
        println!("Installing {:?}...", &target);
        fs::copy(&source, &target)?;
    }
    Ok(())
}

/// Lets the OS pick a port so the extension's server doesn't clash with a running Scythe.
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn run_in_reaper(reaper_executable: &Path) -> Result<()> {
    println!("Starting REAPER ({:?})...", &reaper_executable);
    let mut child = Command::new(reaper_executable)
        .env("SCYTHE_RUN_INTEGRATION_TEST", "true")
        .env("SCYTHE_PORT", free_port()?.to_string())
        .spawn()?;
    let status = match child.wait_timeout(REAPER_TIMEOUT)? {
        Some(s) => s,
        None => {
            child.kill()?;
            return Err("REAPER is still running, the test plug-in probably didn't load")?;
        }
    };
    match status.code() {
        Some(0) => Ok(()),
        Some(TEST_FAILED_EXIT_CODE) => Err("Scythe integration test failed, see REAPER console")?,
        Some(code) => Err(format!("REAPER exited with code {}", code))?,
        None => Err("REAPER was killed by a signal")?,
    }
}
