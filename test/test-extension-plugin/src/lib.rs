//! Extension plug-in which runs the Scythe integration test inside REAPER.
//!
//! Runs automatically if the environment variable `SCYTHE_RUN_INTEGRATION_TEST` is set and then
//! exits REAPER. Otherwise the test can be started via the action `SCYTHE_INTEGRATION_TESTS`.
use reaper_high::{ActionKind, Reaper};
use reaper_macros::reaper_extension_plugin;
use std::error::Error;
use std::process;
use std::thread;
use std::time::Duration;

/// Exit code which tells the test driver that REAPER ran the test and it failed.
const TEST_FAILED_EXIT_CODE: i32 = 172;

#[reaper_extension_plugin(
    name = "Scythe integration test",
    support_email_address = "support@example.org",
    update_url = "https://www.reaper.fm"
)]
fn plugin_main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    println!("From REAPER: Loaded Scythe integration test plug-in");
    let reaper = Reaper::get();
    reaper.wake_up()?;
    if std::env::var("SCYTHE_RUN_INTEGRATION_TEST").is_ok() {
        println!("From REAPER: Launching Scythe integration test...");
        // Starting right after REAPER came up makes some events go missing on Linux.
        scythe_test::execute_integration_test(Duration::from_secs(2), |result| {
            let exit_code = match result {
                Ok(()) => {
                    println!("From REAPER: Scythe integration test executed successfully");
                    0
                }
                Err(reason) => {
                    eprintln!("From REAPER: Scythe integration test failed: {}", reason);
                    TEST_FAILED_EXIT_CODE
                }
            };
            // Exiting immediately sometimes ends with SIGSEGV on Linux.
            println!("From REAPER: Waiting a bit before exiting the REAPER process...");
            thread::spawn(move || {
                thread::sleep(Duration::from_secs(5));
                process::exit(exit_code);
            });
        });
    }
    reaper.register_action(
        "SCYTHE_INTEGRATION_TESTS",
        "Scythe: Run integration tests",
        None,
        || {
            scythe_test::execute_integration_test(Duration::ZERO, |result| {
                if let Err(reason) = result {
                    tracing::error!(msg = "Scythe integration test failed", %reason);
                }
            })
        },
        ActionKind::NotToggleable,
    );
    Ok(())
}
