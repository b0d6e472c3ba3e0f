use tracing_subscriber::EnvFilter;

/// Sends log output to stderr, which ends up in the terminal REAPER was started from.
///
/// Invalid directives fall back to `info`. Does nothing if a global subscriber is already set,
/// e.g. by another extension sharing the process.
pub fn init_logging(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Scythe: invalid log level '{}' ({}), using 'info'", directives, e);
        EnvFilter::new("info")
    });
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if result.is_err() {
        tracing::debug!(msg = "Global tracing subscriber already set");
    }
}
