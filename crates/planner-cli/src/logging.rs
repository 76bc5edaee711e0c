use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `PLANNER_LOG` takes precedence over
/// `RUST_LOG`; `default_level` applies when neither is set.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env("PLANNER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error when a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
