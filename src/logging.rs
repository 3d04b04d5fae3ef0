use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Output goes to stderr so command output on stdout stays clean. An invalid
/// `filter` falls back to `warn`. Calling this twice is harmless.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
