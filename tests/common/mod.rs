//! Shared test setup.

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: the first call in the process succeeds and
/// subsequent calls are silently ignored, so every test can call this.
pub fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
