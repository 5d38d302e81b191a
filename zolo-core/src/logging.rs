//! Tracing initialization: an `EnvFilter` driven by `RUST_LOG` (defaulting
//! to `info`) plus a plain `fmt` layer. No OTLP export — metrics and traces
//! export are out of scope.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber. Call once at process start;
/// calling it twice is a no-op past the first (the underlying
/// `set_global_default` call is allowed to fail silently).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
