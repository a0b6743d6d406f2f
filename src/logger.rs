//! Tracing subscriber setup shared by binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` when set; otherwise `default_level`
/// is applied to the given binary and to this crate.
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let fallback = format!(
        "{}={},{}={}",
        bin_name.replace('-', "_"),
        default_level,
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_level,
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
