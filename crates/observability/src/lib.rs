//! Process-wide logging setup shared by every Remi binary.

pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize tracing with the format named by `LOG_FORMAT` (`json` default).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    self::tracing::init(format);
}
