//! Process-wide tracing/logging setup.

pub mod logging;

pub use logging::LogFormat;

/// Initialize tracing with the format named by `LOG_FORMAT` (JSON unless it
/// says `pretty`) and the filter from `RUST_LOG` (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    logging::init_with(format);
}
