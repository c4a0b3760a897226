//! Version and usage text.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version line printed by `--version`.
pub fn version_line() -> String {
    format!("chat-pager {}", VERSION)
}

/// Usage printed by `--help`.
pub fn usage() -> String {
    format!(
        "{}\n\
         Headless demo of the windowed message pager.\n\n\
         USAGE:\n    chat-pager [--jump <id>]\n\n\
         OPTIONS:\n\
         \x20   -j, --jump <id>    Jump to this message id (default: PAGER_TARGET_MESSAGE_ID or 1000)\n\
         \x20   -V, --version      Print version\n\
         \x20   -h, --help         Print this help\n\n\
         ENVIRONMENT:\n\
         \x20   PAGER_INITIAL_LOAD_COUNT, PAGER_PAGINATION_LOAD_COUNT, PAGER_TARGET_MESSAGE_ID,\n\
         \x20   PAGER_FETCH_LATENCY_MS, PAGER_FETCH_TIMEOUT_MS, RUST_LOG",
        version_line()
    )
}
