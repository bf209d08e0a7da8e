//! Logging utilities and the fatal sink

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Uses `RUST_LOG` when set and falls back to `info`. Calling this more than
/// once is harmless.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

/// Log `message` at error level, flush the logger and abort the process
///
/// This is the only process-terminating path in the library.
pub fn fatal(message: &str) -> ! {
    log::error!("[FATAL] {}", message);
    log::logger().flush();
    std::process::abort()
}
