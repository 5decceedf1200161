//! Debug logging utilities
//!
//! Debug output is switched on by the global `--debug` flag or by
//! `EXTPACK_DEBUG`. When it is off, the `debug!` macro costs one atomic load.

use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug mode from the command-line flag, falling back to `EXTPACK_DEBUG`
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled || crate::env_vars::extpack_debug());
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Macro for convenient debug logging
///
/// Usage: `debug!("staged {} files", count)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[DEBUG] {}", format_args!($($arg)*));
        }
    };
}
