//! Environment variable handling.
//!
//! Every variable is read on demand; nothing is cached, so the command line
//! always wins when both are given.

use std::env;

// Helper for boolean environment variables that accept "1", "true", "yes"
fn is_enabled(var: &str) -> bool {
    env::var(var).ok().is_some_and(|s| is_truthy(&s))
}

fn is_truthy(value: &str) -> bool {
    let s = value.to_lowercase();
    s == "1" || s == "true" || s == "yes"
}

/// Check if debug output was requested (`EXTPACK_DEBUG`).
pub fn extpack_debug() -> bool {
    is_enabled("EXTPACK_DEBUG")
}

/// Get the config file path override (`EXTPACK_CONFIG`).
pub fn extpack_config() -> Option<String> {
    non_empty("EXTPACK_CONFIG")
}

/// Get the platform identifier override (`EXTPACK_PLATFORM`).
///
/// Takes the same identifiers as `--platform`, e.g. `win32` or `linux`.
pub fn extpack_platform() -> Option<String> {
    non_empty("EXTPACK_PLATFORM")
}

/// Get the origin directory override (`EXTPACK_ORIGIN`).
pub fn extpack_origin() -> Option<String> {
    non_empty("EXTPACK_ORIGIN")
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn unset_variables_read_as_none() {
        assert!(non_empty("EXTPACK_TEST_SURELY_UNSET_VARIABLE").is_none());
        assert!(!is_enabled("EXTPACK_TEST_SURELY_UNSET_VARIABLE"));
    }
}
