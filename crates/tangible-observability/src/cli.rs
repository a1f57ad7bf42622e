//! Per-crate debug flags
//!
//! Supports `--debug tangible-router` style CLI values and the
//! `TANGIBLE_DEBUG` environment variable to raise individual crates to `debug`.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Set of crates whose `debug` events should be emitted
///
/// # Example
/// ```rust
/// use tangible_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_crate_names(["tangible-router".to_string()]);
/// assert!(flags.is_enabled("tangible-router"));
/// assert_eq!(flags.to_filter_string("info"), "tangible_router=debug,info");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Build flags from crate names. `all` enables every known crate.
    pub fn from_crate_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for name in names {
            flags.enable(&name);
        }
        flags
    }

    /// Enable one crate, or every known crate for `all`
    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if crate_name.is_empty() {
            return;
        }
        if crate_name == "all" {
            for known in KNOWN_CRATES {
                self.enabled_crates.insert(known.to_string());
            }
            return;
        }
        self.enabled_crates.insert(crate_name.to_string());
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: `"tangible_router=debug,tangible_io=debug,info"`, or just the
    /// base level if no crate is enabled.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .collect();
        filters.push(base_level.to_string());
        filters.join(",")
    }
}

/// Merge CLI debug flags with the `TANGIBLE_DEBUG` environment variable
///
/// Environment variable format: `all` or comma-separated crate names.
pub fn parse_debug_flags<I>(cli_crates: I) -> CrateDebugFlags
where
    I: IntoIterator<Item = String>,
{
    let mut flags = CrateDebugFlags::from_crate_names(cli_crates);

    if let Ok(env_var) = env::var("TANGIBLE_DEBUG") {
        for crate_name in env_var.split(',') {
            flags.enable(crate_name);
        }
    }

    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug all                    Enable debug logging for all crates
  --debug {{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  TANGIBLE_DEBUG={{crate-name}}[,{{crate-name}}]
  TANGIBLE_DEBUG=all
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_uses_base_level() {
        let flags = CrateDebugFlags::default();
        assert!(!flags.any_enabled());
        assert_eq!(flags.to_filter_string("warn"), "warn");
    }

    #[test]
    fn test_all_enables_known_crates() {
        let flags = CrateDebugFlags::from_crate_names(["all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name));
        }
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_crate_names([
            "tangible-io".to_string(),
            " tangible-router ".to_string(),
            String::new(),
        ]);
        assert_eq!(
            flags.to_filter_string("info"),
            "tangible_io=debug,tangible_router=debug,info"
        );
    }

    #[test]
    fn test_help_lists_crates() {
        assert!(debug_flags_help().contains("tangible-calibration"));
    }
}
