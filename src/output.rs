//! # Output Configuration
//!
//! Controls how the final summary looks on the terminal: colored outcome
//! markers when the terminal supports them, plain bracketed tags otherwise.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

use crate::materialize::{DownloadResult, Outcome};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolves `--color` against the environment.
    ///
    /// `always` and `never` are final. Any other value (normally `auto`)
    /// defers to the environment and then to the terminal itself.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = if color_flag.eq_ignore_ascii_case("always") {
            true
        } else if color_flag.eq_ignore_ascii_case("never") {
            false
        } else {
            env_color_preference()
                .unwrap_or_else(|| console::Term::stdout().features().colors_supported())
        };
        Self { use_color }
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

/// Color preference stated by the environment, strongest first. `None`
/// leaves the decision to the terminal.
fn env_color_preference() -> Option<bool> {
    let value = |name: &str| env::var(name).ok();

    // NO_COLOR counts when present, even if empty.
    if env::var_os("NO_COLOR").is_some() || value("CLICOLOR").as_deref() == Some("0") {
        return Some(false);
    }
    match value("CLICOLOR_FORCE").as_deref() {
        None | Some("") | Some("0") => {}
        Some(_) => return Some(true),
    }
    (value("TERM").as_deref() == Some("dumb")).then_some(false)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Fixed-width tag for an outcome, colored when enabled.
pub fn outcome_marker(config: &OutputConfig, outcome: Outcome) -> String {
    let tag = format!("[{:^14}]", outcome.as_str());
    if !config.use_color {
        return tag;
    }
    let styled = match outcome {
        Outcome::Cloned | Outcome::Overwritten => style(tag).green(),
        Outcome::Skipped | Outcome::DryRun => style(tag).dim(),
        Outcome::RemovalFailed | Outcome::CloneFailed => style(tag).red().bold(),
    };
    styled.force_styling(true).to_string()
}

/// One summary line for a result, as printed by the CLI.
pub fn result_line(config: &OutputConfig, result: &DownloadResult) -> String {
    let mut line = format!(
        "{} {} ({:.2}s",
        outcome_marker(config, result.outcome),
        result.name,
        result.elapsed_seconds()
    );
    if let Some(bytes) = result.size_bytes {
        line.push_str(&format!(", {} bytes", bytes));
    }
    if let Some(code) = result.exit_code.filter(|&code| code != 0) {
        line.push_str(&format!(", exit {}", code));
    }
    line.push(')');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;

    /// Runs `f` with the color variables set as given, restoring them after.
    fn with_color_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let saved: Vec<_> = vars
            .iter()
            .map(|(name, _)| (*name, env::var_os(name)))
            .collect();
        for (name, value) in vars {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        f();
        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }

    #[test]
    #[serial]
    fn test_no_color_disables_auto() {
        with_color_env(&[("NO_COLOR", Some("")), ("CLICOLOR_FORCE", Some("1"))], || {
            assert!(!OutputConfig::from_env_and_flag("auto").use_color);
        });
    }

    #[test]
    #[serial]
    fn test_always_overrides_no_color() {
        with_color_env(&[("NO_COLOR", Some("1"))], || {
            assert!(OutputConfig::from_env_and_flag("always").use_color);
        });
    }

    #[test]
    #[serial]
    fn test_clicolor_force_enables_auto() {
        with_color_env(
            &[
                ("NO_COLOR", None),
                ("CLICOLOR", None),
                ("CLICOLOR_FORCE", Some("1")),
            ],
            || {
                assert!(OutputConfig::from_env_and_flag("auto").use_color);
            },
        );
    }

    #[test]
    #[serial]
    fn test_dumb_terminal_disables_auto() {
        with_color_env(
            &[
                ("NO_COLOR", None),
                ("CLICOLOR", None),
                ("CLICOLOR_FORCE", None),
                ("TERM", Some("dumb")),
            ],
            || {
                assert!(!OutputConfig::from_env_and_flag("auto").use_color);
            },
        );
    }

    #[test]
    fn test_color_flag_is_case_insensitive() {
        assert!(OutputConfig::from_env_and_flag("ALWAYS").use_color);
        assert!(!OutputConfig::from_env_and_flag("Never").use_color);
    }

    #[test]
    #[serial]
    fn test_clicolor_zero_disables_auto() {
        with_color_env(&[("NO_COLOR", None), ("CLICOLOR", Some("0"))], || {
            assert!(!OutputConfig::from_env_and_flag("auto").use_color);
        });
    }

    #[test]
    fn test_color_always() {
        let config = OutputConfig::from_env_and_flag("always");
        assert!(config.use_color);
    }

    #[test]
    fn test_color_never() {
        let config = OutputConfig::from_env_and_flag("never");
        assert!(!config.use_color);
    }

    #[test]
    fn test_marker_without_color_is_plain() {
        let config = OutputConfig::without_color();
        assert_eq!(
            outcome_marker(&config, Outcome::Skipped),
            "[   skipped    ]"
        );
    }

    #[test]
    fn test_marker_with_color_has_escape_codes() {
        let config = OutputConfig::with_color();
        let marker = outcome_marker(&config, Outcome::CloneFailed);
        assert!(marker.contains("clone-failed"));
        assert!(marker.contains('\u{1b}'));
    }

    #[test]
    fn test_result_line() {
        let config = OutputConfig::without_color();
        let mut result = DownloadResult::new("A", Outcome::Cloned, Duration::from_millis(1250));
        result.size_bytes = Some(2048);
        result.exit_code = Some(0);
        assert_eq!(
            result_line(&config, &result),
            "[    cloned    ] A (1.25s, 2048 bytes)"
        );

        result.exit_code = Some(128);
        assert!(result_line(&config, &result).ends_with(", exit 128)"));
    }
}
