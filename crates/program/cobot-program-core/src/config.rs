//! Core configuration for cobot-program-core.

use serde::{Deserialize, Serialize};

/// Time tolerance used for block boundaries and end-of-program checks.
pub const TIME_EPSILON: f64 = 1e-5;

/// Configuration for the playback controller and edit defaults.
/// Keep this minimal; hosts usually run with `Config::default()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tolerance for "has this block ended" and "is the program over" checks.
    pub time_epsilon: f64,

    /// Duration given to actions created from the add-action menu.
    pub default_action_duration: f64,
    /// Lower bound on the duration of actions the controller creates.
    pub min_action_duration: f64,
    /// Duration of the anchor move a new track starts with.
    pub start_move_duration: f64,

    /// Stem used when no program file has been chosen yet.
    pub default_program_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_epsilon: TIME_EPSILON,
            default_action_duration: crate::action::DEFAULT_DURATION,
            min_action_duration: crate::action::MIN_DURATION,
            start_move_duration: crate::track::START_MOVE_DURATION,
            default_program_filename: "output".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_module_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.time_epsilon, 1e-5);
        assert_eq!(cfg.default_action_duration, 1.0);
        assert_eq!(cfg.min_action_duration, 0.2);
        assert_eq!(cfg.default_program_filename, "output");
    }

    #[test]
    fn config_roundtrips_through_json() {
        let cfg = Config::default();
        let s = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&s).unwrap();
        assert_eq!(cfg, back);
    }
}
