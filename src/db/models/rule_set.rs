use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-profile detection configuration. One live row per profile, mutated in
/// place by the administrative surface; the evaluator only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub enabled: bool,
    pub continuous_use_limit_min: u32,
    pub forced_break_min: u32,
    pub accel_enabled: bool,
    pub taps_window_sec: u32,
    pub taps_threshold: u32,
    pub screen_changes_window_sec: u32,
    pub screen_changes_threshold: u32,
    pub suggested_pause_min: u32,
    pub updated_at: DateTime<Utc>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            enabled: true,
            continuous_use_limit_min: 90,
            forced_break_min: 10,
            accel_enabled: true,
            taps_window_sec: 10,
            taps_threshold: 25,
            screen_changes_window_sec: 60,
            screen_changes_threshold: 12,
            suggested_pause_min: 5,
            updated_at: Utc::now(),
        }
    }
}

impl RuleSet {
    /// Every window, threshold and duration field must be at least 1.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("continuousUseLimitMin", self.continuous_use_limit_min),
            ("forcedBreakMin", self.forced_break_min),
            ("tapsWindowSec", self.taps_window_sec),
            ("tapsThreshold", self.taps_threshold),
            ("screenChangesWindowSec", self.screen_changes_window_sec),
            ("screenChangesThreshold", self.screen_changes_threshold),
            ("suggestedPauseMin", self.suggested_pause_min),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(format!("{name} must be a positive integer"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_provisioning_values() {
        let rules = RuleSet::default();
        assert!(rules.enabled);
        assert!(rules.accel_enabled);
        assert_eq!(rules.taps_window_sec, 10);
        assert_eq!(rules.taps_threshold, 25);
        assert_eq!(rules.screen_changes_window_sec, 60);
        assert_eq!(rules.screen_changes_threshold, 12);
        assert_eq!(rules.suggested_pause_min, 5);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let rules = RuleSet {
            taps_window_sec: 0,
            ..RuleSet::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(err.contains("tapsWindowSec"));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let rules = RuleSet {
            screen_changes_threshold: 0,
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());
    }
}
