//! Scheduling policy: session length, break length and daily cap.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Focus session length in minutes.
pub const POMODORO_MINS: u32 = 25;
/// Gap after every focus session in minutes.
pub const BREAK_MINS: u32 = 5;
/// Daily focus cap in normal mode.
pub const DAILY_CAP_MINS: u32 = 240;
/// Daily focus cap in cram mode.
pub const CRAM_DAILY_CAP_MINS: u32 = 360;

/// Parameters that shape how effort is cut into slots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Target focus session length. Always positive.
    pub pomodoro_mins: u32,
    pub break_mins: u32,
    /// Cap on focus minutes per calendar day, `None` for uncapped.
    #[serde(default)]
    pub max_per_day_mins: Option<u32>,
    #[serde(default)]
    pub cram: bool,
}

impl PlanPolicy {
    /// Build a custom policy.
    ///
    /// # Errors
    /// Returns an error if `pomodoro_mins` or a present cap is zero.
    pub fn new(
        pomodoro_mins: u32,
        break_mins: u32,
        max_per_day_mins: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let policy = Self {
            pomodoro_mins,
            break_mins,
            max_per_day_mins,
            cram: false,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pomodoro_mins == 0 {
            return Err(ValidationError::InvalidValue {
                field: "pomodoro_mins".into(),
                message: "must be positive".into(),
            });
        }
        if self.max_per_day_mins == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "max_per_day_mins".into(),
                message: "must be positive when set".into(),
            });
        }
        Ok(())
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        resolve_policy(false)
    }
}

/// Derive the policy for normal or cram mode.
///
/// Cram mode only raises the daily cap; session and break lengths stay the same.
pub fn resolve_policy(cram: bool) -> PlanPolicy {
    PlanPolicy {
        pomodoro_mins: POMODORO_MINS,
        break_mins: BREAK_MINS,
        max_per_day_mins: Some(if cram {
            CRAM_DAILY_CAP_MINS
        } else {
            DAILY_CAP_MINS
        }),
        cram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_policy() {
        let policy = resolve_policy(false);
        assert_eq!(policy.pomodoro_mins, 25);
        assert_eq!(policy.break_mins, 5);
        assert_eq!(policy.max_per_day_mins, Some(240));
        assert!(!policy.cram);
    }

    #[test]
    fn cram_only_raises_cap() {
        let normal = resolve_policy(false);
        let cram = resolve_policy(true);
        assert_eq!(cram.max_per_day_mins, Some(360));
        assert_eq!(cram.pomodoro_mins, normal.pomodoro_mins);
        assert_eq!(cram.break_mins, normal.break_mins);
        assert!(cram.cram);
    }

    #[test]
    fn default_is_normal_mode() {
        assert_eq!(PlanPolicy::default(), resolve_policy(false));
    }

    #[test]
    fn custom_policy_validation() {
        assert!(PlanPolicy::new(50, 10, None).is_ok());
        assert!(PlanPolicy::new(0, 5, Some(240)).is_err());
        assert!(PlanPolicy::new(25, 5, Some(0)).is_err());
    }
}
