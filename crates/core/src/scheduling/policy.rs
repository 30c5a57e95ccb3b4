//! Configurable scheduling limits.

use chrono::Duration;

use crate::error::CoreError;

/// Default maximum length of a single shift, in hours.
pub const DEFAULT_MAX_SHIFT_HOURS: i64 = 12;

/// Default minimum rest between two shifts of the same officer, in hours.
pub const DEFAULT_MIN_REST_HOURS: i64 = 8;

/// Default maximum number of shifts one officer may start on a calendar day.
pub const DEFAULT_MAX_SHIFTS_PER_DAY: usize = 3;

/// Limits applied by the shift conflict validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    /// Longest allowed `end - start` (inclusive).
    pub max_shift_duration: Duration,
    /// Shortest allowed gap between two shifts of one officer (inclusive).
    pub min_rest_period: Duration,
    /// Most shifts one officer may have on the proposal's calendar day.
    pub max_shifts_per_day: usize,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            max_shift_duration: Duration::hours(DEFAULT_MAX_SHIFT_HOURS),
            min_rest_period: Duration::hours(DEFAULT_MIN_REST_HOURS),
            max_shifts_per_day: DEFAULT_MAX_SHIFTS_PER_DAY,
        }
    }
}

impl SchedulingPolicy {
    /// Build a policy from whole-hour settings, validating the result.
    pub fn from_hours(
        max_shift_hours: i64,
        min_rest_hours: i64,
        max_shifts_per_day: usize,
    ) -> Result<Self, CoreError> {
        let max_shift_duration = Duration::try_hours(max_shift_hours).ok_or_else(|| {
            CoreError::Validation(format!("max shift hours out of range: {max_shift_hours}"))
        })?;
        let min_rest_period = Duration::try_hours(min_rest_hours).ok_or_else(|| {
            CoreError::Validation(format!("min rest hours out of range: {min_rest_hours}"))
        })?;

        let policy = Self {
            max_shift_duration,
            min_rest_period,
            max_shifts_per_day,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Reject policies that would make every shift invalid or disable a rule
    /// by accident.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_shift_duration <= Duration::zero() {
            return Err(CoreError::Validation(
                "max shift duration must be positive".to_string(),
            ));
        }
        if self.min_rest_period < Duration::zero() {
            return Err(CoreError::Validation(
                "min rest period must not be negative".to_string(),
            ));
        }
        if self.max_shifts_per_day == 0 {
            return Err(CoreError::Validation(
                "max shifts per day must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
