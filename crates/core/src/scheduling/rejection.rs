//! Outcomes of a failed validation: client-fixable rejections and
//! infrastructure lookup failures.

use chrono::{Duration, NaiveDate};

use crate::types::{DbId, Timestamp};

/// Why a proposed shift was rejected. Exactly one reason per rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftRejection {
    #[error("Shift start and end times are both required")]
    MissingTimeBounds,

    #[error("Shift start ({start}) must be before its end ({end})")]
    StartNotBeforeEnd { start: Timestamp, end: Timestamp },

    #[error("Shift start ({start}) is in the past")]
    StartsInPast { start: Timestamp, now: Timestamp },

    #[error(
        "Shift duration of {} exceeds the maximum of {}",
        format_duration(.duration),
        format_duration(.max)
    )]
    DurationExceeded { duration: Duration, max: Duration },

    #[error("At least one officer must be assigned to a shift")]
    NoOfficersAssigned,

    #[error("One or more officers not found: {}", join_ids(.missing))]
    OfficersNotFound { missing: Vec<DbId> },

    #[error("Officer {officer_id} has an overlapping shift {shift_id}")]
    Overlap { officer_id: DbId, shift_id: DbId },

    #[error(
        "Officer {officer_id} would rest only {} next to shift {shift_id}; at least {} is required",
        format_duration(.gap),
        format_duration(.required)
    )]
    InsufficientRest {
        officer_id: DbId,
        shift_id: DbId,
        gap: Duration,
        required: Duration,
    },

    #[error("Officer {officer_id} would exceed the limit of {limit} shifts on {day}")]
    DailyLimitExceeded {
        officer_id: DbId,
        day: NaiveDate,
        limit: usize,
    },
}

impl ShiftRejection {
    /// Whether the rejection comes from a clash with other shifts rather than
    /// from the shape of the proposal itself.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Overlap { .. } | Self::InsufficientRest { .. } | Self::DailyLimitExceeded { .. }
        )
    }

    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingTimeBounds => "missing_time_bounds",
            Self::StartNotBeforeEnd { .. } => "start_not_before_end",
            Self::StartsInPast { .. } => "starts_in_past",
            Self::DurationExceeded { .. } => "duration_exceeded",
            Self::NoOfficersAssigned => "no_officers_assigned",
            Self::OfficersNotFound { .. } => "officers_not_found",
            Self::Overlap { .. } => "overlap",
            Self::InsufficientRest { .. } => "insufficient_rest",
            Self::DailyLimitExceeded { .. } => "daily_limit_exceeded",
        }
    }
}

/// A collaborator read failed, so the proposal could not be checked at all.
#[derive(Debug, thiserror::Error)]
#[error("{collaborator} lookup failed: {message}")]
pub struct LookupError {
    /// Which collaborator failed (`"officer directory"` or `"shift store"`).
    pub collaborator: &'static str,
    pub message: String,
}

impl LookupError {
    pub fn officer_directory(err: impl std::fmt::Display) -> Self {
        Self {
            collaborator: "officer directory",
            message: err.to_string(),
        }
    }

    pub fn shift_store(err: impl std::fmt::Display) -> Self {
        Self {
            collaborator: "shift store",
            message: err.to_string(),
        }
    }
}

/// Error returned by [`ShiftConflictValidator`](super::ShiftConflictValidator).
///
/// Keeps "your shift is invalid" apart from "we could not check".
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Rejected(#[from] ShiftRejection),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Render a duration as `"8h"`, `"7h 30m"`, or `"45m"`.
pub fn format_duration(d: &Duration) -> String {
    let total = d.num_minutes();
    let (hours, minutes) = (total / 60, total % 60);
    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {}m", m.abs()),
    }
}

fn join_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
