//! Shift lifecycle status constants and state machine.
//!
//! Status IDs match the `shift_statuses` seed data (1-based SMALLINT). The
//! `db` crate mirrors them as the `ShiftStatus` enum; this module stays free
//! of internal deps so the rules can be exercised without a database.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status IDs
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: i16 = 1;
pub const STATUS_APPROVED: i16 = 2;
pub const STATUS_ACTIVE: i16 = 3;
pub const STATUS_COMPLETED: i16 = 4;
pub const STATUS_CANCELLED: i16 = 5;
pub const STATUS_REJECTED: i16 = 6;

/// Statuses whose shifts no longer occupy an officer's time.
///
/// Shifts in these states are never returned as conflict candidates.
pub const INACTIVE_STATUSES: &[i16] = &[STATUS_CANCELLED, STATUS_REJECTED];

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Returns the set of valid target status IDs reachable from `from_status`.
///
/// Terminal states (Completed, Cancelled, Rejected) return an empty slice.
pub fn valid_transitions(from_status: i16) -> &'static [i16] {
    match from_status {
        // Pending -> Approved, Rejected, Cancelled
        STATUS_PENDING => &[STATUS_APPROVED, STATUS_REJECTED, STATUS_CANCELLED],
        // Approved -> Active, Cancelled
        STATUS_APPROVED => &[STATUS_ACTIVE, STATUS_CANCELLED],
        // Active -> Completed, Cancelled
        STATUS_ACTIVE => &[STATUS_COMPLETED, STATUS_CANCELLED],
        STATUS_COMPLETED | STATUS_CANCELLED | STATUS_REJECTED => &[],
        _ => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: i16, to: i16) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, naming both statuses on failure.
pub fn validate_transition(from: i16, to: i16) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid shift status transition: {} ({from}) -> {} ({to})",
            status_name(from),
            status_name(to),
        )))
    }
}

/// Whether a shift in this status may still have its window or officers changed.
pub fn is_editable(status: i16) -> bool {
    matches!(status, STATUS_PENDING | STATUS_APPROVED)
}

/// Whether a shift in this status blocks its officers' time.
pub fn is_blocking(status: i16) -> bool {
    !INACTIVE_STATUSES.contains(&status)
}

/// Human-readable name for a status ID (for error messages).
pub fn status_name(id: i16) -> &'static str {
    match id {
        STATUS_PENDING => "Pending",
        STATUS_APPROVED => "Approved",
        STATUS_ACTIVE => "Active",
        STATUS_COMPLETED => "Completed",
        STATUS_CANCELLED => "Cancelled",
        STATUS_REJECTED => "Rejected",
        _ => "Unknown",
    }
}
