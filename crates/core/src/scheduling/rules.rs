//! Pure scheduling rules. No I/O; the validator feeds them lookup results.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use super::policy::SchedulingPolicy;
use super::rejection::ShiftRejection;
use super::ScheduledShift;
use crate::types::{DbId, Timestamp};

/// A checked, half-open `[start, end)` shift window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ShiftWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The UTC calendar day the window starts on.
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Half-open interval intersection: adjacent windows do not overlap.
pub fn overlaps(a_start: Timestamp, a_end: Timestamp, b_start: Timestamp, b_end: Timestamp) -> bool {
    a_start < b_end && b_start < a_end
}

/// Gap between `window` and a non-overlapping `shift`, or `None` if they overlap.
pub fn rest_gap(window: &ShiftWindow, shift: &ScheduledShift) -> Option<Duration> {
    if shift.end_time <= window.start {
        Some(window.start - shift.end_time)
    } else if shift.start_time >= window.end {
        Some(shift.start_time - window.end)
    } else {
        None
    }
}

/// Time-bound checks: presence, ordering, not in the past, bounded duration.
pub fn check_time_bounds(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    now: Timestamp,
    policy: &SchedulingPolicy,
) -> Result<ShiftWindow, ShiftRejection> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ShiftRejection::MissingTimeBounds);
    };
    if start >= end {
        return Err(ShiftRejection::StartNotBeforeEnd { start, end });
    }
    if start < now {
        return Err(ShiftRejection::StartsInPast { start, now });
    }

    let window = ShiftWindow { start, end };
    let duration = window.duration();
    if duration > policy.max_shift_duration {
        return Err(ShiftRejection::DurationExceeded {
            duration,
            max: policy.max_shift_duration,
        });
    }
    Ok(window)
}

/// Officer conflict checks: overlap, rest period, and daily load, in that order.
///
/// Each rule is checked for every officer before the next rule runs, so an
/// overlap anywhere always wins over a rest-period violation elsewhere.
/// `candidates` must already exclude the shift being updated.
pub fn check_officer_conflicts(
    window: &ShiftWindow,
    officer_ids: &BTreeSet<DbId>,
    candidates: &[ScheduledShift],
    policy: &SchedulingPolicy,
) -> Result<(), ShiftRejection> {
    let mut sorted: Vec<&ScheduledShift> = candidates.iter().collect();
    sorted.sort_by_key(|s| (s.start_time, s.id));

    for &officer_id in officer_ids {
        if let Some(shift) = shifts_of(&sorted, officer_id)
            .find(|s| overlaps(window.start, window.end, s.start_time, s.end_time))
        {
            return Err(ShiftRejection::Overlap {
                officer_id,
                shift_id: shift.id,
            });
        }
    }

    for &officer_id in officer_ids {
        let nearest = shifts_of(&sorted, officer_id)
            .filter_map(|s| rest_gap(window, s).map(|gap| (gap, s.id)))
            .min_by_key(|&(gap, _)| gap);

        if let Some((gap, shift_id)) = nearest {
            if gap < policy.min_rest_period {
                return Err(ShiftRejection::InsufficientRest {
                    officer_id,
                    shift_id,
                    gap,
                    required: policy.min_rest_period,
                });
            }
        }
    }

    let day = window.day();
    for &officer_id in officer_ids {
        let same_day = shifts_of(&sorted, officer_id)
            .filter(|s| s.start_time.date_naive() == day)
            .count();
        // The proposal itself occupies one slot.
        if same_day + 1 > policy.max_shifts_per_day {
            return Err(ShiftRejection::DailyLimitExceeded {
                officer_id,
                day,
                limit: policy.max_shifts_per_day,
            });
        }
    }

    Ok(())
}

fn shifts_of<'a>(
    sorted: &'a [&'a ScheduledShift],
    officer_id: DbId,
) -> impl Iterator<Item = &'a ScheduledShift> + 'a {
    sorted
        .iter()
        .copied()
        .filter(move |s| s.officer_ids.contains(&officer_id))
}
