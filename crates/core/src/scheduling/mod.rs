//! Shift scheduling: policy, conflict rules, and the conflict validator.
//!
//! The validator is a pure gate invoked before a shift is created or
//! updated. It reads officer and shift data through the [`OfficerDirectory`]
//! and [`ShiftStore`] traits and never writes.

pub mod policy;
pub mod rejection;
pub mod rules;
pub mod validator;

use std::collections::BTreeSet;

use crate::types::{DbId, Timestamp};

pub use policy::SchedulingPolicy;
pub use rejection::{LookupError, ScheduleError, ShiftRejection};
pub use rules::ShiftWindow;
pub use validator::{OfficerDirectory, ShiftConflictValidator, ShiftStore};

/// A shift submitted for validation.
///
/// `id` is set when the proposal updates an existing shift so the stored
/// version of that shift is not treated as a conflict with itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedShift {
    pub id: Option<DbId>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub officer_ids: BTreeSet<DbId>,
}

/// An existing shift as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledShift {
    pub id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub officer_ids: BTreeSet<DbId>,
}
