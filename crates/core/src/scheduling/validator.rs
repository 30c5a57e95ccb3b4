//! The shift conflict validator and the lookup seams it reads through.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;

use super::policy::SchedulingPolicy;
use super::rejection::{LookupError, ScheduleError, ShiftRejection};
use super::rules::{check_officer_conflicts, check_time_bounds, ShiftWindow};
use super::{ProposedShift, ScheduledShift};
use crate::types::{DbId, Timestamp};

/// Resolves officer identifiers to existing officers.
#[async_trait]
pub trait OfficerDirectory: Send + Sync {
    /// Return the subset of `officer_ids` that exist.
    async fn find_existing_officers(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<DbId>, LookupError>;
}

/// Read access to already scheduled shifts.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Return every active shift assigned to at least one of `officer_ids`.
    async fn find_shifts_by_any_officer(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<ScheduledShift>, LookupError>;
}

// One value may back both seams, e.g. lookups sharing a single connection.

#[async_trait]
impl<'a, T: OfficerDirectory + ?Sized> OfficerDirectory for &'a T {
    async fn find_existing_officers(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<DbId>, LookupError> {
        (**self).find_existing_officers(officer_ids).await
    }
}

#[async_trait]
impl<'a, T: ShiftStore + ?Sized> ShiftStore for &'a T {
    async fn find_shifts_by_any_officer(
        &self,
        officer_ids: &BTreeSet<DbId>,
    ) -> Result<Vec<ScheduledShift>, LookupError> {
        (**self).find_shifts_by_any_officer(officer_ids).await
    }
}

/// Gate run before a shift is created or updated.
///
/// Rules are evaluated fail-fast; the first violated rule determines the
/// rejection. The validator holds no mutable state and performs at most one
/// read against each collaborator.
pub struct ShiftConflictValidator<D, S> {
    directory: D,
    store: S,
    policy: SchedulingPolicy,
}

impl<D, S> ShiftConflictValidator<D, S>
where
    D: OfficerDirectory,
    S: ShiftStore,
{
    pub fn new(directory: D, store: S, policy: SchedulingPolicy) -> Self {
        Self {
            directory,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    /// Validate `proposed` against the current wall clock.
    pub async fn validate(&self, proposed: &ProposedShift) -> Result<ShiftWindow, ScheduleError> {
        self.validate_at(proposed, Utc::now()).await
    }

    /// Validate `proposed` as if the current time were `now`.
    ///
    /// Returns the checked window on success.
    pub async fn validate_at(
        &self,
        proposed: &ProposedShift,
        now: Timestamp,
    ) -> Result<ShiftWindow, ScheduleError> {
        let window =
            check_time_bounds(proposed.start_time, proposed.end_time, now, &self.policy)?;

        if proposed.officer_ids.is_empty() {
            return Err(ShiftRejection::NoOfficersAssigned.into());
        }

        let found: BTreeSet<DbId> = self
            .directory
            .find_existing_officers(&proposed.officer_ids)
            .await?
            .into_iter()
            .collect();
        let missing: Vec<DbId> = proposed.officer_ids.difference(&found).copied().collect();
        if !missing.is_empty() {
            return Err(ShiftRejection::OfficersNotFound { missing }.into());
        }

        let mut candidates = self
            .store
            .find_shifts_by_any_officer(&proposed.officer_ids)
            .await?;
        if let Some(own_id) = proposed.id {
            candidates.retain(|s| s.id != own_id);
        }

        check_officer_conflicts(&window, &proposed.officer_ids, &candidates, &self.policy)?;

        Ok(window)
    }
}
