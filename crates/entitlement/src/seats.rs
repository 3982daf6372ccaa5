//! Seat ledger — the single mutation path for seat pool counters.
//!
//! Assignments are soft-deleted: revoked and reclaimed records stay in the
//! ledger as an audit trail, they just stop counting against the pool.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::entity::{EntityStatus, SeatKind, SeatScoped};
use crate::expiry::expiration_state;

/// Business-rule failures from seat mutations. All recoverable by the caller
/// choosing a different action; none are retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatError {
    #[error("seat pool is full: {consumed} of {allocated} seats consumed")]
    QuotaExceeded { allocated: u32, consumed: u32 },
    #[error("user {user_id} already holds a seat on this entity")]
    DuplicateAssignment { user_id: Uuid },
    #[error("no active seat assignment for user {user_id} on this entity")]
    AssignmentNotFound { user_id: Uuid },
    #[error("entity {entity_id} is expired; seats cannot be assigned")]
    EntityExpired { entity_id: Uuid },
}

/// Assignment lifecycle. Both non-`Active` states are terminal; an
/// assignment never returns to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Active,
    Revoked,
    ReclaimedExpired,
}

/// One user occupying one seat on one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub kind: SeatKind,
    pub state: AssignmentState,
    pub assigned_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

impl SeatAssignment {
    pub fn is_live(&self) -> bool {
        self.state == AssignmentState::Active
    }
}

/// In-memory assignment table. Holds no entity state itself; entities are
/// passed in by the caller and written back through the data collaborator.
pub struct SeatLedger {
    assignments: DashMap<Uuid, SeatAssignment>,
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatLedger {
    pub fn new() -> Self {
        Self {
            assignments: DashMap::new(),
        }
    }

    /// Assign a seat on `entity` to `user_id`.
    ///
    /// Fails without touching the pool when the entity is expired or
    /// inactive, the user already holds a live seat, or the pool is full.
    pub fn assign_seat(
        &self,
        entity: &mut impl SeatScoped,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SeatAssignment, SeatError> {
        let entity_id = entity.entity_id();
        if entity.status() != EntityStatus::Active
            || expiration_state(entity.expires_at(), entity.grace_period_days(), now).is_expired()
        {
            return Err(SeatError::EntityExpired { entity_id });
        }
        if self.find_live(entity_id, user_id).is_some() {
            return Err(SeatError::DuplicateAssignment { user_id });
        }
        let pool = entity.seats();
        if pool.is_full() {
            return Err(SeatError::QuotaExceeded {
                allocated: pool.allocated,
                consumed: pool.consumed,
            });
        }

        let assignment = SeatAssignment {
            id: Uuid::new_v4(),
            user_id,
            entity_id,
            kind: entity.seat_kind(),
            state: AssignmentState::Active,
            assigned_at: now,
            released_at: None,
        };
        entity.seats_mut().consumed += 1;
        self.assignments.insert(assignment.id, assignment.clone());
        info!(
            entity_id = %entity_id,
            user_id = %user_id,
            kind = %assignment.kind,
            consumed = entity.seats().consumed,
            "Seat assigned"
        );
        Ok(assignment)
    }

    /// Release the seat `user_id` holds on `entity`, returning it to the
    /// pool. The assignment record is kept, marked `Revoked`.
    pub fn remove_seat(
        &self,
        entity: &mut impl SeatScoped,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), SeatError> {
        let entity_id = entity.entity_id();
        let assignment_id = self
            .find_live(entity_id, user_id)
            .ok_or(SeatError::AssignmentNotFound { user_id })?;

        if let Some(mut entry) = self.assignments.get_mut(&assignment_id) {
            entry.state = AssignmentState::Revoked;
            entry.released_at = Some(now);
        }
        let pool = entity.seats_mut();
        pool.consumed = pool.consumed.saturating_sub(1);
        info!(
            entity_id = %entity_id,
            user_id = %user_id,
            consumed = entity.seats().consumed,
            "Seat released"
        );
        Ok(())
    }

    /// Force-return every live seat on an expired entity to the pool.
    ///
    /// This is the only path besides `remove_seat` that lowers `consumed`,
    /// and the only one that resets it wholesale. Idempotent: a second call
    /// (or a call on a non-expired entity) reclaims nothing.
    pub fn reclaim_expired_seats(
        &self,
        entity: &mut impl SeatScoped,
        now: DateTime<Utc>,
    ) -> usize {
        let entity_id = entity.entity_id();
        let expired = entity.status() == EntityStatus::Inactive
            || expiration_state(entity.expires_at(), entity.grace_period_days(), now).is_expired();
        if !expired {
            return 0;
        }

        let mut reclaimed = 0;
        for mut entry in self.assignments.iter_mut() {
            if entry.entity_id == entity_id && entry.is_live() {
                entry.state = AssignmentState::ReclaimedExpired;
                entry.released_at = Some(now);
                reclaimed += 1;
            }
        }
        entity.seats_mut().consumed = 0;
        if reclaimed > 0 {
            info!(entity_id = %entity_id, reclaimed, "Expired seats reclaimed");
        }
        reclaimed
    }

    /// Live (quota-consuming) assignments for an entity.
    pub fn live_assignments(&self, entity_id: Uuid) -> Vec<SeatAssignment> {
        self.assignments
            .iter()
            .filter(|e| e.entity_id == entity_id && e.is_live())
            .map(|e| e.value().clone())
            .collect()
    }

    /// Every assignment ever made for an entity, revoked and reclaimed
    /// included. "Has a record" and "counts against quota" are different
    /// questions; this answers the first.
    pub fn assignments_for(&self, entity_id: Uuid) -> Vec<SeatAssignment> {
        let mut records: Vec<_> = self
            .assignments
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .map(|e| e.value().clone())
            .collect();
        records.sort_by_key(|a| a.assigned_at);
        records
    }

    /// Check that an entity's `consumed` counter agrees with the ledger.
    pub fn pool_consistent(&self, entity: &impl SeatScoped) -> bool {
        self.live_assignments(entity.entity_id()).len() as u32 == entity.seats().consumed
    }

    fn find_live(&self, entity_id: Uuid, user_id: Uuid) -> Option<Uuid> {
        self.assignments
            .iter()
            .find(|e| e.entity_id == entity_id && e.user_id == user_id && e.is_live())
            .map(|e| e.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BusinessUnit;
    use chrono::Duration;
    use stayops_catalog::PlanTier;

    fn unit(now: DateTime<Utc>) -> BusinessUnit {
        BusinessUnit::provision(
            "Test Hotel",
            PlanTier::Essentials, // 10 staff seats
            now + Duration::days(365),
            14,
            now,
        )
    }

    #[test]
    fn test_assign_and_remove_round_trip() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);
        let user = Uuid::new_v4();

        let before = unit.staff_seats.consumed;
        ledger.assign_seat(&mut unit, user, now).unwrap();
        assert_eq!(unit.staff_seats.consumed, before + 1);
        assert!(ledger.pool_consistent(&unit));

        ledger.remove_seat(&mut unit, user, now).unwrap();
        assert_eq!(unit.staff_seats.consumed, before);
        assert!(ledger.pool_consistent(&unit));

        // Audit trail survives the removal.
        let records = ledger.assignments_for(unit.id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, AssignmentState::Revoked);
        assert!(records[0].released_at.is_some());
    }

    #[test]
    fn test_duplicate_assignment_rejected() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);
        let user = Uuid::new_v4();

        ledger.assign_seat(&mut unit, user, now).unwrap();
        let err = ledger.assign_seat(&mut unit, user, now).unwrap_err();
        assert_eq!(err, SeatError::DuplicateAssignment { user_id: user });
        assert_eq!(unit.staff_seats.consumed, 1);

        // After release the same user can take a seat again.
        ledger.remove_seat(&mut unit, user, now).unwrap();
        ledger.assign_seat(&mut unit, user, now).unwrap();
        assert_eq!(unit.staff_seats.consumed, 1);
    }

    #[test]
    fn test_quota_exceeded_leaves_pool_unchanged() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);

        for _ in 0..10 {
            ledger.assign_seat(&mut unit, Uuid::new_v4(), now).unwrap();
        }
        assert!(unit.staff_seats.is_full());

        let err = ledger.assign_seat(&mut unit, Uuid::new_v4(), now).unwrap_err();
        assert_eq!(
            err,
            SeatError::QuotaExceeded {
                allocated: 10,
                consumed: 10
            }
        );
        assert_eq!(unit.staff_seats.consumed, 10);
        assert!(ledger.pool_consistent(&unit));
    }

    #[test]
    fn test_remove_without_assignment_fails() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);
        let user = Uuid::new_v4();

        let err = ledger.remove_seat(&mut unit, user, now).unwrap_err();
        assert_eq!(err, SeatError::AssignmentNotFound { user_id: user });
    }

    #[test]
    fn test_expired_entity_rejects_assignment() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);
        // Past expiration and past the 14-day grace window.
        unit.expires_at = now - Duration::days(15);

        let err = ledger.assign_seat(&mut unit, Uuid::new_v4(), now).unwrap_err();
        assert_eq!(err, SeatError::EntityExpired { entity_id: unit.id });

        // In grace, assignment is still allowed.
        unit.expires_at = now - Duration::days(3);
        assert!(ledger.assign_seat(&mut unit, Uuid::new_v4(), now).is_ok());
    }

    #[test]
    fn test_reclaim_is_idempotent() {
        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);

        for _ in 0..4 {
            ledger.assign_seat(&mut unit, Uuid::new_v4(), now).unwrap();
        }

        // Not expired yet: nothing to reclaim.
        assert_eq!(ledger.reclaim_expired_seats(&mut unit, now), 0);
        assert_eq!(unit.staff_seats.consumed, 4);

        unit.expires_at = now - Duration::days(30);
        assert_eq!(ledger.reclaim_expired_seats(&mut unit, now), 4);
        assert_eq!(unit.staff_seats.consumed, 0);
        assert_eq!(ledger.reclaim_expired_seats(&mut unit, now), 0);

        // Records retained, no longer counting.
        assert_eq!(ledger.assignments_for(unit.id).len(), 4);
        assert!(ledger.live_assignments(unit.id).is_empty());
        for record in ledger.assignments_for(unit.id) {
            assert_eq!(record.state, AssignmentState::ReclaimedExpired);
        }
    }

    #[test]
    fn test_random_sequences_preserve_invariant() {
        use rand::prelude::*;

        let now = Utc::now();
        let ledger = SeatLedger::new();
        let mut unit = unit(now);
        let users: Vec<Uuid> = (0..16).map(|_| Uuid::new_v4()).collect();
        let mut rng = StdRng::seed_from_u64(0x5EA7);

        for _ in 0..2_000 {
            let user = *users.choose(&mut rng).unwrap();
            if rng.gen_bool(0.6) {
                let _ = ledger.assign_seat(&mut unit, user, now);
            } else {
                let _ = ledger.remove_seat(&mut unit, user, now);
            }
            assert!(unit.staff_seats.consumed <= unit.staff_seats.allocated);
            assert!(ledger.pool_consistent(&unit));
        }
    }
}
