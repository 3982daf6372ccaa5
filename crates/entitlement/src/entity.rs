//! Entity records — business units (single properties) and clusters (hotel
//! groups), each carrying its own seat pool and expiration window.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stayops_catalog::{ModuleConfig, ModuleId, PlanTier};
use uuid::Uuid;

/// Entity lifecycle status. An entity goes `Inactive` once its expiration has
/// passed the grace window and the expiry sweep has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Active,
    Inactive,
}

/// Which seat class an assignment consumes. Staff seats are scoped to one
/// business unit; cluster-user seats to one cluster. The pools never
/// cross-subsidize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatKind {
    Staff,
    ClusterUser,
}

impl std::fmt::Display for SeatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staff => f.write_str("staff"),
            Self::ClusterUser => f.write_str("cluster_user"),
        }
    }
}

/// Allocated vs. consumed seats for one pool.
/// `consumed` is only ever mutated through the seat ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPool {
    pub allocated: u32,
    pub consumed: u32,
}

impl SeatPool {
    pub fn new(allocated: u32) -> Self {
        Self {
            allocated,
            consumed: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.allocated.saturating_sub(self.consumed)
    }

    pub fn is_full(&self) -> bool {
        self.consumed >= self.allocated
    }
}

/// An active module grant on a business unit. Its expiration is independent
/// of the owning unit's expiration; neither implies the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntitlement {
    pub module: ModuleId,
    pub expires_at: DateTime<Utc>,
    pub activated_at: DateTime<Utc>,
    pub config: Option<ModuleConfig>,
}

/// A single property with its own staff seat pool and module entitlements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: PlanTier,
    pub status: EntityStatus,
    pub staff_seats: SeatPool,
    pub expires_at: DateTime<Utc>,
    pub grace_period_days: i64,
    pub module_entitlements: BTreeMap<ModuleId, ModuleEntitlement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessUnit {
    /// Provision a unit with its staff seat pool sized from the plan ceiling.
    pub fn provision(
        name: impl Into<String>,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
        grace_period_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            plan,
            status: EntityStatus::Active,
            staff_seats: SeatPool::new(plan.staff_seat_max()),
            expires_at,
            grace_period_days,
            module_entitlements: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A hotel group. Holds its own cross-property user seat pool and weak
/// references to member units: membership never owns a unit's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: PlanTier,
    pub status: EntityStatus,
    pub cluster_user_seats: SeatPool,
    pub expires_at: DateTime<Utc>,
    pub grace_period_days: i64,
    pub member_units: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cluster {
    /// Provision a cluster with its user seat pool sized from the plan ceiling.
    pub fn provision(
        name: impl Into<String>,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
        grace_period_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            plan,
            status: EntityStatus::Active,
            cluster_user_seats: SeatPool::new(plan.cluster_user_seat_max()),
            expires_at,
            grace_period_days,
            member_units: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// The seam the seat ledger works through: each entity kind exposes exactly
/// one pool, so staff seats and cluster-user seats cannot cross-subsidize.
pub trait SeatScoped {
    fn entity_id(&self) -> Uuid;
    fn seat_kind(&self) -> SeatKind;
    fn status(&self) -> EntityStatus;
    fn expires_at(&self) -> DateTime<Utc>;
    fn grace_period_days(&self) -> i64;
    fn seats(&self) -> &SeatPool;
    fn seats_mut(&mut self) -> &mut SeatPool;
}

impl SeatScoped for BusinessUnit {
    fn entity_id(&self) -> Uuid {
        self.id
    }
    fn seat_kind(&self) -> SeatKind {
        SeatKind::Staff
    }
    fn status(&self) -> EntityStatus {
        self.status
    }
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
    fn grace_period_days(&self) -> i64 {
        self.grace_period_days
    }
    fn seats(&self) -> &SeatPool {
        &self.staff_seats
    }
    fn seats_mut(&mut self) -> &mut SeatPool {
        &mut self.staff_seats
    }
}

impl SeatScoped for Cluster {
    fn entity_id(&self) -> Uuid {
        self.id
    }
    fn seat_kind(&self) -> SeatKind {
        SeatKind::ClusterUser
    }
    fn status(&self) -> EntityStatus {
        self.status
    }
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
    fn grace_period_days(&self) -> i64 {
        self.grace_period_days
    }
    fn seats(&self) -> &SeatPool {
        &self.cluster_user_seats
    }
    fn seats_mut(&mut self) -> &mut SeatPool {
        &mut self.cluster_user_seats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_provision_uses_plan_ceilings() {
        let now = Utc::now();
        let unit = BusinessUnit::provision(
            "Harbor View Hotel",
            PlanTier::Professional,
            now + Duration::days(365),
            14,
            now,
        );
        assert_eq!(unit.slug, "harbor-view-hotel");
        assert_eq!(unit.staff_seats.allocated, 50);
        assert_eq!(unit.staff_seats.consumed, 0);
        assert_eq!(unit.status, EntityStatus::Active);
        assert!(unit.module_entitlements.is_empty());

        let cluster = Cluster::provision(
            "Coastline Group",
            PlanTier::Enterprise,
            now + Duration::days(365),
            30,
            now,
        );
        assert_eq!(cluster.cluster_user_seats.allocated, 100);
        assert!(cluster.member_units.is_empty());
    }

    #[test]
    fn test_seat_pool_helpers() {
        let mut pool = SeatPool::new(3);
        assert_eq!(pool.remaining(), 3);
        assert!(!pool.is_full());
        pool.consumed = 3;
        assert_eq!(pool.remaining(), 0);
        assert!(pool.is_full());
    }

    #[test]
    fn test_seat_kinds_are_scoped() {
        let now = Utc::now();
        let unit =
            BusinessUnit::provision("A", PlanTier::Essentials, now + Duration::days(30), 7, now);
        let cluster =
            Cluster::provision("B", PlanTier::Essentials, now + Duration::days(30), 7, now);
        assert_eq!(unit.seat_kind(), SeatKind::Staff);
        assert_eq!(cluster.seat_kind(), SeatKind::ClusterUser);
    }
}
