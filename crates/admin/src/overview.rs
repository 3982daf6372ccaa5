//! Read-side aggregates for the group dashboard — counts, seat utilization,
//! expiring-soon rows, and module adoption across the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stayops_catalog::{ModuleId, PlanTier};
use stayops_directory::DirectoryStore;
use stayops_entitlement::{
    days_remaining, expiration_state, list_active_modules, utilization_alert, EntityStatus,
    ExpirationState, UtilizationAlert,
};
use stayops_entitlement::expiry::notification_band;

/// Unit counts per plan tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlanBreakdown {
    pub essentials: u64,
    pub professional: u64,
    pub enterprise: u64,
}

impl PlanBreakdown {
    fn bump(&mut self, plan: PlanTier) {
        match plan {
            PlanTier::Essentials => self.essentials += 1,
            PlanTier::Professional => self.professional += 1,
            PlanTier::Enterprise => self.enterprise += 1,
        }
    }
}

/// Aggregate view of one seat class across the directory.
/// `alert` is `None` for a zero-capacity aggregate — utilization is
/// undefined there and is rendered as such, never divided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoolSummary {
    pub allocated: u32,
    pub consumed: u32,
    pub alert: Option<UtilizationAlert>,
}

impl PoolSummary {
    fn build(allocated: u32, consumed: u32) -> Self {
        Self {
            allocated,
            consumed,
            alert: utilization_alert(consumed, allocated).ok(),
        }
    }
}

/// One entity approaching (or past) its expiration, for the reminder table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryRow {
    pub entity_id: Uuid,
    pub name: String,
    pub kind: String,
    pub state: ExpirationState,
    pub days_remaining: i64,
    pub notice_band: Option<i64>,
}

/// How many units have a module effectively active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleAdoption {
    pub module: ModuleId,
    pub active_units: u64,
}

/// Top-level dashboard snapshot for a hotel group operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOverview {
    pub total_units: u64,
    pub active_units: u64,
    pub inactive_units: u64,
    pub total_clusters: u64,
    pub units_by_plan: PlanBreakdown,
    pub staff_seats: PoolSummary,
    pub cluster_user_seats: PoolSummary,
    pub expiring: Vec<ExpiryRow>,
    pub module_adoption: Vec<ModuleAdoption>,
    pub generated_at: DateTime<Utc>,
}

/// Per-unit row for the admin table and the single-unit detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRow {
    pub unit_id: Uuid,
    pub name: String,
    pub plan: PlanTier,
    pub status: EntityStatus,
    pub staff_seats: PoolSummary,
    pub staff_seats_free: u32,
    pub expiration: ExpirationState,
    pub active_modules: Vec<ModuleId>,
}

impl GroupOverview {
    /// Derive the full snapshot from the directory at `now`.
    pub fn build(store: &DirectoryStore, now: DateTime<Utc>) -> Self {
        let units = store.list_units();
        let clusters = store.list_clusters();

        let mut units_by_plan = PlanBreakdown::default();
        let mut active_units = 0u64;
        let mut staff_allocated = 0u32;
        let mut staff_consumed = 0u32;
        let mut expiring = Vec::new();
        let mut adoption: Vec<ModuleAdoption> = ModuleId::ALL
            .iter()
            .map(|m| ModuleAdoption {
                module: *m,
                active_units: 0,
            })
            .collect();

        for unit in &units {
            units_by_plan.bump(unit.plan);
            if unit.status == EntityStatus::Active {
                active_units += 1;
            }
            staff_allocated += unit.staff_seats.allocated;
            staff_consumed += unit.staff_seats.consumed;

            push_expiry_row(&mut expiring, unit.id, &unit.name, "business_unit", unit.expires_at, unit.grace_period_days, now);

            for module in list_active_modules(unit, now) {
                if let Some(entry) = adoption.iter_mut().find(|a| a.module == module) {
                    entry.active_units += 1;
                }
            }
        }

        let mut cluster_allocated = 0u32;
        let mut cluster_consumed = 0u32;
        for cluster in &clusters {
            cluster_allocated += cluster.cluster_user_seats.allocated;
            cluster_consumed += cluster.cluster_user_seats.consumed;
            push_expiry_row(&mut expiring, cluster.id, &cluster.name, "cluster", cluster.expires_at, cluster.grace_period_days, now);
        }

        expiring.sort_by_key(|row| row.days_remaining);
        adoption.retain(|a| a.active_units > 0);

        Self {
            total_units: units.len() as u64,
            active_units,
            inactive_units: units.len() as u64 - active_units,
            total_clusters: clusters.len() as u64,
            units_by_plan,
            staff_seats: PoolSummary::build(staff_allocated, staff_consumed),
            cluster_user_seats: PoolSummary::build(cluster_allocated, cluster_consumed),
            expiring,
            module_adoption: adoption,
            generated_at: now,
        }
    }
}

fn push_expiry_row(
    rows: &mut Vec<ExpiryRow>,
    entity_id: Uuid,
    name: &str,
    kind: &'static str,
    expires_at: DateTime<Utc>,
    grace_period_days: i64,
    now: DateTime<Utc>,
) {
    let state = expiration_state(expires_at, grace_period_days, now);
    if state == ExpirationState::Active {
        return;
    }
    let days = days_remaining(expires_at, now);
    rows.push(ExpiryRow {
        entity_id,
        name: name.to_string(),
        kind: kind.to_string(),
        state,
        days_remaining: days,
        notice_band: notification_band(days),
    });
}

fn build_unit_row(unit: &stayops_entitlement::BusinessUnit, now: DateTime<Utc>) -> UnitRow {
    UnitRow {
        unit_id: unit.id,
        name: unit.name.clone(),
        plan: unit.plan,
        status: unit.status,
        staff_seats: PoolSummary::build(unit.staff_seats.allocated, unit.staff_seats.consumed),
        staff_seats_free: unit.staff_seats.remaining(),
        expiration: expiration_state(unit.expires_at, unit.grace_period_days, now),
        active_modules: list_active_modules(unit, now).collect(),
    }
}

/// Per-unit rows for the admin table, in directory order (sorted by name).
pub fn unit_rows(store: &DirectoryStore, now: DateTime<Utc>) -> Vec<UnitRow> {
    store
        .list_units()
        .iter()
        .map(|unit| build_unit_row(unit, now))
        .collect()
}

/// Detail row for a single unit, `None` when the unit does not exist.
pub fn unit_detail(store: &DirectoryStore, unit_id: Uuid, now: DateTime<Utc>) -> Option<UnitRow> {
    store.load_unit(unit_id).map(|unit| build_unit_row(&unit, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stayops_entitlement::SeatLedger;

    #[test]
    fn test_overview_from_seeded_group() {
        let store = DirectoryStore::new();
        let ledger = SeatLedger::new();
        store.seed_demo_group(&ledger);
        let now = Utc::now();

        let overview = GroupOverview::build(&store, now);
        assert_eq!(overview.total_units, 3);
        assert_eq!(overview.active_units, 3);
        assert_eq!(overview.total_clusters, 1);
        assert_eq!(overview.units_by_plan.professional, 2);
        assert_eq!(overview.units_by_plan.essentials, 1);

        // Seeded staff: 12 + 8 + 3 across plans 50 + 50 + 10.
        assert_eq!(overview.staff_seats.consumed, 23);
        assert_eq!(overview.staff_seats.allocated, 110);
        assert_eq!(overview.staff_seats.alert, Some(UtilizationAlert::Normal));

        // Seaside Resort expires in 25 days and lands in the expiring table.
        assert!(overview
            .expiring
            .iter()
            .any(|row| row.name == "Seaside Resort" && row.notice_band == Some(30)));

        // Module adoption counts the seeded activations.
        let pos = overview
            .module_adoption
            .iter()
            .find(|a| a.module == ModuleId::PointOfSale)
            .unwrap();
        assert_eq!(pos.active_units, 1);
    }

    #[test]
    fn test_zero_capacity_pool_has_no_alert() {
        let store = DirectoryStore::new();
        let overview = GroupOverview::build(&store, Utc::now());
        assert_eq!(overview.staff_seats.allocated, 0);
        assert!(overview.staff_seats.alert.is_none());
    }

    #[test]
    fn test_unit_rows_reflect_state() {
        let store = DirectoryStore::new();
        let ledger = SeatLedger::new();
        let now = Utc::now();
        let unit = store.provision_unit(
            "Boutique Inn",
            stayops_catalog::PlanTier::Essentials,
            now + Duration::days(10),
            7,
        );
        let mut rec = store.load_unit(unit.id).unwrap();
        for _ in 0..9 {
            ledger.assign_seat(&mut rec, Uuid::new_v4(), now).unwrap();
        }
        store.save_unit(rec);

        let rows = unit_rows(&store, now);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Boutique Inn");
        assert!(matches!(
            row.expiration,
            ExpirationState::ExpiringSoon { days_left: 10 }
        ));
        // 9 of 10 seats: warning band.
        assert!(matches!(
            row.staff_seats.alert,
            Some(UtilizationAlert::Warning { .. })
        ));
    }

    #[test]
    fn test_unit_detail_by_id() {
        let store = DirectoryStore::new();
        let ledger = SeatLedger::new();
        let now = Utc::now();
        let unit = store.provision_unit(
            "Lakeside Lodge",
            stayops_catalog::PlanTier::Professional,
            now + Duration::days(365),
            14,
        );
        let mut rec = store.load_unit(unit.id).unwrap();
        ledger.assign_seat(&mut rec, Uuid::new_v4(), now).unwrap();
        stayops_entitlement::activate_module(
            &mut rec,
            ModuleId::GuestCrm,
            now + Duration::days(90),
            None,
            now,
        )
        .unwrap();
        store.save_unit(rec);

        let detail = unit_detail(&store, unit.id, now).unwrap();
        assert_eq!(detail.name, "Lakeside Lodge");
        assert_eq!(detail.staff_seats.consumed, 1);
        assert_eq!(detail.staff_seats_free, 49);
        assert_eq!(detail.active_modules, vec![ModuleId::GuestCrm]);
        assert!(matches!(detail.expiration, ExpirationState::Active));

        assert!(unit_detail(&store, Uuid::new_v4(), now).is_none());
    }
}
