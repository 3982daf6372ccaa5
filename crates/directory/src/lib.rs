//! StayOps directory — the in-memory record store for clusters and business
//! units. Provisioning, load/save, weak cluster membership, and the expiry
//! sweep live here; seat and module accounting stays in `stayops-entitlement`.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use stayops_catalog::{ModuleId, PlanTier};
use stayops_entitlement::{
    activate_module, expiration_state, BusinessUnit, Cluster, EntityStatus, SeatLedger,
};

/// Outcome of one expiry sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub units_deactivated: usize,
    pub clusters_deactivated: usize,
    pub seats_reclaimed: usize,
}

/// In-memory store of clusters and business units, DashMap-backed.
/// There is no hidden global state: callers hold the store, load records,
/// mutate them through the entitlement crate, and save them back.
pub struct DirectoryStore {
    units: DashMap<Uuid, BusinessUnit>,
    clusters: DashMap<Uuid, Cluster>,
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self {
            units: DashMap::new(),
            clusters: DashMap::new(),
        }
    }

    // -- load / save ---------------------------------------------------------

    pub fn load_unit(&self, id: Uuid) -> Option<BusinessUnit> {
        self.units.get(&id).map(|e| e.value().clone())
    }

    pub fn save_unit(&self, unit: BusinessUnit) {
        self.units.insert(unit.id, unit);
    }

    pub fn load_cluster(&self, id: Uuid) -> Option<Cluster> {
        self.clusters.get(&id).map(|e| e.value().clone())
    }

    pub fn save_cluster(&self, cluster: Cluster) {
        self.clusters.insert(cluster.id, cluster);
    }

    // -- provisioning --------------------------------------------------------

    /// Provision a business unit with its staff allocation taken from the
    /// plan ceiling.
    pub fn provision_unit(
        &self,
        name: impl Into<String>,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
        grace_period_days: i64,
    ) -> BusinessUnit {
        let unit = BusinessUnit::provision(name, plan, expires_at, grace_period_days, Utc::now());
        info!(
            unit_id = %unit.id,
            name = %unit.name,
            plan = %unit.plan,
            staff_allocated = unit.staff_seats.allocated,
            "Business unit provisioned"
        );
        self.units.insert(unit.id, unit.clone());
        unit
    }

    /// Provision a cluster with its user-seat allocation taken from the plan
    /// ceiling.
    pub fn provision_cluster(
        &self,
        name: impl Into<String>,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
        grace_period_days: i64,
    ) -> Cluster {
        let cluster = Cluster::provision(name, plan, expires_at, grace_period_days, Utc::now());
        info!(
            cluster_id = %cluster.id,
            name = %cluster.name,
            plan = %cluster.plan,
            user_allocated = cluster.cluster_user_seats.allocated,
            "Cluster provisioned"
        );
        self.clusters.insert(cluster.id, cluster.clone());
        cluster
    }

    // -- membership ----------------------------------------------------------

    /// Attach a unit to a cluster. Membership is by reference only; the
    /// cluster never owns the unit's lifecycle.
    pub fn attach_unit(&self, cluster_id: Uuid, unit_id: Uuid) -> Option<()> {
        if !self.units.contains_key(&unit_id) {
            return None;
        }
        let mut cluster = self.clusters.get_mut(&cluster_id)?;
        cluster.member_units.insert(unit_id);
        cluster.updated_at = Utc::now();
        info!(cluster_id = %cluster_id, unit_id = %unit_id, "Unit attached to cluster");
        Some(())
    }

    pub fn detach_unit(&self, cluster_id: Uuid, unit_id: Uuid) -> Option<()> {
        let mut cluster = self.clusters.get_mut(&cluster_id)?;
        cluster.member_units.remove(&unit_id);
        cluster.updated_at = Utc::now();
        info!(cluster_id = %cluster_id, unit_id = %unit_id, "Unit detached from cluster");
        Some(())
    }

    /// Delete a unit and drop the dangling references clusters hold to it.
    /// Clusters themselves are untouched.
    pub fn remove_unit(&self, unit_id: Uuid) -> Option<BusinessUnit> {
        let (_, unit) = self.units.remove(&unit_id)?;
        for mut cluster in self.clusters.iter_mut() {
            cluster.member_units.remove(&unit_id);
        }
        info!(unit_id = %unit_id, name = %unit.name, "Business unit removed");
        Some(unit)
    }

    // -- listings ------------------------------------------------------------

    pub fn list_units(&self) -> Vec<BusinessUnit> {
        let mut units: Vec<_> = self.units.iter().map(|e| e.value().clone()).collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        units
    }

    pub fn list_clusters(&self) -> Vec<Cluster> {
        let mut clusters: Vec<_> = self.clusters.iter().map(|e| e.value().clone()).collect();
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        clusters
    }

    /// Member units of a cluster, sorted by name. References to units that
    /// have since been removed are skipped.
    pub fn units_in(&self, cluster_id: Uuid) -> Vec<BusinessUnit> {
        let Some(cluster) = self.load_cluster(cluster_id) else {
            return Vec::new();
        };
        let mut units: Vec<_> = cluster
            .member_units
            .iter()
            .filter_map(|id| self.load_unit(*id))
            .collect();
        units.sort_by(|a, b| a.name.cmp(&b.name));
        units
    }

    // -- expiry sweep --------------------------------------------------------

    /// Flip entities that are expired past grace to `Inactive` and reclaim
    /// their live seats through the ledger. Idempotent: a second pass on the
    /// same `now` finds nothing to do.
    pub fn expiry_sweep(&self, ledger: &SeatLedger, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        for mut unit in self.units.iter_mut() {
            let expired =
                expiration_state(unit.expires_at, unit.grace_period_days, now).is_expired();
            if expired && unit.status == EntityStatus::Active {
                unit.status = EntityStatus::Inactive;
                unit.updated_at = now;
                report.units_deactivated += 1;
                report.seats_reclaimed += ledger.reclaim_expired_seats(unit.value_mut(), now);
                info!(unit_id = %unit.id, name = %unit.name, "Business unit deactivated by sweep");
            }
        }
        for mut cluster in self.clusters.iter_mut() {
            let expired =
                expiration_state(cluster.expires_at, cluster.grace_period_days, now).is_expired();
            if expired && cluster.status == EntityStatus::Active {
                cluster.status = EntityStatus::Inactive;
                cluster.updated_at = now;
                report.clusters_deactivated += 1;
                report.seats_reclaimed += ledger.reclaim_expired_seats(cluster.value_mut(), now);
                info!(cluster_id = %cluster.id, name = %cluster.name, "Cluster deactivated by sweep");
            }
        }
        report
    }

    // -- demo data -----------------------------------------------------------

    /// Seed a demo hotel group: one cluster, three units in mixed plans,
    /// a few staff seats, and a couple of module activations.
    pub fn seed_demo_group(&self, ledger: &SeatLedger) -> Uuid {
        let now = Utc::now();
        let year = chrono::Duration::days(365);

        let cluster = self.provision_cluster("Coastline Hospitality", PlanTier::Enterprise, now + year, 30);

        let plaza = self.provision_unit("Grand Plaza", PlanTier::Professional, now + year, 14);
        let seaside =
            self.provision_unit("Seaside Resort", PlanTier::Professional, now + chrono::Duration::days(25), 14);
        let inn = self.provision_unit("Harbor Inn", PlanTier::Essentials, now + year, 14);

        for unit in [&plaza, &seaside, &inn] {
            self.attach_unit(cluster.id, unit.id);
        }

        for (unit_id, staff) in [(plaza.id, 12), (seaside.id, 8), (inn.id, 3)] {
            let mut unit = self.load_unit(unit_id).expect("just provisioned");
            for _ in 0..staff {
                ledger
                    .assign_seat(&mut unit, Uuid::new_v4(), now)
                    .expect("seeding within plan ceilings");
            }
            self.save_unit(unit);
        }

        let mut cluster_rec = self.load_cluster(cluster.id).expect("just provisioned");
        for _ in 0..4 {
            ledger
                .assign_seat(&mut cluster_rec, Uuid::new_v4(), now)
                .expect("seeding within plan ceilings");
        }
        self.save_cluster(cluster_rec);

        let mut plaza_rec = self.load_unit(plaza.id).expect("just provisioned");
        activate_module(&mut plaza_rec, ModuleId::PointOfSale, now + year, None, now)
            .expect("module in plan catalog");
        activate_module(&mut plaza_rec, ModuleId::ChannelManager, now + year, None, now)
            .expect("module in plan catalog");
        self.save_unit(plaza_rec);

        let mut seaside_rec = self.load_unit(seaside.id).expect("just provisioned");
        activate_module(
            &mut seaside_rec,
            ModuleId::Inventory,
            now + chrono::Duration::days(20),
            None,
            now,
        )
        .expect("module in plan catalog");
        self.save_unit(seaside_rec);

        info!(cluster_id = %cluster.id, "Demo hotel group seeded");
        cluster.id
    }
}
