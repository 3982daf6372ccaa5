//! Mutation entry points for the admin surface. Each operation loads the
//! record through the directory store, applies the entitlement operation,
//! and saves the record back.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use stayops_catalog::{ModuleConfig, ModuleId};
use stayops_directory::{DirectoryStore, SweepReport};
use stayops_entitlement::{
    activate_module, deactivate_module, list_active_modules, EntityStatus, EvalError, ModuleError,
    SeatAssignment, SeatError, SeatLedger,
};

/// Errors surfaced to the presentation layer. Business-rule violations from
/// the entitlement crate pass through unchanged; this layer only adds
/// record-lookup and allocation-edit failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpError {
    #[error("business unit not found: {0}")]
    UnitNotFound(Uuid),
    #[error("cluster not found: {0}")]
    ClusterNotFound(Uuid),
    #[error("allocation {requested} is below the {consumed} seats currently consumed")]
    AllocationBelowConsumed { requested: u32, consumed: u32 },
    #[error(transparent)]
    Seat(#[from] SeatError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Admin operations composing the directory store and the seat ledger.
pub struct AdminOps<'a> {
    store: &'a DirectoryStore,
    ledger: &'a SeatLedger,
}

impl<'a> AdminOps<'a> {
    pub fn new(store: &'a DirectoryStore, ledger: &'a SeatLedger) -> Self {
        Self { store, ledger }
    }

    // -- staff seats ---------------------------------------------------------

    pub fn add_staff(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SeatAssignment, OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        let assignment = self.ledger.assign_seat(&mut unit, user_id, now)?;
        self.store.save_unit(unit);
        Ok(assignment)
    }

    pub fn remove_staff(
        &self,
        unit_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        self.ledger.remove_seat(&mut unit, user_id, now)?;
        self.store.save_unit(unit);
        Ok(())
    }

    // -- cluster user seats --------------------------------------------------

    pub fn add_cluster_user(
        &self,
        cluster_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SeatAssignment, OpError> {
        let mut cluster = self
            .store
            .load_cluster(cluster_id)
            .ok_or(OpError::ClusterNotFound(cluster_id))?;
        let assignment = self.ledger.assign_seat(&mut cluster, user_id, now)?;
        self.store.save_cluster(cluster);
        Ok(assignment)
    }

    pub fn remove_cluster_user(
        &self,
        cluster_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), OpError> {
        let mut cluster = self
            .store
            .load_cluster(cluster_id)
            .ok_or(OpError::ClusterNotFound(cluster_id))?;
        self.ledger.remove_seat(&mut cluster, user_id, now)?;
        self.store.save_cluster(cluster);
        Ok(())
    }

    // -- modules -------------------------------------------------------------

    pub fn activate_module(
        &self,
        unit_id: Uuid,
        module: ModuleId,
        expires_at: DateTime<Utc>,
        config: Option<ModuleConfig>,
        now: DateTime<Utc>,
    ) -> Result<(), OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        activate_module(&mut unit, module, expires_at, config, now)?;
        self.store.save_unit(unit);
        Ok(())
    }

    pub fn deactivate_module(
        &self,
        unit_id: Uuid,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<(), OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        deactivate_module(&mut unit, module, now)?;
        self.store.save_unit(unit);
        Ok(())
    }

    /// Effectively-active modules for a unit at `now`.
    pub fn active_modules(&self, unit_id: Uuid, now: DateTime<Utc>) -> Result<Vec<ModuleId>, OpError> {
        let unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        Ok(list_active_modules(&unit, now).collect())
    }

    // -- limits & expiration -------------------------------------------------

    /// Edit a unit's staff allocation. Shrinking below the seats currently
    /// consumed is rejected; free seats up first.
    pub fn set_staff_allocation(&self, unit_id: Uuid, allocated: u32) -> Result<(), OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        if allocated < unit.staff_seats.consumed {
            return Err(OpError::AllocationBelowConsumed {
                requested: allocated,
                consumed: unit.staff_seats.consumed,
            });
        }
        unit.staff_seats.allocated = allocated;
        unit.updated_at = Utc::now();
        info!(unit_id = %unit_id, allocated, "Staff allocation updated");
        self.store.save_unit(unit);
        Ok(())
    }

    /// Renew a unit's subscription. A renewal into the future reactivates a
    /// unit the sweep had already deactivated.
    pub fn extend_unit_expiration(
        &self,
        unit_id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), OpError> {
        let mut unit = self
            .store
            .load_unit(unit_id)
            .ok_or(OpError::UnitNotFound(unit_id))?;
        unit.expires_at = expires_at;
        if unit.status == EntityStatus::Inactive && expires_at > now {
            unit.status = EntityStatus::Active;
        }
        unit.updated_at = now;
        info!(unit_id = %unit_id, expires_at = %expires_at, "Unit expiration extended");
        self.store.save_unit(unit);
        Ok(())
    }

    /// Run the expiry sweep across the whole directory.
    pub fn run_expiry_sweep(&self, now: DateTime<Utc>) -> SweepReport {
        self.store.expiry_sweep(self.ledger, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stayops_catalog::PlanTier;

    fn setup() -> (DirectoryStore, SeatLedger) {
        (DirectoryStore::new(), SeatLedger::new())
    }

    #[test]
    fn test_add_and_remove_staff_persist() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let now = Utc::now();
        let unit = store.provision_unit("Hotel", PlanTier::Essentials, now + Duration::days(365), 14);
        let user = Uuid::new_v4();

        ops.add_staff(unit.id, user, now).unwrap();
        assert_eq!(store.load_unit(unit.id).unwrap().staff_seats.consumed, 1);

        ops.remove_staff(unit.id, user, now).unwrap();
        assert_eq!(store.load_unit(unit.id).unwrap().staff_seats.consumed, 0);
    }

    #[test]
    fn test_unknown_unit_is_reported() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let missing = Uuid::new_v4();
        assert_eq!(
            ops.add_staff(missing, Uuid::new_v4(), Utc::now()).unwrap_err(),
            OpError::UnitNotFound(missing)
        );
    }

    #[test]
    fn test_seat_errors_pass_through() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let now = Utc::now();
        let unit = store.provision_unit("Hotel", PlanTier::Essentials, now + Duration::days(365), 14);
        let user = Uuid::new_v4();

        ops.add_staff(unit.id, user, now).unwrap();
        let err = ops.add_staff(unit.id, user, now).unwrap_err();
        assert_eq!(err, OpError::Seat(SeatError::DuplicateAssignment { user_id: user }));
    }

    #[test]
    fn test_allocation_cannot_undershoot_consumed() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let now = Utc::now();
        let unit = store.provision_unit("Hotel", PlanTier::Essentials, now + Duration::days(365), 14);

        for _ in 0..5 {
            ops.add_staff(unit.id, Uuid::new_v4(), now).unwrap();
        }
        assert_eq!(
            ops.set_staff_allocation(unit.id, 4).unwrap_err(),
            OpError::AllocationBelowConsumed {
                requested: 4,
                consumed: 5
            }
        );
        ops.set_staff_allocation(unit.id, 5).unwrap();
        assert_eq!(store.load_unit(unit.id).unwrap().staff_seats.allocated, 5);
    }

    #[test]
    fn test_module_lifecycle_through_ops() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let now = Utc::now();
        let unit =
            store.provision_unit("Hotel", PlanTier::Professional, now + Duration::days(365), 14);

        ops.activate_module(unit.id, ModuleId::Inventory, now + Duration::days(90), None, now)
            .unwrap();
        assert_eq!(
            ops.active_modules(unit.id, now).unwrap(),
            vec![ModuleId::Inventory]
        );
        ops.deactivate_module(unit.id, ModuleId::Inventory, now).unwrap();
        assert!(ops.active_modules(unit.id, now).unwrap().is_empty());
    }

    #[test]
    fn test_renewal_reactivates_swept_unit() {
        let (store, ledger) = setup();
        let ops = AdminOps::new(&store, &ledger);
        let now = Utc::now();
        let unit = store.provision_unit("Hotel", PlanTier::Essentials, now + Duration::days(1), 0);

        let later = now + Duration::days(3);
        let report = ops.run_expiry_sweep(later);
        assert_eq!(report.units_deactivated, 1);
        assert_eq!(
            store.load_unit(unit.id).unwrap().status,
            EntityStatus::Inactive
        );

        ops.extend_unit_expiration(unit.id, later + Duration::days(365), later)
            .unwrap();
        let renewed = store.load_unit(unit.id).unwrap();
        assert_eq!(renewed.status, EntityStatus::Active);

        // Seats can be assigned again after renewal.
        ops.add_staff(unit.id, Uuid::new_v4(), later).unwrap();
    }
}
