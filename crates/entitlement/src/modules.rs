//! Module entitlement tracker — per-unit module activation with independent
//! per-module expiry.
//!
//! The read side and the stored map are allowed to diverge: an entitlement
//! past its grace window stays in the map until an explicit deactivation or
//! sweep, but [`list_active_modules`] already stops reporting it.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use stayops_catalog::{ModuleConfig, ModuleId};

use crate::entity::{BusinessUnit, ModuleEntitlement};
use crate::expiry::expiration_state;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleError {
    #[error("module `{module}` is already active on this unit")]
    AlreadyActive { module: ModuleId },
    #[error("module `{module}` is not in the {plan} plan catalog")]
    UnknownModule {
        module: ModuleId,
        plan: stayops_catalog::PlanTier,
    },
    #[error("module `{module}` is not active on this unit")]
    NotActive { module: ModuleId },
    #[error("configuration is keyed to `{config_module}`, not `{module}`")]
    ConfigMismatch {
        module: ModuleId,
        config_module: ModuleId,
    },
}

/// Activate a module on a business unit.
///
/// Re-activating a module whose entitlement has expired (past grace) replaces
/// the old grant and resets its expiration; re-activating a live one fails
/// `AlreadyActive`.
pub fn activate_module(
    unit: &mut BusinessUnit,
    module: ModuleId,
    expires_at: DateTime<Utc>,
    config: Option<ModuleConfig>,
    now: DateTime<Utc>,
) -> Result<(), ModuleError> {
    if !unit.plan.includes(module) {
        return Err(ModuleError::UnknownModule {
            module,
            plan: unit.plan,
        });
    }
    if let Some(cfg) = &config {
        if cfg.module_id() != module {
            return Err(ModuleError::ConfigMismatch {
                module,
                config_module: cfg.module_id(),
            });
        }
    }
    if let Some(existing) = unit.module_entitlements.get(&module) {
        let state = expiration_state(existing.expires_at, unit.grace_period_days, now);
        if !state.is_expired() {
            return Err(ModuleError::AlreadyActive { module });
        }
    }

    unit.module_entitlements.insert(
        module,
        ModuleEntitlement {
            module,
            expires_at,
            activated_at: now,
            config,
        },
    );
    unit.updated_at = now;
    info!(unit_id = %unit.id, module = %module, expires_at = %expires_at, "Module activated");
    Ok(())
}

/// Remove a module entitlement, returning the destroyed grant.
pub fn deactivate_module(
    unit: &mut BusinessUnit,
    module: ModuleId,
    now: DateTime<Utc>,
) -> Result<ModuleEntitlement, ModuleError> {
    let removed = unit
        .module_entitlements
        .remove(&module)
        .ok_or(ModuleError::NotActive { module })?;
    unit.updated_at = now;
    info!(unit_id = %unit.id, module = %module, "Module deactivated");
    Ok(removed)
}

/// Modules effectively active on a unit at `now`, as a lazy, restartable
/// read-only projection over the stored entitlements.
///
/// A module stays listed through its own grace window, and through the
/// owning unit's grace window; once either has fully lapsed it drops out
/// without any mutation of the underlying map.
pub fn list_active_modules(
    unit: &BusinessUnit,
    now: DateTime<Utc>,
) -> impl Iterator<Item = ModuleId> + '_ {
    let unit_expired =
        expiration_state(unit.expires_at, unit.grace_period_days, now).is_expired();
    unit.module_entitlements
        .values()
        .filter(move |ent| {
            !unit_expired
                && !expiration_state(ent.expires_at, unit.grace_period_days, now).is_expired()
        })
        .map(|ent| ent.module)
}
