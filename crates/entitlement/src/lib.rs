//! StayOps entitlement accounting — seat ledgers, module entitlements, and
//! expiration evaluation for hotel groups (clusters) and properties
//! (business units).
//!
//! The crate is the single mutation path for seat counters: `consumed` on any
//! pool only ever changes through [`seats::SeatLedger::assign_seat`],
//! [`seats::SeatLedger::remove_seat`], or
//! [`seats::SeatLedger::reclaim_expired_seats`], which is what keeps the
//! `consumed <= allocated` invariant checkable in one place.

pub mod entity;
pub mod expiry;
pub mod modules;
pub mod seats;

pub use entity::{BusinessUnit, Cluster, EntityStatus, SeatKind, SeatPool, SeatScoped};
pub use expiry::{
    days_remaining, expiration_state, utilization_alert, EvalError, ExpirationState,
    UtilizationAlert,
};
pub use modules::{activate_module, deactivate_module, list_active_modules, ModuleError};
pub use seats::{AssignmentState, SeatAssignment, SeatError, SeatLedger};
