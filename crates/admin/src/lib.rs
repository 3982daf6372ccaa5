//! StayOps admin layer — the surface the dashboard pages call into.
//!
//! `ops` mediates mutations (load, apply, save), `overview` derives the
//! read-side aggregates, and `messages` maps every typed error to one
//! actionable user-visible string.

pub mod messages;
pub mod ops;
pub mod overview;

pub use ops::{AdminOps, OpError};
pub use overview::{GroupOverview, UnitRow};
