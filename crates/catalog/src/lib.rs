//! StayOps plan catalog — feature modules, subscription plan tiers, and the
//! per-module configuration variants a business unit can carry.
//!
//! Seat ceilings (`staff_seat_max`, `cluster_user_seat_max`) initialize the
//! `allocated` side of seat pools at provisioning time.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feature modules
// ---------------------------------------------------------------------------

/// Every activatable feature module in StayOps.
/// Front desk and reservations ship with every plan; everything else is
/// gated by the plan's module catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    FrontDesk,
    Reservations,
    Housekeeping,
    PointOfSale,
    ChannelManager,
    RateManagement,
    GuestCrm,
    Accounting,
    Inventory,
    Reporting,
    Maintenance,
    Events,
}

impl ModuleId {
    /// All modules, in display order.
    pub const ALL: &'static [ModuleId] = &[
        Self::FrontDesk,
        Self::Reservations,
        Self::Housekeeping,
        Self::PointOfSale,
        Self::ChannelManager,
        Self::RateManagement,
        Self::GuestCrm,
        Self::Accounting,
        Self::Inventory,
        Self::Reporting,
        Self::Maintenance,
        Self::Events,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrontDesk => "front_desk",
            Self::Reservations => "reservations",
            Self::Housekeeping => "housekeeping",
            Self::PointOfSale => "point_of_sale",
            Self::ChannelManager => "channel_manager",
            Self::RateManagement => "rate_management",
            Self::GuestCrm => "guest_crm",
            Self::Accounting => "accounting",
            Self::Inventory => "inventory",
            Self::Reporting => "reporting",
            Self::Maintenance => "maintenance",
            Self::Events => "events",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FrontDesk => "Front desk check-in/check-out and room assignment",
            Self::Reservations => "Reservation book and availability calendar",
            Self::Housekeeping => "Housekeeping task boards and room status",
            Self::PointOfSale => "Restaurant, bar, and retail point of sale",
            Self::ChannelManager => "OTA channel distribution and sync",
            Self::RateManagement => "Rate plans, seasons, and yield rules",
            Self::GuestCrm => "Guest profiles, preferences, and history",
            Self::Accounting => "City ledger, folios, and financial exports",
            Self::Inventory => "Stock control for F&B and supplies",
            Self::Reporting => "Occupancy, ADR, and RevPAR reporting",
            Self::Maintenance => "Work orders and preventive maintenance",
            Self::Events => "Banquets, conferences, and event spaces",
        }
    }

    /// Parse from the snake_case wire name.
    pub fn parse(s: &str) -> Option<ModuleId> {
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Plan tiers
// ---------------------------------------------------------------------------

/// Subscription plan tier for a business unit or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Essentials,
    Professional,
    Enterprise,
}

impl PlanTier {
    /// Modules included in each plan's catalog.
    pub fn default_modules(&self) -> Vec<ModuleId> {
        match self {
            Self::Essentials => vec![
                ModuleId::FrontDesk,
                ModuleId::Reservations,
                ModuleId::Housekeeping,
                ModuleId::Reporting,
            ],
            Self::Professional => vec![
                ModuleId::FrontDesk,
                ModuleId::Reservations,
                ModuleId::Housekeeping,
                ModuleId::Reporting,
                ModuleId::PointOfSale,
                ModuleId::ChannelManager,
                ModuleId::RateManagement,
                ModuleId::GuestCrm,
                ModuleId::Inventory,
            ],
            Self::Enterprise => ModuleId::ALL.to_vec(),
        }
    }

    /// Whether this plan's catalog includes a module.
    pub fn includes(&self, module: ModuleId) -> bool {
        self.default_modules().contains(&module)
    }

    /// Staff seat ceiling per business unit.
    pub fn staff_seat_max(&self) -> u32 {
        match self {
            Self::Essentials => 10,
            Self::Professional => 50,
            Self::Enterprise => 250,
        }
    }

    /// Cluster-level user seat ceiling for cross-property users.
    pub fn cluster_user_seat_max(&self) -> u32 {
        match self {
            Self::Essentials => 5,
            Self::Professional => 25,
            Self::Enterprise => 100,
        }
    }

    pub fn parse(s: &str) -> Option<PlanTier> {
        match s {
            "essentials" => Some(Self::Essentials),
            "professional" => Some(Self::Professional),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Essentials => f.write_str("essentials"),
            Self::Professional => f.write_str("professional"),
            Self::Enterprise => f.write_str("enterprise"),
        }
    }
}

// ---------------------------------------------------------------------------
// Module configuration
// ---------------------------------------------------------------------------

/// Per-module configuration, a closed tagged union keyed by module.
/// The variant fixes which module the configuration belongs to, so a
/// mismatched (module, config) pair is rejected once at activation rather
/// than probed at every point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleConfig {
    Accounting {
        currency: String,
        fiscal_year_start_month: u8,
    },
    ChannelManager {
        channels: Vec<String>,
        sync_interval_minutes: u32,
    },
    PointOfSale {
        outlets: u32,
        tax_inclusive: bool,
    },
    RateManagement {
        rounding_increment_cents: u32,
    },
    GuestCrm {
        profile_retention_days: u32,
    },
}

impl ModuleConfig {
    /// The module this configuration variant is keyed to.
    pub fn module_id(&self) -> ModuleId {
        match self {
            Self::Accounting { .. } => ModuleId::Accounting,
            Self::ChannelManager { .. } => ModuleId::ChannelManager,
            Self::PointOfSale { .. } => ModuleId::PointOfSale,
            Self::RateManagement { .. } => ModuleId::RateManagement,
            Self::GuestCrm { .. } => ModuleId::GuestCrm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_modules_listed() {
        assert_eq!(ModuleId::ALL.len(), 12);
        for m in ModuleId::ALL {
            assert!(!m.as_str().is_empty());
            assert!(!m.description().is_empty());
            assert_eq!(ModuleId::parse(m.as_str()), Some(*m));
        }
    }

    #[test]
    fn test_plan_catalogs_nest() {
        let essentials = PlanTier::Essentials.default_modules();
        let professional = PlanTier::Professional.default_modules();
        for m in &essentials {
            assert!(professional.contains(m));
        }
        assert_eq!(
            PlanTier::Enterprise.default_modules().len(),
            ModuleId::ALL.len()
        );
    }

    #[test]
    fn test_plan_includes() {
        assert!(PlanTier::Essentials.includes(ModuleId::FrontDesk));
        assert!(!PlanTier::Essentials.includes(ModuleId::Events));
        assert!(PlanTier::Enterprise.includes(ModuleId::Events));
    }

    #[test]
    fn test_seat_ceilings_increase_by_tier() {
        assert!(PlanTier::Essentials.staff_seat_max() < PlanTier::Professional.staff_seat_max());
        assert!(PlanTier::Professional.staff_seat_max() < PlanTier::Enterprise.staff_seat_max());
        assert!(
            PlanTier::Essentials.cluster_user_seat_max()
                < PlanTier::Enterprise.cluster_user_seat_max()
        );
    }

    #[test]
    fn test_config_keyed_to_module() {
        let cfg = ModuleConfig::Accounting {
            currency: "EUR".into(),
            fiscal_year_start_month: 1,
        };
        assert_eq!(cfg.module_id(), ModuleId::Accounting);

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["module"], "accounting");
    }
}
