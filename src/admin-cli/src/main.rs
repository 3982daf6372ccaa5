//! StayOps Admin CLI — inspect and mutate a demo hotel group: seats,
//! module entitlements, expirations, and the group overview.
//!
//! State is in-memory and seeded fresh on every invocation; the CLI is the
//! operator-facing driver over the same library surface the dashboard uses.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use stayops_admin::messages::op_error_message;
use stayops_admin::overview::{unit_detail, unit_rows};
use stayops_admin::{AdminOps, GroupOverview, OpError};
use stayops_catalog::{ModuleId, PlanTier};
use stayops_directory::DirectoryStore;
use stayops_entitlement::expiry::parse_expiration_date;
use stayops_entitlement::{EntityStatus, SeatLedger};

#[derive(Parser)]
#[command(name = "stayops-admin")]
#[command(about = "StayOps Hotel Group Administration Tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the group overview: counts, seat utilization, expirations
    Overview,

    /// List all business units
    Units,

    /// Show one unit in detail: seats, expiration, active modules
    Unit {
        /// Business unit UUID
        unit: String,
    },

    /// List all clusters with their member units
    Clusters,

    /// List effectively-active modules for a unit
    Modules {
        /// Business unit UUID
        unit: String,
    },

    /// Provision a new business unit
    ProvisionUnit {
        /// Property name
        #[arg(short, long)]
        name: String,

        /// Plan tier: essentials, professional, enterprise
        #[arg(long, default_value = "professional")]
        plan: String,

        /// Expiration date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        expires: String,

        /// Grace period in days
        #[arg(long, default_value = "14")]
        grace_days: i64,
    },

    /// Provision a new cluster
    ProvisionCluster {
        /// Group name
        #[arg(short, long)]
        name: String,

        /// Plan tier: essentials, professional, enterprise
        #[arg(long, default_value = "enterprise")]
        plan: String,

        /// Expiration date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        expires: String,

        /// Grace period in days
        #[arg(long, default_value = "30")]
        grace_days: i64,
    },

    /// Assign a staff seat on a unit
    AssignSeat {
        /// Business unit UUID
        unit: String,

        /// User UUID (auto-generated if omitted)
        #[arg(long)]
        user: Option<String>,
    },

    /// Release a staff seat on a unit
    RemoveSeat {
        /// Business unit UUID
        unit: String,

        /// User UUID
        user: String,
    },

    /// Activate a module on a unit
    ActivateModule {
        /// Business unit UUID
        unit: String,

        /// Module name (snake_case, see `stayops-admin list-catalog`)
        module: String,

        /// Module expiration date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        expires: String,
    },

    /// Deactivate a module on a unit
    DeactivateModule {
        /// Business unit UUID
        unit: String,

        /// Module name
        module: String,
    },

    /// List every module in the catalog with its description
    ListCatalog,

    /// Show entities approaching or past expiration
    Expiring,

    /// Run the expiry sweep, deactivating entities past grace
    Sweep {
        /// Evaluate as of this date instead of now (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stayops=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let store = DirectoryStore::new();
    let ledger = SeatLedger::new();
    store.seed_demo_group(&ledger);
    let ops = AdminOps::new(&store, &ledger);
    let now = Utc::now();

    match cli.command {
        Commands::Overview => {
            let overview = GroupOverview::build(&store, now);
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }

        Commands::Units => {
            for row in unit_rows(&store, now) {
                println!(
                    "{}  {:<24} {:<12} {:>3}/{:<3} seats  {}",
                    row.unit_id,
                    row.name,
                    row.plan.to_string(),
                    row.staff_seats.consumed,
                    row.staff_seats.allocated,
                    row.expiration
                );
            }
        }

        Commands::Unit { unit } => {
            let unit_id = parse_uuid(&unit)?;
            match unit_detail(&store, unit_id, now) {
                Some(row) => {
                    println!("{}  {} ({})", row.unit_id, row.name, row.plan);
                    println!(
                        "  status:     {}",
                        match row.status {
                            EntityStatus::Active => "active",
                            EntityStatus::Inactive => "inactive",
                        }
                    );
                    println!(
                        "  seats:      {}/{} consumed, {} free",
                        row.staff_seats.consumed, row.staff_seats.allocated, row.staff_seats_free
                    );
                    println!("  expiration: {}", row.expiration);
                    for m in row.active_modules {
                        println!("  module:     {m}  — {}", m.description());
                    }
                }
                None => println!("{}", op_error_message(&OpError::UnitNotFound(unit_id))),
            }
        }

        Commands::Clusters => {
            for cluster in store.list_clusters() {
                println!(
                    "{}  {:<24} {:>3}/{:<3} users",
                    cluster.id,
                    cluster.name,
                    cluster.cluster_user_seats.consumed,
                    cluster.cluster_user_seats.allocated,
                );
                for unit in store.units_in(cluster.id) {
                    println!("    └─ {}  {}", unit.id, unit.name);
                }
            }
        }

        Commands::Modules { unit } => {
            let unit_id = parse_uuid(&unit)?;
            match ops.active_modules(unit_id, now) {
                Ok(modules) => {
                    for m in modules {
                        println!("{m}  — {}", m.description());
                    }
                }
                Err(e) => println!("{}", op_error_message(&e)),
            }
        }

        Commands::ProvisionUnit {
            name,
            plan,
            expires,
            grace_days,
        } => {
            let unit = store.provision_unit(name, parse_plan(&plan)?, parse_date(&expires)?, grace_days);
            println!(
                "Provisioned unit {} ({}) with {} staff seats",
                unit.id, unit.name, unit.staff_seats.allocated
            );
        }

        Commands::ProvisionCluster {
            name,
            plan,
            expires,
            grace_days,
        } => {
            let cluster =
                store.provision_cluster(name, parse_plan(&plan)?, parse_date(&expires)?, grace_days);
            println!(
                "Provisioned cluster {} ({}) with {} user seats",
                cluster.id, cluster.name, cluster.cluster_user_seats.allocated
            );
        }

        Commands::AssignSeat { unit, user } => {
            let unit_id = parse_uuid(&unit)?;
            let user_id = match user {
                Some(u) => parse_uuid(&u)?,
                None => Uuid::new_v4(),
            };
            match ops.add_staff(unit_id, user_id, now) {
                Ok(assignment) => println!("Seat assigned: user {}", assignment.user_id),
                Err(e) => println!("{}", op_error_message(&e)),
            }
        }

        Commands::RemoveSeat { unit, user } => {
            let unit_id = parse_uuid(&unit)?;
            let user_id = parse_uuid(&user)?;
            match ops.remove_staff(unit_id, user_id, now) {
                Ok(()) => println!("Seat released: user {user_id}"),
                Err(e) => println!("{}", op_error_message(&e)),
            }
        }

        Commands::ActivateModule {
            unit,
            module,
            expires,
        } => {
            let unit_id = parse_uuid(&unit)?;
            let module = parse_module(&module)?;
            match ops.activate_module(unit_id, module, parse_date(&expires)?, None, now) {
                Ok(()) => println!("Module {module} activated"),
                Err(e) => println!("{}", op_error_message(&e)),
            }
        }

        Commands::DeactivateModule { unit, module } => {
            let unit_id = parse_uuid(&unit)?;
            let module = parse_module(&module)?;
            match ops.deactivate_module(unit_id, module, now) {
                Ok(()) => println!("Module {module} deactivated"),
                Err(e) => println!("{}", op_error_message(&e)),
            }
        }

        Commands::ListCatalog => {
            for m in ModuleId::ALL {
                println!("{:<18} {}", m.as_str(), m.description());
            }
        }

        Commands::Expiring => {
            let overview = GroupOverview::build(&store, now);
            if overview.expiring.is_empty() {
                println!("Nothing within the notification window");
            }
            for row in &overview.expiring {
                println!(
                    "{:<14} {:<24} {:>5}d  {}",
                    row.kind, row.name, row.days_remaining, row.state
                );
            }
        }

        Commands::Sweep { as_of } => {
            let when = match as_of {
                Some(s) => parse_date(&s)?,
                None => now,
            };
            let report = ops.run_expiry_sweep(when);
            println!(
                "Sweep complete: {} units and {} clusters deactivated, {} seats reclaimed",
                report.units_deactivated, report.clusters_deactivated, report.seats_reclaimed
            );
        }
    }

    Ok(())
}

fn parse_uuid(s: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(s).with_context(|| format!("invalid UUID: {s}"))
}

fn parse_plan(s: &str) -> anyhow::Result<PlanTier> {
    PlanTier::parse(s).ok_or_else(|| anyhow!("unknown plan tier: {s}"))
}

fn parse_module(s: &str) -> anyhow::Result<ModuleId> {
    ModuleId::parse(s).ok_or_else(|| anyhow!("unknown module: {s}"))
}

fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(parse_expiration_date(s)?)
}
