// ============================================================================
// gatekeeper - command-line front end for tiered access entitlements
// ============================================================================
// Usage:
//   gatekeeper status                       Show remaining days per tier
//   gatekeeper activate <TIER> --key KEY    Activate (or renew) a tier
//   gatekeeper verify <TIER> --key KEY      Enter an active tier for today
//   gatekeeper access <TIER> --key KEY      Open the gate, pick the right flow
//   gatekeeper export                       Print the persisted JSON table
// ============================================================================

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gatekeeper_core::clock::parse_date;
use gatekeeper_core::db::encode_table;
use gatekeeper_core::{
    AccessDecision, Clock, EntitlementEngine, EntitlementStore, FixedClock, GatekeeperConfig,
    RedbSlotStore, SessionController, SlotStore, SystemClock, Tier, VerificationOutcome,
};
use std::path::PathBuf;
use tracing::debug;

/// Tiered access entitlement tool
#[derive(Parser)]
#[command(name = "gatekeeper", version, about = "Activate and verify access to gated content tiers")]
struct Cli {
    /// Path to the database file (default: ~/.gatekeeper/entitlements.redb)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Slot holding the entitlement table
    #[arg(long, global = true)]
    slot: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today instead of the local clock
    #[arg(long, global = true, value_parser = parse_today)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show remaining days, last access and flags for every tier
    Status,

    /// Activate a tier with its key, resetting its balance to the full grant
    Activate {
        /// basic, triplets or premium
        #[arg(value_parser = parse_tier)]
        tier: Tier,
        #[arg(long)]
        key: String,
    },

    /// Verify a key against an active tier, charging today if not yet charged
    Verify {
        #[arg(value_parser = parse_tier)]
        tier: Tier,
        #[arg(long)]
        key: String,
    },

    /// Open the tier's gate: activates when expired, verifies otherwise
    Access {
        #[arg(value_parser = parse_tier)]
        tier: Tier,
        #[arg(long)]
        key: String,
    },

    /// Print the persisted entitlement table as JSON
    Export,
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    s.parse::<Tier>().map_err(|e| e.to_string())
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gatekeeper=info".parse()?)
                .add_directive("gatekeeper_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = GatekeeperConfig::from_env();
    if let Some(path) = cli.db_path {
        config.db_path = Some(path);
    }
    if let Some(slot) = cli.slot {
        config.slot = slot;
    }

    let db_path = config.resolve_db_path()?;
    let slots = RedbSlotStore::open(&db_path)?;
    debug!("Using slot {} in {}", config.slot, db_path.display());
    let store = EntitlementStore::with_slot(slots, &config.slot);

    match cli.today {
        Some(today) => run(cli.command, EntitlementEngine::new(store, FixedClock::new(today))),
        None => run(cli.command, EntitlementEngine::new(store, SystemClock)),
    }
}

fn run<S: SlotStore, C: Clock>(command: Commands, mut engine: EntitlementEngine<S, C>) -> Result<()> {
    match command {
        Commands::Status => cmd_status(&engine),
        Commands::Activate { tier, key } => {
            print_decision(&engine.activate(tier, &key));
            Ok(())
        }
        Commands::Verify { tier, key } => {
            print_decision(&engine.verify(tier, &key));
            Ok(())
        }
        Commands::Access { tier, key } => cmd_access(SessionController::new(engine), tier, &key),
        Commands::Export => cmd_export(&engine),
    }
}

fn cmd_status<S: SlotStore, C: Clock>(engine: &EntitlementEngine<S, C>) -> Result<()> {
    println!("=== Gatekeeper Entitlements ===");
    println!("Slot:  {}", engine.store().slot());
    println!("Today: {}", engine.clock().today());
    println!();
    println!(
        "{:<10}  {:>5}  {:<12}  {}",
        "TIER", "DAYS", "LAST ACCESS", "STATUS"
    );
    println!("{}", "-".repeat(50));

    for (tier, record) in engine.table().iter() {
        let status = if record.activation_required() {
            "activation required"
        } else if record.renewal_due() {
            "active, renew soon"
        } else {
            "active"
        };
        println!(
            "{:<10}  {:>5}  {:<12}  {}",
            tier.id(),
            record.remaining_days,
            record
                .last_access
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            status
        );
    }

    Ok(())
}

fn cmd_access<S: SlotStore, C: Clock>(
    mut controller: SessionController<S, C>,
    tier: Tier,
    key: &str,
) -> Result<()> {
    let view = controller.open_gate(tier);
    debug!("Gate for {} opened in {:?} flow", tier, view.flow);

    controller.set_candidate_key(key)?;
    let decision = controller.submit()?;
    print_decision(&decision);

    if let Some(view) = controller.view() {
        if view.renewal_due {
            println!(
                "Renewal reminder: only {} days left on {}.",
                view.remaining_days,
                tier.display_name()
            );
        }
    }

    controller.close_gate();
    Ok(())
}

fn cmd_export<S: SlotStore, C: Clock>(engine: &EntitlementEngine<S, C>) -> Result<()> {
    let document: serde_json::Value = serde_json::from_str(&encode_table(engine.table())?)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn print_decision(decision: &AccessDecision) {
    let label = match decision.outcome() {
        VerificationOutcome::Valid => "VALID",
        VerificationOutcome::Invalid => "INVALID",
        VerificationOutcome::Unknown => "UNKNOWN",
    };
    println!("[{}] {}", label, decision.message());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_access_command() {
        let cli = Cli::try_parse_from([
            "gatekeeper", "--today", "2026-02-22", "access", "premium", "--key", "9421",
        ])
        .unwrap();

        assert_eq!(cli.today, Some(parse_date("2026-02-22").unwrap()));
        match cli.command {
            Commands::Access { tier, key } => {
                assert_eq!(tier, Tier::Premium);
                assert_eq!(key, "9421");
            }
            _ => panic!("expected access command"),
        }
    }

    #[test]
    fn test_rejects_unknown_tier_and_bad_date() {
        assert!(Cli::try_parse_from(["gatekeeper", "verify", "gold", "--key", "1"]).is_err());
        assert!(Cli::try_parse_from(["gatekeeper", "--today", "22/02/2026", "status"]).is_err());
    }

    #[test]
    fn test_legacy_tier_names_accepted() {
        let cli = Cli::try_parse_from(["gatekeeper", "activate", "tripletas", "--key", "5678"]).unwrap();
        assert!(matches!(cli.command, Commands::Activate { tier: Tier::Triplets, .. }));
    }
}
