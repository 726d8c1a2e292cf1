//! Summarize Binary - compute and persist one emission summary
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin summarize -- <client_id> <period>
//! cargo run --release --bin summarize -- <client_id> <period> --validate
//! cargo run --release --bin summarize -- <client_id> <period> --distribute <scope_identifier>
//! ```
//!
//! Period forms: `2026` (yearly), `2026-03` (monthly), `2026-W11` (weekly),
//! `2026-03-14` (daily).
//!
//! ## Environment Variables
//!
//! - CARBONFLOW_DB_PATH - SQLite database path (default: data/carbonflow.db)
//! - CARBONFLOW_ACTOR - Actor id recorded on summaries (default: cli)
//! - RUST_LOG - Logging level (optional, default: info)

use carbonflow::aggregation_core::{
    auto_distribute, validate_allocations, AggregationEngine, IndexOptions, ReportingPeriod,
};
use carbonflow::config::Config;
use carbonflow::storage::{HierarchyStore, SqliteStore, SummaryStore};
use std::env;
use std::sync::Arc;

struct CliArgs {
    client_id: String,
    period: ReportingPeriod,
    validate: bool,
    distribute: Option<String>,
}

impl CliArgs {
    fn parse() -> Result<Self, Box<dyn std::error::Error>> {
        let args: Vec<String> = env::args().collect();
        if args.len() < 3 {
            return Err(
                "usage: summarize <client_id> <period> [--validate] [--distribute <scope_identifier>]"
                    .into(),
            );
        }

        let distribute = args
            .iter()
            .position(|a| a == "--distribute")
            .map(|idx| {
                args.get(idx + 1)
                    .cloned()
                    .ok_or("--distribute requires a scope identifier")
            })
            .transpose()?;

        Ok(Self {
            client_id: args[1].clone(),
            period: ReportingPeriod::parse(&args[2])?,
            validate: args.contains(&"--validate".to_string()),
            distribute,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env();
    let cli = CliArgs::parse()?;

    log::info!("🌱 carbonflow summarize");
    log::info!("   Client: {}", cli.client_id);
    log::info!("   Period: {}", cli.period.storage_key());
    log::info!("   Database: {}", config.db_path);

    let store = Arc::new(SqliteStore::open(&config.db_path)?);

    if let Some(scope_identifier) = &cli.distribute {
        let mut hierarchy = store
            .active_hierarchy(&cli.client_id)
            .await?
            .ok_or("client has no active hierarchy")?;

        let outcome = auto_distribute(&mut hierarchy, scope_identifier);
        if outcome.distributed {
            store.put_hierarchy(&cli.client_id, &hierarchy)?;
            log::info!("   Distributed '{}' and saved hierarchy", scope_identifier);
        } else {
            log::warn!(
                "   '{}' is not shared by multiple active assignments; nothing to do",
                scope_identifier
            );
        }
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if cli.validate {
        let hierarchy = store
            .active_hierarchy(&cli.client_id)
            .await?
            .ok_or("client has no active hierarchy")?;

        let validation = validate_allocations(&hierarchy, IndexOptions::default());
        println!("{}", serde_json::to_string_pretty(&validation)?);

        if !validation.is_valid {
            log::error!(
                "   {} allocation error(s), {} warning(s)",
                validation.errors.len(),
                validation.warnings.len()
            );
            std::process::exit(1);
        }
        log::info!("   Allocations are balanced");
        return Ok(());
    }

    let engine = AggregationEngine::new(store.clone(), store.clone());
    let summary = engine
        .compute_summary(&cli.client_id, &cli.period, &config.actor_id)
        .await;

    store.upsert_summary(&summary).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.metadata.has_errors {
        std::process::exit(1);
    }
    Ok(())
}
