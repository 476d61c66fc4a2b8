//! hearth-sync - operator CLI for role provisioning and administrator
//! reconciliation against the PostgreSQL store.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hearth_core::{Account, AccountId, RoleType};
use hearth_db::{run_migrations, DbConfig, DbPool, PgStore, Stores};
use hearth_provisioning::{AdditionalRole, ProfileSeed, ProvisioningConfig, RoleProvisioner};

/// Role provisioning and administrator sync
#[derive(Parser)]
#[command(name = "hearth-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Apply pending migrations before running the command
    #[arg(long, env = "HEARTH_MIGRATE")]
    migrate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every administrator role and profile
    SyncAll,

    /// Reconcile one account's administrator role and profile
    SyncOne { account_id: AccountId },

    /// List administrator profiles enriched with account data
    List,

    /// Provision roles for an account
    Provision {
        account_id: AccountId,
        email: String,

        /// Primary role type (e.g. particular, property_administrator)
        #[arg(long, default_value = "particular")]
        primary: RoleType,

        /// Additional role types, repeatable
        #[arg(long = "role")]
        additional: Vec<RoleType>,

        /// Full name used when projecting role data
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Wait until an account holds the expected number of roles
    Monitor {
        account_id: AccountId,
        expected: usize,

        /// Overall budget in milliseconds
        #[arg(default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hearth_provisioning=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the command and prints its JSON result. `Ok(false)` means the
/// command completed but reported failure.
async fn run(cli: Cli) -> Result<bool, String> {
    let db_config = DbConfig::from_env().map_err(|e| format!("configuration error: {e}"))?;
    let config = ProvisioningConfig::from_env().map_err(|e| format!("configuration error: {e}"))?;

    let pool = DbPool::connect(&db_config)
        .await
        .map_err(|e| format!("database connection error: {e}"))?;

    if cli.migrate {
        run_migrations(&pool)
            .await
            .map_err(|e| format!("migration error: {e}"))?;
    }

    let rules = config
        .load_expansion_rules()
        .map_err(|e| format!("configuration error: {e}"))?;
    let stores = Stores::from_backend(Arc::new(PgStore::new(&pool)));
    let provisioner = RoleProvisioner::new(stores, config).with_expansion_rules(rules);
    let reconciler = provisioner.reconciler().clone();

    tracing::info!(
        max_insert_attempts = provisioner.config().max_insert_attempts,
        "hearth-sync starting"
    );

    let success = match cli.command {
        Commands::SyncAll => {
            let report = reconciler.sync_all().await;
            print_json(&report)?;
            report.success
        }
        Commands::SyncOne { account_id } => {
            let outcome = reconciler.sync_one(account_id).await;
            print_json(&outcome)?;
            outcome.success
        }
        Commands::List => {
            let listing = reconciler.list_synchronized().await;
            print_json(&listing)?;
            listing.success
        }
        Commands::Provision {
            account_id,
            email,
            primary,
            additional,
            full_name,
        } => {
            let account = Account::new(account_id, email);
            let mut seed = ProfileSeed::minimal(&account.email);
            if let Some(name) = full_name {
                seed.full_name = name;
            }
            let additional = additional.into_iter().map(AdditionalRole::new).collect();
            let result = provisioner
                .provision(&account, primary, additional, &seed)
                .await
                .map_err(|e| format!("provisioning rejected: {e}"))?;
            print_json(&result)?;
            result.success
        }
        Commands::Monitor {
            account_id,
            expected,
            timeout_ms,
        } => {
            let result = provisioner
                .monitor(account_id, expected, Duration::from_millis(timeout_ms))
                .await;
            print_json(&result)?;
            result.success
        }
    };

    pool.close().await;
    Ok(success)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}
