//! Entry point: parses CLI args, loads config, installs the subscriber, and
//! hands off to the scheduler. One long-running process; no subcommands.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use validator_rank_service::config::Config;
use validator_rank_service::scheduler;

#[derive(Parser)]
#[command(name = "validator-rank-service", about = "Periodic validator ranking pipeline")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log level, passed through to `RUST_LOG` if that's unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match PgPoolOptions::new().max_connections(8).connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(%err, "failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    scheduler::run(config, pool).await;
    ExitCode::SUCCESS
}
