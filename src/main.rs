use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use travel_listings::{
    features::{self, listings::tasks::cleanup_inactive_listings},
    services::{
        database::Database,
        seed,
        tasks::{TaskQueue, spawn_cleanup_schedule, spawn_workers},
    },
    utilities::{
        app_state::AppState,
        config::{Config, StorageBackend},
        telemetry,
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "travel-listings",
    about = "Travel listing marketplace API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve,
    /// Fill the configured store with sample users, listings, reviews and bookings
    Seed(SeedArgs),
    /// Run the inactive listing sweep once and exit
    Cleanup {
        /// Delete stale listings and everything attached to them
        #[arg(long)]
        purge: bool,
    },
    /// Apply pending database migrations
    Migrate,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Number of sample users besides the admin account
    #[arg(long, default_value_t = 10)]
    users: usize,
    /// Number of listings; beyond the curated samples they are generated
    #[arg(long, default_value_t = 20)]
    listings: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::init().await.context("loading configuration")?;
    telemetry::init(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed(args) => {
            let (tasks, _receiver) = TaskQueue::channel();
            let state = AppState::init(config, tasks).await?;
            let report = seed::run(&state, args.users, args.listings).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Cleanup { purge } => {
            let (tasks, _receiver) = TaskQueue::channel();
            let state = AppState::init(config, tasks).await?;
            let report = cleanup_inactive_listings(&state, purge).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Migrate => {
            if config.storage_backend != StorageBackend::Postgres {
                anyhow::bail!("migrations need STORAGE_BACKEND=postgres");
            }
            Database::new(&config).await?.migrate().await?;
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let (tasks, receiver) = TaskQueue::channel();
    let worker_count = config.worker_count;
    let cleanup_interval_hours = config.cleanup_interval_hours;
    let server_address = config.server_address.clone();

    let state = AppState::init(config, tasks.clone()).await?;
    spawn_workers(state.clone(), receiver, worker_count);
    spawn_cleanup_schedule(tasks, cleanup_interval_hours);

    let listener = TcpListener::bind(&server_address)
        .await
        .with_context(|| format!("binding {server_address}"))?;
    info!("🚀 Listening on {server_address}");

    axum::serve(listener, features::router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
