use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use delta::bloom::{Bloom, BloomServer};
use delta::config::DeltaConfig;
use delta::error::Result;
use delta::leader::LeaderServer;
use delta::shutdown::shutdown_token;
use delta::worker::{LeaderInfo, WorkerAgent};

#[derive(Parser, Debug)]
#[command(name = "delta")]
#[command(version)]
#[command(about = "A minimal cluster coordinator: ring leader, worker agents, and a bloom-filter service")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the ring-leader coordinator
    Leader(LeaderArgs),

    /// Start a worker agent that reports to a ring leader
    Worker(WorkerArgs),

    /// Start the bloom-filter membership service
    Bloom(BloomArgs),
}

#[derive(Parser, Debug)]
struct LeaderArgs {
    /// Host to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on for gRPC
    #[arg(long, default_value = "8081")]
    port: u32,

    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct WorkerArgs {
    /// Host this worker advertises
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port this worker advertises
    #[arg(long, default_value = "9001")]
    port: u32,

    /// Ring-leader host to report to
    #[arg(long, default_value = "127.0.0.1")]
    leader_host: String,

    /// Ring-leader port to report to
    #[arg(long, default_value = "8081")]
    leader_port: u32,

    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct BloomArgs {
    /// Host to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on for gRPC
    #[arg(long, default_value = "8082")]
    port: u32,

    /// Path to the TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn load_config(path: &PathBuf) -> Result<DeltaConfig> {
    let config = DeltaConfig::load(path)?;
    tracing::info!(title = ?config.title, "Applied config");
    Ok(config)
}

async fn run_leader(args: LeaderArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let shutdown = shutdown_token();

    let server = LeaderServer::new(args.host, args.port, config);
    server.run(shutdown).await
}

async fn run_worker(args: WorkerArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let shutdown = shutdown_token();

    let leader = LeaderInfo {
        host: args.leader_host,
        port: args.leader_port,
    };
    let agent = WorkerAgent::new(args.host, args.port, leader, config.worker);

    tracing::info!(worker_id = %agent.service_id(), "Starting worker agent");

    agent.register().await;

    tokio::select! {
        _ = agent.run_heartbeat_loop() => {}
        _ = shutdown.cancelled() => {
            tracing::info!("Worker agent shutting down");
        }
    }

    Ok(())
}

async fn run_bloom(args: BloomArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let shutdown = shutdown_token();

    let filter = Bloom::new(
        config.bloom.filter_size,
        config.bloom.hash_functions,
        config.bloom.entropy,
    )?;
    let server = BloomServer::new(args.host, args.port, filter);
    server.run(shutdown).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    match args.command {
        Commands::Leader(args) => run_leader(args).await,
        Commands::Worker(args) => run_worker(args).await,
        Commands::Bloom(args) => run_bloom(args).await,
    }
}
