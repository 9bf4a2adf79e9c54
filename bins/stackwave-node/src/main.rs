//! StackWave Node
//!
//! Runs the governance API (`serve`), prints the route contract
//! (`contract`), or drives a running server through the typed client
//! (`demo`).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use stackwave_client::GovernanceClient;
use stackwave_server::{db, seed, AppState, MemoryStorage, PgStorage, ServerConfig, Storage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// ==================== CLI ====================

#[derive(Parser, Debug)]
#[command(name = "stackwave-node")]
#[command(about = "StackWave governance server and demo client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print the route contract as JSON
    Contract,
    /// Walk a running server through sign-in, proposals, votes and staking
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    addr: String,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// PostgreSQL connection string; in-memory storage when absent
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Connection pool size
    #[arg(long, default_value = "5")]
    max_connections: u32,

    /// Session lifetime in seconds
    #[arg(long, default_value = "86400")]
    session_max_age_secs: u64,

    /// Skip inserting demo proposals into an empty store
    #[arg(long)]
    no_seed: bool,

    /// Create tables before serving
    #[arg(long)]
    init_schema: bool,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Server base URL
    #[arg(long, env = "STACKWAVE_SERVER_URL", default_value = "http://127.0.0.1:5000")]
    server: String,
}

// ==================== Main ====================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stackwave_node=debug,stackwave_server=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::Contract => print_contract(),
        Command::Demo(args) => run_demo(args).await,
    }
}

async fn open_storage(args: &ServeArgs) -> Result<Arc<dyn Storage>> {
    let Some(url) = args.database_url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
        return Ok(Arc::new(MemoryStorage::new()));
    };

    let pool = db::connect(url, args.max_connections)
        .await
        .context("Failed to connect to database")?;
    if args.init_schema {
        db::init_schema(&pool)
            .await
            .context("Failed to initialize schema")?;
    }
    Ok(Arc::new(PgStorage::new(pool)))
}

async fn run_server(args: ServeArgs) -> Result<()> {
    info!("Starting StackWave governance server");

    let storage = open_storage(&args).await?;
    let config = ServerConfig {
        session_max_age: Duration::from_secs(args.session_max_age_secs),
        seed_on_start: !args.no_seed,
        ..ServerConfig::default()
    };

    if config.seed_on_start {
        seed::spawn_seed(storage.clone());
    }

    let state = Arc::new(AppState::new(storage, config));
    let addr: SocketAddr = format!("{}:{}", args.addr, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.addr, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    stackwave_server::serve_with_shutdown(listener, state, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down...");
        }
    })
    .await?;

    info!("Stopped.");
    Ok(())
}

fn print_contract() -> Result<()> {
    let doc = stackwave_contract::contract_document()?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

// ==================== Demo ====================

async fn run_demo(args: DemoArgs) -> Result<()> {
    let client = GovernanceClient::new(&args.server)?;
    info!("Server: {}", client.base_url());

    let nonce = client.nonce().await?;
    info!("Nonce: {}", nonce);

    let user = client.login_with_mock_wallet().await?;
    info!("Signed in as user {} ({})", user.id, user.wallet_address);

    let proposals = client.proposals().await?;
    info!("{} proposals on record", proposals.len());
    for proposal in &proposals {
        info!("  #{} [{}] {}", proposal.id, proposal.status, proposal.title);
    }

    let proposal = client
        .create_proposal(
            "SIP-03: Demo Treasury Report",
            "Publish a quarterly treasury report for all token holders.",
        )
        .await?;
    info!("Created proposal #{}", proposal.id);

    client.cast_vote(proposal.id, true, "100").await?;
    client.cast_vote(proposal.id, false, "25.5").await?;
    let tally = client.vote_tally(proposal.id).await?;
    info!(
        "Proposal #{}: {} for, {} against ({} votes)",
        proposal.id, tally.votes_for, tally.votes_against, tally.count
    );

    client.stake("100").await?;
    client.stake("250").await?;
    if let Some(status) = client.staking().await? {
        info!(
            "Total staked: {} across {} stakes",
            status.total_staked,
            status.stakes.len()
        );
    }

    let analytics = client.analytics().await?;
    info!(
        "Analytics: risk {} / cluster {} / engagement {} / velocity {}",
        analytics.risk_score,
        analytics.wallet_cluster,
        analytics.governance_engagement,
        analytics.token_velocity
    );

    client.logout().await?;
    info!("Signed out; me = {:?}", client.me().await?);
    Ok(())
}
