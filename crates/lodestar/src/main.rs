use clap::Parser;
use lodestar_gateway::{AppState, Config, GatewayServer, DEFAULT_CHUNK_LIMIT};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "lodestar", about = "Lodestar list-watch streaming gateway")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: String,

    /// Base URL of the upstream collection API
    #[arg(long, env = "LODESTAR_UPSTREAM", default_value = "http://127.0.0.1:8001")]
    upstream: String,

    /// Page-size limit for snapshot pagination
    #[arg(long, default_value_t = DEFAULT_CHUNK_LIMIT)]
    chunk_limit: u32,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        "Starting lodestar gateway against upstream {}",
        cli.upstream
    );

    let state = Arc::new(AppState::from_upstream(&cli.upstream, cli.chunk_limit));

    let config = Config {
        listen_addr: cli
            .bind
            .parse()
            .map_err(|e| miette::miette!("Invalid bind address '{}': {}", cli.bind, e))?,
    };

    let server = GatewayServer::new(config, state);
    server
        .run()
        .await
        .map_err(|e| miette::miette!("Gateway error: {}", e))?;

    Ok(())
}
