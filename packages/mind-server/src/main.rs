use anyhow::Context;
use clap::Parser;
use mind_server::{cli::Cli, config::ServerConfig, create_router, ServerState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; `log` records from mind-core are forwarded too
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mind_server=info,mind_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);

    info!("Starting MIND server v{}", VERSION);
    info!("   Bind address: {}", config.bind_address());
    info!("   Upload directory: {:?}", config.upload_directory);
    info!("   Max upload size: {} bytes", config.max_upload_size);
    info!("   CORS origins: {:?}", config.cors_origins);
    info!("   Sentinel policy: {:?}", config.engine.sentinel);

    tokio::fs::create_dir_all(&config.upload_directory)
        .await
        .with_context(|| format!("Failed to create upload directory {:?}", config.upload_directory))?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    let state = Arc::new(ServerState::new(config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
