//! keygrid server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use keygrid_server::registry::{HttpGatewayFactory, InstanceRegistry};
use keygrid_server::routes;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Panel query engine over a hierarchical key-value store", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000", env = "KEYGRID_LISTEN")]
    listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "KEYGRID_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence when set; otherwise use the CLI level.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env()?
    } else {
        EnvFilter::new(&cli.log_level)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let registry = Arc::new(InstanceRegistry::new(Arc::new(HttpGatewayFactory)));
    let app = routes::router(registry);

    tracing::info!("listening on {}", cli.listen);
    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
