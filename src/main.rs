use registration_gateway::{GatewayConfig, GatewayServer};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    let server = GatewayServer::new(config).await?;
    info!("Example app listening on port {}", server.port());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}
