use clap::Parser;
use covey::prelude::*;

#[tokio::main]
async fn main() -> Result<(), CoveyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::parse();
    let server = CoveyServerBuilder::new()
        .bind(&config.bind)
        .town_config(config.town_config())
        .build(LocalVideoTokens)
        .await?;
    tracing::info!(addr = %server.local_addr()?, demo_town = ?config.demo_town_id, "covey-server listening");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
