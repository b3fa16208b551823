use clap::Parser;
use mock_server::config::MockServerConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MockServerConfig::parse();
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, auth = config.api_key.is_some(), "mock promotion API listening");
    mock_server::run(listener, config.api_key).await
}
