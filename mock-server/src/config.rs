//! Mock server runtime settings.

use clap::Parser;

/// Command line and environment configuration for the mock promotion API.
#[derive(Debug, Parser)]
#[command(name = "mock-server", about = "In-memory marketplace promotion API")]
pub struct MockServerConfig {
    /// Address to bind
    #[arg(short = 'H', long, env = "MOCK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Require `authorization: Bearer <key>` on every request
    #[arg(long, env = "MOCK_API_KEY")]
    pub api_key: Option<String>,
}

impl MockServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
