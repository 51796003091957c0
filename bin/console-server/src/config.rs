//! Server configuration from environment variables

use std::net::SocketAddr;

use tracing::warn;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// The console's own host address, used to derive hostname suffixes
    pub host_address: String,
    /// Base URL of the Prometheus HTTP API; metrics panels 503 without it
    pub prometheus_url: Option<String>,
    /// Optional ingress-class directory endpoint
    pub ingress_directory_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("CONSOLE_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let host_address = std::env::var("CONSOLE_HOST_ADDRESS").unwrap_or_default();
        if host_address.is_empty() {
            warn!("CONSOLE_HOST_ADDRESS not set - short hostnames will not be expanded");
        }

        Ok(Self {
            bind_addr,
            host_address,
            prometheus_url: std::env::var("CONSOLE_PROMETHEUS_URL").ok(),
            ingress_directory_url: std::env::var("CONSOLE_INGRESS_DIRECTORY_URL").ok(),
        })
    }
}
