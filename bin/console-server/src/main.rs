use std::sync::Arc;

use anyhow::Result;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::tokio::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::fmt::init as tracing_init;

use console_core::EnvContext;
use console_k8s::{ConsoleClient, PromClient, ProxyStore, ResourceLister};

mod api;
mod config;
mod metrics;

use api::AppState;
use config::ServerConfig;
use metrics::ApiMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    info!("Starting console-server...");

    let config = ServerConfig::from_env()?;

    let client = ConsoleClient::new().await?;
    info!("Kubernetes client initialized");

    let metrics = ApiMetrics::new().expect("Failed to create metrics collector");

    let state = Arc::new(AppState {
        store: ProxyStore::new(client.clone_client()),
        lister: ResourceLister::new(
            client.clone_client(),
            config.ingress_directory_url.clone(),
        ),
        prom: config.prometheus_url.clone().map(PromClient::new),
        env: EnvContext::new(config.host_address.clone()),
        metrics,
    });

    if state.prom.is_none() {
        info!("CONSOLE_PROMETHEUS_URL not set - metrics panels disabled");
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Console API listening on {}", config.bind_addr);

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| api::handle(req, state.clone()));

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("Error serving connection from {}: {}", peer_addr, e);
            }
        });
    }
}
