//! Kubernetes client wrapper for console operations

use kube::Client;

/// ConsoleClient wraps the Kubernetes client shared by the store and
/// resource listers
pub struct ConsoleClient {
    client: Client,
}

impl ConsoleClient {
    /// Create a client from the ambient kubeconfig/in-cluster environment
    pub async fn new() -> anyhow::Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying Kubernetes client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get a clone of the Kubernetes client
    pub fn clone_client(&self) -> Client {
        self.client.clone()
    }
}
