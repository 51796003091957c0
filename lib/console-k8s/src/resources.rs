//! Supporting resource lists for the dynamic form
//!
//! Backing services, TLS credentials and ingress classes are fetched
//! concurrently on page entry. Failures are isolated: a failed fetch
//! degrades its own list to empty (or the built-in fallback) and the
//! siblings still populate.

use k8s_openapi::api::core::v1::{Secret, Service};
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::warn;

use console_api::constants::TLS_SECRET_TYPE;
use console_core::options::{BackingService, PortOption};

use crate::directory;

/// The three option sources the form depends on
#[derive(Clone, Debug, Default)]
pub struct ResourceLists {
    pub services: Vec<BackingService>,
    pub tls_secrets: Vec<String>,
    pub ingress_classes: Vec<String>,
}

pub struct ResourceLister {
    client: Client,
    http: reqwest::Client,
    directory_url: Option<String>,
}

impl ResourceLister {
    pub fn new(client: Client, directory_url: Option<String>) -> Self {
        Self {
            client,
            http: reqwest::Client::new(),
            directory_url,
        }
    }

    /// Fetch all three lists concurrently with isolated failures.
    pub async fn fetch_all(&self, namespace: &str) -> ResourceLists {
        let (services, tls_secrets, ingress_classes) = tokio::join!(
            self.list_backing_services(namespace),
            self.list_tls_secrets(namespace),
            self.list_ingress_classes(),
        );

        ResourceLists {
            services: services.unwrap_or_else(|err| {
                warn!("Failed to list services in {}: {}", namespace, err);
                Vec::new()
            }),
            tls_secrets: tls_secrets.unwrap_or_else(|err| {
                warn!("Failed to list secrets in {}: {}", namespace, err);
                Vec::new()
            }),
            ingress_classes,
        }
    }

    /// Names and declared ports of the namespace's services
    pub async fn list_backing_services(
        &self,
        namespace: &str,
    ) -> anyhow::Result<Vec<BackingService>> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|service| {
                let name = service.metadata.name?;
                let ports = service
                    .spec
                    .and_then(|spec| spec.ports)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|port| PortOption {
                        port: port.port,
                        name: port.name,
                    })
                    .collect();
                Some(BackingService { name, ports })
            })
            .collect())
    }

    /// Names of the namespace's TLS-typed secrets
    pub async fn list_tls_secrets(&self, namespace: &str) -> anyhow::Result<Vec<String>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .filter(|secret| secret.type_.as_deref() == Some(TLS_SECRET_TYPE))
            .filter_map(|secret| secret.metadata.name)
            .collect())
    }

    /// Directory-sourced ingress classes, or the built-in list
    pub async fn list_ingress_classes(&self) -> Vec<String> {
        match &self.directory_url {
            Some(url) => directory::fetch_ingress_classes(&self.http, url).await,
            None => directory::builtin_classes(),
        }
    }
}
