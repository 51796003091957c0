//! Dependent field options for the dynamic form
//!
//! Recomputes the valid choices for service names, ports, credentials and
//! ingress classes whenever the fetched resource lists or the current
//! selection change. Purely derived: no state beyond the returned lists, and
//! the only form mutation offered is pruning a port whose referent vanished.

use serde::{Deserialize, Serialize};
use tracing::debug;

use console_api::constants::{BUILTIN_INGRESS_CLASSES, DEFAULT_CREDENTIAL};
use console_api::FormModel;

/// A selectable port of a backing service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortOption {
    pub port: i32,
    /// Symbolic port name, when the service declares one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A backing service as seen by the form: its name and declared ports
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackingService {
    pub name: String,
    pub ports: Vec<PortOption>,
}

/// The option lists the form renders for its dependent fields
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    pub service_names: Vec<String>,
    /// Ports of the currently selected service; empty until one is selected
    pub ports: Vec<PortOption>,
    pub credentials: Vec<String>,
    pub ingress_classes: Vec<String>,
}

/// Recompute all dependent option lists.
///
/// `ingress_classes` is the directory-sourced list; when empty the built-in
/// classes are offered. The well-known default credential is always
/// appended after the namespace's own TLS secrets.
pub fn recompute(
    services: &[BackingService],
    tls_secrets: &[String],
    ingress_classes: &[String],
    selected_service: Option<&str>,
) -> FieldOptions {
    let service_names = services.iter().map(|service| service.name.clone()).collect();

    let ports = selected_service
        .and_then(|name| services.iter().find(|service| service.name == name))
        .map(|service| service.ports.clone())
        .unwrap_or_default();

    let mut credentials: Vec<String> = tls_secrets.to_vec();
    credentials.push(DEFAULT_CREDENTIAL.to_string());

    let ingress_classes = if ingress_classes.is_empty() {
        BUILTIN_INGRESS_CLASSES.iter().map(|class| class.to_string()).collect()
    } else {
        ingress_classes.to_vec()
    };

    FieldOptions {
        service_names,
        ports,
        credentials,
        ingress_classes,
    }
}

/// Clear every selected port that is no longer declared by its service.
///
/// Ports are only pruned when the backing service is known; a service that
/// is missing from the list entirely may just not have been fetched yet.
/// Returns true when anything was cleared.
pub fn prune_stale_ports(form: &mut FormModel, services: &[BackingService]) -> bool {
    let mut changed = false;
    for route in &mut form.routes {
        for entry in &mut route.services {
            if entry.name.is_empty() || entry.port.is_empty() {
                continue;
            }
            let Some(backing) = services.iter().find(|service| service.name == entry.name) else {
                continue;
            };
            let valid = backing
                .ports
                .iter()
                .any(|option| option.port.to_string() == entry.port);
            if !valid {
                debug!("Clearing stale port {} for service {}", entry.port, entry.name);
                entry.port.clear();
                changed = true;
            }
        }
    }
    changed
}
