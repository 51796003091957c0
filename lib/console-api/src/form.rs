//! Form-editable representation of an HTTPProxy
//!
//! The console form owns this model exclusively; the core transforms map it
//! to and from the manifest shape in `v1`. Field names follow the JSON the
//! console frontend exchanges with the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_IDLE_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_ROUTE_PREFIX};

/// TLS handling mode for a secured proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    Edge,
    Passthrough,
    ReEncrypt,
}

/// Weighted reference to a backing service, as edited in the form.
///
/// `port` stays a string here: it is a dropdown value dependent on the
/// selected service and only parses to an integer at compile time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub name: String,

    #[serde(default)]
    pub port: String,

    #[serde(default = "default_weight")]
    pub weight: i64,

    /// Gates `ca_secret` and `subject_name`; both are required when set
    #[serde(default)]
    pub validation: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
}

impl Default for ServiceEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            port: String::new(),
            weight: default_weight(),
            validation: false,
            ca_secret: None,
            subject_name: None,
        }
    }
}

/// A single route as edited in the form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    #[serde(default = "default_prefix")]
    pub prefix: String,

    pub services: Vec<ServiceEntry>,

    #[serde(default)]
    pub websocket: bool,

    #[serde(default)]
    pub permit_insecure: bool,

    /// Idle timeout in bare seconds ("15"); gains an "s" suffix on the wire
    #[serde(default = "default_idle_timeout")]
    pub idle_connection: String,

    /// Response timeout in bare seconds ("5")
    #[serde(default = "default_response_timeout")]
    pub response_timeout: String,
}

impl Default for RouteEntry {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            services: vec![ServiceEntry::default()],
            websocket: false,
            permit_insecure: false,
            idle_connection: default_idle_timeout(),
            response_timeout: default_response_timeout(),
        }
    }
}

/// Optional TLS/security block of the form
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default)]
    pub secure_route: bool,

    /// Required when `secure_route` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,

    /// Serving credential; required unless termination is passthrough
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<String>,

    #[serde(default)]
    pub permit_insecure: bool,
}

/// The UI-facing representation of an HTTPProxy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormModel {
    /// Resource name; immutable once created
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub ingress_class_name: String,

    /// User-visible hostname; may be a short label pending suffix expansion
    #[serde(default)]
    pub fqdn: String,

    /// Ordered; the first route's first service is treated as primary in
    /// list/detail display
    pub routes: Vec<RouteEntry>,

    #[serde(default)]
    pub conditional: SecuritySettings,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Optimistic-concurrency token, opaque, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl FormModel {
    /// Fresh form for the create flow: one route with one service, no TLS
    pub fn new(namespace: &str) -> Self {
        Self {
            name: String::new(),
            namespace: namespace.to_string(),
            ingress_class_name: String::new(),
            fqdn: String::new(),
            routes: vec![RouteEntry::default()],
            conditional: SecuritySettings::default(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            resource_version: None,
        }
    }
}

fn default_weight() -> i64 {
    100
}

fn default_prefix() -> String {
    DEFAULT_ROUTE_PREFIX.to_string()
}

fn default_idle_timeout() -> String {
    DEFAULT_IDLE_TIMEOUT.to_string()
}

fn default_response_timeout() -> String {
    DEFAULT_RESPONSE_TIMEOUT.to_string()
}
