use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HTTPProxy is the Contour ingress resource managed by the console.
///
/// Only the fields the console form edits are modeled as typed fields. Every
/// block that can legally carry additional manifest content keeps it in a
/// flattened `extra` map so hand-written manifests survive a form round trip.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projectcontour.io",
    version = "v1",
    kind = "HTTPProxy",
    plural = "httpproxies",
    namespaced,
    derive = "Default",
    status = "HTTPProxyStatus",
    printcolumn = r#"{"name":"FQDN","type":"string","jsonPath":".spec.virtualhost.fqdn"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.currentStatus"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct HTTPProxySpec {
    /// Routing tier the proxy is assigned to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,

    /// Virtual host (fqdn + TLS) served by this proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtualhost: Option<VirtualHost>,

    /// HTTP routes; absent when the proxy runs in TLS passthrough mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<ProxyRoute>>,

    /// TCP proxying block; present only in TLS passthrough mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcpproxy: Option<TcpProxy>,

    /// Spec fields the form does not model (e.g. httpVersions, includes)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Virtual host block of an HTTPProxy
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    pub fqdn: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// TLS settings of a virtual host
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// Serving certificate reference; absent in passthrough mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// TLS connections are forwarded unterminated to the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_fallback_certificate: Option<bool>,

    /// TLS fields the form does not model (e.g. minimumProtocolVersion)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single routing rule
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRoute {
    /// Match conditions; the console edits the prefix of the first one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<MatchCondition>>,

    /// Weighted upstream services for this route
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ProxyService>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_websockets: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_policy: Option<TimeoutPolicy>,

    /// Route fields the form does not model (e.g. loadBalancerPolicy);
    /// preserved across edits for routes matched by prefix
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Route match condition
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Weighted reference to a backing Service
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyService {
    pub name: String,

    pub port: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,

    /// Set to "tls" when the route re-encrypts traffic to the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Upstream certificate validation; absent means no validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<UpstreamValidation>,
}

/// CA secret and subject name used to validate the backing service
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamValidation {
    pub ca_secret: String,
    pub subject_name: String,
}

/// Idle/response timeouts, serialized as duration strings ("15s")
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// TCP proxying block used for TLS passthrough
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TcpProxy {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ProxyService>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Status reported by the Contour controller
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HTTPProxyStatus {
    /// "valid", "invalid" or "orphaned"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
