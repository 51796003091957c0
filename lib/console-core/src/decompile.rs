//! Manifest → form decompilation
//!
//! Extracts the subset of manifest fields the form edits. Manifests may be
//! hand-written and incomplete, so every optional block degrades to a
//! documented default instead of failing: prefix → "/", weight → 100,
//! timeouts → "15"/"5" seconds, websocket and permitInsecure → false.

use console_api::constants::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_ROUTE_PREFIX,
};
use console_api::v1::{HTTPProxy, ProxyRoute, ProxyService, TcpProxy};
use console_api::{FormModel, RouteEntry, SecuritySettings, ServiceEntry, Termination};

use crate::hostname;

/// Decompile a fetched or hand-edited manifest into the form model.
pub fn decompile(proxy: &HTTPProxy) -> FormModel {
    let metadata = &proxy.metadata;
    let spec = &proxy.spec;

    // A tcpproxy block means passthrough routing: its services populate a
    // single synthesized route.
    let routes = match &spec.tcpproxy {
        Some(tcpproxy) => vec![synthesize_passthrough_route(tcpproxy)],
        None => spec
            .routes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(decompile_route)
            .collect(),
    };
    // The form always edits at least one route.
    let routes = if routes.is_empty() {
        vec![RouteEntry::default()]
    } else {
        routes
    };

    let fqdn = spec
        .virtualhost
        .as_ref()
        .map(|vhost| hostname::collapse(&vhost.fqdn))
        .unwrap_or_default();

    FormModel {
        name: metadata.name.clone().unwrap_or_default(),
        namespace: metadata.namespace.clone().unwrap_or_default(),
        ingress_class_name: spec.ingress_class_name.clone().unwrap_or_default(),
        fqdn,
        conditional: decompile_security(proxy, &routes),
        routes,
        labels: metadata.labels.clone().unwrap_or_default(),
        annotations: metadata.annotations.clone().unwrap_or_default(),
        resource_version: metadata.resource_version.clone(),
    }
}

fn decompile_security(proxy: &HTTPProxy, routes: &[RouteEntry]) -> SecuritySettings {
    let spec = &proxy.spec;
    let tls = spec.virtualhost.as_ref().and_then(|vhost| vhost.tls.as_ref());
    let secure_route = tls.is_some();

    let termination = if spec.tcpproxy.is_some()
        || tls.and_then(|tls| tls.passthrough).unwrap_or(false)
    {
        Some(Termination::Passthrough)
    } else if secure_route {
        if first_service_protocol(spec.routes.as_deref()) == Some("tls") {
            Some(Termination::ReEncrypt)
        } else {
            Some(Termination::Edge)
        }
    } else {
        None
    };

    SecuritySettings {
        secure_route,
        termination,
        secrets: tls.and_then(|tls| tls.secret_name.clone()),
        permit_insecure: routes.first().map(|route| route.permit_insecure).unwrap_or(false),
    }
}

fn first_service_protocol(routes: Option<&[ProxyRoute]>) -> Option<&str> {
    routes?
        .first()?
        .services
        .first()?
        .protocol
        .as_deref()
}

fn decompile_route(route: &ProxyRoute) -> RouteEntry {
    let prefix = route
        .conditions
        .as_ref()
        .and_then(|conditions| conditions.first())
        .and_then(|condition| condition.prefix.clone())
        .unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string());

    let timeout = route.timeout_policy.as_ref();
    RouteEntry {
        prefix,
        services: route.services.iter().map(decompile_service).collect(),
        websocket: route.enable_websockets.unwrap_or(false),
        permit_insecure: route.permit_insecure.unwrap_or(false),
        idle_connection: strip_seconds(
            timeout.and_then(|policy| policy.idle.as_deref()),
            DEFAULT_IDLE_TIMEOUT,
        ),
        response_timeout: strip_seconds(
            timeout.and_then(|policy| policy.response.as_deref()),
            DEFAULT_RESPONSE_TIMEOUT,
        ),
    }
}

fn decompile_service(service: &ProxyService) -> ServiceEntry {
    ServiceEntry {
        name: service.name.clone(),
        port: service.port.to_string(),
        weight: service.weight.unwrap_or(100),
        validation: service.validation.is_some(),
        ca_secret: service
            .validation
            .as_ref()
            .map(|validation| validation.ca_secret.clone()),
        subject_name: service
            .validation
            .as_ref()
            .map(|validation| validation.subject_name.clone()),
    }
}

fn synthesize_passthrough_route(tcpproxy: &TcpProxy) -> RouteEntry {
    RouteEntry {
        services: tcpproxy.services.iter().map(decompile_service).collect(),
        ..RouteEntry::default()
    }
}

/// "15s" → "15"; values without the unit suffix pass through.
fn strip_seconds(value: Option<&str>, default: &str) -> String {
    match value {
        Some(value) => value.strip_suffix('s').unwrap_or(value).to_string(),
        None => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::hostname::EnvContext;
    use console_api::v1::HTTPProxySpec;

    fn env() -> EnvContext {
        EnvContext::new("console.public.okd4.teh-1.cloud.io")
    }

    fn form_fixture(termination: Option<Termination>) -> FormModel {
        FormModel {
            name: "app1".to_string(),
            namespace: "team-a".to_string(),
            ingress_class_name: "public".to_string(),
            fqdn: "foo".to_string(),
            routes: vec![RouteEntry {
                prefix: "/api".to_string(),
                services: vec![ServiceEntry {
                    name: "svc1".to_string(),
                    port: "8080".to_string(),
                    weight: 37,
                    validation: true,
                    ca_secret: Some("ca-cert".to_string()),
                    subject_name: Some("svc1.team-a.svc".to_string()),
                }],
                websocket: true,
                permit_insecure: false,
                idle_connection: "30".to_string(),
                response_timeout: "10".to_string(),
            }],
            conditional: SecuritySettings {
                secure_route: termination.is_some(),
                termination,
                secrets: match termination {
                    Some(Termination::Passthrough) | None => None,
                    _ => Some("my-cert".to_string()),
                },
                permit_insecure: false,
            },
            ..FormModel::new("team-a")
        }
    }

    #[test]
    fn test_round_trip_edge_reproduces_form() {
        let mut form = form_fixture(Some(Termination::Edge));
        let compiled = compile(&form, None, &env()).expect("Failed to compile form");
        let round_tripped = decompile(&compiled);

        // The hostname comes back expanded; everything else is unchanged.
        form.fqdn = "foo.public.okd4.teh-1.cloud.io".to_string();
        assert_eq!(round_tripped, form);
    }

    #[test]
    fn test_round_trip_reencrypt_reproduces_form() {
        let mut form = form_fixture(Some(Termination::ReEncrypt));
        let compiled = compile(&form, None, &env()).expect("Failed to compile form");
        let round_tripped = decompile(&compiled);

        form.fqdn = "foo.public.okd4.teh-1.cloud.io".to_string();
        assert_eq!(round_tripped, form);
    }

    #[test]
    fn test_round_trip_weight_is_passed_through() {
        let form = form_fixture(Some(Termination::Edge));
        let compiled = compile(&form, None, &env()).expect("Failed to compile form");
        assert_eq!(
            compiled.spec.routes.as_ref().unwrap()[0].services[0].weight,
            Some(37)
        );
        assert_eq!(decompile(&compiled).routes[0].services[0].weight, 37);
    }

    #[test]
    fn test_round_trip_collapse_is_fixed_point() {
        let form = form_fixture(Some(Termination::Edge));
        let compiled = compile(&form, None, &env()).expect("Failed to compile form");
        let round_tripped = decompile(&compiled);
        let recompiled =
            compile(&round_tripped, None, &env()).expect("Failed to compile form");
        assert_eq!(
            recompiled.spec.virtualhost.as_ref().unwrap().fqdn,
            compiled.spec.virtualhost.as_ref().unwrap().fqdn
        );
    }

    #[test]
    fn test_decompile_tcpproxy_synthesizes_passthrough_route() {
        let form = FormModel {
            routes: vec![RouteEntry {
                services: vec![ServiceEntry {
                    name: "svc1".to_string(),
                    port: "8443".to_string(),
                    ..ServiceEntry::default()
                }],
                ..RouteEntry::default()
            }],
            conditional: SecuritySettings {
                secure_route: true,
                termination: Some(Termination::Passthrough),
                secrets: None,
                permit_insecure: false,
            },
            name: "app1".to_string(),
            fqdn: "foo".to_string(),
            ingress_class_name: "public".to_string(),
            ..FormModel::new("team-a")
        };
        let compiled = compile(&form, None, &env()).expect("Failed to compile form");
        let round_tripped = decompile(&compiled);

        assert_eq!(round_tripped.routes.len(), 1);
        assert_eq!(round_tripped.routes[0].services[0].name, "svc1");
        assert_eq!(round_tripped.routes[0].services[0].port, "8443");
        assert_eq!(round_tripped.routes[0].prefix, "/");
        assert_eq!(
            round_tripped.conditional.termination,
            Some(Termination::Passthrough)
        );
        assert!(round_tripped.conditional.secure_route);
        assert_eq!(round_tripped.conditional.secrets, None);
    }

    #[test]
    fn test_decompile_empty_spec_degrades_to_defaults() {
        let proxy = HTTPProxy::new("bare", HTTPProxySpec::default());
        let form = decompile(&proxy);

        assert_eq!(form.name, "bare");
        assert_eq!(form.fqdn, "");
        assert_eq!(form.routes, vec![RouteEntry::default()]);
        assert!(!form.conditional.secure_route);
        assert_eq!(form.conditional.termination, None);
    }

    #[test]
    fn test_decompile_partial_manifest_defaults() {
        let proxy: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: sparse
  namespace: team-a
spec:
  virtualhost:
    fqdn: sparse.example.com
  routes:
    - services:
        - name: svc1
          port: 8080
"#,
        )
        .expect("Failed to parse fixture");

        let form = decompile(&proxy);
        let route = &form.routes[0];
        assert_eq!(route.prefix, "/");
        assert!(!route.websocket);
        assert!(!route.permit_insecure);
        assert_eq!(route.idle_connection, "15");
        assert_eq!(route.response_timeout, "5");
        assert_eq!(route.services[0].weight, 100);
        assert!(!route.services[0].validation);
        // tls absent: insecure, no termination inferred
        assert!(!form.conditional.secure_route);
        assert_eq!(form.conditional.termination, None);
    }

    #[test]
    fn test_decompile_termination_inference() {
        let edge: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: edge
  namespace: team-a
spec:
  virtualhost:
    fqdn: a.example.com
    tls:
      secretName: cert
  routes:
    - services:
        - name: svc1
          port: 80
"#,
        )
        .expect("Failed to parse fixture");
        assert_eq!(decompile(&edge).conditional.termination, Some(Termination::Edge));
        assert_eq!(decompile(&edge).conditional.secrets.as_deref(), Some("cert"));

        let reencrypt: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: reencrypt
  namespace: team-a
spec:
  virtualhost:
    fqdn: a.example.com
    tls:
      secretName: cert
  routes:
    - services:
        - name: svc1
          port: 443
          protocol: tls
"#,
        )
        .expect("Failed to parse fixture");
        assert_eq!(
            decompile(&reencrypt).conditional.termination,
            Some(Termination::ReEncrypt)
        );

        let passthrough: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: passthrough
  namespace: team-a
spec:
  virtualhost:
    fqdn: a.example.com
    tls:
      passthrough: true
  tcpproxy:
    services:
      - name: svc1
        port: 443
"#,
        )
        .expect("Failed to parse fixture");
        assert_eq!(
            decompile(&passthrough).conditional.termination,
            Some(Termination::Passthrough)
        );
    }

    #[test]
    fn test_decompile_permit_insecure_from_first_route() {
        let proxy: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: insecure-allowed
  namespace: team-a
spec:
  virtualhost:
    fqdn: a.example.com
    tls:
      secretName: cert
  routes:
    - permitInsecure: true
      services:
        - name: svc1
          port: 80
"#,
        )
        .expect("Failed to parse fixture");
        let form = decompile(&proxy);
        assert!(form.conditional.permit_insecure);
        assert!(form.routes[0].permit_insecure);
    }
}
