//! Form → manifest compilation
//!
//! Produces a complete HTTPProxy manifest from the form model. In the edit
//! flow the previously fetched manifest is merged under the freshly computed
//! fields so content the form does not model survives: spec-level unknown
//! fields ride the flatten tails, and a route matched by equal prefix keeps
//! its unmodeled fields (e.g. loadBalancerPolicy). Arrays are otherwise
//! replaced wholesale. Output is deterministic for a given form + original.

use std::collections::BTreeMap;

use kube::core::ObjectMeta;

use console_api::constants::DEFAULT_ROUTE_PREFIX;
use console_api::v1::{
    HTTPProxy, HTTPProxySpec, MatchCondition, ProxyRoute, ProxyService, TimeoutPolicy, TlsConfig,
    UpstreamValidation,
};
use console_api::{FormModel, RouteEntry, SecuritySettings, ServiceEntry, Termination};

use crate::error::{CoreError, Result};
use crate::hostname::{self, EnvContext};

/// Compile the form model into a manifest ready to submit.
///
/// `original` is the manifest fetched at edit time, or `None` in the create
/// flow. An invalid form should be rejected by validation before this is
/// called; the only structural inconsistency checked here is a non-numeric
/// port, which is an error rather than silently dropped.
pub fn compile(
    form: &FormModel,
    original: Option<&HTTPProxy>,
    env: &EnvContext,
) -> Result<HTTPProxy> {
    let mut proxy = match original {
        Some(orig) => orig.clone(),
        None => HTTPProxy::new(&form.name, HTTPProxySpec::default()),
    };

    merge_metadata(&mut proxy.metadata, form);
    compile_spec(&mut proxy.spec, form, original, env)?;
    Ok(proxy)
}

fn compile_spec(
    spec: &mut HTTPProxySpec,
    form: &FormModel,
    original: Option<&HTTPProxy>,
    env: &EnvContext,
) -> Result<()> {
    spec.ingress_class_name = Some(form.ingress_class_name.clone());

    let mut vhost = spec.virtualhost.take().unwrap_or_default();
    vhost.fqdn = hostname::expand(env, &form.ingress_class_name, &form.fqdn);
    vhost.tls = compile_tls(&form.conditional, vhost.tls.take());
    spec.virtualhost = Some(vhost);

    if is_passthrough(&form.conditional) {
        // Passthrough routing lives under tcpproxy; per-route path and
        // timeout fields do not apply.
        let mut tcpproxy = spec.tcpproxy.take().unwrap_or_default();
        tcpproxy.services = form
            .routes
            .iter()
            .flat_map(|route| &route.services)
            .map(|service| compile_service(service, false))
            .collect::<Result<Vec<_>>>()?;
        spec.tcpproxy = Some(tcpproxy);
        spec.routes = None;
    } else {
        let reencrypt = form.conditional.secure_route
            && form.conditional.termination == Some(Termination::ReEncrypt);
        let original_routes = original.and_then(|orig| orig.spec.routes.as_deref());
        spec.routes = Some(
            form.routes
                .iter()
                .map(|route| {
                    let prior = find_route_by_prefix(original_routes, &route.prefix);
                    compile_route(route, &form.conditional, reencrypt, prior)
                })
                .collect::<Result<Vec<_>>>()?,
        );
        spec.tcpproxy = None;
    }

    Ok(())
}

fn is_passthrough(conditional: &SecuritySettings) -> bool {
    conditional.secure_route && conditional.termination == Some(Termination::Passthrough)
}

fn compile_tls(conditional: &SecuritySettings, original: Option<TlsConfig>) -> Option<TlsConfig> {
    if !conditional.secure_route {
        return None;
    }
    // Unknown keys of an existing tls block are kept; the modeled keys
    // always reflect the form.
    let mut tls = original.unwrap_or_default();
    if conditional.termination == Some(Termination::Passthrough) {
        tls.secret_name = None;
        tls.passthrough = Some(true);
        tls.enable_fallback_certificate = None;
    } else {
        tls.secret_name = conditional.secrets.clone();
        tls.passthrough = None;
        tls.enable_fallback_certificate = Some(true);
    }
    Some(tls)
}

fn compile_route(
    route: &RouteEntry,
    conditional: &SecuritySettings,
    reencrypt: bool,
    original: Option<&ProxyRoute>,
) -> Result<ProxyRoute> {
    let mut out = ProxyRoute::default();
    if let Some(prior) = original {
        out.extra = prior.extra.clone();
    }

    out.conditions = Some(vec![MatchCondition {
        prefix: Some(effective_prefix(&route.prefix).to_string()),
    }]);
    out.services = route
        .services
        .iter()
        .map(|service| compile_service(service, reencrypt))
        .collect::<Result<Vec<_>>>()?;
    out.enable_websockets = route.websocket.then_some(true);
    out.permit_insecure = conditional.permit_insecure.then_some(true);
    out.timeout_policy = Some(TimeoutPolicy {
        idle: Some(format!("{}s", route.idle_connection)),
        response: Some(format!("{}s", route.response_timeout)),
    });

    Ok(out)
}

fn compile_service(service: &ServiceEntry, reencrypt: bool) -> Result<ProxyService> {
    let port: i32 = service
        .port
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidPort(service.port.clone()))?;

    Ok(ProxyService {
        name: service.name.clone(),
        port,
        weight: Some(service.weight),
        protocol: reencrypt.then(|| "tls".to_string()),
        validation: service.validation.then(|| UpstreamValidation {
            ca_secret: service.ca_secret.clone().unwrap_or_default(),
            subject_name: service.subject_name.clone().unwrap_or_default(),
        }),
    })
}

fn effective_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        DEFAULT_ROUTE_PREFIX
    } else {
        prefix
    }
}

fn find_route_by_prefix<'a>(
    routes: Option<&'a [ProxyRoute]>,
    prefix: &str,
) -> Option<&'a ProxyRoute> {
    let wanted = effective_prefix(prefix);
    routes?.iter().find(|route| {
        let prior = route
            .conditions
            .as_ref()
            .and_then(|conditions| conditions.first())
            .and_then(|condition| condition.prefix.as_deref())
            .unwrap_or(DEFAULT_ROUTE_PREFIX);
        prior == wanted
    })
}

/// Metadata merges rather than replaces: keys the form does not carry stay
/// untouched on the original.
fn merge_metadata(metadata: &mut ObjectMeta, form: &FormModel) {
    metadata.name = Some(form.name.clone());
    metadata.namespace = Some(form.namespace.clone());
    if let Some(version) = &form.resource_version {
        metadata.resource_version = Some(version.clone());
    }
    if !form.labels.is_empty() {
        let labels = metadata.labels.get_or_insert_with(BTreeMap::new);
        for (key, value) in &form.labels {
            labels.insert(key.clone(), value.clone());
        }
    }
    if !form.annotations.is_empty() {
        let annotations = metadata.annotations.get_or_insert_with(BTreeMap::new);
        for (key, value) in &form.annotations {
            annotations.insert(key.clone(), value.clone());
        }
    }
}
