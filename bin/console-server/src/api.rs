//! JSON API handlers for the console frontend
//!
//! Routing is a plain match over method and path segments. Error mapping:
//! malformed request bodies and manifest text are 400, validation failures
//! are 422 with the full message list, collaborator failures bubble up as
//! 502 with the failure message verbatim.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use console_api::FormModel;
use console_core::labels::{labels_to_map, map_to_labels};
use console_core::yaml::{manifest_to_yaml, parse_manifest};
use console_core::{
    compile, decompile, filter_proxies, project_row, prune_stale_ports, recompute, validate,
    CoreError, EnvContext, FilterField, ProxyRow,
};
use console_k8s::{PromClient, ProxyStore, ResourceLister};
use console_k8s::prometheus::DEFAULT_RANGE_SECONDS;

use crate::metrics::ApiMetrics;

pub struct AppState {
    pub store: ProxyStore,
    pub lister: ResourceLister,
    pub prom: Option<PromClient>,
    pub env: EnvContext,
    pub metrics: ApiMetrics,
}

#[derive(Deserialize)]
struct ToManifestRequest {
    form: FormModel,
    /// Prior manifest text, for merge semantics in the edit flow
    #[serde(default)]
    original: Option<String>,
}

#[derive(Deserialize)]
struct ToFormRequest {
    manifest: String,
}

pub async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    state
        .metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str()])
        .inc();
    debug!("{} {}", method, path);

    let body = req.into_body().collect().await?.to_bytes();

    let response = match route(&state, &method, &path, query.as_deref(), &body).await {
        Ok(response) => response,
        Err(err) => {
            // Collaborator failure: surface the message as-is.
            state.metrics.http_errors_total.inc();
            error!("{} {} failed: {}", method, path, err);
            error_response(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    };
    Ok(response)
}

async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &Bytes,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", &["healthz"]) => Ok(text_response(StatusCode::OK, "OK\n")),

        ("GET", &["metrics"]) => {
            let text = state
                .metrics
                .gather()
                .unwrap_or_else(|_| "Failed to gather metrics\n".to_string());
            Ok(text_response(StatusCode::OK, &text))
        }

        ("GET", &["api", "namespaces", namespace, "httpproxies"]) => {
            list_proxies(state, namespace, query).await
        }
        ("POST", &["api", "namespaces", namespace, "httpproxies"]) => {
            create_proxy(state, namespace, body).await
        }
        ("GET", &["api", "namespaces", namespace, "httpproxies", name]) => {
            proxy_details(state, namespace, name).await
        }
        ("PUT", &["api", "namespaces", namespace, "httpproxies", name]) => {
            update_proxy(state, namespace, name, body).await
        }
        ("DELETE", &["api", "namespaces", namespace, "httpproxies", name]) => {
            state.store.delete(namespace, name).await?;
            Ok(empty_response(StatusCode::NO_CONTENT))
        }
        ("PATCH", &["api", "namespaces", namespace, "httpproxies", name, "labels"]) => {
            patch_metadata(state, namespace, name, body, MetadataField::Labels).await
        }
        ("PATCH", &["api", "namespaces", namespace, "httpproxies", name, "annotations"]) => {
            patch_metadata(state, namespace, name, body, MetadataField::Annotations).await
        }
        ("GET", &["api", "namespaces", namespace, "httpproxies", name, "metrics"]) => {
            proxy_metrics(state, namespace, name, query).await
        }
        ("GET", &["api", "namespaces", namespace, "form-options"]) => {
            form_options(state, namespace, query).await
        }
        ("POST", &["api", "namespaces", namespace, "form-refresh"]) => {
            form_refresh(state, namespace, body).await
        }

        ("POST", &["api", "convert", "to-manifest"]) => convert_to_manifest(state, body),
        ("POST", &["api", "convert", "to-form"]) => convert_to_form(body),

        _ => Ok(error_response(StatusCode::NOT_FOUND, "Not found")),
    }
}

async fn list_proxies(
    state: &AppState,
    namespace: &str,
    query: Option<&str>,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let search = query_param(query, "search").unwrap_or_default();
    let field = match query_param(query, "filter").as_deref() {
        Some("label") => FilterField::Label,
        _ => FilterField::Name,
    };

    let proxies = state.store.list(Some(namespace)).await?;
    let rows: Vec<ProxyRow> = filter_proxies(&proxies, &search, field)
        .into_iter()
        .map(project_row)
        .collect();

    Ok(json_response(StatusCode::OK, &json!({ "items": rows })))
}

async fn create_proxy(
    state: &AppState,
    namespace: &str,
    body: &Bytes,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let mut form: FormModel = match serde_json::from_slice(body) {
        Ok(form) => form,
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };
    form.namespace = namespace.to_string();

    let errors = validate(&form);
    if !errors.is_empty() {
        return Ok(json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({ "errors": errors }),
        ));
    }

    let manifest = match compile(&form, None, &state.env) {
        Ok(manifest) => manifest,
        Err(err) => return Ok(bad_request(&err.to_string())),
    };
    let created = state.store.create(&manifest).await?;
    Ok(json_response(StatusCode::CREATED, &created))
}

async fn update_proxy(
    state: &AppState,
    namespace: &str,
    name: &str,
    body: &Bytes,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let mut form: FormModel = match serde_json::from_slice(body) {
        Ok(form) => form,
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };
    // The name is immutable once created; the path wins.
    form.name = name.to_string();
    form.namespace = namespace.to_string();

    let errors = validate(&form);
    if !errors.is_empty() {
        return Ok(json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({ "errors": errors }),
        ));
    }

    let original = state.store.get(namespace, name).await?;
    if form.resource_version.is_none() {
        form.resource_version = original.metadata.resource_version.clone();
    }

    let manifest = match compile(&form, Some(&original), &state.env) {
        Ok(manifest) => manifest,
        Err(err) => return Ok(bad_request(&err.to_string())),
    };
    let updated = state.store.update(&manifest).await?;
    Ok(json_response(StatusCode::OK, &updated))
}

async fn proxy_details(
    state: &AppState,
    namespace: &str,
    name: &str,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let manifest = state.store.get(namespace, name).await?;
    let form = decompile(&manifest);
    let yaml = manifest_to_yaml(&manifest)?;
    // Tag-shaped metadata prefills the edit modals.
    let label_tags = map_to_labels(&form.labels);
    let annotation_tags = map_to_labels(&form.annotations);

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "manifest": manifest,
            "form": form,
            "yaml": yaml,
            "labelTags": label_tags,
            "annotationTags": annotation_tags,
        }),
    ))
}

enum MetadataField {
    Labels,
    Annotations,
}

/// The metadata modals send either a plain map or the tag editor's
/// `key=value` strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum MetadataEntries {
    Map(BTreeMap<String, String>),
    Tags(Vec<String>),
}

async fn patch_metadata(
    state: &AppState,
    namespace: &str,
    name: &str,
    body: &Bytes,
    field: MetadataField,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let entries = match serde_json::from_slice::<MetadataEntries>(body) {
        Ok(MetadataEntries::Map(map)) => map,
        Ok(MetadataEntries::Tags(tags)) => labels_to_map(&tags),
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };

    let updated = match field {
        MetadataField::Labels => state.store.replace_labels(namespace, name, &entries).await?,
        MetadataField::Annotations => {
            state
                .store
                .replace_annotations(namespace, name, &entries)
                .await?
        }
    };
    Ok(json_response(StatusCode::OK, &updated))
}

async fn proxy_metrics(
    state: &AppState,
    namespace: &str,
    name: &str,
    query: Option<&str>,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let Some(prom) = &state.prom else {
        return Ok(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics backend not configured",
        ));
    };

    let proxy = state.store.get(namespace, name).await?;
    let authority = proxy
        .spec
        .virtualhost
        .as_ref()
        .map(|vhost| vhost.fqdn.clone())
        .unwrap_or_else(|| name.to_string());

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    let end = query_param(query, "end")
        .and_then(|value| value.parse().ok())
        .unwrap_or(now);
    let start = query_param(query, "start")
        .and_then(|value| value.parse().ok())
        .unwrap_or(end - DEFAULT_RANGE_SECONDS);

    let panels = prom.query_panels(name, namespace, &authority, start, end).await;
    Ok(json_response(StatusCode::OK, &json!({ "panels": panels })))
}

async fn form_options(
    state: &AppState,
    namespace: &str,
    query: Option<&str>,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let lists = state.lister.fetch_all(namespace).await;
    let selected = query_param(query, "service");
    let options = recompute(
        &lists.services,
        &lists.tls_secrets,
        &lists.ingress_classes,
        selected.as_deref(),
    );
    Ok(json_response(StatusCode::OK, &options))
}

/// Re-derive the option lists against the submitted form and prune any
/// selected port its service no longer declares. Called by the frontend
/// whenever a service selection changes.
async fn form_refresh(
    state: &AppState,
    namespace: &str,
    body: &Bytes,
) -> anyhow::Result<Response<Full<Bytes>>> {
    let mut form: FormModel = match serde_json::from_slice(body) {
        Ok(form) => form,
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };

    let lists = state.lister.fetch_all(namespace).await;
    prune_stale_ports(&mut form, &lists.services);

    let selected = form
        .routes
        .first()
        .and_then(|route| route.services.first())
        .map(|service| service.name.clone())
        .filter(|name| !name.is_empty());
    let options = recompute(
        &lists.services,
        &lists.tls_secrets,
        &lists.ingress_classes,
        selected.as_deref(),
    );
    Ok(json_response(
        StatusCode::OK,
        &json!({ "form": form, "options": options }),
    ))
}

fn convert_to_manifest(state: &AppState, body: &Bytes) -> anyhow::Result<Response<Full<Bytes>>> {
    let request: ToManifestRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };

    let original = match &request.original {
        Some(text) => match parse_manifest(text) {
            Ok(manifest) => Some(manifest),
            Err(err) => return Ok(bad_request(&err.to_string())),
        },
        None => None,
    };

    let manifest = match compile(&request.form, original.as_ref(), &state.env) {
        Ok(manifest) => manifest,
        Err(err @ CoreError::InvalidPort(_)) => return Ok(bad_request(&err.to_string())),
        Err(err) => return Err(err.into()),
    };
    let yaml = manifest_to_yaml(&manifest)?;
    Ok(json_response(StatusCode::OK, &json!({ "yaml": yaml })))
}

fn convert_to_form(body: &Bytes) -> anyhow::Result<Response<Full<Bytes>>> {
    let request: ToFormRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => return Ok(bad_request(&format!("Invalid request body: {}", err))),
    };

    // A parse failure blocks the view switch; the caller keeps its
    // last-good form state.
    match parse_manifest(&request.manifest) {
        Ok(manifest) => Ok(json_response(
            StatusCode::OK,
            &json!({ "form": decompile(&manifest) }),
        )),
        Err(err) => Ok(bad_request(&err.to_string())),
    }
}

fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| percent_decode(value))
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let Ok(byte) = u8::from_str_radix(&value[i + 1..i + 3], 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let payload = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(payload)))
        .unwrap()
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &json!({ "error": message }))
}

fn bad_request(message: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_extraction() {
        let query = Some("search=front&filter=label");
        assert_eq!(query_param(query, "search").as_deref(), Some("front"));
        assert_eq!(query_param(query, "filter").as_deref(), Some("label"));
        assert_eq!(query_param(query, "missing"), None);
        assert_eq!(query_param(None, "search"), None);
    }

    #[test]
    fn test_query_param_decoding() {
        let query = Some("search=team%3Dalpha&other=a+b");
        assert_eq!(query_param(query, "search").as_deref(), Some("team=alpha"));
        assert_eq!(query_param(query, "other").as_deref(), Some("a b"));
    }
}
