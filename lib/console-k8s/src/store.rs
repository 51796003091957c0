//! Resource store operations for HTTPProxy objects
//!
//! Thin wrapper over the typed kube Api. Mutations are fire-and-forget from
//! the core's perspective: no retries, errors surface verbatim to the
//! caller. Optimistic concurrency rides on the resourceVersion carried in
//! the manifest being written; the API server rejects stale updates.

use std::collections::BTreeMap;

use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use serde_json::{json, Value};
use tracing::debug;

use console_api::v1::HTTPProxy;

pub struct ProxyStore {
    client: Client,
}

impl ProxyStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<HTTPProxy> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub async fn get(&self, namespace: &str, name: &str) -> anyhow::Result<HTTPProxy> {
        Ok(self.api(namespace).get(name).await?)
    }

    /// List proxies in one namespace, or across the cluster when none given
    pub async fn list(&self, namespace: Option<&str>) -> anyhow::Result<Vec<HTTPProxy>> {
        let api = match namespace {
            Some(namespace) => self.api(namespace),
            None => Api::all(self.client.clone()),
        };
        let list = api.list(&ListParams::default()).await?;
        debug!("Listed {} HTTPProxies", list.items.len());
        Ok(list.items)
    }

    pub async fn create(&self, manifest: &HTTPProxy) -> anyhow::Result<HTTPProxy> {
        let namespace = manifest.metadata.namespace.as_deref().unwrap_or("default");
        Ok(self
            .api(namespace)
            .create(&PostParams::default(), manifest)
            .await?)
    }

    /// Replace an existing proxy; the manifest must carry the name and the
    /// resourceVersion captured at fetch time
    pub async fn update(&self, manifest: &HTTPProxy) -> anyhow::Result<HTTPProxy> {
        let namespace = manifest.metadata.namespace.as_deref().unwrap_or("default");
        let name = manifest
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("manifest has no name"))?;
        Ok(self
            .api(namespace)
            .replace(name, &PostParams::default(), manifest)
            .await?)
    }

    /// Replace the full label set of a proxy
    pub async fn replace_labels(
        &self,
        namespace: &str,
        name: &str,
        labels: &BTreeMap<String, String>,
    ) -> anyhow::Result<HTTPProxy> {
        let current = self.get(namespace, name).await?;
        let patch = metadata_replace_patch("labels", current.metadata.labels.as_ref(), labels);
        self.patch_metadata(namespace, name, patch).await
    }

    /// Replace the full annotation set of a proxy
    pub async fn replace_annotations(
        &self,
        namespace: &str,
        name: &str,
        annotations: &BTreeMap<String, String>,
    ) -> anyhow::Result<HTTPProxy> {
        let current = self.get(namespace, name).await?;
        let patch = metadata_replace_patch(
            "annotations",
            current.metadata.annotations.as_ref(),
            annotations,
        );
        self.patch_metadata(namespace, name, patch).await
    }

    async fn patch_metadata(
        &self,
        namespace: &str,
        name: &str,
        patch: Value,
    ) -> anyhow::Result<HTTPProxy> {
        Ok(self
            .api(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?)
    }

    pub async fn delete(&self, namespace: &str, name: &str) -> anyhow::Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        debug!("Deleted HTTPProxy {}/{}", namespace, name);
        Ok(())
    }
}

/// Build a merge patch that makes `desired` the complete metadata map.
///
/// A merge patch only overlays keys, so keys present on the resource but
/// absent from `desired` get explicit null tombstones to be removed.
pub fn metadata_replace_patch(
    field: &str,
    current: Option<&BTreeMap<String, String>>,
    desired: &BTreeMap<String, String>,
) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in desired {
        map.insert(key.clone(), json!(value));
    }
    for key in current.into_iter().flat_map(|current| current.keys()) {
        if !desired.contains_key(key) {
            map.insert(key.clone(), Value::Null);
        }
    }
    json!({ "metadata": { field: Value::Object(map) } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_patch_overlays_and_tombstones() {
        let current: BTreeMap<String, String> = [
            ("keep".to_string(), "old".to_string()),
            ("drop".to_string(), "gone".to_string()),
        ]
        .into();
        let desired: BTreeMap<String, String> = [
            ("keep".to_string(), "new".to_string()),
            ("add".to_string(), "fresh".to_string()),
        ]
        .into();

        let patch = metadata_replace_patch("labels", Some(&current), &desired);
        let labels = &patch["metadata"]["labels"];
        assert_eq!(labels["keep"], "new");
        assert_eq!(labels["add"], "fresh");
        assert!(labels["drop"].is_null());
    }

    #[test]
    fn test_replace_patch_without_current() {
        let desired: BTreeMap<String, String> = [("team".to_string(), "a".to_string())].into();
        let patch = metadata_replace_patch("annotations", None, &desired);
        assert_eq!(patch["metadata"]["annotations"]["team"], "a");
    }
}
