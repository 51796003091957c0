//! Ingress-class directory endpoint
//!
//! Deployments may expose a config endpoint that enumerates the routing
//! tiers available to the cluster. Any failure (transport, status, shape)
//! falls back to the built-in class list.

use anyhow::anyhow;
use tracing::warn;

use console_api::constants::BUILTIN_INGRESS_CLASSES;

pub fn builtin_classes() -> Vec<String> {
    BUILTIN_INGRESS_CLASSES
        .iter()
        .map(|class| class.to_string())
        .collect()
}

pub async fn fetch_ingress_classes(http: &reqwest::Client, url: &str) -> Vec<String> {
    match try_fetch(http, url).await {
        Ok(classes) if !classes.is_empty() => classes,
        Ok(_) => builtin_classes(),
        Err(err) => {
            warn!("Ingress-class directory unavailable, using built-ins: {}", err);
            builtin_classes()
        }
    }
}

async fn try_fetch(http: &reqwest::Client, url: &str) -> anyhow::Result<Vec<String>> {
    let body: serde_json::Value = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    parse_directory_response(&body)
}

/// The endpoint returns a JSON object whose first array-valued member is
/// the class-name list.
fn parse_directory_response(body: &serde_json::Value) -> anyhow::Result<Vec<String>> {
    let classes = body
        .as_object()
        .and_then(|object| object.values().find_map(|value| value.as_array()))
        .ok_or_else(|| anyhow!("unexpected directory response shape"))?;

    Ok(classes
        .iter()
        .filter_map(|value| value.as_str().map(String::from))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_directory_response() {
        let body = json!({ "classes": ["gold", "silver"] });
        let classes = parse_directory_response(&body).expect("Failed to parse response");
        assert_eq!(classes, vec!["gold", "silver"]);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_directory_response(&json!(["flat"])).is_err());
        assert!(parse_directory_response(&json!({ "count": 4 })).is_err());
    }

    #[test]
    fn test_builtin_classes_order() {
        assert_eq!(
            builtin_classes(),
            vec!["inter-venture", "inter-dc", "public", "private"]
        );
    }
}
