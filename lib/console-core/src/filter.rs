//! List page filtering and row projection

use serde::{Deserialize, Serialize};

use console_api::v1::HTTPProxy;

/// Which attribute the list search box matches against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    #[default]
    Name,
    Label,
}

/// One row of the proxy list table
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRow {
    pub name: String,
    pub namespace: String,
    /// The served hostname, shown as the location column
    pub location: String,
    /// First route's first service, treated as primary
    pub service: String,
    pub status: String,
}

/// Case-insensitive substring filter over name or `key=value` label pairs.
/// An empty search matches everything.
pub fn filter_proxies<'a>(
    proxies: &'a [HTTPProxy],
    search: &str,
    field: FilterField,
) -> Vec<&'a HTTPProxy> {
    if search.is_empty() {
        return proxies.iter().collect();
    }
    let needle = search.to_lowercase();
    proxies
        .iter()
        .filter(|proxy| match field {
            FilterField::Name => proxy
                .metadata
                .name
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle),
            FilterField::Label => proxy
                .metadata
                .labels
                .iter()
                .flatten()
                .any(|(key, value)| format!("{}={}", key, value).to_lowercase().contains(&needle)),
        })
        .collect()
}

/// Project a proxy into its list row.
pub fn project_row(proxy: &HTTPProxy) -> ProxyRow {
    let spec = &proxy.spec;
    let service = spec
        .routes
        .as_deref()
        .unwrap_or_default()
        .first()
        .and_then(|route| route.services.first())
        .or_else(|| {
            spec.tcpproxy
                .as_ref()
                .and_then(|tcpproxy| tcpproxy.services.first())
        })
        .map(|service| service.name.clone())
        .unwrap_or_default();

    ProxyRow {
        name: proxy.metadata.name.clone().unwrap_or_default(),
        namespace: proxy.metadata.namespace.clone().unwrap_or_default(),
        location: spec
            .virtualhost
            .as_ref()
            .map(|vhost| vhost.fqdn.clone())
            .unwrap_or_default(),
        service,
        status: proxy
            .status
            .as_ref()
            .and_then(|status| status.current_status.clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_api::v1::HTTPProxySpec;
    use std::collections::BTreeMap;

    fn proxy(name: &str, labels: &[(&str, &str)]) -> HTTPProxy {
        let mut proxy = HTTPProxy::new(name, HTTPProxySpec::default());
        if !labels.is_empty() {
            proxy.metadata.labels = Some(
                labels
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            );
        }
        proxy
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive() {
        let proxies = vec![proxy("frontend", &[]), proxy("backend", &[])];
        let hits = filter_proxies(&proxies, "FRONT", FilterField::Name);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.name.as_deref(), Some("frontend"));
    }

    #[test]
    fn test_filter_by_label_pair() {
        let proxies = vec![
            proxy("a", &[("team", "alpha")]),
            proxy("b", &[("team", "beta")]),
        ];
        let hits = filter_proxies(&proxies, "team=al", FilterField::Label);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.name.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_search_matches_all() {
        let proxies = vec![proxy("a", &[]), proxy("b", &[])];
        assert_eq!(filter_proxies(&proxies, "", FilterField::Label).len(), 2);
    }

    #[test]
    fn test_project_row_prefers_first_route_service() {
        let proxy: HTTPProxy = serde_yaml::from_str(
            r#"
apiVersion: projectcontour.io/v1
kind: HTTPProxy
metadata:
  name: app1
  namespace: team-a
spec:
  virtualhost:
    fqdn: app1.example.com
  routes:
    - services:
        - name: primary
          port: 8080
        - name: secondary
          port: 8081
status:
  currentStatus: valid
"#,
        )
        .expect("Failed to parse fixture");

        let row = project_row(&proxy);
        assert_eq!(row.service, "primary");
        assert_eq!(row.location, "app1.example.com");
        assert_eq!(row.status, "valid");
    }
}
