//! PromQL query templates for the per-proxy utilization panels

/// The four utilization panels of the details view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UtilizationQuery {
    NetworkIn,
    NetworkOut,
    ConnectionRate,
    RequestsPerSecond,
}

impl UtilizationQuery {
    pub const ALL: [UtilizationQuery; 4] = [
        UtilizationQuery::NetworkIn,
        UtilizationQuery::NetworkOut,
        UtilizationQuery::ConnectionRate,
        UtilizationQuery::RequestsPerSecond,
    ];

    /// Stable key the frontend uses to place the panel
    pub fn key(&self) -> &'static str {
        match self {
            UtilizationQuery::NetworkIn => "NETWORK_IN",
            UtilizationQuery::NetworkOut => "NETWORK_OUT",
            UtilizationQuery::ConnectionRate => "CONNECTION_RATE",
            UtilizationQuery::RequestsPerSecond => "RPS",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            UtilizationQuery::NetworkIn | UtilizationQuery::NetworkOut => "bytes/s",
            UtilizationQuery::ConnectionRate => "conn/s",
            UtilizationQuery::RequestsPerSecond => "req/s",
        }
    }

    /// Render the query for one proxy. `authority` is the served hostname
    /// the traffic metrics are labeled with.
    pub fn expr(&self, name: &str, namespace: &str, authority: &str) -> String {
        match self {
            UtilizationQuery::NetworkIn => format!(
                "sum without (instance,exported_pod,exported_service,pod,server)\
                 (irate(cloud:routes_received:bytes{{namespace='{}',authority='{}'}}[5m]))",
                namespace, authority
            ),
            UtilizationQuery::NetworkOut => format!(
                "sum without (instance,exported_pod,exported_service,pod,server)\
                 (irate(cloud:routes_sent:bytes{{namespace='{}',authority='{}'}}[5m]))",
                namespace, authority
            ),
            UtilizationQuery::ConnectionRate => format!(
                "sum without (instance,exported_pod,exported_service,pod,server)\
                 (irate(haproxy_backend_connections_total{{exported_namespace='{}',route='{}'}}[5m]))",
                namespace, name
            ),
            UtilizationQuery::RequestsPerSecond => format!(
                "sum (cloud:routes:rps{{namespace='{}',route_name='{}'}}) OR on() vector(0)",
                namespace, name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_in_query_carries_authority() {
        let expr =
            UtilizationQuery::NetworkIn.expr("app1", "team-a", "app1.public.example.com");
        assert!(expr.contains("cloud:routes_received:bytes"));
        assert!(expr.contains("namespace='team-a'"));
        assert!(expr.contains("authority='app1.public.example.com'"));
    }

    #[test]
    fn test_rps_query_defaults_to_zero_vector() {
        let expr = UtilizationQuery::RequestsPerSecond.expr("app1", "team-a", "ignored");
        assert!(expr.contains("route_name='app1'"));
        assert!(expr.ends_with("OR on() vector(0)"));
    }

    #[test]
    fn test_all_panels_have_distinct_keys() {
        let keys: Vec<_> = UtilizationQuery::ALL.iter().map(|query| query.key()).collect();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys.len(), deduped.len());
    }
}
