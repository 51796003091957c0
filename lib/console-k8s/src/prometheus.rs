//! Prometheus range-query client for the metrics panels
//!
//! Consumes the HTTP API's `query_range` endpoint only. Sample values arrive
//! as strings; non-numeric values parse to 0 so the charts stay dense. The
//! four panel queries run concurrently and each failure degrades its own
//! panel to an error state.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::promql::UtilizationQuery;

/// Default chart window in seconds
pub const DEFAULT_RANGE_SECONDS: i64 = 3600;

/// Default resolution step in seconds
pub const DEFAULT_STEP_SECONDS: u64 = 30;

/// Timeout handed to the query engine; the client itself does not abort
pub const DEFAULT_QUERY_TIMEOUT: &str = "30s";

/// One timestamped sample of a range query
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Epoch seconds
    pub timestamp: f64,
    pub value: f64,
}

/// Result of one utilization panel: samples, or the error that panel hit
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelResult {
    pub key: &'static str,
    pub unit: &'static str,
    pub samples: Vec<Sample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct PromClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct RangeResponse {
    data: RangeData,
}

#[derive(Deserialize)]
struct RangeData {
    #[serde(default)]
    result: Vec<RangeSeries>,
}

#[derive(Deserialize)]
struct RangeSeries {
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl PromClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Run one range query and return the first series' samples.
    pub async fn query_range(
        &self,
        query: &str,
        start: i64,
        end: i64,
        step: u64,
        timeout: &str,
    ) -> anyhow::Result<Vec<Sample>> {
        debug!("query_range: {}", query);
        let start = start.to_string();
        let end = end.to_string();
        let step = step.to_string();
        let response: RangeResponse = self
            .http
            .get(format!("{}/api/v1/query_range", self.base_url))
            .query(&[
                ("query", query),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("step", step.as_str()),
                ("timeout", timeout),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .data
            .result
            .first()
            .map(|series| parse_series(&series.values))
            .unwrap_or_default())
    }

    /// Fetch all four utilization panels for one proxy concurrently.
    pub async fn query_panels(
        &self,
        name: &str,
        namespace: &str,
        authority: &str,
        start: i64,
        end: i64,
    ) -> Vec<PanelResult> {
        let queries = UtilizationQuery::ALL.iter().map(|panel| async move {
            let expr = panel.expr(name, namespace, authority);
            match self
                .query_range(&expr, start, end, DEFAULT_STEP_SECONDS, DEFAULT_QUERY_TIMEOUT)
                .await
            {
                Ok(samples) => PanelResult {
                    key: panel.key(),
                    unit: panel.unit(),
                    samples,
                    error: None,
                },
                Err(err) => PanelResult {
                    key: panel.key(),
                    unit: panel.unit(),
                    samples: Vec::new(),
                    error: Some(err.to_string()),
                },
            }
        });

        join_all(queries).await
    }
}

fn parse_series(values: &[(f64, String)]) -> Vec<Sample> {
    values
        .iter()
        .map(|(timestamp, value)| Sample {
            timestamp: *timestamp,
            value: value.parse().unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_values() {
        let samples = parse_series(&[
            (1700000000.0, "0.5".to_string()),
            (1700000030.0, "12".to_string()),
        ]);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 0.5);
        assert_eq!(samples[1].timestamp, 1700000030.0);
    }

    #[test]
    fn test_parse_series_non_numeric_becomes_zero() {
        let samples = parse_series(&[(1700000000.0, "NaN?".to_string())]);
        assert_eq!(samples[0].value, 0.0);
    }

    #[test]
    fn test_range_response_shape() {
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [
                    { "metric": {}, "values": [[1700000000, "1.5"]] }
                ]
            }
        }"#;
        let response: RangeResponse =
            serde_json::from_str(body).expect("Failed to parse response");
        assert_eq!(response.data.result[0].values[0].1, "1.5");
    }
}
