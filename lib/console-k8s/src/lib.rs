//! Kubernetes and metrics collaborators for the console
//!
//! This library provides:
//! - Resource store operations for HTTPProxy objects
//! - Supporting resource lists (services, TLS secrets, ingress classes)
//! - The ingress-class directory endpoint with built-in fallback
//! - The Prometheus range-query client for the utilization panels

pub mod client;
pub mod directory;
pub mod prometheus;
pub mod promql;
pub mod resources;
pub mod store;

pub use client::ConsoleClient;
pub use prometheus::{PanelResult, PromClient, Sample};
pub use promql::UtilizationQuery;
pub use resources::{ResourceLister, ResourceLists};
pub use store::ProxyStore;
