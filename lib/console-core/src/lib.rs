//! Core form ⇄ manifest transformation engine
//!
//! This library provides:
//! - Hostname normalization between short labels and fully-qualified names
//! - Form → manifest compilation with merge-over-original semantics
//! - Manifest → form decompilation tolerant of hand-written documents
//! - Dependent field option enumeration for the dynamic form
//! - Form validation and list filtering
//!
//! Everything here is a pure, synchronous function of its inputs; the
//! collaborating clients live in `console-k8s`.

pub mod compile;
pub mod decompile;
pub mod error;
pub mod filter;
pub mod hostname;
pub mod labels;
pub mod options;
pub mod validate;
pub mod yaml;

pub use compile::compile;
pub use decompile::decompile;
pub use error::{CoreError, Result};
pub use filter::{filter_proxies, project_row, FilterField, ProxyRow};
pub use hostname::EnvContext;
pub use options::{prune_stale_ports, recompute, BackingService, FieldOptions, PortOption};
pub use validate::validate;
