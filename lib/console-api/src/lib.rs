//! Console API types for the HTTPProxy custom resource
//!
//! This library defines the data contracts shared across the console backend:
//! - HTTPProxy: the projectcontour.io/v1 custom resource (manifest shape)
//! - FormModel: the form-editable representation the console UI works with
//! - Shared constants and form defaults

pub mod constants;
pub mod form;
pub mod v1;

pub use form::{FormModel, RouteEntry, SecuritySettings, ServiceEntry, Termination};
pub use v1::{HTTPProxy, HTTPProxySpec, HTTPProxyStatus};
