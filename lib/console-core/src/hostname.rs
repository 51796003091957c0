//! Hostname normalization between short labels and fully-qualified names
//!
//! Users may enter either a short label ("myapp") or a full hostname. Short
//! labels are expanded against a suffix derived from the console's own
//! deployment address: the leading "console." label is dropped and the
//! deployment's own ingress-class segment is replaced with the class the
//! proxy is being assigned to, keeping cluster and region segments as-is.

/// Deployment address context the suffix is derived from.
///
/// Injected by the caller instead of read from ambient state, so the
/// transforms stay pure functions of their inputs.
#[derive(Clone, Debug)]
pub struct EnvContext {
    /// The console's own host address, e.g. "console.public.okd4.teh-1.cloud.io"
    pub host_address: String,
}

impl EnvContext {
    pub fn new(host_address: impl Into<String>) -> Self {
        Self {
            host_address: host_address.into(),
        }
    }
}

const CONSOLE_LABEL: &str = "console.";

/// Expand a user-entered hostname to its fully-qualified form.
///
/// Already-qualified input is a fixed point; a short label gains the derived
/// suffix; anything else (including empty input) is returned unchanged apart
/// from trimming.
pub fn expand(env: &EnvContext, ingress_class: &str, value: &str) -> String {
    let trimmed = value.trim().trim_matches('.');
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    if is_fqdn(trimmed) {
        return trimmed.to_string();
    }
    if is_short_label(trimmed) {
        let suffix = derive_suffix(env, ingress_class);
        if !suffix.is_empty() {
            return format!("{}.{}", trimmed, suffix);
        }
    }
    trimmed.to_string()
}

/// Display-side inverse of [`expand`].
///
/// Once a hostname is fully qualified the console keeps displaying it that
/// way, so this does not strip the suffix back to the short label; it only
/// normalizes surrounding whitespace and dots.
pub fn collapse(value: &str) -> String {
    value.trim().trim_matches('.').to_string()
}

/// A fully-qualified name: two or more dot-separated labels of alphanumerics
/// and inner hyphens, the last label purely alphabetic and at least two
/// characters long.
pub fn is_fqdn(value: &str) -> bool {
    let labels: Vec<&str> = value.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let last = labels[labels.len() - 1];
    if last.len() < 2 || !last.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    labels.iter().all(|label| is_label(label))
}

fn is_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_short_label(value: &str) -> bool {
    !value.contains('.') && is_label(value)
}

fn derive_suffix(env: &EnvContext, ingress_class: &str) -> String {
    let host = env.host_address.trim().trim_matches('.');
    let host = host.strip_prefix(CONSOLE_LABEL).unwrap_or(host);
    if host.is_empty() {
        return String::new();
    }
    // The first remaining segment is the deployment's own ingress class;
    // the target class takes its place.
    match host.split_once('.') {
        Some((_, rest)) if !ingress_class.is_empty() => format!("{}.{}", ingress_class, rest),
        _ => host.to_string(),
    }
}
