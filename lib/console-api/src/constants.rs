//! Shared constants for the console backend

/// API group of the managed custom resource
pub const API_GROUP: &str = "projectcontour.io";

/// API version of the managed custom resource
pub const API_VERSION: &str = "projectcontour.io/v1";

/// Kind of the managed custom resource
pub const KIND: &str = "HTTPProxy";

/// Secret type accepted for serving and CA credentials
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Well-known credential offered alongside the namespace's own secrets
pub const DEFAULT_CREDENTIAL: &str = "openshift-ingress/letsencrypt";

/// Routing tiers offered when no ingress-class directory is configured
pub const BUILTIN_INGRESS_CLASSES: [&str; 4] = ["inter-venture", "inter-dc", "public", "private"];

pub const DEFAULT_ROUTE_PREFIX: &str = "/";

/// Default idle timeout in bare seconds, as shown in the form
pub const DEFAULT_IDLE_TIMEOUT: &str = "15";

/// Default response timeout in bare seconds
pub const DEFAULT_RESPONSE_TIMEOUT: &str = "5";
