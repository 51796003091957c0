pub mod httpproxy;

pub use httpproxy::{
    HTTPProxy, HTTPProxySpec, HTTPProxyStatus, MatchCondition, ProxyRoute, ProxyService, TcpProxy,
    TimeoutPolicy, TlsConfig, UpstreamValidation, VirtualHost,
};
