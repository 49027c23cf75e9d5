//! Request metadata recorded with audit entries

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client IP address and user agent of the inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Reported address, recorded with audit entries
    pub ip_address: Option<String>,
    /// Socket peer address; `X-Forwarded-For` cannot change it
    pub peer_ip: Option<String>,
    pub user_agent: String,
}

impl ClientInfo {
    /// Build from request headers and extensions
    ///
    /// The first `X-Forwarded-For` hop wins; otherwise the socket peer address
    /// (available when served with `into_make_service_with_connect_info`).
    pub fn from_headers(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let peer_ip = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let ip_address = forwarded.or_else(|| peer_ip.clone());

        let user_agent = headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Self {
            ip_address,
            peer_ip,
            user_agent,
        }
    }

    /// Rate-limit key for anonymous callers
    ///
    /// Keyed on the socket peer unless the server sits behind a proxy that
    /// is trusted to set `X-Forwarded-For`.
    pub fn ip_key(&self, trust_forwarded_for: bool) -> String {
        let ip = if trust_forwarded_for { &self.ip_address } else { &self.peer_ip };
        format!("ip:{}", ip.as_deref().unwrap_or("unknown"))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &parts.extensions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert(axum::http::header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let info = ClientInfo::from_headers(&headers, &Extensions::new());
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent, "curl/8.0");
        assert_eq!(info.ip_key(true), "ip:203.0.113.7");
    }

    #[test]
    fn test_untrusted_forwarded_for_does_not_change_key() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.9.9.1"));
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 77], 41000))));

        let info = ClientInfo::from_headers(&headers, &extensions);
        assert_eq!(info.ip_address.as_deref(), Some("10.9.9.1"));
        assert_eq!(info.peer_ip.as_deref(), Some("198.51.100.77"));
        assert_eq!(info.ip_key(false), "ip:198.51.100.77");
        assert_eq!(info.ip_key(true), "ip:10.9.9.1");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 50000))));

        let info = ClientInfo::from_headers(&HeaderMap::new(), &extensions);
        assert_eq!(info.ip_address.as_deref(), Some("192.0.2.10"));
        assert_eq!(info.ip_key(false), "ip:192.0.2.10");
        assert_eq!(info.user_agent, "");
    }

    #[test]
    fn test_unknown_client() {
        let info = ClientInfo::from_headers(&HeaderMap::new(), &Extensions::new());
        assert_eq!(info.ip_address, None);
        assert_eq!(info.ip_key(false), "ip:unknown");
    }
}
