//! `ClientInfo` extractor: the caller's IP and user agent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};

use snapprice_auth::RequestContext;

use crate::state::AppState;

/// Sentinel used when no address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Where a request came from.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client IP.
    pub ip: String,
    /// Raw `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// The audit context for this client.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(Some(self.ip.clone()), self.user_agent.clone())
    }
}

/// Resolve the client IP.
///
/// `X-Forwarded-For` is honoured only behind a trusted proxy, and only its
/// first hop is used.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers, &parts.extensions, state.config.server.trust_proxy);
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(Self { ip, user_agent })
    }
}
