//! Request gate middleware for the solve routes.
//!
//! Runs before the multipart body is touched, so a rejected client costs no
//! validation or upstream work.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use mathlens_core::SolveError;
use tracing::warn;

use super::error::ApiError;
use super::state::AppState;

/// Count the request against the client's window or reject it with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let client = client_id(
        request.headers(),
        connect_info.map(|ConnectInfo(addr)| addr),
        state.trust_forwarded_for,
    );
    let key = format!("{client}|{}", request.uri().path());
    let decision = limiter.check(&key);

    if !decision.allowed {
        let retry_after = decision.retry_after;
        let retry_after_secs = (retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)).max(1);
        warn!(
            client = %client,
            path = %request.uri().path(),
            limit = decision.limit,
            retry_after_secs,
            "Rate limit exceeded"
        );
        return ApiError::new(
            SolveError::RateLimited {
                limit: limiter.limit(),
                window_secs: limiter.window().as_secs(),
                retry_after_secs,
            },
            state.expose_upstream_errors,
        )
        .into_response();
    }

    next.run(request).await
}

/// Identify the client: peer IP, or the first forwarded hop when trusted.
fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
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
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.7:51234".parse().unwrap())
    }

    #[test]
    fn test_client_id_uses_peer_ip_without_port() {
        assert_eq!(client_id(&HeaderMap::new(), peer(), false), "192.0.2.7");
    }

    #[test]
    fn test_client_id_ignores_forwarded_for_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        assert_eq!(client_id(&headers, peer(), false), "192.0.2.7");
    }

    #[test]
    fn test_client_id_trusts_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_id(&headers, peer(), true), "203.0.113.9");
    }

    #[test]
    fn test_client_id_unknown_without_peer() {
        assert_eq!(client_id(&HeaderMap::new(), None, true), "unknown");
    }
}
