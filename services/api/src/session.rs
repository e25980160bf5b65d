//! Bearer-token gate for the staff-only routes.
//!
//! Health checks, metrics, the treatment catalogue and the login route stay open.

use crate::infra::AppState;
use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use batho_pele::auth::SessionError;
use batho_pele::error::AppError;
use chrono::{NaiveDateTime, Utc};
use std::net::SocketAddr;
use tracing::warn;

pub(crate) async fn require_staff_session(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        warn!(path = %request.uri().path(), "staff route called without bearer token");
        return Err(SessionError::Missing.into());
    };

    let session = state
        .authenticator
        .authorize(token, auth_clock())
        .map_err(|err| {
            warn!(path = %request.uri().path(), "staff route called with unknown session");
            err
        })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Address used for the per-client lockout. `X-Forwarded-For` counts only when configured.
pub(crate) fn client_address(
    trust_forwarded_for: bool,
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub(crate) fn auth_clock() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn forwarded_header_is_ignored_unless_trusted() {
        let peer = ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 51000)));
        let headers = forwarded("10.0.0.9, 172.16.0.1");

        assert_eq!(
            client_address(false, &headers, Some(&peer)).as_deref(),
            Some("192.168.1.20")
        );
        assert_eq!(
            client_address(true, &headers, Some(&peer)).as_deref(),
            Some("10.0.0.9")
        );
        assert_eq!(client_address(false, &headers, None), None);
    }

    #[test]
    fn bearer_token_requires_the_bearer_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
