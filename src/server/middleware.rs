//! Request middleware: request ids and LAN-only access.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;
use uuid::Uuid;

use super::AppError;

/// Header name used for the request identifier.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Middleware that generates or extracts a request ID.
///
/// The id is recorded on a span wrapping the rest of the request and echoed
/// back in the response headers.
pub async fn request_id_middleware(
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), val);
    }

    response
}

/// Reject peers outside the local network with 403.
///
/// Requests that carry no connection info (for example when the router is
/// driven in-process) are let through.
pub async fn lan_only_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(ip) if !is_local_address(ip) => {
            tracing::warn!(peer = %ip, "Rejected non-local client");
            AppError::new(reelhouse_common::Error::Forbidden(
                "Access is limited to the local network".to_string(),
            ))
            .into_response()
        }
        _ => next.run(request).await,
    }
}

/// Loopback, private, link-local and unique-local addresses.
pub fn is_local_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_local_address(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            v6.is_loopback()
                // fc00::/7
                || (first & 0xfe00) == 0xfc00
                // fe80::/10
                || (first & 0xffc0) == 0xfe80
        }
    }
}
