//! Axum interceptor that throttles every request by peer address.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::ratelimit::{ThrottleGuard, TooManyRequests};

impl IntoResponse for TooManyRequests {
    fn into_response(self) -> Response {
        StatusCode::TOO_MANY_REQUESTS.into_response()
    }
}

/// Throttle a request by the transport peer address (`ip:port`), used verbatim.
///
/// Forwarding headers such as `X-Forwarded-For` are not consulted.
#[instrument(
    skip_all,
    fields(
        client = %addr,
        method = %request.method(),
        path = %request.uri().path()
    )
)]
pub async fn throttle(
    State(guard): State<ThrottleGuard>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let identity = addr.to_string();
    let now = guard.now();

    guard
        .handle(&identity, now, request, |req| next.run(req))
        .await
        .into_response()
}
