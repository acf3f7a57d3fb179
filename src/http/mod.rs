//! HTTP surface: routes, the throttling interceptor and the listener.

mod middleware;
mod server;

pub use middleware::throttle;
pub use server::HttpServer;

use axum::{middleware::from_fn_with_state, routing::any, Router};

use crate::ratelimit::ThrottleGuard;

/// Put `routes` behind `guard`.
pub fn throttled(routes: Router, guard: ThrottleGuard) -> Router {
    routes.layer(from_fn_with_state(guard, throttle))
}

/// The service router: every path and method answers `OK` once admitted.
pub fn router(guard: ThrottleGuard) -> Router {
    let routes = Router::new()
        .route("/", any(ok))
        .route("/{*path}", any(ok));
    throttled(routes, guard)
}

async fn ok() -> &'static str {
    "OK"
}
