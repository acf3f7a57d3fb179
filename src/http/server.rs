//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::router;
use crate::error::Result;
use crate::ratelimit::ThrottleGuard;

/// HTTP server fronting the throttled routes.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// Guard applied to every request
    guard: ThrottleGuard,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, guard: ThrottleGuard) -> Self {
        Self { addr, guard }
    }

    /// Get the configured bind address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            error!(addr = %self.addr, error = %e, "Failed to bind HTTP listener");
            e
        })?;

        Self::serve_listener(listener, router(self.guard), signal).await
    }

    /// Serve `app` on an already bound listener until `signal` resolves.
    pub async fn serve_listener<F>(listener: TcpListener, app: Router, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %listener.local_addr()?,
            "Starting HTTP server with graceful shutdown"
        );

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                e.into()
            })
    }
}
