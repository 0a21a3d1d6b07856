//! Request logging and CORS.

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Log method, URI, and remote address before dispatching the request.
pub async fn log_request(req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!("[{}] {} from {}", req.method(), req.uri(), remote);
    next.run(req).await
}

/// Allow every origin, method, and header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
