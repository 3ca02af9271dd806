//! Adds a random delay in front of every route. Dev feature for exercising
//! client-side timeout handling against a slow gateway.

use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use std::time::Duration;

const MAX_SLOWDOWN_MS: u64 = 1500;

pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    // Derive a cheap pseudo-random delay from the clock; good enough for a
    // dev feature, no RNG dependency needed.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    let delay = nanos % MAX_SLOWDOWN_MS;
    tokio::time::sleep(Duration::from_millis(delay)).await;
    next.run(request).await
}
