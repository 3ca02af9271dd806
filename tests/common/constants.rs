//! Shared constants for end-to-end tests

/// Subject baked into minted test tokens
pub const TEST_SUBJECT: &str = "user-e2e";

/// Key id published in the stub issuer's JWKS
pub const TEST_KID: &str = "e2e-key-1";

/// Timeout for client requests in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long to wait for a spawned server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for readiness
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
