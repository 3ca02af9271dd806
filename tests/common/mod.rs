//! Shared end-to-end test infrastructure

pub mod client;
pub mod constants;
pub mod issuer;
pub mod server;
pub mod stubs;

#[allow(unused_imports)]
pub use client::{tool_is_error, tool_text, TestClient};
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use issuer::TestIssuer;
#[allow(unused_imports)]
pub use server::{TestServer, TestServerOptions};
#[allow(unused_imports)]
pub use stubs::{football_league, StubStoreOptions, StubUpstreamOptions};
