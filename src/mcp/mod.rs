//! Tool-calling protocol layer.
//!
//! Exposes the gateway's tools to AI assistants over JSON-RPC 2.0.
//!
//! ## Architecture
//!
//! - Transport: HTTP at `/mcp` (`GET` descriptor, `POST` envelope)
//! - Auth: bearer tokens verified per request; 401 challenges carry a
//!   machine-readable "where to authenticate" URL
//! - Tools: read-only, resolved against the caller's stored leagues

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use protocol::{AuthChallenge, RpcError, RpcRequest, RpcResponse};
pub use registry::ToolRegistry;
