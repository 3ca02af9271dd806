//! Tool-calling protocol types.
//!
//! The wire format is JSON-RPC 2.0 with the usual tool-calling method names
//! (`initialize`, `tools/list`, `tools/call`). Authentication challenges are
//! deliberately NOT protocol errors: they travel as HTTP 401 so caller
//! tooling can detect "go authenticate" without parsing the body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC version string
pub const JSONRPC_VERSION: &str = "2.0";

/// Tool-calling protocol version we support
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// ============================================================================
// Core Message Types
// ============================================================================

/// Incoming request envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Response envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

impl RpcResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Request ID can be string or number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

/// Error member of a response envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcErrorBody {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ============================================================================
// Error Codes
// ============================================================================

/// Protocol-level errors, mapped to stable JSON-RPC codes. These are never
/// retried by the gateway.
#[derive(Debug, Clone)]
pub enum RpcError {
    ParseError(String),
    InvalidRequest(String),
    MethodNotFound(String),
    InvalidParams(String),
    InternalError(String),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            RpcError::ParseError(_) => -32700,
            RpcError::InvalidRequest(_) => -32600,
            RpcError::MethodNotFound(_) => -32601,
            RpcError::InvalidParams(_) => -32602,
            RpcError::InternalError(_) => -32603,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RpcError::ParseError(msg) => format!("Parse error: {}", msg),
            RpcError::InvalidRequest(msg) => format!("Invalid request: {}", msg),
            RpcError::MethodNotFound(method) => format!("Method not found: {}", method),
            RpcError::InvalidParams(msg) => format!("Invalid params: {}", msg),
            RpcError::InternalError(msg) => format!("Internal error: {}", msg),
        }
    }
}

impl From<RpcError> for RpcErrorBody {
    fn from(err: RpcError) -> Self {
        RpcErrorBody {
            code: err.code(),
            message: err.message(),
            data: None,
        }
    }
}

// ============================================================================
// Authentication Challenges
// ============================================================================

/// JSON-RPC code carried by 401 challenge bodies.
pub const AUTH_ERROR_CODE: i32 = -32001;

/// The two distinct 401 challenges. Callers must treat "never authenticated"
/// and "token rejected" differently: the latter forces a fresh authorization
/// flow instead of a silent retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChallenge {
    /// No token presented on an auth-required method.
    Unauthorized,
    /// A token was presented and rejected, or a downstream service reported
    /// the session is no longer valid.
    InvalidToken,
}

impl AuthChallenge {
    pub fn descriptor(&self) -> &'static str {
        match self {
            AuthChallenge::Unauthorized => "unauthorized",
            AuthChallenge::InvalidToken => "invalid_token",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthChallenge::Unauthorized => "Authentication required",
            AuthChallenge::InvalidToken => "Session is no longer valid, please re-authenticate",
        }
    }

    /// `WWW-Authenticate` header value, naming where to authenticate.
    pub fn www_authenticate(&self, authorization_url: &str) -> String {
        match self {
            AuthChallenge::Unauthorized => format!(
                "Bearer realm=\"fantasy-gateway\", resource_metadata=\"{}\"",
                authorization_url
            ),
            AuthChallenge::InvalidToken => format!(
                "Bearer realm=\"fantasy-gateway\", error=\"invalid_token\", resource_metadata=\"{}\"",
                authorization_url
            ),
        }
    }

    /// Challenge body: a JSON-RPC error whose metadata names the
    /// authentication discovery URL.
    pub fn body(&self, id: Option<RequestId>, authorization_url: &str) -> RpcResponse {
        RpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(RpcErrorBody {
                code: AUTH_ERROR_CODE,
                message: self.message().to_string(),
                data: Some(serde_json::json!({
                    "error": self.descriptor(),
                    "authorization_url": authorization_url,
                })),
            }),
        }
    }
}

// ============================================================================
// Method Names
// ============================================================================

pub mod methods {
    // Lifecycle
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";

    // Tools
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";

    // Ping
    pub const PING: &str = "ping";
}

// ============================================================================
// Initialize Messages
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

// ============================================================================
// Tools Messages
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
    /// Marks the catalog as bearer-protected and names the discovery URL.
    pub security: SecurityRequirement,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityRequirement {
    pub scheme: &'static str,
    pub authorization_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolsCallResult {
    pub content: Vec<ToolResultContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolResultContent {
    Text { text: String },
}

impl ToolsCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text { text: text.into() }],
            is_error: None,
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string_pretty(value)?;
        Ok(Self::text(text))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

// ============================================================================
// Ping
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {}
