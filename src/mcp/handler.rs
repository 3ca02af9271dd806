//! Protocol endpoint handlers.
//!
//! One logical endpoint: `GET` serves the server descriptor, `POST` accepts
//! JSON-RPC 2.0 envelopes. Protocol errors always travel inside a well-formed
//! envelope with HTTP 200; only the two authentication challenges use HTTP
//! 401, so caller tooling can detect "go authenticate" without parsing the
//! body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use tracing::debug;

use super::protocol::{
    methods, AuthChallenge, InitializeResult, PingResult, RequestId, RpcError, RpcResponse,
    SecurityRequirement, ServerCapabilities, ServerInfo, ToolsCapability, ToolsListResult,
    PROTOCOL_VERSION,
};
use crate::auth::RequestAuth;
use crate::resolver::ToolExecution;
use crate::server::state::ServerState;

fn format_uptime(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// `GET` on the endpoint: server identity plus the authentication hint.
pub async fn descriptor(State(state): State<ServerState>) -> Json<Value> {
    Json(serde_json::json!({
        "name": state.config.server_name,
        "version": state.server_version,
        "uptime": format_uptime(state.start_time.elapsed()),
        "protocol_version": PROTOCOL_VERSION,
        "authentication": {
            "scheme": "bearer",
            "authorization_url": state.config.authorization_url,
        },
    }))
}

/// `POST` on the endpoint: one JSON-RPC envelope per request.
pub async fn rpc_endpoint(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return envelope(RpcResponse::error(None, RpcError::ParseError(err.to_string())))
        }
    };

    // The id is salvaged before envelope validation so even rejections can
    // echo it back.
    let id: Option<RequestId> = value
        .get("id")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok());

    if value.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return envelope(RpcResponse::error(
            id,
            RpcError::InvalidRequest("jsonrpc must be \"2.0\"".to_string()),
        ));
    }

    let method = match value.get("method").and_then(Value::as_str) {
        Some(method) => method.to_string(),
        None => {
            return envelope(RpcResponse::error(
                id,
                RpcError::InvalidRequest("method must be a string".to_string()),
            ))
        }
    };

    let params = value.get("params").cloned();

    debug!("Dispatching {} (id {:?})", method, id);

    match method.as_str() {
        methods::INITIALIZE => envelope(RpcResponse::success(id, initialize_result(&state))),
        methods::INITIALIZED => {
            // Notification: acknowledged without a response body.
            StatusCode::ACCEPTED.into_response()
        }
        methods::PING => match serde_json::to_value(PingResult {}) {
            Ok(result) => envelope(RpcResponse::success(id, result)),
            Err(err) => envelope(RpcResponse::error(
                id,
                RpcError::InternalError(err.to_string()),
            )),
        },
        methods::TOOLS_LIST => envelope(RpcResponse::success(id, tools_list_result(&state))),
        methods::TOOLS_CALL => handle_tools_call(&state, &headers, id, params).await,
        other => envelope(RpcResponse::error(
            id,
            RpcError::MethodNotFound(other.to_string()),
        )),
    }
}

fn initialize_result(state: &ServerState) -> Value {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: state.config.server_name.clone(),
            version: state.server_version.clone(),
        },
    };
    serde_json::to_value(result).unwrap_or_else(|_| serde_json::json!({}))
}

fn tools_list_result(state: &ServerState) -> Value {
    let result = ToolsListResult {
        tools: state.executor.registry().definitions(),
        security: SecurityRequirement {
            scheme: "bearer",
            authorization_url: state.config.authorization_url.clone(),
        },
    };
    serde_json::to_value(result).unwrap_or_else(|_| serde_json::json!({}))
}

async fn handle_tools_call(
    state: &ServerState,
    headers: &HeaderMap,
    id: Option<RequestId>,
    params: Option<Value>,
) -> Response {
    // Authentication comes first: even an unknown tool name gets the
    // challenge when no token is present.
    let (identity, bearer) = match state
        .verifier
        .authenticate(headers, state.config.dev_insecure_identity)
        .await
    {
        RequestAuth::Verified { identity, bearer } => (identity, bearer),
        RequestAuth::Missing => {
            return challenge(AuthChallenge::Unauthorized, id, state);
        }
        RequestAuth::Rejected(err) => {
            debug!("Bearer token rejected: {}", err.reason_code());
            return challenge(AuthChallenge::InvalidToken, id, state);
        }
    };

    let params = match params {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return envelope(RpcResponse::error(
                id,
                RpcError::InvalidParams("params must be an object".to_string()),
            ))
        }
        None => {
            return envelope(RpcResponse::error(
                id,
                RpcError::InvalidParams("Missing params".to_string()),
            ))
        }
    };

    let tool_name = match params.get("name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => {
            return envelope(RpcResponse::error(
                id,
                RpcError::InvalidParams("name must be a string".to_string()),
            ))
        }
    };

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => serde_json::json!({}),
        Some(value @ Value::Object(_)) => value.clone(),
        Some(_) => {
            return envelope(RpcResponse::error(
                id,
                RpcError::InvalidParams("arguments must be an object".to_string()),
            ))
        }
    };

    match state
        .executor
        .execute(&tool_name, arguments, &identity, bearer.as_deref())
        .await
    {
        ToolExecution::Completed(result) => match serde_json::to_value(&result) {
            Ok(value) => envelope(RpcResponse::success(id, value)),
            Err(err) => envelope(RpcResponse::error(
                id,
                RpcError::InternalError(err.to_string()),
            )),
        },
        ToolExecution::Protocol(err) => envelope(RpcResponse::error(id, err)),
        ToolExecution::AuthInvalid => challenge(AuthChallenge::InvalidToken, id, state),
    }
}

fn envelope(response: RpcResponse) -> Response {
    Json(response).into_response()
}

/// HTTP 401 with `WWW-Authenticate` and a JSON-RPC error body naming the
/// authentication discovery URL.
pub fn challenge(kind: AuthChallenge, id: Option<RequestId>, state: &ServerState) -> Response {
    let authorization_url = &state.config.authorization_url;
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            kind.www_authenticate(authorization_url),
        )],
        Json(kind.body(id, authorization_url)),
    )
        .into_response()
}
