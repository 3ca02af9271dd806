//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with methods for the gateway's endpoints. When routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test gateway
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// `GET /mcp`: the server descriptor
    pub async fn descriptor(&self) -> Response {
        self.client
            .get(format!("{}/mcp", self.base_url))
            .send()
            .await
            .expect("descriptor request failed")
    }

    /// `POST /mcp` with a full JSON-RPC envelope
    pub async fn rpc(&self, method: &str, params: Value, token: Option<&str>) -> Response {
        self.rpc_raw(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }),
            token,
        )
        .await
    }

    /// `POST /mcp` with an arbitrary body
    pub async fn rpc_raw(&self, body: Value, token: Option<&str>) -> Response {
        let mut request = self
            .client
            .post(format!("{}/mcp", self.base_url))
            .json(&body);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.send().await.expect("rpc request failed")
    }

    /// `tools/call` convenience wrapper
    pub async fn call_tool(&self, name: &str, arguments: Value, token: Option<&str>) -> Response {
        self.rpc(
            "tools/call",
            json!({"name": name, "arguments": arguments}),
            token,
        )
        .await
    }

    /// `POST /v1/tools/{name}`: the legacy REST adapter
    pub async fn rest_tool(&self, name: &str, arguments: Value, token: Option<&str>) -> Response {
        let mut request = self
            .client
            .post(format!("{}/v1/tools/{}", self.base_url, name))
            .json(&arguments);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.send().await.expect("rest tool request failed")
    }

    /// `POST /v1/leagues/{league_id}/discover-seasons`
    pub async fn discover_seasons(
        &self,
        league_id: &str,
        body: Value,
        token: Option<&str>,
    ) -> Response {
        let mut request = self
            .client
            .post(format!(
                "{}/v1/leagues/{}/discover-seasons",
                self.base_url, league_id
            ))
            .json(&body);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.send().await.expect("discover request failed")
    }
}

/// Extract the text content of a tool result inside a JSON-RPC response body.
pub fn tool_text(body: &Value) -> String {
    body["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Whether the JSON-RPC tool result is flagged as a tool-level error.
pub fn tool_is_error(body: &Value) -> bool {
    body["result"]["is_error"].as_bool().unwrap_or(false)
}
