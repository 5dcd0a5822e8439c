//! Minimal JSON-RPC 2.0 client for readiness probes
//!
//! The network under test is a black box addressed only through this
//! boundary; the client validates the response envelope and hands back the
//! raw `result` value without interpreting it.

use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection failure, non-2xx status, or no response in time
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body is not a JSON-RPC 2.0 envelope
    #[error("invalid JSON-RPC envelope: {0}")]
    InvalidEnvelope(String),

    /// Well-formed JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    ErrorResponse { code: i64, message: String },
}

pub struct RpcClient {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl RpcClient {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            request_timeout,
        }
    }

    /// Issue one JSON-RPC call and return the `result` value.
    ///
    /// A response carrying an `error` object is returned as
    /// [`RpcError::ErrorResponse`]; the endpoint answered, it just rejected
    /// the method or params.
    pub async fn call(
        &self,
        endpoint: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        trace!(endpoint, method, "Issuing RPC call");
        let response = self
            .http
            .post(endpoint)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Value = response.json().await?;
        validate_envelope(&envelope)?;
        if let Some(error) = envelope.get("error") {
            return Err(RpcError::ErrorResponse {
                code: error["code"].as_i64().unwrap_or_default(),
                message: error["message"].as_str().unwrap_or_default().to_string(),
            });
        }
        Ok(envelope["result"].clone())
    }
}

/// Check that `envelope` is a valid JSON-RPC 2.0 response: version tag,
/// either a `result` with an `id`, or a well-formed `error` object.
pub fn validate_envelope(envelope: &Value) -> Result<(), RpcError> {
    let invalid = |reason: &str| RpcError::InvalidEnvelope(reason.to_string());
    let object = envelope.as_object().ok_or_else(|| invalid("not an object"))?;
    match object.get("jsonrpc").and_then(Value::as_str) {
        Some("2.0") => {}
        _ => return Err(invalid("missing or wrong jsonrpc version")),
    }
    if object.contains_key("result") {
        if !object.contains_key("id") {
            return Err(invalid("result without id"));
        }
        return Ok(());
    }
    if let Some(error) = object.get("error") {
        let error = error.as_object().ok_or_else(|| invalid("error is not an object"))?;
        if !error.get("code").is_some_and(Value::is_i64) {
            return Err(invalid("error without integer code"));
        }
        if !error.get("message").is_some_and(Value::is_string) {
            return Err(invalid("error without string message"));
        }
        return Ok(());
    }
    Err(invalid("neither result nor error present"))
}
