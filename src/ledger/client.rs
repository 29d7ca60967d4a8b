// src/ledger/client.rs
//! Ledger client abstraction and its JSON-RPC implementation.
//!
//! Contract wrappers talk to the ledger exclusively through the
//! [`LedgerClient`] trait: a read-only invocation returning a raw
//! [`InvocationResult`], and a signed state-changing invocation returning a
//! pending transaction reference. Mutations are fire-and-commit: the returned
//! reference does not mean the effect is queryable yet. Callers must await
//! ledger confirmation themselves before relying on it.

use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::ledger::crypto;

/// Raw outcome of a contract invocation.
///
/// Carries a success flag, the unmodified error string reported by the node
/// (when any), and the first value of the result stack (when any). Error text
/// is passed through untouched so callers can distinguish transport failures
/// from genuine "not found" answers.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Whether the invocation halted successfully
    pub success: bool,
    /// Raw error string from the node, if the invocation faulted
    pub error: Option<String>,
    /// First item of the result stack, if present
    pub value: Option<Value>,
}

/// Transport seam between the contract clients and the ledger.
///
/// Implementations are transport-specific; the SDK ships a JSON-RPC client
/// ([`RpcLedgerClient`]) and the tests use an in-memory ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Invokes a read-only contract operation.
    ///
    /// # Arguments
    /// * `contract` - Script hash of the target contract
    /// * `operation` - Operation name within the contract
    /// * `params` - Positional operation parameters
    async fn invoke_read(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
    ) -> Result<InvocationResult>;

    /// Builds, signs and submits a state-changing invocation.
    ///
    /// Returns the pending transaction reference. The mutation becomes
    /// observable only after ledger confirmation; this client neither waits
    /// nor polls for it.
    ///
    /// # Arguments
    /// * `contract` - Script hash of the target contract
    /// * `operation` - Operation name within the contract
    /// * `params` - Positional operation parameters
    /// * `signing_key` - Hex private key signing the invocation
    /// * `gas` - Additional gas to attach, if any
    async fn invoke_and_submit(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
        signing_key: &str,
        gas: Option<u64>,
    ) -> Result<String>;
}

/// JSON-RPC ledger client.
///
/// Speaks the node's `invokefunction` / `submitinvocation` methods over
/// HTTP. Parameter encoding beyond plain JSON values is the node's concern,
/// not this client's.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    url: String,
}

impl RpcLedgerClient {
    /// Creates a client for the node at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        RpcLedgerClient {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        debug!("rpc {} -> {}", method, self.url);
        let response: Value = self.http.post(&self.url).json(&body).send().await?.json().await?;
        Ok(response)
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn invoke_read(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
    ) -> Result<InvocationResult> {
        let response = self
            .call("invokefunction", json!([contract, operation, params]))
            .await?;

        // Protocol-level error object: surface its message as the raw error.
        if let Some(err) = response.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("rpc error")
                .to_string();
            return Ok(InvocationResult {
                success: false,
                error: Some(message),
                value: Some(err.clone()),
            });
        }

        let result = response.get("result").cloned().unwrap_or(Value::Null);
        let state = result.get("state").and_then(Value::as_str).unwrap_or("");
        let success = state.starts_with("HALT");
        let error = result
            .get("exception")
            .and_then(Value::as_str)
            .map(String::from);
        let value = result
            .get("stack")
            .and_then(|stack| stack.get(0))
            .cloned();

        Ok(InvocationResult {
            success,
            error,
            value,
        })
    }

    async fn invoke_and_submit(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
        signing_key: &str,
        gas: Option<u64>,
    ) -> Result<String> {
        let envelope = json!({
            "contract": contract,
            "operation": operation,
            "params": params,
            "gas": gas.unwrap_or(0),
        });

        let payload = serde_json::to_string(&envelope)?;
        let signature = crypto::sign(payload.as_bytes(), signing_key)?;
        let public_key = crypto::public_key_from_private(signing_key)?;

        let response = self
            .call("submitinvocation", json!([envelope, signature, public_key]))
            .await?;

        if let Some(err) = response.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("rpc error")
                .to_string();
            return Err(Error::LedgerOperationFailed {
                message,
                raw: Some(err.clone()),
            });
        }

        // Nodes answer either with a bare tx hash or a { "hash": ... } object.
        let result = response.get("result").cloned().unwrap_or(Value::Null);
        let tx = result
            .as_str()
            .map(String::from)
            .or_else(|| {
                result
                    .get("hash")
                    .and_then(Value::as_str)
                    .map(String::from)
            })
            .ok_or_else(|| {
                Error::UnexpectedResponse("submitinvocation returned no transaction hash".into())
            })?;

        debug!("submitted {}::{} as {}", contract, operation, tx);
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, Matcher};

    // The mock server is shared between tests, so every mock matches on the
    // operation name inside the request body.
    #[tokio::test]
    async fn invoke_read_parses_halt_state() {
        let _m = mock("POST", "/")
            .match_body(Matcher::Regex("IsValidClaim".to_string()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"state":"HALT","stack":[{"type":"Boolean","value":true}]}}"#,
            )
            .create();

        let client = RpcLedgerClient::new(mockito::server_url());
        let result = client
            .invoke_read("0xabc", "IsValidClaim", &[Value::from("C1")])
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.value.unwrap()["value"], Value::Bool(true));
    }

    #[tokio::test]
    async fn invoke_read_surfaces_fault_exception() {
        let _m = mock("POST", "/")
            .match_body(Matcher::Regex("GetSchemaDetails".to_string()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"state":"FAULT","exception":"Schema not found","stack":[]}}"#,
            )
            .create();

        let client = RpcLedgerClient::new(mockito::server_url());
        let result = client
            .invoke_read("0xabc", "GetSchemaDetails", &[Value::from("Missing")])
            .await
            .unwrap();

        assert!(!result.success);
        // Raw node error text must come through unmodified.
        assert_eq!(result.error.as_deref(), Some("Schema not found"));
    }

    #[tokio::test]
    async fn submit_returns_transaction_hash() {
        let _m = mock("POST", "/")
            .match_body(Matcher::Regex("InjectClaim".to_string()))
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"hash":"0xfeed"}}"#)
            .create();

        let pair = crypto::generate_key_pair().unwrap();
        let client = RpcLedgerClient::new(mockito::server_url());
        let tx = client
            .invoke_and_submit("0xabc", "InjectClaim", &[Value::from("C1")], &pair.private_key, None)
            .await
            .unwrap();

        assert_eq!(tx, "0xfeed");
    }

    #[tokio::test]
    async fn submit_error_becomes_ledger_operation_failed() {
        let _m = mock("POST", "/")
            .match_body(Matcher::Regex("RegisterSchema".to_string()))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds"}}"#,
            )
            .create();

        let pair = crypto::generate_key_pair().unwrap();
        let client = RpcLedgerClient::new(mockito::server_url());
        let err = client
            .invoke_and_submit("0xabc", "RegisterSchema", &[Value::from("Passport")], &pair.private_key, None)
            .await
            .unwrap_err();

        match err {
            Error::LedgerOperationFailed { message, raw } => {
                assert_eq!(message, "insufficient funds");
                assert!(raw.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
