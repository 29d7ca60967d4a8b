// src/ledger/mock.rs
//! In-memory ledger used by the unit tests.
//!
//! Implements [`LedgerClient`] over plain hash maps, dispatching on contract
//! script hash and operation name. Mutations take effect immediately (no
//! confirmation delay), and every invocation is counted per operation so
//! tests can assert that a pipeline stage was, or was not, reached.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::ledger::client::{InvocationResult, LedgerClient};

/// Script hash the mock answers issuer-contract operations on.
pub const ISSUER_CONTRACT: &str = "0x1ssuer";
/// Script hash the mock answers root-of-trust operations on.
pub const ROT_CONTRACT: &str = "0xr00t";

#[derive(Default)]
struct MockState {
    schemas: HashMap<String, Value>,
    valid_claims: HashMap<String, bool>,
    trusted: HashSet<(String, String)>,
}

/// Scripted two-contract ledger.
pub struct MockLedger {
    pub issuer_name: String,
    pub issuer_did: String,
    pub issuer_public_key: String,
    pub rot_name: String,
    pub rot_did: String,
    state: Mutex<MockState>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockLedger {
    pub fn new(issuer_did: &str, issuer_public_key: &str) -> Self {
        MockLedger {
            issuer_name: "Test Issuer".to_string(),
            issuer_did: issuer_did.to_string(),
            issuer_public_key: issuer_public_key.to_string(),
            rot_name: "Test Root of Trust".to_string(),
            rot_did: "did:neo:rot".to_string(),
            state: Mutex::new(MockState::default()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Number of invocations (reads and submissions) of an operation.
    pub fn call_count(&self, operation: &str) -> usize {
        *self.calls.lock().unwrap().get(operation).unwrap_or(&0)
    }

    fn record_call(&self, operation: &str) {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_insert(0) += 1;
    }

    fn ok(value: Value) -> InvocationResult {
        InvocationResult {
            success: true,
            error: None,
            value: Some(value),
        }
    }

    fn fault(message: &str) -> InvocationResult {
        InvocationResult {
            success: false,
            error: Some(message.to_string()),
            value: None,
        }
    }

    fn param_str(params: &[Value], index: usize) -> String {
        params
            .get(index)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn invoke_read(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
    ) -> Result<InvocationResult> {
        self.record_call(operation);
        let state = self.state.lock().unwrap();

        let result = match (contract, operation) {
            (ISSUER_CONTRACT, "Name") => Self::ok(json!(self.issuer_name)),
            (ISSUER_CONTRACT, "DID") => Self::ok(json!(self.issuer_did)),
            (ISSUER_CONTRACT, "PublicKey") => Self::ok(json!(self.issuer_public_key)),
            (ISSUER_CONTRACT, "GetSchemaDetails") => {
                let name = Self::param_str(params, 0);
                match state.schemas.get(&name) {
                    Some(schema) => Self::ok(schema.clone()),
                    None => Self::fault("Schema not found"),
                }
            }
            (ISSUER_CONTRACT, "IsValidClaim") => {
                let id = Self::param_str(params, 0);
                Self::ok(json!(state.valid_claims.get(&id) == Some(&true)))
            }
            (ROT_CONTRACT, "Name") => Self::ok(json!(self.rot_name)),
            (ROT_CONTRACT, "DID") => Self::ok(json!(self.rot_did)),
            (ROT_CONTRACT, "IsTrusted") => {
                let pair = (Self::param_str(params, 0), Self::param_str(params, 1));
                Self::ok(json!(state.trusted.contains(&pair)))
            }
            // Read-only rehearsal of the trust mutations.
            (ROT_CONTRACT, "RegisterIssuer") | (ROT_CONTRACT, "DeactivateIssuer") => {
                Self::ok(Value::Null)
            }
            _ => Self::fault("unknown operation"),
        };

        Ok(result)
    }

    async fn invoke_and_submit(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
        _signing_key: &str,
        _gas: Option<u64>,
    ) -> Result<String> {
        self.record_call(operation);
        let mut state = self.state.lock().unwrap();

        match (contract, operation) {
            (ISSUER_CONTRACT, "RegisterSchema") => {
                let name = Self::param_str(params, 0);
                if state.schemas.contains_key(&name) {
                    return Err(Error::LedgerOperationFailed {
                        message: "Schema already exists".to_string(),
                        raw: None,
                    });
                }
                let schema = json!({
                    "name": name,
                    "attributes": params.get(1).cloned().unwrap_or(json!([])),
                    "revokable": params.get(2).and_then(Value::as_bool).unwrap_or(false),
                });
                state.schemas.insert(name, schema);
            }
            (ISSUER_CONTRACT, "InjectClaim") => {
                let id = Self::param_str(params, 0);
                state.valid_claims.insert(id, true);
            }
            (ISSUER_CONTRACT, "RevokeClaim") => {
                let id = Self::param_str(params, 0);
                state.valid_claims.insert(id, false);
            }
            (ROT_CONTRACT, "RegisterIssuer") => {
                let pair = (Self::param_str(params, 0), Self::param_str(params, 1));
                state.trusted.insert(pair);
            }
            (ROT_CONTRACT, "DeactivateIssuer") => {
                let pair = (Self::param_str(params, 0), Self::param_str(params, 1));
                state.trusted.remove(&pair);
            }
            _ => {
                return Err(Error::LedgerOperationFailed {
                    message: format!("unknown operation {}", operation),
                    raw: None,
                })
            }
        }

        let tx_number = self.calls.lock().unwrap().values().sum::<usize>();
        Ok(format!("0xtx{}", tx_number))
    }
}
