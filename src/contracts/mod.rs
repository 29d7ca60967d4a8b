// src/contracts/mod.rs
//! Smart-contract clients.
//!
//! One wrapper struct per deployed contract, sharing the [`LedgerClient`]
//! transport seam: [`issuer_registry::IssuerRegistry`] for the issuer's
//! schema/claim contract and [`root_of_trust::RootOfTrust`] for the trust
//! oracle. This module holds the operation-name tables and the invocation
//! result extraction both wrappers use.

pub mod issuer_registry;
pub mod root_of_trust;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::ledger::client::{InvocationResult, LedgerClient};

/// Operation names in the issuer's smart contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerOperation {
    GetSchemaDetails,
    RegisterSchema,
    InjectClaim,
    RevokeClaim,
    IsValidClaim,
    PublicKey,
    Name,
    Did,
}

impl IssuerOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            IssuerOperation::GetSchemaDetails => "GetSchemaDetails",
            IssuerOperation::RegisterSchema => "RegisterSchema",
            IssuerOperation::InjectClaim => "InjectClaim",
            IssuerOperation::RevokeClaim => "RevokeClaim",
            IssuerOperation::IsValidClaim => "IsValidClaim",
            IssuerOperation::PublicKey => "PublicKey",
            IssuerOperation::Name => "Name",
            IssuerOperation::Did => "DID",
        }
    }
}

/// Operation names in the root-of-trust smart contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOfTrustOperation {
    Name,
    Did,
    IsTrusted,
    RegisterIssuer,
    DeactivateIssuer,
}

impl RootOfTrustOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            RootOfTrustOperation::Name => "Name",
            RootOfTrustOperation::Did => "DID",
            RootOfTrustOperation::IsTrusted => "IsTrusted",
            RootOfTrustOperation::RegisterIssuer => "RegisterIssuer",
            RootOfTrustOperation::DeactivateIssuer => "DeactivateIssuer",
        }
    }
}

/// Turns a raw invocation result into its stack value, or the ledger error.
///
/// The raw error string travels unmodified inside
/// [`Error::LedgerOperationFailed`] so callers can tell a transport problem
/// from a genuine contract-side "not found".
pub(crate) fn expect_success(result: InvocationResult) -> Result<Option<Value>> {
    if result.success {
        Ok(result.value)
    } else {
        Err(Error::LedgerOperationFailed {
            message: result
                .error
                .unwrap_or_else(|| "contract invocation failed".to_string()),
            raw: result.value,
        })
    }
}

/// Unwraps a node-typed stack item (`{"type": ..., "value": ...}`) to its
/// inner value; plain values pass through untouched.
pub(crate) fn decode_stack_item(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("value") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Reads a string-valued contract operation.
pub(crate) async fn read_string(
    client: &dyn LedgerClient,
    contract: &str,
    operation: &str,
    params: &[Value],
) -> Result<String> {
    let value = read_value(client, contract, operation, params).await?;
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| Error::UnexpectedResponse(format!("{} did not return a string", operation)))
}

/// Reads a bool-valued contract operation.
pub(crate) async fn read_bool(
    client: &dyn LedgerClient,
    contract: &str,
    operation: &str,
    params: &[Value],
) -> Result<bool> {
    let value = read_value(client, contract, operation, params).await?;
    value
        .as_bool()
        .ok_or_else(|| Error::UnexpectedResponse(format!("{} did not return a boolean", operation)))
}

pub(crate) async fn read_value(
    client: &dyn LedgerClient,
    contract: &str,
    operation: &str,
    params: &[Value],
) -> Result<Value> {
    let result = client.invoke_read(contract, operation, params).await?;
    let value = expect_success(result)?
        .ok_or_else(|| Error::UnexpectedResponse(format!("{} returned an empty stack", operation)))?;
    Ok(decode_stack_item(value))
}
