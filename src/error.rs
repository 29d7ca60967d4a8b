// src/error.rs
//! Error types used across the claims SDK.
//!
//! Every failure the library can report is a variant of [`Error`]. Validation
//! stages report their own kind so callers (and tests) can tell a bad
//! signature apart from a revoked claim or a closed validity window.

use serde_json::Value;

/// Errors raised by claim, wallet and ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A claim is missing fields required before signing or verifying
    /// (signature, issuer DID or owner DID).
    #[error("claim is missing required fields")]
    MalformedClaim,

    /// A DID string does not have the `did:neo:<address>` form.
    #[error("{0} is not a valid DID")]
    InvalidDid(String),

    /// The claim signature does not match the canonical claim hash under the
    /// issuer's public key.
    #[error("claim signature verification failed")]
    SignatureInvalid,

    /// The claim's issuer DID differs from the registry's canonical issuer DID.
    #[error("claim issuer DID does not match the registry issuer DID")]
    IssuerMismatch,

    /// The current time lies outside the claim's validity window.
    #[error("claim is expired or not yet valid")]
    ExpiredOrNotYetValid,

    /// The ledger's validity registry does not report the claim as valid,
    /// either because it was revoked or never injected.
    #[error("claim {0} is revoked or unknown to the registry")]
    ClaimRevokedOrUnknown(String),

    /// The caller-supplied predicate over the claim's attributes returned false.
    #[error("custom claim validation failed")]
    CustomValidationFailed,

    /// The claim's attributes do not match the registered schema.
    #[error("claim attributes do not match schema {0}")]
    SchemaMismatch(String),

    /// `Wallet::add_claim` found no account for the claim's owner DID.
    #[error("DID account {0} is not a part of this wallet, add the account first")]
    UnknownOwnerAccount(String),

    /// A contract invocation came back non-successful. Carries the raw error
    /// string and, when present, the raw structured result so callers can
    /// distinguish transport failures from genuine not-found answers.
    #[error("ledger operation failed: {message}")]
    LedgerOperationFailed {
        message: String,
        raw: Option<Value>,
    },

    /// A contract read returned a value of an unexpected shape.
    #[error("unexpected ledger response: {0}")]
    UnexpectedResponse(String),

    /// Key material could not be parsed, derived, sealed or unsealed.
    /// Also reported when a wrong password is supplied on decrypt.
    #[error("key operation failed: {0}")]
    KeyCrypto(String),

    /// The account is encrypted and the requested operation needs the
    /// private key.
    #[error("account {0} is encrypted, decrypt it first")]
    AccountLocked(String),

    /// JSON (de)serialization failure, e.g. on wallet import.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level RPC failure.
    #[error("rpc transport error: {0}")]
    Rpc(#[from] reqwest::Error),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
