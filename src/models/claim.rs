// src/models/claim.rs
//! Claim and schema data model.
//!
//! Defines the core structures exchanged between issuers, verifiers and
//! wallets: a [`Schema`] describing the attribute names a claim type carries,
//! and a [`Claim`] asserting attribute values about a subject DID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered attribute map of a claim.
///
/// Keys are attribute names, values are arbitrary JSON-serializable values.
/// A `BTreeMap` keeps the map independent of insertion order, which the
/// canonical claim hash relies on.
pub type ClaimAttributes = BTreeMap<String, Value>;

/// Claim schema metadata.
///
/// A schema is registered once under its unique `name` on the issuer's
/// contract and is immutable afterwards; re-registration under the same name
/// is rejected by the registry.
///
/// # Fields
/// - `name`: unique schema name, non-empty
/// - `attributes`: ordered list of attribute names, non-empty
/// - `revokable`: whether claims of this schema can be revoked
/// - `tx`: pending transaction reference of the registration, if known
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Unique schema name, e.g. "Passport"
    pub name: String,

    /// Attribute names a claim of this schema must carry
    pub attributes: Vec<String>,

    /// Whether claims of this schema can be revoked by the issuer
    pub revokable: bool,

    /// Transaction reference of the on-ledger registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,
}

/// A claim: a signed assertion of attribute values about a subject DID,
/// scoped to a schema.
///
/// `signature` is present iff the claim has been issued. `valid_from` and
/// `valid_to` bound the validity window; when both are present
/// `valid_from <= valid_to` must hold.
///
/// # Fields
/// - `id`: issuer-scoped unique claim identifier
/// - `issuer_did`: DID of the issuing entity, set at signing time
/// - `owner_did`: DID of the subject the claim is about
/// - `schema`: name of the schema this claim instantiates
/// - `attributes`: attribute name → JSON value
/// - `signature`: hex ECDSA signature over the canonical claim hash
/// - `tx`: transaction reference of the on-ledger injection, if issued
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claim {
    /// Issuer-scoped unique identifier
    /// Example: "TestClaim-1546871"
    pub id: String,

    /// DID of the claim issuer
    /// Example: "did:neo:AbcIssuer"
    #[serde(rename = "issuerDID", skip_serializing_if = "Option::is_none")]
    pub issuer_did: Option<String>,

    /// DID of the claim subject
    /// Example: "did:neo:AbcOwner"
    #[serde(rename = "ownerDID")]
    pub owner_did: String,

    /// Name of the schema this claim instantiates
    pub schema: String,

    /// Claim attributes as name → JSON value pairs
    pub attributes: ClaimAttributes,

    /// Hex-encoded signature over the canonical claim hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Transaction reference of the ledger injection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,

    /// Start of the validity window (inclusive)
    #[serde(rename = "validFrom", skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window (inclusive)
    #[serde(rename = "validTo", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl Claim {
    /// Builds an unsigned claim.
    ///
    /// `issuer_did`, `signature` and `tx` stay unset until the claim is
    /// signed and issued.
    pub fn new(
        id: impl Into<String>,
        schema: impl Into<String>,
        attributes: ClaimAttributes,
        owner_did: impl Into<String>,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Self {
        Claim {
            id: id.into(),
            issuer_did: None,
            owner_did: owner_did.into(),
            schema: schema.into(),
            attributes,
            signature: None,
            tx: None,
            valid_from,
            valid_to,
        }
    }

    /// True once the claim carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claim_serde_preserves_timestamps() {
        let valid_from = Utc::now();
        let mut attributes = ClaimAttributes::new();
        attributes.insert("age".to_string(), json!(30));

        let claim = Claim::new(
            "C1",
            "Passport",
            attributes,
            "did:neo:Abc",
            Some(valid_from),
            None,
        );

        let encoded = serde_json::to_string(&claim).unwrap();
        let decoded: Claim = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, claim);
        assert_eq!(decoded.valid_from, Some(valid_from));
    }

    #[test]
    fn unsigned_claim_has_no_issuer_fields() {
        let claim = Claim::new(
            "C1",
            "Passport",
            ClaimAttributes::new(),
            "did:neo:Abc",
            None,
            None,
        );
        assert!(!claim.is_signed());
        assert!(claim.issuer_did.is_none());
        assert!(claim.tx.is_none());
    }
}
