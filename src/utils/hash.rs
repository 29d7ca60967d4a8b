// src/utils/hash.rs
//! Canonical claim hashing.
//!
//! The claim hash is the message every claim signature is computed over, so
//! its serialization must be deterministic: identical claims must hash
//! identically regardless of attribute insertion order.

use crate::ledger::crypto::hash256;
use crate::models::claim::Claim;

/// Computes the canonical hash of a claim.
///
/// Builds a canonical string by concatenating, in fixed order: `id`,
/// `issuer_did` (empty if absent), `owner_did`, `schema`, the validity
/// bounds as epoch milliseconds (empty if absent), then each attribute key
/// in lexicographic order followed by the JSON serialization of its value.
/// No separators anywhere. The digest is the ledger's `hash256` of that
/// string, hex-encoded lower-case.
///
/// # Arguments
/// * `claim` - The claim to hash; `signature` and `tx` are not part of the hash
///
/// # Returns
/// Lower-case hex digest consumed by the signer
pub fn claim_hash(claim: &Claim) -> String {
    let mut canonical = String::new();

    canonical.push_str(&claim.id);
    if let Some(issuer_did) = &claim.issuer_did {
        canonical.push_str(issuer_did);
    }
    canonical.push_str(&claim.owner_did);
    canonical.push_str(&claim.schema);
    if let Some(valid_from) = claim.valid_from {
        canonical.push_str(&valid_from.timestamp_millis().to_string());
    }
    if let Some(valid_to) = claim.valid_to {
        canonical.push_str(&valid_to.timestamp_millis().to_string());
    }

    // BTreeMap iteration is already key-sorted.
    for (key, value) in &claim.attributes {
        canonical.push_str(key);
        canonical.push_str(
            &serde_json::to_string(value).expect("JSON value serialization cannot fail"),
        );
    }

    hex::encode(hash256(canonical.as_bytes()))
}
