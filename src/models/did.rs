// src/models/did.rs
//! Decentralized Identifier (DID) codec.
//!
//! DIDs in this system have the fixed form `did:neo:<address>` where
//! `<address>` is a ledger account address. The codec is pure string
//! handling: it never validates the address against the ledger or any
//! cryptographic material.

use crate::error::{Error, Result};

/// Method prefix every DID must start with.
pub const DID_PREFIX: &str = "did:neo:";

/// Encodes a ledger address as a DID.
///
/// # Arguments
/// * `address` - Ledger account address
///
/// # Returns
/// DID string of the form `did:neo:<address>`
pub fn to_did(address: &str) -> String {
    format!("{}{}", DID_PREFIX, address)
}

/// Extracts the ledger address from a DID.
///
/// The address is the segment after the last `:`. Fails with
/// [`Error::InvalidDid`] when the string does not start with `did:neo:` or
/// when nothing follows the final colon (including the degenerate case where
/// the prefix is the entire string).
///
/// # Arguments
/// * `did` - DID string to parse
///
/// # Returns
/// Ledger account address of the DID owner
pub fn address_from_did(did: &str) -> Result<&str> {
    if !did.starts_with(DID_PREFIX) {
        return Err(Error::InvalidDid(did.to_string()));
    }

    // Everything after the last colon; tolerates an optional network
    // segment between the prefix and the address.
    let idx = did.rfind(':').expect("prefix guarantees a colon");
    let address = &did[idx + 1..];
    if address.is_empty() {
        return Err(Error::InvalidDid(did.to_string()));
    }

    Ok(address)
}
