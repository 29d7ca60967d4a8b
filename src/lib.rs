// src/lib.rs

//! # Verifiable-Claims SDK
//!
//! Issuance, verification and storage of signed claims on a permissioned
//! ledger, with identities expressed as `did:neo:<address>` DIDs.
//!
//! ## Architecture Overview
//! 1. **Ledger Layer**: [`ledger::client::LedgerClient`] transport seam with
//!    a JSON-RPC implementation, plus the cryptographic collaborator
//!    (`hash256`, ECDSA, password-based key encryption)
//! 2. **Contracts Layer**: wrappers for the issuer's schema/claim contract
//!    and the root-of-trust contract
//! 3. **Services Layer**: [`services::issuer::Issuer`] (create, sign, issue)
//!    and [`services::verifier::Verifier`] (offline check, issuer binding,
//!    five-stage validation pipeline)
//! 4. **Wallet Layer**: encrypted multi-account store indexing claims by
//!    owner DID, with lossless export/import
//!
//! Ledger mutations are fire-and-commit: they return a pending transaction
//! reference and their effects become queryable only after the ledger's
//! confirmation delay. The SDK neither polls nor retries; awaiting
//! confirmation is the caller's responsibility.

pub mod config;
pub mod contracts;
pub mod error;
pub mod ledger;
pub mod models;
pub mod services;
pub mod utils;
pub mod wallet;

pub use config::Settings;
pub use contracts::issuer_registry::IssuerRegistry;
pub use contracts::root_of_trust::RootOfTrust;
pub use error::{Error, Result};
pub use ledger::client::{InvocationResult, LedgerClient, RpcLedgerClient};
pub use ledger::crypto::{EncryptedKey, KeyPair};
pub use models::claim::{Claim, ClaimAttributes, Schema};
pub use models::did::{address_from_did, to_did, DID_PREFIX};
pub use services::issuer::Issuer;
pub use services::verifier::Verifier;
pub use utils::hash::claim_hash;
pub use wallet::account::{Account, KeyRecord};
pub use wallet::wallet::Wallet;
