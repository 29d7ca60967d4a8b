// src/services/verifier.rs
//! Claim verification service.
//!
//! Runs the multi-stage validation pipeline over a claim:
//!
//! 1. **Window check**: the current time lies inside the validity window.
//! 2. **Issuer binding**: the claim's issuer DID matches the registry's
//!    canonical issuer DID.
//! 3. **Offline verification**: structural checks plus the ECDSA signature
//!    over the canonical claim hash, under the issuer's published key.
//! 4. **Revocation check**: the ledger's validity registry still reports
//!    the claim id as valid.
//! 5. **Custom predicate**: a caller-supplied check over the attributes.
//!
//! Stages run sequentially and short-circuit on first failure; later stages
//! are meaningless once an earlier one failed, so they are never evaluated.
//! Each failure is reported as its own error kind.

use chrono::{DateTime, Utc};
use log::debug;
use std::sync::Arc;

use crate::contracts::issuer_registry::IssuerRegistry;
use crate::contracts::root_of_trust::RootOfTrust;
use crate::error::{Error, Result};
use crate::ledger::client::LedgerClient;
use crate::ledger::crypto;
use crate::models::claim::{Claim, Schema};
use crate::models::did;
use crate::utils::hash::claim_hash;

/// Verifier-side interface to verify and validate claims.
pub struct Verifier {
    client: Arc<dyn LedgerClient>,
    registry: IssuerRegistry,
}

impl Verifier {
    /// Creates a new verifier.
    ///
    /// # Arguments
    /// * `client` - Shared ledger transport
    /// * `issuer_script_hash` - Script hash of the issuer's deployed contract
    pub fn new(client: Arc<dyn LedgerClient>, issuer_script_hash: impl Into<String>) -> Self {
        let registry = IssuerRegistry::new(client.clone(), issuer_script_hash);
        Verifier { client, registry }
    }

    /// Direct access to the underlying contract client.
    pub fn registry(&self) -> &IssuerRegistry {
        &self.registry
    }

    /// Canonical hash of a claim, as signed by the issuer.
    pub fn get_claim_hash(&self, claim: &Claim) -> String {
        claim_hash(claim)
    }

    /// Retrieves schema details from the issuer's contract.
    pub async fn get_schema_details(&self, name: &str) -> Result<Schema> {
        self.registry.get_schema_details(name).await
    }

    /// Verifies a claim's signature offline.
    ///
    /// Pure check, no ledger reads: requires `signature`, `issuer_did` and a
    /// non-empty `owner_did` ([`Error::MalformedClaim`] otherwise), asserts
    /// both DIDs are structurally valid ([`Error::InvalidDid`]), then checks
    /// the signature over the recomputed canonical hash
    /// ([`Error::SignatureInvalid`]). Does not check issuer binding,
    /// revocation or the validity window.
    pub fn check_offline(&self, claim: &Claim, issuer_public_key: &str) -> Result<()> {
        let signature = claim.signature.as_deref().ok_or(Error::MalformedClaim)?;
        let issuer_did = claim.issuer_did.as_deref().ok_or(Error::MalformedClaim)?;
        if claim.owner_did.is_empty() {
            return Err(Error::MalformedClaim);
        }

        // Structural DID checks; the decoded addresses are not used further.
        did::address_from_did(issuer_did)?;
        did::address_from_did(&claim.owner_did)?;

        let digest = claim_hash(claim);
        if !crypto::verify(digest.as_bytes(), signature, issuer_public_key) {
            return Err(Error::SignatureInvalid);
        }

        Ok(())
    }

    /// Boolean surface of [`Verifier::check_offline`].
    pub fn verify_offline(&self, claim: &Claim, issuer_public_key: &str) -> bool {
        self.check_offline(claim, issuer_public_key).is_ok()
    }

    /// Verifies issuer binding and signature against the ledger.
    ///
    /// Fetches the registry's canonical issuer DID and published public key;
    /// fails with [`Error::IssuerMismatch`] when the claim names a different
    /// issuer, then verifies offline. A claim without an issuer DID fails
    /// [`Error::MalformedClaim`] before any ledger read. Does not validate
    /// revocation or the validity window.
    pub async fn verify(&self, claim: &Claim) -> Result<()> {
        let claim_issuer = claim.issuer_did.as_deref().ok_or(Error::MalformedClaim)?;

        let issuer_did = self.registry.get_issuer_did().await?;
        if claim_issuer != issuer_did {
            return Err(Error::IssuerMismatch);
        }

        let issuer_public_key = self.registry.get_issuer_public_key().await?;
        self.check_offline(claim, &issuer_public_key)
    }

    /// Runs the full validation pipeline over a claim.
    ///
    /// Stages are evaluated in order and the first failure is returned as
    /// its stage-specific error kind; `Ok(())` means every stage passed.
    ///
    /// # Arguments
    /// * `claim` - The claim to validate
    /// * `validate` - Custom predicate over the claim, run last
    pub async fn validate_claim<F>(&self, claim: &Claim, validate: F) -> Result<()>
    where
        F: Fn(&Claim) -> bool,
    {
        window_check(claim, Utc::now())?;
        self.verify(claim).await?;

        if !self.registry.is_valid_claim(&claim.id).await? {
            return Err(Error::ClaimRevokedOrUnknown(claim.id.clone()));
        }

        if !validate(claim) {
            return Err(Error::CustomValidationFailed);
        }

        debug!("claim {} passed all validation stages", claim.id);
        Ok(())
    }

    /// Boolean surface of [`Verifier::validate_claim`].
    pub async fn is_claim_valid<F>(&self, claim: &Claim, validate: F) -> bool
    where
        F: Fn(&Claim) -> bool,
    {
        self.validate_claim(claim, validate).await.is_ok()
    }

    /// Checks whether a root of trust marks the claim's issuer and schema
    /// as trusted. Composable with the pipeline but not part of it; always a
    /// fresh ledger read.
    ///
    /// # Arguments
    /// * `rot_script_hash` - Script hash of the root-of-trust contract
    /// * `issuer_did` - DID of the issuer to check
    /// * `schema_name` - Schema the trust is scoped to
    pub async fn is_issuer_trusted(
        &self,
        rot_script_hash: &str,
        issuer_did: &str,
        schema_name: &str,
    ) -> Result<bool> {
        RootOfTrust::new(self.client.clone(), rot_script_hash)
            .is_trusted(issuer_did, schema_name)
            .await
    }
}

/// Validity-window stage.
///
/// An absent bound collapses to `now`, so a claim with neither bound is
/// always in-window and a claim with only one bound is valid exactly when
/// that bound allows `now`.
fn window_check(claim: &Claim, now: DateTime<Utc>) -> Result<()> {
    let now_ms = now.timestamp_millis();
    let from = claim
        .valid_from
        .map(|t| t.timestamp_millis())
        .unwrap_or(now_ms);
    let to = claim
        .valid_to
        .map(|t| t.timestamp_millis())
        .unwrap_or(now_ms);

    if from <= now_ms && now_ms <= to {
        Ok(())
    } else {
        Err(Error::ExpiredOrNotYetValid)
    }
}
