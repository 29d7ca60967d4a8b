// src/contracts/root_of_trust.rs
//! Root-of-trust smart-contract client.
//!
//! The root of trust marks (issuer DID, schema name) pairs as trusted or
//! untrusted. A pair that was never registered, or was deactivated, reports
//! untrusted. Trust reads are never cached: every query is a fresh ledger
//! read.

use log::info;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::contracts::{self, RootOfTrustOperation};
use crate::error::Result;
use crate::ledger::client::LedgerClient;

/// Root-of-trust contract wrapper.
pub struct RootOfTrust {
    client: Arc<dyn LedgerClient>,
    script_hash: String,
}

impl RootOfTrust {
    /// Creates a new root-of-trust client.
    ///
    /// # Arguments
    /// * `client` - Shared ledger transport
    /// * `script_hash` - Script hash of the deployed root-of-trust contract
    pub fn new(client: Arc<dyn LedgerClient>, script_hash: impl Into<String>) -> Self {
        RootOfTrust {
            client,
            script_hash: script_hash.into(),
        }
    }

    /// Script hash of the wrapped contract.
    pub fn script_hash(&self) -> &str {
        &self.script_hash
    }

    /// Returns the official name of the root of trust.
    pub async fn get_name(&self) -> Result<String> {
        contracts::read_string(
            self.client.as_ref(),
            &self.script_hash,
            RootOfTrustOperation::Name.as_str(),
            &[],
        )
        .await
    }

    /// Returns the DID of the root of trust.
    pub async fn get_did(&self) -> Result<String> {
        contracts::read_string(
            self.client.as_ref(),
            &self.script_hash,
            RootOfTrustOperation::Did.as_str(),
            &[],
        )
        .await
    }

    /// Checks whether the issuer and schema pair is trusted by this root.
    pub async fn is_trusted(&self, issuer_did: &str, schema_name: &str) -> Result<bool> {
        contracts::read_bool(
            self.client.as_ref(),
            &self.script_hash,
            RootOfTrustOperation::IsTrusted.as_str(),
            &[json!(issuer_did), json!(schema_name)],
        )
        .await
    }

    /// Registers the issuer and schema pair as trusted.
    ///
    /// Idempotent from the caller's point of view: re-registering an
    /// already-trusted pair is not an error. Returns the pending transaction
    /// reference; the trust flag becomes queryable only after confirmation.
    pub async fn register_issuer(
        &self,
        issuer_did: &str,
        schema_name: &str,
        authority_key: &str,
    ) -> Result<String> {
        let tx = self
            .client
            .invoke_and_submit(
                &self.script_hash,
                RootOfTrustOperation::RegisterIssuer.as_str(),
                &[json!(issuer_did), json!(schema_name)],
                authority_key,
                None,
            )
            .await?;

        info!(
            "trust registration of ({}, {}) submitted as {}",
            issuer_did, schema_name, tx
        );
        Ok(tx)
    }

    /// Deactivates the issuer and schema pair.
    pub async fn deactivate_issuer(
        &self,
        issuer_did: &str,
        schema_name: &str,
        authority_key: &str,
    ) -> Result<String> {
        let tx = self
            .client
            .invoke_and_submit(
                &self.script_hash,
                RootOfTrustOperation::DeactivateIssuer.as_str(),
                &[json!(issuer_did), json!(schema_name)],
                authority_key,
                None,
            )
            .await?;

        info!(
            "trust deactivation of ({}, {}) submitted as {}",
            issuer_did, schema_name, tx
        );
        Ok(tx)
    }

    /// Rehearses a trust registration as a read-only invocation.
    ///
    /// Surfaces contract-side errors without submitting a transaction.
    pub async fn register_issuer_probe(&self, issuer_did: &str, schema_name: &str) -> Result<()> {
        self.probe(RootOfTrustOperation::RegisterIssuer, issuer_did, schema_name)
            .await
    }

    /// Rehearses a trust deactivation as a read-only invocation.
    pub async fn deactivate_issuer_probe(&self, issuer_did: &str, schema_name: &str) -> Result<()> {
        self.probe(RootOfTrustOperation::DeactivateIssuer, issuer_did, schema_name)
            .await
    }

    async fn probe(
        &self,
        operation: RootOfTrustOperation,
        issuer_did: &str,
        schema_name: &str,
    ) -> Result<()> {
        let result = self
            .client
            .invoke_read(
                &self.script_hash,
                operation.as_str(),
                &[json!(issuer_did), json!(schema_name)],
            )
            .await?;
        contracts::expect_success(result).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::crypto;
    use crate::ledger::mock::{MockLedger, ROT_CONTRACT};

    fn setup() -> (Arc<MockLedger>, RootOfTrust, String) {
        let pair = crypto::generate_key_pair().unwrap();
        let mock = Arc::new(MockLedger::new("did:neo:Issuer", &pair.public_key));
        let rot = RootOfTrust::new(mock.clone(), ROT_CONTRACT);
        (mock, rot, pair.private_key)
    }

    #[tokio::test]
    async fn identity_reads() {
        let (mock, rot, _) = setup();
        assert_eq!(rot.get_name().await.unwrap(), mock.rot_name);
        assert_eq!(rot.get_did().await.unwrap(), mock.rot_did);
    }

    #[tokio::test]
    async fn unregistered_pair_is_untrusted() {
        let (_, rot, _) = setup();
        assert!(!rot.is_trusted("did:neo:Issuer", "Passport").await.unwrap());
    }

    #[tokio::test]
    async fn register_trust_deactivate_cycle() {
        let (_, rot, key) = setup();

        rot.register_issuer("did:neo:Issuer", "Passport", &key)
            .await
            .unwrap();
        assert!(rot.is_trusted("did:neo:Issuer", "Passport").await.unwrap());

        // Trust is scoped to the exact schema name.
        assert!(!rot.is_trusted("did:neo:Issuer", "Visa").await.unwrap());

        rot.deactivate_issuer("did:neo:Issuer", "Passport", &key)
            .await
            .unwrap();
        assert!(!rot.is_trusted("did:neo:Issuer", "Passport").await.unwrap());
    }

    #[tokio::test]
    async fn reregistration_is_idempotent() {
        let (_, rot, key) = setup();
        rot.register_issuer("did:neo:Issuer", "Passport", &key)
            .await
            .unwrap();
        rot.register_issuer("did:neo:Issuer", "Passport", &key)
            .await
            .unwrap();
        assert!(rot.is_trusted("did:neo:Issuer", "Passport").await.unwrap());
    }

    #[tokio::test]
    async fn probes_do_not_mutate() {
        let (_, rot, _) = setup();
        rot.register_issuer_probe("did:neo:Issuer", "Passport")
            .await
            .unwrap();
        assert!(!rot.is_trusted("did:neo:Issuer", "Passport").await.unwrap());
    }
}
