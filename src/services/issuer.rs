// src/services/issuer.rs
//! Claim issuance service.
//!
//! Builds unsigned claims, validates their structure against the registered
//! schema, signs them with the issuer's key over the canonical claim hash,
//! and injects them into the on-ledger validity registry.

use log::info;
use std::sync::Arc;

use crate::contracts::issuer_registry::IssuerRegistry;
use crate::error::{Error, Result};
use crate::ledger::client::LedgerClient;
use crate::ledger::crypto;
use crate::models::claim::{Claim, ClaimAttributes};
use crate::models::did;
use crate::utils::hash::claim_hash;

use chrono::{DateTime, Utc};

/// Issuer-side operations on claims and schemas.
pub struct Issuer {
    registry: IssuerRegistry,
}

impl Issuer {
    /// Creates a new issuer service.
    ///
    /// # Arguments
    /// * `client` - Shared ledger transport
    /// * `script_hash` - Script hash of the issuer's deployed contract
    pub fn new(client: Arc<dyn LedgerClient>, script_hash: impl Into<String>) -> Self {
        Issuer {
            registry: IssuerRegistry::new(client, script_hash),
        }
    }

    /// Direct access to the underlying contract client.
    pub fn registry(&self) -> &IssuerRegistry {
        &self.registry
    }

    /// Builds an unsigned claim.
    ///
    /// Checks the owner DID syntax and the validity-window ordering; the
    /// claim stays local until [`Issuer::issue_claim`] publishes it.
    ///
    /// # Arguments
    /// * `id` - Issuer-scoped unique claim identifier
    /// * `schema_name` - Name of the schema the claim instantiates
    /// * `attributes` - Attribute values
    /// * `owner_did` - DID of the claim subject
    /// * `valid_from` / `valid_to` - Optional validity window bounds
    pub fn create_claim(
        &self,
        id: impl Into<String>,
        schema_name: impl Into<String>,
        attributes: ClaimAttributes,
        owner_did: impl Into<String>,
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Result<Claim> {
        let owner_did = owner_did.into();
        did::address_from_did(&owner_did)?;

        if let (Some(from), Some(to)) = (valid_from, valid_to) {
            if from > to {
                return Err(Error::MalformedClaim);
            }
        }

        Ok(Claim::new(
            id,
            schema_name,
            attributes,
            owner_did,
            valid_from,
            valid_to,
        ))
    }

    /// Checks a claim's attributes against its registered schema.
    ///
    /// The attribute names must cover the schema's attribute list exactly:
    /// nothing missing, nothing extra.
    pub async fn validate_claim_structure(&self, claim: &Claim) -> Result<()> {
        let schema = self.registry.get_schema_details(&claim.schema).await?;

        let matches = claim.attributes.len() == schema.attributes.len()
            && schema
                .attributes
                .iter()
                .all(|name| claim.attributes.contains_key(name));
        if !matches {
            return Err(Error::SchemaMismatch(schema.name));
        }

        Ok(())
    }

    /// Signs a claim offline: sets the issuer DID and the signature over the
    /// canonical claim hash. Does not touch the ledger.
    pub fn sign_claim(
        &self,
        claim: &mut Claim,
        issuer_did: &str,
        private_key: &str,
    ) -> Result<()> {
        did::address_from_did(issuer_did)?;
        claim.issuer_did = Some(issuer_did.to_string());

        let digest = claim_hash(claim);
        claim.signature = Some(crypto::sign(digest.as_bytes(), private_key)?);
        Ok(())
    }

    /// Issues a claim: validates its structure, signs it under the
    /// registry's canonical issuer DID and injects it into the validity
    /// registry.
    ///
    /// Returns the claim with `issuer_did`, `signature` and the pending `tx`
    /// reference set. The claim becomes queryable as valid only after ledger
    /// confirmation.
    pub async fn issue_claim(&self, mut claim: Claim, private_key: &str) -> Result<Claim> {
        self.validate_claim_structure(&claim).await?;

        let issuer_did = self.registry.get_issuer_did().await?;
        self.sign_claim(&mut claim, &issuer_did, private_key)?;

        let tx = self.registry.inject_claim(&claim.id, private_key).await?;
        claim.tx = Some(tx);

        info!("issued claim {} for {}", claim.id, claim.owner_did);
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{MockLedger, ISSUER_CONTRACT};
    use crate::models::claim::Schema;
    use serde_json::json;

    fn setup() -> (Arc<MockLedger>, Issuer, String) {
        let pair = crypto::generate_key_pair().unwrap();
        let mock = Arc::new(MockLedger::new("did:neo:Issuer", &pair.public_key));
        let issuer = Issuer::new(mock.clone(), ISSUER_CONTRACT);
        (mock, issuer, pair.private_key)
    }

    fn attributes() -> ClaimAttributes {
        let mut attributes = ClaimAttributes::new();
        attributes.insert("age".to_string(), json!(30));
        attributes.insert("country".to_string(), json!("CH"));
        attributes
    }

    async fn register_passport(issuer: &Issuer, key: &str) {
        let schema = Schema {
            name: "Passport".to_string(),
            attributes: vec!["age".to_string(), "country".to_string()],
            revokable: true,
            tx: None,
        };
        issuer.registry().register_schema(&schema, key).await.unwrap();
    }

    #[test]
    fn create_claim_rejects_bad_owner_did() {
        let (_, issuer, _) = setup();
        let result = issuer.create_claim("C1", "Passport", attributes(), "not-a-did", None, None);
        assert!(matches!(result, Err(Error::InvalidDid(_))));
    }

    #[test]
    fn create_claim_rejects_inverted_window() {
        let (_, issuer, _) = setup();
        let now = Utc::now();
        let result = issuer.create_claim(
            "C1",
            "Passport",
            attributes(),
            "did:neo:Abc",
            Some(now),
            Some(now - chrono::Duration::seconds(1)),
        );
        assert!(matches!(result, Err(Error::MalformedClaim)));
    }

    #[tokio::test]
    async fn structure_validation_requires_exact_attribute_cover() {
        let (_, issuer, key) = setup();
        register_passport(&issuer, &key).await;

        let complete = issuer
            .create_claim("C1", "Passport", attributes(), "did:neo:Abc", None, None)
            .unwrap();
        issuer.validate_claim_structure(&complete).await.unwrap();

        let mut missing = complete.clone();
        missing.attributes.remove("country");
        assert!(matches!(
            issuer.validate_claim_structure(&missing).await,
            Err(Error::SchemaMismatch(_))
        ));

        let mut extra = complete.clone();
        extra.attributes.insert("height".to_string(), json!(180));
        assert!(matches!(
            issuer.validate_claim_structure(&extra).await,
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[tokio::test]
    async fn issue_claim_signs_and_injects() {
        let (_, issuer, key) = setup();
        register_passport(&issuer, &key).await;

        let claim = issuer
            .create_claim("C1", "Passport", attributes(), "did:neo:Abc", None, None)
            .unwrap();
        let issued = issuer.issue_claim(claim, &key).await.unwrap();

        assert_eq!(issued.issuer_did.as_deref(), Some("did:neo:Issuer"));
        assert!(issued.signature.is_some());
        assert!(issued.tx.is_some());
        assert!(issuer.registry().is_valid_claim("C1").await.unwrap());
    }

    #[tokio::test]
    async fn issue_claim_with_unknown_schema_fails() {
        let (_, issuer, key) = setup();
        let claim = issuer
            .create_claim("C1", "Unregistered", attributes(), "did:neo:Abc", None, None)
            .unwrap();

        assert!(matches!(
            issuer.issue_claim(claim, &key).await,
            Err(Error::LedgerOperationFailed { .. })
        ));
    }
}
