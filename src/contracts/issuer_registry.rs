// src/contracts/issuer_registry.rs
//! Issuer smart-contract client.
//!
//! High-level API over the issuer's deployed contract: identity reads
//! (name, DID, public key), the schema registry, and the claim validity
//! registry (inject / revoke / query).
//!
//! All mutations are fire-and-commit: they return the pending transaction
//! reference immediately, and the effect becomes queryable only after the
//! ledger confirms the transaction. Waiting for confirmation is the caller's
//! responsibility.

use log::{debug, info};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::contracts::{self, IssuerOperation};
use crate::error::{Error, Result};
use crate::ledger::client::LedgerClient;
use crate::models::claim::Schema;

/// Issuer contract wrapper.
///
/// Holds the shared ledger client and the script hash of the deployed
/// contract; one async method per contract operation.
pub struct IssuerRegistry {
    client: Arc<dyn LedgerClient>,
    script_hash: String,
}

impl IssuerRegistry {
    /// Creates a new registry client.
    ///
    /// # Arguments
    /// * `client` - Shared ledger transport
    /// * `script_hash` - Script hash of the issuer's deployed contract
    pub fn new(client: Arc<dyn LedgerClient>, script_hash: impl Into<String>) -> Self {
        IssuerRegistry {
            client,
            script_hash: script_hash.into(),
        }
    }

    /// Script hash of the wrapped contract.
    pub fn script_hash(&self) -> &str {
        &self.script_hash
    }

    /// Returns the official name of the issuer.
    pub async fn get_issuer_name(&self) -> Result<String> {
        self.read_string(IssuerOperation::Name, &[]).await
    }

    /// Returns the canonical DID of the issuer.
    pub async fn get_issuer_did(&self) -> Result<String> {
        self.read_string(IssuerOperation::Did, &[]).await
    }

    /// Returns the issuer's published public key (hex).
    pub async fn get_issuer_public_key(&self) -> Result<String> {
        self.read_string(IssuerOperation::PublicKey, &[]).await
    }

    /// Retrieves a registered schema by name.
    ///
    /// Fails with [`Error::LedgerOperationFailed`] carrying the contract's
    /// raw error when no schema of that name exists.
    pub async fn get_schema_details(&self, name: &str) -> Result<Schema> {
        let value = contracts::read_value(
            self.client.as_ref(),
            &self.script_hash,
            IssuerOperation::GetSchemaDetails.as_str(),
            &[json!(name)],
        )
        .await?;

        // Contracts answer with either a JSON object or its string encoding.
        let schema = match value {
            Value::String(encoded) => serde_json::from_str(&encoded)?,
            other => serde_json::from_value(other)?,
        };
        Ok(schema)
    }

    /// Registers a new schema, returning the pending transaction reference.
    ///
    /// Registration under an already-taken name is rejected by the contract.
    pub async fn register_schema(&self, schema: &Schema, signing_key: &str) -> Result<String> {
        if schema.name.is_empty() || schema.attributes.is_empty() {
            return Err(Error::SchemaMismatch(
                "schema needs a name and at least one attribute".to_string(),
            ));
        }

        let tx = self
            .client
            .invoke_and_submit(
                &self.script_hash,
                IssuerOperation::RegisterSchema.as_str(),
                &[
                    json!(schema.name),
                    json!(schema.attributes),
                    json!(schema.revokable),
                ],
                signing_key,
                None,
            )
            .await?;

        info!("schema {} registration submitted as {}", schema.name, tx);
        Ok(tx)
    }

    /// Marks a claim id as valid in the registry.
    pub async fn inject_claim(&self, claim_id: &str, signing_key: &str) -> Result<String> {
        let tx = self
            .client
            .invoke_and_submit(
                &self.script_hash,
                IssuerOperation::InjectClaim.as_str(),
                &[json!(claim_id)],
                signing_key,
                None,
            )
            .await?;

        info!("claim {} injection submitted as {}", claim_id, tx);
        Ok(tx)
    }

    /// Revokes a claim id in the registry.
    pub async fn revoke_claim(&self, claim_id: &str, signing_key: &str) -> Result<String> {
        let tx = self
            .client
            .invoke_and_submit(
                &self.script_hash,
                IssuerOperation::RevokeClaim.as_str(),
                &[json!(claim_id)],
                signing_key,
                None,
            )
            .await?;

        info!("claim {} revocation submitted as {}", claim_id, tx);
        Ok(tx)
    }

    /// Queries the validity registry for a claim id.
    ///
    /// Returns `false` for claims that were revoked or never injected.
    pub async fn is_valid_claim(&self, claim_id: &str) -> Result<bool> {
        debug!("querying validity of claim {}", claim_id);
        contracts::read_bool(
            self.client.as_ref(),
            &self.script_hash,
            IssuerOperation::IsValidClaim.as_str(),
            &[json!(claim_id)],
        )
        .await
    }

    async fn read_string(&self, operation: IssuerOperation, params: &[Value]) -> Result<String> {
        contracts::read_string(
            self.client.as_ref(),
            &self.script_hash,
            operation.as_str(),
            params,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::crypto;
    use crate::ledger::mock::{MockLedger, ISSUER_CONTRACT};

    fn setup() -> (Arc<MockLedger>, IssuerRegistry, String) {
        let pair = crypto::generate_key_pair().unwrap();
        let mock = Arc::new(MockLedger::new("did:neo:Issuer", &pair.public_key));
        let registry = IssuerRegistry::new(mock.clone(), ISSUER_CONTRACT);
        (mock, registry, pair.private_key)
    }

    fn passport_schema() -> Schema {
        Schema {
            name: "Passport".to_string(),
            attributes: vec!["age".to_string(), "country".to_string()],
            revokable: true,
            tx: None,
        }
    }

    #[tokio::test]
    async fn issuer_identity_reads() {
        let (mock, registry, _) = setup();
        assert_eq!(registry.get_issuer_name().await.unwrap(), mock.issuer_name);
        assert_eq!(registry.get_issuer_did().await.unwrap(), "did:neo:Issuer");
        assert_eq!(
            registry.get_issuer_public_key().await.unwrap(),
            mock.issuer_public_key
        );
    }

    #[tokio::test]
    async fn register_and_fetch_schema() {
        let (_, registry, key) = setup();
        let schema = passport_schema();

        let tx = registry.register_schema(&schema, &key).await.unwrap();
        assert!(!tx.is_empty());

        let details = registry.get_schema_details("Passport").await.unwrap();
        assert_eq!(details.name, schema.name);
        assert_eq!(details.attributes, schema.attributes);
        assert!(details.revokable);
    }

    #[tokio::test]
    async fn duplicate_schema_registration_fails() {
        let (_, registry, key) = setup();
        let schema = passport_schema();
        registry.register_schema(&schema, &key).await.unwrap();

        let err = registry.register_schema(&schema, &key).await.unwrap_err();
        assert!(matches!(err, Error::LedgerOperationFailed { .. }));
    }

    #[tokio::test]
    async fn missing_schema_surfaces_contract_error() {
        let (_, registry, _) = setup();
        let err = registry.get_schema_details("Nonexistent").await.unwrap_err();

        match err {
            Error::LedgerOperationFailed { message, .. } => {
                assert_eq!(message, "Schema not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn claim_validity_lifecycle() {
        let (_, registry, key) = setup();

        assert!(!registry.is_valid_claim("C1").await.unwrap());
        registry.inject_claim("C1", &key).await.unwrap();
        assert!(registry.is_valid_claim("C1").await.unwrap());
        registry.revoke_claim("C1", &key).await.unwrap();
        assert!(!registry.is_valid_claim("C1").await.unwrap());
    }
}
