// src/wallet/account.rs
//! A single wallet account: one key pair plus the claims it owns.
//!
//! The account is a plain composition of key material, derived identity
//! (address, public key, DID) and a claim map. Key material toggles between
//! a plaintext and a password-encrypted state; claim storage is untouched by
//! that toggle. The address and public key are kept in the clear even while
//! encrypted, so the DID stays derivable without the password.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::ledger::crypto::{self, EncryptedKey};
use crate::models::claim::Claim;
use crate::models::did;

/// Key material of an account, plaintext or password-encrypted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum KeyRecord {
    /// Hex private key in the clear
    Plain(String),
    /// Password-encrypted key record
    Encrypted(EncryptedKey),
}

/// One account: a key pair and the claims held under its DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    /// Ledger address derived from the public key
    address: String,

    /// Hex compressed public key, kept in the clear in both key states
    #[serde(rename = "publicKey")]
    public_key: String,

    /// Plaintext or encrypted private key
    key: KeyRecord,

    /// Claims held by this account, keyed by claim id
    claims: BTreeMap<String, Claim>,
}

impl Account {
    /// Creates an account from a raw hex private key.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let public_key = crypto::public_key_from_private(private_key)?;
        let address = crypto::address_from_public_key(&public_key)?;

        Ok(Account {
            address,
            public_key,
            key: KeyRecord::Plain(private_key.to_string()),
            claims: BTreeMap::new(),
        })
    }

    /// Creates an account with a freshly generated key pair.
    pub fn generate() -> Result<Self> {
        let pair = crypto::generate_key_pair()?;
        Ok(Account {
            address: pair.address,
            public_key: pair.public_key,
            key: KeyRecord::Plain(pair.private_key),
            claims: BTreeMap::new(),
        })
    }

    /// The account's DID, derived from its address.
    ///
    /// Available in both key states; no password required.
    pub fn did(&self) -> String {
        did::to_did(&self.address)
    }

    /// Ledger address of this account.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Hex compressed public key of this account.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Whether the key material is currently encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.key, KeyRecord::Encrypted(_))
    }

    /// The plaintext private key.
    ///
    /// Fails with [`Error::AccountLocked`] while the account is encrypted.
    pub fn private_key(&self) -> Result<&str> {
        match &self.key {
            KeyRecord::Plain(key) => Ok(key),
            KeyRecord::Encrypted(_) => Err(Error::AccountLocked(self.did())),
        }
    }

    /// Encrypts the private key under a password.
    ///
    /// Key derivation is CPU-bound, so the work runs on a blocking thread
    /// and other accounts' operations proceed meanwhile. Encrypting an
    /// already-encrypted account is a no-op. Claims are not touched.
    pub async fn encrypt(&mut self, password: &str) -> Result<()> {
        let KeyRecord::Plain(private_key) = &self.key else {
            return Ok(());
        };

        let private_key = private_key.clone();
        let password = password.to_string();
        let record =
            tokio::task::spawn_blocking(move || crypto::encrypt_key(&private_key, &password))
                .await
                .map_err(|e| Error::KeyCrypto(format!("encryption task failed: {}", e)))??;

        self.key = KeyRecord::Encrypted(record);
        Ok(())
    }

    /// Decrypts the private key with the password it was encrypted under.
    ///
    /// Fails with [`Error::KeyCrypto`] on a wrong password, and rejects a
    /// decrypted key that does not belong to this account's public key.
    /// Decrypting a plaintext account is a no-op.
    pub async fn decrypt(&mut self, password: &str) -> Result<()> {
        let KeyRecord::Encrypted(record) = &self.key else {
            return Ok(());
        };

        let record = record.clone();
        let password = password.to_string();
        let private_key =
            tokio::task::spawn_blocking(move || crypto::decrypt_key(&record, &password))
                .await
                .map_err(|e| Error::KeyCrypto(format!("decryption task failed: {}", e)))??;

        if crypto::public_key_from_private(&private_key)? != self.public_key {
            return Err(Error::KeyCrypto(
                "decrypted key does not match this account".to_string(),
            ));
        }

        self.key = KeyRecord::Plain(private_key);
        Ok(())
    }

    /// Adds a claim, keyed by its id.
    ///
    /// Unconditional upsert: an existing claim with the same id is replaced,
    /// and no ownership check happens at this layer (the wallet enforces
    /// owner routing one level up). Works in both key states.
    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.insert(claim.id.clone(), claim);
    }

    /// Returns the claim with the given id, if held.
    pub fn get_claim(&self, claim_id: &str) -> Option<&Claim> {
        self.claims.get(claim_id)
    }

    /// All claims held by this account.
    pub fn get_all_claims(&self) -> Vec<Claim> {
        self.claims.values().cloned().collect()
    }

    /// Whether a claim with the given id is held.
    pub fn contains_claim(&self, claim_id: &str) -> bool {
        self.claims.contains_key(claim_id)
    }

    /// Removes a claim by id; returns whether one was removed.
    pub fn remove_claim(&mut self, claim_id: &str) -> bool {
        self.claims.remove(claim_id).is_some()
    }

    /// Number of claims held.
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }
}
