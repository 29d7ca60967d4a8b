// src/wallet/wallet.rs
//! Multi-account claim wallet.
//!
//! The wallet exclusively owns an ordered sequence of [`Account`]s plus a
//! derived DID → account-index map. The index is rebuilt whenever an account
//! is added (and on import), so it is always consistent with
//! `accounts[i].did()`. The wallet's serde representation is the sole
//! persisted layout: an account list and the DID map, round-tripping
//! losslessly including claim timestamps.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::claim::Claim;
use crate::utils::serialization;
use crate::wallet::account::Account;

/// Wallet file format version.
const WALLET_VERSION: &str = "1.0";

/// A wallet holding accounts and their claims, indexed by DID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wallet {
    /// Display name of the wallet
    pub name: String,

    /// Wallet file format version
    pub version: String,

    /// Accounts in insertion order
    accounts: Vec<Account>,

    /// DID → index into `accounts`
    #[serde(rename = "didMap")]
    did_map: HashMap<String, usize>,
}

impl Wallet {
    /// Creates an empty wallet.
    pub fn new(name: impl Into<String>) -> Self {
        Wallet {
            name: name.into(),
            version: WALLET_VERSION.to_string(),
            accounts: Vec::new(),
            did_map: HashMap::new(),
        }
    }

    /// Adds an account and indexes it by DID.
    ///
    /// # Returns
    /// The index assigned to the account.
    pub fn add_account(&mut self, account: Account) -> usize {
        let index = self.accounts.len();
        let account_did = account.did();
        self.accounts.push(account);
        self.did_map.insert(account_did, index);
        debug!("account {} added to wallet {}", index, self.name);
        index
    }

    /// Adds an account from its serialized JSON form.
    ///
    /// # Returns
    /// The index assigned to the account.
    pub fn add_account_from_json(&mut self, data: &str) -> Result<usize> {
        let account: Account = serialization::deserialize(data)?;
        Ok(self.add_account(account))
    }

    /// Adds a claim to the account owning it.
    ///
    /// The owner is resolved through the DID index; fails with
    /// [`Error::UnknownOwnerAccount`] when no account in this wallet holds
    /// the claim's `owner_did`.
    pub fn add_claim(&mut self, claim: Claim) -> Result<()> {
        let index = *self
            .did_map
            .get(&claim.owner_did)
            .ok_or_else(|| Error::UnknownOwnerAccount(claim.owner_did.clone()))?;
        self.accounts[index].add_claim(claim);
        Ok(())
    }

    /// Finds a claim by id across all accounts; first match wins.
    pub fn get_claim(&self, claim_id: &str) -> Option<&Claim> {
        self.accounts
            .iter()
            .find_map(|account| account.get_claim(claim_id))
    }

    /// All claims held for a DID; empty when the DID is unknown.
    pub fn get_all_claims(&self, owner_did: &str) -> Vec<Claim> {
        self.account_by_did(owner_did)
            .map(Account::get_all_claims)
            .unwrap_or_default()
    }

    /// Generates a fresh key pair, wraps it in a new account and adds it.
    ///
    /// # Returns
    /// The DID of the new account.
    pub fn create_did(&mut self) -> Result<String> {
        let account = Account::generate()?;
        let account_did = account.did();
        self.add_account(account);
        Ok(account_did)
    }

    /// DID of the account at `index`, if any.
    pub fn get_did(&self, index: usize) -> Option<String> {
        self.accounts.get(index).map(Account::did)
    }

    /// The account registered under a DID.
    pub fn account_by_did(&self, account_did: &str) -> Option<&Account> {
        self.did_map
            .get(account_did)
            .and_then(|&index| self.accounts.get(index))
    }

    /// Mutable access to the account registered under a DID.
    pub fn account_by_did_mut(&mut self, account_did: &str) -> Option<&mut Account> {
        let index = *self.did_map.get(account_did)?;
        self.accounts.get_mut(index)
    }

    /// Accounts in insertion order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Mutable access to the account at `index`.
    pub fn account_mut(&mut self, index: usize) -> Option<&mut Account> {
        self.accounts.get_mut(index)
    }

    /// All DIDs held in this wallet.
    pub fn all_dids(&self) -> Vec<String> {
        self.did_map.keys().cloned().collect()
    }

    /// Serializes the wallet to its JSON persisted form.
    pub fn export(&self) -> Result<String> {
        Ok(serialization::serialize(self)?)
    }

    /// Reconstructs a wallet from its JSON persisted form.
    ///
    /// The DID index is rebuilt from the account list rather than trusted
    /// from the file, keeping the index invariant independent of the input.
    pub fn import(data: &str) -> Result<Self> {
        let mut wallet: Wallet = serialization::deserialize(data)?;
        wallet.did_map = wallet
            .accounts
            .iter()
            .enumerate()
            .map(|(index, account)| (account.did(), index))
            .collect();
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::claim::ClaimAttributes;
    use chrono::Utc;
    use serde_json::json;

    fn test_claim(id: &str, owner_did: &str) -> Claim {
        let mut attributes = ClaimAttributes::new();
        attributes.insert("age".to_string(), json!(30));
        attributes.insert("country".to_string(), json!("CH"));
        Claim::new(id, "Passport", attributes, owner_did, Some(Utc::now()), Some(Utc::now()))
    }

    #[test]
    fn did_index_matches_account_order() {
        let mut wallet = Wallet::new("test-wallet");
        let first = Account::generate().unwrap();
        let second = Account::generate().unwrap();
        let first_did = first.did();
        let second_did = second.did();

        assert_eq!(wallet.add_account(first), 0);
        assert_eq!(wallet.add_account(second), 1);

        // Index 0 must be resolvable too.
        assert_eq!(wallet.get_did(0), Some(first_did.clone()));
        assert_eq!(wallet.get_did(1), Some(second_did.clone()));
        assert_eq!(wallet.account_by_did(&first_did).unwrap().did(), first_did);
        assert_eq!(wallet.account_by_did(&second_did).unwrap().did(), second_did);

        let mut dids = wallet.all_dids();
        dids.sort();
        let mut expected = vec![first_did, second_did];
        expected.sort();
        assert_eq!(dids, expected);
    }

    #[test]
    fn add_claim_routes_to_owner_account() {
        let mut wallet = Wallet::new("test-wallet");
        let account = Account::generate().unwrap();
        let owner_did = account.did();
        wallet.add_account(account);

        let claim = test_claim("C1", &owner_did);
        wallet.add_claim(claim.clone()).unwrap();

        assert_eq!(wallet.get_claim("C1"), Some(&claim));
        assert_eq!(wallet.get_all_claims(&owner_did), vec![claim]);
    }

    #[test]
    fn add_claim_for_unknown_owner_fails() {
        let mut wallet = Wallet::new("test-wallet");
        let claim = test_claim("C1", "did:neo:Stranger");

        assert!(matches!(
            wallet.add_claim(claim),
            Err(Error::UnknownOwnerAccount(did)) if did == "did:neo:Stranger"
        ));
    }

    #[test]
    fn unknown_did_yields_empty_claims_not_error() {
        let wallet = Wallet::new("test-wallet");
        assert!(wallet.get_all_claims("did:neo:Nobody").is_empty());
        assert!(wallet.get_claim("C1").is_none());
    }

    #[test]
    fn create_did_adds_resolvable_account() {
        let mut wallet = Wallet::new("test-wallet");
        let account_did = wallet.create_did().unwrap();

        assert_eq!(wallet.accounts().len(), 1);
        assert_eq!(wallet.get_did(0), Some(account_did.clone()));
        assert!(wallet.account_by_did(&account_did).is_some());
    }

    #[tokio::test]
    async fn export_import_round_trips_encrypted_wallet() {
        let mut wallet = Wallet::new("test-wallet");
        let account = Account::generate().unwrap();
        let owner_did = account.did();
        wallet.add_account(account);

        let valid_from = Utc::now();
        let mut claim = test_claim("C1", &owner_did);
        claim.valid_from = Some(valid_from);
        wallet.add_claim(claim).unwrap();

        wallet
            .account_by_did_mut(&owner_did)
            .unwrap()
            .encrypt("passw0rd")
            .await
            .unwrap();

        let exported = wallet.export().unwrap();
        let mut imported = Wallet::import(&exported).unwrap();

        imported
            .account_mut(0)
            .unwrap()
            .decrypt("passw0rd")
            .await
            .unwrap();
        wallet
            .account_mut(0)
            .unwrap()
            .decrypt("passw0rd")
            .await
            .unwrap();

        assert_eq!(imported, wallet);
        assert_eq!(imported.get_did(0), wallet.get_did(0));

        let imported_claim = imported.get_claim("C1").expect("claim survives round trip");
        assert_eq!(imported_claim.valid_from, Some(valid_from));
    }

    #[test]
    fn serialized_account_can_be_added_directly() {
        let account = Account::generate().unwrap();
        let account_did = account.did();
        let serialized = serde_json::to_string(&account).unwrap();

        let mut wallet = Wallet::new("test-wallet");
        let index = wallet.add_account_from_json(&serialized).unwrap();

        assert_eq!(wallet.get_did(index), Some(account_did));
    }

    #[test]
    fn import_rebuilds_did_index() {
        let mut wallet = Wallet::new("test-wallet");
        let account_did = wallet.create_did().unwrap();

        let mut exported: serde_json::Value =
            serde_json::from_str(&wallet.export().unwrap()).unwrap();
        // A stale or hostile index in the file must not survive import.
        exported["didMap"] = json!({ "did:neo:bogus": 7 });

        let imported = Wallet::import(&exported.to_string()).unwrap();
        assert!(imported.account_by_did(&account_did).is_some());
        assert!(imported.account_by_did("did:neo:bogus").is_none());
    }
}
