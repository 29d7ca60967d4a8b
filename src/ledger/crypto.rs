// src/ledger/crypto.rs
//! Cryptographic collaborator used by the claims SDK.
//!
//! Provides the primitives the rest of the library treats as external:
//! - `hash256`: double SHA-256, the ledger's canonical hash
//! - ECDSA (secp256k1) signing and verification over prehashed digests
//! - key-pair generation and address derivation
//! - password-based private-key encryption (PBKDF2-HMAC-SHA256 + AES-256-GCM)
//!
//! Key material crosses this boundary as lower-case hex strings; encrypted
//! records carry base64 fields so they serialize cleanly into wallet files.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::generic_array::GenericArray;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::RngCore;
use ring::{aead, digest, pbkdf2};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// PBKDF2 rounds for password-based key derivation.
const KDF_ITERATIONS: u32 = 10_000;

/// Length of the ledger address payload taken from the public-key hash.
const ADDRESS_LEN: usize = 20;

/// A freshly generated key pair with its derived ledger address.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Hex-encoded 32-byte private key
    pub private_key: String,
    /// Hex-encoded compressed SEC1 public key (33 bytes)
    pub public_key: String,
    /// Ledger address derived from the public key
    pub address: String,
}

/// A password-encrypted private key record.
///
/// Self-contained: carries the KDF salt and iteration count plus the AEAD
/// nonce, so a wallet file can be decrypted on any machine with the password
/// alone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKey {
    /// Base64 KDF salt (16 bytes)
    pub salt: String,
    /// Base64 AES-GCM nonce (12 bytes)
    pub nonce: String,
    /// Base64 ciphertext || GCM tag
    pub ciphertext: String,
    /// PBKDF2 iteration count used for this record
    pub iterations: u32,
}

/// Computes the ledger's canonical hash: SHA-256 applied twice.
///
/// # Arguments
/// * `data` - Binary data to hash
///
/// # Returns
/// Fixed-size 32-byte digest
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let first = digest::digest(&digest::SHA256, data);
    let second = digest::digest(&digest::SHA256, first.as_ref());
    let mut out = [0u8; 32];
    out.copy_from_slice(second.as_ref());
    out
}

/// Generates a fresh secp256k1 key pair and its ledger address.
///
/// # Returns
/// [`KeyPair`] with hex-encoded key material
pub fn generate_key_pair() -> Result<KeyPair> {
    let secret_key = SecretKey::random(&mut rand::thread_rng());
    let private_key = hex::encode(secret_key.to_bytes());
    let public_key = hex::encode(secret_key.public_key().to_encoded_point(true).as_bytes());
    let address = address_from_public_key(&public_key)?;

    Ok(KeyPair {
        private_key,
        public_key,
        address,
    })
}

/// Derives the hex public key (compressed SEC1) for a private key.
pub fn public_key_from_private(private_key: &str) -> Result<String> {
    let signing_key = signing_key_from_hex(private_key)?;
    Ok(hex::encode(
        signing_key.verifying_key().to_encoded_point(true).as_bytes(),
    ))
}

/// Derives the ledger address for a public key.
///
/// The address is the hex encoding of the first 20 bytes of the public
/// key's `hash256`. Opaque to the rest of the system; the DID codec only
/// requires it to be a non-empty string.
pub fn address_from_public_key(public_key: &str) -> Result<String> {
    let bytes = hex::decode(public_key)
        .map_err(|e| Error::KeyCrypto(format!("invalid public key hex: {}", e)))?;
    let script_hash = hash256(&bytes);
    Ok(hex::encode(&script_hash[..ADDRESS_LEN]))
}

/// Signs a message with ECDSA over its `hash256` digest.
///
/// # Arguments
/// * `message` - Raw message bytes (for claims: the canonical hash string)
/// * `private_key` - Hex-encoded 32-byte private key
///
/// # Returns
/// Hex-encoded 64-byte compact signature (R || S)
pub fn sign(message: &[u8], private_key: &str) -> Result<String> {
    let signing_key = signing_key_from_hex(private_key)?;
    let prehash = hash256(message);

    let signature: Signature = signing_key
        .sign_prehash(&prehash)
        .map_err(|e| Error::KeyCrypto(format!("signing failed: {}", e)))?;

    Ok(hex::encode(signature.to_bytes()))
}

/// Verifies an ECDSA signature produced by [`sign`].
///
/// Malformed signatures or public keys verify as `false`; this mirrors the
/// boolean surface the verifier pipeline consumes.
///
/// # Arguments
/// * `message` - Raw message bytes
/// * `signature` - Hex-encoded compact signature
/// * `public_key` - Hex-encoded compressed SEC1 public key
pub fn verify(message: &[u8], signature: &str, public_key: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(key_bytes) = hex::decode(public_key) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(&sig_bytes) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&key_bytes) else {
        return false;
    };

    let prehash = hash256(message);
    verifying_key.verify_prehash(&prehash, &sig).is_ok()
}

/// Encrypts a private key under a password.
///
/// PBKDF2-HMAC-SHA256 derives a 32-byte key from the password and a random
/// salt; AES-256-GCM seals the private-key bytes under a random nonce.
/// CPU-bound; callers on async executors should run it on a blocking thread.
///
/// # Arguments
/// * `private_key` - Hex-encoded private key to protect
/// * `password` - Wallet password
pub fn encrypt_key(private_key: &str, password: &str) -> Result<EncryptedKey> {
    let key_bytes = hex::decode(private_key)
        .map_err(|e| Error::KeyCrypto(format!("invalid private key hex: {}", e)))?;

    let mut salt = [0u8; 16];
    let mut nonce_bytes = [0u8; aead::NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let sealing_key = derive_aead_key(password, &salt, KDF_ITERATIONS)?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = key_bytes;
    sealing_key
        .seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
        .map_err(|_| Error::KeyCrypto("key encryption failed".to_string()))?;

    Ok(EncryptedKey {
        salt: base64::encode(salt),
        nonce: base64::encode(nonce_bytes),
        ciphertext: base64::encode(in_out),
        iterations: KDF_ITERATIONS,
    })
}

/// Decrypts an [`EncryptedKey`] record back into the hex private key.
///
/// Fails with [`Error::KeyCrypto`] when the password is wrong or the record
/// was tampered with (GCM authentication failure).
pub fn decrypt_key(record: &EncryptedKey, password: &str) -> Result<String> {
    let salt = decode_b64(&record.salt, "salt")?;
    let nonce_bytes = decode_b64(&record.nonce, "nonce")?;
    let mut in_out = decode_b64(&record.ciphertext, "ciphertext")?;

    if nonce_bytes.len() != aead::NONCE_LEN {
        return Err(Error::KeyCrypto("invalid nonce length".to_string()));
    }
    let mut nonce_arr = [0u8; aead::NONCE_LEN];
    nonce_arr.copy_from_slice(&nonce_bytes);

    let opening_key = derive_aead_key(password, &salt, record.iterations)?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_arr);

    let plain = opening_key
        .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
        .map_err(|_| Error::KeyCrypto("wrong password or corrupted key record".to_string()))?;

    Ok(hex::encode(plain))
}

fn derive_aead_key(password: &str, salt: &[u8], iterations: u32) -> Result<aead::LessSafeKey> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| Error::KeyCrypto("KDF iteration count must be non-zero".to_string()))?;

    let mut derived = [0u8; 32];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password.as_bytes(),
        &mut derived,
    );

    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, &derived)
        .map_err(|_| Error::KeyCrypto("AEAD key setup failed".to_string()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

fn decode_b64(value: &str, field: &str) -> Result<Vec<u8>> {
    base64::decode(value).map_err(|e| Error::KeyCrypto(format!("invalid {} encoding: {}", field, e)))
}

fn signing_key_from_hex(private_key: &str) -> Result<SigningKey> {
    let bytes = hex::decode(private_key)
        .map_err(|e| Error::KeyCrypto(format!("invalid private key hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(Error::KeyCrypto(format!(
            "private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }

    SigningKey::from_bytes(GenericArray::from_slice(&bytes))
        .map_err(|e| Error::KeyCrypto(format!("invalid private key: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash256_is_deterministic() {
        assert_eq!(hash256(b"claim data"), hash256(b"claim data"));
        assert_ne!(hash256(b"claim data"), hash256(b"other data"));
    }

    #[test]
    fn sign_verify_round_trip() {
        let pair = generate_key_pair().unwrap();
        let signature = sign(b"message", &pair.private_key).unwrap();

        assert!(verify(b"message", &signature, &pair.public_key));
        assert!(!verify(b"tampered", &signature, &pair.public_key));
    }

    #[test]
    fn verify_fails_against_other_key() {
        let pair = generate_key_pair().unwrap();
        let other = generate_key_pair().unwrap();
        let signature = sign(b"message", &pair.private_key).unwrap();

        assert!(!verify(b"message", &signature, &other.public_key));
    }

    #[test]
    fn verify_rejects_garbage_inputs() {
        let pair = generate_key_pair().unwrap();
        assert!(!verify(b"message", "zz-not-hex", &pair.public_key));
        assert!(!verify(b"message", "abcd", &pair.public_key));
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let pair = generate_key_pair().unwrap();
        let record = encrypt_key(&pair.private_key, "open sesame").unwrap();

        let recovered = decrypt_key(&record, "open sesame").unwrap();
        assert_eq!(recovered, pair.private_key);
    }

    #[test]
    fn decrypt_with_wrong_password_fails() {
        let pair = generate_key_pair().unwrap();
        let record = encrypt_key(&pair.private_key, "correct").unwrap();

        assert!(matches!(
            decrypt_key(&record, "incorrect"),
            Err(Error::KeyCrypto(_))
        ));
    }

    #[test]
    fn derived_address_is_stable() {
        let pair = generate_key_pair().unwrap();
        let again = address_from_public_key(&pair.public_key).unwrap();
        assert_eq!(pair.address, again);
        assert_eq!(pair.address.len(), ADDRESS_LEN * 2);
    }
}
