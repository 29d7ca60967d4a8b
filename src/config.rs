// src/config.rs
//! Settings loading for applications built on the SDK.
//!
//! Layered sources: an optional `NeoClaims.toml` file, then `NEOCLAIMS_*`
//! environment variables (a `.env` file is honored first). Nothing here is
//! required by the library itself, since the clients take their URLs and
//! script hashes as plain arguments, but issuer/verifier/wallet applications
//! all need the same three values, so the loading lives in one place.

use serde::Deserialize;

use crate::error::Result;

/// Connection settings for a deployment of the claims contracts.
///
/// # Environment Variables
/// - `NEOCLAIMS_RPC_URL`: ledger JSON-RPC endpoint
/// - `NEOCLAIMS_ISSUER_SCRIPT_HASH`: issuer contract script hash
/// - `NEOCLAIMS_ROT_SCRIPT_HASH`: (optional) root-of-trust contract script hash
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Ledger JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Script hash of the issuer's deployed contract
    pub issuer_script_hash: String,

    /// Script hash of the root-of-trust contract, when trust checks are used
    #[serde(default)]
    pub rot_script_hash: Option<String>,
}

impl Settings {
    /// Loads settings from `NeoClaims.toml` (optional) and the environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("NeoClaims").required(false))
            .add_source(config::Environment::with_prefix("NEOCLAIMS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
