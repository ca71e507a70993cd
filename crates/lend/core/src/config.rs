//! Genesis configuration for the lending module.

use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zklend_crypto::{hex, keyless_identity, keyless_identity_from_seed, Commitment, Identity};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pool seed: {0}")]
    InvalidPoolSeed(zklend_crypto::CryptoError),
}

/// Where the escrow pool identity comes from at first genesis. Once a pool
/// identity is stored, restarts reuse it and ignore this setting.
///
/// No variant leaves a usable signing key behind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PoolKeySource {
    /// Fresh key from the operating system RNG, discarded immediately.
    #[default]
    Random,
    /// Curve point hashed from a public 32-byte hex seed. Nobody holds its
    /// discrete log, so the seed need not be kept secret.
    Seed { seed: String },
}

impl PoolKeySource {
    pub fn seed(seed: &[u8; 32]) -> Self {
        Self::Seed {
            seed: hex::encode(seed),
        }
    }

    pub fn identity(&self) -> Result<Identity, ConfigError> {
        match self {
            Self::Random => Ok(keyless_identity(&mut OsRng)),
            Self::Seed { seed } => {
                let bytes = hex::decode_32(seed).map_err(ConfigError::InvalidPoolSeed)?;
                Ok(keyless_identity_from_seed(&bytes))
            }
        }
    }
}

/// Lending module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Initial registry admin.
    pub admin: Identity,
    /// Initial credential commitment, if one is already published.
    #[serde(default)]
    pub credential_commitment: Option<Commitment>,
    #[serde(default)]
    pub pool: PoolKeySource,
}

impl LendingConfig {
    pub fn new(admin: Identity) -> Self {
        Self {
            admin,
            credential_commitment: None,
            pool: PoolKeySource::Random,
        }
    }

    pub fn with_credential_commitment(mut self, commitment: Commitment) -> Self {
        self.credential_commitment = Some(commitment);
        self
    }

    pub fn with_pool(mut self, pool: PoolKeySource) -> Self {
        self.pool = pool;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
