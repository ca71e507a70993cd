use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::hex;

const CREDENTIAL_DOMAIN: &str = "zklend-credential-v1";

/// 32-byte BLAKE3 commitment.
///
/// The credential commitment registry stores one of these; proofs carry the
/// commitment they were generated against as a public input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Ok(Self(hex::decode_32(hex)?))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Start a domain-separated commitment.
    pub fn builder(domain: &str) -> CommitmentBuilder {
        CommitmentBuilder::new(domain)
    }

    /// Commit to an off-chain credential record: a salt followed by the
    /// record's numeric fields in order.
    pub fn credential(salt: &[u8; 32], fields: &[u64]) -> Self {
        let mut builder = Self::builder(CREDENTIAL_DOMAIN).bytes(salt);
        for field in fields {
            builder = builder.u64(*field);
        }
        builder.finish()
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c:{}", self.short_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.short_hex())
    }
}

impl From<Commitment> for String {
    fn from(commitment: Commitment) -> Self {
        commitment.to_hex()
    }
}

impl TryFrom<String> for Commitment {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Incremental, length-prefixed BLAKE3 hasher with a domain separation tag.
pub struct CommitmentBuilder {
    hasher: blake3::Hasher,
}

impl CommitmentBuilder {
    pub fn new(domain: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Domain separation tag
        hasher.update(&(domain.len() as u64).to_le_bytes());
        hasher.update(domain.as_bytes());
        Self { hasher }
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn commitment(self, value: &Commitment) -> Self {
        self.bytes(value.as_bytes())
    }

    pub fn finish(self) -> Commitment {
        Commitment(*self.hasher.finalize().as_bytes())
    }
}
