//! Committed key-value state backing the offer map, loan map, credential
//! commitment, and admin identity.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LoanId, OfferId};

/// State-store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("serialization error for {key:?}: {message}")]
    Serialization { key: StateKey, message: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Typed keys of every value this module persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKey {
    Offer(OfferId),
    Loan(LoanId),
    CredentialCommitment,
    Admin,
    /// Public identity of the escrow pool, fixed at first genesis.
    Pool,
}

/// Ordered set of pending writes. Later writes to the same key win.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: BTreeMap<StateKey, Vec<u8>>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: StateKey, value: Vec<u8>) {
        self.writes.insert(key, value);
    }

    pub fn get(&self, key: &StateKey) -> Option<&[u8]> {
        self.writes.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Vec<u8>)> {
        self.writes.iter()
    }

    pub fn into_writes(self) -> impl Iterator<Item = (StateKey, Vec<u8>)> {
        self.writes.into_iter()
    }
}

/// Committed mapping storage with optional-value semantics.
pub trait StateStore {
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&mut self, key: StateKey, value: Vec<u8>) -> Result<(), StoreError>;

    /// Apply every write in the batch or none of them.
    ///
    /// The default is only atomic for backends whose `set` cannot fail
    /// part-way; transactional backends should override it.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        for (key, value) in batch.into_writes() {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// BTreeMap-backed state store. Iteration order is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InMemoryStateStore {
    entries: BTreeMap<StateKey, Vec<u8>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.keys()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: StateKey, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        self.entries.extend(batch.into_writes());
        Ok(())
    }
}

pub(crate) fn encode<T: Serialize>(key: StateKey, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
        key,
        message: e.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(key: StateKey, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
        key,
        message: e.to_string(),
    })
}
