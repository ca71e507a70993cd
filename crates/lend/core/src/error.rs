use std::fmt;

use thiserror::Error;
use zklend_crypto::Identity;

use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::proof::VerifierError;
use crate::store::StoreError;
use crate::types::{Balance, OfferId, OfferStatus, TokenId};

/// Public-input field that failed to match on-chain state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublicInputField {
    Address,
    CredentialCommitment,
    MinPropertyValue,
    MinIncomeMonthly,
}

impl fmt::Display for PublicInputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Address => "Borrower does not match",
            Self::CredentialCommitment => "Credential commitment does not match",
            Self::MinPropertyValue => "Minimum property value does not match",
            Self::MinIncomeMonthly => "Minimum income monthly does not match",
        })
    }
}

/// Rejection classes a submitter can observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    NotFound,
    StateGuard,
    InsufficientFunds,
    ProofMismatch,
    ProofInvalid,
    /// Collaborator or codec fault; not caused by the transaction's content.
    Internal,
}

/// Reasons a lending transaction is rejected. Every variant aborts the whole
/// transaction with no state change.
#[derive(Debug, Error)]
pub enum LendError {
    // --- Authorization ---
    #[error("Sender does not match 'from': sender {sender}, expected {expected}")]
    SenderNotFrom { sender: Identity, expected: Identity },

    #[error("sender {sender} is not the registry admin")]
    NotAdmin { sender: Identity },

    // --- Not found ---
    #[error("{0} not found")]
    OfferNotFound(OfferId),

    // --- State guards ---
    #[error("{0} already exists")]
    OfferExists(OfferId),

    #[error("{offer_id} cannot move from {from} to {to}")]
    InvalidTransition {
        offer_id: OfferId,
        from: OfferStatus,
        to: OfferStatus,
    },

    #[error("offer id mismatch: path {expected}, body {actual}")]
    OfferIdMismatch { expected: OfferId, actual: OfferId },

    #[error("{offer_id}: field '{field}' cannot be changed after creation")]
    ImmutableField {
        offer_id: OfferId,
        field: &'static str,
    },

    // --- Insufficient resources ---
    #[error("From balance is insufficient: {asset} required {required}, available {available}")]
    FromBalanceInsufficient {
        asset: TokenId,
        required: Balance,
        available: Balance,
    },

    // --- Proof checks ---
    #[error("proof public input mismatch: {0}")]
    ProofMismatch(PublicInputField),

    #[error("proof rejected by verifier: {0}")]
    ProofInvalid(#[from] VerifierError),

    // --- Collaborators ---
    #[error("escrow ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl LendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SenderNotFrom { .. } | Self::NotAdmin { .. } => ErrorKind::Authorization,
            Self::OfferNotFound(_) => ErrorKind::NotFound,
            Self::OfferExists(_)
            | Self::InvalidTransition { .. }
            | Self::OfferIdMismatch { .. }
            | Self::ImmutableField { .. } => ErrorKind::StateGuard,
            Self::FromBalanceInsufficient { .. } => ErrorKind::InsufficientFunds,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => ErrorKind::InsufficientFunds,
            Self::ProofMismatch(_) => ErrorKind::ProofMismatch,
            Self::ProofInvalid(_) => ErrorKind::ProofInvalid,
            Self::Ledger(_)
            | Self::Store(_)
            | Self::Config(_)
            | Self::InvariantViolation(_) => ErrorKind::Internal,
        }
    }

    pub fn transition(offer_id: OfferId, from: OfferStatus, to: OfferStatus) -> Self {
        Self::InvalidTransition { offer_id, from, to }
    }
}
