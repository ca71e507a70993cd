//! # zklend-core
//!
//! State-transition core of the ZkLend collateralized-lending module.
//!
//! Lenders escrow funds into a keyless pool account by creating **offers**.
//! A borrower accepts an offer by presenting an eligibility proof whose public
//! inputs match the registered credential commitment and the offer's
//! thresholds; acceptance derives a **loan** and disburses the escrow.
//!
//! Every operation is a single transaction: it runs against a staged view of
//! the [`StateStore`] and [`EscrowLedger`] and commits all of its effects or
//! none of them.
//!
//! ```text
//! offered ──accept──▶ accepted
//!    │
//!    └──cancel──▶ cancelled
//! ```

#![deny(unsafe_code)]

mod admin;
pub mod config;
pub mod error;
pub mod events;
mod gateway;
pub mod ledger;
mod loan;
mod module;
mod offers;
pub mod proof;
mod staging;
pub mod store;
pub mod types;

pub use config::{ConfigError, LendingConfig, PoolKeySource};
pub use error::{ErrorKind, LendError, PublicInputField};
pub use events::LendingEvent;
pub use ledger::{EscrowLedger, InMemoryLedger, LedgerError, Transfer};
pub use module::LendingModule;
pub use proof::{AttestationVerifier, CredentialProof, ProofVerifier, PublicInput, VerifierError};
pub use store::{InMemoryStateStore, StateKey, StateStore, StoreError, WriteBatch};
pub use types::{
    Balance, Loan, LoanId, LoanStatus, Offer, OfferId, OfferStatus, TokenId, Transaction,
};
