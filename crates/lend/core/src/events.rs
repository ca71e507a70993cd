use serde::{Deserialize, Serialize};
use zklend_crypto::{Commitment, Identity};

use crate::types::{Balance, LoanId, OfferId, TokenId};

/// Record of a committed operation, appended in execution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LendingEvent {
    OfferCreated {
        offer_id: OfferId,
        lender: Identity,
        token_id: TokenId,
        amount: Balance,
    },
    OfferUpdated {
        offer_id: OfferId,
        previous_amount: Balance,
        amount: Balance,
    },
    OfferCancelled {
        offer_id: OfferId,
        refunded: Balance,
    },
    OfferAccepted {
        offer_id: OfferId,
        loan_id: LoanId,
        borrower: Identity,
        disbursed: Balance,
    },
    CredentialCommitmentUpdated {
        commitment: Commitment,
    },
    AdminUpdated {
        previous: Identity,
        admin: Identity,
    },
}

impl LendingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OfferCreated { .. } => "offer_created",
            Self::OfferUpdated { .. } => "offer_updated",
            Self::OfferCancelled { .. } => "offer_cancelled",
            Self::OfferAccepted { .. } => "offer_accepted",
            Self::CredentialCommitmentUpdated { .. } => "credential_commitment_updated",
            Self::AdminUpdated { .. } => "admin_updated",
        }
    }
}
