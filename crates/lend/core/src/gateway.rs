//! Credential-gated acceptance.
//!
//! A proof is bound to the global credential commitment and to the specific
//! offer's thresholds, so it cannot be replayed against an offer with looser
//! terms.

use tracing::debug;
use zklend_crypto::Identity;

use crate::error::{LendError, PublicInputField};
use crate::events::LendingEvent;
use crate::ledger::EscrowLedger;
use crate::module::LendingModule;
use crate::proof::{CredentialProof, ProofVerifier};
use crate::store::StateStore;
use crate::types::{Loan, OfferId, OfferStatus, Transaction};

impl<S: StateStore, L: EscrowLedger, V: ProofVerifier> LendingModule<S, L, V> {
    /// Accept an offer on behalf of `borrower`.
    ///
    /// Public inputs must equal, in order: the borrower, the registered
    /// commitment, and the offer's two thresholds. The verifier runs last. On
    /// success the offer becomes `accepted`, a loan with the same id is stored,
    /// and the escrowed amount moves from the pool to the borrower.
    pub fn accept_offer(
        &mut self,
        tx: &Transaction,
        offer_id: OfferId,
        borrower: Identity,
        proof: &CredentialProof,
    ) -> Result<Loan, LendError> {
        self.execute("accept_offer", tx, |staged, verifier| {
            let mut offer = staged.require_offer(offer_id)?;
            if !offer.status.can_transition_to(OfferStatus::Accepted) {
                return Err(LendError::transition(
                    offer_id,
                    offer.status,
                    OfferStatus::Accepted,
                ));
            }

            let input = &proof.public_input;
            if input.address != borrower {
                return Err(LendError::ProofMismatch(PublicInputField::Address));
            }
            match staged.credential_commitment()? {
                Some(current) if current == input.credential_commitment => {}
                _ => {
                    return Err(LendError::ProofMismatch(
                        PublicInputField::CredentialCommitment,
                    ))
                }
            }
            if input.min_property_value != offer.property_threshold() {
                return Err(LendError::ProofMismatch(PublicInputField::MinPropertyValue));
            }
            if input.min_income_monthly != offer.income_threshold() {
                return Err(LendError::ProofMismatch(PublicInputField::MinIncomeMonthly));
            }

            verifier.verify(proof)?;
            debug!(offer_id = %offer_id, borrower = %borrower, "Eligibility proof accepted");

            offer.status = OfferStatus::Accepted;
            offer.borrower = Some(borrower);
            let loan = Loan::from_accepted_offer(&offer)?;
            if staged.loan(loan.loan_id)?.is_some() {
                return Err(LendError::InvariantViolation(format!(
                    "{} already exists for {}",
                    loan.loan_id, offer_id
                )));
            }

            let pool = staged.pool();
            staged.transfer(offer.token_id, &pool, &borrower, offer.amount)?;
            staged.put_offer(&offer)?;
            staged.put_loan(&loan)?;

            let event = LendingEvent::OfferAccepted {
                offer_id,
                loan_id: loan.loan_id,
                borrower,
                disbursed: loan.amount,
            };
            Ok((loan, event))
        })
    }
}
