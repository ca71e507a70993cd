use crate::error::LendError;
use crate::types::{Loan, LoanStatus, Offer, OfferStatus};

impl Loan {
    /// Derive the loan record for an offer that has just been accepted.
    ///
    /// Pure: copies lender, borrower, asset and amount, and reuses the offer
    /// id as the loan id. Callers must pass an offer already moved to
    /// `accepted` with a borrower set.
    pub fn from_accepted_offer(offer: &Offer) -> Result<Loan, LendError> {
        if offer.status != OfferStatus::Accepted {
            return Err(LendError::InvariantViolation(format!(
                "loan derived from {} in status {}",
                offer.offer_id, offer.status
            )));
        }
        let borrower = offer.borrower.ok_or_else(|| {
            LendError::InvariantViolation(format!(
                "loan derived from {} without a borrower",
                offer.offer_id
            ))
        })?;

        Ok(Loan {
            loan_id: offer.offer_id.into(),
            lender: offer.lender,
            borrower,
            token_id: offer.token_id,
            amount: offer.amount,
            status: LoanStatus::Accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Balance, LoanId, OfferId, TokenId};
    use zklend_crypto::Keypair;

    fn accepted_offer() -> Offer {
        let lender = Keypair::from_seed([1u8; 32]).identity();
        let borrower = Keypair::from_seed([2u8; 32]).identity();
        let mut offer = Offer::new(OfferId(7), lender, TokenId(3), 100u64)
            .with_min_property_value(50_000)
            .with_min_income_monthly(2_000);
        offer.status = OfferStatus::Accepted;
        offer.borrower = Some(borrower);
        offer
    }

    #[test]
    fn loan_copies_offer_terms_and_id() {
        let offer = accepted_offer();
        let loan = Loan::from_accepted_offer(&offer).unwrap();

        assert_eq!(loan.loan_id, LoanId(7));
        assert_eq!(loan.lender, offer.lender);
        assert_eq!(Some(loan.borrower), offer.borrower);
        assert_eq!(loan.token_id, TokenId(3));
        assert_eq!(loan.amount, Balance(100));
        assert_eq!(loan.status, LoanStatus::Accepted);
    }

    #[test]
    fn derivation_is_deterministic() {
        let offer = accepted_offer();
        assert_eq!(
            Loan::from_accepted_offer(&offer).unwrap(),
            Loan::from_accepted_offer(&offer).unwrap()
        );
    }

    #[test]
    fn refuses_offer_that_was_not_accepted() {
        let mut offer = accepted_offer();
        offer.status = OfferStatus::Offered;
        assert!(matches!(
            Loan::from_accepted_offer(&offer),
            Err(LendError::InvariantViolation(_))
        ));

        let mut offer = accepted_offer();
        offer.borrower = None;
        assert!(Loan::from_accepted_offer(&offer).is_err());
    }
}
