//! Offer lifecycle: create, update, cancel.
//!
//! Offered funds sit in the pool account from creation until the offer is
//! cancelled (refunded to the lender) or accepted (disbursed to the borrower).

use std::cmp::Ordering;

use tracing::debug;

use crate::error::LendError;
use crate::events::LendingEvent;
use crate::ledger::EscrowLedger;
use crate::module::LendingModule;
use crate::proof::ProofVerifier;
use crate::store::StateStore;
use crate::types::{Balance, Offer, OfferId, OfferStatus, Transaction};

impl<S: StateStore, L: EscrowLedger, V: ProofVerifier> LendingModule<S, L, V> {
    /// Escrow `offer.amount` from the lender into the pool and store the
    /// offer as `offered`.
    pub fn create_offer(&mut self, tx: &Transaction, offer: Offer) -> Result<(), LendError> {
        self.execute("create_offer", tx, |staged, _| {
            if tx.sender != offer.lender {
                return Err(LendError::SenderNotFrom {
                    sender: tx.sender,
                    expected: offer.lender,
                });
            }
            if staged.offer(offer.offer_id)?.is_some() {
                return Err(LendError::OfferExists(offer.offer_id));
            }

            let pool = staged.pool();
            staged.transfer(offer.token_id, &offer.lender, &pool, offer.amount)?;

            let stored = Offer {
                status: OfferStatus::Offered,
                borrower: None,
                ..offer
            };
            staged.put_offer(&stored)?;

            let event = LendingEvent::OfferCreated {
                offer_id: stored.offer_id,
                lender: stored.lender,
                token_id: stored.token_id,
                amount: stored.amount,
            };
            Ok(((), event))
        })
    }

    /// Cancel an `offered` offer and refund its escrow to the lender.
    pub fn cancel_offer(&mut self, tx: &Transaction, offer_id: OfferId) -> Result<(), LendError> {
        self.execute("cancel_offer", tx, |staged, _| {
            let mut offer = staged.require_offer(offer_id)?;
            if tx.sender != offer.lender {
                return Err(LendError::SenderNotFrom {
                    sender: tx.sender,
                    expected: offer.lender,
                });
            }
            if !offer.status.can_transition_to(OfferStatus::Cancelled) {
                return Err(LendError::transition(
                    offer_id,
                    offer.status,
                    OfferStatus::Cancelled,
                ));
            }

            let pool = staged.pool();
            staged.transfer(offer.token_id, &pool, &offer.lender, offer.amount)?;

            offer.status = OfferStatus::Cancelled;
            staged.put_offer(&offer)?;

            Ok((
                (),
                LendingEvent::OfferCancelled {
                    offer_id,
                    refunded: offer.amount,
                },
            ))
        })
    }

    /// Replace the terms of an `offered` offer.
    ///
    /// Amount and thresholds are overwritten as given; a changed amount moves
    /// the difference between lender and pool. Lender and asset cannot change,
    /// and the stored offer stays `offered` with no borrower.
    pub fn update_offer(
        &mut self,
        tx: &Transaction,
        offer_id: OfferId,
        new_offer: Offer,
    ) -> Result<(), LendError> {
        self.execute("update_offer", tx, |staged, _| {
            let current = staged.require_offer(offer_id)?;
            if new_offer.offer_id != offer_id {
                return Err(LendError::OfferIdMismatch {
                    expected: offer_id,
                    actual: new_offer.offer_id,
                });
            }
            if tx.sender != current.lender {
                return Err(LendError::SenderNotFrom {
                    sender: tx.sender,
                    expected: current.lender,
                });
            }
            if current.status != OfferStatus::Offered {
                return Err(LendError::transition(
                    offer_id,
                    current.status,
                    OfferStatus::Offered,
                ));
            }
            if new_offer.lender != current.lender {
                return Err(LendError::ImmutableField {
                    offer_id,
                    field: "lender",
                });
            }
            if new_offer.token_id != current.token_id {
                return Err(LendError::ImmutableField {
                    offer_id,
                    field: "token_id",
                });
            }

            let pool = staged.pool();
            match new_offer.amount.cmp(&current.amount) {
                Ordering::Greater => {
                    let delta = Balance(new_offer.amount.0 - current.amount.0);
                    staged.transfer(current.token_id, &current.lender, &pool, delta)?;
                }
                Ordering::Less => {
                    let delta = Balance(current.amount.0 - new_offer.amount.0);
                    staged.transfer(current.token_id, &pool, &current.lender, delta)?;
                }
                Ordering::Equal => debug!(offer_id = %offer_id, "Offer amount unchanged"),
            }

            let stored = Offer {
                status: OfferStatus::Offered,
                borrower: None,
                ..new_offer
            };
            staged.put_offer(&stored)?;

            Ok((
                (),
                LendingEvent::OfferUpdated {
                    offer_id,
                    previous_amount: current.amount,
                    amount: stored.amount,
                },
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{LendingConfig, PoolKeySource};
    use crate::error::{ErrorKind, LendError};
    use crate::ledger::{EscrowLedger, InMemoryLedger};
    use crate::module::LendingModule;
    use crate::proof::AttestationVerifier;
    use crate::store::InMemoryStateStore;
    use crate::types::{Balance, Offer, OfferId, OfferStatus, TokenId, Transaction};
    use zklend_crypto::{Identity, Keypair};

    type Module = LendingModule<InMemoryStateStore, InMemoryLedger, AttestationVerifier>;

    const T: TokenId = TokenId(1);

    fn id(seed: u8) -> Identity {
        Keypair::from_seed([seed; 32]).identity()
    }

    fn lender() -> Identity {
        id(10)
    }

    fn module() -> Module {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(T, lender(), 1_000u64).unwrap();
        LendingModule::genesis(
            &LendingConfig::new(id(1)).with_pool(PoolKeySource::seed(&[7u8; 32])),
            InMemoryStateStore::new(),
            ledger,
            AttestationVerifier::new(id(2)),
        )
        .unwrap()
    }

    fn as_lender() -> Transaction {
        Transaction::from_sender(lender())
    }

    #[test]
    fn create_normalises_status_and_borrower() {
        let mut module = module();
        let mut offer = Offer::new(OfferId(1), lender(), T, 100u64);
        offer.status = OfferStatus::Accepted;
        offer.borrower = Some(id(3));

        module.create_offer(&as_lender(), offer).unwrap();

        let stored = module.offer(OfferId(1)).unwrap().unwrap();
        assert_eq!(stored.status, OfferStatus::Offered);
        assert_eq!(stored.borrower, None);
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let mut module = module();
        module
            .create_offer(&as_lender(), Offer::new(OfferId(1), lender(), T, 100u64))
            .unwrap();

        let err = module
            .create_offer(&as_lender(), Offer::new(OfferId(1), lender(), T, 5u64))
            .unwrap_err();
        assert!(matches!(err, LendError::OfferExists(OfferId(1))));
        assert_eq!(module.ledger().balance(T, &lender()), Balance(900));
    }

    #[test]
    fn create_rejects_foreign_sender() {
        let mut module = module();
        let err = module
            .create_offer(
                &Transaction::from_sender(id(4)),
                Offer::new(OfferId(1), lender(), T, 100u64),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(module.offer(OfferId(1)).unwrap(), None);
    }

    #[test]
    fn zero_amount_offer_is_allowed() {
        let mut module = module();
        module
            .create_offer(&as_lender(), Offer::new(OfferId(1), lender(), T, 0u64))
            .unwrap();
        assert_eq!(module.ledger().balance(T, &lender()), Balance(1_000));
    }

    #[test]
    fn update_rejects_mismatched_id_and_immutable_fields() {
        let mut module = module();
        module
            .create_offer(&as_lender(), Offer::new(OfferId(1), lender(), T, 100u64))
            .unwrap();

        let err = module
            .update_offer(
                &as_lender(),
                OfferId(1),
                Offer::new(OfferId(2), lender(), T, 100u64),
            )
            .unwrap_err();
        assert!(matches!(err, LendError::OfferIdMismatch { .. }));

        let err = module
            .update_offer(
                &as_lender(),
                OfferId(1),
                Offer::new(OfferId(1), id(4), T, 100u64),
            )
            .unwrap_err();
        assert!(matches!(err, LendError::ImmutableField { field: "lender", .. }));

        let err = module
            .update_offer(
                &as_lender(),
                OfferId(1),
                Offer::new(OfferId(1), lender(), TokenId(2), 100u64),
            )
            .unwrap_err();
        assert!(matches!(err, LendError::ImmutableField { field: "token_id", .. }));
    }

    #[test]
    fn update_overwrites_thresholds() {
        let mut module = module();
        module
            .create_offer(&as_lender(), Offer::new(OfferId(1), lender(), T, 100u64))
            .unwrap();

        let updated = Offer::new(OfferId(1), lender(), T, 100u64)
            .with_min_property_value(10)
            .with_min_income_monthly(20);
        module
            .update_offer(&as_lender(), OfferId(1), updated.clone())
            .unwrap();

        assert_eq!(module.offer(OfferId(1)).unwrap(), Some(updated));
    }
}
