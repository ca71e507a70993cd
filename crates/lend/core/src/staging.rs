//! Transaction-scoped overlay over the state store and escrow ledger.
//!
//! Operations read through a [`Staged`] view, which buffers writes and
//! transfers instead of applying them. Nothing reaches the collaborators until
//! the operation has passed every check and the module commits the resulting
//! [`Effects`].

use tracing::debug;
use zklend_crypto::{Commitment, Identity};

use crate::error::LendError;
use crate::ledger::{EscrowLedger, LedgerError, Transfer};
use crate::store::{decode, encode, StateKey, StateStore, WriteBatch};
use crate::types::{Balance, Loan, LoanId, Offer, OfferId, TokenId};

/// Buffered outcome of a successful operation.
#[derive(Debug, Default)]
pub struct Effects {
    pub writes: WriteBatch,
    pub transfers: Vec<Transfer>,
}

pub struct Staged<'a, S, L> {
    store: &'a S,
    ledger: &'a L,
    pool: Identity,
    writes: WriteBatch,
    transfers: Vec<Transfer>,
}

impl<'a, S: StateStore, L: EscrowLedger> Staged<'a, S, L> {
    pub fn new(store: &'a S, ledger: &'a L, pool: Identity) -> Self {
        Self {
            store,
            ledger,
            pool,
            writes: WriteBatch::new(),
            transfers: Vec::new(),
        }
    }

    pub fn pool(&self) -> Identity {
        self.pool
    }

    fn read(&self, key: StateKey) -> Result<Option<Vec<u8>>, LendError> {
        if let Some(bytes) = self.writes.get(&key) {
            return Ok(Some(bytes.to_vec()));
        }
        Ok(self.store.get(&key)?)
    }

    fn read_typed<T: serde::de::DeserializeOwned>(
        &self,
        key: StateKey,
    ) -> Result<Option<T>, LendError> {
        match self.read(key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn write_typed<T: serde::Serialize>(
        &mut self,
        key: StateKey,
        value: &T,
    ) -> Result<(), LendError> {
        let bytes = encode(key, value)?;
        self.writes.put(key, bytes);
        Ok(())
    }

    pub fn offer(&self, offer_id: OfferId) -> Result<Option<Offer>, LendError> {
        self.read_typed(StateKey::Offer(offer_id))
    }

    pub fn require_offer(&self, offer_id: OfferId) -> Result<Offer, LendError> {
        self.offer(offer_id)?.ok_or(LendError::OfferNotFound(offer_id))
    }

    pub fn put_offer(&mut self, offer: &Offer) -> Result<(), LendError> {
        self.write_typed(StateKey::Offer(offer.offer_id), offer)
    }

    pub fn loan(&self, loan_id: LoanId) -> Result<Option<Loan>, LendError> {
        self.read_typed(StateKey::Loan(loan_id))
    }

    pub fn put_loan(&mut self, loan: &Loan) -> Result<(), LendError> {
        self.write_typed(StateKey::Loan(loan.loan_id), loan)
    }

    pub fn credential_commitment(&self) -> Result<Option<Commitment>, LendError> {
        self.read_typed(StateKey::CredentialCommitment)
    }

    pub fn put_credential_commitment(&mut self, commitment: &Commitment) -> Result<(), LendError> {
        self.write_typed(StateKey::CredentialCommitment, commitment)
    }

    pub fn admin(&self) -> Result<Option<Identity>, LendError> {
        self.read_typed(StateKey::Admin)
    }

    pub fn put_admin(&mut self, admin: &Identity) -> Result<(), LendError> {
        self.write_typed(StateKey::Admin, admin)
    }

    pub fn put_pool(&mut self, pool: &Identity) -> Result<(), LendError> {
        self.write_typed(StateKey::Pool, pool)
    }

    /// Ledger balance net of transfers staged so far.
    pub fn balance(&self, asset: TokenId, owner: &Identity) -> Result<Balance, LendError> {
        let mut net = self.ledger.balance(asset, owner).0 as i128;
        for transfer in self.transfers.iter().filter(|t| t.asset == asset) {
            if transfer.from == *owner {
                net -= transfer.amount.0 as i128;
            }
            if transfer.to == *owner {
                net += transfer.amount.0 as i128;
            }
        }
        u64::try_from(net).map(Balance).map_err(|_| {
            LendError::InvariantViolation(format!(
                "staged balance of {owner} in {asset} out of range: {net}"
            ))
        })
    }

    /// Stage a transfer after checking it against the net balance.
    pub fn transfer(
        &mut self,
        asset: TokenId,
        from: &Identity,
        to: &Identity,
        amount: Balance,
    ) -> Result<(), LendError> {
        let available = self.balance(asset, from)?;
        if available < amount {
            return Err(LendError::FromBalanceInsufficient {
                asset,
                required: amount,
                available,
            });
        }
        if from != to {
            self.balance(asset, to)?
                .checked_add(amount)
                .ok_or(LedgerError::Overflow {
                    asset,
                    owner: *to,
                    amount,
                })?;
        }

        debug!(asset = %asset, from = %from, to = %to, amount = amount.0, "Transfer staged");
        self.transfers.push(Transfer {
            asset,
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn into_effects(self) -> Effects {
        Effects {
            writes: self.writes,
            transfers: self.transfers,
        }
    }
}
