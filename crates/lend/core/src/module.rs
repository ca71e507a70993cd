//! The lending runtime module: owned state, collaborators, and the
//! stage-then-commit execution path every operation goes through.

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use zklend_crypto::{Commitment, Identity};

use crate::config::LendingConfig;
use crate::error::LendError;
use crate::events::LendingEvent;
use crate::ledger::{EscrowLedger, Transfer};
use crate::proof::ProofVerifier;
use crate::staging::{Effects, Staged};
use crate::store::{decode, StateKey, StateStore};
use crate::types::{Loan, LoanId, Offer, OfferId, Transaction};

/// Lending module instance.
///
/// Owns the state store, the escrow ledger handle, and the proof verifier.
/// The pool identity is derived at first genesis and persisted; only its
/// public half ever exists.
pub struct LendingModule<S, L, V> {
    store: S,
    ledger: L,
    verifier: V,
    pool: Identity,
    events: Vec<LendingEvent>,
}

impl<S: StateStore, L: EscrowLedger, V: ProofVerifier> LendingModule<S, L, V> {
    /// Initialise the module.
    ///
    /// Values already present in `store` win over the configuration, so a
    /// restarted module keeps its admin, commitment, and pool identity. The
    /// configured pool source is only consulted on first start.
    pub fn genesis(
        config: &LendingConfig,
        mut store: S,
        ledger: L,
        verifier: V,
    ) -> Result<Self, LendError> {
        let stored_pool: Option<Identity> = match store.get(&StateKey::Pool)? {
            Some(bytes) => Some(decode(StateKey::Pool, &bytes)?),
            None => None,
        };
        let pool = match stored_pool {
            Some(pool) => pool,
            None => config.pool.identity()?,
        };

        let effects = {
            let mut staged = Staged::new(&store, &ledger, pool);
            if stored_pool.is_none() {
                staged.put_pool(&pool)?;
            }
            if staged.admin()?.is_none() {
                staged.put_admin(&config.admin)?;
            }
            if let Some(commitment) = &config.credential_commitment {
                if staged.credential_commitment()?.is_none() {
                    staged.put_credential_commitment(commitment)?;
                }
            }
            staged.into_effects()
        };
        let seeded = effects.writes.len();
        store.apply(effects.writes)?;

        info!(
            pool = %pool,
            admin = %config.admin,
            restored_pool = stored_pool.is_some(),
            seeded_keys = seeded,
            "Lending module initialised"
        );

        Ok(Self {
            store,
            ledger,
            verifier,
            pool,
            events: Vec::new(),
        })
    }

    /// Run `body` against a staged view and commit its effects only if it
    /// succeeds.
    pub(crate) fn execute<T, F>(
        &mut self,
        operation: &'static str,
        tx: &Transaction,
        body: F,
    ) -> Result<T, LendError>
    where
        F: FnOnce(&mut Staged<'_, S, L>, &V) -> Result<(T, LendingEvent), LendError>,
    {
        let mut staged = Staged::new(&self.store, &self.ledger, self.pool);
        let outcome = body(&mut staged, &self.verifier);
        let effects = staged.into_effects();

        let (value, event) = match outcome {
            Ok(done) => done,
            Err(err) => {
                warn!(
                    operation,
                    sender = %tx.sender,
                    kind = ?err.kind(),
                    error = %err,
                    "Transaction rejected"
                );
                return Err(err);
            }
        };

        if let Err(err) = self.commit(effects) {
            error!(operation, sender = %tx.sender, error = %err, "Commit failed");
            return Err(err);
        }

        info!(
            operation,
            sender = %tx.sender,
            event = event.name(),
            "Transaction committed"
        );
        self.events.push(event);
        Ok(value)
    }

    /// Apply transfers, then writes. Any failure undoes the transfers that
    /// already went through.
    fn commit(&mut self, effects: Effects) -> Result<(), LendError> {
        let Effects { writes, transfers } = effects;
        let mut applied: Vec<Transfer> = Vec::with_capacity(transfers.len());

        for transfer in transfers {
            if let Err(err) = self.ledger.transfer(
                transfer.asset,
                &transfer.from,
                &transfer.to,
                transfer.amount,
            ) {
                self.rollback(&applied);
                return Err(err.into());
            }
            applied.push(transfer);
        }

        let keys = writes.len();
        if let Err(err) = self.store.apply(writes) {
            self.rollback(&applied);
            return Err(err.into());
        }

        debug!(transfers = applied.len(), writes = keys, "Effects committed");
        Ok(())
    }

    fn rollback(&mut self, applied: &[Transfer]) {
        for transfer in applied.iter().rev() {
            let undo = transfer.reversed();
            if let Err(err) = self
                .ledger
                .transfer(undo.asset, &undo.from, &undo.to, undo.amount)
            {
                error!(
                    asset = %undo.asset,
                    from = %undo.from,
                    to = %undo.to,
                    amount = undo.amount.0,
                    error = %err,
                    "Rollback transfer failed"
                );
            }
        }
    }

    fn load<T: DeserializeOwned>(&self, key: StateKey) -> Result<Option<T>, LendError> {
        match self.store.get(&key)? {
            Some(bytes) => Ok(Some(decode(key, &bytes)?)),
            None => Ok(None),
        }
    }

    pub fn offer(&self, offer_id: OfferId) -> Result<Option<Offer>, LendError> {
        self.load(StateKey::Offer(offer_id))
    }

    pub fn loan(&self, loan_id: LoanId) -> Result<Option<Loan>, LendError> {
        self.load(StateKey::Loan(loan_id))
    }

    pub fn credential_commitment(&self) -> Result<Option<Commitment>, LendError> {
        self.load(StateKey::CredentialCommitment)
    }

    pub fn admin(&self) -> Result<Option<Identity>, LendError> {
        self.load(StateKey::Admin)
    }

    /// Escrow account holding offered funds. No signing key exists for it.
    pub fn pool_identity(&self) -> Identity {
        self.pool
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Events of committed operations, oldest first.
    pub fn events(&self) -> &[LendingEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<LendingEvent> {
        std::mem::take(&mut self.events)
    }
}
