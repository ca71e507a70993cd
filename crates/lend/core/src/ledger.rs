//! Escrow ledger boundary.
//!
//! The token-balance ledger is owned by another module; this crate only reads
//! balances and requests transfers. Implementations must fail closed: a
//! transfer that returns an error has moved nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zklend_crypto::Identity;

use crate::types::{Balance, TokenId};

/// Errors returned by escrow ledger implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: {owner} holds {available} of {asset}, needs {required}")]
    InsufficientFunds {
        asset: TokenId,
        owner: Identity,
        required: Balance,
        available: Balance,
    },

    #[error("balance overflow crediting {owner} with {amount} of {asset}")]
    Overflow {
        asset: TokenId,
        owner: Identity,
        amount: Balance,
    },

    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// One requested movement of funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub asset: TokenId,
    pub from: Identity,
    pub to: Identity,
    pub amount: Balance,
}

impl Transfer {
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self
        }
    }
}

/// Atomic balance query/transfer primitive keyed by (asset, owner).
pub trait EscrowLedger {
    fn balance(&self, asset: TokenId, owner: &Identity) -> Balance;

    fn transfer(
        &mut self,
        asset: TokenId,
        from: &Identity,
        to: &Identity,
        amount: Balance,
    ) -> Result<(), LedgerError>;
}

/// BTreeMap-backed ledger used for tests, demos, and embedding.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: BTreeMap<(TokenId, Identity), Balance>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `owner` out of thin air. Genesis/test funding only.
    pub fn mint(
        &mut self,
        asset: TokenId,
        owner: Identity,
        amount: impl Into<Balance>,
    ) -> Result<(), LedgerError> {
        let amount = amount.into();
        let current = self.balance(asset, &owner);
        let next = current.checked_add(amount).ok_or(LedgerError::Overflow {
            asset,
            owner,
            amount,
        })?;
        self.balances.insert((asset, owner), next);
        Ok(())
    }

    /// Total supply of one asset across all holders.
    pub fn total_supply(&self, asset: TokenId) -> u128 {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, balance)| balance.0 as u128)
            .sum()
    }
}

impl EscrowLedger for InMemoryLedger {
    fn balance(&self, asset: TokenId, owner: &Identity) -> Balance {
        self.balances
            .get(&(asset, *owner))
            .copied()
            .unwrap_or(Balance::ZERO)
    }

    fn transfer(
        &mut self,
        asset: TokenId,
        from: &Identity,
        to: &Identity,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let available = self.balance(asset, from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                asset,
                owner: *from,
                required: amount,
                available,
            })?;

        if from == to || amount.is_zero() {
            return Ok(());
        }

        let credited = self
            .balance(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                asset,
                owner: *to,
                amount,
            })?;

        // Both sides validated; apply together.
        self.balances.insert((asset, *from), debited);
        self.balances.insert((asset, *to), credited);

        debug!(
            asset = %asset,
            from = %from,
            to = %to,
            amount = amount.0,
            "Ledger transfer applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zklend_crypto::Keypair;

    fn id(seed: u8) -> Identity {
        Keypair::from_seed([seed; 32]).identity()
    }

    const T: TokenId = TokenId(1);

    #[test]
    fn transfer_moves_funds() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(T, id(1), 1000u64).unwrap();
        ledger.transfer(T, &id(1), &id(2), Balance(100)).unwrap();

        assert_eq!(ledger.balance(T, &id(1)), Balance(900));
        assert_eq!(ledger.balance(T, &id(2)), Balance(100));
        assert_eq!(ledger.total_supply(T), 1000);
    }

    #[test]
    fn insufficient_transfer_fails_closed() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(T, id(1), 50u64).unwrap();
        let err = ledger.transfer(T, &id(1), &id(2), Balance(51)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance(T, &id(1)), Balance(50));
        assert_eq!(ledger.balance(T, &id(2)), Balance::ZERO);
    }

    #[test]
    fn overflow_on_credit_fails_closed() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(T, id(1), 10u64).unwrap();
        ledger.mint(T, id(2), u64::MAX).unwrap();
        let err = ledger.transfer(T, &id(1), &id(2), Balance(1)).unwrap_err();

        assert!(matches!(err, LedgerError::Overflow { .. }));
        assert_eq!(ledger.balance(T, &id(1)), Balance(10));
    }

    #[test]
    fn assets_are_isolated() {
        let mut ledger = InMemoryLedger::new();
        ledger.mint(T, id(1), 10u64).unwrap();
        assert_eq!(ledger.balance(TokenId(2), &id(1)), Balance::ZERO);
        assert!(ledger
            .transfer(TokenId(2), &id(1), &id(2), Balance(1))
            .is_err());
    }

    #[test]
    fn reversed_swaps_parties() {
        let t = Transfer {
            asset: T,
            from: id(1),
            to: id(2),
            amount: Balance(5),
        };
        let r = t.reversed();
        assert_eq!((r.from, r.to, r.amount), (id(2), id(1), Balance(5)));
    }
}
