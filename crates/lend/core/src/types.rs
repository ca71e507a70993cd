use std::fmt;

use serde::{Deserialize, Serialize};
use zklend_crypto::Identity;

/// Caller-assigned offer identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub u64);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offer#{}", self.0)
    }
}

/// Loan identifier. Derived 1:1 from the originating offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl From<OfferId> for LoanId {
    fn from(offer_id: OfferId) -> Self {
        LoanId(offer_id.0)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loan#{}", self.0)
    }
}

/// Asset identifier on the escrow ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

/// Non-negative fixed-point balance in the asset's minor units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(pub u64);

impl Balance {
    pub const ZERO: Balance = Balance(0);

    pub fn checked_add(self, other: Balance) -> Option<Balance> {
        self.0.checked_add(other.0).map(Balance)
    }

    pub fn checked_sub(self, other: Balance) -> Option<Balance> {
        self.0.checked_sub(other.0).map(Balance)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Balance(value)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Offer lifecycle state.
///
/// Stored as its integer code (`offered = 0` .. `cancelled = 4`); in memory it
/// is always the enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OfferStatus {
    Offered,
    Accepted,
    Cleared,
    Delayed,
    Cancelled,
}

impl OfferStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Offered => 0,
            Self::Accepted => 1,
            Self::Cleared => 2,
            Self::Delayed => 3,
            Self::Cancelled => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::Cleared => "cleared",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Transitions reachable through this module's operations.
    ///
    /// `cleared` and `delayed` are owned by repayment logic that does not
    /// exist yet, so nothing here moves into or out of them.
    pub fn can_transition_to(self, next: OfferStatus) -> bool {
        match (self, next) {
            (Self::Offered, Self::Accepted) | (Self::Offered, Self::Cancelled) => true,
            (Self::Offered, _) => false,
            (Self::Accepted, _) | (Self::Cleared, _) | (Self::Delayed, _) => false,
            (Self::Cancelled, _) => false,
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<OfferStatus> for u8 {
    fn from(status: OfferStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for OfferStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Offered),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Cleared),
            3 => Ok(Self::Delayed),
            4 => Ok(Self::Cancelled),
            other => Err(format!("unknown offer status code {other}")),
        }
    }
}

/// Loan lifecycle state. A loan starts `accepted`; the other states are set by
/// repayment logic outside this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LoanStatus {
    Accepted,
    Cleared,
    Delayed,
}

impl LoanStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Accepted => 1,
            Self::Cleared => 2,
            Self::Delayed => 3,
        }
    }
}

impl From<LoanStatus> for u8 {
    fn from(status: LoanStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for LoanStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Cleared),
            3 => Ok(Self::Delayed),
            other => Err(format!("unknown loan status code {other}")),
        }
    }
}

/// A lender's proposal to lend `amount` of `token_id` to any borrower who can
/// prove eligibility against the stated thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub lender: Identity,
    /// Set only once the offer is accepted.
    pub borrower: Option<Identity>,
    pub token_id: TokenId,
    pub amount: Balance,
    pub min_property_value: Option<u64>,
    pub min_income_monthly: Option<u64>,
    pub status: OfferStatus,
}

impl Offer {
    pub fn new(
        offer_id: OfferId,
        lender: Identity,
        token_id: TokenId,
        amount: impl Into<Balance>,
    ) -> Self {
        Self {
            offer_id,
            lender,
            borrower: None,
            token_id,
            amount: amount.into(),
            min_property_value: None,
            min_income_monthly: None,
            status: OfferStatus::Offered,
        }
    }

    pub fn with_min_property_value(mut self, value: u64) -> Self {
        self.min_property_value = Some(value);
        self
    }

    pub fn with_min_income_monthly(mut self, value: u64) -> Self {
        self.min_income_monthly = Some(value);
        self
    }

    pub fn with_amount(mut self, amount: impl Into<Balance>) -> Self {
        self.amount = amount.into();
        self
    }

    /// Threshold as the proof circuit sees it: absent means zero.
    pub fn property_threshold(&self) -> u64 {
        self.min_property_value.unwrap_or(0)
    }

    pub fn income_threshold(&self) -> u64 {
        self.min_income_monthly.unwrap_or(0)
    }
}

/// Active lending relationship created when an offer is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub lender: Identity,
    pub borrower: Identity,
    pub token_id: TokenId,
    pub amount: Balance,
    pub status: LoanStatus,
}

/// Transaction envelope delivered by dispatch. The sender is authenticated
/// upstream and cannot be forged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Identity,
}

impl Transaction {
    pub fn from_sender(sender: Identity) -> Self {
        Self { sender }
    }
}
