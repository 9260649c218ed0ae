use chrono::DateTime;
use chrono::Utc;
use color_eyre::eyre::bail;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct AccountId(pub u64);

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct TransactionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, parse_display::Display)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

/// Lifecycle state of a [`Transaction`]. Starts at `Pending` and transitions
/// exactly once, to `Approved` or `Rejected`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, parse_display::Display)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

/// Operator verdict on a pending [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// A deposit or withdrawal request against a single account.
///
/// Every field except `status` is immutable once created; `status` is
/// mutated exactly once, by the transaction log's conditional resolve.
#[derive(Debug, Clone, parse_display::Display)]
#[display("tx=({kind} id={id} account_id={account_id} amount={amount} status={status})")]
#[cfg_attr(test, derive(PartialEq))]
pub struct Transaction {
    id: TransactionId,
    account_id: AccountId,
    kind: TransactionKind,
    amount: PositiveAmount,
    destination_address: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(
        id: TransactionId,
        account_id: AccountId,
        kind: TransactionKind,
        amount: PositiveAmount,
        destination_address: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            kind,
            amount,
            destination_address,
            status: TransactionStatus::Pending,
            created_at,
        }
    }

    pub const fn id(&self) -> TransactionId {
        self.id
    }

    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub const fn amount(&self) -> PositiveAmount {
        self.amount
    }

    pub fn destination_address(&self) -> &str {
        &self.destination_address
    }

    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self.status, TransactionStatus::Pending)
    }

    /// Sole status mutator, called by the transaction log's resolve.
    pub(crate) const fn mark(&mut self, status: TransactionStatus) {
        self.status = status;
    }
}

/// This permits to avoid checks on non-positive amounts while handling
/// submissions and approvals.
#[derive(Debug, Copy, Clone, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct PositiveAmount(Decimal);

impl TryFrom<Decimal> for PositiveAmount {
    type Error = color_eyre::Report;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value <= Decimal::ZERO {
            bail!("amount must be positive, value={value:?}");
        }
        Ok(Self(value))
    }
}

impl PositiveAmount {
    pub const fn as_inner(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as serde::Deserialize>::deserialize(deserializer)?;
        Self::try_from(decimal).map_err(|error| serde::de::Error::custom(error.to_string()))
    }
}
