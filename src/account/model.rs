use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::transaction::AccountId;

/// Closed set of roles; checked via exhaustive matching, never string
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, parse_display::Display)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A principal holding a scalar balance.
///
/// `balance` is the only field the ledger engine ever mutates; `active` is
/// owned by the excluded registration layer and only read here.
#[derive(Debug, Copy, Clone, parse_display::Display)]
#[display("account=(id={id} role={role} balance={balance} active={active})")]
pub struct Account {
    pub(in crate::account) id: AccountId,
    pub(in crate::account) role: Role,
    pub(in crate::account) balance: Decimal,
    pub(in crate::account) active: bool,
}

impl Account {
    pub const fn new(id: AccountId, role: Role) -> Self {
        Self {
            id,
            role,
            balance: Decimal::ZERO,
            active: true,
        }
    }

    pub const fn id(&self) -> AccountId {
        self.id
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Authenticated caller identity, as supplied by the excluded auth layer.
///
/// The stores stay authoritative for account existence and activity; a
/// principal only carries the authenticated id and role claims across the
/// engine boundary.
#[derive(Debug, Copy, Clone)]
pub struct Principal {
    pub id: AccountId,
    pub role: Role,
    pub active: bool,
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            role: account.role(),
            active: account.is_active(),
        }
    }
}
