use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::account::Account;
use crate::account::Role;
use crate::transaction::AccountId;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv serialization error for account={account}, source_error={source:?}")]
    Csv {
        account: Account,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Write the supplied [`Account`]s to stdout as CSV in ascending id order.
/// Returns a [`Vec`] of [`ReportError`] representing all the errors
/// encountered during reporting.
///
/// The function accepts accounts in any order and sorts once before
/// writing: reproducible output for downstream processing and snapshot
/// testing, at a one-shot `O(n log n)` cost when the report is produced.
pub fn write_to_stdout<'a, I>(accounts: I) -> Vec<ReportError>
where
    I: IntoIterator<Item = &'a Account>,
{
    let mut rows: Vec<&Account> = accounts.into_iter().collect();
    rows.sort_unstable_by_key(|account| account.id());

    let mut writer = Writer::from_writer(std::io::stdout());
    let mut errors: Vec<ReportError> = Vec::new();

    for account in rows {
        if let Err(source) = writer.serialize(AccountReport::from(account)) {
            errors.push(ReportError::Csv {
                account: *account,
                source,
            });
        }
    }

    if let Err(io_err) = writer.flush() {
        errors.push(ReportError::Io(io_err));
    }

    errors
}

#[derive(Serialize)]
struct AccountReport {
    account_id: AccountId,
    role: Role,
    balance: Decimal,
    active: bool,
}

impl From<&Account> for AccountReport {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id(),
            role: account.role(),
            balance: account.balance(),
            active: account.is_active(),
        }
    }
}
