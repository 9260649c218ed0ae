//! Wire model for the batch replay driver.
//!
//! One CSV row per command; the `type` column selects the variant and the
//! remaining columns are required or ignored per variant, mirroring how the
//! ledger's callers address accounts and transactions.

use serde::Deserialize;
use serde::Deserializer;

use crate::transaction::AccountId;
use crate::transaction::PositiveAmount;
use crate::transaction::TransactionId;

#[derive(Debug, Clone, parse_display::Display)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Command {
    #[display("{0}")]
    Deposit(DepositCmd),
    #[display("{0}")]
    Withdrawal(WithdrawalCmd),
    #[display("{0}")]
    Approve(ApproveCmd),
    #[display("{0}")]
    Reject(RejectCmd),
    #[display("{0}")]
    Deactivate(DeactivateCmd),
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CsvRow {
            r#type: String,
            account: Option<AccountId>,
            tx: Option<TransactionId>,
            amount: Option<PositiveAmount>,
            address: Option<String>,
        }

        let row = CsvRow::deserialize(deserializer)?;

        fn submission_fields<E: serde::de::Error>(
            account: Option<AccountId>,
            amount: Option<PositiveAmount>,
            address: Option<String>,
        ) -> Result<(AccountId, PositiveAmount, String), E> {
            let account_id = account.ok_or_else(|| E::missing_field("account"))?;
            let amount = amount.ok_or_else(|| E::missing_field("amount"))?;
            let destination = address.ok_or_else(|| E::missing_field("address"))?;
            Ok((account_id, amount, destination))
        }

        let cmd = match row.r#type.as_str() {
            "deposit" => {
                let (account_id, amount, destination) = submission_fields(row.account, row.amount, row.address)?;
                Self::Deposit(DepositCmd {
                    account_id,
                    amount,
                    destination,
                })
            }
            "withdrawal" => {
                let (account_id, amount, destination) = submission_fields(row.account, row.amount, row.address)?;
                Self::Withdrawal(WithdrawalCmd {
                    account_id,
                    amount,
                    destination,
                })
            }
            "approve" => Self::Approve(ApproveCmd {
                tx_id: row.tx.ok_or_else(|| serde::de::Error::missing_field("tx"))?,
            }),
            "reject" => Self::Reject(RejectCmd {
                tx_id: row.tx.ok_or_else(|| serde::de::Error::missing_field("tx"))?,
            }),
            "deactivate" => Self::Deactivate(DeactivateCmd {
                account_id: row.account.ok_or_else(|| serde::de::Error::missing_field("account"))?,
            }),
            other => {
                return Err(serde::de::Error::unknown_variant(
                    other,
                    &["deposit", "withdrawal", "approve", "reject", "deactivate"],
                ));
            }
        };

        Ok(cmd)
    }
}

#[derive(Debug, Clone, parse_display::Display)]
#[display("cmd=(deposit account_id={account_id} amount={amount} destination={destination})")]
#[cfg_attr(test, derive(PartialEq))]
pub struct DepositCmd {
    pub account_id: AccountId,
    pub amount: PositiveAmount,
    pub destination: String,
}

#[derive(Debug, Clone, parse_display::Display)]
#[display("cmd=(withdrawal account_id={account_id} amount={amount} destination={destination})")]
#[cfg_attr(test, derive(PartialEq))]
pub struct WithdrawalCmd {
    pub account_id: AccountId,
    pub amount: PositiveAmount,
    pub destination: String,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("cmd=(approve tx_id={tx_id})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct ApproveCmd {
    pub tx_id: TransactionId,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("cmd=(reject tx_id={tx_id})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct RejectCmd {
    pub tx_id: TransactionId,
}

#[derive(Debug, Clone, Copy, parse_display::Display)]
#[display("cmd=(deactivate account_id={account_id})")]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub struct DeactivateCmd {
    pub account_id: AccountId,
}
