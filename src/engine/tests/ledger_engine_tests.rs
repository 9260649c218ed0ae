use std::str::FromStr;
use std::sync::Arc;
use std::sync::Barrier;

use assert2::let_assert;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use crate::account::Account;
use crate::account::Principal;
use crate::account::Role;
use crate::engine::LedgerEngine;
use crate::engine::LedgerError;
use crate::store::AccountStoreError;
use crate::store::SettingsStoreError;
use crate::store::TransactionLogError;
use crate::transaction::AccountId;
use crate::transaction::Decision;
use crate::transaction::PositiveAmount;
use crate::transaction::Transaction;
use crate::transaction::TransactionId;
use crate::transaction::TransactionKind;
use crate::transaction::TransactionStatus;

const TEST_ACCOUNT_ID: AccountId = AccountId(1);

const OPERATOR: Principal = Principal {
    id: AccountId(0),
    role: Role::Admin,
    active: true,
};

#[test]
fn approving_a_deposit_credits_the_balance() {
    let (engine, principal) = engine_with_user_account();
    let tx = submit_deposit(&engine, &principal, "500.00");
    assert!(tx.is_pending());

    let resolved = engine.decide(&OPERATOR, tx.id(), Decision::Approve).unwrap();
    assert_eq!(TransactionStatus::Approved, resolved.status());
    assert_eq!(dec("500.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn approving_a_withdrawal_debits_the_balance() {
    let (engine, principal) = funded_engine("500.00");
    let tx = submit_withdrawal(&engine, &principal, "200.00");

    let resolved = engine.decide(&OPERATOR, tx.id(), Decision::Approve).unwrap();
    assert_eq!(TransactionStatus::Approved, resolved.status());
    assert_eq!(dec("300.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn rejection_is_balance_neutral() {
    let (engine, principal) = engine_with_user_account();
    let tx = submit_deposit(&engine, &principal, "50.00");

    let resolved = engine.decide(&OPERATOR, tx.id(), Decision::Reject).unwrap();
    assert_eq!(TransactionStatus::Rejected, resolved.status());
    assert_eq!(Decimal::ZERO, engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn insufficient_funds_blocks_approval_and_keeps_transaction_pending() {
    let (engine, principal) = funded_engine("100.00");
    let tx = submit_withdrawal(&engine, &principal, "150.00");

    let res = engine.decide(&OPERATOR, tx.id(), Decision::Approve);
    let_assert!(Err(LedgerError::InsufficientFunds { tx: refused, balance }) = res);
    assert_eq!(tx.id(), refused.id());
    assert_eq!(dec("100.00"), balance);
    assert_eq!(dec("100.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
    assert!(engine.list_pending().unwrap().iter().any(|pending| pending.id() == tx.id()));

    // The operator can still reject the request afterwards.
    let resolved = engine.decide(&OPERATOR, tx.id(), Decision::Reject).unwrap();
    assert_eq!(TransactionStatus::Rejected, resolved.status());
    assert_eq!(dec("100.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn second_decision_on_a_resolved_transaction_fails_without_mutation() {
    let (engine, principal) = engine_with_user_account();
    let tx = submit_deposit(&engine, &principal, "10.00");
    engine.decide(&OPERATOR, tx.id(), Decision::Approve).unwrap();

    let res = engine.decide(&OPERATOR, tx.id(), Decision::Approve);
    let_assert!(Err(LedgerError::Transactions(TransactionLogError::AlreadyResolved { tx: already })) = res);
    assert_eq!(TransactionStatus::Approved, already.status());
    assert_eq!(dec("10.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn concurrent_decisions_on_one_transaction_apply_once() {
    let (engine, principal) = funded_engine("100.00");
    let tx = submit_withdrawal(&engine, &principal, "60.00");

    let engine = Arc::new(engine);
    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let id = tx.id();
            std::thread::spawn(move || {
                barrier.wait();
                engine.decide(&OPERATOR, id, Decision::Approve)
            })
        })
        .collect();
    let results: Vec<Result<Transaction, LedgerError>> =
        handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    assert_eq!(1, results.iter().filter(|res| res.is_ok()).count());
    for res in &results {
        if let Err(error) = res {
            assert!(
                matches!(error, LedgerError::Transactions(TransactionLogError::AlreadyResolved { .. })),
                "unexpected loser error={error:?}",
            );
        }
    }
    assert_eq!(dec("40.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
}

#[test]
fn end_to_end_deposit_withdrawal_flow() {
    let (engine, principal) = engine_with_user_account();

    let t1 = submit_deposit(&engine, &principal, "500.00");
    engine.decide(&OPERATOR, t1.id(), Decision::Approve).unwrap();
    assert_eq!(dec("500.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());

    let t2 = submit_withdrawal(&engine, &principal, "200.00");
    engine.decide(&OPERATOR, t2.id(), Decision::Approve).unwrap();
    assert_eq!(dec("300.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());

    // Over-balance withdrawals are accepted as pending: the balance may
    // change before review.
    let t3 = submit_withdrawal(&engine, &principal, "1000.00");
    let res = engine.decide(&OPERATOR, t3.id(), Decision::Approve);
    let_assert!(Err(LedgerError::InsufficientFunds { .. }) = res);
    assert_eq!(dec("300.00"), engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());

    let pending: Vec<TransactionId> = engine.list_pending().unwrap().iter().map(Transaction::id).collect();
    assert_eq!(vec![t3.id()], pending);
}

#[test]
fn balance_always_matches_signed_sum_of_approved_transactions() {
    let (engine, principal) = engine_with_user_account();

    for (kind, value, decision) in [
        (TransactionKind::Deposit, "100.00", Some(Decision::Approve)),
        (TransactionKind::Deposit, "50.00", Some(Decision::Approve)),
        (TransactionKind::Withdrawal, "30.00", Some(Decision::Approve)),
        (TransactionKind::Deposit, "20.00", Some(Decision::Reject)),
        (TransactionKind::Withdrawal, "500.00", None),
    ] {
        let tx = engine.submit(&principal, kind, amount(value), "addr").unwrap();
        if let Some(decision) = decision {
            engine.decide(&OPERATOR, tx.id(), decision).unwrap();
        }
    }

    let expected = engine
        .list_by_account(TEST_ACCOUNT_ID)
        .unwrap()
        .iter()
        .filter(|tx| tx.status() == TransactionStatus::Approved)
        .fold(Decimal::ZERO, |acc, tx| match tx.kind() {
            TransactionKind::Deposit => acc + tx.amount().as_inner(),
            TransactionKind::Withdrawal => acc - tx.amount().as_inner(),
        });
    assert_eq!(expected, engine.get_account(TEST_ACCOUNT_ID).unwrap().balance());
    assert_eq!(dec("120.00"), expected);
}

#[test]
fn submit_for_inactive_account_is_forbidden() {
    let (engine, principal) = engine_with_user_account();
    engine.accounts().set_active(TEST_ACCOUNT_ID, false).unwrap();

    let res = engine.submit(&principal, TransactionKind::Deposit, amount("1.00"), "addr");
    let_assert!(Err(LedgerError::InactiveSubmitter { account }) = res);
    assert_eq!(TEST_ACCOUNT_ID, account.id());
    assert!(engine.list_by_account(TEST_ACCOUNT_ID).unwrap().is_empty());
}

#[test]
fn submit_for_unknown_account_errors() {
    let engine = LedgerEngine::new();
    let ghost = Principal {
        id: AccountId(77),
        role: Role::User,
        active: true,
    };
    let res = engine.submit(&ghost, TransactionKind::Deposit, amount("1.00"), "addr");
    let_assert!(Err(LedgerError::Accounts(AccountStoreError::NotFound { id })) = res);
    assert_eq!(AccountId(77), id);
}

#[test]
fn submit_with_blank_destination_errors() {
    let (engine, principal) = engine_with_user_account();
    let res = engine.submit(&principal, TransactionKind::Withdrawal, amount("1.00"), "  ");
    let_assert!(Err(LedgerError::Transactions(TransactionLogError::EmptyDestination)) = res);
    assert!(engine.list_by_account(TEST_ACCOUNT_ID).unwrap().is_empty());
}

#[test]
fn submit_below_configured_minimum_errors() {
    let (engine, principal) = engine_with_user_account();
    engine.set_minimums(&OPERATOR, dec("10.00"), dec("25.00")).unwrap();

    let res = engine.submit(&principal, TransactionKind::Withdrawal, amount("24.99"), "addr");
    let_assert!(Err(LedgerError::BelowMinimum { kind, minimum, .. }) = res);
    assert_eq!(TransactionKind::Withdrawal, kind);
    assert_eq!(dec("25.00"), minimum);

    // At the threshold the submission goes through.
    engine
        .submit(&principal, TransactionKind::Deposit, amount("10.00"), "addr")
        .unwrap();
}

#[test]
fn decide_requires_operator_role() {
    let (engine, principal) = engine_with_user_account();
    let tx = submit_deposit(&engine, &principal, "5.00");

    let res = engine.decide(&principal, tx.id(), Decision::Approve);
    let_assert!(Err(LedgerError::OperatorRequired { operation, .. }) = res);
    assert_eq!("decide", operation);
    assert!(engine.get_account(TEST_ACCOUNT_ID).unwrap().balance().is_zero());
    assert!(engine.list_pending().unwrap().iter().any(|pending| pending.id() == tx.id()));
}

#[test]
fn decide_unknown_transaction_errors() {
    let engine = LedgerEngine::new();
    let res = engine.decide(&OPERATOR, TransactionId(404), Decision::Reject);
    let_assert!(Err(LedgerError::Transactions(TransactionLogError::NotFound { id })) = res);
    assert_eq!(TransactionId(404), id);
}

#[test]
fn deposit_address_is_operator_gated() {
    let (engine, principal) = engine_with_user_account();
    assert_eq!("", engine.deposit_address().unwrap());

    let res = engine.set_deposit_address(&principal, "treasury-wallet");
    let_assert!(Err(LedgerError::OperatorRequired { .. }) = res);

    let res = engine.set_deposit_address(&OPERATOR, " ");
    let_assert!(Err(LedgerError::Settings(SettingsStoreError::EmptyDepositAddress)) = res);

    engine.set_deposit_address(&OPERATOR, "treasury-wallet").unwrap();
    assert_eq!("treasury-wallet", engine.deposit_address().unwrap());
}

#[test]
fn admin_accounts_can_hold_balances_too() {
    let engine = LedgerEngine::new();
    let admin_account = Account::new(AccountId(2), Role::Admin);
    engine.accounts().insert(admin_account).unwrap();
    let admin = Principal::from(&admin_account);

    let tx = engine
        .submit(&admin, TransactionKind::Deposit, amount("9.99"), "addr")
        .unwrap();
    engine.decide(&admin, tx.id(), Decision::Approve).unwrap();
    assert_eq!(dec("9.99"), engine.get_account(AccountId(2)).unwrap().balance());
}

#[test]
fn list_by_account_returns_full_history_in_creation_order() {
    let (engine, principal) = funded_engine("100.00");
    let w1 = submit_withdrawal(&engine, &principal, "10.00");
    let w2 = submit_withdrawal(&engine, &principal, "20.00");
    engine.decide(&OPERATOR, w1.id(), Decision::Reject).unwrap();

    let history: Vec<TransactionId> = engine
        .list_by_account(TEST_ACCOUNT_ID)
        .unwrap()
        .iter()
        .map(Transaction::id)
        .collect();
    assert_eq!(3, history.len());
    assert_eq!(w1.id(), history[1]);
    assert_eq!(w2.id(), history[2]);
}

fn engine_with_user_account() -> (LedgerEngine, Principal) {
    let engine = LedgerEngine::new();
    let account = Account::new(TEST_ACCOUNT_ID, Role::User);
    engine.accounts().insert(account).unwrap();
    (engine, Principal::from(&account))
}

fn funded_engine(balance: &str) -> (LedgerEngine, Principal) {
    let (engine, principal) = engine_with_user_account();
    let funding = submit_deposit(&engine, &principal, balance);
    engine.decide(&OPERATOR, funding.id(), Decision::Approve).unwrap();
    (engine, principal)
}

fn submit_deposit(engine: &LedgerEngine, principal: &Principal, value: &str) -> Transaction {
    engine
        .submit(principal, TransactionKind::Deposit, amount(value), "deposit-wallet")
        .unwrap()
}

fn submit_withdrawal(engine: &LedgerEngine, principal: &Principal, value: &str) -> Transaction {
    engine
        .submit(principal, TransactionKind::Withdrawal, amount(value), "payout-wallet")
        .unwrap()
}

fn amount(value: &str) -> PositiveAmount {
    PositiveAmount::try_from(dec(value)).unwrap()
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}
