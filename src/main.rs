use color_eyre::eyre::OptionExt as _;
use color_eyre::eyre::bail;
use csv::ReaderBuilder;
use csv::Trim;
use tracing_subscriber::EnvFilter;

use tillbook::account::Account;
use tillbook::account::Principal;
use tillbook::account::Role;
use tillbook::command::Command;
use tillbook::engine::LedgerEngine;
use tillbook::engine::LedgerError;
use tillbook::report;
use tillbook::store::AccountStoreError;
use tillbook::transaction::AccountId;
use tillbook::transaction::Decision;
use tillbook::transaction::TransactionKind;

/// Operator identity resolving decision commands; in the full system this
/// is an authenticated admin session from the excluded auth layer.
const OPERATOR: Principal = Principal {
    id: AccountId(0),
    role: Role::Admin,
    active: true,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let commands_path = std::env::args().nth(1).ok_or_eyre("no commands CSV supplied")?;
    let mut commands_reader = ReaderBuilder::new().trim(Trim::All).from_path(commands_path)?;

    let engine = LedgerEngine::new();
    let mut failed_commands = 0usize;

    for command_res in commands_reader.deserialize::<Command>() {
        let command = match command_res {
            Ok(command) => command,
            Err(error) => {
                tracing::warn!("failed to deserialize command, error={error}");
                failed_commands += 1;
                continue;
            }
        };

        if let Err(error) = run_command(&engine, &command) {
            tracing::warn!("failed to run {command}, error={error}");
            failed_commands += 1;
        }
    }

    let report_errors = report::write_to_stdout(engine.list_accounts()?.iter());
    for error in &report_errors {
        tracing::error!("failed to report account, error={error}");
    }

    if failed_commands > 0 || !report_errors.is_empty() {
        bail!(
            "{failed_commands} commands failed, {} report rows failed",
            report_errors.len()
        );
    }
    Ok(())
}

fn run_command(engine: &LedgerEngine, command: &Command) -> Result<(), LedgerError> {
    match command {
        Command::Deposit(cmd) => {
            let principal = ensure_account(engine, cmd.account_id)?;
            engine.submit(&principal, TransactionKind::Deposit, cmd.amount, &cmd.destination)?;
        }
        Command::Withdrawal(cmd) => {
            let principal = ensure_account(engine, cmd.account_id)?;
            engine.submit(&principal, TransactionKind::Withdrawal, cmd.amount, &cmd.destination)?;
        }
        Command::Approve(cmd) => {
            engine.decide(&OPERATOR, cmd.tx_id, Decision::Approve)?;
        }
        Command::Reject(cmd) => {
            engine.decide(&OPERATOR, cmd.tx_id, Decision::Reject)?;
        }
        Command::Deactivate(cmd) => {
            ensure_account(engine, cmd.account_id)?;
            engine.accounts().set_active(cmd.account_id, false)?;
        }
    }
    Ok(())
}

/// Replay inputs reference accounts by id only; first sight of an id seeds
/// an active user account, standing in for the excluded registration layer.
fn ensure_account(engine: &LedgerEngine, id: AccountId) -> Result<Principal, LedgerError> {
    let account = match engine.get_account(id) {
        Ok(account) => account,
        Err(LedgerError::Accounts(AccountStoreError::NotFound { .. })) => {
            let account = Account::new(id, Role::User);
            engine.accounts().insert(account)?;
            account
        }
        Err(error) => return Err(error),
    };
    Ok(Principal::from(&account))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
