//! Business rule validation for ledger operations.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::account::Account;
use crate::error::LedgerError;
use crate::tiers::Counterparty;

use super::entry::Entry;
use super::equilibrium::compute_totals;
use super::types::EntryStatus;

/// Minimum number of lines for a validatable entry.
pub const MIN_LINES: usize = 2;

/// Decimal places carried by monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Normalizes an amount to 2 decimal places (banker's rounding).
#[must_use]
pub fn normalize_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Validates a debit/credit pair: exactly one side strictly positive, the
/// other exactly zero.
///
/// # Errors
///
/// Returns `NegativeAmount`, `BothDebitAndCredit`, or `ZeroAmount`.
pub fn validate_line_amounts(debit: Decimal, credit: Decimal) -> Result<(), LedgerError> {
    if debit < Decimal::ZERO || credit < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if debit > Decimal::ZERO && credit > Decimal::ZERO {
        return Err(LedgerError::BothDebitAndCredit);
    }
    if debit == Decimal::ZERO && credit == Decimal::ZERO {
        return Err(LedgerError::ZeroAmount);
    }
    Ok(())
}

/// Validates that an account accepts new postings.
///
/// # Errors
///
/// Returns `LedgerError::AccountInactive` for deactivated accounts.
pub fn validate_line_account(account: &Account) -> Result<(), LedgerError> {
    if account.active {
        Ok(())
    } else {
        Err(LedgerError::AccountInactive(account.code.clone()))
    }
}

/// Validates a counterparty on a line.
///
/// A blocked counterparty rejects postings. On a class-4 account the
/// account code must begin with the first 4 digits of the counterparty's
/// collective account code.
///
/// # Errors
///
/// Returns `LedgerError::TiersBlocked` or `LedgerError::TiersAccountMismatch`.
pub fn validate_line_tiers(account: &Account, tiers: &Counterparty) -> Result<(), LedgerError> {
    if tiers.blocked {
        return Err(LedgerError::TiersBlocked {
            code: tiers.code.clone(),
            reason: tiers.blocked_reason.clone().unwrap_or_default(),
        });
    }
    if account.is_auxiliary() {
        let collective = tiers.kind.collective_account_code();
        if !account.code.starts_with(&collective[..4]) {
            return Err(LedgerError::TiersAccountMismatch {
                account: account.code.clone(),
                tiers: tiers.code.clone(),
            });
        }
    }
    Ok(())
}

/// Validates that an entry is still editable (lines and financial header
/// fields may only change while Draft).
///
/// # Errors
///
/// Returns `LedgerError::EntryNotEditable` otherwise.
pub fn validate_editable(status: EntryStatus) -> Result<(), LedgerError> {
    if status.is_editable() {
        Ok(())
    } else {
        Err(LedgerError::EntryNotEditable(status))
    }
}

/// Validates that an entry may be deleted: Draft only.
///
/// # Errors
///
/// Returns `LedgerError::CanOnlyDeleteDraft` otherwise.
pub fn validate_deletable(status: EntryStatus) -> Result<(), LedgerError> {
    if status == EntryStatus::Draft {
        Ok(())
    } else {
        Err(LedgerError::CanOnlyDeleteDraft(status))
    }
}

/// Validates the one-way `validate` transition of an entry.
///
/// Requires Draft status, at least 2 lines, and exact equilibrium.
///
/// # Errors
///
/// Returns `AlreadyValidated`, `TooFewLines`, or `UnbalancedEntry`.
pub fn validate_for_validation(entry: &Entry) -> Result<(), LedgerError> {
    if entry.status != EntryStatus::Draft {
        return Err(LedgerError::AlreadyValidated(entry.status));
    }
    if entry.lines.len() < MIN_LINES {
        return Err(LedgerError::TooFewLines {
            count: entry.lines.len(),
        });
    }
    let totals = compute_totals(&entry.lines);
    if !totals.balanced {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }
    Ok(())
}
