//! Reconciliation (lettrage) of same-account line sets.
//!
//! Reconciliation is a pure bookkeeping annotation: it tags a set of
//! lines that net to zero with a shared code. It never alters amounts and
//! never triggers equilibrium recomputation.

use rand::Rng;
use rust_decimal::Decimal;

use grandlivre_shared::types::{AccountId, LineId};

use crate::error::LedgerError;

use super::types::EntryStatus;

/// Minimum number of lines in a reconciliation set.
pub const MIN_RECONCILIATION_LINES: usize = 2;

/// Length of a generated reconciliation code.
pub const LETTRAGE_CODE_LEN: usize = 6;

/// Maximum length of a caller-supplied reconciliation code.
pub const LETTRAGE_CODE_MAX_LEN: usize = 10;

const LETTRAGE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The view of a line needed to validate a reconciliation set.
#[derive(Debug, Clone)]
pub struct ReconcilableLine {
    /// Line identifier.
    pub line_id: LineId,
    /// Account the line posts to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Whether the line is already reconciled.
    pub reconciled: bool,
    /// Status of the owning entry.
    pub entry_status: EntryStatus,
}

/// Validates a reconciliation set.
///
/// Preconditions: at least 2 lines, one single account across the set,
/// every owning entry Validated or Closed, no line already reconciled,
/// and the set nets to zero exactly.
///
/// # Errors
///
/// Returns the first violated precondition as a `LedgerError`.
pub fn validate_reconciliation_set(lines: &[ReconcilableLine]) -> Result<(), LedgerError> {
    if lines.len() < MIN_RECONCILIATION_LINES {
        return Err(LedgerError::ReconciliationSetTooSmall { count: lines.len() });
    }

    let account = lines[0].account_id;
    for line in lines {
        if line.account_id != account {
            return Err(LedgerError::ReconciliationMixedAccounts);
        }
        if !line.entry_status.is_reconcilable() {
            return Err(LedgerError::EntryNotValidated(line.line_id));
        }
        if line.reconciled {
            return Err(LedgerError::LineAlreadyReconciled(line.line_id));
        }
    }

    let debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let credit: Decimal = lines.iter().map(|l| l.credit).sum();
    if debit != credit {
        return Err(LedgerError::ReconciliationUnbalanced { debit, credit });
    }

    Ok(())
}

/// Validates a caller-supplied reconciliation code.
///
/// # Errors
///
/// Returns `LedgerError::InvalidReconciliationCode` for blank, overlong,
/// or non-alphanumeric codes.
pub fn validate_lettrage_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty()
        || code.len() > LETTRAGE_CODE_MAX_LEN
        || !code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return Err(LedgerError::InvalidReconciliationCode(code.to_string()));
    }
    Ok(())
}

/// Generates a random 6-character reconciliation code (A-Z, 0-9).
#[must_use]
pub fn generate_lettrage_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..LETTRAGE_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..LETTRAGE_ALPHABET.len());
            char::from(LETTRAGE_ALPHABET[idx])
        })
        .collect()
}
