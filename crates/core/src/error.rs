//! Unified error taxonomy for ledger operations.
//!
//! Every rejected mutation surfaces one of these variants and leaves
//! persisted state untouched. Variants are classified into kinds
//! (validation, state, consistency, reference, concurrency, internal)
//! for callers that dispatch on the failure class rather than the exact
//! variant.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use grandlivre_shared::types::{EntryId, ExerciseId, LineId, PeriodId};

use crate::account::{AccountClass, AccountNature};
use crate::fiscal::exercise::ExerciseStatus;
use crate::fiscal::period::PeriodStatus;
use crate::ledger::types::EntryStatus;
use crate::tiers::CounterpartyKind;

/// Failure class of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Operation not permitted in the current lifecycle state.
    State,
    /// A ledger invariant would be violated.
    Consistency,
    /// A referenced entity is missing.
    Reference,
    /// A race detected by the transaction layer.
    Concurrency,
    /// Database or unexpected failure.
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Account code is not exactly 8 digits with a valid class.
    #[error("Account code must be exactly 8 digits with class 1-9: {0}")]
    InvalidAccountCode(String),

    /// Account nature not permitted for the class.
    #[error("Nature {nature} is not allowed for class {class}")]
    NatureNotAllowed {
        /// The account class.
        class: AccountClass,
        /// The rejected nature.
        nature: AccountNature,
    },

    /// Journal code is not 1-10 uppercase alphanumerics.
    #[error("Journal code must be 1-10 uppercase alphanumerics: {0}")]
    InvalidJournalCode(String),

    /// Counterparty code does not match `<KIND><5 digits>`.
    #[error("Counterparty code must match <KIND><5 digits>: {0}")]
    InvalidTiersCode(String),

    /// Employee counterparties require a matricule.
    #[error("A matricule is required for an employee counterparty")]
    MissingMatricule,

    /// Counterparty profile does not correspond to the kind.
    #[error("Counterparty profile does not match kind {0}")]
    ProfileKindMismatch(CounterpartyKind),

    /// A line must carry a strictly positive debit or credit.
    #[error("A line must carry a debit or a credit")]
    ZeroAmount,

    /// Amounts cannot be negative.
    #[error("Amounts cannot be negative")]
    NegativeAmount,

    /// A line cannot carry both a debit and a credit.
    #[error("A line cannot carry both a debit and a credit")]
    BothDebitAndCredit,

    /// End date must be after start date.
    #[error("End date {end} must be after start date {start}")]
    InvalidDateRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    /// An exercise cannot exceed 18 months.
    #[error("An exercise cannot exceed 18 months ({days} days requested)")]
    ExerciseTooLong {
        /// Requested duration in days.
        days: i64,
    },

    /// A unique code is already taken.
    #[error("Code already in use: {0}")]
    DuplicateCode(String),

    /// Reconciliation code is blank, overlong, or non-alphanumeric.
    #[error("Invalid reconciliation code: {0}")]
    InvalidReconciliationCode(String),

    // ========== State Errors ==========
    /// Lines and financial fields only change while draft.
    #[error("Entry is not editable in status {0}")]
    EntryNotEditable(EntryStatus),

    /// Validation is a one-way transition from draft.
    #[error("Entry cannot be validated from status {0}")]
    AlreadyValidated(EntryStatus),

    /// Only draft entries can be deleted.
    #[error("Only draft entries can be deleted (status {0})")]
    CanOnlyDeleteDraft(EntryStatus),

    /// Closing requires an open period.
    #[error("Period cannot be closed from status {0}")]
    PeriodNotOpen(PeriodStatus),

    /// Locking requires a closed period.
    #[error("Period cannot be locked from status {0}")]
    PeriodNotClosed(PeriodStatus),

    /// Periods close strictly in ascending number order.
    #[error("Earlier periods of the exercise are still open")]
    EarlierPeriodsOpen,

    /// Posting gate: period open and exercise open or provisional.
    #[error("Posting not allowed: period {period}, exercise {exercise}")]
    PostingNotAllowed {
        /// Period status at the time of the attempt.
        period: PeriodStatus,
        /// Exercise status at the time of the attempt.
        exercise: ExerciseStatus,
    },

    /// At most two exercises may be open at once.
    #[error("At most two exercises may be open simultaneously")]
    TooManyOpenExercises,

    /// Opening requires an exercise in preparation.
    #[error("Exercise cannot be opened from status {0}")]
    ExerciseNotInPreparation(ExerciseStatus),

    /// Provisional close requires an open exercise.
    #[error("Exercise is not open (status {0})")]
    ExerciseNotOpen(ExerciseStatus),

    /// Definitive close requires open or provisional close.
    #[error("Exercise cannot be definitively closed from status {0}")]
    ExerciseNotClosable(ExerciseStatus),

    /// Definitive close must happen within 6 months of the end date.
    #[error("Definitive close deadline passed ({deadline})")]
    CloseDeadlinePassed {
        /// The deadline that was missed.
        deadline: NaiveDate,
    },

    /// Carry-forward requires a definitively closed exercise.
    #[error("Exercise is not closed (status {0})")]
    ExerciseNotClosed(ExerciseStatus),

    /// Carry-forward generation runs at most once.
    #[error("Carry-forward entries have already been generated")]
    CarryForwardAlreadyGenerated,

    /// When another exercise is open, the new one must start after it.
    #[error("Exercise starting {start} must start after the open exercise ({other_start})")]
    ExerciseNotConsecutive {
        /// Start of the exercise being opened.
        start: NaiveDate,
        /// Start of the exercise already open.
        other_start: NaiveDate,
    },

    /// A blocked counterparty rejects postings.
    #[error("Counterparty {code} is blocked: {reason}")]
    TiersBlocked {
        /// Counterparty code.
        code: String,
        /// Blocking reason.
        reason: String,
    },

    /// An inactive account rejects postings.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// An inactive journal rejects new entries.
    #[error("Journal {0} is inactive")]
    JournalInactive(String),

    // ========== Consistency Errors ==========
    /// Debits and credits must match exactly.
    #[error("Entry is not balanced: debit {debit}, credit {credit}")]
    UnbalancedEntry {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// A validatable entry needs at least two lines.
    #[error("Entry must have at least 2 lines ({count} present)")]
    TooFewLines {
        /// Number of lines present.
        count: usize,
    },

    /// The entry date must fall inside its period.
    #[error("Date {date} is outside the period {start}..{end}")]
    DateOutsidePeriod {
        /// The rejected date.
        date: NaiveDate,
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// A reconciliation set must net to zero.
    #[error("Reconciliation set does not net to zero: debit {debit}, credit {credit}")]
    ReconciliationUnbalanced {
        /// Total debit of the set.
        debit: Decimal,
        /// Total credit of the set.
        credit: Decimal,
    },

    /// A reconciliation set spans a single account.
    #[error("Reconciliation set spans more than one account")]
    ReconciliationMixedAccounts,

    /// A reconciliation set needs at least two lines.
    #[error("Reconciliation needs at least 2 lines ({count} given)")]
    ReconciliationSetTooSmall {
        /// Number of lines given.
        count: usize,
    },

    /// Only lines of validated or closed entries reconcile.
    #[error("Line {0} belongs to an entry that is not validated")]
    EntryNotValidated(LineId),

    /// A line reconciles at most once.
    #[error("Line {0} is already reconciled")]
    LineAlreadyReconciled(LineId),

    /// Unreconcile found no line carrying the code.
    #[error("No line carries reconciliation code {0}")]
    NothingToUnreconcile(String),

    /// Class-4 account and counterparty collective account must agree.
    #[error("Account {account} does not correspond to counterparty {tiers}")]
    TiersAccountMismatch {
        /// The account code on the line.
        account: String,
        /// The counterparty code on the line.
        tiers: String,
    },

    // ========== Reference Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(String),

    /// Counterparty not found.
    #[error("Counterparty not found: {0}")]
    TiersNotFound(String),

    /// Exercise not found.
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(ExerciseId),

    /// Period not found.
    #[error("Period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// No period covers the date.
    #[error("No period found for date {0}")]
    NoPeriodForDate(NaiveDate),

    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Line not found.
    #[error("Line not found: {0}")]
    LineNotFound(LineId),

    /// The chart of accounts is missing a collective account. This is a
    /// fatal configuration error, not a validation error.
    #[error("Collective account {0} is missing; seed the chart of accounts first")]
    MissingCollectiveAccount(String),

    // ========== Concurrency Errors ==========
    /// The transaction layer detected a race; retried once, then surfaced.
    #[error("Concurrent modification detected, please retry")]
    SerializationConflict,

    // ========== Internal Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAccountCode(_)
            | Self::NatureNotAllowed { .. }
            | Self::InvalidJournalCode(_)
            | Self::InvalidTiersCode(_)
            | Self::MissingMatricule
            | Self::ProfileKindMismatch(_)
            | Self::ZeroAmount
            | Self::NegativeAmount
            | Self::BothDebitAndCredit
            | Self::InvalidDateRange { .. }
            | Self::ExerciseTooLong { .. }
            | Self::DuplicateCode(_)
            | Self::InvalidReconciliationCode(_) => ErrorKind::Validation,

            Self::EntryNotEditable(_)
            | Self::AlreadyValidated(_)
            | Self::CanOnlyDeleteDraft(_)
            | Self::PeriodNotOpen(_)
            | Self::PeriodNotClosed(_)
            | Self::EarlierPeriodsOpen
            | Self::PostingNotAllowed { .. }
            | Self::TooManyOpenExercises
            | Self::ExerciseNotInPreparation(_)
            | Self::ExerciseNotOpen(_)
            | Self::ExerciseNotClosable(_)
            | Self::CloseDeadlinePassed { .. }
            | Self::ExerciseNotClosed(_)
            | Self::CarryForwardAlreadyGenerated
            | Self::ExerciseNotConsecutive { .. }
            | Self::TiersBlocked { .. }
            | Self::AccountInactive(_)
            | Self::JournalInactive(_) => ErrorKind::State,

            Self::UnbalancedEntry { .. }
            | Self::TooFewLines { .. }
            | Self::DateOutsidePeriod { .. }
            | Self::ReconciliationUnbalanced { .. }
            | Self::ReconciliationMixedAccounts
            | Self::ReconciliationSetTooSmall { .. }
            | Self::EntryNotValidated(_)
            | Self::LineAlreadyReconciled(_)
            | Self::NothingToUnreconcile(_)
            | Self::TiersAccountMismatch { .. } => ErrorKind::Consistency,

            Self::AccountNotFound(_)
            | Self::JournalNotFound(_)
            | Self::TiersNotFound(_)
            | Self::ExerciseNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::NoPeriodForDate(_)
            | Self::EntryNotFound(_)
            | Self::LineNotFound(_)
            | Self::MissingCollectiveAccount(_) => ErrorKind::Reference,

            Self::SerializationConflict => ErrorKind::Concurrency,

            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Returns the stable error code for API responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAccountCode(_) => "INVALID_ACCOUNT_CODE",
            Self::NatureNotAllowed { .. } => "NATURE_NOT_ALLOWED",
            Self::InvalidJournalCode(_) => "INVALID_JOURNAL_CODE",
            Self::InvalidTiersCode(_) => "INVALID_TIERS_CODE",
            Self::MissingMatricule => "MISSING_MATRICULE",
            Self::ProfileKindMismatch(_) => "PROFILE_KIND_MISMATCH",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BothDebitAndCredit => "BOTH_DEBIT_AND_CREDIT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::ExerciseTooLong { .. } => "EXERCISE_TOO_LONG",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::InvalidReconciliationCode(_) => "INVALID_RECONCILIATION_CODE",
            Self::EntryNotEditable(_) => "ENTRY_NOT_EDITABLE",
            Self::AlreadyValidated(_) => "ALREADY_VALIDATED",
            Self::CanOnlyDeleteDraft(_) => "CAN_ONLY_DELETE_DRAFT",
            Self::PeriodNotOpen(_) => "PERIOD_NOT_OPEN",
            Self::PeriodNotClosed(_) => "PERIOD_NOT_CLOSED",
            Self::EarlierPeriodsOpen => "EARLIER_PERIODS_OPEN",
            Self::PostingNotAllowed { .. } => "POSTING_NOT_ALLOWED",
            Self::TooManyOpenExercises => "TOO_MANY_OPEN_EXERCISES",
            Self::ExerciseNotInPreparation(_) => "EXERCISE_NOT_IN_PREPARATION",
            Self::ExerciseNotOpen(_) => "EXERCISE_NOT_OPEN",
            Self::ExerciseNotClosable(_) => "EXERCISE_NOT_CLOSABLE",
            Self::CloseDeadlinePassed { .. } => "CLOSE_DEADLINE_PASSED",
            Self::ExerciseNotClosed(_) => "EXERCISE_NOT_CLOSED",
            Self::CarryForwardAlreadyGenerated => "CARRY_FORWARD_ALREADY_GENERATED",
            Self::ExerciseNotConsecutive { .. } => "EXERCISE_NOT_CONSECUTIVE",
            Self::TiersBlocked { .. } => "TIERS_BLOCKED",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::JournalInactive(_) => "JOURNAL_INACTIVE",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::TooFewLines { .. } => "TOO_FEW_LINES",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::ReconciliationUnbalanced { .. } => "RECONCILIATION_UNBALANCED",
            Self::ReconciliationMixedAccounts => "RECONCILIATION_MIXED_ACCOUNTS",
            Self::ReconciliationSetTooSmall { .. } => "RECONCILIATION_SET_TOO_SMALL",
            Self::EntryNotValidated(_) => "ENTRY_NOT_VALIDATED",
            Self::LineAlreadyReconciled(_) => "LINE_ALREADY_RECONCILED",
            Self::NothingToUnreconcile(_) => "NOTHING_TO_UNRECONCILE",
            Self::TiersAccountMismatch { .. } => "TIERS_ACCOUNT_MISMATCH",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::TiersNotFound(_) => "TIERS_NOT_FOUND",
            Self::ExerciseNotFound(_) => "EXERCISE_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::MissingCollectiveAccount(_) => "MISSING_COLLECTIVE_ACCOUNT",
            Self::SerializationConflict => "SERIALIZATION_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if the operation may be retried as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Concurrency)
    }

    /// Returns true for fatal configuration errors that indicate a
    /// mis-seeded store rather than bad input.
    #[must_use]
    pub const fn is_fatal_config(&self) -> bool {
        matches!(self, Self::MissingCollectiveAccount(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kinds() {
        assert_eq!(
            LedgerError::InvalidAccountCode("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::EntryNotEditable(EntryStatus::Validated).kind(),
            ErrorKind::State
        );
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(1),
                credit: dec!(2)
            }
            .kind(),
            ErrorKind::Consistency
        );
        assert_eq!(
            LedgerError::MissingCollectiveAccount("41110000".into()).kind(),
            ErrorKind::Reference
        );
        assert_eq!(
            LedgerError::SerializationConflict.kind(),
            ErrorKind::Concurrency
        );
        assert_eq!(
            LedgerError::Database("boom".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_retryable() {
        assert!(LedgerError::SerializationConflict.is_retryable());
        assert!(!LedgerError::ZeroAmount.is_retryable());
        assert!(!LedgerError::Database("x".into()).is_retryable());
    }

    #[test]
    fn test_fatal_config() {
        assert!(LedgerError::MissingCollectiveAccount("42100000".into()).is_fatal_config());
        assert!(!LedgerError::AccountNotFound("42100000".into()).is_fatal_config());
    }

    #[test]
    fn test_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Entry is not balanced: debit 100.00, credit 50.00"
        );
        assert_eq!(err.error_code(), "UNBALANCED_ENTRY");

        let err = LedgerError::CloseDeadlinePassed {
            deadline: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Definitive close deadline passed (2025-06-30)"
        );
    }
}
