//! Fiscal period (month) lifecycle.
//!
//! Periods close strictly left to right within an exercise; a closed
//! period may be locked, and `Locked` is terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{ExerciseId, PeriodId, UserId};

use crate::error::LedgerError;

use super::exercise::ExerciseStatus;

/// Period lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Open for posting.
    Open,
    /// Closed, no new entries.
    Closed,
    /// Locked, terminal.
    Locked,
}

impl std::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Locked => "locked",
        };
        f.write_str(s)
    }
}

/// A monthly period within an exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// Owning exercise.
    pub exercise_id: ExerciseId,
    /// Month number within the exercise (1-12).
    pub number: u8,
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
    /// Lifecycle status.
    pub status: PeriodStatus,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed the period.
    pub closed_by: Option<UserId>,
}

impl Period {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the period accepts postings (exercise permitting).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }
}

/// Returns true when posting is allowed for this period/exercise pair.
///
/// Posting requires the period `Open` AND the exercise `Open` or
/// `ProvisionalClose`.
#[must_use]
pub fn posting_allowed(period: PeriodStatus, exercise: ExerciseStatus) -> bool {
    period == PeriodStatus::Open && exercise.allows_posting()
}

/// Checks `posting_allowed` and reports the blocking pair on failure.
///
/// # Errors
///
/// Returns `LedgerError::PostingNotAllowed` when posting is rejected.
pub fn ensure_posting_allowed(
    period: PeriodStatus,
    exercise: ExerciseStatus,
) -> Result<(), LedgerError> {
    if posting_allowed(period, exercise) {
        Ok(())
    } else {
        Err(LedgerError::PostingNotAllowed { period, exercise })
    }
}

/// Validates closing a period.
///
/// The period must be `Open` and every lower-numbered period of the same
/// exercise already closed or locked (`has_earlier_open` is the caller's
/// scan result).
///
/// # Errors
///
/// Returns `LedgerError::PeriodNotOpen` or `LedgerError::EarlierPeriodsOpen`.
pub fn validate_close(period: &Period, has_earlier_open: bool) -> Result<(), LedgerError> {
    if period.status != PeriodStatus::Open {
        return Err(LedgerError::PeriodNotOpen(period.status));
    }
    if has_earlier_open {
        return Err(LedgerError::EarlierPeriodsOpen);
    }
    Ok(())
}

/// Validates locking a period: only `Closed` periods may be locked.
///
/// # Errors
///
/// Returns `LedgerError::PeriodNotClosed` otherwise; in particular a
/// `Locked` period never transitions again.
pub fn validate_lock(period: &Period) -> Result<(), LedgerError> {
    if period.status == PeriodStatus::Closed {
        Ok(())
    } else {
        Err(LedgerError::PeriodNotClosed(period.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(number: u8, status: PeriodStatus) -> Period {
        let start = NaiveDate::from_ymd_opt(2024, u32::from(number), 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, u32::from(number), 28).unwrap();
        Period {
            id: PeriodId::new(),
            exercise_id: ExerciseId::new(),
            number,
            start,
            end,
            status,
            closed_at: None,
            closed_by: None,
        }
    }

    #[test]
    fn test_posting_allowed_matrix() {
        assert!(posting_allowed(PeriodStatus::Open, ExerciseStatus::Open));
        assert!(posting_allowed(
            PeriodStatus::Open,
            ExerciseStatus::ProvisionalClose
        ));
        assert!(!posting_allowed(PeriodStatus::Open, ExerciseStatus::Closed));
        assert!(!posting_allowed(
            PeriodStatus::Open,
            ExerciseStatus::Preparation
        ));
        assert!(!posting_allowed(PeriodStatus::Closed, ExerciseStatus::Open));
        assert!(!posting_allowed(PeriodStatus::Locked, ExerciseStatus::Open));
    }

    #[test]
    fn test_ensure_posting_allowed_reports_pair() {
        let err = ensure_posting_allowed(PeriodStatus::Closed, ExerciseStatus::Open).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PostingNotAllowed {
                period: PeriodStatus::Closed,
                exercise: ExerciseStatus::Open
            }
        ));
    }

    #[test]
    fn test_close_requires_open() {
        let p = period(2, PeriodStatus::Closed);
        assert!(matches!(
            validate_close(&p, false),
            Err(LedgerError::PeriodNotOpen(PeriodStatus::Closed))
        ));
    }

    #[test]
    fn test_close_requires_earlier_periods_closed() {
        let p = period(2, PeriodStatus::Open);
        assert!(matches!(
            validate_close(&p, true),
            Err(LedgerError::EarlierPeriodsOpen)
        ));
        assert!(validate_close(&p, false).is_ok());
    }

    #[test]
    fn test_lock_requires_closed() {
        assert!(validate_lock(&period(1, PeriodStatus::Closed)).is_ok());
        assert!(matches!(
            validate_lock(&period(1, PeriodStatus::Open)),
            Err(LedgerError::PeriodNotClosed(PeriodStatus::Open))
        ));
        // Locked is terminal
        assert!(matches!(
            validate_lock(&period(1, PeriodStatus::Locked)),
            Err(LedgerError::PeriodNotClosed(PeriodStatus::Locked))
        ));
    }

    #[test]
    fn test_contains_date() {
        let p = period(3, PeriodStatus::Open);
        assert!(p.contains_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert!(!p.contains_date(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }
}
