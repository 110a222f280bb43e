//! Fiscal exercise (year) lifecycle.
//!
//! `Preparation -> Open -> ProvisionalClose -> Closed -> Archived`, with
//! carry-forward generation allowed once after definitive close.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::ExerciseId;

use crate::error::LedgerError;

/// Maximum duration of an exercise in days (18 months).
pub const MAX_EXERCISE_DAYS: i64 = 548;

/// Maximum number of exercises open at the same time.
pub const MAX_OPEN_EXERCISES: usize = 2;

/// Months after the end date within which definitive close must happen.
pub const CLOSE_DEADLINE_MONTHS: u32 = 6;

/// Exercise lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseStatus {
    /// Being prepared, no posting yet.
    Preparation,
    /// Open for posting.
    Open,
    /// Provisionally closed (inventory entries only).
    ProvisionalClose,
    /// Definitively closed.
    Closed,
    /// Archived.
    Archived,
}

impl ExerciseStatus {
    /// Returns true if entries may be posted while the exercise is in this
    /// status (the period must be open too).
    #[must_use]
    pub const fn allows_posting(self) -> bool {
        matches!(self, Self::Open | Self::ProvisionalClose)
    }
}

impl std::fmt::Display for ExerciseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Preparation => "preparation",
            Self::Open => "open",
            Self::ProvisionalClose => "provisional_close",
            Self::Closed => "closed",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// A fiscal exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier.
    pub id: ExerciseId,
    /// Unique code, conventionally the year ("2024").
    pub code: String,
    /// Display label.
    pub label: String,
    /// First day of the exercise.
    pub start: NaiveDate,
    /// Last day of the exercise.
    pub end: NaiveDate,
    /// Lifecycle status.
    pub status: ExerciseStatus,
    /// Date of the provisional close, when it happened.
    pub provisional_close_date: Option<NaiveDate>,
    /// Date of the definitive close, when it happened.
    pub definitive_close_date: Option<NaiveDate>,
    /// Whether carry-forward entries were generated.
    pub carry_forward_generated: bool,
    /// When carry-forward generation ran.
    pub carry_forward_at: Option<DateTime<Utc>>,
    /// First exercise of the company.
    pub first_exercise: bool,
}

impl Exercise {
    /// Returns the deadline for definitive close: `end` + 6 months.
    #[must_use]
    pub fn close_deadline(&self) -> NaiveDate {
        close_deadline(self.end)
    }

    /// Returns true if a date falls inside the exercise range.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Returns the definitive-close deadline for an exercise ending on `end`.
#[must_use]
pub fn close_deadline(end: NaiveDate) -> NaiveDate {
    end.checked_add_months(Months::new(CLOSE_DEADLINE_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// Validates an exercise date range: `end > start` and at most 548 days.
///
/// # Errors
///
/// Returns `LedgerError::InvalidDateRange` or `LedgerError::ExerciseTooLong`.
pub fn validate_exercise_dates(start: NaiveDate, end: NaiveDate) -> Result<(), LedgerError> {
    if end <= start {
        return Err(LedgerError::InvalidDateRange { start, end });
    }
    let days = (end - start).num_days();
    if days > MAX_EXERCISE_DAYS {
        return Err(LedgerError::ExerciseTooLong { days });
    }
    Ok(())
}

/// Validates that an exercise can be opened.
///
/// `open_starts` holds the start dates of the exercises currently open.
/// At most two exercises may be open at once, and when one other is open
/// the new one must start strictly after it.
///
/// # Errors
///
/// Returns a state error when the transition is not permitted.
pub fn validate_open(exercise: &Exercise, open_starts: &[NaiveDate]) -> Result<(), LedgerError> {
    if exercise.status != ExerciseStatus::Preparation {
        return Err(LedgerError::ExerciseNotInPreparation(exercise.status));
    }
    if open_starts.len() >= MAX_OPEN_EXERCISES {
        return Err(LedgerError::TooManyOpenExercises);
    }
    if let Some(&other_start) = open_starts.first() {
        if exercise.start <= other_start {
            return Err(LedgerError::ExerciseNotConsecutive {
                start: exercise.start,
                other_start,
            });
        }
    }
    Ok(())
}

/// Validates the `Open -> ProvisionalClose` transition.
///
/// # Errors
///
/// Returns `LedgerError::ExerciseNotOpen` unless the exercise is open.
pub fn validate_close_provisional(status: ExerciseStatus) -> Result<(), LedgerError> {
    if status == ExerciseStatus::Open {
        Ok(())
    } else {
        Err(LedgerError::ExerciseNotOpen(status))
    }
}

/// Validates the definitive close transition.
///
/// Requires status `Open` or `ProvisionalClose`, and `today` no later than
/// the close deadline. Past the deadline the failure is permanent.
///
/// # Errors
///
/// Returns `LedgerError::ExerciseNotClosable` or
/// `LedgerError::CloseDeadlinePassed`.
pub fn validate_close_definitive(
    exercise: &Exercise,
    today: NaiveDate,
) -> Result<(), LedgerError> {
    if !matches!(
        exercise.status,
        ExerciseStatus::Open | ExerciseStatus::ProvisionalClose
    ) {
        return Err(LedgerError::ExerciseNotClosable(exercise.status));
    }
    let deadline = exercise.close_deadline();
    if today > deadline {
        return Err(LedgerError::CloseDeadlinePassed { deadline });
    }
    Ok(())
}

/// Validates carry-forward generation: exercise closed and not yet run.
///
/// # Errors
///
/// Returns `LedgerError::ExerciseNotClosed` or
/// `LedgerError::CarryForwardAlreadyGenerated`.
pub fn validate_carry_forward(exercise: &Exercise) -> Result<(), LedgerError> {
    if exercise.status != ExerciseStatus::Closed {
        return Err(LedgerError::ExerciseNotClosed(exercise.status));
    }
    if exercise.carry_forward_generated {
        return Err(LedgerError::CarryForwardAlreadyGenerated);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(status: ExerciseStatus, start: NaiveDate, end: NaiveDate) -> Exercise {
        Exercise {
            id: ExerciseId::new(),
            code: start.format("%Y").to_string(),
            label: format!("Exercice {}", start.format("%Y")),
            start,
            end,
            status,
            provisional_close_date: None,
            definitive_close_date: None,
            carry_forward_generated: false,
            carry_forward_at: None,
            first_exercise: false,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_exercise_dates() {
        assert!(validate_exercise_dates(ymd(2024, 1, 1), ymd(2024, 12, 31)).is_ok());
        // 18-month exceptional exercise is allowed
        assert!(validate_exercise_dates(ymd(2024, 1, 1), ymd(2025, 6, 30)).is_ok());
        assert!(matches!(
            validate_exercise_dates(ymd(2024, 1, 1), ymd(2024, 1, 1)),
            Err(LedgerError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            validate_exercise_dates(ymd(2024, 12, 31), ymd(2024, 1, 1)),
            Err(LedgerError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            validate_exercise_dates(ymd(2024, 1, 1), ymd(2025, 8, 1)),
            Err(LedgerError::ExerciseTooLong { .. })
        ));
    }

    #[test]
    fn test_open_requires_preparation() {
        let ex = exercise(ExerciseStatus::Open, ymd(2024, 1, 1), ymd(2024, 12, 31));
        assert!(matches!(
            validate_open(&ex, &[]),
            Err(LedgerError::ExerciseNotInPreparation(ExerciseStatus::Open))
        ));
    }

    #[test]
    fn test_open_limited_to_two() {
        let ex = exercise(
            ExerciseStatus::Preparation,
            ymd(2026, 1, 1),
            ymd(2026, 12, 31),
        );
        let open_starts = [ymd(2024, 1, 1), ymd(2025, 1, 1)];
        assert!(matches!(
            validate_open(&ex, &open_starts),
            Err(LedgerError::TooManyOpenExercises)
        ));
    }

    #[test]
    fn test_open_must_follow_other_open_exercise() {
        let ex = exercise(
            ExerciseStatus::Preparation,
            ymd(2024, 1, 1),
            ymd(2024, 12, 31),
        );
        // Other open exercise starts later
        assert!(matches!(
            validate_open(&ex, &[ymd(2025, 1, 1)]),
            Err(LedgerError::ExerciseNotConsecutive { .. })
        ));
        // Strictly after is fine
        let next = exercise(
            ExerciseStatus::Preparation,
            ymd(2025, 1, 1),
            ymd(2025, 12, 31),
        );
        assert!(validate_open(&next, &[ymd(2024, 1, 1)]).is_ok());
        // No other open exercise
        assert!(validate_open(&ex, &[]).is_ok());
    }

    #[test]
    fn test_close_provisional_requires_open() {
        assert!(validate_close_provisional(ExerciseStatus::Open).is_ok());
        for status in [
            ExerciseStatus::Preparation,
            ExerciseStatus::ProvisionalClose,
            ExerciseStatus::Closed,
            ExerciseStatus::Archived,
        ] {
            assert!(matches!(
                validate_close_provisional(status),
                Err(LedgerError::ExerciseNotOpen(_))
            ));
        }
    }

    #[test]
    fn test_close_deadline_is_six_months_after_end() {
        assert_eq!(close_deadline(ymd(2024, 12, 31)), ymd(2025, 6, 30));
        assert_eq!(close_deadline(ymd(2024, 6, 30)), ymd(2024, 12, 30));
    }

    #[test]
    fn test_close_definitive_within_deadline() {
        let mut ex = exercise(ExerciseStatus::Open, ymd(2024, 1, 1), ymd(2024, 12, 31));
        assert!(validate_close_definitive(&ex, ymd(2025, 6, 30)).is_ok());
        ex.status = ExerciseStatus::ProvisionalClose;
        assert!(validate_close_definitive(&ex, ymd(2025, 1, 15)).is_ok());
    }

    #[test]
    fn test_close_definitive_past_deadline_fails() {
        let ex = exercise(ExerciseStatus::Open, ymd(2024, 1, 1), ymd(2024, 12, 31));
        let result = validate_close_definitive(&ex, ymd(2025, 7, 15));
        assert!(matches!(
            result,
            Err(LedgerError::CloseDeadlinePassed { deadline }) if deadline == ymd(2025, 6, 30)
        ));
    }

    #[test]
    fn test_close_definitive_wrong_status() {
        let ex = exercise(ExerciseStatus::Closed, ymd(2024, 1, 1), ymd(2024, 12, 31));
        assert!(matches!(
            validate_close_definitive(&ex, ymd(2025, 1, 1)),
            Err(LedgerError::ExerciseNotClosable(ExerciseStatus::Closed))
        ));
    }

    #[test]
    fn test_carry_forward_once() {
        let mut ex = exercise(ExerciseStatus::Closed, ymd(2024, 1, 1), ymd(2024, 12, 31));
        assert!(validate_carry_forward(&ex).is_ok());

        ex.carry_forward_generated = true;
        assert!(matches!(
            validate_carry_forward(&ex),
            Err(LedgerError::CarryForwardAlreadyGenerated)
        ));

        ex.carry_forward_generated = false;
        ex.status = ExerciseStatus::Open;
        assert!(matches!(
            validate_carry_forward(&ex),
            Err(LedgerError::ExerciseNotClosed(ExerciseStatus::Open))
        ));
    }

    #[test]
    fn test_allows_posting() {
        assert!(ExerciseStatus::Open.allows_posting());
        assert!(ExerciseStatus::ProvisionalClose.allows_posting());
        assert!(!ExerciseStatus::Preparation.allows_posting());
        assert!(!ExerciseStatus::Closed.allows_posting());
        assert!(!ExerciseStatus::Archived.allows_posting());
    }
}
