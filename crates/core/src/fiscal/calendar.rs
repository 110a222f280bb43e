//! Monthly period generation and period resolution.

use chrono::{Datelike, NaiveDate};

use grandlivre_shared::types::{ExerciseId, PeriodId};

use crate::error::LedgerError;

use super::period::{Period, PeriodStatus};

/// Maximum number of periods generated for an exercise.
pub const MAX_PERIODS: usize = 12;

/// Generates monthly periods for an exercise.
///
/// Walks month by month from `start`, numbering periods 1, 2, ... and
/// clipping the last period to `end`. At most 12 periods are generated;
/// an 18-month exceptional exercise gets a long final period.
#[must_use]
pub fn generate_monthly_periods(
    exercise_id: ExerciseId,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Period> {
    let mut periods = Vec::new();
    let mut current = start;

    while current <= end && periods.len() < MAX_PERIODS {
        let month_end = last_day_of_month(current.year(), current.month());
        // The twelfth period absorbs whatever remains of the exercise.
        let is_last_slot = periods.len() == MAX_PERIODS - 1;
        let period_end = if is_last_slot || month_end > end {
            end
        } else {
            month_end
        };

        periods.push(Period {
            id: PeriodId::new(),
            exercise_id,
            number: u8::try_from(periods.len() + 1).unwrap_or(u8::MAX),
            start: current,
            end: period_end,
            status: PeriodStatus::Open,
            closed_at: None,
            closed_by: None,
        });

        current = first_day_of_next_month(current);
    }

    periods
}

/// Resolves the period containing `date`, or an error naming the date.
///
/// Called once at entry creation; the resolved period is then frozen on
/// the entry and never re-derived.
///
/// # Errors
///
/// Returns `LedgerError::NoPeriodForDate` when no period covers the date.
pub fn resolve_period(periods: &[Period], date: NaiveDate) -> Result<&Period, LedgerError> {
    periods
        .iter()
        .find(|p| p.contains_date(date))
        .ok_or(LedgerError::NoPeriodForDate(date))
}

/// Returns the last day of a month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Returns the first day of the month after `date`.
fn first_day_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_calendar_year() {
        let periods =
            generate_monthly_periods(ExerciseId::new(), ymd(2024, 1, 1), ymd(2024, 12, 31));

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].number, 1);
        assert_eq!(periods[0].start, ymd(2024, 1, 1));
        assert_eq!(periods[0].end, ymd(2024, 1, 31));
        // Leap year February
        assert_eq!(periods[1].end, ymd(2024, 2, 29));
        assert_eq!(periods[11].number, 12);
        assert_eq!(periods[11].start, ymd(2024, 12, 1));
        assert_eq!(periods[11].end, ymd(2024, 12, 31));
        assert!(periods.iter().all(|p| p.status == PeriodStatus::Open));
    }

    #[test]
    fn test_short_exercise_is_clipped() {
        let periods = generate_monthly_periods(ExerciseId::new(), ymd(2024, 1, 1), ymd(2024, 3, 15));

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[2].start, ymd(2024, 3, 1));
        assert_eq!(periods[2].end, ymd(2024, 3, 15));
    }

    #[test]
    fn test_straddling_exercise() {
        let periods = generate_monthly_periods(ExerciseId::new(), ymd(2024, 4, 1), ymd(2025, 3, 31));

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].start, ymd(2024, 4, 1));
        assert_eq!(periods[8].start, ymd(2024, 12, 1));
        assert_eq!(periods[9].start, ymd(2025, 1, 1));
        assert_eq!(periods[11].end, ymd(2025, 3, 31));
    }

    #[test]
    fn test_exceptional_exercise_caps_at_twelve_periods() {
        // 18-month exercise: the twelfth period absorbs the tail
        let periods = generate_monthly_periods(ExerciseId::new(), ymd(2024, 1, 1), ymd(2025, 6, 30));

        assert_eq!(periods.len(), 12);
        assert_eq!(periods[11].start, ymd(2024, 12, 1));
        assert_eq!(periods[11].end, ymd(2025, 6, 30));
    }

    #[test]
    fn test_resolve_period() {
        let periods =
            generate_monthly_periods(ExerciseId::new(), ymd(2024, 1, 1), ymd(2024, 12, 31));

        let march = resolve_period(&periods, ymd(2024, 3, 14)).unwrap();
        assert_eq!(march.number, 3);

        let missing = resolve_period(&periods, ymd(2025, 1, 1));
        assert!(matches!(
            missing,
            Err(LedgerError::NoPeriodForDate(date)) if date == ymd(2025, 1, 1)
        ));
    }
}
