//! Property-based tests for period generation and posting rules.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use grandlivre_shared::types::ExerciseId;

use super::calendar::{generate_monthly_periods, resolve_period, MAX_PERIODS};
use super::exercise::{ExerciseStatus, MAX_EXERCISE_DAYS};
use super::period::{posting_allowed, PeriodStatus};

/// Strategy for an exercise start date.
fn start_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for a valid exercise range (1 day to 18 months).
fn exercise_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    start_strategy().prop_flat_map(|start| {
        (Just(start), 1i64..=MAX_EXERCISE_DAYS)
            .prop_map(|(s, days)| (s, s + Duration::days(days)))
    })
}

fn period_status_strategy() -> impl Strategy<Value = PeriodStatus> {
    prop_oneof![
        Just(PeriodStatus::Open),
        Just(PeriodStatus::Closed),
        Just(PeriodStatus::Locked),
    ]
}

fn exercise_status_strategy() -> impl Strategy<Value = ExerciseStatus> {
    prop_oneof![
        Just(ExerciseStatus::Preparation),
        Just(ExerciseStatus::Open),
        Just(ExerciseStatus::ProvisionalClose),
        Just(ExerciseStatus::Closed),
        Just(ExerciseStatus::Archived),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Generated periods tile the exercise range without gaps or overlaps.
    #[test]
    fn prop_periods_tile_exercise((start, end) in exercise_range()) {
        let periods = generate_monthly_periods(ExerciseId::new(), start, end);

        prop_assert!(!periods.is_empty());
        prop_assert!(periods.len() <= MAX_PERIODS);
        prop_assert_eq!(periods[0].start, start);
        prop_assert_eq!(periods.last().unwrap().end, end);

        for window in periods.windows(2) {
            prop_assert_eq!(
                window[1].start,
                window[0].end + Duration::days(1),
                "periods must be contiguous"
            );
        }
    }

    /// Period numbers are 1..=n in order.
    #[test]
    fn prop_period_numbers_sequential((start, end) in exercise_range()) {
        let periods = generate_monthly_periods(ExerciseId::new(), start, end);
        for (i, period) in periods.iter().enumerate() {
            prop_assert_eq!(usize::from(period.number), i + 1);
        }
    }

    /// Every date of the exercise resolves to exactly one period.
    #[test]
    fn prop_every_date_resolves((start, end) in exercise_range(), offset in 0i64..=MAX_EXERCISE_DAYS) {
        let periods = generate_monthly_periods(ExerciseId::new(), start, end);
        let date = start + Duration::days(offset);
        prop_assume!(date <= end);

        let resolved = resolve_period(&periods, date);
        prop_assert!(resolved.is_ok());

        let covering = periods.iter().filter(|p| p.contains_date(date)).count();
        prop_assert_eq!(covering, 1, "date {} covered by {} periods", date, covering);
    }

    /// Dates outside the exercise never resolve.
    #[test]
    fn prop_outside_date_never_resolves((start, end) in exercise_range(), days in 1i64..=365) {
        let periods = generate_monthly_periods(ExerciseId::new(), start, end);
        prop_assert!(resolve_period(&periods, start - Duration::days(days)).is_err());
        prop_assert!(resolve_period(&periods, end + Duration::days(days)).is_err());
    }

    /// Posting requires exactly: period open AND exercise open or in
    /// provisional close.
    #[test]
    fn prop_posting_matrix(
        period in period_status_strategy(),
        exercise in exercise_status_strategy(),
    ) {
        let expected = period == PeriodStatus::Open
            && matches!(exercise, ExerciseStatus::Open | ExerciseStatus::ProvisionalClose);
        prop_assert_eq!(posting_allowed(period, exercise), expected);
    }
}
