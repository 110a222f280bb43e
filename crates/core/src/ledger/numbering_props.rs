//! Property-based tests for entry numbering.
//!
//! The key property: per journal and year, allocated numbers form a
//! gapless strictly-increasing sequence starting at 1, even when
//! allocations interleave as they would under concurrent posting against
//! a serializable store.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use proptest::prelude::*;

use super::numbering::{entry_number_prefix, format_entry_number, next_sequence, sequence_in};

/// Strategy for a plausible journal code.
fn journal_code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("AC".to_string()),
        Just("VT".to_string()),
        Just("BQ".to_string()),
        Just("OD".to_string()),
        "[A-Z]{2,4}",
    ]
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..=2099, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Formatting then parsing a sequence is the identity.
    #[test]
    fn prop_sequence_roundtrip(
        journal in journal_code_strategy(),
        date in date_strategy(),
        seq in 1u32..=100_000,
    ) {
        let prefix = entry_number_prefix(&journal, date);
        let number = format_entry_number(&prefix, seq);
        prop_assert_eq!(sequence_in(&prefix, &number), Some(seq));
    }

    /// Sequential allocation produces 1, 2, 3, ... with no gaps.
    #[test]
    fn prop_sequential_allocation_is_gapless(
        journal in journal_code_strategy(),
        date in date_strategy(),
        count in 1usize..=50,
    ) {
        let prefix = entry_number_prefix(&journal, date);
        let mut existing: Vec<String> = Vec::new();

        for expected in 1..=count {
            let seq = next_sequence(&prefix, &existing);
            prop_assert_eq!(seq as usize, expected);
            existing.push(format_entry_number(&prefix, seq));
        }
    }

    /// Deleting draft entries never causes number reuse.
    #[test]
    fn prop_deleted_numbers_not_reused(
        journal in journal_code_strategy(),
        date in date_strategy(),
        allocations in 2usize..=30,
        delete_index in any::<prop::sample::Index>(),
    ) {
        let prefix = entry_number_prefix(&journal, date);
        let mut existing: Vec<String> = Vec::new();
        for _ in 0..allocations {
            let seq = next_sequence(&prefix, &existing);
            existing.push(format_entry_number(&prefix, seq));
        }

        // Delete one entry that is not the last
        let idx = delete_index.index(allocations - 1);
        let deleted = existing.remove(idx);

        let next = next_sequence(&prefix, &existing);
        prop_assert_eq!(next as usize, allocations + 1);
        prop_assert!(format_entry_number(&prefix, next) != deleted);
    }

    /// Simulated concurrency: N workers allocate against a shared store
    /// whose claim step is atomic (the serializable-transaction model).
    /// The result is a gapless strictly-increasing sequence from 1.
    #[test]
    fn prop_concurrent_allocation_is_gapless(
        journal in journal_code_strategy(),
        date in date_strategy(),
        workers in 2usize..=8,
        per_worker in 1usize..=10,
    ) {
        let prefix = entry_number_prefix(&journal, date);
        let store: Mutex<Vec<String>> = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    for _ in 0..per_worker {
                        // Read-max and write happen under one lock, as they
                        // would inside one serializable transaction.
                        let mut numbers = store.lock().unwrap();
                        let seq = next_sequence(&prefix, numbers.iter());
                        numbers.push(format_entry_number(&prefix, seq));
                    }
                });
            }
        });

        let numbers = store.into_inner().unwrap();
        let total = workers * per_worker;
        prop_assert_eq!(numbers.len(), total);

        let sequences: BTreeSet<u32> = numbers
            .iter()
            .filter_map(|n| sequence_in(&prefix, n))
            .collect();
        prop_assert_eq!(sequences.len(), total, "duplicate numbers allocated");
        prop_assert_eq!(sequences.iter().next(), Some(&1));
        prop_assert_eq!(sequences.iter().next_back(), Some(&(total as u32)));
    }

    /// Numbers of one journal/year never leak into another's sequence.
    #[test]
    fn prop_prefixes_are_independent(
        date in date_strategy(),
        ac_count in 1usize..=20,
        vt_count in 1usize..=20,
    ) {
        let ac_prefix = entry_number_prefix("AC", date);
        let vt_prefix = entry_number_prefix("VT", date);
        let mut existing: Vec<String> = Vec::new();

        for _ in 0..ac_count {
            let seq = next_sequence(&ac_prefix, &existing);
            existing.push(format_entry_number(&ac_prefix, seq));
        }
        for _ in 0..vt_count {
            let seq = next_sequence(&vt_prefix, &existing);
            existing.push(format_entry_number(&vt_prefix, seq));
        }

        prop_assert_eq!(next_sequence(&ac_prefix, &existing) as usize, ac_count + 1);
        prop_assert_eq!(next_sequence(&vt_prefix, &existing) as usize, vt_count + 1);
    }
}
