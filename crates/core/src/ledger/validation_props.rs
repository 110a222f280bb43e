//! Property-based tests for equilibrium and line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use grandlivre_shared::types::{AccountId, EntryId, LineId};

use super::entry::Line;
use super::equilibrium::compute_totals;
use super::validation::{normalize_amount, validate_line_amounts};

/// Strategy for a positive 2-dp amount (in centimes, up to 10^9).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000_000).prop_map(|centimes| Decimal::new(centimes, 2))
}

fn line(debit: Decimal, credit: Decimal) -> Line {
    Line {
        id: LineId::new(),
        entry_id: EntryId::new(),
        line_number: 1,
        account_id: AccountId::new(),
        tiers_id: None,
        piece: None,
        label: "PROP".to_string(),
        debit,
        credit,
        due_date: None,
        reconciliation_code: None,
        reconciled: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Mirrored debit/credit pairs always balance.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(amount_strategy(), 1..20)) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(line(*amount, Decimal::ZERO));
            lines.push(line(Decimal::ZERO, *amount));
        }

        let totals = compute_totals(&lines);
        prop_assert!(totals.balanced);
        prop_assert_eq!(totals.total_debit, totals.total_credit);
        prop_assert_eq!(totals.total_amount(), amounts.iter().copied().sum::<Decimal>());
    }

    /// Perturbing any single line by any nonzero delta breaks equilibrium.
    #[test]
    fn prop_any_perturbation_unbalances(
        amounts in prop::collection::vec(amount_strategy(), 1..10),
        delta_centimes in prop_oneof![-1_000_000i64..=-1, 1i64..=1_000_000],
    ) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(line(*amount, Decimal::ZERO));
            lines.push(line(Decimal::ZERO, *amount));
        }

        let delta = Decimal::new(delta_centimes, 2);
        let perturbed = lines[0].debit + delta;
        prop_assume!(perturbed > Decimal::ZERO);
        lines[0].debit = perturbed;

        let totals = compute_totals(&lines);
        prop_assert!(!totals.balanced, "delta {} went unnoticed", delta);
        prop_assert_eq!(totals.difference(), delta);
    }

    /// Exactly one strictly positive side is accepted; everything else is
    /// rejected.
    #[test]
    fn prop_one_sided_amounts(amount in amount_strategy()) {
        prop_assert!(validate_line_amounts(amount, Decimal::ZERO).is_ok());
        prop_assert!(validate_line_amounts(Decimal::ZERO, amount).is_ok());
        prop_assert!(validate_line_amounts(amount, amount).is_err());
        prop_assert!(validate_line_amounts(-amount, Decimal::ZERO).is_err());
        prop_assert!(validate_line_amounts(Decimal::ZERO, -amount).is_err());
    }

    /// Normalization is idempotent and never changes a 2-dp amount.
    #[test]
    fn prop_normalize_idempotent(amount in amount_strategy()) {
        prop_assert_eq!(normalize_amount(amount), amount);
        prop_assert_eq!(normalize_amount(normalize_amount(amount)), normalize_amount(amount));
    }

    /// Totals are order-independent.
    #[test]
    fn prop_totals_order_independent(
        amounts in prop::collection::vec(amount_strategy(), 2..10),
        seed in any::<u64>(),
    ) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(line(*amount, Decimal::ZERO));
            lines.push(line(Decimal::ZERO, *amount));
        }
        let before = compute_totals(&lines);

        // Deterministic shuffle driven by the seed
        let len = lines.len();
        let mut state = seed;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            #[allow(clippy::cast_possible_truncation)]
            let j = (state % (i as u64 + 1)) as usize;
            lines.swap(i, j);
        }

        let after = compute_totals(&lines);
        prop_assert_eq!(before.total_debit, after.total_debit);
        prop_assert_eq!(before.total_credit, after.total_credit);
        prop_assert_eq!(before.balanced, after.balanced);
    }
}
