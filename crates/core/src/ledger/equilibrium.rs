//! Entry equilibrium computation.
//!
//! Recomputed after every line mutation, inside the same transaction as
//! the mutation: no observer may see a header disagreeing with its
//! committed lines. Comparison is exact decimal equality; there is no
//! tolerance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::Line;

/// Derived totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of the debit side.
    pub total_debit: Decimal,
    /// Sum of the credit side.
    pub total_credit: Decimal,
    /// Debits equal credits and are strictly positive.
    pub balanced: bool,
}

impl EntryTotals {
    /// Builds totals from the two sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            balanced: total_debit == total_credit && total_debit > Decimal::ZERO,
        }
    }

    /// The persisted total amount: the debit side.
    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_debit
    }

    /// Difference debit - credit.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// Computes the totals of a set of lines.
#[must_use]
pub fn compute_totals(lines: &[Line]) -> EntryTotals {
    let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
    EntryTotals::new(total_debit, total_credit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandlivre_shared::types::{AccountId, EntryId, LineId};
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> Line {
        Line {
            id: LineId::new(),
            entry_id: EntryId::new(),
            line_number: 1,
            account_id: AccountId::new(),
            tiers_id: None,
            piece: None,
            label: "TEST".to_string(),
            debit,
            credit,
            due_date: None,
            reconciliation_code: None,
            reconciled: false,
        }
    }

    #[test]
    fn test_balanced_entry() {
        let lines = vec![
            line(dec!(100.00), Decimal::ZERO),
            line(Decimal::ZERO, dec!(100.00)),
        ];
        let totals = compute_totals(&lines);
        assert!(totals.balanced);
        assert_eq!(totals.total_amount(), dec!(100.00));
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_unbalanced_entry() {
        let lines = vec![
            line(dec!(100.00), Decimal::ZERO),
            line(Decimal::ZERO, dec!(99.99)),
        ];
        let totals = compute_totals(&lines);
        assert!(!totals.balanced);
        assert_eq!(totals.difference(), dec!(0.01));
    }

    #[test]
    fn test_one_centime_off_is_unbalanced() {
        // Exact comparison: no tolerance masks a real imbalance
        let totals = EntryTotals::new(dec!(1000.00), dec!(1000.01));
        assert!(!totals.balanced);
    }

    #[test]
    fn test_empty_entry_is_not_balanced() {
        let totals = compute_totals(&[]);
        assert!(!totals.balanced);
        assert_eq!(totals.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_totals_are_not_balanced() {
        // Both sides zero: equal but not a valid entry
        let totals = EntryTotals::new(Decimal::ZERO, Decimal::ZERO);
        assert!(!totals.balanced);
    }

    #[test]
    fn test_multi_line_totals() {
        let lines = vec![
            line(dec!(60.00), Decimal::ZERO),
            line(dec!(40.00), Decimal::ZERO),
            line(Decimal::ZERO, dec!(75.50)),
            line(Decimal::ZERO, dec!(24.50)),
        ];
        let totals = compute_totals(&lines);
        assert!(totals.balanced);
        assert_eq!(totals.total_debit, dec!(100.00));
        assert_eq!(totals.total_credit, dec!(100.00));
    }
}
