//! Entry header and line aggregate.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{
    AccountId, EntryId, ExerciseId, JournalId, LineId, PeriodId, TiersId, UserId,
};

use super::types::{EntryStatus, Side};

/// A journal entry header with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier.
    pub id: EntryId,
    /// Generated number `<Journal><YY><seq4>`, immutable and unique.
    pub number: String,
    /// Journal this entry was posted through.
    pub journal_id: JournalId,
    /// Owning exercise.
    pub exercise_id: ExerciseId,
    /// Period resolved from `date` at creation and frozen.
    pub period_id: PeriodId,
    /// Entry date.
    pub date: NaiveDate,
    /// Supporting-document date.
    pub piece_date: Option<NaiveDate>,
    /// Entry label.
    pub label: String,
    /// External reference.
    pub reference: Option<String>,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Derived: debits equal credits and are positive.
    pub balanced: bool,
    /// Derived: total debit when balanced.
    pub total_amount: Decimal,
    /// When the entry was validated.
    pub validated_at: Option<DateTime<Utc>>,
    /// Who validated the entry.
    pub validated_by: Option<UserId>,
    /// Ordered lines (by `line_number`).
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl Entry {
    /// Sums the debit side of the loaded lines.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sums the credit side of the loaded lines.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Difference debit - credit of the loaded lines.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit() - self.total_credit()
    }

    /// Returns true while lines and financial fields may change.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Next line number for an appended line.
    #[must_use]
    pub fn next_line_number(&self) -> i16 {
        self.lines
            .iter()
            .map(|l| l.line_number)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }
}

/// One debit-or-credit row of an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    /// Unique identifier.
    pub id: LineId,
    /// Owning entry.
    pub entry_id: EntryId,
    /// Position within the entry, strictly increasing by insertion order.
    pub line_number: i16,
    /// The account posted to.
    pub account_id: AccountId,
    /// Optional counterparty.
    pub tiers_id: Option<TiersId>,
    /// Supporting document reference.
    pub piece: Option<String>,
    /// Line label.
    pub label: String,
    /// Debit amount; zero when the line is a credit.
    pub debit: Decimal,
    /// Credit amount; zero when the line is a debit.
    pub credit: Decimal,
    /// Due date for counterparty lines.
    pub due_date: Option<NaiveDate>,
    /// Shared reconciliation code, when reconciled.
    pub reconciliation_code: Option<String>,
    /// Whether the line is reconciled.
    pub reconciled: bool,
}

impl Line {
    /// Returns which side the line posts on.
    #[must_use]
    pub fn side(&self) -> Side {
        if self.debit > Decimal::ZERO {
            Side::Debit
        } else {
            Side::Credit
        }
    }

    /// Returns the posted amount (whichever side is non-zero).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        if self.debit > Decimal::ZERO {
            self.debit
        } else {
            self.credit
        }
    }

    /// Clones the line for a duplicated entry: fresh identity, same
    /// account/counterparty/amounts/label, reconciliation reset.
    #[must_use]
    pub fn duplicate_for(&self, entry_id: EntryId) -> Self {
        Self {
            id: LineId::new(),
            entry_id,
            line_number: self.line_number,
            account_id: self.account_id,
            tiers_id: self.tiers_id,
            piece: self.piece.clone(),
            label: self.label.clone(),
            debit: self.debit,
            credit: self.credit,
            due_date: self.due_date,
            reconciliation_code: None,
            reconciled: false,
        }
    }
}

/// Computes the due date for a line: entry date + the counterparty's
/// payment delay, when one applies.
#[must_use]
pub fn due_date_from_delay(entry_date: NaiveDate, delay_days: Option<u16>) -> Option<NaiveDate> {
    delay_days.and_then(|days| entry_date.checked_add_days(Days::new(u64::from(days))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(number: i16, debit: Decimal, credit: Decimal) -> Line {
        Line {
            id: LineId::new(),
            entry_id: EntryId::new(),
            line_number: number,
            account_id: AccountId::new(),
            tiers_id: None,
            piece: None,
            label: "TEST".to_string(),
            debit,
            credit,
            due_date: None,
            reconciliation_code: Some("AB12CD".to_string()),
            reconciled: true,
        }
    }

    #[test]
    fn test_line_side_and_amount() {
        let debit_line = line(1, dec!(150.00), Decimal::ZERO);
        assert_eq!(debit_line.side(), Side::Debit);
        assert_eq!(debit_line.amount(), dec!(150.00));

        let credit_line = line(2, Decimal::ZERO, dec!(150.00));
        assert_eq!(credit_line.side(), Side::Credit);
        assert_eq!(credit_line.amount(), dec!(150.00));
    }

    #[test]
    fn test_duplicate_resets_reconciliation() {
        let original = line(3, dec!(99.99), Decimal::ZERO);
        let target = EntryId::new();
        let copy = original.duplicate_for(target);

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.entry_id, target);
        assert_eq!(copy.line_number, original.line_number);
        assert_eq!(copy.account_id, original.account_id);
        assert_eq!(copy.debit, original.debit);
        assert_eq!(copy.label, original.label);
        assert!(!copy.reconciled);
        assert!(copy.reconciliation_code.is_none());
    }

    #[test]
    fn test_due_date_from_delay() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            due_date_from_delay(date, Some(30)),
            Some(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap())
        );
        assert_eq!(due_date_from_delay(date, None), None);
    }

    #[test]
    fn test_next_line_number() {
        let mut entry = Entry {
            id: EntryId::new(),
            number: "AC240001".to_string(),
            journal_id: JournalId::new(),
            exercise_id: ExerciseId::new(),
            period_id: PeriodId::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            piece_date: None,
            label: "FACTURE".to_string(),
            reference: None,
            status: EntryStatus::Draft,
            balanced: false,
            total_amount: Decimal::ZERO,
            validated_at: None,
            validated_by: None,
            lines: vec![],
        };
        assert_eq!(entry.next_line_number(), 1);

        entry.lines.push(line(1, dec!(10), Decimal::ZERO));
        entry.lines.push(line(2, Decimal::ZERO, dec!(10)));
        assert_eq!(entry.next_line_number(), 3);
    }
}
