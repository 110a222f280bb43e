//! Ledger domain types for entry creation and lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{AccountId, JournalId, PeriodId, TiersId, UserId};

/// Side of a line: debit or credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

/// Entry lifecycle status.
///
/// `Draft` entries are mutable; `validate` is a one-way transition;
/// closing is driven by period closing, not a single-entry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being drafted, fully mutable.
    Draft,
    /// Validated, financially immutable.
    Validated,
    /// Closed with its period, fully immutable.
    Closed,
}

impl EntryStatus {
    /// Returns true if lines and financial header fields can change.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true once the entry participates in reconciliation.
    #[must_use]
    pub fn is_reconcilable(self) -> bool {
        matches!(self, Self::Validated | Self::Closed)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Validated => "validated",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Input for a single line of a new entry.
#[derive(Debug, Clone)]
pub struct LineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Optional counterparty for auxiliary accounts.
    pub tiers_id: Option<TiersId>,
    /// Supporting document reference (e.g. "EDF", "LOYER").
    pub piece: Option<String>,
    /// Line label; defaults to the entry label when blank.
    pub label: Option<String>,
    /// Debit or credit.
    pub side: Side,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Due date; computed from the counterparty's payment delay when
    /// omitted and a counterparty is set.
    pub due_date: Option<NaiveDate>,
}

/// Input for creating a new entry with its lines.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// The journal to post through.
    pub journal_id: JournalId,
    /// Entry date; the period is resolved from it when not given.
    pub date: NaiveDate,
    /// Explicit period; when set, `date` must fall inside it.
    pub period_id: Option<PeriodId>,
    /// Date of the supporting document.
    pub piece_date: Option<NaiveDate>,
    /// Entry label (e.g. "RELEVES", "FACTURE").
    pub label: String,
    /// External reference (invoice number, ...).
    pub reference: Option<String>,
    /// The lines to create with the entry.
    pub lines: Vec<LineInput>,
    /// The user creating the entry.
    pub created_by: UserId,
}

/// Non-financial metadata changes allowed on validated entries through the
/// privileged path.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    /// New entry label.
    pub label: Option<String>,
    /// New external reference.
    pub reference: Option<String>,
    /// New supporting-document date.
    pub piece_date: Option<NaiveDate>,
}

impl MetadataPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.reference.is_none() && self.piece_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_status_editable() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(!EntryStatus::Validated.is_editable());
        assert!(!EntryStatus::Closed.is_editable());
    }

    #[test]
    fn test_entry_status_reconcilable() {
        assert!(!EntryStatus::Draft.is_reconcilable());
        assert!(EntryStatus::Validated.is_reconcilable());
        assert!(EntryStatus::Closed.is_reconcilable());
    }

    #[test]
    fn test_metadata_patch_empty() {
        assert!(MetadataPatch::default().is_empty());
        let patch = MetadataPatch {
            label: Some("AVOIR".to_string()),
            ..MetadataPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
