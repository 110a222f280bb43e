//! Journal registry rules.
//!
//! Journals are named transaction channels (purchases, sales, bank, ...).
//! The 14 OHADA journal kinds are fixed; journal codes are free but
//! constrained to short uppercase alphanumerics.

use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{AccountId, JournalId};

use crate::error::LedgerError;

/// Maximum length of a journal code.
pub const JOURNAL_CODE_MAX_LEN: usize = 10;

/// The 14 OHADA journal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    /// Achats (purchases).
    Purchases,
    /// Ventes (sales).
    Sales,
    /// Banque (bank).
    Bank,
    /// Caisse (cash).
    Cash,
    /// Paie et salaires (payroll).
    Payroll,
    /// Fiscal et déclarations (tax filings).
    Tax,
    /// Social (social security contributions).
    Social,
    /// Stocks et inventaires.
    Inventory,
    /// Immobilisations (fixed assets).
    FixedAssets,
    /// Provisions.
    Provisions,
    /// À nouveaux (carry-forward).
    CarryForward,
    /// Clôture (closing).
    Closing,
    /// Opérations diverses (miscellaneous).
    Miscellaneous,
    /// Extra-comptable (off-ledger).
    OffLedger,
}

impl JournalKind {
    /// All journal kinds in conventional order.
    pub const ALL: [Self; 14] = [
        Self::Purchases,
        Self::Sales,
        Self::Bank,
        Self::Cash,
        Self::Payroll,
        Self::Tax,
        Self::Social,
        Self::Inventory,
        Self::FixedAssets,
        Self::Provisions,
        Self::CarryForward,
        Self::Closing,
        Self::Miscellaneous,
        Self::OffLedger,
    ];

    /// Returns the conventional two-letter code for this kind.
    #[must_use]
    pub const fn conventional_code(self) -> &'static str {
        match self {
            Self::Purchases => "AC",
            Self::Sales => "VT",
            Self::Bank => "BQ",
            Self::Cash => "CA",
            Self::Payroll => "PA",
            Self::Tax => "FI",
            Self::Social => "SO",
            Self::Inventory => "ST",
            Self::FixedAssets => "IM",
            Self::Provisions => "PR",
            Self::CarryForward => "AN",
            Self::Closing => "CL",
            Self::Miscellaneous => "OD",
            Self::OffLedger => "EX",
        }
    }

    /// Returns the French label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Purchases => "Achats",
            Self::Sales => "Ventes",
            Self::Bank => "Banque",
            Self::Cash => "Caisse",
            Self::Payroll => "Paie et Salaires",
            Self::Tax => "Fiscal et Déclarations",
            Self::Social => "Social",
            Self::Inventory => "Stocks et Inventaires",
            Self::FixedAssets => "Immobilisations",
            Self::Provisions => "Provisions",
            Self::CarryForward => "À nouveaux",
            Self::Closing => "Clôture",
            Self::Miscellaneous => "Opérations Diverses",
            Self::OffLedger => "Extra-comptable",
        }
    }
}

/// A journal: a named channel for entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Unique identifier.
    pub id: JournalId,
    /// Uppercase alphanumeric code, unique, at most 10 characters.
    pub code: String,
    /// Journal label.
    pub label: String,
    /// OHADA journal kind.
    pub kind: JournalKind,
    /// Optional default counter-account.
    pub counter_account: Option<AccountId>,
    /// Inactive journals reject new entries.
    pub active: bool,
}

/// Normalizes and validates a journal code.
///
/// Codes are trimmed and upper-cased; the result must be 1-10
/// alphanumeric ASCII characters.
///
/// # Errors
///
/// Returns `LedgerError::InvalidJournalCode` on any format violation.
pub fn normalize_journal_code(code: &str) -> Result<String, LedgerError> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.is_empty()
        || normalized.len() > JOURNAL_CODE_MAX_LEN
        || !normalized.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(LedgerError::InvalidJournalCode(code.to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_journal_code() {
        assert_eq!(normalize_journal_code(" ac ").unwrap(), "AC");
        assert_eq!(normalize_journal_code("Bq1").unwrap(), "BQ1");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("TOOLONGCODE")] // 11 chars
    #[case("A-C")]
    #[case("AC_2")]
    fn test_invalid_journal_codes(#[case] code: &str) {
        assert!(matches!(
            normalize_journal_code(code),
            Err(LedgerError::InvalidJournalCode(_))
        ));
    }

    #[test]
    fn test_fourteen_kinds_with_unique_codes() {
        let mut codes: Vec<&str> = JournalKind::ALL
            .iter()
            .map(|k| k.conventional_code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 14);
    }
}
