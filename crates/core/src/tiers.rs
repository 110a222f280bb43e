//! Counterparty (tiers) registry and code generation.
//!
//! Counterparties are auxiliary parties bound to a collective account
//! determined by their kind:
//! - FLOC : Fournisseurs locaux (40110000)
//! - FGRP : Fournisseurs groupe (40120000)
//! - CLOC : Clients locaux (41110000)
//! - CGRP : Clients groupe (41120000)
//! - EMPL : Employés (42100000)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{AccountId, TiersId};

use crate::error::LedgerError;

/// Width of the numeric suffix of a counterparty code.
pub const TIERS_SEQUENCE_WIDTH: usize = 5;

/// Default payment delay granted to suppliers and customers, in days.
pub const DEFAULT_PAYMENT_DELAY_DAYS: u16 = 30;

/// Counterparty kind; determines the code prefix and the collective account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyKind {
    /// Local supplier (FLOC).
    SupplierLocal,
    /// Group supplier (FGRP).
    SupplierGroup,
    /// Local customer (CLOC).
    CustomerLocal,
    /// Group customer (CGRP).
    CustomerGroup,
    /// Employee (EMPL).
    Employee,
}

impl CounterpartyKind {
    /// All kinds.
    pub const ALL: [Self; 5] = [
        Self::SupplierLocal,
        Self::SupplierGroup,
        Self::CustomerLocal,
        Self::CustomerGroup,
        Self::Employee,
    ];

    /// Returns the four-letter code prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::SupplierLocal => "FLOC",
            Self::SupplierGroup => "FGRP",
            Self::CustomerLocal => "CLOC",
            Self::CustomerGroup => "CGRP",
            Self::Employee => "EMPL",
        }
    }

    /// Returns the collective account code for this kind.
    ///
    /// The mapping is fixed; the caller never chooses the collective
    /// account.
    #[must_use]
    pub const fn collective_account_code(self) -> &'static str {
        match self {
            Self::SupplierLocal => "40110000",
            Self::SupplierGroup => "40120000",
            Self::CustomerLocal => "41110000",
            Self::CustomerGroup => "41120000",
            Self::Employee => "42100000",
        }
    }

    /// Resolves a kind from a code prefix.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }

    /// Returns true for supplier kinds.
    #[must_use]
    pub const fn is_supplier(self) -> bool {
        matches!(self, Self::SupplierLocal | Self::SupplierGroup)
    }

    /// Returns true for customer kinds.
    #[must_use]
    pub const fn is_customer(self) -> bool {
        matches!(self, Self::CustomerLocal | Self::CustomerGroup)
    }

    /// Returns true for the employee kind.
    #[must_use]
    pub const fn is_employee(self) -> bool {
        matches!(self, Self::Employee)
    }
}

impl std::fmt::Display for CounterpartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Per-kind fields of a counterparty.
///
/// Commercial terms exist only for suppliers and customers; the credit
/// ceiling only for customers; the matricule only for employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CounterpartyProfile {
    /// Supplier commercial terms.
    Supplier {
        /// Payment delay in days.
        payment_delay_days: u16,
    },
    /// Customer commercial terms.
    Customer {
        /// Payment delay in days.
        payment_delay_days: u16,
        /// Authorized credit ceiling.
        credit_ceiling: Option<Decimal>,
    },
    /// Employee identification.
    Employee {
        /// Unique employee matricule.
        matricule: String,
    },
}

impl CounterpartyProfile {
    /// Returns the payment delay, if this profile carries commercial terms.
    #[must_use]
    pub const fn payment_delay_days(&self) -> Option<u16> {
        match self {
            Self::Supplier { payment_delay_days }
            | Self::Customer {
                payment_delay_days, ..
            } => Some(*payment_delay_days),
            Self::Employee { .. } => None,
        }
    }

    /// Returns the matricule for employee profiles.
    #[must_use]
    pub fn matricule(&self) -> Option<&str> {
        match self {
            Self::Employee { matricule } => Some(matricule),
            _ => None,
        }
    }
}

/// A counterparty (tiers) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterparty {
    /// Unique identifier.
    pub id: TiersId,
    /// Code: kind prefix + 5-digit sequence, immutable and unique.
    pub code: String,
    /// Counterparty kind.
    pub kind: CounterpartyKind,
    /// Collective account this counterparty posts through.
    pub collective_account: AccountId,
    /// Per-kind fields.
    pub profile: CounterpartyProfile,
    /// Legal name (raison sociale).
    pub name: String,
    /// Commercial short name.
    pub short_name: Option<String>,
    /// Tax identification number, unique when present.
    pub taxpayer_number: Option<String>,
    /// Inactive counterparties are hidden from selection.
    pub active: bool,
    /// Blocked counterparties reject new postings.
    pub blocked: bool,
    /// Reason recorded when blocking.
    pub blocked_reason: Option<String>,
}

impl Counterparty {
    /// Blocks the counterparty with a reason.
    pub fn block(&mut self, reason: impl Into<String>) {
        self.blocked = true;
        self.blocked_reason = Some(reason.into());
    }

    /// Unblocks the counterparty and clears the reason.
    pub fn unblock(&mut self) {
        self.blocked = false;
        self.blocked_reason = None;
    }
}

/// Validates that a profile is admissible for a kind.
///
/// # Errors
///
/// Returns `LedgerError::ProfileKindMismatch` when the profile variant does
/// not correspond to the kind, and `LedgerError::MissingMatricule` for an
/// employee profile with a blank matricule.
pub fn validate_profile(
    kind: CounterpartyKind,
    profile: &CounterpartyProfile,
) -> Result<(), LedgerError> {
    let matches = match profile {
        CounterpartyProfile::Supplier { .. } => kind.is_supplier(),
        CounterpartyProfile::Customer { .. } => kind.is_customer(),
        CounterpartyProfile::Employee { .. } => kind.is_employee(),
    };
    if !matches {
        return Err(LedgerError::ProfileKindMismatch(kind));
    }
    if let CounterpartyProfile::Employee { matricule } = profile {
        if matricule.trim().is_empty() {
            return Err(LedgerError::MissingMatricule);
        }
    }
    Ok(())
}

/// Validates a counterparty code and returns its kind.
///
/// # Errors
///
/// Returns `LedgerError::InvalidTiersCode` on any format violation.
pub fn validate_tiers_code(code: &str) -> Result<CounterpartyKind, LedgerError> {
    let (prefix, suffix) = code
        .split_at_checked(4)
        .ok_or_else(|| LedgerError::InvalidTiersCode(code.to_string()))?;
    let kind = CounterpartyKind::from_prefix(prefix)
        .ok_or_else(|| LedgerError::InvalidTiersCode(code.to_string()))?;
    if suffix.len() != TIERS_SEQUENCE_WIDTH || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidTiersCode(code.to_string()));
    }
    Ok(kind)
}

/// Extracts the numeric sequence from a code carrying the given prefix.
///
/// Returns `None` for codes of another prefix or with a malformed suffix.
#[must_use]
pub fn code_sequence(kind: CounterpartyKind, code: &str) -> Option<u32> {
    let suffix = code.strip_prefix(kind.prefix())?;
    if suffix.len() != TIERS_SEQUENCE_WIDTH || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Computes the next counterparty code for a kind.
///
/// Scans `existing` codes, keeps those carrying the kind's prefix, and
/// takes max sequence + 1 (1 when none exist), zero-padded to 5 digits.
pub fn next_code<I, S>(kind: CounterpartyKind, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let max = existing
        .into_iter()
        .filter_map(|code| code_sequence(kind, code.as_ref()))
        .max()
        .unwrap_or(0);
    format!(
        "{}{:0width$}",
        kind.prefix(),
        max + 1,
        width = TIERS_SEQUENCE_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(CounterpartyKind::SupplierLocal, "FLOC", "40110000")]
    #[case(CounterpartyKind::SupplierGroup, "FGRP", "40120000")]
    #[case(CounterpartyKind::CustomerLocal, "CLOC", "41110000")]
    #[case(CounterpartyKind::CustomerGroup, "CGRP", "41120000")]
    #[case(CounterpartyKind::Employee, "EMPL", "42100000")]
    fn test_kind_mapping(
        #[case] kind: CounterpartyKind,
        #[case] prefix: &str,
        #[case] collective: &str,
    ) {
        assert_eq!(kind.prefix(), prefix);
        assert_eq!(kind.collective_account_code(), collective);
        assert_eq!(CounterpartyKind::from_prefix(prefix), Some(kind));
    }

    #[test]
    fn test_first_code_starts_at_one() {
        let code = next_code(CounterpartyKind::CustomerLocal, Vec::<String>::new());
        assert_eq!(code, "CLOC00001");
    }

    #[test]
    fn test_next_code_increments_max() {
        let existing = ["CLOC00001", "CLOC00007", "CLOC00003", "FLOC00042"];
        assert_eq!(
            next_code(CounterpartyKind::CustomerLocal, existing),
            "CLOC00008"
        );
        assert_eq!(
            next_code(CounterpartyKind::SupplierLocal, existing),
            "FLOC00043"
        );
    }

    #[test]
    fn test_next_code_ignores_malformed() {
        let existing = ["CLOC9999", "CLOCABCDE", "CLOC00002X"];
        assert_eq!(
            next_code(CounterpartyKind::CustomerLocal, existing),
            "CLOC00001"
        );
    }

    #[rstest]
    #[case("FLOC00001", CounterpartyKind::SupplierLocal)]
    #[case("EMPL00123", CounterpartyKind::Employee)]
    fn test_validate_tiers_code(#[case] code: &str, #[case] kind: CounterpartyKind) {
        assert_eq!(validate_tiers_code(code).unwrap(), kind);
    }

    #[rstest]
    #[case("XLOC00001")]
    #[case("FLOC0001")]
    #[case("FLOC000001")]
    #[case("FLOC0000a")]
    #[case("FLO")]
    fn test_invalid_tiers_code(#[case] code: &str) {
        assert!(matches!(
            validate_tiers_code(code),
            Err(LedgerError::InvalidTiersCode(_))
        ));
    }

    #[test]
    fn test_profile_kind_match() {
        let supplier = CounterpartyProfile::Supplier {
            payment_delay_days: 30,
        };
        assert!(validate_profile(CounterpartyKind::SupplierLocal, &supplier).is_ok());
        assert!(validate_profile(CounterpartyKind::SupplierGroup, &supplier).is_ok());
        assert!(matches!(
            validate_profile(CounterpartyKind::CustomerLocal, &supplier),
            Err(LedgerError::ProfileKindMismatch(_))
        ));

        let customer = CounterpartyProfile::Customer {
            payment_delay_days: 45,
            credit_ceiling: Some(dec!(1_000_000)),
        };
        assert!(validate_profile(CounterpartyKind::CustomerGroup, &customer).is_ok());
        assert!(matches!(
            validate_profile(CounterpartyKind::Employee, &customer),
            Err(LedgerError::ProfileKindMismatch(_))
        ));
    }

    #[test]
    fn test_employee_requires_matricule() {
        let blank = CounterpartyProfile::Employee {
            matricule: "  ".to_string(),
        };
        assert!(matches!(
            validate_profile(CounterpartyKind::Employee, &blank),
            Err(LedgerError::MissingMatricule)
        ));

        let ok = CounterpartyProfile::Employee {
            matricule: "M-0042".to_string(),
        };
        assert!(validate_profile(CounterpartyKind::Employee, &ok).is_ok());
    }

    #[test]
    fn test_payment_delay_only_for_commercial_kinds() {
        assert_eq!(
            CounterpartyProfile::Supplier {
                payment_delay_days: 30
            }
            .payment_delay_days(),
            Some(30)
        );
        assert_eq!(
            CounterpartyProfile::Employee {
                matricule: "M-1".to_string()
            }
            .payment_delay_days(),
            None
        );
    }

    #[test]
    fn test_block_unblock() {
        let mut tiers = Counterparty {
            id: TiersId::new(),
            code: "FLOC00001".to_string(),
            kind: CounterpartyKind::SupplierLocal,
            collective_account: AccountId::new(),
            profile: CounterpartyProfile::Supplier {
                payment_delay_days: 30,
            },
            name: "Fournisseur Test".to_string(),
            short_name: None,
            taxpayer_number: None,
            active: true,
            blocked: false,
            blocked_reason: None,
        };

        tiers.block("litige en cours");
        assert!(tiers.blocked);
        assert_eq!(tiers.blocked_reason.as_deref(), Some("litige en cours"));

        tiers.unblock();
        assert!(!tiers.blocked);
        assert!(tiers.blocked_reason.is_none());
    }
}
