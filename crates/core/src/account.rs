//! OHADA chart of accounts rules.
//!
//! Accounts are identified by an 8-digit code whose first digit is the
//! OHADA class (1-9). The class constrains which account natures are
//! permitted.

use serde::{Deserialize, Serialize};

use grandlivre_shared::types::AccountId;

use crate::error::LedgerError;

/// Length of an OHADA account code.
pub const ACCOUNT_CODE_LEN: usize = 8;

/// OHADA account class, the first digit of the account code (1-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountClass(u8);

impl AccountClass {
    /// Creates a class from a digit 1-9.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAccountCode` for digits outside 1-9.
    pub fn new(digit: u8) -> Result<Self, LedgerError> {
        if (1..=9).contains(&digit) {
            Ok(Self(digit))
        } else {
            Err(LedgerError::InvalidAccountCode(format!("class {digit}")))
        }
    }

    /// Returns the class digit.
    #[must_use]
    pub const fn digit(self) -> u8 {
        self.0
    }

    /// Returns the natures permitted for this class.
    ///
    /// Class 6 holds expenses, class 7 income, class 1 liabilities,
    /// classes 2/3/5 assets; classes 4 and 9 hold either side of the
    /// balance sheet and class 8 either side of the income statement.
    #[must_use]
    pub const fn allowed_natures(self) -> &'static [AccountNature] {
        match self.0 {
            1 => &[AccountNature::Liability],
            2 | 3 | 5 => &[AccountNature::Asset],
            4 | 9 => &[AccountNature::Asset, AccountNature::Liability],
            6 => &[AccountNature::Expense],
            7 => &[AccountNature::Income],
            _ => &[AccountNature::Expense, AccountNature::Income],
        }
    }

    /// Returns true if `nature` is permitted for this class.
    #[must_use]
    pub fn permits(self, nature: AccountNature) -> bool {
        self.allowed_natures().contains(&nature)
    }
}

impl std::fmt::Display for AccountClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account nature along the balance sheet / income statement axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Asset account (actif).
    Asset,
    /// Liability account (passif).
    Liability,
    /// Expense account (charge).
    Expense,
    /// Income account (produit).
    Income,
}

impl std::fmt::Display for AccountNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Expense => "expense",
            Self::Income => "income",
        };
        f.write_str(s)
    }
}

/// Side on which the account normally carries its balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Normally a debit balance.
    Debit,
    /// Normally a credit balance.
    Credit,
    /// Either side depending on the situation.
    Variable,
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// 8-digit OHADA code, immutable once referenced by a line.
    pub code: String,
    /// OHADA class, always equal to the first digit of `code`.
    pub class: AccountClass,
    /// Account nature.
    pub nature: AccountNature,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Account label.
    pub label: String,
    /// Short OHADA sheet reference (e.g. "CA").
    pub reference: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
    /// Inactive accounts reject new postings.
    pub active: bool,
}

impl Account {
    /// Returns true if this account belongs to class 4 (auxiliary accounts).
    #[must_use]
    pub fn is_auxiliary(&self) -> bool {
        self.class.digit() == 4
    }
}

/// Validates an account code and returns its class.
///
/// The code must be exactly 8 ASCII digits and its first digit must be a
/// valid class (1-9).
///
/// # Errors
///
/// Returns `LedgerError::InvalidAccountCode` on any format violation.
pub fn validate_account_code(code: &str) -> Result<AccountClass, LedgerError> {
    if code.len() != ACCOUNT_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::InvalidAccountCode(code.to_string()));
    }
    let first = code.as_bytes()[0] - b'0';
    AccountClass::new(first).map_err(|_| LedgerError::InvalidAccountCode(code.to_string()))
}

/// Validates that `nature` is permitted for the class of `code`.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAccountCode` for a malformed code and
/// `LedgerError::NatureNotAllowed` for a class/nature mismatch.
pub fn validate_nature(code: &str, nature: AccountNature) -> Result<AccountClass, LedgerError> {
    let class = validate_account_code(code)?;
    if class.permits(nature) {
        Ok(class)
    } else {
        Err(LedgerError::NatureNotAllowed { class, nature })
    }
}
