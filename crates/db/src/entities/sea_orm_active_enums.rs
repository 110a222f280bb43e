//! `SeaORM` active enums mirroring the Postgres enum types.
//!
//! Conversions to and from the core domain enums live here so that
//! repositories can translate at the persistence boundary.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use grandlivre_core::account::{AccountNature as CoreNature, NormalBalance as CoreBalance};
use grandlivre_core::fiscal::{ExerciseStatus as CoreExerciseStatus, PeriodStatus as CorePeriodStatus};
use grandlivre_core::journal::JournalKind as CoreJournalKind;
use grandlivre_core::ledger::EntryStatus as CoreEntryStatus;
use grandlivre_core::tiers::CounterpartyKind as CoreKind;

/// Account nature (`account_nature`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_nature")]
pub enum AccountNature {
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Income account.
    #[sea_orm(string_value = "income")]
    Income,
}

/// Normal balance side (`normal_balance`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
pub enum NormalBalance {
    /// Debit-normal.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit-normal.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Either side.
    #[sea_orm(string_value = "variable")]
    Variable,
}

/// Journal kind (`journal_kind`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_kind")]
pub enum JournalKind {
    /// Achats.
    #[sea_orm(string_value = "purchases")]
    Purchases,
    /// Ventes.
    #[sea_orm(string_value = "sales")]
    Sales,
    /// Banque.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Caisse.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Paie et salaires.
    #[sea_orm(string_value = "payroll")]
    Payroll,
    /// Fiscal et déclarations.
    #[sea_orm(string_value = "tax")]
    Tax,
    /// Social.
    #[sea_orm(string_value = "social")]
    Social,
    /// Stocks et inventaires.
    #[sea_orm(string_value = "inventory")]
    Inventory,
    /// Immobilisations.
    #[sea_orm(string_value = "fixed_assets")]
    FixedAssets,
    /// Provisions.
    #[sea_orm(string_value = "provisions")]
    Provisions,
    /// À nouveaux.
    #[sea_orm(string_value = "carry_forward")]
    CarryForward,
    /// Clôture.
    #[sea_orm(string_value = "closing")]
    Closing,
    /// Opérations diverses.
    #[sea_orm(string_value = "miscellaneous")]
    Miscellaneous,
    /// Extra-comptable.
    #[sea_orm(string_value = "off_ledger")]
    OffLedger,
}

/// Counterparty kind (`tiers_kind`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tiers_kind")]
pub enum TiersKind {
    /// Fournisseur local (FLOC).
    #[sea_orm(string_value = "supplier_local")]
    SupplierLocal,
    /// Fournisseur groupe (FGRP).
    #[sea_orm(string_value = "supplier_group")]
    SupplierGroup,
    /// Client local (CLOC).
    #[sea_orm(string_value = "customer_local")]
    CustomerLocal,
    /// Client groupe (CGRP).
    #[sea_orm(string_value = "customer_group")]
    CustomerGroup,
    /// Employé (EMPL).
    #[sea_orm(string_value = "employee")]
    Employee,
}

/// Exercise status (`exercise_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exercise_status")]
pub enum ExerciseStatus {
    /// En préparation.
    #[sea_orm(string_value = "preparation")]
    Preparation,
    /// Ouvert.
    #[sea_orm(string_value = "open")]
    Open,
    /// Clôture provisoire.
    #[sea_orm(string_value = "provisional_close")]
    ProvisionalClose,
    /// Clôturé.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Archivé.
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Period status (`period_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
pub enum PeriodStatus {
    /// Ouverte.
    #[sea_orm(string_value = "open")]
    Open,
    /// Clôturée.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Verrouillée.
    #[sea_orm(string_value = "locked")]
    Locked,
}

/// Entry status (`entry_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    /// Brouillon.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Validée.
    #[sea_orm(string_value = "validated")]
    Validated,
    /// Clôturée.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<CoreNature> for AccountNature {
    fn from(value: CoreNature) -> Self {
        match value {
            CoreNature::Asset => Self::Asset,
            CoreNature::Liability => Self::Liability,
            CoreNature::Expense => Self::Expense,
            CoreNature::Income => Self::Income,
        }
    }
}

impl From<AccountNature> for CoreNature {
    fn from(value: AccountNature) -> Self {
        match value {
            AccountNature::Asset => Self::Asset,
            AccountNature::Liability => Self::Liability,
            AccountNature::Expense => Self::Expense,
            AccountNature::Income => Self::Income,
        }
    }
}

impl From<CoreBalance> for NormalBalance {
    fn from(value: CoreBalance) -> Self {
        match value {
            CoreBalance::Debit => Self::Debit,
            CoreBalance::Credit => Self::Credit,
            CoreBalance::Variable => Self::Variable,
        }
    }
}

impl From<NormalBalance> for CoreBalance {
    fn from(value: NormalBalance) -> Self {
        match value {
            NormalBalance::Debit => Self::Debit,
            NormalBalance::Credit => Self::Credit,
            NormalBalance::Variable => Self::Variable,
        }
    }
}

impl From<CoreJournalKind> for JournalKind {
    fn from(value: CoreJournalKind) -> Self {
        match value {
            CoreJournalKind::Purchases => Self::Purchases,
            CoreJournalKind::Sales => Self::Sales,
            CoreJournalKind::Bank => Self::Bank,
            CoreJournalKind::Cash => Self::Cash,
            CoreJournalKind::Payroll => Self::Payroll,
            CoreJournalKind::Tax => Self::Tax,
            CoreJournalKind::Social => Self::Social,
            CoreJournalKind::Inventory => Self::Inventory,
            CoreJournalKind::FixedAssets => Self::FixedAssets,
            CoreJournalKind::Provisions => Self::Provisions,
            CoreJournalKind::CarryForward => Self::CarryForward,
            CoreJournalKind::Closing => Self::Closing,
            CoreJournalKind::Miscellaneous => Self::Miscellaneous,
            CoreJournalKind::OffLedger => Self::OffLedger,
        }
    }
}

impl From<JournalKind> for CoreJournalKind {
    fn from(value: JournalKind) -> Self {
        match value {
            JournalKind::Purchases => Self::Purchases,
            JournalKind::Sales => Self::Sales,
            JournalKind::Bank => Self::Bank,
            JournalKind::Cash => Self::Cash,
            JournalKind::Payroll => Self::Payroll,
            JournalKind::Tax => Self::Tax,
            JournalKind::Social => Self::Social,
            JournalKind::Inventory => Self::Inventory,
            JournalKind::FixedAssets => Self::FixedAssets,
            JournalKind::Provisions => Self::Provisions,
            JournalKind::CarryForward => Self::CarryForward,
            JournalKind::Closing => Self::Closing,
            JournalKind::Miscellaneous => Self::Miscellaneous,
            JournalKind::OffLedger => Self::OffLedger,
        }
    }
}

impl From<CoreKind> for TiersKind {
    fn from(value: CoreKind) -> Self {
        match value {
            CoreKind::SupplierLocal => Self::SupplierLocal,
            CoreKind::SupplierGroup => Self::SupplierGroup,
            CoreKind::CustomerLocal => Self::CustomerLocal,
            CoreKind::CustomerGroup => Self::CustomerGroup,
            CoreKind::Employee => Self::Employee,
        }
    }
}

impl From<TiersKind> for CoreKind {
    fn from(value: TiersKind) -> Self {
        match value {
            TiersKind::SupplierLocal => Self::SupplierLocal,
            TiersKind::SupplierGroup => Self::SupplierGroup,
            TiersKind::CustomerLocal => Self::CustomerLocal,
            TiersKind::CustomerGroup => Self::CustomerGroup,
            TiersKind::Employee => Self::Employee,
        }
    }
}

impl From<CoreExerciseStatus> for ExerciseStatus {
    fn from(value: CoreExerciseStatus) -> Self {
        match value {
            CoreExerciseStatus::Preparation => Self::Preparation,
            CoreExerciseStatus::Open => Self::Open,
            CoreExerciseStatus::ProvisionalClose => Self::ProvisionalClose,
            CoreExerciseStatus::Closed => Self::Closed,
            CoreExerciseStatus::Archived => Self::Archived,
        }
    }
}

impl From<ExerciseStatus> for CoreExerciseStatus {
    fn from(value: ExerciseStatus) -> Self {
        match value {
            ExerciseStatus::Preparation => Self::Preparation,
            ExerciseStatus::Open => Self::Open,
            ExerciseStatus::ProvisionalClose => Self::ProvisionalClose,
            ExerciseStatus::Closed => Self::Closed,
            ExerciseStatus::Archived => Self::Archived,
        }
    }
}

impl From<CorePeriodStatus> for PeriodStatus {
    fn from(value: CorePeriodStatus) -> Self {
        match value {
            CorePeriodStatus::Open => Self::Open,
            CorePeriodStatus::Closed => Self::Closed,
            CorePeriodStatus::Locked => Self::Locked,
        }
    }
}

impl From<PeriodStatus> for CorePeriodStatus {
    fn from(value: PeriodStatus) -> Self {
        match value {
            PeriodStatus::Open => Self::Open,
            PeriodStatus::Closed => Self::Closed,
            PeriodStatus::Locked => Self::Locked,
        }
    }
}

impl From<CoreEntryStatus> for EntryStatus {
    fn from(value: CoreEntryStatus) -> Self {
        match value {
            CoreEntryStatus::Draft => Self::Draft,
            CoreEntryStatus::Validated => Self::Validated,
            CoreEntryStatus::Closed => Self::Closed,
        }
    }
}

impl From<EntryStatus> for CoreEntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::Validated => Self::Validated,
            EntryStatus::Closed => Self::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_conversions() {
        for kind in grandlivre_core::tiers::CounterpartyKind::ALL {
            assert_eq!(CoreKind::from(TiersKind::from(kind)), kind);
        }
        for kind in grandlivre_core::journal::JournalKind::ALL {
            assert_eq!(CoreJournalKind::from(JournalKind::from(kind)), kind);
        }
        for status in [
            CoreEntryStatus::Draft,
            CoreEntryStatus::Validated,
            CoreEntryStatus::Closed,
        ] {
            assert_eq!(CoreEntryStatus::from(EntryStatus::from(status)), status);
        }
    }
}
