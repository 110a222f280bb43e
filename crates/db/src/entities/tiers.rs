//! `SeaORM` Entity for the tiers (counterparty) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TiersKind;

/// Counterparty row.
///
/// Per-kind fields (`payment_delay_days`, `credit_ceiling`, `matricule`)
/// are nullable columns; the repository rebuilds the tagged
/// `CounterpartyProfile` from `kind` at the boundary.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tiers")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Code: kind prefix + 5-digit sequence, unique.
    #[sea_orm(unique)]
    pub code: String,
    /// Counterparty kind.
    pub kind: TiersKind,
    /// Collective account determined by the kind.
    pub collective_account_id: Uuid,
    /// Payment delay in days (suppliers and customers).
    pub payment_delay_days: Option<i32>,
    /// Authorized credit ceiling (customers only).
    pub credit_ceiling: Option<Decimal>,
    /// Employee matricule, unique when present.
    pub matricule: Option<String>,
    /// Legal name.
    pub name: String,
    /// Commercial short name.
    pub short_name: Option<String>,
    /// Tax identification number, unique when present.
    pub taxpayer_number: Option<String>,
    /// Active flag.
    pub active: bool,
    /// Blocked flag.
    pub blocked: bool,
    /// Blocking reason.
    pub blocked_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The collective account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CollectiveAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    /// Lines naming this counterparty.
    #[sea_orm(has_many = "super::entry_lines::Entity")]
    EntryLines,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
