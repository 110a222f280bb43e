//! `SeaORM` Entity for the entry_lines (lignes d'écriture) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Entry line row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_lines")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning entry.
    pub entry_id: Uuid,
    /// Position within the entry.
    pub line_number: i16,
    /// Account posted to.
    pub account_id: Uuid,
    /// Optional counterparty.
    pub tiers_id: Option<Uuid>,
    /// Supporting document reference.
    pub piece: Option<String>,
    /// Line label.
    pub label: String,
    /// Debit amount (zero for credit lines).
    pub debit: Decimal,
    /// Credit amount (zero for debit lines).
    pub credit: Decimal,
    /// Due date for counterparty lines.
    pub due_date: Option<Date>,
    /// Shared reconciliation code.
    pub reconciliation_code: Option<String>,
    /// Reconciled flag.
    pub reconciled: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning entry.
    #[sea_orm(
        belongs_to = "super::entries::Entity",
        from = "Column::EntryId",
        to = "super::entries::Column::Id"
    )]
    Entries,
    /// The account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    /// The counterparty.
    #[sea_orm(
        belongs_to = "super::tiers::Entity",
        from = "Column::TiersId",
        to = "super::tiers::Column::Id"
    )]
    Tiers,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::tiers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tiers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
