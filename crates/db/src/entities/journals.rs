//! `SeaORM` Entity for the journals table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::JournalKind;

/// Journal row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journals")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Uppercase alphanumeric code, unique.
    #[sea_orm(unique)]
    pub code: String,
    /// Journal label.
    pub label: String,
    /// OHADA journal kind.
    pub kind: JournalKind,
    /// Optional default counter-account.
    pub counter_account_id: Option<Uuid>,
    /// Active flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Default counter-account.
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CounterAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    /// Entries posted through this journal.
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
