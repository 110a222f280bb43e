//! `SeaORM` Entity for the accounts table (OHADA chart of accounts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountNature, NormalBalance};

/// Chart of accounts row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// 8-digit OHADA code, unique.
    #[sea_orm(unique)]
    pub code: String,
    /// OHADA class (first digit of the code).
    pub class: i16,
    /// Account nature.
    pub nature: AccountNature,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Account label.
    pub label: String,
    /// Short OHADA sheet reference.
    pub reference: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
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
    /// Lines posting to this account.
    #[sea_orm(has_many = "super::entry_lines::Entity")]
    EntryLines,
}

impl Related<super::entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
