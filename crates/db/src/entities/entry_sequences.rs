//! `SeaORM` Entity for the entry_sequences table.
//!
//! One row per journal/year prefix (e.g. `AC24`) holding the last
//! allocated sequence. Incremented under serializable isolation so
//! numbers stay gapless and are never reused, even after the latest
//! draft entry of a prefix is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sequence counter row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_sequences")]
pub struct Model {
    /// Journal code + 2-digit year, e.g. `AC24`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub prefix: String,
    /// Last allocated sequence for the prefix.
    pub last_value: i64,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
