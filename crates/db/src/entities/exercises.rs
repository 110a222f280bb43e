//! `SeaORM` Entity for the exercises (fiscal years) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ExerciseStatus;

/// Fiscal exercise row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "exercises")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique code, conventionally the year.
    #[sea_orm(unique)]
    pub code: String,
    /// Display label.
    pub label: String,
    /// First day of the exercise.
    pub start_date: Date,
    /// Last day of the exercise.
    pub end_date: Date,
    /// Lifecycle status.
    pub status: ExerciseStatus,
    /// Provisional close date.
    pub provisional_close_date: Option<Date>,
    /// Definitive close date.
    pub definitive_close_date: Option<Date>,
    /// Carry-forward idempotency flag.
    pub carry_forward_generated: bool,
    /// Carry-forward generation timestamp.
    pub carry_forward_at: Option<DateTimeWithTimeZone>,
    /// First exercise of the company.
    pub first_exercise: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Periods of this exercise.
    #[sea_orm(has_many = "super::periods::Entity")]
    Periods,
    /// Entries recorded in this exercise.
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
