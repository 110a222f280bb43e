//! `SeaORM` Entity for the entries (écritures) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryStatus;

/// Entry header row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Generated number `<Journal><YY><seq4>`, unique.
    #[sea_orm(unique)]
    pub number: String,
    /// Journal posted through.
    pub journal_id: Uuid,
    /// Owning exercise.
    pub exercise_id: Uuid,
    /// Period resolved at creation.
    pub period_id: Uuid,
    /// Entry date.
    pub entry_date: Date,
    /// Supporting-document date.
    pub piece_date: Option<Date>,
    /// Entry label.
    pub label: String,
    /// External reference.
    pub reference: Option<String>,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// Derived: debits equal credits and are positive.
    pub balanced: bool,
    /// Derived: total debit when balanced.
    pub total_amount: Decimal,
    /// Validation timestamp.
    pub validated_at: Option<DateTimeWithTimeZone>,
    /// Validating actor.
    pub validated_by: Option<Uuid>,
    /// Creating actor.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The journal.
    #[sea_orm(
        belongs_to = "super::journals::Entity",
        from = "Column::JournalId",
        to = "super::journals::Column::Id"
    )]
    Journals,
    /// The exercise.
    #[sea_orm(
        belongs_to = "super::exercises::Entity",
        from = "Column::ExerciseId",
        to = "super::exercises::Column::Id"
    )]
    Exercises,
    /// The period.
    #[sea_orm(
        belongs_to = "super::periods::Entity",
        from = "Column::PeriodId",
        to = "super::periods::Column::Id"
    )]
    Periods,
    /// The lines of this entry.
    #[sea_orm(has_many = "super::entry_lines::Entity")]
    EntryLines,
}

impl Related<super::journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Journals.def()
    }
}

impl Related<super::exercises::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exercises.def()
    }
}

impl Related<super::periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl Related<super::entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
