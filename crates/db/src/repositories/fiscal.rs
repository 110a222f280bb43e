//! Exercise and period repository.
//!
//! Lifecycle checks live in `grandlivre_core::fiscal`; this repository
//! loads the state they need, applies the transition, and persists the
//! outcome in one transaction.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use grandlivre_core::fiscal::exercise::{
    validate_carry_forward, validate_close_definitive, validate_close_provisional,
    validate_exercise_dates, validate_open, Exercise,
};
use grandlivre_core::fiscal::period::{validate_close, validate_lock, Period};
use grandlivre_core::fiscal::generate_monthly_periods;
use grandlivre_core::LedgerError;
use grandlivre_shared::types::{ExerciseId, PeriodId, UserId};

use crate::entities::sea_orm_active_enums as enums;
use crate::entities::{entries, exercises, periods};

use super::map_db_err;

/// Input for creating an exercise (in `Preparation`).
#[derive(Debug, Clone)]
pub struct CreateExerciseInput {
    /// Unique code, conventionally the year.
    pub code: String,
    /// Display label.
    pub label: String,
    /// First day of the exercise.
    pub start: NaiveDate,
    /// Last day of the exercise.
    pub end: NaiveDate,
    /// First exercise of the company.
    pub first_exercise: bool,
}

/// An exercise with its periods.
#[derive(Debug, Clone)]
pub struct ExerciseWithPeriods {
    /// The exercise.
    pub exercise: Exercise,
    /// Its periods, ordered by number.
    pub periods: Vec<Period>,
}

/// Exercise and period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an exercise in `Preparation`. Periods are generated at
    /// opening, not here.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`, `ExerciseTooLong`, or `DuplicateCode`.
    pub async fn create_exercise(&self, input: CreateExerciseInput) -> Result<Exercise, LedgerError> {
        validate_exercise_dates(input.start, input.end)?;

        let existing = exercises::Entity::find()
            .filter(exercises::Column::Code.eq(&input.code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateCode(input.code));
        }

        let now = Utc::now().into();
        let model = exercises::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            label: Set(input.label),
            start_date: Set(input.start),
            end_date: Set(input.end),
            status: Set(enums::ExerciseStatus::Preparation),
            provisional_close_date: Set(None),
            definitive_close_date: Set(None),
            carry_forward_generated: Set(false),
            carry_forward_at: Set(None),
            first_exercise: Set(input.first_exercise),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %inserted.code, "exercise created");
        Ok(exercise_to_domain(inserted))
    }

    /// Opens an exercise and generates its monthly periods.
    ///
    /// At most two exercises may be open; when one other is open the new
    /// one must start strictly after it.
    ///
    /// # Errors
    ///
    /// Returns the violated state rule, or `ExerciseNotFound`.
    pub async fn open_exercise(&self, id: ExerciseId) -> Result<ExerciseWithPeriods, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = get_exercise(&txn, id).await?;
        let exercise = exercise_to_domain(model.clone());

        let open_starts: Vec<NaiveDate> = exercises::Entity::find()
            .filter(exercises::Column::Status.eq(enums::ExerciseStatus::Open))
            .filter(exercises::Column::Id.ne(id.into_inner()))
            .all(&txn)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|e| e.start_date)
            .collect();

        validate_open(&exercise, &open_starts)?;

        let now = Utc::now().into();
        let mut active: exercises::ActiveModel = model.into();
        active.status = Set(enums::ExerciseStatus::Open);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        // Generate periods unless a previous opening already did.
        let existing_periods = periods::Entity::find()
            .filter(periods::Column::ExerciseId.eq(id.into_inner()))
            .count(&txn)
            .await
            .map_err(map_db_err)?;

        let mut inserted_periods = Vec::new();
        if existing_periods == 0 {
            for period in generate_monthly_periods(id, exercise.start, exercise.end) {
                let model = periods::ActiveModel {
                    id: Set(period.id.into_inner()),
                    exercise_id: Set(id.into_inner()),
                    number: Set(i16::from(period.number)),
                    start_date: Set(period.start),
                    end_date: Set(period.end),
                    status: Set(enums::PeriodStatus::Open),
                    closed_at: Set(None),
                    closed_by: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                inserted_periods.push(model.insert(&txn).await.map_err(map_db_err)?);
            }
        } else {
            inserted_periods = periods::Entity::find()
                .filter(periods::Column::ExerciseId.eq(id.into_inner()))
                .order_by_asc(periods::Column::Number)
                .all(&txn)
                .await
                .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, periods = inserted_periods.len(), "exercise opened");

        Ok(ExerciseWithPeriods {
            exercise: exercise_to_domain(updated),
            periods: inserted_periods
                .into_iter()
                .map(period_to_domain)
                .collect(),
        })
    }

    /// Provisionally closes an open exercise (inventory entries only).
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotOpen` or `ExerciseNotFound`.
    pub async fn close_provisional(&self, id: ExerciseId) -> Result<Exercise, LedgerError> {
        let model = get_exercise(&self.db, id).await?;
        let exercise = exercise_to_domain(model.clone());
        validate_close_provisional(exercise.status)?;

        let today = Utc::now().date_naive();
        let mut active: exercises::ActiveModel = model.into();
        active.status = Set(enums::ExerciseStatus::ProvisionalClose);
        active.provisional_close_date = Set(Some(today));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "exercise provisionally closed");
        Ok(exercise_to_domain(updated))
    }

    /// Definitively closes an exercise.
    ///
    /// Must happen within 6 months of the end date; past the deadline
    /// the failure is permanent and surfaced, never retried.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotClosable`, `CloseDeadlinePassed`, or
    /// `ExerciseNotFound`.
    pub async fn close_definitive(&self, id: ExerciseId) -> Result<Exercise, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let model = get_exercise(&txn, id).await?;
        let exercise = exercise_to_domain(model.clone());

        let today = Utc::now().date_naive();
        validate_close_definitive(&exercise, today)?;

        let mut active: exercises::ActiveModel = model.into();
        active.status = Set(enums::ExerciseStatus::Closed);
        active.definitive_close_date = Set(Some(today));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "exercise definitively closed");
        Ok(exercise_to_domain(updated))
    }

    /// Marks carry-forward generation as done; runs at most once per
    /// exercise.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotClosed`, `CarryForwardAlreadyGenerated`, or
    /// `ExerciseNotFound`.
    pub async fn generate_carry_forward(&self, id: ExerciseId) -> Result<Exercise, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let model = get_exercise(&txn, id).await?;
        let exercise = exercise_to_domain(model.clone());

        validate_carry_forward(&exercise)?;

        let now = Utc::now();
        let mut active: exercises::ActiveModel = model.into();
        active.carry_forward_generated = Set(true);
        active.carry_forward_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "carry-forward generated");
        Ok(exercise_to_domain(updated))
    }

    /// Closes a period. Periods close strictly left to right; validated
    /// entries of the period become `Closed` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotOpen`, `EarlierPeriodsOpen`, or
    /// `PeriodNotFound`.
    pub async fn close_period(&self, id: PeriodId, actor: UserId) -> Result<Period, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = get_period(&txn, id).await?;
        let period = period_to_domain(model.clone());

        let earlier_open = periods::Entity::find()
            .filter(periods::Column::ExerciseId.eq(model.exercise_id))
            .filter(periods::Column::Number.lt(model.number))
            .filter(periods::Column::Status.eq(enums::PeriodStatus::Open))
            .count(&txn)
            .await
            .map_err(map_db_err)?;

        validate_close(&period, earlier_open > 0)?;

        let now = Utc::now().into();
        let mut active: periods::ActiveModel = model.into();
        active.status = Set(enums::PeriodStatus::Closed);
        active.closed_at = Set(Some(now));
        active.closed_by = Set(Some(actor.into_inner()));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        // Batch transition: validated entries of the period close with it.
        let validated = entries::Entity::find()
            .filter(entries::Column::PeriodId.eq(id.into_inner()))
            .filter(entries::Column::Status.eq(enums::EntryStatus::Validated))
            .all(&txn)
            .await
            .map_err(map_db_err)?;
        let entries_closed = validated.len();
        for entry in validated {
            let mut active: entries::ActiveModel = entry.into();
            active.status = Set(enums::EntryStatus::Closed);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(period = updated.number, entries_closed, "period closed");
        Ok(period_to_domain(updated))
    }

    /// Locks a closed period. `Locked` is terminal.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotClosed` or `PeriodNotFound`.
    pub async fn lock_period(&self, id: PeriodId) -> Result<Period, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let model = get_period(&txn, id).await?;
        let period = period_to_domain(model.clone());

        validate_lock(&period)?;

        let mut active: periods::ActiveModel = model.into();
        active.status = Set(enums::PeriodStatus::Locked);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(period = updated.number, "period locked");
        Ok(period_to_domain(updated))
    }

    /// Finds the period containing a date, with its exercise.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriodForDate` when no period covers the date.
    pub async fn find_period_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<(Period, Exercise), LedgerError> {
        let found = periods::Entity::find()
            .filter(periods::Column::StartDate.lte(date))
            .filter(periods::Column::EndDate.gte(date))
            .find_also_related(exercises::Entity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match found {
            Some((period, Some(exercise))) => {
                Ok((period_to_domain(period), exercise_to_domain(exercise)))
            }
            _ => Err(LedgerError::NoPeriodForDate(date)),
        }
    }

    /// Returns an exercise with its periods.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseNotFound` when the id is unknown.
    pub async fn get_exercise_with_periods(
        &self,
        id: ExerciseId,
    ) -> Result<ExerciseWithPeriods, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;
        let model = get_exercise(&txn, id).await?;

        let period_models = periods::Entity::find()
            .filter(periods::Column::ExerciseId.eq(id.into_inner()))
            .order_by_asc(periods::Column::Number)
            .all(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        Ok(ExerciseWithPeriods {
            exercise: exercise_to_domain(model),
            periods: period_models.into_iter().map(period_to_domain).collect(),
        })
    }

    /// Lists exercises ordered by start date descending.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list_exercises(&self) -> Result<Vec<Exercise>, LedgerError> {
        let models = exercises::Entity::find()
            .order_by_desc(exercises::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(exercise_to_domain).collect())
    }
}

async fn get_exercise<C: ConnectionTrait>(
    conn: &C,
    id: ExerciseId,
) -> Result<exercises::Model, LedgerError> {
    exercises::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or(LedgerError::ExerciseNotFound(id))
}

async fn get_period<C: ConnectionTrait>(
    conn: &C,
    id: PeriodId,
) -> Result<periods::Model, LedgerError> {
    periods::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or(LedgerError::PeriodNotFound(id))
}

/// Converts an exercise row into the domain type.
pub(crate) fn exercise_to_domain(model: exercises::Model) -> Exercise {
    Exercise {
        id: ExerciseId::from_uuid(model.id),
        code: model.code,
        label: model.label,
        start: model.start_date,
        end: model.end_date,
        status: model.status.into(),
        provisional_close_date: model.provisional_close_date,
        definitive_close_date: model.definitive_close_date,
        carry_forward_generated: model.carry_forward_generated,
        carry_forward_at: model.carry_forward_at.map(Into::into),
        first_exercise: model.first_exercise,
    }
}

/// Converts a period row into the domain type.
pub(crate) fn period_to_domain(model: periods::Model) -> Period {
    Period {
        id: PeriodId::from_uuid(model.id),
        exercise_id: ExerciseId::from_uuid(model.exercise_id),
        number: u8::try_from(model.number).unwrap_or(u8::MAX),
        start: model.start_date,
        end: model.end_date,
        status: model.status.into(),
        closed_at: model.closed_at.map(Into::into),
        closed_by: model.closed_by.map(UserId::from_uuid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandlivre_core::fiscal::{ExerciseStatus, PeriodStatus};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exercise_to_domain() {
        let now = Utc::now().into();
        let exercise = exercise_to_domain(exercises::Model {
            id: Uuid::now_v7(),
            code: "2024".to_string(),
            label: "Exercice 2024".to_string(),
            start_date: ymd(2024, 1, 1),
            end_date: ymd(2024, 12, 31),
            status: enums::ExerciseStatus::Open,
            provisional_close_date: None,
            definitive_close_date: None,
            carry_forward_generated: false,
            carry_forward_at: None,
            first_exercise: true,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(exercise.status, ExerciseStatus::Open);
        assert_eq!(exercise.close_deadline(), ymd(2025, 6, 30));
        assert!(exercise.contains_date(ymd(2024, 7, 14)));
    }

    #[test]
    fn test_period_to_domain() {
        let now = Utc::now().into();
        let period = period_to_domain(periods::Model {
            id: Uuid::now_v7(),
            exercise_id: Uuid::now_v7(),
            number: 3,
            start_date: ymd(2024, 3, 1),
            end_date: ymd(2024, 3, 31),
            status: enums::PeriodStatus::Closed,
            closed_at: Some(now),
            closed_by: Some(Uuid::now_v7()),
            created_at: now,
            updated_at: now,
        });

        assert_eq!(period.number, 3);
        assert_eq!(period.status, PeriodStatus::Closed);
        assert!(period.closed_by.is_some());
    }
}
