//! Entry repository: posting, line mutations, validation, duplication.
//!
//! Numbering and equilibrium writes run inside serializable transactions:
//! read-current-sequence then write-new-entry, and line-mutation then
//! equilibrium-recompute then persist, are each one atomic scope. A
//! numbering race is retried once, then surfaced as a concurrency error.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use grandlivre_core::fiscal::ensure_posting_allowed;
use grandlivre_core::ledger::entry::due_date_from_delay;
use grandlivre_core::ledger::equilibrium::{compute_totals, EntryTotals};
use grandlivre_core::ledger::numbering::{entry_number_prefix, format_entry_number, next_sequence};
use grandlivre_core::ledger::validation::{
    normalize_amount, validate_deletable, validate_editable, validate_for_validation,
    validate_line_account, validate_line_amounts, validate_line_tiers,
};
use grandlivre_core::ledger::{CreateEntryInput, Entry, EntryStatus, Line, LineInput, MetadataPatch, Side};
use grandlivre_core::LedgerError;
use grandlivre_shared::types::pagination::{PageRequest, PageResponse};
use grandlivre_shared::types::{
    AccountId, EntryId, ExerciseId, JournalId, LineId, PeriodId, TiersId, UserId,
};

use crate::entities::sea_orm_active_enums as enums;
use crate::entities::{accounts, entries, entry_lines, entry_sequences, journals, periods, tiers};

use super::account::to_domain as account_to_domain;
use super::tiers::to_domain as tiers_to_domain;
use super::{is_conflict, map_db_err};

/// Filter options for listing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Restrict to one journal.
    pub journal_id: Option<JournalId>,
    /// Restrict to one period.
    pub period_id: Option<PeriodId>,
    /// Restrict to one status.
    pub status: Option<EntryStatus>,
    /// Entries dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before.
    pub date_to: Option<NaiveDate>,
}

/// A line whose references and amounts passed validation.
struct PreparedLine {
    account_id: Uuid,
    tiers_id: Option<Uuid>,
    piece: Option<String>,
    label: String,
    debit: Decimal,
    credit: Decimal,
    due_date: Option<NaiveDate>,
}

/// Entry repository.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: DatabaseConnection,
    numbering_retries: u32,
}

impl EntryRepository {
    /// Creates a new entry repository with a single numbering retry.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            numbering_retries: 1,
        }
    }

    /// Overrides the number of numbering retries (from configuration).
    #[must_use]
    pub const fn with_numbering_retries(mut self, retries: u32) -> Self {
        self.numbering_retries = retries;
        self
    }

    /// Creates a draft entry with its lines, resolving the period from
    /// the date when none is given, and assigning the next number for
    /// the journal and year.
    ///
    /// # Errors
    ///
    /// Returns reference errors for unknown journal/account/tiers, state
    /// errors when posting is not allowed, validation errors on the
    /// lines, and `SerializationConflict` after the bounded retry.
    pub async fn create_entry(&self, input: CreateEntryInput) -> Result<Entry, LedgerError> {
        let journal = journals::Entity::find_by_id(input.journal_id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LedgerError::JournalNotFound(input.journal_id.to_string()))?;
        if !journal.active {
            return Err(LedgerError::JournalInactive(journal.code.clone()));
        }

        let (period, exercise) = self.resolve_period(&input).await?;
        ensure_posting_allowed(period.status.clone().into(), exercise.status.clone().into())?;

        let prepared = self
            .prepare_lines(&self.db, &input.lines, input.date, &input.label)
            .await?;

        let prefix = entry_number_prefix(&journal.code, input.date);

        let mut attempts = 0u32;
        loop {
            match self
                .try_insert_entry(&input, &journal, &period, &exercise, &prefix, &prepared)
                .await
            {
                Err(err) if err.is_retryable() && attempts < self.numbering_retries => {
                    attempts += 1;
                    tracing::warn!(%prefix, attempt = attempts, "numbering conflict, retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_insert_entry(
        &self,
        input: &CreateEntryInput,
        journal: &journals::Model,
        period: &periods::Model,
        exercise: &crate::entities::exercises::Model,
        prefix: &str,
        prepared: &[PreparedLine],
    ) -> Result<Entry, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(map_db_err)?;

        let sequence = match allocate_sequence(&txn, prefix).await {
            Ok(sequence) => sequence,
            Err(err) => {
                txn.rollback().await.ok();
                return Err(err);
            }
        };
        let number = format_entry_number(prefix, sequence);

        let now = Utc::now().into();
        let entry_id = Uuid::now_v7();
        let header = entries::ActiveModel {
            id: Set(entry_id),
            number: Set(number.clone()),
            journal_id: Set(journal.id),
            exercise_id: Set(exercise.id),
            period_id: Set(period.id),
            entry_date: Set(input.date),
            piece_date: Set(input.piece_date),
            label: Set(input.label.clone()),
            reference: Set(input.reference.clone()),
            status: Set(enums::EntryStatus::Draft),
            balanced: Set(false),
            total_amount: Set(Decimal::ZERO),
            validated_at: Set(None),
            validated_by: Set(None),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = match header.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(err) if is_conflict(&err) => {
                txn.rollback().await.ok();
                return Err(LedgerError::SerializationConflict);
            }
            Err(err) => {
                txn.rollback().await.ok();
                return Err(map_db_err(err));
            }
        };

        for (index, line) in prepared.iter().enumerate() {
            let model = entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry_id),
                line_number: Set(i16::try_from(index + 1).unwrap_or(i16::MAX)),
                account_id: Set(line.account_id),
                tiers_id: Set(line.tiers_id),
                piece: Set(line.piece.clone()),
                label: Set(line.label.clone()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                due_date: Set(line.due_date),
                reconciliation_code: Set(None),
                reconciled: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(&txn).await.map_err(map_db_err)?;
        }

        recompute_equilibrium(&txn, EntryId::from_uuid(entry_id)).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(number = %inserted.number, lines = prepared.len(), "entry created");
        self.get_entry(EntryId::from_uuid(entry_id)).await
    }

    /// Appends a line to a draft entry and recomputes equilibrium in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotEditable` outside draft, `PostingNotAllowed`
    /// when the fiscal gate closed since creation, or line validation
    /// errors.
    pub async fn add_line(&self, entry_id: EntryId, line: LineInput) -> Result<Entry, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(map_db_err)?;

        let entry = get_entry_model(&txn, entry_id).await?;
        validate_editable(entry.status.clone().into())?;
        self.check_posting_gate(&txn, entry.period_id).await?;

        let prepared = self
            .prepare_lines(
                &txn,
                std::slice::from_ref(&line),
                entry.entry_date,
                &entry.label,
            )
            .await?;
        let prepared = &prepared[0];

        let max_number: Option<i16> = entry_lines::Entity::find()
            .filter(entry_lines::Column::EntryId.eq(entry_id.into_inner()))
            .select_only()
            .column_as(entry_lines::Column::LineNumber.max(), "max_number")
            .into_tuple()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .flatten();

        let now = Utc::now().into();
        let model = entry_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_id: Set(entry_id.into_inner()),
            line_number: Set(max_number.unwrap_or(0).saturating_add(1)),
            account_id: Set(prepared.account_id),
            tiers_id: Set(prepared.tiers_id),
            piece: Set(prepared.piece.clone()),
            label: Set(prepared.label.clone()),
            debit: Set(prepared.debit),
            credit: Set(prepared.credit),
            due_date: Set(prepared.due_date),
            reconciliation_code: Set(None),
            reconciled: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&txn).await.map_err(map_db_err)?;

        recompute_equilibrium(&txn, entry_id).await?;
        txn.commit().await.map_err(map_db_err)?;

        self.get_entry(entry_id).await
    }

    /// Removes a line from a draft entry and recomputes equilibrium in
    /// the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotEditable` outside draft or `LineNotFound`.
    pub async fn remove_line(
        &self,
        entry_id: EntryId,
        line_id: LineId,
    ) -> Result<Entry, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(map_db_err)?;

        let entry = get_entry_model(&txn, entry_id).await?;
        validate_editable(entry.status.clone().into())?;

        let line = entry_lines::Entity::find_by_id(line_id.into_inner())
            .filter(entry_lines::Column::EntryId.eq(entry_id.into_inner()))
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::LineNotFound(line_id))?;

        line.delete(&txn).await.map_err(map_db_err)?;

        recompute_equilibrium(&txn, entry_id).await?;
        txn.commit().await.map_err(map_db_err)?;

        self.get_entry(entry_id).await
    }

    /// Validates an entry: one-way transition requiring equilibrium and
    /// at least two lines. Lines and financial header fields become
    /// immutable.
    ///
    /// # Errors
    ///
    /// Returns `UnbalancedEntry`, `TooFewLines`, or `AlreadyValidated`.
    pub async fn validate_entry(
        &self,
        entry_id: EntryId,
        actor: UserId,
    ) -> Result<Entry, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = get_entry_model(&txn, entry_id).await?;
        let lines = load_lines(&txn, entry_id).await?;
        let entry = entry_to_domain(model.clone(), lines);

        validate_for_validation(&entry)?;

        let now = Utc::now();
        let mut active: entries::ActiveModel = model.into();
        active.status = Set(enums::EntryStatus::Validated);
        active.validated_at = Set(Some(now.into()));
        active.validated_by = Set(Some(actor.into_inner()));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(number = %updated.number, "entry validated");

        self.get_entry(entry_id).await
    }

    /// Privileged metadata edit: label, reference, and piece date only.
    /// Allowed on draft and validated entries; closed entries are fully
    /// immutable.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotEditable` for closed entries.
    pub async fn update_metadata(
        &self,
        entry_id: EntryId,
        patch: MetadataPatch,
    ) -> Result<Entry, LedgerError> {
        let model = get_entry_model(&self.db, entry_id).await?;
        if enums::EntryStatus::Closed == model.status {
            return Err(LedgerError::EntryNotEditable(EntryStatus::Closed));
        }

        if patch.is_empty() {
            return self.get_entry(entry_id).await;
        }

        let mut active: entries::ActiveModel = model.into();
        if let Some(label) = patch.label {
            active.label = Set(label);
        }
        if let Some(reference) = patch.reference {
            active.reference = Set(Some(reference));
        }
        if let Some(piece_date) = patch.piece_date {
            active.piece_date = Set(Some(piece_date));
        }
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(map_db_err)?;

        self.get_entry(entry_id).await
    }

    /// Duplicates an entry: fresh number, draft status, cloned lines
    /// with reconciliation reset. The original is untouched.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` or `SerializationConflict` after the
    /// bounded retry.
    pub async fn duplicate_entry(&self, entry_id: EntryId) -> Result<Entry, LedgerError> {
        let source = get_entry_model(&self.db, entry_id).await?;
        let source_lines = load_line_models(&self.db, entry_id).await?;
        let journal = journals::Entity::find_by_id(source.journal_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LedgerError::JournalNotFound(source.journal_id.to_string()))?;

        let prefix = entry_number_prefix(&journal.code, source.entry_date);

        let mut attempts = 0u32;
        loop {
            match self
                .try_duplicate(&source, &source_lines, &prefix)
                .await
            {
                Err(err) if err.is_retryable() && attempts < self.numbering_retries => {
                    attempts += 1;
                    tracing::warn!(%prefix, attempt = attempts, "numbering conflict, retrying");
                }
                other => return other,
            }
        }
    }

    async fn try_duplicate(
        &self,
        source: &entries::Model,
        source_lines: &[entry_lines::Model],
        prefix: &str,
    ) -> Result<Entry, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(map_db_err)?;

        let sequence = match allocate_sequence(&txn, prefix).await {
            Ok(sequence) => sequence,
            Err(err) => {
                txn.rollback().await.ok();
                return Err(err);
            }
        };
        let number = format_entry_number(prefix, sequence);

        let now = Utc::now().into();
        let new_id = Uuid::now_v7();
        let header = entries::ActiveModel {
            id: Set(new_id),
            number: Set(number),
            journal_id: Set(source.journal_id),
            exercise_id: Set(source.exercise_id),
            period_id: Set(source.period_id),
            entry_date: Set(source.entry_date),
            piece_date: Set(source.piece_date),
            label: Set(source.label.clone()),
            reference: Set(source.reference.clone()),
            status: Set(enums::EntryStatus::Draft),
            balanced: Set(false),
            total_amount: Set(Decimal::ZERO),
            validated_at: Set(None),
            validated_by: Set(None),
            created_by: Set(source.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match header.insert(&txn).await {
            Ok(_) => {}
            Err(err) if is_conflict(&err) => {
                txn.rollback().await.ok();
                return Err(LedgerError::SerializationConflict);
            }
            Err(err) => {
                txn.rollback().await.ok();
                return Err(map_db_err(err));
            }
        }

        for line in source_lines {
            let clone = line_to_domain(line.clone()).duplicate_for(EntryId::from_uuid(new_id));
            let model = entry_lines::ActiveModel {
                id: Set(clone.id.into_inner()),
                entry_id: Set(new_id),
                line_number: Set(clone.line_number),
                account_id: Set(clone.account_id.into_inner()),
                tiers_id: Set(clone.tiers_id.map(TiersId::into_inner)),
                piece: Set(clone.piece),
                label: Set(clone.label),
                debit: Set(clone.debit),
                credit: Set(clone.credit),
                due_date: Set(clone.due_date),
                reconciliation_code: Set(None),
                reconciled: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(&txn).await.map_err(map_db_err)?;
        }

        recompute_equilibrium(&txn, EntryId::from_uuid(new_id)).await?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(source = %source.number, "entry duplicated");
        self.get_entry(EntryId::from_uuid(new_id)).await
    }

    /// Deletes a draft entry with its lines. The entry number is not
    /// reused.
    ///
    /// # Errors
    ///
    /// Returns `CanOnlyDeleteDraft` outside draft.
    pub async fn delete_entry(&self, entry_id: EntryId) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let entry = get_entry_model(&txn, entry_id).await?;
        validate_deletable(entry.status.clone().into())?;

        entry_lines::Entity::delete_many()
            .filter(entry_lines::Column::EntryId.eq(entry_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let number = entry.number.clone();
        entry.delete(&txn).await.map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(%number, "draft entry deleted");
        Ok(())
    }

    /// Loads an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when the id is unknown.
    pub async fn get_entry(&self, entry_id: EntryId) -> Result<Entry, LedgerError> {
        let model = get_entry_model(&self.db, entry_id).await?;
        let lines = load_lines(&self.db, entry_id).await?;
        Ok(entry_to_domain(model, lines))
    }

    /// Lists entry headers (without lines), newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list_entries(
        &self,
        filter: EntryFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Entry>, LedgerError> {
        let mut query = entries::Entity::find();
        if let Some(journal_id) = filter.journal_id {
            query = query.filter(entries::Column::JournalId.eq(journal_id.into_inner()));
        }
        if let Some(period_id) = filter.period_id {
            query = query.filter(entries::Column::PeriodId.eq(period_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(entries::Column::Status.eq(enums::EntryStatus::from(status)));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(entries::Column::EntryDate.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = query
            .order_by_desc(entries::Column::EntryDate)
            .order_by_desc(entries::Column::Number)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let data = models
            .into_iter()
            .map(|m| entry_to_domain(m, Vec::new()))
            .collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Resolves the period and exercise for a new entry: the explicit
    /// period when given (the date must fall inside it), otherwise the
    /// period containing the date.
    async fn resolve_period(
        &self,
        input: &CreateEntryInput,
    ) -> Result<(periods::Model, crate::entities::exercises::Model), LedgerError> {
        use crate::entities::exercises;

        if let Some(period_id) = input.period_id {
            let period = periods::Entity::find_by_id(period_id.into_inner())
                .one(&self.db)
                .await
                .map_err(map_db_err)?
                .ok_or(LedgerError::PeriodNotFound(period_id))?;
            if input.date < period.start_date || input.date > period.end_date {
                return Err(LedgerError::DateOutsidePeriod {
                    date: input.date,
                    start: period.start_date,
                    end: period.end_date,
                });
            }
            let exercise = exercises::Entity::find_by_id(period.exercise_id)
                .one(&self.db)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| {
                    LedgerError::ExerciseNotFound(ExerciseId::from_uuid(period.exercise_id))
                })?;
            return Ok((period, exercise));
        }

        let found = periods::Entity::find()
            .filter(periods::Column::StartDate.lte(input.date))
            .filter(periods::Column::EndDate.gte(input.date))
            .find_also_related(exercises::Entity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match found {
            Some((period, Some(exercise))) => Ok((period, exercise)),
            _ => Err(LedgerError::NoPeriodForDate(input.date)),
        }
    }

    /// Re-checks the posting gate for an existing entry's period.
    async fn check_posting_gate(
        &self,
        txn: &DatabaseTransaction,
        period_id: Uuid,
    ) -> Result<(), LedgerError> {
        use crate::entities::exercises;

        let period = periods::Entity::find_by_id(period_id)
            .one(txn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::PeriodNotFound(PeriodId::from_uuid(period_id)))?;
        let exercise = exercises::Entity::find_by_id(period.exercise_id)
            .one(txn)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| {
                LedgerError::ExerciseNotFound(ExerciseId::from_uuid(period.exercise_id))
            })?;

        ensure_posting_allowed(period.status.into(), exercise.status.into())
    }

    /// Validates references and amounts of the given line inputs.
    async fn prepare_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        lines: &[LineInput],
        entry_date: NaiveDate,
        entry_label: &str,
    ) -> Result<Vec<PreparedLine>, LedgerError> {
        let mut prepared = Vec::with_capacity(lines.len());

        for line in lines {
            let amount = normalize_amount(line.amount);
            let (debit, credit) = match line.side {
                Side::Debit => (amount, Decimal::ZERO),
                Side::Credit => (Decimal::ZERO, amount),
            };
            validate_line_amounts(debit, credit)?;

            let account_model = accounts::Entity::find_by_id(line.account_id.into_inner())
                .one(conn)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| LedgerError::AccountNotFound(line.account_id.to_string()))?;
            let account = account_to_domain(account_model)?;
            validate_line_account(&account)?;

            let mut due_date = line.due_date;
            if let Some(tiers_id) = line.tiers_id {
                let tiers_model = tiers::Entity::find_by_id(tiers_id.into_inner())
                    .one(conn)
                    .await
                    .map_err(map_db_err)?
                    .ok_or_else(|| LedgerError::TiersNotFound(tiers_id.to_string()))?;
                let counterparty = tiers_to_domain(tiers_model)?;
                validate_line_tiers(&account, &counterparty)?;

                if due_date.is_none() {
                    due_date = due_date_from_delay(
                        entry_date,
                        counterparty.profile.payment_delay_days(),
                    );
                }
            }

            let label = line
                .label
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| entry_label.to_string());

            prepared.push(PreparedLine {
                account_id: line.account_id.into_inner(),
                tiers_id: line.tiers_id.map(TiersId::into_inner),
                piece: line.piece.clone(),
                label,
                debit,
                credit,
                due_date,
            });
        }

        Ok(prepared)
    }
}

/// Allocates the next sequence for a prefix from the counter table,
/// seeding the counter from historical entry numbers on first use.
async fn allocate_sequence(txn: &DatabaseTransaction, prefix: &str) -> Result<u32, LedgerError> {
    let row = entry_sequences::Entity::find_by_id(prefix)
        .one(txn)
        .await
        .map_err(map_db_err)?;

    let now = Utc::now().into();
    match row {
        Some(row) => {
            let next = u32::try_from(row.last_value)
                .unwrap_or(0)
                .saturating_add(1);
            let mut active: entry_sequences::ActiveModel = row.into();
            active.last_value = Set(i64::from(next));
            active.updated_at = Set(now);
            active.update(txn).await.map_err(map_db_err)?;
            Ok(next)
        }
        None => {
            // First allocation for this journal/year: seed from whatever
            // historical numbers exist under the prefix.
            let existing: Vec<String> = entries::Entity::find()
                .select_only()
                .column(entries::Column::Number)
                .filter(entries::Column::Number.starts_with(prefix))
                .into_tuple()
                .all(txn)
                .await
                .map_err(map_db_err)?;
            let next = next_sequence(prefix, existing);

            let model = entry_sequences::ActiveModel {
                prefix: Set(prefix.to_string()),
                last_value: Set(i64::from(next)),
                updated_at: Set(now),
            };
            model.insert(txn).await.map_err(map_db_err)?;
            Ok(next)
        }
    }
}

/// Recomputes and persists an entry's equilibrium from its committed
/// lines, inside the caller's transaction.
async fn recompute_equilibrium(
    txn: &DatabaseTransaction,
    entry_id: EntryId,
) -> Result<EntryTotals, LedgerError> {
    let lines = load_lines(txn, entry_id).await?;
    let totals = compute_totals(&lines);

    let model = get_entry_model(txn, entry_id).await?;
    let mut active: entries::ActiveModel = model.into();
    active.balanced = Set(totals.balanced);
    active.total_amount = Set(totals.total_amount());
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await.map_err(map_db_err)?;

    Ok(totals)
}

async fn get_entry_model<C: ConnectionTrait>(
    conn: &C,
    entry_id: EntryId,
) -> Result<entries::Model, LedgerError> {
    entries::Entity::find_by_id(entry_id.into_inner())
        .one(conn)
        .await
        .map_err(map_db_err)?
        .ok_or(LedgerError::EntryNotFound(entry_id))
}

async fn load_line_models<C: ConnectionTrait>(
    conn: &C,
    entry_id: EntryId,
) -> Result<Vec<entry_lines::Model>, LedgerError> {
    entry_lines::Entity::find()
        .filter(entry_lines::Column::EntryId.eq(entry_id.into_inner()))
        .order_by_asc(entry_lines::Column::LineNumber)
        .all(conn)
        .await
        .map_err(map_db_err)
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: EntryId,
) -> Result<Vec<Line>, LedgerError> {
    Ok(load_line_models(conn, entry_id)
        .await?
        .into_iter()
        .map(line_to_domain)
        .collect())
}

/// Converts an entry row and its lines into the domain type.
pub(crate) fn entry_to_domain(model: entries::Model, lines: Vec<Line>) -> Entry {
    Entry {
        id: EntryId::from_uuid(model.id),
        number: model.number,
        journal_id: JournalId::from_uuid(model.journal_id),
        exercise_id: ExerciseId::from_uuid(model.exercise_id),
        period_id: PeriodId::from_uuid(model.period_id),
        date: model.entry_date,
        piece_date: model.piece_date,
        label: model.label,
        reference: model.reference,
        status: model.status.into(),
        balanced: model.balanced,
        total_amount: model.total_amount,
        validated_at: model.validated_at.map(Into::into),
        validated_by: model.validated_by.map(UserId::from_uuid),
        lines,
    }
}

/// Converts a line row into the domain type.
pub(crate) fn line_to_domain(model: entry_lines::Model) -> Line {
    Line {
        id: LineId::from_uuid(model.id),
        entry_id: EntryId::from_uuid(model.entry_id),
        line_number: model.line_number,
        account_id: AccountId::from_uuid(model.account_id),
        tiers_id: model.tiers_id.map(TiersId::from_uuid),
        piece: model.piece,
        label: model.label,
        debit: model.debit,
        credit: model.credit,
        due_date: model.due_date,
        reconciliation_code: model.reconciliation_code,
        reconciled: model.reconciled,
    }
}
