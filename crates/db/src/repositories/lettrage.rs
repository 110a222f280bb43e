//! Reconciliation (lettrage) repository.
//!
//! Reconciliation annotates lines; it never touches amounts and never
//! recomputes equilibrium. The whole set is tagged in one transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use grandlivre_core::ledger::lettrage::{
    generate_lettrage_code, validate_lettrage_code, validate_reconciliation_set, ReconcilableLine,
};
use grandlivre_core::ledger::Line;
use grandlivre_core::LedgerError;
use grandlivre_shared::types::pagination::{PageRequest, PageResponse};
use grandlivre_shared::types::{AccountId, LineId};

use crate::entities::{entries, entry_lines};

use super::entry::line_to_domain;
use super::map_db_err;

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct LettrageRepository {
    db: DatabaseConnection,
}

impl LettrageRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reconciles a set of lines under one shared code.
    ///
    /// The set must hold at least two unreconciled lines of a single
    /// account, all owned by validated or closed entries, netting to
    /// zero exactly. The code is caller-supplied or generated.
    ///
    /// # Errors
    ///
    /// Returns the violated precondition, or `LineNotFound` for an
    /// unknown id.
    pub async fn reconcile(
        &self,
        line_ids: &[LineId],
        code: Option<String>,
    ) -> Result<String, LedgerError> {
        let code = match code {
            Some(code) => {
                validate_lettrage_code(&code)?;
                code
            }
            None => generate_lettrage_code(&mut rand::rng()),
        };

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let mut views = Vec::with_capacity(line_ids.len());
        let mut models = Vec::with_capacity(line_ids.len());
        for &line_id in line_ids {
            let line = entry_lines::Entity::find_by_id(line_id.into_inner())
                .one(&txn)
                .await
                .map_err(map_db_err)?
                .ok_or(LedgerError::LineNotFound(line_id))?;
            let entry = entries::Entity::find_by_id(line.entry_id)
                .one(&txn)
                .await
                .map_err(map_db_err)?
                .ok_or_else(|| {
                    LedgerError::Database(format!("line {line_id} has no parent entry"))
                })?;

            views.push(ReconcilableLine {
                line_id,
                account_id: AccountId::from_uuid(line.account_id),
                debit: line.debit,
                credit: line.credit,
                reconciled: line.reconciled,
                entry_status: entry.status.into(),
            });
            models.push(line);
        }

        validate_reconciliation_set(&views)?;

        let now = Utc::now().into();
        for model in models {
            let mut active: entry_lines::ActiveModel = model.into();
            active.reconciliation_code = Set(Some(code.clone()));
            active.reconciled = Set(true);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(%code, lines = line_ids.len(), "lines reconciled");
        Ok(code)
    }

    /// Clears the code and flag on every line carrying `code`, returning
    /// how many lines were cleared.
    ///
    /// # Errors
    ///
    /// Returns `NothingToUnreconcile` when no line carries the code.
    pub async fn unreconcile(&self, code: &str) -> Result<u64, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let models = entry_lines::Entity::find()
            .filter(entry_lines::Column::ReconciliationCode.eq(code))
            .all(&txn)
            .await
            .map_err(map_db_err)?;

        if models.is_empty() {
            return Err(LedgerError::NothingToUnreconcile(code.to_string()));
        }

        let count = models.len() as u64;
        let now = Utc::now().into();
        for model in models {
            let mut active: entry_lines::ActiveModel = model.into();
            active.reconciliation_code = Set(None);
            active.reconciled = Set(false);
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(%code, lines = count, "lines unreconciled");
        Ok(count)
    }

    /// Lists unreconciled lines of an account, oldest entries first.
    /// Paginated: reconciliation candidate scans are never materialized
    /// wholesale.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn find_unreconciled(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<Line>, LedgerError> {
        let query = entry_lines::Entity::find()
            .filter(entry_lines::Column::AccountId.eq(account_id.into_inner()))
            .filter(entry_lines::Column::Reconciled.eq(false));

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let models = query
            .order_by_asc(entry_lines::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let data = models.into_iter().map(line_to_domain).collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }
}
