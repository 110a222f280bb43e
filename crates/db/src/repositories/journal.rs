//! Journal registry repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use grandlivre_core::journal::{normalize_journal_code, Journal, JournalKind};
use grandlivre_core::LedgerError;
use grandlivre_shared::types::{AccountId, JournalId};

use crate::entities::journals;

use super::map_db_err;

/// Input for creating a journal.
#[derive(Debug, Clone)]
pub struct CreateJournalInput {
    /// Journal code; normalized to uppercase.
    pub code: String,
    /// Journal label.
    pub label: String,
    /// OHADA journal kind.
    pub kind: JournalKind,
    /// Optional default counter-account.
    pub counter_account: Option<AccountId>,
}

/// Mutable journal fields. The code and kind are immutable.
///
/// `counter_account` distinguishes "leave unchanged" (outer `None`)
/// from "clear the default counter-account" (inner `None`).
#[derive(Debug, Clone, Default)]
pub struct UpdateJournalInput {
    /// New label.
    pub label: Option<String>,
    /// New default counter-account, or `Some(None)` to clear it.
    pub counter_account: Option<Option<AccountId>>,
}

/// Journal registry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a journal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidJournalCode` or `DuplicateCode`.
    pub async fn create(&self, input: CreateJournalInput) -> Result<Journal, LedgerError> {
        let code = normalize_journal_code(&input.code)?;

        let existing = journals::Entity::find()
            .filter(journals::Column::Code.eq(&code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateCode(code));
        }

        let now = Utc::now().into();
        let model = journals::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            label: Set(input.label),
            kind: Set(input.kind.into()),
            counter_account_id: Set(input.counter_account.map(AccountId::into_inner)),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %inserted.code, "journal created");
        Ok(to_domain(inserted))
    }

    /// Updates the mutable fields of a journal.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` when the code is unknown.
    pub async fn update(
        &self,
        code: &str,
        input: UpdateJournalInput,
    ) -> Result<Journal, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: journals::ActiveModel = model.into();
        if let Some(label) = input.label {
            active.label = Set(label);
        }
        if let Some(counter_account) = input.counter_account {
            active.counter_account_id = Set(counter_account.map(AccountId::into_inner));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(to_domain(updated))
    }

    /// Deactivates a journal; an inactive journal rejects new entries.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` when the code is unknown.
    pub async fn deactivate(&self, code: &str) -> Result<Journal, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: journals::ActiveModel = model.into();
        active.active = Set(false);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "journal deactivated");
        Ok(to_domain(updated))
    }

    /// Finds a journal by code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Journal>, LedgerError> {
        let model = journals::Entity::find()
            .filter(journals::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(to_domain))
    }

    /// Returns the journal or `JournalNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` when the code is unknown.
    pub async fn get_by_code(&self, code: &str) -> Result<Journal, LedgerError> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| LedgerError::JournalNotFound(code.to_string()))
    }

    /// Lists all journals ordered by code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list(&self) -> Result<Vec<Journal>, LedgerError> {
        let models = journals::Entity::find()
            .order_by_asc(journals::Column::Code)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn get_model(&self, code: &str) -> Result<journals::Model, LedgerError> {
        journals::Entity::find()
            .filter(journals::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LedgerError::JournalNotFound(code.to_string()))
    }
}

/// Converts a row into the domain type.
pub(crate) fn to_domain(model: journals::Model) -> Journal {
    Journal {
        id: JournalId::from_uuid(model.id),
        code: model.code,
        label: model.label,
        kind: model.kind.into(),
        counter_account: model.counter_account_id.map(AccountId::from_uuid),
        active: model.active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums as enums;

    #[test]
    fn test_to_domain() {
        let now = Utc::now().into();
        let counter = Uuid::now_v7();
        let journal = to_domain(journals::Model {
            id: Uuid::now_v7(),
            code: "AC".to_string(),
            label: "Achats".to_string(),
            kind: enums::JournalKind::Purchases,
            counter_account_id: Some(counter),
            active: true,
            created_at: now,
            updated_at: now,
        });

        assert_eq!(journal.code, "AC");
        assert_eq!(journal.kind, JournalKind::Purchases);
        assert_eq!(journal.counter_account, Some(AccountId::from_uuid(counter)));
    }
}
