//! Account registry repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use grandlivre_core::account::{
    validate_nature, Account, AccountClass, AccountNature, NormalBalance,
};
use grandlivre_core::LedgerError;
use grandlivre_shared::types::pagination::{PageRequest, PageResponse};
use grandlivre_shared::types::AccountId;

use crate::entities::{accounts, entry_lines};

use super::map_db_err;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// 8-digit OHADA code.
    pub code: String,
    /// Account label.
    pub label: String,
    /// Account nature; must be permitted for the code's class.
    pub nature: AccountNature,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Short OHADA sheet reference.
    pub reference: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
}

/// Mutable account fields. The code, class, and nature are immutable.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New label.
    pub label: Option<String>,
    /// New normal balance side.
    pub normal_balance: Option<NormalBalance>,
    /// New sheet reference.
    pub reference: Option<String>,
    /// New note.
    pub note: Option<String>,
}

/// Account registry repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account after validating code, class, and nature.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountCode`, `NatureNotAllowed`, or
    /// `DuplicateCode`.
    pub async fn create(&self, input: CreateAccountInput) -> Result<Account, LedgerError> {
        let class = validate_nature(&input.code, input.nature)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateCode(input.code));
        }

        let now = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(input.code),
            class: Set(i16::from(class.digit())),
            nature: Set(input.nature.into()),
            normal_balance: Set(input.normal_balance.into()),
            label: Set(input.label),
            reference: Set(input.reference),
            note: Set(input.note),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %inserted.code, "account created");
        to_domain(inserted)
    }

    /// Updates the mutable fields of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when the code is unknown.
    pub async fn update(
        &self,
        code: &str,
        input: UpdateAccountInput,
    ) -> Result<Account, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: accounts::ActiveModel = model.into();
        if let Some(label) = input.label {
            active.label = Set(label);
        }
        if let Some(balance) = input.normal_balance {
            active.normal_balance = Set(balance.into());
        }
        if let Some(reference) = input.reference {
            active.reference = Set(Some(reference));
        }
        if let Some(note) = input.note {
            active.note = Set(Some(note));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        to_domain(updated)
    }

    /// Deactivates an account. Accounts are never hard-deleted: once a
    /// line references a code, deactivation is the only retirement.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when the code is unknown.
    pub async fn deactivate(&self, code: &str) -> Result<Account, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: accounts::ActiveModel = model.into();
        active.active = Set(false);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "account deactivated");
        to_domain(updated)
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        model.map(to_domain).transpose()
    }

    /// Returns the account or `AccountNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when the code is unknown.
    pub async fn get_by_code(&self, code: &str) -> Result<Account, LedgerError> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    /// Returns true if any line references the account.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn is_referenced(&self, account_id: AccountId) -> Result<bool, LedgerError> {
        let count = entry_lines::Entity::find()
            .filter(entry_lines::Column::AccountId.eq(account_id.into_inner()))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }

    /// Lists accounts ordered by code, optionally restricted to a class.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list(
        &self,
        class: Option<AccountClass>,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, LedgerError> {
        let mut query = accounts::Entity::find();
        if let Some(class) = class {
            query = query.filter(accounts::Column::Class.eq(i16::from(class.digit())));
        }

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;

        let models = query
            .order_by_asc(accounts::Column::Code)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let data = models
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn get_model(&self, code: &str) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }
}

/// Converts a row into the domain type.
pub(crate) fn to_domain(model: accounts::Model) -> Result<Account, LedgerError> {
    let class =
        AccountClass::new(u8::try_from(model.class).unwrap_or(0)).map_err(|_| {
            LedgerError::Database(format!(
                "account {} carries invalid class {}",
                model.code, model.class
            ))
        })?;
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        class,
        nature: model.nature.into(),
        normal_balance: model.normal_balance.into(),
        label: model.label,
        reference: model.reference,
        note: model.note,
        active: model.active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums as enums;

    fn model(code: &str, class: i16) -> accounts::Model {
        let now = Utc::now().into();
        accounts::Model {
            id: Uuid::now_v7(),
            code: code.to_string(),
            class,
            nature: enums::AccountNature::Expense,
            normal_balance: enums::NormalBalance::Debit,
            label: "Achats de marchandises".to_string(),
            reference: Some("CA".to_string()),
            note: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_to_domain() {
        let account = to_domain(model("60110000", 6)).unwrap();
        assert_eq!(account.code, "60110000");
        assert_eq!(account.class.digit(), 6);
        assert_eq!(account.nature, AccountNature::Expense);
        assert!(account.active);
    }

    #[test]
    fn test_to_domain_rejects_corrupt_class() {
        assert!(matches!(
            to_domain(model("60110000", 0)),
            Err(LedgerError::Database(_))
        ));
        assert!(matches!(
            to_domain(model("60110000", -3)),
            Err(LedgerError::Database(_))
        ));
    }
}
