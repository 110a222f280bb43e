//! Counterparty (tiers) registry repository.
//!
//! Code generation scans existing codes under serializable isolation so
//! two concurrent creations of the same kind never share a code; the
//! unique index is the backstop and triggers a single retry.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use grandlivre_core::tiers::{
    next_code, validate_profile, Counterparty, CounterpartyKind, CounterpartyProfile,
};
use grandlivre_core::LedgerError;
use grandlivre_shared::types::pagination::{PageRequest, PageResponse};
use grandlivre_shared::types::{AccountId, TiersId};

use crate::entities::{accounts, tiers};

use super::{is_conflict, map_db_err};

/// Input for creating a counterparty. The code and the collective
/// account are engine-assigned, never caller-supplied.
#[derive(Debug, Clone)]
pub struct CreateTiersInput {
    /// Counterparty kind.
    pub kind: CounterpartyKind,
    /// Per-kind fields; must match the kind.
    pub profile: CounterpartyProfile,
    /// Legal name.
    pub name: String,
    /// Commercial short name.
    pub short_name: Option<String>,
    /// Tax identification number.
    pub taxpayer_number: Option<String>,
}

/// Counterparty registry repository.
#[derive(Debug, Clone)]
pub struct TiersRepository {
    db: DatabaseConnection,
}

impl TiersRepository {
    /// Creates a new tiers repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a counterparty, assigning the next code for its kind and
    /// binding it to the kind's collective account.
    ///
    /// A missing collective account is a fatal configuration error
    /// (`MissingCollectiveAccount`): the chart of accounts was not
    /// seeded.
    ///
    /// # Errors
    ///
    /// Returns profile validation errors, `MissingCollectiveAccount`, or
    /// `SerializationConflict` after one retry.
    pub async fn create(&self, input: CreateTiersInput) -> Result<Counterparty, LedgerError> {
        validate_profile(input.kind, &input.profile)?;

        match self.try_create(&input).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(kind = %input.kind, "tiers code allocation conflict, retrying once");
                self.try_create(&input).await
            }
            other => other,
        }
    }

    async fn try_create(&self, input: &CreateTiersInput) -> Result<Counterparty, LedgerError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
            .map_err(map_db_err)?;

        let collective = find_collective_account(&txn, input.kind).await?;
        let code = allocate_code(&txn, input.kind).await?;

        let now = Utc::now().into();
        let model = tiers::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(code),
            kind: Set(input.kind.into()),
            collective_account_id: Set(collective),
            payment_delay_days: Set(input
                .profile
                .payment_delay_days()
                .map(i32::from)),
            credit_ceiling: Set(match &input.profile {
                CounterpartyProfile::Customer { credit_ceiling, .. } => *credit_ceiling,
                _ => None,
            }),
            matricule: Set(input.profile.matricule().map(str::to_string)),
            name: Set(input.name.clone()),
            short_name: Set(input.short_name.clone()),
            taxpayer_number: Set(input.taxpayer_number.clone()),
            active: Set(true),
            blocked: Set(false),
            blocked_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = match model.insert(&txn).await {
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

        txn.commit().await.map_err(map_db_err)?;
        tracing::info!(code = %inserted.code, "counterparty created");
        to_domain(inserted)
    }

    /// Blocks a counterparty with a reason; blocked counterparties
    /// reject new postings but are never deleted.
    ///
    /// # Errors
    ///
    /// Returns `TiersNotFound` when the code is unknown.
    pub async fn block(&self, code: &str, reason: &str) -> Result<Counterparty, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: tiers::ActiveModel = model.into();
        active.blocked = Set(true);
        active.blocked_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        tracing::info!(code = %updated.code, "counterparty blocked");
        to_domain(updated)
    }

    /// Unblocks a counterparty and clears the reason.
    ///
    /// # Errors
    ///
    /// Returns `TiersNotFound` when the code is unknown.
    pub async fn unblock(&self, code: &str) -> Result<Counterparty, LedgerError> {
        let model = self.get_model(code).await?;

        let mut active: tiers::ActiveModel = model.into();
        active.blocked = Set(false);
        active.blocked_reason = Set(None);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        to_domain(updated)
    }

    /// Finds a counterparty by code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Counterparty>, LedgerError> {
        let model = tiers::Entity::find()
            .filter(tiers::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        model.map(to_domain).transpose()
    }

    /// Returns the counterparty or `TiersNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `TiersNotFound` when the code is unknown.
    pub async fn get_by_code(&self, code: &str) -> Result<Counterparty, LedgerError> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| LedgerError::TiersNotFound(code.to_string()))
    }

    /// Lists counterparties ordered by code, optionally by kind.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list(
        &self,
        kind: Option<CounterpartyKind>,
        page: PageRequest,
    ) -> Result<PageResponse<Counterparty>, LedgerError> {
        let mut query = tiers::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(
                tiers::Column::Kind.eq(crate::entities::sea_orm_active_enums::TiersKind::from(kind)),
            );
        }

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;

        let models = query
            .order_by_asc(tiers::Column::Code)
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

    async fn get_model(&self, code: &str) -> Result<tiers::Model, LedgerError> {
        tiers::Entity::find()
            .filter(tiers::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| LedgerError::TiersNotFound(code.to_string()))
    }
}

/// Looks up the collective account for a kind inside the transaction.
async fn find_collective_account(
    txn: &DatabaseTransaction,
    kind: CounterpartyKind,
) -> Result<Uuid, LedgerError> {
    let code = kind.collective_account_code();
    let account = accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| LedgerError::MissingCollectiveAccount(code.to_string()))?;
    Ok(account.id)
}

/// Allocates the next code for a kind: max existing suffix + 1.
async fn allocate_code(
    txn: &DatabaseTransaction,
    kind: CounterpartyKind,
) -> Result<String, LedgerError> {
    let existing: Vec<String> = tiers::Entity::find()
        .select_only()
        .column(tiers::Column::Code)
        .filter(tiers::Column::Code.starts_with(kind.prefix()))
        .into_tuple()
        .all(txn)
        .await
        .map_err(map_db_err)?;

    Ok(next_code(kind, existing))
}

/// Rebuilds the tagged profile from the flattened columns.
fn profile_from_model(model: &tiers::Model) -> Result<CounterpartyProfile, LedgerError> {
    let kind: CounterpartyKind = model.kind.clone().into();
    let delay = |value: Option<i32>| {
        u16::try_from(value.unwrap_or(i32::from(
            grandlivre_core::tiers::DEFAULT_PAYMENT_DELAY_DAYS,
        )))
        .unwrap_or(grandlivre_core::tiers::DEFAULT_PAYMENT_DELAY_DAYS)
    };

    let profile = if kind.is_supplier() {
        CounterpartyProfile::Supplier {
            payment_delay_days: delay(model.payment_delay_days),
        }
    } else if kind.is_customer() {
        CounterpartyProfile::Customer {
            payment_delay_days: delay(model.payment_delay_days),
            credit_ceiling: model.credit_ceiling,
        }
    } else {
        let matricule = model.matricule.clone().ok_or_else(|| {
            LedgerError::Database(format!("employee {} has no matricule", model.code))
        })?;
        CounterpartyProfile::Employee { matricule }
    };
    Ok(profile)
}

/// Converts a row into the domain type.
pub(crate) fn to_domain(model: tiers::Model) -> Result<Counterparty, LedgerError> {
    let profile = profile_from_model(&model)?;
    Ok(Counterparty {
        id: TiersId::from_uuid(model.id),
        code: model.code,
        kind: model.kind.into(),
        collective_account: AccountId::from_uuid(model.collective_account_id),
        profile,
        name: model.name,
        short_name: model.short_name,
        taxpayer_number: model.taxpayer_number,
        active: model.active,
        blocked: model.blocked,
        blocked_reason: model.blocked_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums as enums;
    use rust_decimal_macros::dec;

    fn model(kind: enums::TiersKind, code: &str) -> tiers::Model {
        let now = Utc::now().into();
        tiers::Model {
            id: Uuid::now_v7(),
            code: code.to_string(),
            kind,
            collective_account_id: Uuid::now_v7(),
            payment_delay_days: Some(45),
            credit_ceiling: Some(dec!(2_000_000)),
            matricule: None,
            name: "SARL Exemple".to_string(),
            short_name: None,
            taxpayer_number: None,
            active: true,
            blocked: false,
            blocked_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_customer_profile_from_model() {
        let tiers = to_domain(model(enums::TiersKind::CustomerLocal, "CLOC00003")).unwrap();
        assert_eq!(tiers.kind, CounterpartyKind::CustomerLocal);
        assert_eq!(
            tiers.profile,
            CounterpartyProfile::Customer {
                payment_delay_days: 45,
                credit_ceiling: Some(dec!(2_000_000)),
            }
        );
    }

    #[test]
    fn test_supplier_profile_drops_ceiling() {
        let tiers = to_domain(model(enums::TiersKind::SupplierGroup, "FGRP00001")).unwrap();
        assert_eq!(
            tiers.profile,
            CounterpartyProfile::Supplier {
                payment_delay_days: 45,
            }
        );
    }

    #[test]
    fn test_employee_without_matricule_is_corrupt() {
        let row = model(enums::TiersKind::Employee, "EMPL00001");
        assert!(matches!(
            to_domain(row),
            Err(LedgerError::Database(_))
        ));
    }

    #[test]
    fn test_employee_profile_from_model() {
        let mut row = model(enums::TiersKind::Employee, "EMPL00001");
        row.matricule = Some("M-0042".to_string());
        let tiers = to_domain(row).unwrap();
        assert_eq!(
            tiers.profile,
            CounterpartyProfile::Employee {
                matricule: "M-0042".to_string(),
            }
        );
    }
}
