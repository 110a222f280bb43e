//! Repository abstractions for data access.
//!
//! Repositories translate between `SeaORM` models and the core domain
//! types, and enforce the core's rules at the persistence boundary.
//! Every multi-step mutation is transactional all-or-nothing.

pub mod account;
pub mod entry;
pub mod fiscal;
pub mod journal;
pub mod lettrage;
pub mod tiers;

pub use account::AccountRepository;
pub use entry::EntryRepository;
pub use fiscal::FiscalRepository;
pub use journal::JournalRepository;
pub use lettrage::LettrageRepository;
pub use tiers::TiersRepository;

use grandlivre_core::LedgerError;
use sea_orm::{DbErr, SqlErr};

/// Maps a database error onto the ledger taxonomy.
///
/// Serialization failures and unique-constraint races surface as
/// `SerializationConflict` so callers can retry; everything else is an
/// internal database error.
pub(crate) fn map_db_err(err: DbErr) -> LedgerError {
    if is_conflict(&err) {
        LedgerError::SerializationConflict
    } else {
        LedgerError::Database(err.to_string())
    }
}

/// Returns true for errors produced by concurrent writers: Postgres
/// serialization failures (SQLSTATE 40001) and unique violations on
/// generated identifiers.
pub(crate) fn is_conflict(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    let message = err.to_string();
    message.contains("could not serialize access") || message.contains("40001")
}
