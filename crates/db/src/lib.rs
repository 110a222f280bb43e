//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger store
//! - Repository abstractions for data access
//! - Database migrations
//!
//! All write paths run inside database transactions; numbering and
//! equilibrium writes use serializable isolation with a single bounded
//! retry on serialization conflicts.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, EntryRepository, FiscalRepository, JournalRepository, LettrageRepository,
    TiersRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
