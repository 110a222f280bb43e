//! `SeaORM` entity definitions for the ledger store.

pub mod accounts;
pub mod entries;
pub mod entry_lines;
pub mod entry_sequences;
pub mod exercises;
pub mod journals;
pub mod periods;
pub mod sea_orm_active_enums;
pub mod tiers;
