//! Double-entry bookkeeping engine.
//!
//! This module implements the ledger core:
//! - Entry and line domain types
//! - Entry numbering (`<Journal><YY><seq4>`)
//! - Equilibrium computation (debits == credits)
//! - Business rule validation for posting and lifecycle transitions
//! - Reconciliation (lettrage) of same-account line sets
//! - Input types for entry creation

pub mod entry;
pub mod equilibrium;
pub mod lettrage;
pub mod numbering;
pub mod types;
pub mod validation;

#[cfg(test)]
mod numbering_props;
#[cfg(test)]
mod validation_props;

pub use entry::{Entry, Line};
pub use equilibrium::{compute_totals, EntryTotals};
pub use lettrage::{generate_lettrage_code, validate_reconciliation_set, ReconcilableLine};
pub use numbering::{entry_number_prefix, format_entry_number, next_sequence, sequence_in};
pub use types::{CreateEntryInput, EntryStatus, LineInput, MetadataPatch, Side};
