//! Entry number generation.
//!
//! Numbers follow the format `<JournalCode><2-digit-year><sequence>`, e.g.
//! `AC240001`. The sequence restarts at 1 for each journal and year, is
//! zero-padded to 4 digits, and grows wider past 9999. Numbers are never
//! reused, even after a draft entry is deleted.

use chrono::{Datelike, NaiveDate};

/// Width of the zero-padded sequence part.
pub const SEQUENCE_WIDTH: usize = 4;

/// Builds the number prefix for a journal and entry date, e.g. `AC24`.
#[must_use]
pub fn entry_number_prefix(journal_code: &str, date: NaiveDate) -> String {
    format!("{}{:02}", journal_code, date.year().rem_euclid(100))
}

/// Formats a full entry number from a prefix and sequence.
#[must_use]
pub fn format_entry_number(prefix: &str, sequence: u32) -> String {
    format!("{prefix}{sequence:0width$}", width = SEQUENCE_WIDTH)
}

/// Extracts the sequence from a number carrying the given prefix.
///
/// Returns `None` for numbers of another journal/year or with a
/// non-numeric tail.
#[must_use]
pub fn sequence_in(prefix: &str, number: &str) -> Option<u32> {
    let tail = number.strip_prefix(prefix)?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Computes the next sequence for a prefix from the existing numbers.
///
/// Takes max existing sequence + 1, or 1 when none exist. Malformed
/// numbers are skipped, matching how historical data is tolerated.
pub fn next_sequence<I, S>(prefix: &str, existing: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|n| sequence_in(prefix, n.as_ref()))
        .max()
        .unwrap_or(0)
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_prefix_uses_two_digit_year() {
        assert_eq!(entry_number_prefix("AC", ymd(2024, 3, 1)), "AC24");
        assert_eq!(entry_number_prefix("BQ", ymd(2009, 1, 1)), "BQ09");
        assert_eq!(entry_number_prefix("VT", ymd(2100, 1, 1)), "VT00");
    }

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(format_entry_number("AC24", 1), "AC240001");
        assert_eq!(format_entry_number("AC24", 9999), "AC249999");
        // Width grows naturally past 9999
        assert_eq!(format_entry_number("AC24", 10000), "AC2410000");
    }

    #[test]
    fn test_sequence_roundtrip() {
        assert_eq!(sequence_in("AC24", "AC240001"), Some(1));
        assert_eq!(sequence_in("AC24", "AC249999"), Some(9999));
        assert_eq!(sequence_in("AC24", "AC2410000"), Some(10000));
        assert_eq!(sequence_in("AC24", "VT240001"), None);
        assert_eq!(sequence_in("AC24", "AC24"), None);
        assert_eq!(sequence_in("AC24", "AC24X001"), None);
    }

    #[test]
    fn test_first_number_is_one() {
        assert_eq!(next_sequence("AC24", Vec::<String>::new()), 1);
        assert_eq!(
            format_entry_number("AC24", next_sequence("AC24", Vec::<String>::new())),
            "AC240001"
        );
    }

    #[test]
    fn test_next_sequence_increments_max() {
        let existing = ["AC240001", "AC240003", "AC240002", "VT240009"];
        assert_eq!(next_sequence("AC24", existing), 4);
        assert_eq!(next_sequence("VT24", existing), 10);
        assert_eq!(next_sequence("BQ24", existing), 1);
    }

    #[test]
    fn test_deleted_numbers_are_not_reused() {
        // AC240002 was deleted while draft: max scan still yields 4
        let existing = ["AC240001", "AC240003"];
        assert_eq!(
            format_entry_number("AC24", next_sequence("AC24", existing)),
            "AC240004"
        );
    }
}
