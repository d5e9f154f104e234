// Accession numbers: `{year}.{sequence}`, sequence zero-padded to three digits
use chrono::{Datelike, Local};
use rusqlite::params;

use super::db::{DbConnection, DbResult};

/// Current calendar year in local time
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Next number in `year`'s sequence given the numbers already in use.
///
/// Only numbers starting with `{year}.` count. The part after the last `.`
/// must parse as an integer; anything else is skipped, as is a suffix with
/// no representable successor. Gaps are not filled.
pub fn next_in_sequence<'a, I>(year: i32, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = format!("{}.", year);
    let next = existing
        .into_iter()
        .filter(|number| number.starts_with(&prefix))
        .filter_map(|number| number.rsplit('.').next())
        .filter_map(|suffix| suffix.trim().parse::<u64>().ok())
        .filter_map(|sequence| sequence.checked_add(1))
        .max()
        .unwrap_or(1);

    format!("{}.{:03}", year, next)
}

/// Generate the next free accession number for `year` from the catalogue
pub fn next_accession_number(db: &DbConnection, year: i32) -> DbResult<String> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT accession_number FROM artifacts WHERE substr(accession_number, 1, length(?1)) = ?1",
    )?;

    let numbers = stmt
        .query_map(params![format!("{}.", year)], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(next_in_sequence(year, numbers.iter().map(String::as_str)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::db::open_in_memory;
    use crate::state::models::ArtifactDraft;
    use crate::state::queries::add_artifact;

    #[test]
    fn test_first_number_of_year() {
        assert_eq!(next_in_sequence(2026, std::iter::empty::<&str>()), "2026.001");
    }

    #[test]
    fn test_max_plus_one_ignoring_gaps() {
        assert_eq!(next_in_sequence(2026, ["2026.001", "2026.003"]), "2026.004");
    }

    #[test]
    fn test_other_years_and_malformed_suffixes_ignored() {
        let existing = ["2025.090", "2026.002", "2026.abc", "2026.", "20261.500", "X2026.400"];
        assert_eq!(next_in_sequence(2026, existing), "2026.003");
    }

    #[test]
    fn test_uses_suffix_after_last_dot() {
        assert_eq!(next_in_sequence(2026, ["2026.1.007"]), "2026.008");
    }

    #[test]
    fn test_sequence_past_three_digits() {
        assert_eq!(next_in_sequence(2026, ["2026.999"]), "2026.1000");
    }

    #[test]
    fn test_large_suffixes() {
        assert_eq!(next_in_sequence(2026, ["2026.4294967295"]), "2026.4294967296");
        assert_eq!(
            next_in_sequence(2026, ["2026.002", "2026.5000000000"]),
            "2026.5000000001"
        );
    }

    #[test]
    fn test_suffix_without_successor_skipped() {
        let existing = ["2026.18446744073709551615", "2026.99999999999999999999", "2026.004"];
        assert_eq!(next_in_sequence(2026, existing), "2026.005");
    }

    #[test]
    fn test_next_accession_number_from_catalogue() {
        let db = open_in_memory().unwrap();
        assert_eq!(next_accession_number(&db, 2026).unwrap(), "2026.001");

        for number in ["2026.001", "2026.003", "2025.010"] {
            let draft = ArtifactDraft {
                accession_number: number.to_string(),
                name: format!("Item {}", number),
                ..Default::default()
            };
            add_artifact(&db, &draft).unwrap();
        }

        assert_eq!(next_accession_number(&db, 2026).unwrap(), "2026.004");
        assert_eq!(next_accession_number(&db, 2025).unwrap(), "2025.011");
        assert_eq!(next_accession_number(&db, 2024).unwrap(), "2024.001");
    }
}
