use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::error::RenameError;
use super::importer::read_records;
use super::parser::{CANONICAL_DATE_FORMAT, FIELD_COUNT, parse_statement_date};

/// Renames each statement to `<earliest>_<latest>.csv` after the journeys it holds.
/// Returns how many files could not be renamed.
pub fn rename_files<P: AsRef<Path>>(paths: &[P]) -> usize {
    let mut failed = 0;
    for path in paths {
        let path = path.as_ref();
        match rename_statement(path) {
            Ok(new_path) => println!(
                "Renamed: {} -> {}",
                file_name(path),
                file_name(&new_path)
            ),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "error processing file");
                failed += 1;
            }
        }
    }
    failed
}

pub fn rename_statement(path: &Path) -> Result<PathBuf, RenameError> {
    let rows = read_records(path)?;
    let (earliest, latest) = date_range(&rows)?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let new_path = dir.join(available_name(dir, earliest, latest));
    fs_err::rename(path, &new_path).map_err(RenameError::Rename)?;
    Ok(new_path)
}

/// Earliest and latest journey dates in a statement, header row included in `rows`.
/// Incomplete rows and rows with unreadable dates are ignored.
pub fn date_range<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<(NaiveDate, NaiveDate), RenameError> {
    if rows.len() < 2 {
        return Err(RenameError::NotOyster("file has insufficient rows"));
    }
    if rows[0].len() < FIELD_COUNT {
        return Err(RenameError::NotOyster("invalid header format"));
    }

    let mut dates = rows[1..]
        .iter()
        .filter(|row| row.len() >= FIELD_COUNT)
        .filter_map(|row| parse_statement_date(row[0].as_ref()));

    let first = dates
        .next()
        .ok_or(RenameError::NotOyster("no valid journey dates found"))?;
    Ok(dates.fold((first, first), |(earliest, latest), date| {
        (earliest.min(date), latest.max(date))
    }))
}

/// `<earliest>_<latest>.csv`, or the first `<earliest>_<latest>_<n>.csv` not already taken.
pub fn available_name(dir: &Path, earliest: NaiveDate, latest: NaiveDate) -> String {
    let stem = format!(
        "{}_{}",
        earliest.format(CANONICAL_DATE_FORMAT),
        latest.format(CANONICAL_DATE_FORMAT)
    );
    let base = format!("{stem}.csv");
    if !dir.join(&base).exists() {
        return base;
    }
    (1..)
        .map(|i| format!("{stem}_{i}.csv"))
        .find(|name| !dir.join(name).exists())
        .unwrap_or(base)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
