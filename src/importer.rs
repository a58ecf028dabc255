use csv::{ByteRecord, ReaderBuilder};
use fs_err::File;
use indicatif::ProgressIterator;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::FileError;
use super::parser::parse_row;
use super::store::{Store, WriteOutcome};
use super::utils::progress_bar_for_count;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub files: Vec<(PathBuf, FileReport)>,
    pub failed_files: Vec<PathBuf>,
}

impl ImportSummary {
    pub fn total_inserted(&self) -> usize {
        self.files.iter().map(|(_, report)| report.inserted).sum()
    }
}

/// Reads every record of a CSV file, fields kept verbatim. Bytes that are not UTF-8
/// (e.g. a Latin-1 `£` in a note) are replaced rather than failing the file; a CSV
/// syntax error anywhere still fails the whole file.
pub fn read_records(path: &Path) -> Result<Vec<Vec<String>>, FileError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    reader
        .byte_records()
        .map(|record| record.map(|record| decode_fields(&record)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| FileError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn decode_fields(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Imports each file in turn. Unreadable files and bad rows are logged and skipped,
/// they never stop the rest of the batch.
pub fn import_files<P: AsRef<Path>>(store: &Store, paths: &[P]) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for path in paths {
        let path = path.as_ref();
        match import_file(store, path) {
            Ok(report) => {
                info!(
                    file = %path.display(),
                    inserted = report.inserted,
                    duplicates = report.duplicates,
                    rejected = report.rejected,
                    "file imported"
                );
                println!(
                    "File '{}' import complete. {} rows inserted.",
                    path.display(),
                    report.inserted
                );
                summary.files.push((path.to_path_buf(), report));
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not read file");
                summary.failed_files.push(path.to_path_buf());
            }
        }
    }

    println!(
        "All files processed. Total rows inserted: {}",
        summary.total_inserted()
    );
    summary
}

pub fn import_file(store: &Store, path: &Path) -> Result<FileReport, FileError> {
    let records = read_records(path)?;
    let mut report = FileReport::default();

    let progress = progress_bar_for_count(records.len().saturating_sub(1));
    // The first row is the statement header
    for (index, fields) in records.iter().enumerate().skip(1).progress_with(progress) {
        let journey = match parse_row(fields, index) {
            Ok(journey) => journey,
            Err(e) => {
                warn!(file = %path.display(), row = index, "{e}");
                report.rejected += 1;
                continue;
            }
        };

        match store.insert_journey(&journey) {
            Ok(WriteOutcome::Inserted) => report.inserted += 1,
            Ok(WriteOutcome::Duplicate) => {
                debug!(
                    file = %path.display(),
                    row = index,
                    date = %journey.date,
                    start_time = %journey.start_time,
                    "duplicate journey skipped"
                );
                report.duplicates += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), row = index, error = %e, "error inserting row");
                report.rejected += 1;
            }
        }
    }

    Ok(report)
}
