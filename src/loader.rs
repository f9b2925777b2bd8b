//! Bulk import from a comma-delimited record source.
//!
//! Each line holds exactly five fields:
//!
//! ```text
//! name,tag,nitro,badge,status
//! ```
//!
//! `tag` is the numeric disambiguator, `nitro` an integer flag (non-zero is
//! set). The whole source is parsed before the index is touched, so a bad line
//! anywhere aborts the load with no records applied.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LoadError;
use crate::name_tree::NameTree;
use crate::record::Record;

pub const FIELD_COUNT: usize = 5;
const DELIMITER: char = ',';

/// Whether a load keeps what the index already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Append,
    /// Clear the index first. The clear only happens once the source has
    /// parsed cleanly.
    Replace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub inserted: usize,
    /// Rows whose `name#tag` was already live and were skipped.
    pub duplicates: usize,
}

/// Parses one line; `line` is 1-based and only used for error reporting.
pub fn parse_line(text: &str, line: usize) -> Result<Record, LoadError> {
    let text = text.strip_suffix('\r').unwrap_or(text);
    let fields: Vec<&str> = text.split(DELIMITER).map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(LoadError::Malformed {
            line,
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let tag = fields[1]
        .parse()
        .map_err(|source| LoadError::InvalidNumber {
            line,
            field: "tag",
            source,
        })?;
    let nitro: i64 = fields[2]
        .parse()
        .map_err(|source| LoadError::InvalidNumber {
            line,
            field: "nitro flag",
            source,
        })?;

    Ok(Record::new(fields[0], tag, nitro != 0, fields[3], fields[4]))
}

/// Parses every line of `reader`, stopping at the first bad one.
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<Record>, LoadError> {
    let mut records = Vec::new();
    for (idx, text) in reader.lines().enumerate() {
        records.push(parse_line(&text?, idx + 1)?);
    }
    Ok(records)
}

impl NameTree {
    /// Loads records from `reader` into the index.
    pub fn load_from_reader<R: BufRead>(
        &mut self,
        reader: R,
        mode: LoadMode,
    ) -> Result<LoadSummary, LoadError> {
        let records = parse_records(reader)?;
        if mode == LoadMode::Replace {
            self.clear();
        }

        let mut summary = LoadSummary::default();
        for record in records {
            let (name, tag) = (record.name().to_owned(), record.tag());
            if self.insert(record) {
                summary.inserted += 1;
            } else {
                tracing::warn!(%name, tag, "skipping duplicate record");
                summary.duplicates += 1;
            }
        }

        tracing::info!(
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            ?mode,
            "records loaded"
        );
        Ok(summary)
    }

    /// Loads records from the file at `path` into the index.
    pub fn load_from_path(
        &mut self,
        path: impl AsRef<Path>,
        mode: LoadMode,
    ) -> Result<LoadSummary, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_reader(BufReader::new(file), mode)
    }
}
