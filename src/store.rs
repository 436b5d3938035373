// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Persistence of ledger records as CSV rows.
//!
//! # CSV Format
//!
//! Columns: `date, type, amount, category, description, currency`
//! - `date`: ISO-8601 calendar date (`2025-01-31`)
//! - `type`: `Income` or `Expense` (case-insensitive on read)
//! - `amount`: positive decimal, `.` as separator
//! - `category`: free text, blank reads as `Uncategorized`
//! - `description`: optional free text
//! - `currency`: optional code, blank reads as the base currency
//!
//! ```csv
//! date,type,amount,category,description,currency
//! 2025-01-01,Income,1000,Salary,January pay,MYR
//! 2025-01-02,Expense,250.00,Food,,
//! ```
//!
//! A save always rewrites the whole file. Rows that could not be read are
//! counted on load so the owner can back the file up before overwriting it.

use crate::base::{Category, Currency};
use crate::error::StoreError;
use crate::transaction::{TransactionKind, TransactionRecord};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Column names, in file order.
pub const COLUMNS: [&str; 6] = ["date", "type", "amount", "category", "description", "currency"];

/// Records read back from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loaded {
    /// Readable records, in stored order.
    pub records: Vec<TransactionRecord>,
    /// Stored rows that could not be turned into records.
    pub skipped: usize,
}

impl Loaded {
    /// True when every stored row made it into `records`.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

/// Durable mirror of the ledger's records.
pub trait Store {
    /// Returns every readable stored record in stored order, and how many
    /// stored rows were unreadable.
    ///
    /// A store with no data yet yields an empty result, not an error.
    fn load(&self) -> Result<Loaded, StoreError>;

    /// Replaces the stored records with `records`.
    fn save(&mut self, records: &[TransactionRecord]) -> Result<(), StoreError>;

    /// Copies the current stored data aside so that a following `save` can
    /// not lose rows that failed to load.
    ///
    /// Returns where the copy went, or `None` when there was nothing to copy.
    /// Stores whose `load` never skips anything can keep the default.
    fn back_up(&mut self) -> Result<Option<PathBuf>, StoreError> {
        Ok(None)
    }
}

/// One CSV row.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: String,
    amount: Decimal,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    currency: Option<Currency>,
}

impl CsvRow {
    fn from_record(record: &TransactionRecord) -> Self {
        Self {
            date: record.date(),
            kind: record.kind().to_string(),
            amount: record.amount(),
            category: record.category().clone(),
            description: record.description().map(str::to_string),
            currency: Some(record.currency().clone()),
        }
    }

    /// Converts the row into a record, or explains why it cannot.
    fn into_record(self, base_currency: &Currency) -> Result<TransactionRecord, String> {
        let kind: TransactionKind = self.kind.parse()?;

        TransactionRecord::new(
            self.date,
            kind,
            self.amount,
            self.category,
            self.description,
            self.currency.unwrap_or_else(|| base_currency.clone()),
        )
        .map_err(|err| err.to_string())
    }
}

/// Reads records from CSV.
///
/// Malformed rows and rows that fail record validation are skipped with a
/// warning and counted; the rest are returned in file order.
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
pub fn read_records<R: Read>(reader: R, base_currency: &Currency) -> Result<Loaded, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut loaded = Loaded::default();
    for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // Row 1 is the header.
        let line = index + 2;
        match result {
            Ok(row) => match row.into_record(base_currency) {
                Ok(record) => loaded.records.push(record),
                Err(reason) => {
                    tracing::warn!(line, %reason, "skipping invalid transaction row");
                    loaded.skipped += 1;
                }
            },
            Err(err) => {
                tracing::warn!(line, error = %err, "skipping malformed row");
                loaded.skipped += 1;
            }
        }
    }

    Ok(loaded)
}

/// Writes the header and one row per record.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_records<W: Write>(records: &[TransactionRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    // Written explicitly so an empty ledger still gets a header.
    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(CsvRow::from_record(record))?;
    }

    wtr.flush()?;
    Ok(())
}

/// File-backed store.
///
/// Saves go to a sibling temporary file that is then renamed over the target,
/// so readers see either the old or the new file. Concurrent writers from
/// other processes are not coordinated: the last save wins.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    base_currency: Currency,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>, base_currency: Currency) -> Self {
        Self {
            path: path.into(),
            base_currency,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the data file with `suffix` appended to its name.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// First of `<file>.bak`, `<file>.bak.1`, `<file>.bak.2`, ... not yet taken.
    fn backup_path(&self) -> PathBuf {
        let mut attempt = 0u32;
        loop {
            let candidate = match attempt {
                0 => self.sibling(".bak"),
                n => self.sibling(&format!(".bak.{n}")),
            };
            if !candidate.exists() {
                return candidate;
            }
            attempt += 1;
        }
    }
}

impl Store for CsvStore {
    fn load(&self) -> Result<Loaded, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no transaction file yet, starting empty");
                return Ok(Loaded::default());
            }
            Err(err) => return Err(err.into()),
        };

        let loaded = read_records(BufReader::new(file), &self.base_currency)?;
        tracing::debug!(
            path = %self.path.display(),
            count = loaded.records.len(),
            skipped = loaded.skipped,
            "loaded transactions"
        );
        Ok(loaded)
    }

    fn back_up(&mut self) -> Result<Option<PathBuf>, StoreError> {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                tracing::info!(path = %self.path.display(), backup = %backup.display(), "backed up transaction file");
                Ok(Some(backup))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        let temp_path = self.temp_path();
        let file = File::create(&temp_path)?;
        if let Err(err) = write_records(records, BufWriter::new(file)) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "saved transactions");
        Ok(())
    }
}

/// In-memory store for sessions that should not touch the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<TransactionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Loaded, StoreError> {
        Ok(Loaded {
            records: self.records.clone(),
            skipped: 0,
        })
    }

    fn save(&mut self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        self.records = records.to_vec();
        Ok(())
    }
}
