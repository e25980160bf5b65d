//! Read-only access to the national population register extract used to confirm documents that
//! cannot certify themselves.

mod parser;
mod sample;

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::domain::{LegalStatus, Nationality};

/// One row of the verification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub nationality: Nationality,
    pub full_name: String,
    pub legal_status: LegalStatus,
}

/// Failure to read the verification source. Never an indication that a document is invalid.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("failed to read verification table: {0}")]
    Io(#[from] std::io::Error),
    #[error("verification table is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("verification source unavailable: {0}")]
    Unavailable(String),
}

/// Answer to a single lookup. An empty table is reported as such rather than as a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(VerificationRecord),
    NotFound,
    EmptyTable,
}

impl Lookup {
    pub fn record(self) -> Option<VerificationRecord> {
        match self {
            Lookup::Found(record) => Some(record),
            Lookup::NotFound | Lookup::EmptyTable => None,
        }
    }
}

/// Exact-match lookups against the verification table.
///
/// Each call reads the backing store at most once.
pub trait VerificationSource: Send + Sync {
    fn find_by_id_number(&self, id_number: &str) -> Result<Lookup, VerificationError>;

    fn find_by_passport(
        &self,
        passport_number: &str,
        nationality: Nationality,
    ) -> Result<Lookup, VerificationError>;
}

/// In-memory verification table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationTable {
    records: Vec<VerificationRecord>,
}

impl VerificationTable {
    pub fn new(records: Vec<VerificationRecord>) -> Self {
        Self { records }
    }

    /// Demonstration extract covering citizens, neighbouring nationals and asylum seekers.
    pub fn sample() -> Self {
        Self::new(sample::records())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, VerificationError> {
        Ok(Self::new(parser::parse_records(reader)?))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VerificationError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), VerificationError> {
        parser::write_records(writer, &self.records)?;
        Ok(())
    }

    pub fn records(&self) -> &[VerificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn search<F>(&self, matches: F) -> Lookup
    where
        F: Fn(&VerificationRecord) -> bool,
    {
        if self.records.is_empty() {
            return Lookup::EmptyTable;
        }
        match self.records.iter().find(|record| matches(record)) {
            Some(record) => Lookup::Found(record.clone()),
            None => Lookup::NotFound,
        }
    }

    fn id_match(&self, id_number: &str) -> Lookup {
        self.search(|record| record.id_number.as_deref() == Some(id_number))
    }

    fn passport_match(&self, passport_number: &str, nationality: Nationality) -> Lookup {
        self.search(|record| {
            record.passport_number.as_deref() == Some(passport_number)
                && record.nationality == nationality
        })
    }
}

impl VerificationSource for VerificationTable {
    fn find_by_id_number(&self, id_number: &str) -> Result<Lookup, VerificationError> {
        Ok(self.id_match(id_number))
    }

    fn find_by_passport(
        &self,
        passport_number: &str,
        nationality: Nationality,
    ) -> Result<Lookup, VerificationError> {
        Ok(self.passport_match(passport_number, nationality))
    }
}

/// Verification table backed by a CSV export that its owner may replace at any time.
///
/// The file is re-read on every lookup so refreshed extracts are picked up without a restart.
#[derive(Debug, Clone)]
pub struct CsvVerificationSource {
    path: PathBuf,
}

impl CsvVerificationSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the sample extract to `path` when no file exists yet.
    pub fn seed_if_missing(&self) -> Result<bool, VerificationError> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::File::create(&self.path)?;
        VerificationTable::sample().write_csv(file)?;
        Ok(true)
    }

    fn load(&self) -> Result<VerificationTable, VerificationError> {
        VerificationTable::from_path(&self.path)
    }
}

impl VerificationSource for CsvVerificationSource {
    fn find_by_id_number(&self, id_number: &str) -> Result<Lookup, VerificationError> {
        Ok(self.load()?.id_match(id_number))
    }

    fn find_by_passport(
        &self,
        passport_number: &str,
        nationality: Nationality,
    ) -> Result<Lookup, VerificationError> {
        Ok(self.load()?.passport_match(passport_number, nationality))
    }
}
