//! Append-only CSV sink shared by the lookup workers.
//!
//! Every row is written through its own open/append/close cycle while a single
//! lock is held, so a row that was reported as written is already on disk and a
//! crash mid-run only loses rows that were still being searched for.

use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use csv::{Terminator, WriterBuilder};
use log::Level;
use thiserror::Error;

use crate::logger::{GlobalLog, LogSink};

pub type ResultRow = HashMap<String, String>;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("invalid field schema: {0}")]
    InvalidSchema(String),
    #[error("failed to initialize {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("row does not match schema (missing: {missing:?}, unexpected: {extra:?})")]
    Schema {
        missing: Vec<String>,
        extra: Vec<String>,
    },
    #[error("failed to append row to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct RealTimeCsvWriter {
    path: PathBuf,
    field_names: Vec<String>,
    lock: Mutex<()>,
    log: Arc<dyn LogSink>,
}

impl RealTimeCsvWriter {
    pub fn new<P, S>(path: P, field_names: &[S]) -> Result<Self, WriterError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        Self::with_log(path, field_names, Arc::new(GlobalLog))
    }

    pub fn with_log<P, S>(
        path: P,
        field_names: &[S],
        log: Arc<dyn LogSink>,
    ) -> Result<Self, WriterError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let path = path.as_ref().to_path_buf();
        let field_names: Vec<String> = field_names.iter().map(|f| f.as_ref().to_string()).collect();

        if field_names.is_empty() {
            return Err(WriterError::InvalidSchema("no field names given".to_string()));
        }
        let mut seen = HashSet::new();
        for name in &field_names {
            if !seen.insert(name.as_str()) {
                return Err(WriterError::InvalidSchema(format!("duplicate field name '{}'", name)));
            }
        }

        let file = File::create(&path).map_err(|source| WriterError::Io {
            path: path.clone(),
            source,
        })?;
        append_record(file, &field_names).map_err(|source| WriterError::Io {
            path: path.clone(),
            source,
        })?;

        log.log(Level::Info, &format!("Writing results to {}", path.display()));

        Ok(RealTimeCsvWriter {
            path,
            field_names,
            lock: Mutex::new(()),
            log,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    // Failures are logged before they are returned.
    pub fn write_row(&self, row: &ResultRow) -> Result<(), RowError> {
        let values = match self.ordered_values(row) {
            Ok(values) => values,
            Err(e) => {
                self.log.log(Level::Error, &format!("Rejected row for {}: {}", self.path.display(), e));
                return Err(e);
            }
        };

        // The mutex only serializes file access, so a panic in another writer
        // leaves nothing inconsistent behind.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let result = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .and_then(|file| append_record(file, &values));

        if let Err(source) = result {
            let err = RowError::Io {
                path: self.path.clone(),
                source,
            };
            self.log.log(Level::Error, &format!("Error writing row: {}", err));
            return Err(err);
        }
        Ok(())
    }

    fn ordered_values<'a>(&self, row: &'a ResultRow) -> Result<Vec<&'a str>, RowError> {
        let missing: Vec<String> = self
            .field_names
            .iter()
            .filter(|f| !row.contains_key(f.as_str()))
            .cloned()
            .collect();
        let mut extra: Vec<String> = row
            .keys()
            .filter(|k| !self.field_names.contains(k))
            .cloned()
            .collect();

        if !missing.is_empty() || !extra.is_empty() {
            extra.sort();
            return Err(RowError::Schema { missing, extra });
        }

        Ok(self.field_names.iter().map(|f| row[f.as_str()].as_str()).collect())
    }
}

fn line_terminator() -> Terminator {
    if cfg!(windows) {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    }
}

fn append_record<I, T>(file: File, record: I) -> io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(line_terminator())
        .from_writer(file);

    writer.write_record(record).map_err(io::Error::from)?;
    writer.flush()?;
    writer.get_ref().sync_data()
}
