// Report outputs: <stem>-<timestamp>.json / .csv

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::IoError;

/// Writes every report of one run into one directory, stamped with the
/// same run timestamp (epoch milliseconds).
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    timestamp: i64,
}

impl ReportWriter {
    /// Stamp with the current time and create `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        Self::with_timestamp(dir, chrono::Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(dir: impl Into<PathBuf>, timestamp: i64) -> Result<Self, IoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| IoError::write(&dir, e))?;
        Ok(Self { dir, timestamp })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn path_for(&self, stem: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{stem}-{}.{ext}", self.timestamp))
    }

    /// Pretty-printed JSON.
    pub fn write_json<T: Serialize + ?Sized>(&self, stem: &str, value: &T) -> Result<PathBuf, IoError> {
        let path = self.path_for(stem, "json");
        let mut json = serde_json::to_string_pretty(value).map_err(|e| IoError::write(&path, e))?;
        json.push('\n');
        fs::write(&path, json).map_err(|e| IoError::write(&path, e))?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// CSV with `header`, always written even when `rows` is empty.
    pub fn write_csv<I, R, S>(&self, stem: &str, header: &[&str], rows: I) -> Result<PathBuf, IoError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let path = self.path_for(stem, "csv");
        let file = File::create(&path).map_err(|e| IoError::write(&path, e))?;
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));

        wtr.write_record(header).map_err(|e| IoError::write(&path, e))?;
        for row in rows {
            wtr.write_record(row).map_err(|e| IoError::write(&path, e))?;
        }
        wtr.flush().map_err(|e| IoError::write(&path, e))?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }
}
