use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// File or directory could not be read.
    Read { path: PathBuf, message: String },
    /// Report could not be written.
    Write { path: PathBuf, message: String },
    /// Content does not parse (bad CSV row, bad JSON).
    Parse { path: PathBuf, message: String },
    /// Content parses but lacks a required column / field.
    Schema { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn read(path: &Path, e: impl fmt::Display) -> Self {
        Self::Read { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn write(path: &Path, e: impl fmt::Display) -> Self {
        Self::Write { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn parse(path: &Path, e: impl fmt::Display) -> Self {
        Self::Parse { path: path.to_path_buf(), message: e.to_string() }
    }

    pub(crate) fn schema(path: &Path, message: impl Into<String>) -> Self {
        Self::Schema { path: path.to_path_buf(), message: message.into() }
    }

    /// True for problems with file contents, false for filesystem access.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Schema { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Parse { path, .. }
            | Self::Schema { path, .. } => path,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Write { path, message } => write!(f, "cannot write {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Schema { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}
