use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// How the next page is addressed.
///
/// Which one is usable depends on the query: ownership listings only take
/// an offset, transaction listings accept either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStrategy {
    /// `next = offset + page_len`
    Offset,
    /// `next = last_record.version + 1`
    AfterVersion,
}

impl fmt::Display for CursorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset => write!(f, "offset"),
            Self::AfterVersion => write!(f, "after_version"),
        }
    }
}

/// Position of the next page request. Owned by one fetch-all run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCursor {
    Offset(u64),
    /// `None` = from the beginning.
    AfterVersion(Option<u64>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Version cursor needs a version on the last record of the page.
    MissingVersion { record_id: String },
    /// Next version would not move past the current one.
    Stalled { current: u64, next: u64 },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVersion { record_id } => {
                write!(f, "record '{record_id}' has no version to advance the cursor")
            }
            Self::Stalled { current, next } => {
                write!(f, "pagination stuck: start={next} does not advance past {current}")
            }
        }
    }
}

impl std::error::Error for CursorError {}

impl FetchCursor {
    pub fn start(strategy: CursorStrategy) -> Self {
        match strategy {
            CursorStrategy::Offset => Self::Offset(0),
            CursorStrategy::AfterVersion => Self::AfterVersion(None),
        }
    }

    pub fn strategy(&self) -> CursorStrategy {
        match self {
            Self::Offset(_) => CursorStrategy::Offset,
            Self::AfterVersion(_) => CursorStrategy::AfterVersion,
        }
    }

    /// Value sent as the upstream `start` / `offset` parameter.
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::Offset(n) => Some(*n),
            Self::AfterVersion(v) => *v,
        }
    }

    /// Cursor for the page after `page`.
    pub fn advance<R: Record>(&self, page: &[R]) -> Result<Self, CursorError> {
        match *self {
            Self::Offset(n) => Ok(Self::Offset(n + page.len() as u64)),
            Self::AfterVersion(current) => {
                let Some(last) = page.last() else {
                    return Ok(*self);
                };
                let version = last.version().ok_or_else(|| CursorError::MissingVersion {
                    record_id: last.id().to_string(),
                })?;
                let next = version
                    .checked_add(1)
                    .ok_or(CursorError::Stalled { current: version, next: version })?;
                if let Some(current) = current {
                    if next <= current {
                        return Err(CursorError::Stalled { current, next });
                    }
                }
                Ok(Self::AfterVersion(Some(next)))
            }
        }
    }
}

impl fmt::Display for FetchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset(n) => write!(f, "offset {n}"),
            Self::AfterVersion(None) => write!(f, "beginning"),
            Self::AfterVersion(Some(v)) => write!(f, "version {v}"),
        }
    }
}
