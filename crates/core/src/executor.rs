//! Bounded-concurrency enrichment over a batch of records.
//!
//! Items start in submission order and at most `limit` are awaited at once.
//! Everything runs inside the calling task: no spawning, no threads, so the
//! enrichment closure may capture `Rc`/`Cell` state freely.

use std::fmt;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::debug;

/// Outcome of enriching one record. A failure is data, not an abort.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentResult<T> {
    Enriched(T),
    Failed { error: String },
}

/// An input record paired with its enrichment outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched<R, T> {
    pub record: R,
    pub outcome: EnrichmentResult<T>,
}

impl<R, T> Enriched<R, T> {
    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            EnrichmentResult::Enriched(v) => Some(v),
            EnrichmentResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            EnrichmentResult::Enriched(_) => None,
            EnrichmentResult::Failed { error } => Some(error),
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self.outcome, EnrichmentResult::Enriched(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    ZeroLimit,
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLimit => write!(f, "concurrency limit must be at least 1"),
        }
    }
}

impl std::error::Error for ExecutorError {}

#[derive(Debug, Clone, Copy)]
pub struct Executor {
    limit: usize,
}

impl Executor {
    pub fn new(limit: usize) -> Result<Self, ExecutorError> {
        if limit == 0 {
            return Err(ExecutorError::ZeroLimit);
        }
        Ok(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Enrich every record, returning one entry per input in input order.
    ///
    /// `enrich` receives a borrow of the record but its future must not hold
    /// it; clone whatever the request needs.
    pub async fn run<R, T, E, F, Fut>(&self, records: Vec<R>, enrich: F) -> Vec<Enriched<R, T>>
    where
        F: Fn(&R) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let total = records.len();
        debug!(total, limit = self.limit, "enrichment started");

        let mut indexed: Vec<(usize, Enriched<R, T>)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| {
                let pending = enrich(&record);
                async move {
                    let outcome = match pending.await {
                        Ok(value) => EnrichmentResult::Enriched(value),
                        Err(e) => {
                            debug!(index, error = %e, "enrichment failed");
                            EnrichmentResult::Failed { error: e.to_string() }
                        }
                    };
                    (index, Enriched { record, outcome })
                }
            })
            .buffer_unordered(self.limit)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        let results: Vec<_> = indexed.into_iter().map(|(_, e)| e).collect();

        let failed = results.iter().filter(|e| !e.is_enriched()).count();
        debug!(total, failed, "enrichment complete");
        results
    }
}
