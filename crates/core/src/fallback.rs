//! Ordered alternative strategies for resolving one value.
//!
//! Each strategy is a named, lazily-started future. They are tried strictly
//! in order and the first success wins; nothing after it is started.

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture};
use tracing::{debug, warn};

type Strategy<'a, T, E> = Box<dyn FnOnce() -> LocalBoxFuture<'a, Result<T, E>> + 'a>;

pub struct FallbackChain<'a, T, E> {
    strategies: Vec<(String, Strategy<'a, T, E>)>,
}

/// Every strategy failed. Attempts are listed in the order they ran.
#[derive(Debug)]
pub struct FallbackError<E> {
    pub attempts: Vec<(String, E)>,
}

impl<E: fmt::Display> fmt::Display for FallbackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "no strategies to try");
        }
        write!(f, "all {} strategies failed", self.attempts.len())?;
        for (name, err) in &self.attempts {
            write!(f, "; {name}: {err}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FallbackError<E> {}

impl<E> FallbackError<E> {
    /// Error from the last strategy tried.
    pub fn last(&self) -> Option<&E> {
        self.attempts.last().map(|(_, e)| e)
    }
}

impl<T, E> Default for FallbackChain<'_, T, E> {
    fn default() -> Self {
        Self { strategies: Vec::new() }
    }
}

impl<'a, T: 'a, E: fmt::Display + 'a> FallbackChain<'a, T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy; it is only started if every earlier one fails.
    pub fn then<F, Fut>(mut self, name: impl Into<String>, strategy: F) -> Self
    where
        F: FnOnce() -> Fut + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
    {
        self.strategies.push((name.into(), Box::new(move || strategy().boxed_local())));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order. Returns the winning strategy's name and value.
    pub async fn run(self) -> Result<(String, T), FallbackError<E>> {
        let mut attempts = Vec::new();
        for (name, strategy) in self.strategies {
            debug!(strategy = %name, "trying");
            match strategy().await {
                Ok(value) => return Ok((name, value)),
                Err(e) => {
                    warn!(strategy = %name, error = %e, "strategy failed");
                    attempts.push((name, e));
                }
            }
        }
        Err(FallbackError { attempts })
    }
}
