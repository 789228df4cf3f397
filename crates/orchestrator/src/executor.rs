//! Bounded-concurrency execution of one async operation over many items.

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{OrchestratorError, Result};

/// Runs an operation over a set of items with at most `concurrency` in flight.
///
/// Operations are polled cooperatively on the calling task, so they only yield
/// at await points (subprocesses, file reads). Completion order is unspecified.
/// The first `Err` returned by an operation aborts the run: operations still in
/// flight are dropped and the error is returned.
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    concurrency: usize,
}

impl BoundedExecutor {
    pub fn new(concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self { concurrency })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<T, R, F, Fut>(&self, items: impl IntoIterator<Item = T>, op: F) -> Result<Vec<R>>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            items = items.len(),
            concurrency = self.concurrency,
            "Running bounded batch"
        );

        stream::iter(items)
            .map(op)
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await
    }
}
