//! Collection and rendering of per-package failures.

use std::sync::{Mutex, PoisonError};

use tester_core::Package;

use crate::error::{OrchestratorError, Result};
use crate::pipeline::ValidationOutcome;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub package: Package,
    pub stage: Stage,
    pub message: String,
}

/// Append-only failure list shared by concurrently finishing packages.
#[derive(Debug, Default)]
pub struct FailureCollector {
    failures: Mutex<Vec<BatchFailure>>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `outcome` if it is a failure. Returns whether anything was recorded.
    pub fn record(&self, package: &Package, outcome: ValidationOutcome) -> bool {
        match outcome {
            ValidationOutcome::Success => false,
            ValidationOutcome::Failure { stage, message } => {
                self.failures
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(BatchFailure {
                        package: package.clone(),
                        stage,
                        message,
                    });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_report(self) -> BatchReport {
        let mut failures = self
            .failures
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        failures.sort_by(|a, b| Package::compare(&a.package, &b.package));
        BatchReport { failures }
    }
}

/// Failures of one batch in package order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn failures(&self) -> &[BatchFailure] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn render(&self) -> String {
        if self.failures.is_empty() {
            return String::new();
        }
        let mut out = String::from("\n\n=== ERRORS ===\n");
        for failure in &self.failures {
            out.push_str(&format!(
                "\n\nError in {}\n{}\n",
                failure.package.desc(),
                failure.message
            ));
        }
        out
    }

    /// Converts a non-empty report into the batch-level failure.
    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(OrchestratorError::BatchFailed {
                failures: self.failures.len(),
            })
        }
    }
}
