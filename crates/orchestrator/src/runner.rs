//! Batch driver: select packages, install their dependencies, validate them,
//! and report.

use std::sync::Arc;

use regex::Regex;
use tester_core::{Package, TesterOptions};
use tracing::info;

use crate::catalog::PackageCatalog;
use crate::changes::GitChangeDetector;
use crate::compiler::CompilerLocator;
use crate::config::TesterConfig;
use crate::error::{OrchestratorError, Result};
use crate::executor::BoundedExecutor;
use crate::install::DependencyInstaller;
use crate::json::JsonReader;
use crate::pipeline::ValidationPipeline;
use crate::process::CommandRunner;
use crate::report::{BatchReport, FailureCollector};
use crate::task_log::TaskLog;

/// Which packages a run tests.
#[derive(Debug, Clone)]
pub enum Selection {
    All,
    Pattern(Regex),
    /// Packages changed relative to the configured base ref, plus their dependents.
    Affected,
}

impl Selection {
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }
}

pub struct TestRunner {
    options: TesterOptions,
    config: TesterConfig,
    executor: BoundedExecutor,
    runner: Arc<dyn CommandRunner>,
    reader: Arc<dyn JsonReader>,
    locator: Arc<dyn CompilerLocator>,
}

impl TestRunner {
    pub fn new(
        options: TesterOptions,
        config: TesterConfig,
        executor: BoundedExecutor,
        runner: Arc<dyn CommandRunner>,
        reader: Arc<dyn JsonReader>,
        locator: Arc<dyn CompilerLocator>,
    ) -> Self {
        Self {
            options,
            config,
            executor,
            runner,
            reader,
            locator,
        }
    }

    pub async fn select(&self, catalog: &PackageCatalog, selection: &Selection) -> Result<Vec<Package>> {
        match selection {
            Selection::All => Ok(catalog.all().to_vec()),
            Selection::Pattern(pattern) => Ok(catalog.matching(pattern)),
            Selection::Affected => {
                let detector = GitChangeDetector::new(Arc::clone(&self.runner), &self.config.base_ref);
                let files = detector.changed_files(self.options.root()).await?;
                let changed = catalog.changed_packages(&files);
                info!(changed = ?changed, "Changed packages");
                Ok(catalog.affected(&changed))
            }
        }
    }

    /// Installs dependencies for the closure of `targets`, then validates each
    /// target. Install failures abort the batch; validation failures are
    /// collected into the returned report.
    pub async fn run(&self, catalog: &PackageCatalog, targets: &[Package]) -> Result<BatchReport> {
        let descs: Vec<String> = targets.iter().map(Package::desc).collect();
        println!("Testing {} packages: {}", targets.len(), descs.join(","));
        println!("Running with {} processes.", self.executor.concurrency());

        println!("Installing dependencies...");
        self.install_dependencies(catalog, targets).await?;

        println!("Testing...");
        let collector = FailureCollector::new();
        let pipeline = ValidationPipeline::new(
            self.options.clone(),
            self.config.pipeline_config(),
            Arc::clone(&self.runner),
            Arc::clone(&self.reader),
            Arc::clone(&self.locator),
        );
        let (pipeline, collector_ref) = (&pipeline, &collector);

        self.executor
            .run(targets, move |pkg| async move {
                let mut log = TaskLog::new();
                let outcome = pipeline.validate(pkg, &mut log).await;
                log.flush(&format!("Testing {}", pkg.desc()))?;
                collector_ref.record(pkg, outcome);
                Ok::<(), OrchestratorError>(())
            })
            .await?;

        info!(
            packages = targets.len(),
            failures = collector.len(),
            "Test phase finished"
        );
        Ok(collector.into_report())
    }

    async fn install_dependencies(&self, catalog: &PackageCatalog, targets: &[Package]) -> Result<()> {
        let installer = DependencyInstaller::new(self.options.clone(), Arc::clone(&self.runner))
            .with_npm(self.config.npm.clone());
        let installer = &installer;

        self.executor
            .run(catalog.dependency_closure(targets), move |pkg| async move {
                if let Some(output) = installer.install(&pkg).await? {
                    println!("{}", output);
                }
                Ok::<(), OrchestratorError>(())
            })
            .await?;
        Ok(())
    }

    /// Prints the report and turns any failure into the batch-level error.
    pub fn finish(report: BatchReport) -> Result<()> {
        if report.is_success() {
            println!("All packages passed.");
        } else {
            eprint!("{}", report.render());
        }
        report.into_result()
    }

    pub async fn run_selection(&self, catalog: &PackageCatalog, selection: &Selection) -> Result<()> {
        let targets = self.select(catalog, selection).await?;
        let report = self.run(catalog, &targets).await?;
        Self::finish(report)
    }
}
