//! Per-package validation.
//!
//! Stages run in [`Stage::ORDER`]; the first one to fail decides the outcome
//! and the rest never run. Every stage error, including unreadable or
//! malformed files, is turned into a [`ValidationOutcome::Failure`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tester_core::{Package, TesterOptions};
use tracing::debug;

use crate::checks::{
    check_compiler_config, check_manifest, default_allowed_fields, PACKAGE_JSON_FILE, TSCONFIG_FILE,
};
use crate::compiler::{CompilerFallback, CompilerLocator};
use crate::json::JsonReader;
use crate::process::{run_logged, CommandRunner, CommandSpec};
use crate::stage::{Stage, StageError, StageResult};
use crate::task_log::TaskLog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Success,
    Failure { stage: Stage, message: String },
}

impl ValidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Interpreter used to run the compiler and linter scripts.
    pub node: String,
    pub lint_script: PathBuf,
    pub allowed_manifest_fields: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            node: "node".to_string(),
            lint_script: PathBuf::from("node_modules/tslint/lib/tslint-cli.js"),
            allowed_manifest_fields: default_allowed_fields(),
        }
    }
}

impl PipelineConfig {
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    pub fn with_lint_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.lint_script = path.into();
        self
    }

    pub fn with_allowed_manifest_fields(mut self, fields: Vec<String>) -> Self {
        self.allowed_manifest_fields = fields;
        self
    }
}

pub struct ValidationPipeline {
    options: TesterOptions,
    config: PipelineConfig,
    runner: Arc<dyn CommandRunner>,
    reader: Arc<dyn JsonReader>,
    compiler: CompilerFallback,
}

impl ValidationPipeline {
    pub fn new(
        options: TesterOptions,
        config: PipelineConfig,
        runner: Arc<dyn CommandRunner>,
        reader: Arc<dyn JsonReader>,
        locator: Arc<dyn CompilerLocator>,
    ) -> Self {
        let compiler = CompilerFallback::new(Arc::clone(&runner), locator, config.node.clone());
        Self {
            options,
            config,
            runner,
            reader,
            compiler,
        }
    }

    pub fn options(&self) -> &TesterOptions {
        &self.options
    }

    pub async fn validate(&self, pkg: &Package, log: &mut TaskLog) -> ValidationOutcome {
        let cwd = pkg.directory_path(&self.options);

        for stage in Stage::ORDER {
            if let Err(e) = self.run_stage(stage, pkg, &cwd, log).await {
                let message = e.to_string();
                // Command output is already in the log.
                if !matches!(e, StageError::CommandFailed(_)) {
                    log.error(message.as_str());
                }
                debug!(package = %pkg.name, stage = %stage, "Validation failed");
                return ValidationOutcome::Failure { stage, message };
            }
        }

        debug!(package = %pkg.name, "Validation passed");
        ValidationOutcome::Success
    }

    async fn run_stage(&self, stage: Stage, pkg: &Package, cwd: &Path, log: &mut TaskLog) -> StageResult {
        match stage {
            Stage::Config => self.check_config(cwd).await,
            Stage::Manifest => self.check_manifest(pkg).await,
            Stage::Compile => self.compiler.compile(pkg, cwd, log).await,
            Stage::Lint => self.lint(pkg, cwd, log).await,
        }
    }

    async fn check_config(&self, cwd: &Path) -> StageResult {
        let path = cwd.join(TSCONFIG_FILE);
        let tsconfig = self.reader.read_json(&path).await?;
        check_compiler_config(&tsconfig, &path)
    }

    async fn check_manifest(&self, pkg: &Package) -> StageResult {
        if !pkg.has_package_json {
            return Ok(());
        }
        let path = pkg.file_path(PACKAGE_JSON_FILE, &self.options);
        let manifest = self.reader.read_json(&path).await?;
        check_manifest(&manifest, &path, &self.config.allowed_manifest_fields)
    }

    async fn lint(&self, pkg: &Package, cwd: &Path, log: &mut TaskLog) -> StageResult {
        if !pkg.has_lint_config {
            return Ok(());
        }
        let command = CommandSpec::node_script(&self.config.node, &self.config.lint_script)
            .args(["--format", "stylish"])
            .args(pkg.files.iter().chain(&pkg.test_files).cloned());

        match run_logged(self.runner.as_ref(), &command, cwd, log).await {
            Some(error) => Err(StageError::CommandFailed(error)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeJsonReader, FakeLocator, FakeRunner};
    use serde_json::{json, Value};
    use tester_core::CompilerVersion;

    fn valid_tsconfig() -> Value {
        json!({
            "compilerOptions": {
                "module": "commonjs",
                "lib": ["es6", "dom"],
                "noImplicitAny": true,
                "noImplicitThis": true,
                "strictNullChecks": true,
                "noEmit": true,
                "forceConsistentCasingInFileNames": true
            }
        })
    }

    fn pipeline(runner: Arc<FakeRunner>, reader: Arc<FakeJsonReader>) -> ValidationPipeline {
        ValidationPipeline::new(
            TesterOptions::from_working_dir("/dt"),
            PipelineConfig::default().with_lint_script("/tools/tslint-cli.js"),
            runner,
            reader,
            Arc::new(FakeLocator),
        )
    }

    fn lodash() -> Package {
        Package::new("lodash", CompilerVersion::V2_0)
            .with_files(&["index.d.ts"], &["lodash-tests.ts"])
            .with_package_json(true)
            .with_lint_config(true)
    }

    #[tokio::test]
    async fn test_all_stages_pass() {
        let runner = Arc::new(FakeRunner::new());
        let reader = Arc::new(
            FakeJsonReader::new()
                .with_file("/dt/lodash/tsconfig.json", valid_tsconfig())
                .with_file("/dt/lodash/package.json", json!({ "dependencies": {} })),
        );
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader.clone()).validate(&lodash(), &mut log).await;

        assert_eq!(outcome, ValidationOutcome::Success);
        assert_eq!(
            runner.commands(),
            vec![
                "node /compilers/2.0/tsc.js",
                "node /tools/tslint-cli.js --format stylish index.d.ts lodash-tests.ts",
            ]
        );
        assert!(runner.calls().iter().all(|(_, cwd)| cwd == Path::new("/dt/lodash")));
        assert_eq!(reader.reads().len(), 2);
    }

    #[tokio::test]
    async fn test_config_failure_short_circuits() {
        let mut tsconfig = valid_tsconfig();
        tsconfig["compilerOptions"]
            .as_object_mut()
            .unwrap()
            .remove("strictNullChecks");
        let runner = Arc::new(FakeRunner::new());
        let reader = Arc::new(FakeJsonReader::new().with_file("/dt/lodash/tsconfig.json", tsconfig));
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader.clone()).validate(&lodash(), &mut log).await;

        assert_eq!(
            outcome,
            ValidationOutcome::Failure {
                stage: Stage::Config,
                message: "Expected `\"strictNullChecks\": true` or `\"strictNullChecks\": false`."
                    .to_string(),
            }
        );
        assert!(runner.commands().is_empty());
        assert_eq!(reader.reads(), vec![PathBuf::from("/dt/lodash/tsconfig.json")]);
        assert!(log.has_errors());
    }

    #[tokio::test]
    async fn test_missing_tsconfig_is_a_failure_not_a_panic() {
        let runner = Arc::new(FakeRunner::new());
        let reader = Arc::new(FakeJsonReader::new());
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader).validate(&lodash(), &mut log).await;

        match outcome {
            ValidationOutcome::Failure { stage, message } => {
                assert_eq!(stage, Stage::Config);
                assert!(message.contains("/dt/lodash/tsconfig.json"));
            }
            ValidationOutcome::Success => panic!("Expected failure"),
        }
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_manifest_failure_skips_compile_and_lint() {
        let runner = Arc::new(FakeRunner::new());
        let reader = Arc::new(
            FakeJsonReader::new()
                .with_file("/dt/lodash/tsconfig.json", valid_tsconfig())
                .with_file(
                    "/dt/lodash/package.json",
                    json!({ "dependencies": {}, "scripts": {} }),
                ),
        );
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader).validate(&lodash(), &mut log).await;

        assert_eq!(outcome.message(), Some("Ignored field in /dt/lodash/package.json: scripts"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_no_manifest_and_no_lint_config() {
        let runner = Arc::new(FakeRunner::new());
        let reader = Arc::new(FakeJsonReader::new().with_file("/dt/lodash/tsconfig.json", valid_tsconfig()));
        let pkg = lodash().with_package_json(false).with_lint_config(false);
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader.clone()).validate(&pkg, &mut log).await;

        assert!(outcome.is_success());
        assert_eq!(runner.commands(), vec!["node /compilers/2.0/tsc.js"]);
        assert_eq!(reader.reads().len(), 1);
    }

    #[tokio::test]
    async fn test_compile_failure_skips_lint() {
        let runner = Arc::new(
            FakeRunner::new()
                .fail("/compilers/2.0/", "error TS1005")
                .fail("/compilers/2.3/", "error TS1005"),
        );
        let reader = Arc::new(
            FakeJsonReader::new()
                .with_file("/dt/lodash/tsconfig.json", valid_tsconfig())
                .with_file("/dt/lodash/package.json", json!({})),
        );
        let mut log = TaskLog::new();

        let outcome = pipeline(runner.clone(), reader).validate(&lodash(), &mut log).await;

        assert!(matches!(outcome, ValidationOutcome::Failure { stage: Stage::Compile, .. }));
        assert_eq!(runner.count_matching("tslint"), 0);
    }

    #[tokio::test]
    async fn test_lint_failure() {
        let runner = Arc::new(FakeRunner::new().fail("tslint-cli.js", "index.d.ts[1, 1]: no-var"));
        let reader = Arc::new(
            FakeJsonReader::new()
                .with_file("/dt/lodash/tsconfig.json", valid_tsconfig())
                .with_file("/dt/lodash/package.json", json!({})),
        );
        let mut log = TaskLog::new();

        let outcome = pipeline(runner, reader).validate(&lodash(), &mut log).await;

        match outcome {
            ValidationOutcome::Failure { stage, message } => {
                assert_eq!(stage, Stage::Lint);
                assert!(message.contains("no-var"));
            }
            ValidationOutcome::Success => panic!("Expected lint failure"),
        }
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let runner = Arc::new(FakeRunner::new().fail("/compilers/2.0/", "error TS2304"));
        let reader = Arc::new(
            FakeJsonReader::new()
                .with_file("/dt/lodash/tsconfig.json", valid_tsconfig())
                .with_file("/dt/lodash/package.json", json!({ "description": "x" })),
        );
        let pipeline = pipeline(runner, reader);

        let mut first_log = TaskLog::new();
        let first = pipeline.validate(&lodash(), &mut first_log).await;
        let mut second_log = TaskLog::new();
        let second = pipeline.validate(&lodash(), &mut second_log).await;

        assert_eq!(first, second);
        assert_eq!(first_log.entries(), second_log.entries());
        assert!(first.message().unwrap().contains("Package compiles in TypeScript 2.3"));
    }
}
