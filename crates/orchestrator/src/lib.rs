pub mod catalog;
pub mod changes;
pub mod checks;
pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod install;
pub mod json;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod runner;
pub mod stage;
pub mod task_log;

#[cfg(test)]
mod test_support;

pub use catalog::PackageCatalog;
pub use compiler::{CompilerFallback, CompilerInstaller, CompilerLocator};
pub use config::TesterConfig;
pub use error::{OrchestratorError, Result};
pub use executor::BoundedExecutor;
pub use json::{FsJsonReader, JsonReader};
pub use pipeline::{PipelineConfig, ValidationOutcome, ValidationPipeline};
pub use process::{CommandRunner, CommandSpec, ExecOutput, ProcessRunner};
pub use report::{BatchFailure, BatchReport, FailureCollector};
pub use runner::{Selection, TestRunner};
pub use stage::Stage;
pub use task_log::TaskLog;
