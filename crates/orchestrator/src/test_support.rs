//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tester_core::CompilerVersion;

use crate::compiler::CompilerLocator;
use crate::error::{OrchestratorError, Result};
use crate::json::JsonReader;
use crate::process::{CommandRunner, CommandSpec, ExecOutput};

/// Answers commands by substring match on the rendered command line.
/// Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<(String, ExecOutput)>>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, pattern: &str, output: ExecOutput) -> Self {
        self.rules.lock().unwrap().push((pattern.to_string(), output));
        self
    }

    pub fn fail(self, pattern: &str, stderr: &str) -> Self {
        self.respond(
            pattern,
            ExecOutput::failure(format!("Command failed: {}", pattern), "", stderr),
        )
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(cmd, _)| cmd).collect()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &CommandSpec, cwd: &Path) -> ExecOutput {
        let line = command.to_string();
        self.calls
            .lock()
            .unwrap()
            .push((line.clone(), cwd.to_path_buf()));
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct FakeJsonReader {
    files: HashMap<PathBuf, Value>,
    reads: Mutex<Vec<PathBuf>>,
}

impl FakeJsonReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, value: Value) -> Self {
        self.files.insert(path.into(), value);
        self
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonReader for FakeJsonReader {
    async fn read_json(&self, path: &Path) -> Result<Value> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| OrchestratorError::ReadJson {
                path: path.display().to_string(),
                reason: "No such file or directory".to_string(),
            })
    }
}

/// Resolves every version to `/compilers/<version>/tsc.js`.
pub struct FakeLocator;

impl CompilerLocator for FakeLocator {
    fn compiler_path(&self, version: CompilerVersion) -> PathBuf {
        PathBuf::from(format!("/compilers/{}/tsc.js", version))
    }
}
