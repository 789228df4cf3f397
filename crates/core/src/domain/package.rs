use std::cmp::Ordering;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::options::TesterOptions;
use super::version::CompilerVersion;

fn default_true() -> bool {
    true
}

/// One typings package as recorded in the parsed catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub major_version: u32,
    #[serde(default)]
    pub minor_version: u32,
    /// False for packages kept around for an older major version.
    #[serde(default = "default_true")]
    pub is_latest: bool,
    pub typescript_version: CompilerVersion,
    /// Directory of the package relative to the checkout root.
    pub subdirectory: PathBuf,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub test_files: Vec<String>,
    /// Names of other catalog packages this one references.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub has_package_json: bool,
    #[serde(default)]
    pub has_lint_config: bool,
}

impl Package {
    pub fn new(name: impl Into<String>, typescript_version: CompilerVersion) -> Self {
        let name = name.into();
        Self {
            subdirectory: PathBuf::from(&name),
            name,
            major_version: 1,
            minor_version: 0,
            is_latest: true,
            typescript_version,
            files: Vec::new(),
            test_files: Vec::new(),
            dependencies: Vec::new(),
            has_package_json: false,
            has_lint_config: false,
        }
    }

    pub fn with_files(mut self, files: &[&str], test_files: &[&str]) -> Self {
        self.files = files.iter().map(|f| f.to_string()).collect();
        self.test_files = test_files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_package_json(mut self, has: bool) -> Self {
        self.has_package_json = has;
        self
    }

    pub fn with_lint_config(mut self, has: bool) -> Self {
        self.has_lint_config = has;
        self
    }

    pub fn with_major_version(mut self, major: u32, is_latest: bool) -> Self {
        self.major_version = major;
        self.is_latest = is_latest;
        self
    }

    /// Human-readable name used in progress lines and the error report.
    pub fn desc(&self) -> String {
        if self.is_latest {
            self.name.clone()
        } else {
            format!("{} v{}", self.name, self.major_version)
        }
    }

    pub fn directory_path(&self, options: &TesterOptions) -> PathBuf {
        options.root().join(&self.subdirectory)
    }

    pub fn file_path(&self, file_name: &str, options: &TesterOptions) -> PathBuf {
        self.directory_path(options).join(file_name)
    }

    /// Total order used for deterministic reports: by name, ties broken by description.
    pub fn compare(a: &Package, b: &Package) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.desc().cmp(&b.desc()))
    }
}
