use std::path::{Path, PathBuf};

/// Location of the DefinitelyTyped checkout and the parsed catalog data.
#[derive(Debug, Clone)]
pub struct TesterOptions {
    pub definitely_typed_path: PathBuf,
    pub data_dir: PathBuf,
    /// True when running inside a live checkout rather than the default snapshot.
    pub run_from_definitely_typed: bool,
}

impl Default for TesterOptions {
    fn default() -> Self {
        Self {
            definitely_typed_path: PathBuf::from("../DefinitelyTyped"),
            data_dir: PathBuf::from("data"),
            run_from_definitely_typed: false,
        }
    }
}

impl TesterOptions {
    /// Options for a run inside a live checkout rooted at `cwd`.
    pub fn from_working_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            definitely_typed_path: cwd.into(),
            run_from_definitely_typed: true,
            ..Default::default()
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.definitely_typed_path
    }
}
