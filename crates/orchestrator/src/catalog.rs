//! The parsed package catalog and the selections made from it.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;

use regex::Regex;
use tester_core::{Package, TesterOptions};
use tokio::fs;
use tracing::debug;

use crate::error::{OrchestratorError, Result};

pub const CATALOG_FILE: &str = "typings.json";

#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    packages: Vec<Package>,
}

impl PackageCatalog {
    pub fn new(mut packages: Vec<Package>) -> Self {
        packages.sort_by(Package::compare);
        Self { packages }
    }

    /// Reads `<data_dir>/typings.json`.
    pub async fn read(options: &TesterOptions) -> Result<Self> {
        let path = options.data_dir.join(CATALOG_FILE);
        let read_error = |reason: String| OrchestratorError::ReadJson {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| read_error(e.to_string()))?;
        let packages: Vec<Package> =
            serde_json::from_str(&content).map_err(|e| read_error(e.to_string()))?;

        debug!(path = %path.display(), packages = packages.len(), "Catalog loaded");
        Ok(Self::new(packages))
    }

    pub fn all(&self) -> &[Package] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn matching(&self, pattern: &Regex) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|p| pattern.is_match(&p.name))
            .cloned()
            .collect()
    }

    /// Names of packages whose directory contains one of `changed_files`
    /// (paths relative to the checkout root).
    pub fn changed_packages(&self, changed_files: &[PathBuf]) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .packages
            .iter()
            .filter(|p| changed_files.iter().any(|f| f.starts_with(&p.subdirectory)))
            .map(|p| p.name.as_str())
            .collect();
        names.into_iter().map(String::from).collect()
    }

    /// Packages named in `changed`, plus every package that depends on one of
    /// them directly or transitively.
    pub fn affected(&self, changed: &[String]) -> Vec<Package> {
        let mut affected: HashSet<&str> = changed
            .iter()
            .map(String::as_str)
            .filter(|name| self.packages.iter().any(|p| p.name == *name))
            .collect();

        loop {
            let dependents: Vec<&str> = self
                .packages
                .iter()
                .filter(|p| !affected.contains(p.name.as_str()))
                .filter(|p| p.dependencies.iter().any(|d| affected.contains(d.as_str())))
                .map(|p| p.name.as_str())
                .collect();
            if dependents.is_empty() {
                break;
            }
            affected.extend(dependents);
        }

        self.packages
            .iter()
            .filter(|p| affected.contains(p.name.as_str()))
            .cloned()
            .collect()
    }

    /// `selected` plus everything it transitively depends on. Dependency names
    /// that are not in the catalog are plain npm packages and are skipped.
    pub fn dependency_closure(&self, selected: &[Package]) -> Vec<Package> {
        let mut seen: HashSet<(String, u32)> = HashSet::new();
        let mut queue: VecDeque<&Package> = selected.iter().collect();
        let mut closure = Vec::new();

        while let Some(pkg) = queue.pop_front() {
            if !seen.insert((pkg.name.clone(), pkg.major_version)) {
                continue;
            }
            closure.push(pkg.clone());
            for dep in &pkg.dependencies {
                if let Some(found) = self.resolve(dep) {
                    queue.push_back(found);
                }
            }
        }

        closure.sort_by(Package::compare);
        closure
    }

    /// The current major version of `name`, falling back to any version.
    fn resolve(&self, name: &str) -> Option<&Package> {
        let mut candidates = self.packages.iter().filter(|p| p.name == name);
        let first = candidates.next()?;
        if first.is_latest {
            return Some(first);
        }
        candidates.find(|p| p.is_latest).or(Some(first))
    }

    pub fn find(&self, name: &str) -> Result<&Package> {
        self.resolve(name)
            .ok_or_else(|| OrchestratorError::UnknownPackage(name.to_string()))
    }
}
