//! Workspace package metadata and the reversed dependency graph

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::command;
use crate::error::Result;

/// A workspace package as reported by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub manifest_path: PathBuf,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

/// A declared dependency of a package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    /// Set for path (intra-workspace) dependencies only
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DependencyRecord {
    /// Whether the dependency points into the workspace
    pub fn is_local(&self) -> bool {
        self.path.as_ref().is_some_and(|p| !p.as_os_str().is_empty())
    }
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRecord {
            name: name.into(),
            version: version.into(),
            manifest_path: PathBuf::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add a path dependency on `name`
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.dependencies.push(DependencyRecord {
            path: Some(PathBuf::from("..").join(&name)),
            name,
        });
        self
    }

    /// Add a registry dependency on `name`
    pub fn depends_on_registry(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(DependencyRecord {
            name: name.into(),
            path: None,
        });
        self
    }
}

/// Source of workspace package metadata
pub trait MetadataProvider {
    /// Every package of the workspace, with its version and dependencies
    fn packages(&self) -> Result<Vec<PackageRecord>>;
}

#[derive(Debug, Deserialize)]
struct Metadata {
    packages: Vec<PackageRecord>,
}

/// Metadata from `cargo metadata --format-version 1 --no-deps`
#[derive(Debug, Clone)]
pub struct CargoMetadata {
    root: PathBuf,
}

impl CargoMetadata {
    pub fn new(root: &Path) -> Self {
        CargoMetadata {
            root: root.to_path_buf(),
        }
    }

    /// Parse the JSON printed by `cargo metadata`
    pub fn parse(json: &str) -> Result<Vec<PackageRecord>> {
        let metadata: Metadata = serde_json::from_str(json)?;
        Ok(metadata.packages)
    }
}

impl MetadataProvider for CargoMetadata {
    fn packages(&self) -> Result<Vec<PackageRecord>> {
        let output = command::run(
            "cargo",
            &["metadata", "--format-version", "1", "--no-deps"],
            &self.root,
        )?;
        let packages = Self::parse(&output)?;
        debug!(count = packages.len(), "workspace packages");
        Ok(packages)
    }
}

/// Current versions and reversed intra-workspace dependency edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Package name to current version
    pub versions: BTreeMap<String, String>,
    /// Package name to the packages that depend on it
    pub dependents: BTreeMap<String, Vec<String>>,
    /// Package name to its manifest path
    pub manifests: BTreeMap<String, PathBuf>,
}

impl DependencyGraph {
    /// Build the graph from package records.
    ///
    /// Only local dependencies become edges, and they are reversed: if `a`
    /// depends on `b`, then `a` is listed among the dependents of `b`.
    pub fn from_packages(packages: &[PackageRecord]) -> Self {
        let mut graph = DependencyGraph::default();

        for package in packages {
            graph
                .versions
                .insert(package.name.clone(), package.version.clone());
            graph
                .manifests
                .insert(package.name.clone(), package.manifest_path.clone());

            for dependency in package.dependencies.iter().filter(|d| d.is_local()) {
                let dependents = graph.dependents.entry(dependency.name.clone()).or_default();
                // Normal and dev dependencies on the same package share an edge
                if !dependents.contains(&package.name) {
                    dependents.push(package.name.clone());
                }
            }
        }

        graph
    }

    /// Query the provider once and build the graph
    pub fn resolve<P>(provider: &P) -> Result<Self>
    where
        P: MetadataProvider + ?Sized,
    {
        let packages = provider.packages()?;
        Ok(Self::from_packages(&packages))
    }

    /// Direct dependents of `name`
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"{
        "packages": [
            {
                "name": "zrx-graph",
                "version": "0.3.1",
                "manifest_path": "/repo/crates/zrx-graph/Cargo.toml",
                "dependencies": [
                    { "name": "ahash", "req": "^0.8", "kind": null, "path": null }
                ]
            },
            {
                "name": "zrx-scheduler",
                "version": "0.2.0",
                "manifest_path": "/repo/crates/zrx-scheduler/Cargo.toml",
                "dependencies": [
                    { "name": "zrx-graph", "req": "^0.3.1", "path": "/repo/crates/zrx-graph" },
                    { "name": "zrx-graph", "req": "^0.3.1", "kind": "dev", "path": "/repo/crates/zrx-graph" }
                ]
            },
            {
                "name": "zrx",
                "version": "0.0.7",
                "manifest_path": "/repo/crates/zrx/Cargo.toml",
                "dependencies": [
                    { "name": "zrx-graph", "req": "^0.3.1", "path": "/repo/crates/zrx-graph" },
                    { "name": "zrx-scheduler", "req": "^0.2.0", "path": "/repo/crates/zrx-scheduler" }
                ]
            }
        ],
        "workspace_members": []
    }"#;

    #[test]
    fn test_parse_cargo_metadata() {
        let packages = CargoMetadata::parse(METADATA).unwrap();
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].name, "zrx-graph");
        assert!(!packages[0].dependencies[0].is_local());
        assert!(packages[1].dependencies[0].is_local());
        assert_eq!(
            packages[2].manifest_path,
            PathBuf::from("/repo/crates/zrx/Cargo.toml")
        );
    }

    #[test]
    fn test_graph_reverses_local_edges() {
        let packages = CargoMetadata::parse(METADATA).unwrap();
        let graph = DependencyGraph::from_packages(&packages);

        assert_eq!(graph.versions["zrx-graph"], "0.3.1");
        assert_eq!(graph.versions["zrx"], "0.0.7");
        assert_eq!(graph.dependents_of("zrx-graph"), ["zrx-scheduler", "zrx"]);
        assert_eq!(graph.dependents_of("zrx-scheduler"), ["zrx"]);
        assert!(graph.dependents_of("zrx").is_empty());
        assert!(!graph.dependents.contains_key("ahash"));
    }

    #[test]
    fn test_resolve_from_provider() {
        struct Fixed(Vec<PackageRecord>);
        impl MetadataProvider for Fixed {
            fn packages(&self) -> Result<Vec<PackageRecord>> {
                Ok(self.0.clone())
            }
        }

        let provider = Fixed(vec![
            PackageRecord::new("a", "1.0.0"),
            PackageRecord::new("b", "1.0.0")
                .depends_on("a")
                .depends_on_registry("serde"),
        ]);
        let graph = DependencyGraph::resolve(&provider).unwrap();
        assert_eq!(graph.dependents_of("a"), ["b"]);
        assert!(graph.dependents_of("serde").is_empty());
    }
}
