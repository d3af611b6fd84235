//! Cargo manifest version writing.
//!
//! Rewrites `[package].version` of a workspace member with `toml_edit`, so
//! comments and formatting survive, and updates the `version` requirement
//! of every path dependency on that member across the workspace.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, TableLike, Value};
use tracing::{debug, info};

use crate::error::{RepoToolsError, Result};

const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Persists a new version for a package
pub trait VersionSetter {
    fn set_version(&mut self, package: &str, version: &str) -> Result<()>;
}

impl<T: VersionSetter + ?Sized> VersionSetter for &mut T {
    fn set_version(&mut self, package: &str, version: &str) -> Result<()> {
        (**self).set_version(package, version)
    }
}

/// Records writes instead of touching the filesystem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSetter {
    pub writes: Vec<(String, String)>,
}

impl RecordingSetter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionSetter for RecordingSetter {
    fn set_version(&mut self, package: &str, version: &str) -> Result<()> {
        self.writes.push((package.to_string(), version.to_string()));
        Ok(())
    }
}

/// Writes versions into the Cargo.toml files of a workspace
#[derive(Debug, Clone)]
pub struct CargoManifestWriter {
    root: PathBuf,
    manifests: BTreeMap<String, PathBuf>,
}

impl CargoManifestWriter {
    /// `manifests` maps package names to their `Cargo.toml` paths.
    pub fn new(root: &Path, manifests: BTreeMap<String, PathBuf>) -> Self {
        CargoManifestWriter {
            root: root.to_path_buf(),
            manifests,
        }
    }

    fn root_manifest_path(&self) -> PathBuf {
        self.root.join("Cargo.toml")
    }

    fn write_package_version(&self, path: &Path, version: &str) -> Result<()> {
        let mut doc = read_document(path)?;

        let item = doc
            .get_mut("package")
            .and_then(|p| p.as_table_like_mut())
            .and_then(|p| p.get_mut("version"))
            .ok_or_else(|| {
                RepoToolsError::manifest("No [package].version found", Some(path.to_path_buf()))
            })?;

        match item.as_value_mut() {
            Some(value) if value.is_str() => replace_value(value, version),
            _ => {
                return Err(RepoToolsError::manifest(
                    "[package].version is not a plain string (inherited from the workspace?)",
                    Some(path.to_path_buf()),
                ))
            }
        }

        write_document(path, &doc)
    }

    /// Update path dependency requirements on `package` in every manifest.
    fn write_requirements(&self, package: &str, version: &str) -> Result<()> {
        let root = self.root_manifest_path();
        let mut paths: Vec<&Path> = self.manifests.values().map(PathBuf::as_path).collect();
        if root.is_file() && !paths.contains(&root.as_path()) {
            paths.push(root.as_path());
        }

        for path in paths {
            let mut doc = read_document(path)?;
            let mut changed = update_dependency_tables(doc.as_table_mut(), package, version);

            // [target.'cfg(..)'.dependencies] and friends
            if let Some(targets) = doc.get_mut("target").and_then(|t| t.as_table_like_mut()) {
                for (_, target) in targets.iter_mut() {
                    if let Some(target) = target.as_table_like_mut() {
                        changed |= update_dependency_tables(target, package, version);
                    }
                }
            }
            if let Some(table) = doc
                .get_mut("workspace")
                .and_then(|w| w.as_table_like_mut())
                .and_then(|w| w.get_mut("dependencies"))
                .and_then(|d| d.as_table_like_mut())
            {
                changed |= update_requirement(table, package, version);
            }

            if changed {
                debug!(manifest = %path.display(), package, version, "updated dependency requirement");
                write_document(path, &doc)?;
            }
        }

        Ok(())
    }
}

impl VersionSetter for CargoManifestWriter {
    fn set_version(&mut self, package: &str, version: &str) -> Result<()> {
        let path = self.manifests.get(package).cloned().ok_or_else(|| {
            RepoToolsError::manifest(format!("Unknown package: {}", package), None)
        })?;

        self.write_package_version(&path, version)?;
        self.write_requirements(package, version)?;

        info!(package, version, "set version");
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<DocumentMut> {
    let content = fs::read_to_string(path).map_err(|e| {
        RepoToolsError::manifest(format!("Failed to read manifest: {}", e), Some(path.to_path_buf()))
    })?;
    content.parse::<DocumentMut>().map_err(|e| {
        RepoToolsError::manifest(format!("Failed to parse manifest: {}", e), Some(path.to_path_buf()))
    })
}

fn write_document(path: &Path, doc: &DocumentMut) -> Result<()> {
    fs::write(path, doc.to_string()).map_err(|e| {
        RepoToolsError::manifest(format!("Failed to write manifest: {}", e), Some(path.to_path_buf()))
    })
}

/// Replace a string value, keeping its surrounding whitespace and comments
fn replace_value(value: &mut Value, version: &str) {
    let decor = value.decor().clone();
    *value = Value::from(version);
    *value.decor_mut() = decor;
}

fn update_dependency_tables(parent: &mut dyn TableLike, package: &str, version: &str) -> bool {
    let mut changed = false;
    for name in DEPENDENCY_TABLES {
        if let Some(table) = parent.get_mut(name).and_then(|t| t.as_table_like_mut()) {
            changed |= update_requirement(table, package, version);
        }
    }
    changed
}

/// Rewrite the `version` of every path dependency on `package` in `table`.
///
/// Renamed dependencies (`alias = { package = "..", path = ".." }`) are
/// matched by their `package` key.
fn update_requirement(table: &mut dyn TableLike, package: &str, version: &str) -> bool {
    let mut changed = false;
    for (key, item) in table.iter_mut() {
        let Some(dependency) = item.as_table_like_mut() else {
            continue;
        };
        let name_matches = dependency
            .get("package")
            .and_then(|p| p.as_str())
            .unwrap_or(key.get())
            == package;
        if !name_matches || !dependency.contains_key("path") {
            continue;
        }
        if let Some(value) = dependency.get_mut("version").and_then(|v| v.as_value_mut()) {
            if value.is_str() {
                replace_value(value, version);
                changed = true;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_recording_setter() {
        let mut setter = RecordingSetter::new();
        setter.set_version("a", "1.1.0").unwrap();
        assert_eq!(setter.writes, vec![("a".to_string(), "1.1.0".to_string())]);
    }

    #[test]
    fn test_set_version_preserves_formatting() {
        let dir = TempDir::new().unwrap();
        let a = write(
            dir.path(),
            "crates/a/Cargo.toml",
            "[package]\nname = \"a\"\nversion = \"0.3.1\" # keep me\nedition = \"2021\"\n",
        );

        let mut writer = CargoManifestWriter::new(dir.path(), BTreeMap::from([("a".to_string(), a.clone())]));
        writer.set_version("a", "0.4.0").unwrap();

        assert_eq!(
            fs::read_to_string(&a).unwrap(),
            "[package]\nname = \"a\"\nversion = \"0.4.0\" # keep me\nedition = \"2021\"\n"
        );
    }

    #[test]
    fn test_set_version_updates_path_requirements() {
        let dir = TempDir::new().unwrap();
        let a = write(
            dir.path(),
            "crates/a/Cargo.toml",
            "[package]\nname = \"a\"\nversion = \"1.0.0\"\n",
        );
        let b = write(
            dir.path(),
            "crates/b/Cargo.toml",
            concat!(
                "[package]\nname = \"b\"\nversion = \"1.0.0\"\n\n",
                "[dependencies]\na = { path = \"../a\", version = \"1.0.0\" }\nserde = \"1\"\n\n",
                "[dev-dependencies]\na = { path = \"../a\" }\n",
            ),
        );
        let root = write(
            dir.path(),
            "Cargo.toml",
            "[workspace]\nmembers = [\"crates/*\"]\n\n[workspace.dependencies]\na = { path = \"crates/a\", version = \"1.0.0\" }\n",
        );

        let mut writer = CargoManifestWriter::new(
            dir.path(),
            BTreeMap::from([("a".to_string(), a.clone()), ("b".to_string(), b.clone())]),
        );
        writer.set_version("a", "1.1.0").unwrap();

        assert!(fs::read_to_string(&a).unwrap().contains("version = \"1.1.0\""));
        let b_content = fs::read_to_string(&b).unwrap();
        assert!(b_content.contains("a = { path = \"../a\", version = \"1.1.0\" }"));
        assert!(b_content.contains("a = { path = \"../a\" }"));
        assert!(b_content.contains("version = \"1.0.0\"\n\n[dependencies]"));
        assert!(fs::read_to_string(&root)
            .unwrap()
            .contains("a = { path = \"crates/a\", version = \"1.1.0\" }"));
    }

    #[test]
    fn test_set_version_updates_target_and_renamed_requirements() {
        let dir = TempDir::new().unwrap();
        let a = write(
            dir.path(),
            "crates/a/Cargo.toml",
            "[package]\nname = \"a\"\nversion = \"0.2.0\"\n",
        );
        let b = write(
            dir.path(),
            "crates/b/Cargo.toml",
            concat!(
                "[package]\nname = \"b\"\nversion = \"1.0.0\"\n\n",
                "[dependencies]\nalpha = { package = \"a\", path = \"../a\", version = \"0.2.0\" }\n",
                "\n",
                "[target.'cfg(unix)'.dependencies]\na = { path = \"../a\", version = \"0.2.0\" }\n\n",
                "[target.'cfg(windows)'.dev-dependencies.a]\npath = \"../a\"\nversion = \"0.2.0\"\n",
            ),
        );

        let mut writer = CargoManifestWriter::new(
            dir.path(),
            BTreeMap::from([("a".to_string(), a), ("b".to_string(), b.clone())]),
        );
        writer.set_version("a", "0.3.0").unwrap();

        let b_content = fs::read_to_string(&b).unwrap();
        assert!(b_content
            .contains("alpha = { package = \"a\", path = \"../a\", version = \"0.3.0\" }"));
        assert!(b_content.contains(
            "[target.'cfg(unix)'.dependencies]\na = { path = \"../a\", version = \"0.3.0\" }"
        ));
        assert!(b_content.contains("path = \"../a\"\nversion = \"0.3.0\"\n"));
        assert!(!b_content.contains("0.2.0"));
    }

    #[test]
    fn test_inherited_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write(
            dir.path(),
            "crates/a/Cargo.toml",
            "[package]\nname = \"a\"\nversion.workspace = true\n",
        );

        let mut writer = CargoManifestWriter::new(dir.path(), BTreeMap::from([("a".to_string(), a)]));
        let err = writer.set_version("a", "1.0.1").unwrap_err();
        assert!(matches!(err, RepoToolsError::Manifest { .. }));
    }

    #[test]
    fn test_unknown_package() {
        let dir = TempDir::new().unwrap();
        let mut writer = CargoManifestWriter::new(dir.path(), BTreeMap::new());
        assert!(writer.set_version("ghost", "1.0.0").is_err());
    }
}
