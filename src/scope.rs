//! Commit scope discovery
//!
//! Scopes are the package names of a repository, each mapped to the
//! directory the package lives in. They are discovered by walking the
//! workspace manifest of the repository root: a workspace manifest
//! recurses into every member directory, a package manifest contributes a
//! single entry.
//!
//! Two manifest dialects are understood:
//!
//! - Cargo: `Cargo.toml` with `[workspace].members` or `[package].name`
//! - npm: `package.json` with `workspaces` or `name`
//!
//! Cargo is tried first; npm only when Cargo yields nothing.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{RepoToolsError, Result};

/// Mapping from scope name to the directory of the package
pub type ScopeMap = BTreeMap<String, PathBuf>;

#[derive(Debug, Default, Deserialize)]
struct CargoManifest {
    workspace: Option<CargoWorkspace>,
    package: Option<CargoPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct CargoWorkspace {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CargoPackage {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    workspaces: Option<NpmWorkspaces>,
}

/// npm and pnpm use a plain list, yarn also accepts `{ "packages": [..] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NpmWorkspaces {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl NpmWorkspaces {
    fn patterns(&self) -> &[String] {
        match self {
            NpmWorkspaces::List(patterns) => patterns,
            NpmWorkspaces::Object { packages } => packages,
        }
    }
}

/// Returns commit scopes for a Cargo project rooted at `directory`.
///
/// `Ok(None)` means there is no `Cargo.toml`, or it declares neither a
/// workspace nor a named package.
pub fn resolve_cargo(directory: &Path) -> Result<Option<ScopeMap>> {
    let mut visited = HashSet::new();
    resolve_cargo_inner(directory, &mut visited)
}

fn resolve_cargo_inner(directory: &Path, visited: &mut HashSet<PathBuf>) -> Result<Option<ScopeMap>> {
    let path = directory.join("Cargo.toml");
    if !path.is_file() {
        return Ok(None);
    }
    if !visited.insert(identity(directory)) {
        warn!(directory = %directory.display(), "workspace member cycle, skipping");
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let manifest: CargoManifest = toml::from_str(&content).map_err(|e| {
        RepoToolsError::manifest(format!("Failed to parse Cargo.toml: {}", e), Some(path.clone()))
    })?;

    if let Some(workspace) = manifest.workspace {
        let mut scopes = ScopeMap::new();
        let excluded = expand_members(directory, &workspace.exclude)?;
        for member in expand_members(directory, &workspace.members)? {
            if excluded.contains(&member) {
                debug!(member = %member.display(), "excluded workspace member");
                continue;
            }
            if let Some(nested) = resolve_cargo_inner(&member, visited)? {
                scopes.extend(nested);
            }
        }

        // A root package sits alongside its workspace members
        if let Some(name) = manifest.package.and_then(|p| p.name) {
            scopes.insert(name, directory.to_path_buf());
        }

        debug!(directory = %directory.display(), count = scopes.len(), "resolved cargo workspace");
        return Ok(Some(scopes));
    }

    Ok(manifest
        .package
        .and_then(|p| p.name)
        .map(|name| ScopeMap::from([(name, directory.to_path_buf())])))
}

/// Returns commit scopes for an npm project rooted at `directory`.
///
/// Organisation prefixes are stripped, so `@acme/ui` becomes scope `ui`.
pub fn resolve_npm(directory: &Path) -> Result<Option<ScopeMap>> {
    let mut visited = HashSet::new();
    resolve_npm_inner(directory, &mut visited)
}

fn resolve_npm_inner(directory: &Path, visited: &mut HashSet<PathBuf>) -> Result<Option<ScopeMap>> {
    let path = directory.join("package.json");
    if !path.is_file() {
        return Ok(None);
    }
    if !visited.insert(identity(directory)) {
        warn!(directory = %directory.display(), "workspace member cycle, skipping");
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let manifest: PackageJson = serde_json::from_str(&content).map_err(|e| {
        RepoToolsError::manifest(format!("Failed to parse package.json: {}", e), Some(path.clone()))
    })?;

    if let Some(workspaces) = manifest.workspaces {
        let mut scopes = ScopeMap::new();
        for member in expand_members(directory, workspaces.patterns())? {
            if let Some(nested) = resolve_npm_inner(&member, visited)? {
                scopes.extend(nested);
            }
        }

        debug!(directory = %directory.display(), count = scopes.len(), "resolved npm workspace");
        return Ok(Some(scopes));
    }

    Ok(manifest.name.map(|name| {
        let name = strip_organisation(&name).to_string();
        ScopeMap::from([(name, directory.to_path_buf())])
    }))
}

/// Resolves the workspace at `root`, trying Cargo first and npm second.
///
/// An empty Cargo workspace counts as absent, so npm still gets a chance.
pub fn resolve_workspace(root: &Path) -> Result<Option<ScopeMap>> {
    match resolve_cargo(root)? {
        Some(scopes) if !scopes.is_empty() => Ok(Some(scopes)),
        _ => resolve_npm(root),
    }
}

/// Resolves all commit scopes for the repository at `root`.
///
/// The `workspace_scope` pseudo-scope is always present and maps to `root`
/// itself, even when no manifest could be found.
pub fn resolve_scopes(root: &Path, workspace_scope: &str) -> Result<ScopeMap> {
    let mut scopes = resolve_workspace(root)?.unwrap_or_default();
    scopes.insert(workspace_scope.to_string(), root.to_path_buf());
    Ok(scopes)
}

/// Whether the repository-relative `file` lies inside `directory`.
///
/// Comparison is by path segment: `lib` contains `lib/a.rs` but not
/// `library/a.rs`. `.` segments are ignored on both sides.
pub fn contains(directory: &Path, file: &Path) -> bool {
    normalize(file).starts_with(normalize(directory))
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn identity(directory: &Path) -> PathBuf {
    directory
        .canonicalize()
        .unwrap_or_else(|_| normalize(directory))
}

fn strip_organisation(name: &str) -> &str {
    match name.strip_prefix('@') {
        Some(scoped) => scoped.split_once('/').map_or(name, |(_, bare)| bare),
        None => name,
    }
}

/// Expands member globs relative to `directory` into existing directories.
fn expand_members(directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut members = Vec::new();
    for pattern in patterns {
        let full_pattern = directory.join(pattern);
        let pattern_str = full_pattern.to_str().ok_or_else(|| {
            RepoToolsError::manifest(
                format!(
                    "Workspace member pattern contains invalid UTF-8: {}",
                    full_pattern.display()
                ),
                Some(full_pattern.clone()),
            )
        })?;
        let matches = glob::glob(pattern_str).map_err(|e| {
            RepoToolsError::manifest(
                format!("Invalid glob pattern: {}", e),
                Some(full_pattern.clone()),
            )
        })?;
        for entry in matches.flatten() {
            if entry.is_dir() {
                members.push(entry);
            }
        }
    }
    Ok(members)
}
