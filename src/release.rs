//! Dependency-aware version bumps
//!
//! Every package with unreleased commits is bumped by the level its
//! commits call for. The same level is then proposed to each of its direct
//! dependents; a dependent reached from several changed packages takes the
//! most severe proposal. Propagation is a single hop: a dependent of a
//! dependent is only bumped if it has changes of its own or depends
//! directly on a changed package.
//!
//! Direct bumps are written as soon as they are classified. There is no
//! rollback: a failure while writing propagated bumps leaves the direct
//! ones in place.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::error::{RepoToolsError, Result};
use crate::git::Repository;
use crate::history::{BumpClassifier, CommitHistory};
use crate::manifest::VersionSetter;
use crate::metadata::{DependencyGraph, MetadataProvider};
use crate::version::{next_version, Bump};

/// Why a package is being bumped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// It has unreleased commits of its own
    Direct,
    /// It depends on a package that is bumped
    Dependent,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Direct => f.write_str("direct"),
            Reason::Dependent => f.write_str("dependent"),
        }
    }
}

/// A version written for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub package: String,
    pub from: String,
    pub to: String,
    pub level: Bump,
    pub reason: Reason,
}

/// Outcome of a release run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Levels classified from each package's own commits
    pub direct: BTreeMap<String, Bump>,
    /// Levels proposed to dependents of directly bumped packages
    pub propagated: BTreeMap<String, Bump>,
    /// Versions written, in write order, one entry per package
    pub changes: Vec<VersionChange>,
}

impl ReleasePlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The final version of `package`, if it was bumped
    pub fn version_of(&self, package: &str) -> Option<&str> {
        self.changes
            .iter()
            .find(|c| c.package == package)
            .map(|c| c.to.as_str())
    }

    fn record(&mut self, change: VersionChange) {
        match self.changes.iter_mut().find(|c| c.package == change.package) {
            Some(existing) => *existing = change,
            None => self.changes.push(change),
        }
    }
}

/// Bump every changed package and its direct dependents.
///
/// `classify` is asked once per package in `graph`. Direct bumps are
/// written through `setter` immediately, propagated bumps after all
/// packages were classified. A package that is both changed and a
/// dependent ends at the more severe of its own and its propagated level,
/// computed from its original version.
pub fn propagate<F, S>(graph: &DependencyGraph, mut classify: F, setter: &mut S) -> Result<ReleasePlan>
where
    F: FnMut(&str) -> Result<Option<Bump>>,
    S: VersionSetter + ?Sized,
{
    let mut plan = ReleasePlan::default();

    for (name, current) in &graph.versions {
        let Some(level) = classify(name.as_str())? else {
            continue;
        };

        let next = next_version(current, level)?;
        setter.set_version(name, &next)?;
        info!(package = %name, from = %current, to = %next, %level, "bumped");

        plan.direct.insert(name.clone(), level);
        plan.record(VersionChange {
            package: name.clone(),
            from: current.clone(),
            to: next,
            level,
            reason: Reason::Direct,
        });

        for dependent in graph.dependents_of(name) {
            plan.propagated
                .entry(dependent.clone())
                .and_modify(|l| *l = (*l).max(level))
                .or_insert(level);
        }
    }

    let propagated = plan.propagated.clone();
    for (name, proposed) in propagated {
        let current = graph.versions.get(&name).ok_or_else(|| {
            RepoToolsError::manifest(format!("Unknown dependent package: {}", name), None)
        })?;

        let level = plan.direct.get(&name).map_or(proposed, |d| (*d).max(proposed));
        let next = next_version(current, level)?;
        if plan.version_of(&name) == Some(next.as_str()) {
            debug!(package = %name, version = %next, "already at propagated version");
            continue;
        }

        setter.set_version(&name, &next)?;
        info!(package = %name, from = %current, to = %next, %level, "bumped dependent");

        plan.record(VersionChange {
            package: name.clone(),
            from: current.clone(),
            to: next,
            level,
            reason: Reason::Dependent,
        });
    }

    Ok(plan)
}

/// Full release run against injected collaborators.
///
/// Aborts with [RepoToolsError::UncommittedChanges] before anything else
/// when the working tree is dirty, so no version is touched. The setter is
/// built from the resolved graph, since writers need to know where each
/// package's manifest lives.
pub fn run<R, P, H, S, B>(
    repo: &R,
    metadata: &P,
    classifier: &BumpClassifier<H>,
    make_setter: B,
) -> Result<ReleasePlan>
where
    R: Repository + ?Sized,
    P: MetadataProvider + ?Sized,
    H: CommitHistory,
    S: VersionSetter,
    B: FnOnce(&DependencyGraph) -> S,
{
    if repo.has_uncommitted_changes()? {
        return Err(RepoToolsError::UncommittedChanges);
    }

    let graph = DependencyGraph::resolve(metadata)?;
    debug!(packages = graph.versions.len(), "resolved dependency graph");

    let mut setter = make_setter(&graph);
    propagate(&graph, |name| classifier.classify(name), &mut setter)
}
