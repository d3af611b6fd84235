use std::fmt;
use std::str::FromStr;

use crate::error::{RepoToolsError, Result};

/// Represents the magnitude of a semantic version bump.
///
/// Variants are declared in ascending severity, so `Ord` and `max` merge
/// competing suggestions with the most severe one winning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bump::Patch => "patch",
            Bump::Minor => "minor",
            Bump::Major => "major",
        };
        f.write_str(name)
    }
}

impl FromStr for Bump {
    type Err = RepoToolsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(Bump::Patch),
            "minor" => Ok(Bump::Minor),
            "major" => Ok(Bump::Major),
            other => Err(RepoToolsError::value(format!("Invalid bump: {}", other))),
        }
    }
}

/// Parses a plain `major.minor.patch` version.
///
/// Pre-release and build metadata are rejected, as are leading `v`
/// prefixes.
pub fn parse_version(current: &str) -> Result<semver::Version> {
    let invalid = || RepoToolsError::value(format!("Invalid version: {}", current));

    let version = semver::Version::parse(current).map_err(|_| invalid())?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(invalid());
    }
    Ok(version)
}

/// Computes the next version for `current` given a bump suggestion.
///
/// - `0.0.x`: always a patch bump, whatever the suggestion
/// - `0.x.y`: minor or major bump the minor component, patch bumps patch
/// - `x.y.z`: the suggested component is bumped and lower ones reset
///
/// # Errors
/// Fails with a value error when `current` is not `major.minor.patch`.
///
/// # Example
/// ```
/// use repo_tools::version::{next_version, Bump};
///
/// assert_eq!(next_version("0.0.3", Bump::Major).unwrap(), "0.0.4");
/// assert_eq!(next_version("0.3.1", Bump::Minor).unwrap(), "0.4.0");
/// assert_eq!(next_version("2.1.4", Bump::Major).unwrap(), "3.0.0");
/// ```
pub fn next_version(current: &str, level: Bump) -> Result<String> {
    let mut version = parse_version(current)?;
    let overflow = || RepoToolsError::value(format!("Invalid version: {}", current));

    if version.major == 0 && version.minor == 0 {
        version.patch = version.patch.checked_add(1).ok_or_else(overflow)?;
    } else if version.major == 0 {
        if level >= Bump::Minor {
            version.minor = version.minor.checked_add(1).ok_or_else(overflow)?;
            version.patch = 0;
        } else {
            version.patch = version.patch.checked_add(1).ok_or_else(overflow)?;
        }
    } else {
        match level {
            Bump::Major => {
                version.major = version.major.checked_add(1).ok_or_else(overflow)?;
                version.minor = 0;
                version.patch = 0;
            }
            Bump::Minor => {
                version.minor = version.minor.checked_add(1).ok_or_else(overflow)?;
                version.patch = 0;
            }
            Bump::Patch => {
                version.patch = version.patch.checked_add(1).ok_or_else(overflow)?;
            }
        }
    }

    Ok(version.to_string())
}
