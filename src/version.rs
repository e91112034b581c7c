//! Chart version validation.
//!
//! Two strictness tiers are checked independently: a lenient parse that
//! accepts the looser shapes charts have historically carried (optional
//! leading `v`, one to three numeric components), and a strict SemVer 2.0.0
//! parse that requires the full `MAJOR.MINOR.PATCH` form.

use std::fmt;

/// Why a version string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    Empty,
    TooManyComponents(usize),
    MissingComponents(usize),
    InvalidNumber(String),
    InvalidPrerelease(String),
    InvalidBuildMetadata(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "version is empty"),
            Self::TooManyComponents(n) => write!(f, "{n} numeric components (at most 3 allowed)"),
            Self::MissingComponents(n) => {
                write!(f, "{n} numeric components (exactly 3 required)")
            }
            Self::InvalidNumber(part) => write!(f, "'{part}' is not a number"),
            Self::InvalidPrerelease(pre) => write!(f, "invalid pre-release '{pre}'"),
            Self::InvalidBuildMetadata(build) => write!(f, "invalid build metadata '{build}'"),
        }
    }
}

/// Lenient parse: optional leading `v`, 1-3 dot-separated numeric
/// components, optional `-prerelease` and `+build` suffixes.
///
/// # Errors
/// Returns a [`VersionError`] describing the first malformed piece.
pub fn parse_lenient(version: &str) -> Result<(), VersionError> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    let (core, _pre, _build) = split_suffixes(trimmed)?;

    let components: Vec<&str> = core.split('.').collect();
    if components.len() > 3 {
        return Err(VersionError::TooManyComponents(components.len()));
    }
    validate_numeric(&components)
}

/// Strict SemVer 2.0.0 parse: exactly `MAJOR.MINOR.PATCH`, no leading `v`,
/// optional `-prerelease` and `+build` suffixes.
///
/// # Errors
/// Returns a [`VersionError`] describing the first malformed piece.
pub fn parse_strict(version: &str) -> Result<(), VersionError> {
    let (core, _pre, _build) = split_suffixes(version)?;

    let components: Vec<&str> = core.split('.').collect();
    if components.len() != 3 {
        return Err(VersionError::MissingComponents(components.len()));
    }
    validate_numeric(&components)
}

/// Splits `core[-prerelease][+build]`, validating the suffix alphabets.
fn split_suffixes(version: &str) -> Result<(&str, Option<&str>, Option<&str>), VersionError> {
    if version.is_empty() {
        return Err(VersionError::Empty);
    }

    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    if let Some(pre) = pre
        && !is_valid_suffix(pre)
    {
        return Err(VersionError::InvalidPrerelease(pre.to_string()));
    }
    if let Some(build) = build
        && !is_valid_suffix(build)
    {
        return Err(VersionError::InvalidBuildMetadata(build.to_string()));
    }

    Ok((core, pre, build))
}

/// Pre-release and build metadata: non-empty dot-separated alphanumeric
/// (plus hyphen) identifiers.
fn is_valid_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix
            .split('.')
            .all(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

fn validate_numeric(components: &[&str]) -> Result<(), VersionError> {
    for component in components {
        if component.is_empty() || component.parse::<u64>().is_err() {
            return Err(VersionError::InvalidNumber((*component).to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
