//! Chart directory loader.
//!
//! Resolves a directory tree into an in-memory [`Chart`]: manifest, raw
//! values text, values schema, lock file, template bodies, and subcharts.
//! The manifest is gated by a strict parse (duplicate keys rejected) before
//! the raw nodes are mapped, so a malformed Chart.yaml fails loading while
//! malformed values/templates stay data for the rules to report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;
use walkdir::WalkDir;
use yaml_rust2::{Yaml, YamlLoader};

use super::metadata::Metadata;

pub const CHARTFILE_NAME: &str = "Chart.yaml";
pub const VALUES_NAME: &str = "values.yaml";
pub const SCHEMA_NAME: &str = "values.schema.json";
pub const LOCK_NAME: &str = "Chart.lock";
pub const TEMPLATES_DIR: &str = "templates";
pub const CHARTS_DIR: &str = "charts";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("chart directory '{}' not found", dir.display())]
    DirNotFound { dir: PathBuf },

    #[error("file 'Chart.yaml' not found in chart directory '{}'", dir.display())]
    ChartfileMissing { dir: PathBuf },

    #[error("failed to strictly parse chart metadata file: {reason}")]
    Metadata { reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One template file body, named relative to the chart root
/// (e.g. "templates/deployment.yaml").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub name: String,
    pub data: String,
}

/// One pinned dependency from the lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockDependency {
    pub name: String,
    pub version: Option<String>,
    pub repository: Option<String>,
}

/// Parsed Chart.lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lock {
    pub dependencies: Vec<LockDependency>,
    pub digest: Option<String>,
}

/// A subchart slot: either a loaded chart or the failure that kept it from
/// loading. Failures are preserved so one broken subchart cannot discard
/// its siblings' findings.
#[derive(Debug, Clone)]
pub enum Subchart {
    Loaded(Chart),
    Failed { dir: PathBuf, reason: String },
}

/// A chart resolved from a directory, read-only once loaded.
#[derive(Debug, Clone)]
pub struct Chart {
    pub dir: PathBuf,
    pub metadata: Metadata,
    pub raw_values: Option<String>,
    pub schema: Option<String>,
    pub lock: Option<Lock>,
    pub has_templates_dir: bool,
    pub templates: Vec<TemplateFile>,
    pub subcharts: Vec<Subchart>,
}

impl Chart {
    /// The chart's name: the manifest name, falling back to the directory
    /// base name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata
            .name
            .as_deref()
            .unwrap_or_else(|| self.dir_name())
    }

    /// The chart directory's base name.
    #[must_use]
    pub fn dir_name(&self) -> &str {
        self.dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Load a chart directory, recursively resolving `charts/` subcharts.
///
/// # Errors
/// Fails when the directory or Chart.yaml is missing, unreadable, or the
/// manifest does not strictly parse. Subchart failures do not fail the
/// parent; they are recorded as [`Subchart::Failed`] entries.
pub fn load(dir: &Path) -> Result<Chart, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DirNotFound {
            dir: dir.to_path_buf(),
        });
    }

    let chartfile = dir.join(CHARTFILE_NAME);
    if !chartfile.is_file() {
        return Err(LoadError::ChartfileMissing {
            dir: dir.to_path_buf(),
        });
    }

    let metadata = load_metadata(&chartfile)?;
    let raw_values = read_optional(&dir.join(VALUES_NAME))?;
    let schema = read_optional(&dir.join(SCHEMA_NAME))?;
    let lock = read_optional(&dir.join(LOCK_NAME))?.and_then(|text| parse_lock(&text));
    let templates_dir = dir.join(TEMPLATES_DIR);
    let has_templates_dir = templates_dir.is_dir();
    let templates = if has_templates_dir {
        load_templates(dir, &templates_dir)?
    } else {
        Vec::new()
    };
    let subcharts = load_subcharts(&dir.join(CHARTS_DIR));

    debug!(
        "loaded chart '{}' ({} template(s), {} subchart(s))",
        dir.display(),
        templates.len(),
        subcharts.len()
    );

    Ok(Chart {
        dir: dir.to_path_buf(),
        metadata,
        raw_values,
        schema,
        lock,
        has_templates_dir,
        templates,
        subcharts,
    })
}

fn load_metadata(chartfile: &Path) -> Result<Metadata, LoadError> {
    let text = fs::read_to_string(chartfile).map_err(|source| LoadError::Read {
        path: chartfile.to_path_buf(),
        source,
    })?;

    // Strict gate: rejects syntax errors and duplicate mapping keys.
    serde_yaml::from_str::<serde_yaml::Value>(&text).map_err(|e| LoadError::Metadata {
        reason: e.to_string(),
    })?;

    // Raw node mapping: preserves scalar source text and type tags.
    let docs = YamlLoader::load_from_str(&text).map_err(|e| LoadError::Metadata {
        reason: e.to_string(),
    })?;
    Ok(docs
        .first()
        .map(Metadata::from_yaml)
        .unwrap_or_default())
}

fn read_optional(path: &Path) -> Result<Option<String>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_lock(text: &str) -> Option<Lock> {
    let docs = YamlLoader::load_from_str(text).ok()?;
    let doc = docs.first()?;
    let dependencies = doc["dependencies"]
        .as_vec()
        .map_or_else(Vec::new, |items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(LockDependency {
                        name: item["name"].as_str()?.to_string(),
                        version: yaml_scalar_text(&item["version"]),
                        repository: item["repository"].as_str().map(ToString::to_string),
                    })
                })
                .collect()
        });
    Some(Lock {
        dependencies,
        digest: doc["digest"].as_str().map(ToString::to_string),
    })
}

fn yaml_scalar_text(node: &Yaml) -> Option<String> {
    match node {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

/// Collect template file bodies under `templates/`, sorted by relative
/// name for deterministic output.
fn load_templates(chart_dir: &Path, templates_dir: &Path) -> Result<Vec<TemplateFile>, LoadError> {
    let mut templates = Vec::new();
    for entry in WalkDir::new(templates_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = path
            .strip_prefix(chart_dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let data = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        templates.push(TemplateFile { name, data });
    }
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

/// Load each subdirectory of `charts/` as a subchart, in sorted name order.
fn load_subcharts(charts_dir: &Path) -> Vec<Subchart> {
    let Ok(entries) = fs::read_dir(charts_dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    dirs.into_iter()
        .map(|sub_dir| match load(&sub_dir) {
            Ok(chart) => Subchart::Loaded(chart),
            Err(e) => Subchart::Failed {
                dir: sub_dir,
                reason: e.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
