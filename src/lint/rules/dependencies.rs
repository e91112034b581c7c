//! Dependencies rule group.
//!
//! Cross-checks declared dependency entries against the chart tree and the
//! lock file. The strict-load re-validation here is deliberately separate
//! from the chartfile group's apiVersion cross-check: both can fire for
//! the same malformed manifest, and downstream consumers rely on seeing
//! both.

use std::collections::HashSet;

use crate::chart::{ApiVersion, Chart, Subchart};
use crate::lint::linter::Linter;
use crate::lint::message::Severity;
use crate::version;

/// Run the dependency validators against the chart.
pub fn dependencies(linter: &mut Linter, chart: &Chart) {
    // The original loader refuses charts whose metadata fails strict
    // validation; everything below assumes a loadable chart.
    if !linter.run_linter_rule(Severity::Error, "", validate_chart_loadable(chart)) {
        return;
    }

    linter.run_linter_rule(Severity::Error, "", validate_dependencies_unique(chart));

    if chart.metadata.is_v2() {
        linter.run_linter_rule(Severity::Error, "", validate_dependencies_in_charts_dir(chart));
        linter.run_linter_rule(Severity::Error, "", validate_dependencies_in_metadata(chart));
    }

    validate_lock(linter, chart);
}

/// Strict metadata validation, the way the chart loader applies it.
fn validate_chart_loadable(chart: &Chart) -> Result<(), String> {
    let metadata = &chart.metadata;

    let reason = if matches!(metadata.name.as_deref(), None | Some("")) {
        Some("chart.metadata.name is required".to_string())
    } else if !matches!(
        metadata.api_version,
        Some(ApiVersion::V1 | ApiVersion::V2)
    ) {
        Some("chart.metadata.apiVersion is required".to_string())
    } else {
        match metadata.version_text() {
            None | Some("") => Some("chart.metadata.version is required".to_string()),
            Some(text) => version::parse_lenient(text)
                .err()
                .map(|_| format!("chart.metadata.version '{text}' is invalid")),
        }
    };

    match reason {
        Some(reason) => Err(format!("unable to load chart:\n\t{reason}")),
        None => Ok(()),
    }
}

fn validate_dependencies_unique(chart: &Chart) -> Result<(), String> {
    let mut seen = HashSet::new();
    for dependency in &chart.metadata.dependencies {
        let name = dependency.effective_name();
        if !seen.insert(name) {
            return Err(format!("multiple dependencies with name or alias '{name}'"));
        }
    }
    Ok(())
}

/// Every declared dependency must have a matching subchart in `charts/`.
fn validate_dependencies_in_charts_dir(chart: &Chart) -> Result<(), String> {
    let present: HashSet<&str> = chart
        .subcharts
        .iter()
        .filter_map(|sub| match sub {
            Subchart::Loaded(c) => Some(c.name()),
            Subchart::Failed { .. } => None,
        })
        .collect();

    let missing: Vec<&str> = chart
        .metadata
        .dependencies
        .iter()
        .map(|d| d.effective_name())
        .filter(|name| !present.contains(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "chart directory is missing these dependencies: {}",
            missing.join(", ")
        ))
    }
}

/// Every subchart in `charts/` must be declared in the manifest.
fn validate_dependencies_in_metadata(chart: &Chart) -> Result<(), String> {
    let declared: HashSet<&str> = chart
        .metadata
        .dependencies
        .iter()
        .map(|d| d.effective_name())
        .collect();

    let undeclared: Vec<&str> = chart
        .subcharts
        .iter()
        .filter_map(|sub| match sub {
            Subchart::Loaded(c) => Some(c.name()),
            Subchart::Failed { .. } => None,
        })
        .filter(|name| !declared.contains(name))
        .collect();

    if undeclared.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "chart metadata is missing these dependencies: {}",
            undeclared.join(", ")
        ))
    }
}

/// Declared dependencies and lock entries must agree by name, both ways.
fn validate_lock(linter: &mut Linter, chart: &Chart) {
    let Some(lock) = &chart.lock else {
        return;
    };

    let locked: HashSet<&str> = lock.dependencies.iter().map(|d| d.name.as_str()).collect();
    let declared: HashSet<&str> = chart
        .metadata
        .dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    for dependency in &chart.metadata.dependencies {
        if !locked.contains(dependency.name.as_str()) {
            linter.run_linter_rule(
                Severity::Error,
                "",
                Err(format!(
                    "dependency '{}' in Chart.yaml is missing from Chart.lock",
                    dependency.name
                )),
            );
        }
    }
    for entry in &lock.dependencies {
        if !declared.contains(entry.name.as_str()) {
            linter.run_linter_rule(
                Severity::Error,
                "",
                Err(format!(
                    "dependency '{}' is present in Chart.lock but not declared in Chart.yaml",
                    entry.name
                )),
            );
        }
    }
}

#[cfg(test)]
#[path = "dependencies_tests.rs"]
mod tests;
