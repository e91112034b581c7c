//! Lint orchestration.
//!
//! `run_all` resolves the chart tree, lints the top chart and every
//! subchart with its own accumulator, and merges the results
//! deterministically: top chart first, then subcharts in stable directory
//! order, regardless of whether per-chart linting ran in parallel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use rayon::prelude::*;
use serde_yaml::Mapping;

use crate::chart::{self, CHARTFILE_NAME, Chart, LoadError, Subchart};
use crate::error::{ChartGuardError, Result};
use crate::k8s::K8sVersion;
use crate::timeout;

use super::linter::Linter;
use super::message::{Message, Severity};
use super::rules;

/// Bound on one chart's template render+parse step.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(3);

/// Target cluster version when the caller does not pick one.
pub const DEFAULT_KUBERNETES_VERSION: K8sVersion = K8sVersion::new(1, 30);

/// Configuration for one lint run.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Bypass the values-schema validation step.
    pub skip_schema_validation: bool,
    /// Kubernetes version the deprecation checks target.
    pub kubernetes_version: K8sVersion,
    /// Bound on the template-render step, per chart.
    pub render_timeout: Duration,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            skip_schema_validation: false,
            kubernetes_version: DEFAULT_KUBERNETES_VERSION,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }
}

impl LintOptions {
    #[must_use]
    pub const fn with_skip_schema_validation(mut self, skip: bool) -> Self {
        self.skip_schema_validation = skip;
        self
    }

    #[must_use]
    pub const fn with_kubernetes_version(mut self, version: K8sVersion) -> Self {
        self.kubernetes_version = version;
        self
    }

    #[must_use]
    pub const fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }
}

/// The merged outcome of one lint run.
#[derive(Debug, Clone, Default)]
pub struct LintResult {
    pub messages: Vec<Message>,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl LintResult {
    #[must_use]
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let count = |severity| {
            messages
                .iter()
                .filter(|m: &&Message| m.severity == severity)
                .count()
        };
        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
            messages,
        }
    }

    #[must_use]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[must_use]
    pub const fn has_warnings(&self) -> bool {
        self.warnings > 0
    }
}

/// One chart to lint: either a loaded chart with its scoped overlay, or a
/// load failure to report in place.
enum LintJob<'c> {
    Chart { chart: &'c Chart, overlay: Mapping },
    Failed { dir: PathBuf, reason: String },
}

/// Lint a chart directory and, recursively, its subcharts.
///
/// A top-level chart that cannot be loaded at all yields a single Error
/// message and no rule groups run. A broken subchart yields one Error for
/// that subchart without discarding its siblings' findings.
///
/// # Errors
/// The render timeout is the only terminal failure.
pub fn run_all(
    chart_dir: &Path,
    overlay: &Mapping,
    namespace: &str,
    options: &LintOptions,
) -> Result<LintResult> {
    let chart = match chart::load(chart_dir) {
        Ok(chart) => chart,
        Err(e) => {
            let path = match &e {
                LoadError::Metadata { .. } => CHARTFILE_NAME,
                _ => "",
            };
            return Ok(LintResult::from_messages(vec![Message::new(
                Severity::Error,
                path,
                e.to_string(),
            )]));
        }
    };

    let mut jobs = Vec::new();
    flatten(&chart, overlay, &mut jobs);
    debug!(
        "linting {} chart(s) under '{}'",
        jobs.len(),
        chart_dir.display()
    );

    // Charts are independent; rayon's collect preserves job order, so the
    // merged message list is deterministic either way.
    let outcomes: Vec<Result<Vec<Message>>> = jobs
        .par_iter()
        .map(|job| match job {
            LintJob::Chart { chart, overlay } => lint_chart(chart, overlay, namespace, options),
            LintJob::Failed { dir, reason } => {
                let mut linter = Linter::new(dir.clone());
                linter.run_linter_rule(Severity::Error, CHARTFILE_NAME, Err(reason.clone()));
                Ok(linter.messages)
            }
        })
        .collect();

    let mut messages = Vec::new();
    for outcome in outcomes {
        messages.extend(outcome?);
    }
    Ok(LintResult::from_messages(messages))
}

/// Pre-order flatten of the chart tree with per-chart scoped overlays.
fn flatten<'c>(chart: &'c Chart, overlay: &Mapping, jobs: &mut Vec<LintJob<'c>>) {
    let defaults = chart
        .raw_values
        .as_deref()
        .and_then(|raw| chart::parse(raw).ok())
        .unwrap_or(serde_yaml::Value::Null);
    let merged = chart::coalesce(chart, &defaults, overlay);

    jobs.push(LintJob::Chart {
        chart,
        overlay: overlay.clone(),
    });

    for sub in &chart.subcharts {
        match sub {
            Subchart::Loaded(subchart) => {
                let scoped = chart::scoped_overlay(&merged, subchart.name());
                flatten(subchart, &scoped, jobs);
            }
            Subchart::Failed { dir, reason } => {
                jobs.push(LintJob::Failed {
                    dir: dir.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }
}

/// Run the rule groups, in fixed order, against one chart.
fn lint_chart(
    chart: &Chart,
    overlay: &Mapping,
    namespace: &str,
    options: &LintOptions,
) -> Result<Vec<Message>> {
    let mut linter = Linter::new(chart.dir.clone());

    rules::chartfile(&mut linter, chart);
    rules::values(&mut linter, chart, overlay, options);

    // The render collaborator may never return; race it against the
    // deadline and abandon it on timeout.
    let render_chart = chart.clone();
    let render_overlay = overlay.clone();
    let render_namespace = namespace.to_string();
    let render_options = options.clone();
    let rendered = timeout::run_with_timeout(options.render_timeout, move || {
        let mut template_linter = Linter::new(render_chart.dir.clone());
        rules::templates(
            &mut template_linter,
            &render_chart,
            &render_overlay,
            &render_namespace,
            &render_options,
        );
        template_linter.messages
    })
    .map_err(|_| ChartGuardError::RenderTimeout {
        chart_dir: chart.dir.clone(),
        timeout: options.render_timeout,
    })?;
    linter.messages.extend(rendered);

    rules::dependencies(&mut linter, chart);

    Ok(linter.messages)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
