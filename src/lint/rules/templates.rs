//! Template-rendering rule group.
//!
//! Renders every manifest template against the merged values and a
//! synthetic release context, then parses the rendered output as YAML
//! documents. A malformed delimiter surfaces as exactly one Error naming
//! the offending character; deprecated Kubernetes API shapes surface as
//! Warnings and never block linting.
//!
//! Callers must wrap this group's invocation with the timeout guard: the
//! rendering collaborator is the one operation whose failure mode is
//! "hang" rather than "reject".

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::chart::{self, Chart};
use crate::k8s;
use crate::lint::linter::Linter;
use crate::lint::message::Severity;
use crate::lint::runner::LintOptions;
use crate::render::{self, ChartInfo, Context, Release};

/// Path reported for group-wide template findings.
const TEMPLATES_PATH: &str = "templates/";

/// Release name used for the synthetic render context.
const RELEASE_NAME: &str = "test-release";

/// RFC 1123 subdomain shape required of Kubernetes object names.
static OBJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("object name pattern is valid")
});

/// Run the template validators against the chart.
pub fn templates(
    linter: &mut Linter,
    chart: &Chart,
    overlay: &Mapping,
    namespace: &str,
    options: &LintOptions,
) {
    if chart.metadata.is_library() {
        // Library charts have no renderable manifests.
        return;
    }

    if !chart.has_templates_dir {
        linter.run_linter_rule(
            Severity::Warning,
            TEMPLATES_PATH,
            Err("directory does not exist".to_string()),
        );
        return;
    }

    let ctx = build_context(chart, overlay, namespace);
    let rendered = match render::render_chart(&chart.templates, &ctx) {
        Ok(rendered) => rendered,
        Err(e) => {
            linter.run_linter_rule(Severity::Error, TEMPLATES_PATH, Err(e.to_string()));
            return;
        }
    };

    for file in &rendered {
        if file.content.trim().is_empty() {
            continue;
        }
        check_rendered_file(linter, &file.name, &file.content, options);
    }
}

fn build_context(chart: &Chart, overlay: &Mapping, namespace: &str) -> Context {
    // An unparseable values file is the values group's finding; render
    // with the overlay alone in that case.
    let defaults = chart
        .raw_values
        .as_deref()
        .and_then(|raw| chart::parse(raw).ok())
        .unwrap_or(Value::Null);
    let values = chart::coalesce(chart, &defaults, overlay);

    Context {
        values,
        release: Release {
            name: RELEASE_NAME.to_string(),
            namespace: namespace.to_string(),
            service: "Helm".to_string(),
        },
        chart: ChartInfo {
            name: chart.name().to_string(),
            version: chart.metadata.version_text().unwrap_or_default().to_string(),
            app_version: chart
                .metadata
                .app_version
                .as_ref()
                .map(|s| s.text().to_string())
                .unwrap_or_default(),
        },
    }
}

/// The fields of a rendered manifest the validators care about.
#[derive(Debug, Deserialize)]
struct ManifestHead {
    #[serde(rename = "apiVersion")]
    api_version: Option<String>,
    kind: Option<String>,
    metadata: Option<ManifestMetadata>,
}

#[derive(Debug, Deserialize)]
struct ManifestMetadata {
    name: Option<String>,
}

fn check_rendered_file(linter: &mut Linter, name: &str, content: &str, options: &LintOptions) {
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                linter.run_linter_rule(
                    Severity::Error,
                    name,
                    Err(format!("unable to parse YAML: {e}")),
                );
                return;
            }
        };
        if value.is_null() {
            continue;
        }
        check_document(linter, name, &value, options);
    }
}

fn check_document(linter: &mut Linter, name: &str, value: &Value, options: &LintOptions) {
    let Ok(head) = serde_yaml::from_value::<ManifestHead>(value.clone()) else {
        return;
    };

    if let Some(object_name) = head.metadata.as_ref().and_then(|m| m.name.as_deref()) {
        linter.run_linter_rule(Severity::Error, name, validate_object_name(object_name));
    }

    if let (Some(api_version), Some(kind)) = (head.api_version.as_deref(), head.kind.as_deref())
        && let Some(deprecation) = k8s::deprecation_for(api_version, kind, options.kubernetes_version)
    {
        linter.run_linter_rule(
            Severity::Warning,
            name,
            Err(format!(
                "{api_version} {kind} is deprecated in Kubernetes {} and removed in {}, use {}",
                deprecation.deprecated_in, deprecation.removed_in, deprecation.replacement
            )),
        );
    }
}

fn validate_object_name(object_name: &str) -> Result<(), String> {
    if object_name.len() <= 253 && OBJECT_NAME_RE.is_match(object_name) {
        Ok(())
    } else {
        Err(format!(
            "object name does not conform to Kubernetes naming requirements: \"{object_name}\""
        ))
    }
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
