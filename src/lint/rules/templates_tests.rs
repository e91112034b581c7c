use std::path::PathBuf;

use serde_yaml::Mapping;

use crate::chart::{ChartType, Metadata, RawScalar, ScalarKind, TemplateFile};
use crate::k8s::K8sVersion;
use crate::lint::Message;
use crate::lint::linter::Linter;
use crate::lint::message::Severity;
use crate::lint::runner::LintOptions;

use super::*;

fn chart_with_templates(templates: Vec<TemplateFile>) -> Chart {
    Chart {
        dir: PathBuf::from("testdata/mychart"),
        metadata: Metadata {
            name: Some("mychart".to_string()),
            version: Some(RawScalar::new("0.1.0", ScalarKind::String)),
            ..Metadata::default()
        },
        raw_values: None,
        schema: None,
        lock: None,
        has_templates_dir: true,
        templates,
        subcharts: Vec::new(),
    }
}

fn template(name: &str, data: &str) -> TemplateFile {
    TemplateFile {
        name: name.to_string(),
        data: data.to_string(),
    }
}

fn run(chart: &Chart, options: &LintOptions) -> Vec<Message> {
    let mut linter = Linter::new(chart.dir.clone());
    templates(&mut linter, chart, &Mapping::new(), "testns", options);
    linter.messages
}

#[test]
fn well_formed_template_produces_no_findings() {
    let chart = chart_with_templates(vec![template(
        "templates/cm.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ .Release.Name }}-config\n  namespace: {{ .Release.Namespace }}\n",
    )]);
    assert!(run(&chart, &LintOptions::default()).is_empty());
}

#[test]
fn missing_templates_dir_is_a_warning() {
    let chart = Chart {
        has_templates_dir: false,
        ..chart_with_templates(Vec::new())
    };
    let messages = run(&chart, &LintOptions::default());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Warning);
    assert_eq!(messages[0].path, "templates/");
    assert!(messages[0].message.contains("directory does not exist"));
}

#[test]
fn library_charts_are_not_rendered() {
    let chart = Chart {
        has_templates_dir: false,
        metadata: Metadata {
            chart_type: Some(ChartType::Library),
            ..Metadata::default()
        },
        ..chart_with_templates(Vec::new())
    };
    assert!(run(&chart, &LintOptions::default()).is_empty());
}

#[test]
fn malformed_delimiter_is_exactly_one_error() {
    let chart = chart_with_templates(vec![template(
        "templates/bad.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ .Release.Name\n",
    )]);
    let messages = run(&chart, &LintOptions::default());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Error);
    assert_eq!(messages[0].path, "templates/");
    assert!(messages[0].message.contains("invalid character '{'"));
}

#[test]
fn unparseable_rendered_output_is_an_error() {
    let chart = chart_with_templates(vec![template(
        "templates/broken.yaml",
        "kind: [unclosed\n",
    )]);
    let messages = run(&chart, &LintOptions::default());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].path, "templates/broken.yaml");
    assert!(messages[0].message.contains("unable to parse YAML"));
}

#[test]
fn invalid_object_name_is_an_error() {
    let chart = chart_with_templates(vec![template(
        "templates/cm.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: Invalid_Name\n",
    )]);
    let messages = run(&chart, &LintOptions::default());
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0]
            .message
            .contains("object name does not conform to Kubernetes naming requirements")
    );
}

#[test]
fn deprecated_api_shape_is_a_warning_not_an_error() {
    let chart = chart_with_templates(vec![template(
        "templates/psp.yaml",
        "apiVersion: policy/v1beta1\nkind: PodSecurityPolicy\nmetadata:\n  name: restricted\n",
    )]);
    let options =
        LintOptions::default().with_kubernetes_version(K8sVersion::new(1, 25));
    let messages = run(&chart, &options);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Warning);
    assert!(messages[0].message.contains("deprecated"));
    assert!(messages[0].message.contains("policy/v1"));
}

#[test]
fn deprecation_is_version_gated() {
    let chart = chart_with_templates(vec![template(
        "templates/psp.yaml",
        "apiVersion: policy/v1beta1\nkind: PodSecurityPolicy\nmetadata:\n  name: restricted\n",
    )]);
    let options =
        LintOptions::default().with_kubernetes_version(K8sVersion::new(1, 20));
    assert!(run(&chart, &options).is_empty());
}

#[test]
fn empty_rendered_output_is_skipped() {
    let chart = chart_with_templates(vec![template(
        "templates/maybe.yaml",
        "{{ if .Values.enabled }}kind: ConfigMap{{ end }}\n",
    )]);
    assert!(run(&chart, &LintOptions::default()).is_empty());
}

#[test]
fn values_flow_into_the_render() {
    let chart = Chart {
        raw_values: Some("nameOverride: my-app\n".to_string()),
        ..chart_with_templates(vec![template(
            "templates/cm.yaml",
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ .Values.nameOverride }}\n",
        )])
    };
    assert!(run(&chart, &LintOptions::default()).is_empty());
}

#[test]
fn multi_document_output_is_checked_per_document() {
    let chart = chart_with_templates(vec![template(
        "templates/multi.yaml",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: first\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: Second_Bad\n",
    )]);
    let messages = run(&chart, &LintOptions::default());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].message.contains("Second_Bad"));
}
