#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Creates a temporary directory holding chart fixtures for integration
/// tests.
pub struct ChartFixture {
    pub dir: TempDir,
}

impl ChartFixture {
    /// Creates a new fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the path of a chart created under the fixture root.
    pub fn chart_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Creates a complete, well-formed chart that lints clean.
    pub fn create_good_chart(&self, name: &str) -> PathBuf {
        self.create_file(
            &format!("{name}/Chart.yaml"),
            &format!(
                r#"apiVersion: v2
name: {name}
version: 0.1.0
appVersion: "1.16.0"
description: A well-formed chart
icon: https://example.com/icon.png
sources:
  - https://github.com/example/{name}
maintainers:
  - name: John Snow
    email: john@winterfell.com
"#
            ),
        );
        self.create_file(
            &format!("{name}/values.yaml"),
            "replicaCount: 1\nimage:\n  repository: nginx\n  tag: \"1.25\"\nservice:\n  enabled: true\n  port: 80\n",
        );
        self.create_file(
            &format!("{name}/templates/_helpers.tpl"),
            "{{- define \"chart.labels\" -}}\napp: placeholder\n{{- end -}}\n",
        );
        self.create_file(
            &format!("{name}/templates/deployment.yaml"),
            r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ .Release.Name }}-{{ .Chart.Name }}
  namespace: {{ .Release.Namespace }}
spec:
  replicas: {{ .Values.replicaCount | default 1 }}
  template:
    spec:
      containers:
        - name: {{ .Chart.Name }}
          image: {{ .Values.image.repository }}:{{ .Values.image.tag | default "latest" }}
"#,
        );
        self.create_file(
            &format!("{name}/templates/service.yaml"),
            r#"{{ if .Values.service.enabled }}
apiVersion: v1
kind: Service
metadata:
  name: {{ .Release.Name }}-{{ .Chart.Name }}
spec:
  ports:
    - port: {{ .Values.service.port }}
{{ end }}
"#,
        );
        self.create_file(
            &format!("{name}/templates/NOTES.txt"),
            "Deployed {{ .Release.Name }}.\n",
        );
        self.chart_path(name)
    }

    /// Creates the canonical bad chart: missing name, apiVersion, and icon,
    /// an invalid version, and v1-incompatible fields.
    pub fn create_bad_chart(&self, name: &str) -> PathBuf {
        self.create_file(
            &format!("{name}/Chart.yaml"),
            r#"description: A malformed chart
version: 0.0.0.0
home: ""
type: application
dependencies:
  - name: mariadb
    version: 5.x.x
    repository: https://charts.example.com/stable/
"#,
        );
        self.create_file(&format!("{name}/values.yaml"), "replicaCount: 1\n");
        self.chart_path(name)
    }
}
