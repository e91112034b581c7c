//! Chart manifest model.
//!
//! The manifest is mapped by hand from raw YAML nodes instead of serde so
//! that scalar type information survives: a `version: 7.2445e+06` must be
//! reportable both as a type mismatch (not a string) and as an invalid
//! version, using the scalar's source text.

use yaml_rust2::Yaml;

/// Chart API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiVersion {
    /// Legacy charts
    V1,
    /// Current charts
    V2,
    /// Unrecognized value, kept verbatim for reporting
    Unknown(String),
}

impl ApiVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::Unknown(s) => s,
        }
    }
}

/// Chart type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartType {
    /// Standard application chart
    Application,
    /// Library chart (templates are never rendered directly)
    Library,
    /// Unrecognized value, kept verbatim for reporting
    Unknown(String),
}

/// Chart maintainer entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Maintainer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

/// One `import-values` entry on a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportValues {
    /// `- child: path / parent: path` pair
    Child { child: String, parent: String },
    /// `- key` shorthand for `exports.key`
    Exports(String),
}

/// Inline dependency entry from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub repository: Option<String>,
    pub condition: Option<String>,
    pub alias: Option<String>,
    pub import_values: Vec<ImportValues>,
}

impl Dependency {
    /// The name the dependency's subchart appears under in `charts/`.
    #[must_use]
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// YAML scalar type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Bool,
    Other,
}

/// A scalar field kept with its source text and type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScalar {
    text: String,
    kind: ScalarKind,
}

impl RawScalar {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn from_yaml(node: &Yaml) -> Option<Self> {
        match node {
            Yaml::String(s) => Some(Self {
                text: s.clone(),
                kind: ScalarKind::String,
            }),
            // Real keeps the scalar's source text (e.g. "7.2445e+06")
            Yaml::Real(s) => Some(Self {
                text: s.clone(),
                kind: ScalarKind::Number,
            }),
            Yaml::Integer(i) => Some(Self {
                text: i.to_string(),
                kind: ScalarKind::Number,
            }),
            Yaml::Boolean(b) => Some(Self {
                text: b.to_string(),
                kind: ScalarKind::Bool,
            }),
            Yaml::Null | Yaml::BadValue => None,
            _ => Some(Self {
                text: String::new(),
                kind: ScalarKind::Other,
            }),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, ScalarKind::String)
    }
}

/// Parsed chart manifest (Chart.yaml).
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub name: Option<String>,
    pub api_version: Option<ApiVersion>,
    pub version: Option<RawScalar>,
    pub app_version: Option<RawScalar>,
    pub kube_version: Option<String>,
    pub description: Option<String>,
    pub chart_type: Option<ChartType>,
    pub icon: Option<String>,
    pub home: Option<String>,
    pub keywords: Vec<String>,
    pub sources: Vec<String>,
    pub maintainers: Vec<Maintainer>,
    pub dependencies: Vec<Dependency>,
    pub deprecated: bool,
}

impl Metadata {
    /// Map a parsed YAML document into the manifest model.
    #[must_use]
    pub fn from_yaml(doc: &Yaml) -> Self {
        Self {
            name: yaml_string(&doc["name"]),
            api_version: yaml_string(&doc["apiVersion"]).map(|s| match s.as_str() {
                "v1" => ApiVersion::V1,
                "v2" => ApiVersion::V2,
                _ => ApiVersion::Unknown(s),
            }),
            version: RawScalar::from_yaml(&doc["version"]),
            app_version: RawScalar::from_yaml(&doc["appVersion"]),
            kube_version: yaml_string(&doc["kubeVersion"]),
            description: yaml_string(&doc["description"]),
            chart_type: yaml_string(&doc["type"]).map(|s| match s.as_str() {
                "application" => ChartType::Application,
                "library" => ChartType::Library,
                _ => ChartType::Unknown(s),
            }),
            icon: yaml_string(&doc["icon"]),
            home: yaml_string(&doc["home"]),
            keywords: yaml_string_list(&doc["keywords"]),
            sources: yaml_string_list(&doc["sources"]),
            maintainers: yaml_maintainers(&doc["maintainers"]),
            dependencies: yaml_dependencies(&doc["dependencies"]),
            deprecated: doc["deprecated"].as_bool().unwrap_or(false),
        }
    }

    /// The version field's text, regardless of its YAML type.
    #[must_use]
    pub fn version_text(&self) -> Option<&str> {
        self.version.as_ref().map(RawScalar::text)
    }

    #[must_use]
    pub fn is_v2(&self) -> bool {
        matches!(self.api_version, Some(ApiVersion::V2))
    }

    #[must_use]
    pub fn is_library(&self) -> bool {
        matches!(self.chart_type, Some(ChartType::Library))
    }
}

fn yaml_string(node: &Yaml) -> Option<String> {
    match node {
        Yaml::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn yaml_string_list(node: &Yaml) -> Vec<String> {
    node.as_vec().map_or_else(Vec::new, |items| {
        items.iter().filter_map(yaml_string).collect()
    })
}

fn yaml_maintainers(node: &Yaml) -> Vec<Maintainer> {
    node.as_vec().map_or_else(Vec::new, |items| {
        items
            .iter()
            .map(|item| Maintainer {
                name: yaml_string(&item["name"]),
                email: yaml_string(&item["email"]),
                url: yaml_string(&item["url"]),
            })
            .collect()
    })
}

fn yaml_dependencies(node: &Yaml) -> Vec<Dependency> {
    node.as_vec().map_or_else(Vec::new, |items| {
        items
            .iter()
            .map(|item| Dependency {
                name: yaml_string(&item["name"]).unwrap_or_default(),
                version: yaml_string(&item["version"]),
                repository: yaml_string(&item["repository"]),
                condition: yaml_string(&item["condition"]),
                alias: yaml_string(&item["alias"]),
                import_values: yaml_import_values(&item["import-values"]),
            })
            .collect()
    })
}

fn yaml_import_values(node: &Yaml) -> Vec<ImportValues> {
    node.as_vec().map_or_else(Vec::new, |items| {
        items
            .iter()
            .filter_map(|item| match item {
                Yaml::String(key) => Some(ImportValues::Exports(key.clone())),
                Yaml::Hash(_) => match (yaml_string(&item["child"]), yaml_string(&item["parent"])) {
                    (Some(child), Some(parent)) => Some(ImportValues::Child { child, parent }),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    })
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
