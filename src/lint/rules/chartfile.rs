//! Manifest (Chart.yaml) rule group.
//!
//! Field validators run in a fixed order and never short-circuit: a chart
//! missing `name`, `apiVersion`, and carrying a bad `version` reports all
//! three in one pass. The strict SemVerV2 check runs last and is
//! independent of the lenient check; both can fire for the same value.

use std::sync::LazyLock;

use regex::Regex;

use crate::chart::{ApiVersion, CHARTFILE_NAME, Chart, Maintainer, Metadata};
use crate::lint::linter::Linter;
use crate::lint::message::Severity;
use crate::version;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$")
        .expect("email pattern is valid")
});

/// Run every manifest validator against the chart.
pub fn chartfile(linter: &mut Linter, chart: &Chart) {
    let metadata = &chart.metadata;

    linter.run_linter_rule(Severity::Error, CHARTFILE_NAME, validate_name(chart));
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_api_version(metadata),
    );
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_version_type(metadata),
    );
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_version_lenient(metadata),
    );
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_app_version_type(metadata),
    );
    linter.run_linter_rule(
        Severity::Info,
        CHARTFILE_NAME,
        validate_icon_presence(metadata),
    );
    linter.run_linter_rule(Severity::Error, CHARTFILE_NAME, validate_icon_url(metadata));
    for source in &metadata.sources {
        linter.run_linter_rule(Severity::Error, CHARTFILE_NAME, validate_source_url(source));
    }
    for maintainer in &metadata.maintainers {
        linter.run_linter_rule(
            Severity::Error,
            CHARTFILE_NAME,
            validate_maintainer(maintainer),
        );
    }
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_type_for_api_version(metadata),
    );
    linter.run_linter_rule(
        Severity::Error,
        CHARTFILE_NAME,
        validate_dependencies_for_api_version(metadata),
    );
    linter.run_linter_rule(
        Severity::Warning,
        CHARTFILE_NAME,
        validate_version_strict(metadata),
    );
}

fn validate_name(chart: &Chart) -> Result<(), String> {
    match chart.metadata.name.as_deref() {
        None | Some("") => Err("name is required".to_string()),
        Some(name) if name != chart.dir_name() => Err(format!(
            "directory name ({}) and chart name ({name}) must be the same",
            chart.dir_name()
        )),
        Some(_) => Ok(()),
    }
}

fn validate_api_version(metadata: &Metadata) -> Result<(), String> {
    match metadata.api_version {
        Some(ApiVersion::V1 | ApiVersion::V2) => Ok(()),
        _ => Err("apiVersion is required. The value must be either \"v1\" or \"v2\"".to_string()),
    }
}

fn validate_version_type(metadata: &Metadata) -> Result<(), String> {
    match &metadata.version {
        Some(scalar) if !scalar.is_string() => Err("version should be of type string".to_string()),
        _ => Ok(()),
    }
}

fn validate_version_lenient(metadata: &Metadata) -> Result<(), String> {
    match metadata.version_text() {
        None | Some("") => Err("version is required".to_string()),
        Some(text) => version::parse_lenient(text)
            .map_err(|_| format!("version '{text}' is not a valid SemVer")),
    }
}

fn validate_app_version_type(metadata: &Metadata) -> Result<(), String> {
    match &metadata.app_version {
        Some(scalar) if !scalar.is_string() => {
            Err("appVersion should be of type string".to_string())
        }
        _ => Ok(()),
    }
}

fn validate_icon_presence(metadata: &Metadata) -> Result<(), String> {
    match metadata.icon.as_deref() {
        None | Some("") => Err("icon is recommended".to_string()),
        Some(_) => Ok(()),
    }
}

fn validate_icon_url(metadata: &Metadata) -> Result<(), String> {
    match metadata.icon.as_deref() {
        Some(icon) if !icon.is_empty() && !is_absolute_url(icon) => {
            Err(format!("invalid icon URL '{icon}'"))
        }
        _ => Ok(()),
    }
}

fn validate_source_url(source: &str) -> Result<(), String> {
    if is_absolute_url(source) {
        Ok(())
    } else {
        Err(format!("invalid source URL '{source}'"))
    }
}

fn validate_maintainer(maintainer: &Maintainer) -> Result<(), String> {
    let name = match maintainer.name.as_deref() {
        None | Some("") => return Err("each maintainer requires a name".to_string()),
        Some(name) => name,
    };
    if let Some(email) = maintainer.email.as_deref()
        && !email.is_empty()
        && !EMAIL_RE.is_match(email)
    {
        return Err(format!("invalid email '{email}' for maintainer '{name}'"));
    }
    if let Some(url) = maintainer.url.as_deref()
        && !url.is_empty()
        && !is_absolute_url(url)
    {
        return Err(format!("invalid maintainer URL '{url}'"));
    }
    Ok(())
}

fn validate_type_for_api_version(metadata: &Metadata) -> Result<(), String> {
    if metadata.chart_type.is_some() && !metadata.is_v2() {
        return Err(format!(
            "chart type is not valid in apiVersion '{}'. It is valid in apiVersion 'v2'",
            api_version_text(metadata)
        ));
    }
    Ok(())
}

fn validate_dependencies_for_api_version(metadata: &Metadata) -> Result<(), String> {
    if !metadata.dependencies.is_empty() && !metadata.is_v2() {
        return Err(format!(
            "dependencies are not valid in the Chart file with apiVersion '{}'. They are valid in apiVersion 'v2'",
            api_version_text(metadata)
        ));
    }
    Ok(())
}

fn validate_version_strict(metadata: &Metadata) -> Result<(), String> {
    let text = metadata.version_text().unwrap_or("");
    version::parse_strict(text).map_err(|_| format!("version '{text}' is not a valid SemVerV2"))
}

fn api_version_text(metadata: &Metadata) -> &str {
    metadata
        .api_version
        .as_ref()
        .map_or("", ApiVersion::as_str)
}

/// Absolute HTTP/HTTPS URL with a non-empty host.
pub(crate) fn is_absolute_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    match rest {
        Some(host_and_path) => {
            let host = host_and_path.split('/').next().unwrap_or_default();
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "chartfile_tests.rs"]
mod tests;
