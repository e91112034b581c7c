use std::path::PathBuf;
use std::time::Duration;

use super::*;

#[test]
fn error_display_config() {
    let err = ChartGuardError::Config("invalid kube version".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid kube version");
}

#[test]
fn error_display_file_read() {
    let err = ChartGuardError::FileRead {
        path: PathBuf::from("values.yaml"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
    };
    assert!(err.to_string().contains("values.yaml"));
}

#[test]
fn error_display_values_parse() {
    let err = ChartGuardError::ValuesParse {
        path: PathBuf::from("overrides.yaml"),
        reason: "document is not a mapping".to_string(),
    };
    assert!(err.to_string().contains("overrides.yaml"));
    assert!(err.to_string().contains("not a mapping"));
}

#[test]
fn error_display_render_timeout() {
    let err = ChartGuardError::RenderTimeout {
        chart_dir: PathBuf::from("charts/web"),
        timeout: Duration::from_secs(3),
    };
    assert_eq!(
        err.to_string(),
        "template rendering for chart 'charts/web' did not complete within 3s"
    );
}
