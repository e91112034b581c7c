use std::path::PathBuf;

use crate::chart::{
    ApiVersion, Dependency, Lock, LockDependency, Metadata, RawScalar, ScalarKind,
};
use crate::lint::Message;
use crate::lint::linter::Linter;

use super::*;

fn loadable_metadata() -> Metadata {
    Metadata {
        name: Some("mychart".to_string()),
        api_version: Some(ApiVersion::V2),
        version: Some(RawScalar::new("0.1.0", ScalarKind::String)),
        ..Metadata::default()
    }
}

fn chart_of(metadata: Metadata) -> Chart {
    Chart {
        dir: PathBuf::from("testdata/mychart"),
        metadata,
        raw_values: None,
        schema: None,
        lock: None,
        has_templates_dir: false,
        templates: Vec::new(),
        subcharts: Vec::new(),
    }
}

fn subchart(name: &str) -> Subchart {
    Subchart::Loaded(Chart {
        dir: PathBuf::from("testdata/mychart/charts").join(name),
        metadata: Metadata {
            name: Some(name.to_string()),
            ..Metadata::default()
        },
        raw_values: None,
        schema: None,
        lock: None,
        has_templates_dir: false,
        templates: Vec::new(),
        subcharts: Vec::new(),
    })
}

fn dependency(name: &str) -> Dependency {
    Dependency {
        name: name.to_string(),
        ..Dependency::default()
    }
}

fn run(chart: &Chart) -> Vec<Message> {
    let mut linter = Linter::new(chart.dir.clone());
    dependencies(&mut linter, chart);
    linter.messages
}

#[test]
fn loadable_chart_without_dependencies_is_clean() {
    assert!(run(&chart_of(loadable_metadata())).is_empty());
}

#[test]
fn strictly_invalid_metadata_reports_unable_to_load_chart() {
    let chart = chart_of(Metadata {
        version: Some(RawScalar::new("0.0.0.0", ScalarKind::String)),
        ..loadable_metadata()
    });
    let messages = run(&chart);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].message.contains("unable to load chart"));
    assert!(messages[0].path.is_empty());
}

#[test]
fn unloadable_chart_short_circuits_the_rest_of_the_group() {
    // Duplicate dependencies would normally fire, but the strict-load
    // failure gates everything behind it.
    let chart = chart_of(Metadata {
        name: None,
        dependencies: vec![dependency("redis"), dependency("redis")],
        ..loadable_metadata()
    });
    let messages = run(&chart);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].message.contains("unable to load chart"));
}

#[test]
fn duplicate_dependency_names_are_an_error() {
    let chart = Chart {
        subcharts: vec![subchart("redis")],
        ..chart_of(Metadata {
            dependencies: vec![dependency("redis"), dependency("redis")],
            ..loadable_metadata()
        })
    };
    let messages = run(&chart);
    assert!(
        messages
            .iter()
            .any(|m| m.message.contains("multiple dependencies with name or alias 'redis'"))
    );
}

#[test]
fn alias_collisions_count_as_duplicates() {
    let aliased = Dependency {
        alias: Some("redis".to_string()),
        ..dependency("redis-ha")
    };
    let chart = Chart {
        subcharts: vec![subchart("redis")],
        ..chart_of(Metadata {
            dependencies: vec![dependency("redis"), aliased],
            ..loadable_metadata()
        })
    };
    let messages = run(&chart);
    assert!(
        messages
            .iter()
            .any(|m| m.message.contains("multiple dependencies with name or alias 'redis'"))
    );
}

#[test]
fn declared_dependency_without_a_subchart_is_an_error() {
    let chart = chart_of(Metadata {
        dependencies: vec![dependency("redis")],
        ..loadable_metadata()
    });
    let messages = run(&chart);
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0]
            .message
            .contains("chart directory is missing these dependencies: redis")
    );
}

#[test]
fn undeclared_subchart_is_an_error() {
    let chart = Chart {
        subcharts: vec![subchart("stowaway")],
        ..chart_of(loadable_metadata())
    };
    let messages = run(&chart);
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0]
            .message
            .contains("chart metadata is missing these dependencies: stowaway")
    );
}

#[test]
fn declared_and_present_dependency_is_clean() {
    let chart = Chart {
        subcharts: vec![subchart("redis")],
        ..chart_of(Metadata {
            dependencies: vec![dependency("redis")],
            ..loadable_metadata()
        })
    };
    assert!(run(&chart).is_empty());
}

#[test]
fn v1_charts_skip_the_charts_dir_cross_checks() {
    let chart = chart_of(Metadata {
        api_version: Some(ApiVersion::V1),
        ..loadable_metadata()
    });
    assert!(run(&chart).is_empty());
}

#[test]
fn lock_mismatches_are_reported_both_ways() {
    let chart = Chart {
        subcharts: vec![subchart("redis")],
        lock: Some(Lock {
            dependencies: vec![LockDependency {
                name: "postgresql".to_string(),
                version: Some("12.1.0".to_string()),
                repository: None,
            }],
            digest: None,
        }),
        ..chart_of(Metadata {
            dependencies: vec![dependency("redis")],
            ..loadable_metadata()
        })
    };
    let messages = run(&chart);
    assert!(
        messages
            .iter()
            .any(|m| m.message.contains("'redis' in Chart.yaml is missing from Chart.lock"))
    );
    assert!(
        messages.iter().any(|m| m
            .message
            .contains("'postgresql' is present in Chart.lock but not declared in Chart.yaml"))
    );
}

#[test]
fn matching_lock_is_clean() {
    let chart = Chart {
        subcharts: vec![subchart("redis")],
        lock: Some(Lock {
            dependencies: vec![LockDependency {
                name: "redis".to_string(),
                version: Some("17.0.0".to_string()),
                repository: None,
            }],
            digest: Some("sha256:abc".to_string()),
        }),
        ..chart_of(Metadata {
            dependencies: vec![dependency("redis")],
            ..loadable_metadata()
        })
    };
    assert!(run(&chart).is_empty());
}
