mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::ChartFixture;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("chart-guard"))
}

#[test]
fn clean_chart_exits_success() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_good_chart("goodchart");

    cmd()
        .arg(&dir)
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"))
        .stdout(predicate::str::contains("0 chart(s) failed"));
}

#[test]
fn bad_chart_exits_with_lint_errors() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_bad_chart("badchart");

    cmd()
        .arg(&dir)
        .arg("--color")
        .arg("never")
        .assert()
        .code(1) // EXIT_LINT_ERRORS
        .stdout(predicate::str::contains("[ERROR]"))
        .stdout(predicate::str::contains("name is required"))
        .stdout(predicate::str::contains("1 chart(s) failed"));
}

#[test]
fn warnings_alone_exit_success_unless_strict() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_good_chart("warnchart");
    // Two-component version: lenient passes, strict SemVerV2 warns.
    fixture.create_file(
        "warnchart/Chart.yaml",
        "apiVersion: v2\nname: warnchart\nversion: \"1.0\"\nicon: https://example.com/icon.png\n",
    );

    cmd()
        .arg(&dir)
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("is not a valid SemVerV2"));

    cmd()
        .arg(&dir)
        .arg("--strict")
        .arg("--color")
        .arg("never")
        .assert()
        .code(1);
}

#[test]
fn json_format_emits_parseable_output() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_bad_chart("badchart");

    let output = cmd()
        .arg(&dir)
        .arg("--format")
        .arg("json")
        .output()
        .expect("binary runs");

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is valid JSON");
    assert_eq!(parsed["summary"]["total_charts"], 1);
    assert_eq!(parsed["summary"]["failed"], 1);
    assert!(parsed["summary"]["errors"].as_u64().unwrap() >= 1);
}

#[test]
fn multiple_charts_are_linted_in_order() {
    let fixture = ChartFixture::new();
    let good = fixture.create_good_chart("goodchart");
    let bad = fixture.create_bad_chart("badchart");

    cmd()
        .arg(&good)
        .arg(&bad)
        .arg("--color")
        .arg("never")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 chart(s) linted"))
        .stdout(predicate::str::contains("1 chart(s) failed"));
}

#[test]
fn quiet_mode_lists_only_failing_charts() {
    let fixture = ChartFixture::new();
    let good = fixture.create_good_chart("goodchart");
    let bad = fixture.create_bad_chart("badchart");

    cmd()
        .arg(&good)
        .arg(&bad)
        .arg("--quiet")
        .arg("--color")
        .arg("never")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("badchart"))
        .stdout(predicate::str::contains("goodchart").not());
}

#[test]
fn nonexistent_chart_dir_is_a_lint_error_not_a_crash() {
    cmd()
        .arg("/nonexistent/chart")
        .arg("--color")
        .arg("never")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn missing_values_file_is_a_runtime_error() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_good_chart("goodchart");

    cmd()
        .arg(&dir)
        .arg("-f")
        .arg("/nonexistent/overrides.yaml")
        .assert()
        .code(2) // EXIT_RUN_ERROR
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn values_overlay_is_applied() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_good_chart("goodchart");
    fixture.create_file(
        "goodchart/values.schema.json",
        r#"{"type": "object", "properties": {"replicaCount": {"type": "integer"}}}"#,
    );
    fixture.create_file("overrides.yaml", "replicaCount: not-a-number\n");

    cmd()
        .arg(&dir)
        .arg("-f")
        .arg(fixture.path().join("overrides.yaml"))
        .arg("--color")
        .arg("never")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("replicaCount"));

    // The same chart passes once schema validation is skipped.
    cmd()
        .arg(&dir)
        .arg("-f")
        .arg(fixture.path().join("overrides.yaml"))
        .arg("--skip-schema-validation")
        .arg("--color")
        .arg("never")
        .assert()
        .success();
}

#[test]
fn kube_version_flag_gates_deprecation_warnings() {
    let fixture = ChartFixture::new();
    let dir = fixture.create_good_chart("deprecated");
    fixture.create_file(
        "deprecated/templates/psp.yaml",
        "apiVersion: policy/v1beta1\nkind: PodSecurityPolicy\nmetadata:\n  name: restricted\n",
    );

    cmd()
        .arg(&dir)
        .arg("--kube-version")
        .arg("1.25")
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("[WARNING]"))
        .stdout(predicate::str::contains("deprecated"));

    cmd()
        .arg(&dir)
        .arg("--kube-version")
        .arg("1.20")
        .arg("--color")
        .arg("never")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}
