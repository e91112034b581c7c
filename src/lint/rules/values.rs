//! Values rule group.
//!
//! The raw values document must strictly parse (duplicate keys are data
//! errors, not silent overwrites). When the chart ships a values schema and
//! schema validation is not skipped, the merged values are checked against
//! it. The merge materializes import-values entries first, so a key
//! supplied by a subchart import is never reported as missing.

use serde_yaml::{Mapping, Value};

use crate::chart::{self, Chart, SCHEMA_NAME, VALUES_NAME};
use crate::lint::linter::Linter;
use crate::lint::message::Severity;
use crate::lint::runner::LintOptions;
use crate::schema::SchemaValidator;

/// Run the values validators against the chart.
pub fn values(linter: &mut Linter, chart: &Chart, overlay: &Mapping, options: &LintOptions) {
    let Some(raw) = &chart.raw_values else {
        // Values are optional; nothing to check.
        return;
    };

    let defaults = match chart::parse(raw) {
        Ok(value) => value,
        Err(e) => {
            linter.run_linter_rule(
                Severity::Error,
                VALUES_NAME,
                Err(format!("unable to parse YAML: {e}")),
            );
            return;
        }
    };

    if options.skip_schema_validation {
        return;
    }
    let Some(schema_text) = &chart.schema else {
        return;
    };

    let merged = chart::coalesce(chart, &defaults, overlay);
    validate_against_schema(linter, schema_text, &merged);
}

fn validate_against_schema(linter: &mut Linter, schema_text: &str, merged: &Mapping) {
    let validator = match SchemaValidator::new(schema_text) {
        Ok(validator) => validator,
        Err(e) => {
            linter.run_linter_rule(Severity::Error, SCHEMA_NAME, Err(e.to_string()));
            return;
        }
    };

    match validator.validate(&Value::Mapping(merged.clone())) {
        Ok(violations) => {
            for violation in violations {
                linter.run_linter_rule(Severity::Error, VALUES_NAME, Err(violation.to_string()));
            }
        }
        Err(e) => {
            linter.run_linter_rule(Severity::Error, VALUES_NAME, Err(e.to_string()));
        }
    }
}

#[cfg(test)]
#[path = "values_tests.rs"]
mod tests;
