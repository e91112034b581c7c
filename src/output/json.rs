use serde::Serialize;

use crate::error::Result;

use super::{ChartReport, OutputFormatter};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput {
    summary: Summary,
    charts: Vec<ChartResult>,
}

#[derive(Serialize)]
struct Summary {
    total_charts: usize,
    failed: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
}

#[derive(Serialize)]
struct ChartResult {
    path: String,
    errors: usize,
    warnings: usize,
    infos: usize,
    messages: Vec<JsonMessage>,
}

#[derive(Serialize)]
struct JsonMessage {
    severity: String,
    path: String,
    message: String,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, reports: &[ChartReport]) -> Result<String> {
        let output = JsonOutput {
            summary: Summary {
                total_charts: reports.len(),
                failed: reports.iter().filter(|r| r.result.has_errors()).count(),
                errors: reports.iter().map(|r| r.result.errors).sum(),
                warnings: reports.iter().map(|r| r.result.warnings).sum(),
                infos: reports.iter().map(|r| r.result.infos).sum(),
            },
            charts: reports.iter().map(convert_report).collect(),
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}

fn convert_report(report: &ChartReport) -> ChartResult {
    ChartResult {
        path: report.chart_dir.display().to_string(),
        errors: report.result.errors,
        warnings: report.result.warnings,
        infos: report.result.infos,
        messages: report
            .result
            .messages
            .iter()
            .map(|m| JsonMessage {
                severity: m.severity.as_str().to_string(),
                path: m.path.clone(),
                message: m.message.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
