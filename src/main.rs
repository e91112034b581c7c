use std::fs;
use std::path::Path;

use clap::Parser;

use chart_guard::cli::{Cli, ColorChoice};
use chart_guard::k8s::K8sVersion;
use chart_guard::lint::{self, LintOptions};
use chart_guard::output::{
    ChartReport, ColorMode, JsonFormatter, OutputFormat, OutputFormatter, TextFormatter,
};
use chart_guard::{ChartGuardError, EXIT_LINT_ERRORS, EXIT_RUN_ERROR, EXIT_SUCCESS};

const fn color_choice_to_mode(choice: ColorChoice) -> ColorMode {
    match choice {
        ColorChoice::Auto => ColorMode::Auto,
        ColorChoice::Always => ColorMode::Always,
        ColorChoice::Never => ColorMode::Never,
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let exit_code = run_lint(&cli);
    std::process::exit(exit_code);
}

fn run_lint(cli: &Cli) -> i32 {
    match run_lint_impl(cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_RUN_ERROR
        }
    }
}

fn run_lint_impl(cli: &Cli) -> chart_guard::Result<i32> {
    // 1. Load the values overlay
    let overlay = load_overlay(cli.values.as_deref())?;

    // 2. Build lint options from CLI arguments
    let options = build_options(cli)?;

    // 3. Lint each chart directory
    let mut reports = Vec::new();
    for chart_dir in &cli.charts {
        let result = lint::run_all(chart_dir, &overlay, &cli.namespace, &options)?;
        reports.push(ChartReport {
            chart_dir: chart_dir.clone(),
            result,
        });
    }

    // 4. Format and write output
    let output = format_output(cli, &reports)?;
    write_output(cli.output.as_deref(), &output)?;

    // 5. Map severities to the exit code
    let has_errors = reports.iter().any(|r| r.result.has_errors());
    let has_warnings = reports.iter().any(|r| r.result.has_warnings());

    if has_errors || (cli.strict && has_warnings) {
        Ok(EXIT_LINT_ERRORS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn load_overlay(values_path: Option<&Path>) -> chart_guard::Result<serde_yaml::Mapping> {
    let Some(path) = values_path else {
        return Ok(serde_yaml::Mapping::new());
    };

    let text = fs::read_to_string(path).map_err(|source| ChartGuardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_yaml::from_str::<serde_yaml::Value>(&text) {
        Ok(serde_yaml::Value::Mapping(map)) => Ok(map),
        Ok(serde_yaml::Value::Null) => Ok(serde_yaml::Mapping::new()),
        Ok(_) => Err(ChartGuardError::ValuesParse {
            path: path.to_path_buf(),
            reason: "document is not a mapping".to_string(),
        }),
        Err(e) => Err(ChartGuardError::ValuesParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn build_options(cli: &Cli) -> chart_guard::Result<LintOptions> {
    let mut options =
        LintOptions::default().with_skip_schema_validation(cli.skip_schema_validation);

    if let Some(raw) = &cli.kube_version {
        let version = K8sVersion::parse(raw).ok_or_else(|| {
            ChartGuardError::Config(format!(
                "invalid --kube-version '{raw}', expected MAJOR.MINOR (e.g. 1.30)"
            ))
        })?;
        options = options.with_kubernetes_version(version);
    }

    Ok(options)
}

fn format_output(cli: &Cli, reports: &[ChartReport]) -> chart_guard::Result<String> {
    match cli.format {
        OutputFormat::Text => TextFormatter::new(color_choice_to_mode(cli.color))
            .with_quiet(cli.quiet)
            .format(reports),
        OutputFormat::Json => JsonFormatter.format(reports),
    }
}

fn write_output(output_path: Option<&Path>, content: &str) -> chart_guard::Result<()> {
    if let Some(path) = output_path {
        fs::write(path, content)?;
    } else {
        print!("{content}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
