use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::output::OutputFormat;

/// Color output control
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal capability
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "chart-guard")]
#[command(author, version, about = "Helm chart linter - validate charts before publishing")]
#[command(long_about = "Lints Helm chart directories against structural, semantic, and \
    best-practice rules.\n\n\
    Exit codes:\n  \
    0 - No errors found\n  \
    1 - Lint errors found (or warnings with --strict)\n  \
    2 - Configuration or runtime error")]
pub struct Cli {
    /// Chart directories to lint
    #[arg(default_value = ".")]
    pub charts: Vec<PathBuf>,

    /// Values file merged over each chart's defaults
    #[arg(short = 'f', long)]
    pub values: Option<PathBuf>,

    /// Namespace injected into the synthetic release context
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Kubernetes version targeted by deprecation checks (e.g. 1.30)
    #[arg(long)]
    pub kube_version: Option<String>,

    /// Skip values.schema.json validation
    #[arg(long)]
    pub skip_schema_validation: bool,

    /// Treat warnings as failures (exit code 1)
    #[arg(long)]
    pub strict: bool,

    /// Output format [possible values: text, json]
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only list charts with errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorChoice,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
