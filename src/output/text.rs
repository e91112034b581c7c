use std::fmt::Write;

use crate::error::Result;
use crate::lint::Severity;

use super::{ChartReport, OutputFormatter};

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Auto-detect: use colors if stdout is a TTY and `NO_COLOR` is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// ANSI color codes
mod ansi {
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RESET: &str = "\x1b[0m";
}

pub struct TextFormatter {
    use_colors: bool,
    quiet: bool,
}

impl TextFormatter {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self {
            use_colors: Self::should_use_colors(mode),
            quiet: false,
        }
    }

    /// In quiet mode only failing charts are listed.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn should_use_colors(mode: ColorMode) -> bool {
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                // Respect NO_COLOR environment variable
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                std::io::IsTerminal::is_terminal(&std::io::stdout())
            }
        }
    }

    fn colorize(&self, text: &str, severity: Severity) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        let color = match severity {
            Severity::Error => ansi::RED,
            Severity::Warning => ansi::YELLOW,
            Severity::Info => ansi::CYAN,
        };
        format!("{color}{text}{}", ansi::RESET)
    }

    fn format_report(&self, report: &ChartReport, output: &mut String) {
        let _ = writeln!(output, "==> Linting {}", report.chart_dir.display());
        for message in &report.result.messages {
            let tag = self.colorize(&format!("[{}]", message.severity), message.severity);
            if message.path.is_empty() {
                let _ = writeln!(output, "{tag} {}", message.message);
            } else {
                let _ = writeln!(output, "{tag} {}: {}", message.path, message.message);
            }
        }
        if report.result.messages.is_empty() {
            output.push_str("No issues found\n");
        }
        output.push('\n');
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, reports: &[ChartReport]) -> Result<String> {
        let mut output = String::new();

        for report in reports {
            if self.quiet && !report.result.has_errors() {
                continue;
            }
            self.format_report(report, &mut output);
        }

        let failed = reports.iter().filter(|r| r.result.has_errors()).count();
        let errors: usize = reports.iter().map(|r| r.result.errors).sum();
        let warnings: usize = reports.iter().map(|r| r.result.warnings).sum();
        let _ = writeln!(
            output,
            "{} chart(s) linted, {} chart(s) failed, {errors} error(s), {warnings} warning(s)",
            reports.len(),
            failed
        );

        Ok(output)
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
