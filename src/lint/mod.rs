mod linter;
mod message;
pub mod rules;
mod runner;

pub use linter::Linter;
pub use message::{Message, Severity};
pub use runner::{
    DEFAULT_KUBERNETES_VERSION, DEFAULT_RENDER_TIMEOUT, LintOptions, LintResult, run_all,
};
