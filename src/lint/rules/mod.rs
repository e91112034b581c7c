mod chartfile;
mod dependencies;
mod templates;
mod values;

pub use chartfile::chartfile;
pub use dependencies::dependencies;
pub use templates::templates;
pub use values::values;
