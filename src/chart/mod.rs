mod loader;
mod metadata;
mod values;

pub use loader::{
    CHARTFILE_NAME, CHARTS_DIR, Chart, LoadError, Lock, LockDependency, SCHEMA_NAME, Subchart,
    TEMPLATES_DIR, TemplateFile, VALUES_NAME, load,
};
pub use metadata::{
    ApiVersion, ChartType, Dependency, ImportValues, Maintainer, Metadata, RawScalar, ScalarKind,
};
pub use values::{coalesce, get_path, merge_maps, parse, scoped_overlay};
