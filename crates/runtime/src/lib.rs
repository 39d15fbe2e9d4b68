//! Entry points that turn a type name into a generated implementation on disk.

pub mod config;
pub mod emit;
pub mod package;

pub use config::RuntimeConfig;

use implscope_api::{ApiError, TypeSystem};
use implscope_core::{Implementation, Implementor, Result};
use implscope_java::TypeStore;
use std::path::{Path, PathBuf};

/// The minimal JDK plus every description file in `files`, in order.
pub fn load_types(files: &[PathBuf]) -> implscope_java::Result<TypeStore> {
    files
        .iter()
        .try_fold(TypeStore::builder().with_minimal_jdk()?, |builder, file| {
            builder.load_file(file)
        })?
        .build()
}

/// Analyze the type named `type_name`.
pub fn analyze<T: TypeSystem + ?Sized>(ts: &T, type_name: &str) -> Result<Implementation> {
    let root = ts
        .class_by_name(type_name)
        .ok_or_else(|| ApiError::NotFound(type_name.to_string()))?;
    Implementor::new(ts).analyze(root)
}

/// Write `<root>/<package dirs>/<SimpleName>Impl.java` for `type_name`.
pub fn implement<T: TypeSystem + ?Sized>(
    ts: &T,
    type_name: &str,
    root: &Path,
    config: &RuntimeConfig,
) -> Result<PathBuf> {
    let implementation = analyze(ts, type_name)?;
    emit::write_source(root, &implementation, config)
}

/// Generate, compile and archive the implementation of `type_name` into `jar`.
pub fn implement_jar<T: TypeSystem + ?Sized>(
    ts: &T,
    type_name: &str,
    jar: &Path,
    config: &RuntimeConfig,
) -> Result<()> {
    let implementation = analyze(ts, type_name)?;
    package::package(&implementation, jar, config)
}

/// Initializes logging for a component, mirroring to stderr when asked.
pub fn init_logging(component: &str, to_stderr: bool) -> impl Drop {
    implscope_core::logging::init_logging(component, to_stderr)
}
