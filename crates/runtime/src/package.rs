//! Compiles generated source with `javac` and archives the class as a jar.

use implscope_core::{ImplError, Implementation, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::RuntimeConfig;
use crate::emit;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

pub fn manifest(line_separator: &str) -> String {
    format!("Manifest-Version: 1.0{line_separator}Created-By: implscope{line_separator}{line_separator}")
}

/// Generate, compile and archive `implementation` into `jar`.
pub fn package(implementation: &Implementation, jar: &Path, config: &RuntimeConfig) -> Result<()> {
    let build_dir = tempfile::Builder::new()
        .prefix("implscope-")
        .tempdir()
        .map_err(|e| ImplError::io("Cannot create directory for compilation", e))?;

    let source = emit::write_source(build_dir.path(), implementation, config)?;
    compile(&source, build_dir.path(), config)?;

    let class_file = emit::output_path(build_dir.path(), implementation, config, "class");
    let entry = jar_entry_name(build_dir.path(), &class_file);
    write_jar(jar, &class_file, &entry, &config.line_separator)?;
    tracing::info!("Packaged {} into {}", entry, jar.display());

    if config.keep_build_dir {
        let kept = build_dir.keep();
        tracing::info!("Kept compilation directory {}", kept.display());
    }
    Ok(())
}

fn javac(config: &RuntimeConfig) -> Result<PathBuf> {
    config
        .javac
        .clone()
        .or_else(implscope_java::jdk::find_javac)
        .ok_or_else(|| ImplError::Compilation("Cannot find javac, set JAVA_HOME or IMPLSCOPE_JAVAC".to_string()))
}

/// Classpath for compiling a file in `build_dir`: the directory itself
/// followed by the configured entries.
pub fn classpath(build_dir: &Path, config: &RuntimeConfig) -> Result<OsString> {
    let entries = std::iter::once(build_dir.to_path_buf()).chain(config.classpath.iter().cloned());
    std::env::join_paths(entries).map_err(|e| ImplError::Compilation(format!("Invalid classpath: {e}")))
}

pub fn compile(source: &Path, build_dir: &Path, config: &RuntimeConfig) -> Result<()> {
    let javac = javac(config)?;
    tracing::debug!("Compiling {} with {}", source.display(), javac.display());
    let output = Command::new(&javac)
        .arg("-encoding")
        .arg("UTF-8")
        .arg("-cp")
        .arg(classpath(build_dir, config)?)
        .arg("-d")
        .arg(build_dir)
        .arg(source)
        .output()
        .map_err(|e| ImplError::Compilation(format!("Cannot run {}: {e}", javac.display())))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ImplError::Compilation(stderr.trim().to_string()));
    }
    Ok(())
}

/// Entry name of `file` relative to `root`, with `/` separators.
pub fn jar_entry_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn write_jar(jar: &Path, class_file: &Path, entry: &str, line_separator: &str) -> Result<()> {
    let write_error = |e: std::io::Error| ImplError::io("Cannot write jar file", e);
    if let Some(parent) = jar.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let bytes = std::fs::read(class_file).map_err(|e| ImplError::io("Cannot read compiled class", e))?;

    let mut zip = ZipWriter::new(File::create(jar).map_err(write_error)?);
    let options = SimpleFileOptions::default();
    zip.start_file(MANIFEST_PATH, options)
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    zip.write_all(manifest(line_separator).as_bytes()).map_err(write_error)?;
    zip.start_file(entry, options)
        .map_err(|e| write_error(std::io::Error::other(e)))?;
    zip.write_all(&bytes).map_err(write_error)?;
    zip.finish().map_err(|e| write_error(std::io::Error::other(e)))?;
    Ok(())
}
