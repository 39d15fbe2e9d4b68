use clap::Parser;
use implscope_api::ApiError;
use implscope_core::ImplError;
use implscope_runtime::RuntimeConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "implscope",
    version,
    about = "Generates a compilable implementation of a Java class or interface",
    long_about = "Implscope reads a description of a Java type universe, works out which abstract \
                  methods a concrete subclass of the named type must declare, and writes the \
                  implementation as Java source or as a compiled jar."
)]
pub struct Cli {
    /// Canonical name of the class or interface to implement
    #[arg(value_name = "TYPE_NAME")]
    pub type_name: String,

    /// Type description files loaded on top of the bundled JDK subset
    #[arg(long = "types", value_name = "FILE")]
    pub types: Vec<PathBuf>,

    /// Root directory for generated sources
    #[arg(short, long, value_name = "ROOT", default_value = ".", conflicts_with = "jar")]
    pub output: PathBuf,

    /// Compile the implementation and package it into this jar
    #[arg(long, value_name = "JAR_PATH")]
    pub jar: Option<PathBuf>,

    /// Extra classpath entries used when compiling for --jar
    #[arg(long, value_name = "PATH")]
    pub classpath: Vec<PathBuf>,

    /// Print the computed implementation as JSON instead of writing files
    #[arg(long, conflicts_with = "jar")]
    pub json: bool,

    /// Keep the temporary compilation directory
    #[arg(long, requires = "jar")]
    pub keep_build_dir: bool,

    /// Mirror log output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::from_env();
        config.classpath.extend(self.classpath.iter().cloned());
        config.keep_build_dir = self.keep_build_dir;
        config
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let _guard = implscope_runtime::init_logging("cli", cli.verbose);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one request; the error is the diagnostic line to print.
pub fn execute(cli: &Cli) -> Result<(), String> {
    let ts = implscope_runtime::load_types(&cli.types)
        .map_err(|e| format!("Error: Cannot load type descriptions: {e}"))?;
    let config = cli.runtime_config();

    if cli.json {
        let implementation =
            implscope_runtime::analyze(&ts, &cli.type_name).map_err(|e| diagnostic(&cli.type_name, e))?;
        let json = serde_json::to_string_pretty(&implementation)
            .map_err(|e| format!("Error: Cannot serialize implementation: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    match &cli.jar {
        Some(jar) => {
            implscope_runtime::implement_jar(&ts, &cli.type_name, jar, &config)
                .map_err(|e| diagnostic(&cli.type_name, e))?;
            info!("Implementation of {} packaged into {}", cli.type_name, jar.display());
        }
        None => {
            let path = implscope_runtime::implement(&ts, &cli.type_name, &cli.output, &config)
                .map_err(|e| diagnostic(&cli.type_name, e))?;
            info!("Implementation of {} written to {}", cli.type_name, path.display());
        }
    }
    Ok(())
}

fn diagnostic(type_name: &str, error: ImplError) -> String {
    match error {
        ImplError::Api(ApiError::NotFound(_)) => format!("Error: Class not found: {type_name}"),
        other => format!("Error: Cannot generate class: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("implscope").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn output_defaults_to_current_directory() {
        let cli = parse(&["java.util.AbstractList"]);
        assert_eq!(cli.output, PathBuf::from("."));
        assert!(cli.jar.is_none());
        assert!(cli.types.is_empty());
    }

    #[test]
    fn types_may_repeat() {
        let cli = parse(&["--types", "a.json", "--types", "b.json", "demo.Shape"]);
        assert_eq!(cli.types, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }

    #[test]
    fn jar_conflicts_with_output_and_json() {
        let base = ["implscope", "--jar", "out.jar", "demo.Shape"];
        assert!(Cli::try_parse_from(base.iter().chain(&["--output", "src"]).copied()).is_err());
        assert!(Cli::try_parse_from(base.iter().chain(&["--json"]).copied()).is_err());
    }

    #[test]
    fn missing_class_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let cli = parse(&["demo.Missing", "--output", &root]);
        assert_eq!(execute(&cli).unwrap_err(), "Error: Class not found: demo.Missing");
    }

    #[test]
    fn generation_failures_are_reported_with_reason() {
        let cli = parse(&["java.lang.String"]);
        let message = execute(&cli).unwrap_err();
        assert!(message.starts_with("Error: Cannot generate class: "), "{message}");
    }

    #[test]
    fn writes_source_under_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let cli = parse(&["java.util.AbstractList", "--output", &root]);
        execute(&cli).unwrap();
        let source = dir.path().join("java").join("util").join("AbstractListImpl.java");
        assert!(std::fs::read_to_string(source).unwrap().contains("public E get(int var0) {"));
    }
}
