use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Appended to the simple name of the implemented type.
    pub class_suffix: String,
    /// Spaces per indentation level.
    pub indent: usize,
    pub line_separator: String,
    /// Explicit `javac`; discovered from the JDK when unset.
    pub javac: Option<PathBuf>,
    pub classpath: Vec<PathBuf>,
    /// Keep the temporary compilation directory after packaging.
    pub keep_build_dir: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            class_suffix: "Impl".to_string(),
            indent: 4,
            line_separator: if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
            javac: None,
            classpath: Vec::new(),
            keep_build_dir: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults, with `javac` taken from `IMPLSCOPE_JAVAC` or the JDK under
    /// `JAVA_HOME`.
    pub fn from_env() -> Self {
        let javac = std::env::var_os("IMPLSCOPE_JAVAC")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("JAVA_HOME")
                    .and_then(|home| implscope_java::jdk::javac_in(&PathBuf::from(home)))
            });
        Self {
            javac,
            ..Self::default()
        }
    }

    pub fn class_name(&self, simple_name: &str) -> String {
        format!("{simple_name}{}", self.class_suffix)
    }
}
