//! Java source text for an [`Implementation`].

use implscope_core::{ConstructorDescriptor, ImplError, Implementation, Result, SynthesizedMethod};
use std::path::{Path, PathBuf};

use crate::config::RuntimeConfig;

/// `<root>/<package dirs>/<SimpleName><suffix>.<extension>`
pub fn output_path(
    root: &Path,
    implementation: &Implementation,
    config: &RuntimeConfig,
    extension: &str,
) -> PathBuf {
    let header = &implementation.header;
    let mut path = root.to_path_buf();
    path.extend(header.package.split('.').filter(|s| !s.is_empty()));
    path.push(format!("{}.{extension}", config.class_name(&header.simple_name)));
    path
}

/// Write the source file under `root`, creating package directories.
pub fn write_source(root: &Path, implementation: &Implementation, config: &RuntimeConfig) -> Result<PathBuf> {
    let path = output_path(root, implementation, config, "java");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ImplError::io("Cannot create output directory", e))?;
    }
    std::fs::write(&path, render(implementation, config))
        .map_err(|e| ImplError::io("Cannot write to output file", e))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

pub fn render(implementation: &Implementation, config: &RuntimeConfig) -> String {
    SourceWriter::new(config).class(implementation)
}

struct SourceWriter<'a> {
    config: &'a RuntimeConfig,
    lines: Vec<String>,
}

impl<'a> SourceWriter<'a> {
    fn new(config: &'a RuntimeConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
        }
    }

    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{text}", " ".repeat(level * self.config.indent)));
        }
    }

    fn class(mut self, implementation: &Implementation) -> String {
        let header = &implementation.header;
        let class_name = self.config.class_name(&header.simple_name);
        if !header.package.is_empty() {
            self.line(0, format!("package {};", header.package));
            self.line(0, "");
        }

        let relation = if header.is_interface { "implements" } else { "extends" };
        self.line(
            0,
            format!(
                "public class {class_name}{} {relation} {}{} {{",
                angle(&header.type_params),
                header.canonical_name,
                angle(&header.type_arg_names),
            ),
        );

        if let Some(constructor) = &implementation.constructor {
            self.constructor(&class_name, constructor);
        }
        for method in &implementation.methods {
            self.method(method);
        }
        self.line(0, "}");

        let separator = &self.config.line_separator;
        let mut out = self.lines.join(separator);
        out.push_str(separator);
        out
    }

    fn constructor(&mut self, class_name: &str, constructor: &ConstructorDescriptor) {
        let last = constructor.parameter_types.len().saturating_sub(1);
        let params: Vec<_> = constructor
            .parameter_types
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                let dots = if constructor.is_varargs && i == last { "..." } else { "" };
                format!("{ty}{dots} var{i}")
            })
            .collect();
        let access = constructor.access.keyword();
        let mut head = String::new();
        if !access.is_empty() {
            head.push_str(access);
            head.push(' ');
        }
        head.push_str(&angle(&constructor.type_params));
        head.push_str(&format!("{class_name}({})", params.join(", ")));
        if !constructor.exceptions.is_empty() {
            head.push_str(&format!(" throws {}", constructor.exceptions.join(", ")));
        }

        let args: Vec<_> = (0..constructor.parameter_types.len())
            .map(|i| format!("var{i}"))
            .collect();
        self.line(1, format!("{head} {{"));
        self.line(2, format!("super({});", args.join(", ")));
        self.line(1, "}");
        self.line(0, "");
    }

    fn method(&mut self, method: &SynthesizedMethod) {
        self.line(1, "@Override");
        self.line(1, format!("{method} {{"));
        if let Some(value) = method.default_value.literal() {
            self.line(2, format!("return {value};"));
        }
        self.line(1, "}");
        self.line(0, "");
    }
}

fn angle(items: &[String]) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("<{}>", items.join(", "))
    }
}
