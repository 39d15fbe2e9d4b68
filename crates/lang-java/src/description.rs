//! Serializable type descriptions.
//!
//! A description names every type in Java source syntax, so a universe can be
//! written by hand as JSON or assembled fluently in tests:
//!
//! ```
//! use implscope_java::description::{ClassDescription, MethodDescription};
//!
//! let comparator = ClassDescription::interface("demo.Comparator")
//!     .modifiers(&["public"])
//!     .type_parameters("<T>")
//!     .method(MethodDescription::new("compare", "int").parameters(&["T", "T"]));
//! assert_eq!(comparator.methods.len(), 1);
//! ```

use implscope_api::models::ClassKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// A set of class descriptions loaded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeUniverseDescription {
    pub classes: Vec<ClassDescription>,
}

impl TypeUniverseDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescription {
    /// Canonical name, e.g. `java.util.Map.Entry`.
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: ClassKind,
    /// Explicit package; derived from the name or the enclosing class when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
    /// Canonical name of the enclosing class of a member type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing: Option<String>,
    /// Type parameter clause, e.g. `<K, V extends Comparable<V>>`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_parameters: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescription>,
    /// `None` declares the implicit no-argument constructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructors: Option<Vec<ConstructorDescription>>,
}

fn default_kind() -> ClassKind {
    ClassKind::Class
}

impl ClassDescription {
    pub fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            package: None,
            modifiers: vec![],
            enclosing: None,
            type_parameters: String::new(),
            superclass: None,
            interfaces: vec![],
            methods: vec![],
            constructors: None,
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    pub fn modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn enclosed_in(mut self, enclosing: &str) -> Self {
        self.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn type_parameters(mut self, clause: &str) -> Self {
        self.type_parameters = clause.to_string();
        self
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn method(mut self, method: MethodDescription) -> Self {
        self.methods.push(method);
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDescription) -> Self {
        self.constructors
            .get_or_insert_with(Vec::new)
            .push(constructor);
        self
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_parameters: String,
    pub return_type: String,
    /// Parameter types; a trailing `...` on the last one marks varargs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl MethodDescription {
    pub fn new(name: &str, return_type: &str) -> Self {
        Self {
            name: name.to_string(),
            type_parameters: String::new(),
            return_type: return_type.to_string(),
            parameters: vec![],
            throws: vec![],
            modifiers: vec![],
        }
    }

    pub fn type_parameters(mut self, clause: &str) -> Self {
        self.type_parameters = clause.to_string();
        self
    }

    pub fn parameters(mut self, parameters: &[&str]) -> Self {
        self.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn throws(mut self, exceptions: &[&str]) -> Self {
        self.throws = exceptions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDescription {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_parameters: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl ConstructorDescription {
    pub fn new(modifiers: &[&str]) -> Self {
        Self {
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn type_parameters(mut self, clause: &str) -> Self {
        self.type_parameters = clause.to_string();
        self
    }

    pub fn parameters(mut self, parameters: &[&str]) -> Self {
        self.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn throws(mut self, exceptions: &[&str]) -> Self {
        self.throws = exceptions.iter().map(|e| e.to_string()).collect();
        self
    }
}
