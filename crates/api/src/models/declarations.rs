use super::types::{ClassId, Type, TypeVarId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Java access level, ordered from the most to the least accessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

impl Access {
    /// Parse the access level out of a modifier list such as `["public", "abstract"]`.
    pub fn from_modifiers<S: AsRef<str>>(modifiers: &[S]) -> Option<Self> {
        modifiers.iter().find_map(|m| match m.as_ref() {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        })
    }

    /// Source keyword, empty for package-private.
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::PackagePrivate => "",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Primitive,
}

/// A declared type variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    /// Upper bounds in declaration order; `[java.lang.Object]` when none were declared.
    pub bounds: Vec<Type>,
}

/// A class, interface or primitive type.
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Canonical name, e.g. `java.util.Map.Entry`.
    pub name: String,
    pub simple_name: String,
    /// Package name, empty for the unnamed package.
    pub package: String,
    pub kind: ClassKind,
    pub access: Access,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_static: bool,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub enclosing: Option<ClassId>,
    pub methods: Vec<MethodDef>,
    pub constructors: Vec<ConstructorDef>,
}

impl ClassDef {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == ClassKind::Primitive
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A declared method. Its identity is the [`super::MethodId`] of the slot it
/// occupies in [`ClassDef::methods`].
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub exceptions: Vec<Type>,
    pub access: Access,
    pub is_abstract: bool,
    pub is_default: bool,
    pub is_static: bool,
    pub is_varargs: bool,
}

impl MethodDef {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub exceptions: Vec<Type>,
    pub access: Access,
    pub is_varargs: bool,
}

/// Ids of the classes the engine treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub enum_base: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub void: ClassId,
    pub boolean: ClassId,
}
