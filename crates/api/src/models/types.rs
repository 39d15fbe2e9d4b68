//! Structural model of Java types as seen by the implementation engine.
//!
//! Every [`Type`] is an immutable value. Substitution always builds a new
//! value; nothing in this module mutates a type in place.

use serde::{Deserialize, Serialize};

/// Index of a class, interface or primitive inside a type universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a declared or synthesized type variable.
///
/// The high bit marks variables that only exist inside one synthesis pass and
/// therefore live in a context-local arena rather than in the type universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    const SYNTHESIZED_BIT: u32 = 1 << 31;

    pub fn declared(index: u32) -> Self {
        debug_assert!(index & Self::SYNTHESIZED_BIT == 0, "type variable index overflow");
        Self(index)
    }

    pub fn synthesized(index: u32) -> Self {
        Self(Self::SYNTHESIZED_BIT | index)
    }

    pub fn is_synthesized(self) -> bool {
        self.0 & Self::SYNTHESIZED_BIT != 0
    }

    /// Index into the universe arena, `None` for synthesized variables.
    pub fn declared_index(self) -> Option<usize> {
        if self.is_synthesized() {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    /// Index into the context-local arena, `None` for declared variables.
    pub fn synthesized_index(self) -> Option<usize> {
        if self.is_synthesized() {
            Some((self.0 & !Self::SYNTHESIZED_BIT) as usize)
        } else {
            None
        }
    }
}

/// Identity of a method: the declaring type plus the slot it occupies in that
/// type's declared method list.
///
/// Two methods with textually identical signatures in different types are
/// different methods, so sets and maps key on this id, never on the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId {
    pub owner: ClassId,
    pub slot: u32,
}

impl MethodId {
    pub fn new(owner: ClassId, slot: usize) -> Self {
        Self {
            owner,
            slot: slot as u32,
        }
    }
}

/// A Java type as it appears in a generic signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Nominal type used without type arguments: a non-generic class, a
    /// primitive, or a raw use of a generic class.
    Class(ClassId),

    /// Generic instantiation, e.g. `List<String>`. An empty argument list is
    /// used for non-static member classes reached through a parameterized owner.
    Parameterized { raw: ClassId, args: Vec<Type> },

    /// Reference to a type variable.
    TypeVar(TypeVarId),

    /// `?`, `? extends A & B` or `? super C`. An unbounded wildcard has the
    /// single upper bound `java.lang.Object`.
    Wildcard { upper: Vec<Type>, lower: Vec<Type> },

    /// Array of the component type.
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub fn parameterized(raw: ClassId, args: Vec<Type>) -> Self {
        Type::Parameterized { raw, args }
    }

    /// The nominal class behind this type, if it has one.
    pub fn raw_class(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) | Type::Parameterized { raw: id, .. } => Some(*id),
            Type::TypeVar(_) | Type::Wildcard { .. } | Type::Array(_) => None,
        }
    }

    /// True for types that are classes at run time: plain classes and arrays
    /// whose innermost component is a plain class.
    pub fn is_reifiable_class(&self) -> bool {
        match self {
            Type::Class(_) => true,
            Type::Array(component) => component.is_reifiable_class(),
            Type::Parameterized { .. } | Type::TypeVar(_) | Type::Wildcard { .. } => false,
        }
    }
}
