//! Core trait definitions for the type-description source.
//!
//! These traits abstract away where type information comes from, so the
//! implementation engine can run against an in-memory universe, a decoded
//! description file or a mock built in a test. All queries are read-only.

use crate::models::{
    ClassDef, ClassId, ConstructorDef, MethodDef, MethodId, Type, TypeParamDef, TypeVarId,
    WellKnownTypes,
};
use std::collections::{HashSet, VecDeque};

/// Provides type information by id or canonical name.
pub trait TypeProvider: Send + Sync {
    /// Get the declaration of a class, interface or primitive.
    ///
    /// Returns `None` if the id is unknown to this source.
    fn class(&self, id: ClassId) -> Option<&ClassDef>;

    /// Resolve a canonical name such as `java.util.Map.Entry`.
    fn class_by_name(&self, name: &str) -> Option<ClassId>;

    /// Get the declaration of a type variable.
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;

    fn well_known(&self) -> &WellKnownTypes;
}

/// Provides direct supertype edges with their generic arguments.
pub trait InheritanceProvider: Send + Sync {
    /// The generic superclass. `None` for `java.lang.Object`, interfaces and primitives.
    fn superclass(&self, id: ClassId) -> Option<&Type>;

    /// The generic superinterfaces in declaration order.
    fn interfaces(&self, id: ClassId) -> &[Type];

    /// The lexically enclosing class of a member type.
    fn enclosing_class(&self, id: ClassId) -> Option<ClassId>;
}

/// Provides declared members of a single type (never inherited ones).
pub trait MemberProvider: Send + Sync {
    fn declared_methods(&self, id: ClassId) -> &[MethodDef];

    fn declared_constructors(&self, id: ClassId) -> &[ConstructorDef];

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.declared_methods(id.owner).get(id.slot as usize)
    }
}

/// The combined type-description interface used by the engine.
///
/// The default methods answer erased hierarchy questions on top of the three
/// primitive providers.
pub trait TypeSystem: TypeProvider + InheritanceProvider + MemberProvider {
    /// Canonical name of a class, or `"<unknown>"`.
    fn class_name(&self, id: ClassId) -> &str {
        self.class(id).map(|c| c.name.as_str()).unwrap_or("<unknown>")
    }

    fn type_param_name(&self, id: TypeVarId) -> &str {
        self.type_param(id)
            .map(|tp| tp.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// First declared bound of a type variable, `java.lang.Object` if unknown.
    fn first_bound(&self, id: TypeVarId) -> Type {
        self.type_param(id)
            .and_then(|tp| tp.bounds.first().cloned())
            .unwrap_or(Type::Class(self.well_known().object))
    }

    fn is_interface(&self, id: ClassId) -> bool {
        self.class(id).is_some_and(|c| c.is_interface())
    }

    fn is_primitive(&self, id: ClassId) -> bool {
        self.class(id).is_some_and(|c| c.is_primitive())
    }

    fn package_of(&self, id: ClassId) -> &str {
        self.class(id).map(|c| c.package.as_str()).unwrap_or("")
    }

    /// Raw superclass id.
    fn superclass_id(&self, id: ClassId) -> Option<ClassId> {
        self.superclass(id).and_then(Type::raw_class)
    }

    /// Raw ids of the direct superinterfaces.
    fn interface_ids(&self, id: ClassId) -> Vec<ClassId> {
        self.interfaces(id)
            .iter()
            .filter_map(Type::raw_class)
            .collect()
    }

    /// Walk all ancestor types (superclasses and interfaces) in BFS order.
    fn walk_ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(id);
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            let supers = self
                .superclass_id(current)
                .into_iter()
                .chain(self.interface_ids(current));
            for sup in supers {
                if seen.insert(sup) {
                    out.push(sup);
                    queue.push_back(sup);
                }
            }
        }
        out
    }

    /// Erased subclassing: `sup.isAssignableFrom(sub)` for two nominal classes.
    ///
    /// Primitives are only assignable to themselves; every reference type is a
    /// subclass of `java.lang.Object`.
    fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }
        if self.is_primitive(sub) || self.is_primitive(sup) {
            return false;
        }
        if sup == self.well_known().object {
            return true;
        }
        self.walk_ancestors(sub).contains(&sup)
    }

    /// Erased assignability between two run-time classes (plain classes or
    /// arrays of them), mirroring `Class.isAssignableFrom`.
    fn is_class_assignable(&self, target: &Type, source: &Type) -> bool {
        let wk = self.well_known();
        match (target, source) {
            (Type::Class(t), Type::Class(s)) => self.is_subclass_of(*s, *t),
            (Type::Class(t), Type::Array(_)) => {
                *t == wk.object || *t == wk.cloneable || *t == wk.serializable
            }
            (Type::Array(t), Type::Array(s)) => match (t.as_ref(), s.as_ref()) {
                (Type::Class(tc), Type::Class(sc))
                    if self.is_primitive(*tc) || self.is_primitive(*sc) =>
                {
                    tc == sc
                }
                (t, s) => self.is_class_assignable(t, s),
            },
            _ => false,
        }
    }
}

// Blanket implementation: any type implementing all three traits is a TypeSystem
impl<T: TypeProvider + InheritanceProvider + MemberProvider + ?Sized> TypeSystem for T {}
