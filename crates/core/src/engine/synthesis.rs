//! Derives one overriding signature for a whole equivalence class.
//!
//! The synthesized method takes the most accessible level found in the class,
//! the type-parameter arity shared by every member (zero as soon as one member
//! is not generic) and the most specific return type. Parameter types and
//! bounds are copied from a reference member whose return type is exactly the
//! chosen one, with its own type parameters renamed to fresh `Var<n>` names.

use implscope_api::models::{
    Access, ClassDef, ClassId, ConstructorDef, MethodDef, MethodId, Type, TypeParamDef, TypeVarId,
    WellKnownTypes,
};
use implscope_api::{ApiError, InheritanceProvider, MemberProvider, TypeProvider, TypeSystem};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::comparator::{
    SignatureComparator, has_raw_parameter_type, is_raw_type, render, render_type_params,
};
use super::context::{GenericContext, substitute};
use super::partition::EquivalenceClass;
use crate::error::{ImplError, Result};

/// Value returned by a generated method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnDefault {
    /// `void`: no return statement.
    None,
    False,
    Zero,
    Null,
}

impl ReturnDefault {
    pub fn for_type<T: TypeSystem + ?Sized>(ts: &T, ty: &Type) -> Self {
        let wk = ts.well_known();
        match ty {
            Type::Class(id) if *id == wk.void => ReturnDefault::None,
            Type::Class(id) if *id == wk.boolean => ReturnDefault::False,
            Type::Class(id) if ts.is_primitive(*id) => ReturnDefault::Zero,
            _ => ReturnDefault::Null,
        }
    }

    /// Java literal to return, `None` for `void`.
    pub fn literal(self) -> Option<&'static str> {
        match self {
            ReturnDefault::None => None,
            ReturnDefault::False => Some("false"),
            ReturnDefault::Zero => Some("0"),
            ReturnDefault::Null => Some("null"),
        }
    }
}

/// A method to be written into the implementation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedMethod {
    pub access: Access,
    /// One entry per type parameter, e.g. `Var0 extends java.lang.Number`.
    pub type_params: Vec<String>,
    pub return_type: String,
    pub name: String,
    pub parameter_types: Vec<String>,
    /// The member whose parameter list and return type were copied.
    pub reference: MethodId,
    pub default_value: ReturnDefault,
}

impl SynthesizedMethod {
    /// `<A, B extends A>`, or an empty string for a non-generic method.
    pub fn type_param_clause(&self) -> String {
        if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        }
    }
}

impl fmt::Display for SynthesizedMethod {
    /// Declaration head without the body, parameters named `var0`, `var1`, ...
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<_> = self
            .parameter_types
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{ty} var{i}"))
            .collect();
        let head = format!("{}({})", self.name, params.join(", "));
        let clause = self.type_param_clause();
        let parts: [&str; 4] = [
            self.access.keyword(),
            clause.as_str(),
            self.return_type.as_str(),
            head.as_str(),
        ];
        let parts: Vec<_> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Type-description view that adds the type parameters of one synthesized
/// method on top of the underlying universe.
struct LocalTypeParams<'a, T: ?Sized> {
    ts: &'a T,
    params: Vec<TypeParamDef>,
}

impl<'a, T: TypeSystem + ?Sized> LocalTypeParams<'a, T> {
    /// First phase: allocate every name with no bounds, so that bounds patched
    /// in later can refer to any sibling.
    fn declare(ts: &'a T, names: Vec<String>) -> (Self, Vec<TypeVarId>) {
        let ids = (0..names.len() as u32).map(TypeVarId::synthesized).collect();
        let params = names
            .into_iter()
            .map(|name| TypeParamDef {
                name,
                bounds: Vec::new(),
            })
            .collect();
        (Self { ts, params }, ids)
    }

    fn set_bounds(&mut self, id: TypeVarId, bounds: Vec<Type>) {
        if let Some(param) = id.synthesized_index().and_then(|i| self.params.get_mut(i)) {
            param.bounds = bounds;
        }
    }
}

impl<T: TypeSystem + ?Sized> TypeProvider for LocalTypeParams<'_, T> {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.ts.class(id)
    }

    fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.ts.class_by_name(name)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        match id.synthesized_index() {
            Some(index) => self.params.get(index),
            None => self.ts.type_param(id),
        }
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.ts.well_known()
    }
}

impl<T: TypeSystem + ?Sized> InheritanceProvider for LocalTypeParams<'_, T> {
    fn superclass(&self, id: ClassId) -> Option<&Type> {
        self.ts.superclass(id)
    }

    fn interfaces(&self, id: ClassId) -> &[Type] {
        self.ts.interfaces(id)
    }

    fn enclosing_class(&self, id: ClassId) -> Option<ClassId> {
        self.ts.enclosing_class(id)
    }
}

impl<T: TypeSystem + ?Sized> MemberProvider for LocalTypeParams<'_, T> {
    fn declared_methods(&self, id: ClassId) -> &[MethodDef] {
        self.ts.declared_methods(id)
    }

    fn declared_constructors(&self, id: ClassId) -> &[ConstructorDef] {
        self.ts.declared_constructors(id)
    }
}

pub struct SignatureSynthesizer<'a, T: TypeSystem + ?Sized> {
    ts: &'a T,
    comparator: &'a SignatureComparator<'a, T>,
    forbidden: HashSet<String>,
    prefix: &'a str,
}

impl<'a, T: TypeSystem + ?Sized> SignatureSynthesizer<'a, T> {
    /// `forbidden` holds names the fresh type parameters must avoid, normally
    /// the type parameters of the implemented type.
    pub fn new(
        ts: &'a T,
        comparator: &'a SignatureComparator<'a, T>,
        forbidden: HashSet<String>,
        prefix: &'a str,
    ) -> Self {
        Self {
            ts,
            comparator,
            forbidden,
            prefix,
        }
    }

    pub fn synthesize(&self, class: &EquivalenceClass) -> Result<SynthesizedMethod> {
        let ts = self.ts;
        let members: Vec<(MethodId, &MethodDef)> = class
            .methods
            .iter()
            .filter_map(|id| ts.method(*id).map(|def| (*id, def)))
            .collect();
        let Some(&(_, first)) = members.first() else {
            return Err(ApiError::Internal("empty equivalence class".to_string()).into());
        };

        let access = members
            .iter()
            .map(|(_, def)| def.access)
            .min()
            .unwrap_or(first.access);
        let arity = if members.iter().any(|(_, def)| !def.is_generic()) {
            0
        } else {
            first.type_params.len()
        };

        if members.iter().any(|(_, def)| has_raw_parameter_type(ts, def)) {
            return Err(ImplError::RawTypeRequired(
                "Cannot generate implementation without using raw type in method parameters"
                    .to_string(),
            ));
        }

        let returns: Vec<Type> = members
            .iter()
            .map(|(id, def)| self.return_in_root_terms(*id, def))
            .collect();
        let mut return_type = &returns[0];
        for candidate in &returns[1..] {
            if self.is_assignable(return_type, candidate) {
                return_type = candidate;
            }
        }
        if is_raw_type(ts, return_type) {
            return Err(ImplError::RawTypeRequired(
                "Cannot generate implementation without raw method return types".to_string(),
            ));
        }

        let Some(&(reference, reference_def)) = members
            .iter()
            .zip(&returns)
            .find(|((_, def), ret)| *ret == return_type && def.type_params.len() == arity)
            .map(|(member, _)| member)
        else {
            return Err(ImplError::CastRequired(
                "Cannot generate implementation without unchecked casts".to_string(),
            ));
        };

        let (mut locals, ids) = LocalTypeParams::declare(ts, self.fresh_names(arity));
        let mut context = self.comparator.contexts().get(reference.owner).clone();
        for (declared, local) in reference_def.type_params.iter().zip(&ids) {
            context.insert(ts.type_param_name(*declared).to_string(), Type::TypeVar(*local));
        }
        for (declared, local) in reference_def.type_params.iter().zip(&ids) {
            let bounds = ts
                .type_param(*declared)
                .map(|tp| tp.bounds.iter().map(|b| substitute(ts, b, &context)).collect())
                .unwrap_or_default();
            locals.set_bounds(*local, bounds);
        }

        let none = HashSet::new();
        let method = SynthesizedMethod {
            access,
            type_params: render_type_params(&locals, &GenericContext::new(), &ids),
            return_type: render(&locals, &context, &reference_def.return_type, &none),
            name: reference_def.name.clone(),
            parameter_types: reference_def
                .params
                .iter()
                .map(|p| render(&locals, &context, p, &none))
                .collect(),
            reference,
            default_value: ReturnDefault::for_type(ts, return_type),
        };
        tracing::debug!(method = %method, members = members.len(), "Synthesized stub");
        Ok(method)
    }

    /// Declared return type with the class type parameters of the declaring
    /// type replaced by their values in the root. The method's own type
    /// parameters are left alone.
    fn return_in_root_terms(&self, id: MethodId, def: &MethodDef) -> Type {
        let ts = self.ts;
        let mut context = self.comparator.contexts().get(id.owner).clone();
        for param in &def.type_params {
            context.remove(ts.type_param_name(*param));
        }
        substitute(ts, &def.return_type, &context)
    }

    /// `Var0, Var1, ...`, skipping forbidden names.
    fn fresh_names(&self, count: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(count);
        let mut index = 0usize;
        while names.len() < count {
            let name = format!("{}{index}", self.prefix);
            if !self.forbidden.contains(&name) {
                names.push(name);
            }
            index += 1;
        }
        names
    }

    /// Best-effort assignability of uninstantiated generic types.
    ///
    /// `true` when a `source` value can be assigned to `target`, `false` when
    /// `target` is assignable to `source`. Unrelated types may give either.
    fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        let ts = self.ts;
        if target == source {
            return true;
        }
        let wk = ts.well_known();
        if source.is_reifiable_class() {
            if target.is_reifiable_class() {
                return ts.is_class_assignable(target, source);
            }
            return match target {
                Type::Array(component) => match source {
                    Type::Array(source_component) => self.is_assignable(component, source_component),
                    _ => false,
                },
                Type::Parameterized { raw, .. } => ts.is_class_assignable(&Type::Class(*raw), source),
                Type::Wildcard { lower, .. } => lower.iter().any(|b| self.is_assignable(b, source)),
                Type::TypeVar(_) | Type::Class(_) => false,
            };
        }
        match source {
            Type::Array(source_component) => match target {
                Type::Class(id) => *id == wk.object || *id == wk.cloneable || *id == wk.serializable,
                Type::Array(component) => self.is_assignable(component, source_component),
                _ => false,
            },
            Type::Parameterized { raw, .. } => self.is_assignable(target, &Type::Class(*raw)),
            Type::TypeVar(id) => ts
                .type_param(*id)
                .is_some_and(|tp| tp.bounds.iter().any(|b| self.is_assignable(target, b))),
            Type::Wildcard { upper, .. } => upper.iter().any(|b| self.is_assignable(target, b)),
            Type::Class(_) => false,
        }
    }
}
