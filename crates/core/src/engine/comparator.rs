//! Erasure, same-signature, subsignature and override-equivalence checks.
//!
//! Every method is interpreted under the generic context of its own declaring
//! type, taken from the [`ContextStore`]. Comparing two methods therefore
//! compares each through a different context, and type parameters of the
//! second method are aliased to those of the first so that alpha-equivalent
//! declarations (`<T> T get()` and `<U> U get()`) compare equal.

use implscope_api::TypeSystem;
use implscope_api::models::{MethodDef, MethodId, Type, TypeVarId};
use std::collections::HashSet;

use super::context::{ContextStore, GenericContext};

/// Render a type in Java source syntax under `context`.
///
/// Type variables named in `ignore` are printed as-is. A variable found in the
/// context is replaced; the replacement is already in root terms and is
/// rendered without further substitution.
pub fn render<T: TypeSystem + ?Sized>(
    ts: &T,
    context: &GenericContext,
    ty: &Type,
    ignore: &HashSet<String>,
) -> String {
    match ty {
        Type::Class(id) => ts.class_name(*id).to_string(),
        Type::Parameterized { raw, args } => {
            let mut out = ts.class_name(*raw).to_string();
            if !args.is_empty() {
                let args: Vec<_> = args
                    .iter()
                    .map(|a| render(ts, context, a, ignore))
                    .collect();
                out.push('<');
                out.push_str(&args.join(", "));
                out.push('>');
            }
            out
        }
        Type::TypeVar(id) => {
            let name = ts.type_param_name(*id);
            if ignore.contains(name) {
                return name.to_string();
            }
            match context.get(name) {
                Some(replacement) => render(ts, &GenericContext::new(), replacement, ignore),
                None => name.to_string(),
            }
        }
        Type::Wildcard { upper, lower } => {
            let join = |bounds: &[Type]| {
                bounds
                    .iter()
                    .map(|b| render(ts, context, b, ignore))
                    .collect::<Vec<_>>()
                    .join(" & ")
            };
            let object = ts.well_known().object;
            if !lower.is_empty() {
                format!("? super {}", join(lower))
            } else if upper.is_empty() || matches!(upper.as_slice(), [Type::Class(id)] if *id == object)
            {
                "?".to_string()
            } else {
                format!("? extends {}", join(upper))
            }
        }
        Type::Array(component) => format!("{}[]", render(ts, context, component, ignore)),
    }
}

/// Render one entry of a type-parameter clause: `T extends A & B`.
///
/// `java.lang.Object` bounds are omitted. `ignore` should hold the names of
/// the whole clause so that sibling references are printed verbatim.
pub fn render_type_param<T: TypeSystem + ?Sized>(
    ts: &T,
    context: &GenericContext,
    id: TypeVarId,
    ignore: &HashSet<String>,
) -> String {
    let name = ts.type_param_name(id).to_string();
    let object = Type::Class(ts.well_known().object);
    let bounds: Vec<_> = ts
        .type_param(id)
        .map(|tp| tp.bounds.as_slice())
        .unwrap_or(&[])
        .iter()
        .filter(|b| **b != object)
        .map(|b| render(ts, context, b, ignore))
        .collect();
    if bounds.is_empty() {
        name
    } else {
        format!("{name} extends {}", bounds.join(" & "))
    }
}

/// Render a whole clause, one string per parameter.
pub fn render_type_params<T: TypeSystem + ?Sized>(
    ts: &T,
    context: &GenericContext,
    ids: &[TypeVarId],
) -> Vec<String> {
    let ignore = names_of(ts, ids);
    ids.iter()
        .map(|id| render_type_param(ts, context, *id, &ignore))
        .collect()
}

/// Erase a type to a run-time class (a plain class or an array of one).
pub fn erase<T: TypeSystem + ?Sized>(
    ts: &T,
    ty: &Type,
    context: &GenericContext,
    ignore: &HashSet<String>,
) -> Type {
    match ty {
        Type::Class(_) => ty.clone(),
        Type::Parameterized { raw, .. } => Type::Class(*raw),
        Type::Array(component) => Type::array_of(erase(ts, component, context, ignore)),
        Type::TypeVar(id) => {
            let name = ts.type_param_name(*id);
            match context.get(name) {
                Some(replacement) if !ignore.contains(name) => {
                    erase(ts, replacement, &GenericContext::new(), &HashSet::new())
                }
                _ => erase(ts, &ts.first_bound(*id), context, ignore),
            }
        }
        Type::Wildcard { upper, .. } => match upper.first() {
            Some(bound) => erase(ts, bound, context, ignore),
            None => Type::Class(ts.well_known().object),
        },
    }
}

/// A generic class used without type arguments, directly, as an array
/// component, or as a non-static member of a raw enclosing class.
pub fn is_raw_type<T: TypeSystem + ?Sized>(ts: &T, ty: &Type) -> bool {
    match ty {
        Type::Class(id) => {
            let Some(class) = ts.class(*id) else {
                return false;
            };
            class.is_generic()
                || (!class.is_static
                    && class
                        .enclosing
                        .is_some_and(|outer| is_raw_type(ts, &Type::Class(outer))))
        }
        Type::Array(component) => is_raw_type(ts, component),
        Type::Parameterized { .. } | Type::TypeVar(_) | Type::Wildcard { .. } => false,
    }
}

pub fn has_raw_parameter_type<T: TypeSystem + ?Sized>(ts: &T, method: &MethodDef) -> bool {
    method.params.iter().any(|p| is_raw_type(ts, p))
}

/// Names of the given type parameters.
pub fn names_of<T: TypeSystem + ?Sized>(ts: &T, ids: &[TypeVarId]) -> HashSet<String> {
    ids.iter()
        .map(|id| ts.type_param_name(*id).to_string())
        .collect()
}

/// Method-level comparisons bound to one analysis' contexts.
pub struct SignatureComparator<'a, T: TypeSystem + ?Sized> {
    ts: &'a T,
    contexts: &'a ContextStore,
}

impl<'a, T: TypeSystem + ?Sized> SignatureComparator<'a, T> {
    pub fn new(ts: &'a T, contexts: &'a ContextStore) -> Self {
        Self { ts, contexts }
    }

    pub fn contexts(&self) -> &'a ContextStore {
        self.contexts
    }

    fn def(&self, id: MethodId) -> Option<&'a MethodDef> {
        self.ts.method(id)
    }

    /// Erased parameter classes of `method` under `context`.
    pub fn method_erasure(
        &self,
        method: MethodId,
        context: &GenericContext,
        ignore: &HashSet<String>,
    ) -> Vec<Type> {
        self.def(method)
            .map(|m| {
                m.params
                    .iter()
                    .map(|p| erase(self.ts, p, context, ignore))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Same name, same type parameters (up to renaming) and same parameter types.
    pub fn same_signature(&self, m1: MethodId, m2: MethodId) -> bool {
        let (Some(d1), Some(d2)) = (self.def(m1), self.def(m2)) else {
            return false;
        };
        if d1.name != d2.name
            || d1.params.len() != d2.params.len()
            || d1.type_params.len() != d2.type_params.len()
        {
            return false;
        }

        let ctx1 = self.contexts.get(m1.owner);
        let mut ctx2 = self.contexts.get(m2.owner).clone();
        for (p1, p2) in d1.type_params.iter().zip(&d2.type_params) {
            ctx2.insert(
                self.ts.type_param_name(*p2).to_string(),
                Type::TypeVar(*p1),
            );
        }
        let ignore1 = names_of(self.ts, &d1.type_params);
        let none = HashSet::new();

        for (p1, p2) in d1.type_params.iter().zip(&d2.type_params) {
            let bounds1 = self.ts.type_param(*p1).map(|tp| tp.bounds.as_slice()).unwrap_or(&[]);
            let bounds2 = self.ts.type_param(*p2).map(|tp| tp.bounds.as_slice()).unwrap_or(&[]);
            if bounds1.len() != bounds2.len() {
                return false;
            }
            let equal = bounds1.iter().zip(bounds2).all(|(b1, b2)| {
                render(self.ts, ctx1, b1, &ignore1) == render(self.ts, &ctx2, b2, &none)
            });
            if !equal {
                return false;
            }
        }

        d1.params.iter().zip(&d2.params).all(|(t1, t2)| {
            render(self.ts, ctx1, t1, &ignore1) == render(self.ts, &ctx2, t2, &none)
        })
    }

    /// `m1` has the same signature as `m2`, or `m1` is not generic and its
    /// parameter types equal the erasure of `m2`'s.
    pub fn is_sub_signature(&self, m1: MethodId, m2: MethodId) -> bool {
        let (Some(d1), Some(d2)) = (self.def(m1), self.def(m2)) else {
            return false;
        };
        if d1.name != d2.name {
            return false;
        }
        if self.same_signature(m1, m2) {
            return true;
        }
        !d1.is_generic()
            && d1.params == self.method_erasure(m2, &GenericContext::new(), &HashSet::new())
    }

    pub fn is_override_equivalent(&self, m1: MethodId, m2: MethodId) -> bool {
        self.is_sub_signature(m1, m2) || self.is_sub_signature(m2, m1)
    }

    /// Same name, and the erasure of `m1` under `m1_context` equals the plain
    /// erasure of `m2`.
    pub fn has_same_erasure(&self, m1: MethodId, m2: MethodId, m1_context: &GenericContext) -> bool {
        let (Some(d1), Some(d2)) = (self.def(m1), self.def(m2)) else {
            return false;
        };
        d1.name == d2.name
            && self.method_erasure(m1, m1_context, &names_of(self.ts, &d1.type_params))
                == self.method_erasure(m2, &GenericContext::new(), &HashSet::new())
    }
}
