//! Generic substitution contexts for every ancestor of a root type.
//!
//! For `class Root<E> extends Base<List<E>> implements Sink<E>`, the store maps
//! `Base` to `{T -> List<E>}` and `Sink` to `{S -> E}` when those are the
//! declared parameter names. Contexts are always expressed in the root's own
//! terms: a type argument that mentions a parameter of an intermediate type is
//! replaced with that parameter's value before it is stored.

use implscope_api::models::{ClassId, Type};
use implscope_api::{ApiError, TypeSystem};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Type-parameter name to substituted type.
pub type GenericContext = HashMap<String, Type>;

#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: IndexMap<ClassId, GenericContext>,
    empty: GenericContext,
}

impl ContextStore {
    /// Walk the supertype lattice of `root`, interfaces before the superclass,
    /// recording one context per generic ancestor.
    ///
    /// An ancestor reachable along several paths keeps the context of the
    /// first path visited.
    pub fn build<T: TypeSystem + ?Sized>(ts: &T, root: ClassId) -> Result<Self, ApiError> {
        let mut store = Self::default();
        let mut visited = HashSet::new();
        let mut path = vec![root];
        store.fill(ts, root, &GenericContext::new(), &mut visited, &mut path)?;
        Ok(store)
    }

    fn fill<T: TypeSystem + ?Sized>(
        &mut self,
        ts: &T,
        class: ClassId,
        parent: &GenericContext,
        visited: &mut HashSet<ClassId>,
        path: &mut Vec<ClassId>,
    ) -> Result<(), ApiError> {
        let supertypes = ts.interfaces(class).iter().chain(ts.superclass(class));
        for supertype in supertypes {
            let Some(raw) = supertype.raw_class() else {
                continue;
            };
            if path.contains(&raw) {
                return Err(ApiError::InvalidArgument(format!(
                    "cyclic inheritance involving {}",
                    ts.class_name(raw)
                )));
            }
            if !visited.insert(raw) {
                continue;
            }
            let context = match supertype {
                Type::Parameterized { args, .. } if !args.is_empty() => {
                    let params = ts.class(raw).map(|c| c.type_params.as_slice()).unwrap_or(&[]);
                    let context: GenericContext = params
                        .iter()
                        .zip(args)
                        .map(|(param, arg)| {
                            (ts.type_param_name(*param).to_string(), substitute(ts, arg, parent))
                        })
                        .collect();
                    self.put(raw, context.clone());
                    context
                }
                _ => GenericContext::new(),
            };
            path.push(raw);
            self.fill(ts, raw, &context, visited, path)?;
            path.pop();
        }
        Ok(())
    }

    /// Record the context of `raw`. Returns `false` and keeps the existing
    /// entry if one was already recorded.
    pub fn put(&mut self, raw: ClassId, context: GenericContext) -> bool {
        if self.contexts.contains_key(&raw) {
            return false;
        }
        self.contexts.insert(raw, context);
        true
    }

    /// Context of `raw`, empty for the root and non-generic ancestors.
    pub fn get(&self, raw: ClassId) -> &GenericContext {
        self.contexts.get(&raw).unwrap_or(&self.empty)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Entries in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &GenericContext)> {
        self.contexts.iter().map(|(id, ctx)| (*id, ctx))
    }
}

/// Replace type variables named in `context`, building a new type.
///
/// Replacements are inserted as they are and not substituted again.
pub fn substitute<T: TypeSystem + ?Sized>(ts: &T, ty: &Type, context: &GenericContext) -> Type {
    match ty {
        Type::Class(_) => ty.clone(),
        Type::TypeVar(id) => context
            .get(ts.type_param_name(*id))
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        Type::Parameterized { raw, args } => Type::Parameterized {
            raw: *raw,
            args: args.iter().map(|a| substitute(ts, a, context)).collect(),
        },
        Type::Wildcard { upper, lower } => Type::Wildcard {
            upper: upper.iter().map(|b| substitute(ts, b, context)).collect(),
            lower: lower.iter().map(|b| substitute(ts, b, context)).collect(),
        },
        Type::Array(component) => Type::array_of(substitute(ts, component, context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use implscope_api::TypeProvider;
    use implscope_java::{ClassDescription, TypeStore};

    fn store(classes: Vec<ClassDescription>) -> TypeStore {
        classes
            .into_iter()
            .fold(TypeStore::builder().with_minimal_jdk().unwrap(), |b, c| b.class(c))
            .build()
            .unwrap()
    }

    #[test]
    fn contexts_are_expressed_in_root_terms() {
        let ts = store(vec![
            ClassDescription::interface("demo.Sink").type_parameters("<S>"),
            ClassDescription::class("demo.Base")
                .type_parameters("<T>")
                .implements("Sink<java.util.List<T>>"),
            ClassDescription::class("demo.Root")
                .type_parameters("<E>")
                .extends("Base<E>"),
        ]);
        let root = ts.class_by_name("demo.Root").unwrap();
        let sink = ts.class_by_name("demo.Sink").unwrap();
        let base = ts.class_by_name("demo.Base").unwrap();
        let contexts = ContextStore::build(&ts, root).unwrap();

        let e = ts.class(root).unwrap().type_params[0];
        assert_eq!(contexts.get(base)["T"], Type::TypeVar(e));
        let list = ts.class_by_name("java.util.List").unwrap();
        assert_eq!(
            contexts.get(sink)["S"],
            Type::parameterized(list, vec![Type::TypeVar(e)])
        );
        assert!(contexts.get(root).is_empty());
    }

    #[test]
    fn first_visited_context_wins() {
        let ts = store(vec![
            ClassDescription::interface("demo.Holder").type_parameters("<H>"),
            ClassDescription::interface("demo.Left").implements("Holder<String>"),
            ClassDescription::interface("demo.Right").implements("Holder<Integer>"),
            ClassDescription::interface("demo.Both")
                .implements("Left")
                .implements("Right"),
        ]);
        let both = ts.class_by_name("demo.Both").unwrap();
        let holder = ts.class_by_name("demo.Holder").unwrap();
        let contexts = ContextStore::build(&ts, both).unwrap();
        assert_eq!(
            contexts.get(holder)["H"],
            Type::Class(ts.class_by_name("java.lang.String").unwrap())
        );
        assert_eq!(contexts.len(), 1);
    }

    #[test]
    fn cyclic_hierarchies_are_rejected() {
        let ts = store(vec![
            ClassDescription::interface("demo.A").implements("demo.B"),
            ClassDescription::interface("demo.B").implements("demo.A"),
        ]);
        let a = ts.class_by_name("demo.A").unwrap();
        let err = ContextStore::build(&ts, a).unwrap_err();
        assert!(err.to_string().contains("cyclic inheritance"));
    }

    #[test]
    fn put_keeps_existing_entry() {
        let mut contexts = ContextStore::default();
        let id = ClassId(42);
        assert!(contexts.put(id, GenericContext::new()));
        let mut other = GenericContext::new();
        other.insert("T".to_string(), Type::Class(ClassId(0)));
        assert!(!contexts.put(id, other));
        assert!(contexts.get(id).is_empty());
    }
}
