//! Override-equivalence classes over the members of one type.

use implscope_api::TypeSystem;
use implscope_api::models::MethodId;
use std::collections::BTreeSet;

use super::comparator::SignatureComparator;

/// Methods of one type that a single subtype member overrides together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceClass {
    /// Members in the order they joined the class. Never empty.
    pub methods: Vec<MethodId>,
}

impl EquivalenceClass {
    pub fn first(&self) -> MethodId {
        self.methods[0]
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn contains(&self, method: MethodId) -> bool {
        self.methods.contains(&method)
    }

    /// Whether the class needs a stub at all.
    pub fn has_abstract<T: TypeSystem + ?Sized>(&self, ts: &T) -> bool {
        self.methods
            .iter()
            .any(|m| ts.method(*m).is_some_and(|def| def.is_abstract))
    }
}

/// Greedy single-pass partition of `members`, which must all be members of
/// one type.
///
/// A method joins the first class holding a method it is override-equivalent
/// to. Iteration follows `MethodId` order, so the result is deterministic.
pub fn partition<T: TypeSystem + ?Sized>(
    comparator: &SignatureComparator<'_, T>,
    members: &BTreeSet<MethodId>,
) -> Vec<EquivalenceClass> {
    let mut classes: Vec<EquivalenceClass> = Vec::new();
    for &method in members {
        let joined = classes.iter_mut().find(|class| {
            class
                .methods
                .iter()
                .any(|other| comparator.is_override_equivalent(method, *other))
        });
        match joined {
            Some(class) => class.methods.push(method),
            None => classes.push(EquivalenceClass {
                methods: vec![method],
            }),
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::ContextStore;
    use implscope_api::TypeProvider;
    use implscope_java::{ClassDescription, MethodDescription, TypeStore};

    #[test]
    fn groups_override_equivalent_methods() {
        let ts = TypeStore::builder()
            .with_minimal_jdk()
            .unwrap()
            .class(
                ClassDescription::interface("demo.A")
                    .method(MethodDescription::new("size", "int"))
                    .method(MethodDescription::new("get", "T").type_parameters("<T>")),
            )
            .class(
                ClassDescription::interface("demo.B")
                    .method(MethodDescription::new("size", "int"))
                    .method(MethodDescription::new("get", "U").type_parameters("<U>"))
                    .method(MethodDescription::new("get", "String").parameters(&["int"])),
            )
            .build()
            .unwrap();
        let a = ts.class_by_name("demo.A").unwrap();
        let b = ts.class_by_name("demo.B").unwrap();
        let contexts = ContextStore::default();
        let cmp = SignatureComparator::new(&ts, &contexts);
        let members: BTreeSet<_> = [
            MethodId::new(a, 0),
            MethodId::new(a, 1),
            MethodId::new(b, 0),
            MethodId::new(b, 1),
            MethodId::new(b, 2),
        ]
        .into_iter()
        .collect();

        let classes = partition(&cmp, &members);
        assert_eq!(classes.len(), 3);
        let total: usize = classes.iter().map(EquivalenceClass::len).sum();
        assert_eq!(total, members.len());
        assert_eq!(classes[0].methods, vec![MethodId::new(a, 0), MethodId::new(b, 0)]);
        assert_eq!(classes[1].methods, vec![MethodId::new(a, 1), MethodId::new(b, 1)]);
        assert_eq!(classes[2].methods, vec![MethodId::new(b, 2)]);
        assert!(classes.iter().all(|c| c.has_abstract(&ts)));
    }

    #[test]
    fn empty_member_set_yields_no_classes() {
        let ts = TypeStore::with_minimal_jdk().unwrap();
        let contexts = ContextStore::default();
        let cmp = SignatureComparator::new(&ts, &contexts);
        assert!(partition(&cmp, &BTreeSet::new()).is_empty());
    }
}
