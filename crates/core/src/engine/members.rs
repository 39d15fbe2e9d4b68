//! Member methods of every type in a root's lattice.
//!
//! A member is a declared method or a method validly inherited under the
//! class rules (JLS 8.4.8) or the interface rules (JLS 9.4.1). Inherited sets
//! are computed bottom-up from `java.lang.Object` and memoized per type.

use implscope_api::models::{Access, ClassId, MethodDef, MethodId};
use implscope_api::{ApiError, TypeSystem};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::comparator::SignatureComparator;

static NO_METHODS: BTreeSet<MethodId> = BTreeSet::new();

/// Guard against revisiting the same `(overriding, overridden, from)` query
/// while it is still being answered.
type OverrideGuard = HashSet<(MethodId, MethodId, ClassId)>;

pub struct MemberResolver<'a, T: TypeSystem + ?Sized> {
    ts: &'a T,
    comparator: &'a SignatureComparator<'a, T>,
    all_methods: BTreeSet<MethodId>,
    inherited: HashMap<ClassId, BTreeSet<MethodId>>,
}

impl<'a, T: TypeSystem + ?Sized> MemberResolver<'a, T> {
    /// Resolve inherited methods for `root` and all of its ancestors.
    pub fn resolve(
        ts: &'a T,
        comparator: &'a SignatureComparator<'a, T>,
        root: ClassId,
    ) -> Result<Self, ApiError> {
        let mut resolver = Self {
            ts,
            comparator,
            all_methods: BTreeSet::new(),
            inherited: HashMap::new(),
        };
        let mut seen = HashSet::new();
        resolver.collect_all_methods(root, &mut seen);
        let mut in_progress = HashSet::new();
        resolver.compute(root, &mut in_progress)?;
        tracing::debug!(
            root = ts.class_name(root),
            all_methods = resolver.all_methods.len(),
            types = resolver.inherited.len(),
            "Members resolved"
        );
        Ok(resolver)
    }

    fn collect_all_methods(&mut self, class: ClassId, seen: &mut HashSet<ClassId>) {
        if !seen.insert(class) {
            return;
        }
        self.all_methods.extend(self.declared(class));
        for iface in self.ts.interface_ids(class) {
            self.collect_all_methods(iface, seen);
        }
        if let Some(sup) = self.ts.superclass_id(class) {
            self.collect_all_methods(sup, seen);
        }
    }

    fn compute(&mut self, class: ClassId, in_progress: &mut HashSet<ClassId>) -> Result<(), ApiError> {
        if self.inherited.contains_key(&class) {
            return Ok(());
        }
        if class == self.ts.well_known().object || self.ts.is_primitive(class) {
            self.inherited.insert(class, BTreeSet::new());
            return Ok(());
        }
        if !in_progress.insert(class) {
            return Err(ApiError::InvalidArgument(format!(
                "cyclic inheritance involving {}",
                self.ts.class_name(class)
            )));
        }
        if let Some(sup) = self.ts.superclass_id(class) {
            self.compute(sup, in_progress)?;
        }
        for iface in self.ts.interface_ids(class) {
            self.compute(iface, in_progress)?;
        }
        in_progress.remove(&class);
        let methods = self.inherited_by(class);
        self.inherited.insert(class, methods);
        Ok(())
    }

    /// Every method declared in `root` or any of its supertypes.
    pub fn all_methods(&self) -> &BTreeSet<MethodId> {
        &self.all_methods
    }

    pub fn inherited(&self, class: ClassId) -> &BTreeSet<MethodId> {
        self.inherited.get(&class).unwrap_or(&NO_METHODS)
    }

    /// Declared plus inherited methods of `class`.
    pub fn member_methods(&self, class: ClassId) -> BTreeSet<MethodId> {
        let mut members: BTreeSet<_> = self.declared(class).collect();
        members.extend(self.inherited(class));
        members
    }

    pub fn declared(&self, class: ClassId) -> impl Iterator<Item = MethodId> + use<'a, T> {
        (0..self.ts.declared_methods(class).len()).map(move |slot| MethodId::new(class, slot))
    }

    fn def(&self, id: MethodId) -> Option<&'a MethodDef> {
        self.ts.method(id)
    }

    fn is_abstract(&self, id: MethodId) -> bool {
        self.def(id).is_some_and(|m| m.is_abstract)
    }

    fn is_abstract_or_default(&self, id: MethodId) -> bool {
        self.def(id).is_some_and(|m| m.is_abstract || m.is_default)
    }

    /// Whether `method` can be seen from code in `class`.
    pub fn is_accessible_from(&self, method: MethodId, class: ClassId) -> bool {
        let Some(def) = self.def(method) else {
            return false;
        };
        match def.access {
            Access::Public | Access::Protected => true,
            Access::PackagePrivate => self.ts.package_of(method.owner) == self.ts.package_of(class),
            Access::Private => method.owner == class,
        }
    }

    fn inherited_by(&self, class: ClassId) -> BTreeSet<MethodId> {
        let declared: Vec<_> = self.declared(class).collect();
        let redeclared = |m: MethodId| {
            declared
                .iter()
                .any(|d| self.comparator.is_sub_signature(*d, m))
        };
        let direct_interfaces = self.ts.interface_ids(class);
        let mut methods = BTreeSet::new();

        if self.ts.is_interface(class) {
            for &iface in &direct_interfaces {
                for m in self.member_methods(iface) {
                    if !self.is_abstract_or_default(m) || redeclared(m) {
                        continue;
                    }
                    let others = direct_interfaces.iter().copied().filter(|o| *o != iface);
                    if !self.overridden_from_any(m, others) {
                        methods.insert(m);
                    }
                }
            }
            return methods;
        }

        let Some(sup) = self.ts.superclass_id(class) else {
            return methods;
        };
        let super_members = self.member_methods(sup);
        let concrete: BTreeSet<_> = super_members
            .iter()
            .copied()
            .filter(|m| !self.is_abstract(*m))
            .filter(|m| self.is_accessible_from(*m, class) && !redeclared(*m))
            .collect();
        let subsumed = |m: MethodId| {
            concrete
                .iter()
                .any(|c| self.comparator.is_sub_signature(*c, m))
        };
        methods.extend(&concrete);

        for &m in &super_members {
            if self.is_abstract(m) && self.is_accessible_from(m, class) && !redeclared(m) && !subsumed(m) {
                methods.insert(m);
            }
        }

        for &iface in &direct_interfaces {
            for m in self.member_methods(iface) {
                if !self.is_abstract_or_default(m) || redeclared(m) || subsumed(m) {
                    continue;
                }
                let others = std::iter::once(sup)
                    .chain(direct_interfaces.iter().copied())
                    .filter(|o| *o != iface);
                if !self.overridden_from_any(m, others) {
                    methods.insert(m);
                }
            }
        }
        methods
    }

    /// Diamond suppression: some other member of one of `others` overrides
    /// `method` from that type. The same method reached along two paths does
    /// not suppress itself.
    fn overridden_from_any(&self, method: MethodId, others: impl Iterator<Item = ClassId>) -> bool {
        let others: Vec<_> = others.collect();
        others.into_iter().any(|other| {
            self.member_methods(other).into_iter().any(|candidate| {
                candidate != method && self.is_overriding_declaration_from(candidate, method, other)
            })
        })
    }

    /// Whether `overriding`, as a member of `from`, overrides the declaration
    /// of `overridden` from `from`.
    pub fn is_overriding_declaration_from(
        &self,
        overriding: MethodId,
        overridden: MethodId,
        from: ClassId,
    ) -> bool {
        let mut guard = OverrideGuard::new();
        self.overrides_from(overriding, overridden, from, &mut guard)
    }

    fn overrides_from(
        &self,
        overriding: MethodId,
        overridden: MethodId,
        from: ClassId,
        guard: &mut OverrideGuard,
    ) -> bool {
        let ts = self.ts;
        if from == ts.well_known().object || ts.is_primitive(from) {
            return false;
        }
        let declaring = overridden.owner;
        if from == declaring {
            return false;
        }
        let (Some(overriding_def), Some(overridden_def)) = (self.def(overriding), self.def(overridden))
        else {
            return false;
        };
        if !self.member_methods(from).contains(&overriding)
            || overriding_def.is_static
            || !ts.is_subclass_of(from, declaring)
            || !self.comparator.is_sub_signature(overriding, overridden)
        {
            return false;
        }

        if ts.is_interface(declaring) {
            return ts.is_interface(from) || overridden_def.is_abstract || overridden_def.is_default;
        }
        // A class method cannot be overridden from an interface.
        if ts.is_interface(from) {
            return false;
        }
        if self.inherited(from).contains(&overridden) {
            return false;
        }
        match overridden_def.access {
            Access::Public | Access::Protected => true,
            Access::Private => false,
            Access::PackagePrivate => {
                if !guard.insert((overriding, overridden, from)) {
                    return false;
                }
                let answer = self.package_private_override(overriding, overridden, from, guard);
                guard.remove(&(overriding, overridden, from));
                answer
            }
        }
    }

    /// Package access: same package as the declaration, or reached through an
    /// intermediate override declared further up the superclass chain.
    fn package_private_override(
        &self,
        overriding: MethodId,
        overridden: MethodId,
        from: ClassId,
        guard: &mut OverrideGuard,
    ) -> bool {
        let ts = self.ts;
        let superclass = ts.superclass_id(from);
        if ts.package_of(overridden.owner) == ts.package_of(from)
            && (overriding.owner == from
                || superclass.is_some_and(|s| self.member_methods(s).contains(&overridden)))
        {
            return true;
        }

        let mut current = superclass;
        while let Some(sup) = current {
            if self.overrides_from(overriding, overridden, sup, guard) {
                return true;
            }
            for &intermediate in &self.all_methods {
                if intermediate != overridden
                    && intermediate != overriding
                    && self.overrides_from(overriding, intermediate, from, guard)
                    && self.overrides_from(intermediate, overridden, sup, guard)
                {
                    return true;
                }
            }
            current = ts.superclass_id(sup);
        }
        false
    }
}
