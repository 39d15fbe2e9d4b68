//! Checks that a concrete subtype of the root can exist at all.

use implscope_api::TypeSystem;
use implscope_api::models::{Access, ClassId, MethodId};
use std::collections::BTreeSet;

use super::comparator::SignatureComparator;
use super::members::MemberResolver;
use super::synthesis::SynthesizedMethod;
use crate::error::{ImplError, Result};

pub struct FeasibilityChecker<'a, T: TypeSystem + ?Sized> {
    ts: &'a T,
    comparator: &'a SignatureComparator<'a, T>,
    members: &'a MemberResolver<'a, T>,
}

impl<'a, T: TypeSystem + ?Sized> FeasibilityChecker<'a, T> {
    pub fn new(
        ts: &'a T,
        comparator: &'a SignatureComparator<'a, T>,
        members: &'a MemberResolver<'a, T>,
    ) -> Self {
        Self {
            ts,
            comparator,
            members,
        }
    }

    pub fn check(&self, root: ClassId, stubs: &[SynthesizedMethod]) -> Result<()> {
        self.check_signature_conflicts(root, stubs)?;
        self.check_package_private_abstracts(root)
    }

    /// A member that erases to the same parameter list as a stub without being
    /// overridden by it would clash with the stub in the subtype.
    pub fn check_signature_conflicts(&self, root: ClassId, stubs: &[SynthesizedMethod]) -> Result<()> {
        let members: BTreeSet<MethodId> = self.members.member_methods(root);
        let contexts = self.comparator.contexts();
        for &member in &members {
            let Some(member_def) = self.ts.method(member) else {
                continue;
            };
            for stub in stubs {
                let reference = stub.reference;
                if stub.name == member_def.name
                    && !self.comparator.is_sub_signature(reference, member)
                    && self
                        .comparator
                        .has_same_erasure(reference, member, contexts.get(reference.owner))
                {
                    tracing::warn!(stub = %stub, owner = self.ts.class_name(member.owner), "Signature conflict");
                    return Err(ImplError::SignatureConflict {
                        stub: stub.to_string(),
                        member: format!("{}.{}", self.ts.class_name(member.owner), member_def.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// A package-private abstract method declared by a superclass in another
    /// package must be overridden, from somewhere along the superclass chain,
    /// by a method the subtype can see.
    pub fn check_package_private_abstracts(&self, root: ClassId) -> Result<()> {
        let ts = self.ts;
        let root_package = ts.package_of(root);
        let mut chain = Vec::new();
        let mut current = Some(root);
        while let Some(class) = current {
            chain.push(class);
            if ts.package_of(class) != root_package {
                for (slot, declared) in ts.declared_methods(class).iter().enumerate() {
                    if declared.access != Access::PackagePrivate || !declared.is_abstract {
                        continue;
                    }
                    let method = MethodId::new(class, slot);
                    let overridden = self.members.all_methods().iter().any(|candidate| {
                        chain.iter().any(|from| {
                            self.members
                                .is_overriding_declaration_from(*candidate, method, *from)
                        })
                    });
                    if !overridden {
                        tracing::warn!(
                            owner = ts.class_name(class),
                            method = %declared.name,
                            "Package-private abstract method cannot be overridden"
                        );
                        return Err(ImplError::UnimplementableHierarchy {
                            owner: ts.class_name(class).to_string(),
                            method: declared.name.clone(),
                        });
                    }
                }
            }
            current = ts.superclass_id(class);
        }
        Ok(())
    }
}
