//! The analysis pipeline for one root type.

use implscope_api::models::{Access, ClassDef, ClassId, ConstructorDef, Type};
use implscope_api::{ApiError, TypeSystem};
use serde::Serialize;
use std::collections::HashSet;

use crate::config::SynthesisConfig;
use crate::engine::comparator::{SignatureComparator, names_of, render, render_type_params};
use crate::engine::context::{ContextStore, GenericContext};
use crate::engine::feasibility::FeasibilityChecker;
use crate::engine::members::MemberResolver;
use crate::engine::partition::partition;
use crate::engine::synthesis::{SignatureSynthesizer, SynthesizedMethod};
use crate::error::{ImplError, Result};

/// Declaration of the implementation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassHeader {
    pub package: String,
    /// Simple name of the implemented type, without any suffix.
    pub simple_name: String,
    pub canonical_name: String,
    pub is_interface: bool,
    /// Type parameters of the implemented type, threaded through unchanged.
    pub type_params: Vec<String>,
    /// Bare names passed as type arguments to the implemented type.
    pub type_arg_names: Vec<String>,
}

/// The superclass constructor the implementation delegates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorDescriptor {
    pub access: Access,
    pub type_params: Vec<String>,
    /// For a varargs constructor the last entry is the element type.
    pub parameter_types: Vec<String>,
    pub exceptions: Vec<String>,
    pub is_varargs: bool,
}

/// Everything needed to write the implementation class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Implementation {
    pub header: ClassHeader,
    /// `None` when the implemented type is an interface.
    pub constructor: Option<ConstructorDescriptor>,
    pub methods: Vec<SynthesizedMethod>,
}

pub struct Implementor<'a, T: TypeSystem + ?Sized> {
    ts: &'a T,
    config: SynthesisConfig,
}

impl<'a, T: TypeSystem + ?Sized> Implementor<'a, T> {
    pub fn new(ts: &'a T) -> Self {
        Self::with_config(ts, SynthesisConfig::default())
    }

    pub fn with_config(ts: &'a T, config: SynthesisConfig) -> Self {
        Self { ts, config }
    }

    /// Compute the stubs a direct concrete subtype of `root` has to declare.
    pub fn analyze(&self, root: ClassId) -> Result<Implementation> {
        let class = self
            .ts
            .class(root)
            .ok_or_else(|| ApiError::NotFound(format!("class #{}", root.0)))?;
        tracing::info!("Analyzing {}", class.name);
        self.run(root, class).inspect_err(|e| {
            tracing::warn!("Cannot implement {}: {}", class.name, e);
        })
    }

    fn run(&self, root: ClassId, class: &ClassDef) -> Result<Implementation> {
        let ts = self.ts;
        self.validate(root, class)?;
        let constructor = self.pick_constructor(root, class)?;

        let contexts = ContextStore::build(ts, root)?;
        tracing::debug!("Built {} generic contexts for {}", contexts.len(), class.name);
        let comparator = SignatureComparator::new(ts, &contexts);
        let members = MemberResolver::resolve(ts, &comparator, root)?;
        let root_members = members.member_methods(root);
        let classes = partition(&comparator, &root_members);
        tracing::debug!(
            "{} members of {} fall into {} equivalence classes",
            root_members.len(),
            class.name,
            classes.len()
        );

        let forbidden = names_of(ts, &class.type_params);
        let synthesizer =
            SignatureSynthesizer::new(ts, &comparator, forbidden, &self.config.type_var_prefix);
        let methods = classes
            .iter()
            .filter(|c| c.has_abstract(ts))
            .map(|c| synthesizer.synthesize(c))
            .collect::<Result<Vec<_>>>()?;

        FeasibilityChecker::new(ts, &comparator, &members).check(root, &methods)?;
        tracing::info!("{} requires {} stubs", class.name, methods.len());

        Ok(Implementation {
            header: self.header(class),
            constructor,
            methods,
        })
    }

    fn validate(&self, root: ClassId, class: &ClassDef) -> Result<()> {
        let unsupported = |reason: &str| Err(ImplError::UnsupportedTarget(reason.to_string()));
        if class.access == Access::Private {
            return unsupported("Cannot implement private interface or extends private class");
        }
        if class.is_primitive() {
            return unsupported("Cannot implement primitive type");
        }
        if class.is_final {
            return unsupported("Cannot extend final class");
        }
        if root == self.ts.well_known().enum_base {
            return unsupported("Cannot extend java.lang.Enum");
        }
        if class.enclosing.is_some() && !class.is_static && !class.is_interface() {
            return unsupported("Cannot implement non-static inner class");
        }
        Ok(())
    }

    /// The first non-private constructor in declaration order.
    fn pick_constructor(&self, root: ClassId, class: &ClassDef) -> Result<Option<ConstructorDescriptor>> {
        if class.is_interface() {
            return Ok(None);
        }
        let constructor = self
            .ts
            .declared_constructors(root)
            .iter()
            .find(|c| c.access != Access::Private)
            .ok_or_else(|| {
                ImplError::NoAccessibleConstructor(
                    "Cannot implement class with only private constructors".to_string(),
                )
            })?;
        Ok(Some(self.describe_constructor(constructor)))
    }

    fn describe_constructor(&self, constructor: &ConstructorDef) -> ConstructorDescriptor {
        let ts = self.ts;
        let context = GenericContext::new();
        let ignore: HashSet<String> = names_of(ts, &constructor.type_params);
        let last = constructor.params.len().saturating_sub(1);
        let parameter_types = constructor
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| match ty {
                Type::Array(component) if constructor.is_varargs && i == last => {
                    render(ts, &context, component, &ignore)
                }
                _ => render(ts, &context, ty, &ignore),
            })
            .collect();
        ConstructorDescriptor {
            access: constructor.access,
            type_params: render_type_params(ts, &context, &constructor.type_params),
            parameter_types,
            exceptions: constructor
                .exceptions
                .iter()
                .map(|e| render(ts, &context, e, &ignore))
                .collect(),
            is_varargs: constructor.is_varargs,
        }
    }

    fn header(&self, class: &ClassDef) -> ClassHeader {
        let ts = self.ts;
        ClassHeader {
            package: class.package.clone(),
            simple_name: class.simple_name.clone(),
            canonical_name: class.name.clone(),
            is_interface: class.is_interface(),
            type_params: render_type_params(ts, &GenericContext::new(), &class.type_params),
            type_arg_names: class
                .type_params
                .iter()
                .map(|id| ts.type_param_name(*id).to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImplErrorKind;
    use implscope_api::TypeProvider;
    use implscope_java::{ClassDescription, ConstructorDescription, MethodDescription, TypeStore};
    use pretty_assertions::assert_eq;

    fn store(classes: Vec<ClassDescription>) -> TypeStore {
        classes
            .into_iter()
            .fold(TypeStore::builder().with_minimal_jdk().unwrap(), |b, c| b.class(c))
            .build()
            .unwrap()
    }

    fn analyze(ts: &TypeStore, name: &str) -> Result<Implementation> {
        Implementor::new(ts).analyze(ts.class_by_name(name).unwrap())
    }

    #[test]
    fn rejects_unsupported_targets() {
        let ts = store(vec![
            ClassDescription::class("demo.Sealed").modifiers(&["public", "final"]),
            ClassDescription::class("demo.Outer").modifiers(&["public"]),
            ClassDescription::class("demo.Outer.Inner")
                .enclosed_in("demo.Outer")
                .modifiers(&["public", "abstract"]),
            ClassDescription::class("demo.Outer.Hidden")
                .enclosed_in("demo.Outer")
                .modifiers(&["private", "static", "abstract"]),
        ]);
        let cases = [
            ("demo.Sealed", "Cannot extend final class"),
            ("java.lang.Enum", "Cannot extend java.lang.Enum"),
            ("int", "Cannot implement primitive type"),
            ("demo.Outer.Inner", "Cannot implement non-static inner class"),
            ("demo.Outer.Hidden", "Cannot implement private interface or extends private class"),
        ];
        for (name, message) in cases {
            let err = analyze(&ts, name).unwrap_err();
            assert_eq!(err.kind(), ImplErrorKind::UnsupportedTarget, "{name}");
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn only_private_constructors_cannot_be_called() {
        let ts = store(vec![ClassDescription::class("demo.Singleton")
            .modifiers(&["public"])
            .constructor(ConstructorDescription::new(&["private"]))]);
        let err = analyze(&ts, "demo.Singleton").unwrap_err();
        assert_eq!(err.kind(), ImplErrorKind::NoAccessibleConstructor);
    }

    #[test]
    fn describes_first_accessible_constructor() {
        let ts = store(vec![ClassDescription::class("demo.Base")
            .modifiers(&["public", "abstract"])
            .type_parameters("<E>")
            .constructor(ConstructorDescription::new(&["private"]))
            .constructor(
                ConstructorDescription::new(&["protected"])
                    .type_parameters("<X extends Number>")
                    .parameters(&["E", "X..."])
                    .throws(&["java.io.IOException"]),
            )]);
        let implementation = analyze(&ts, "demo.Base").unwrap();
        assert_eq!(
            implementation.constructor,
            Some(ConstructorDescriptor {
                access: Access::Protected,
                type_params: vec!["X extends java.lang.Number".to_string()],
                parameter_types: vec!["E".to_string(), "X".to_string()],
                exceptions: vec!["java.io.IOException".to_string()],
                is_varargs: true,
            })
        );
        assert_eq!(implementation.header.type_params, vec!["E".to_string()]);
        assert_eq!(implementation.header.type_arg_names, vec!["E".to_string()]);
        assert!(!implementation.header.is_interface);
    }

    #[test]
    fn abstract_class_stubs_only_abstract_members() {
        let ts = store(vec![ClassDescription::class("demo.Shape")
            .modifiers(&["public", "abstract"])
            .method(MethodDescription::new("area", "double").modifiers(&["public", "abstract"]))
            .method(MethodDescription::new("name", "String").modifiers(&["public"]))
            .method(MethodDescription::new("scale", "void").parameters(&["double"]).modifiers(&["protected", "abstract"]))]);
        let implementation = analyze(&ts, "demo.Shape").unwrap();
        let heads: Vec<_> = implementation.methods.iter().map(ToString::to_string).collect();
        assert_eq!(
            heads,
            vec![
                "public double area()".to_string(),
                "protected void scale(double var0)".to_string()
            ]
        );
        assert_eq!(implementation.constructor.map(|c| c.access), Some(Access::Public));
    }
}
