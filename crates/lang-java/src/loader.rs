//! Turns class descriptions into a resolved type universe.
//!
//! Loading runs in passes so that descriptions may refer to each other in any
//! order:
//!
//! 1. declare a shell for every primitive and described class;
//! 2. link enclosing classes and derive packages and flags;
//! 3. declare the type parameters of every class with empty bounds;
//! 4. resolve bounds, supertypes and members, declaring method and
//!    constructor type parameters the same two-phase way.

use implscope_api::models::{
    Access, ClassDef, ClassId, ClassKind, ConstructorDef, MethodDef, Type, TypeParamDef,
    TypeVarId, WellKnownTypes,
};
use std::collections::HashMap;

use crate::description::{ClassDescription, ConstructorDescription, MethodDescription};
use crate::error::{DescriptionError, Result};
use crate::syntax::{self, TypeExpr, TypeParamExpr};

pub const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Arena contents of a loaded universe.
pub(crate) struct Universe {
    pub classes: Vec<ClassDef>,
    pub by_name: HashMap<String, ClassId>,
    pub type_params: Vec<TypeParamDef>,
    pub well_known: WellKnownTypes,
}

/// Name lookup scope: the declaring class (with its enclosing chain) plus any
/// type parameters of the method or constructor being resolved.
#[derive(Default, Clone)]
pub(crate) struct Scope {
    pub class: Option<ClassId>,
    pub locals: Vec<TypeVarId>,
}

/// Binds parsed type expressions to ids.
pub(crate) struct Resolver<'a> {
    pub classes: &'a [ClassDef],
    pub by_name: &'a HashMap<String, ClassId>,
    pub type_params: &'a [TypeParamDef],
    pub object: ClassId,
}

impl Resolver<'_> {
    pub fn resolve(&self, expr: &TypeExpr, scope: &Scope, context: &str) -> Result<Type> {
        match expr {
            TypeExpr::Array(component) => {
                Ok(Type::array_of(self.resolve(component, scope, context)?))
            }
            TypeExpr::Wildcard { upper, lower } => {
                let mut upper = self.resolve_all(upper, scope, context)?;
                if upper.is_empty() {
                    upper.push(Type::Class(self.object));
                }
                Ok(Type::Wildcard {
                    upper,
                    lower: self.resolve_all(lower, scope, context)?,
                })
            }
            TypeExpr::Named {
                name,
                args,
                owner_parameterized,
            } => {
                if let Some(var) = self.lookup_type_var(name, scope) {
                    if !args.is_empty() {
                        return Err(DescriptionError::ArgumentsOnTypeVariable(name.clone()));
                    }
                    return Ok(Type::TypeVar(var));
                }
                let raw = self.lookup_class(name, scope).ok_or_else(|| {
                    DescriptionError::UnknownType {
                        name: name.clone(),
                        context: context.to_string(),
                    }
                })?;
                if !args.is_empty() {
                    Ok(Type::parameterized(
                        raw,
                        self.resolve_all(args, scope, context)?,
                    ))
                } else if *owner_parameterized || self.implicitly_owner_parameterized(name, raw, scope) {
                    Ok(Type::parameterized(raw, vec![]))
                } else {
                    Ok(Type::Class(raw))
                }
            }
        }
    }

    pub fn resolve_all(&self, exprs: &[TypeExpr], scope: &Scope, context: &str) -> Result<Vec<Type>> {
        exprs
            .iter()
            .map(|e| self.resolve(e, scope, context))
            .collect()
    }

    fn lookup_type_var(&self, name: &str, scope: &Scope) -> Option<TypeVarId> {
        if name.contains('.') {
            return None;
        }
        let named = |id: &&TypeVarId| {
            id.declared_index()
                .and_then(|i| self.type_params.get(i))
                .is_some_and(|tp| tp.name == name)
        };
        if let Some(id) = scope.locals.iter().find(named) {
            return Some(*id);
        }
        self.class_chain(scope.class)
            .find_map(|class| class.type_params.iter().find(named).copied())
    }

    fn lookup_class(&self, name: &str, scope: &Scope) -> Option<ClassId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        if let Some(id) = self.lookup_member_class(name, scope) {
            return Some(id);
        }
        if let Some(class) = scope.class.and_then(|id| self.classes.get(id.index())) {
            if !class.package.is_empty() {
                if let Some(id) = self.by_name.get(&format!("{}.{}", class.package, name)) {
                    return Some(*id);
                }
            }
        }
        if let Some(id) = self.by_name.get(&format!("java.lang.{name}")) {
            return Some(*id);
        }
        let (first, rest) = name.split_once('.')?;
        let outer = self.lookup_class(first, scope)?;
        let outer = self.classes.get(outer.index())?;
        self.by_name.get(&format!("{}.{}", outer.name, rest)).copied()
    }

    /// A member class named relative to the scope's class or one of its
    /// enclosing classes.
    fn lookup_member_class(&self, name: &str, scope: &Scope) -> Option<ClassId> {
        self.class_chain(scope.class)
            .find_map(|class| self.by_name.get(&format!("{}.{}", class.name, name)).copied())
    }

    /// `Inner` written inside `Outer<T>` means `Outer<T>.Inner`. A fully
    /// qualified spelling stays raw.
    fn implicitly_owner_parameterized(&self, name: &str, raw: ClassId, scope: &Scope) -> bool {
        !self.by_name.contains_key(name)
            && self.lookup_member_class(name, scope) == Some(raw)
            && self.has_generic_owner(raw)
    }

    /// Inner class whose enclosing chain, up to the first static boundary,
    /// declares type parameters.
    fn has_generic_owner(&self, id: ClassId) -> bool {
        let mut current = self.classes.get(id.index());
        let mut remaining = self.classes.len();
        while let Some(class) = current {
            if class.is_static || remaining == 0 {
                return false;
            }
            remaining -= 1;
            let Some(outer) = class.enclosing.and_then(|o| self.classes.get(o.index())) else {
                return false;
            };
            if outer.is_generic() {
                return true;
            }
            current = Some(outer);
        }
        false
    }

    /// The class itself followed by its enclosing classes, innermost first.
    fn class_chain(&self, start: Option<ClassId>) -> impl Iterator<Item = &ClassDef> {
        let mut next = start;
        let mut remaining = self.classes.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let class = self.classes.get(next?.index())?;
            next = class.enclosing;
            Some(class)
        })
    }
}

pub(crate) fn load(descriptions: &[ClassDescription]) -> Result<Universe> {
    let mut classes = Vec::with_capacity(PRIMITIVES.len() + descriptions.len());
    let mut by_name = HashMap::new();

    for name in PRIMITIVES {
        by_name.insert(name.to_string(), ClassId(classes.len() as u32));
        classes.push(primitive(name));
    }
    let first_described = classes.len();
    for desc in descriptions {
        let id = ClassId(classes.len() as u32);
        if by_name.insert(desc.name.clone(), id).is_some() {
            return Err(DescriptionError::DuplicateClass(desc.name.clone()));
        }
        classes.push(shell(desc)?);
    }

    let well_known = WellKnownTypes {
        object: well_known(&by_name, "java.lang.Object")?,
        enum_base: well_known(&by_name, "java.lang.Enum")?,
        cloneable: well_known(&by_name, "java.lang.Cloneable")?,
        serializable: well_known(&by_name, "java.io.Serializable")?,
        void: well_known(&by_name, "void")?,
        boolean: well_known(&by_name, "boolean")?,
    };

    link_enclosing(&mut classes, &by_name, descriptions, first_described)?;

    let mut type_params = Vec::new();
    let mut class_param_exprs = Vec::with_capacity(descriptions.len());
    for (offset, desc) in descriptions.iter().enumerate() {
        let exprs = syntax::parse_type_params(&desc.type_parameters)?;
        classes[first_described + offset].type_params = declare(&mut type_params, &exprs);
        class_param_exprs.push(exprs);
    }

    for (offset, desc) in descriptions.iter().enumerate() {
        let id = ClassId((first_described + offset) as u32);
        let class_scope = Scope {
            class: Some(id),
            locals: vec![],
        };
        let class_tps = classes[id.index()].type_params.clone();
        let bounds = {
            let resolver = Resolver {
                classes: &classes,
                by_name: &by_name,
                type_params: &type_params,
                object: well_known.object,
            };
            resolve_bounds(&resolver, &class_param_exprs[offset], &class_scope, &desc.name)?
        };
        patch_bounds(&mut type_params, &class_tps, bounds);

        let resolved = resolve_class(
            desc,
            id,
            &classes,
            &by_name,
            &mut type_params,
            well_known.object,
        )?;
        let class = &mut classes[id.index()];
        class.super_class = resolved.super_class;
        class.interfaces = resolved.interfaces;
        class.methods = resolved.methods;
        class.constructors = resolved.constructors;
    }
    default_bounds(&mut type_params, well_known.object);

    Ok(Universe {
        classes,
        by_name,
        type_params,
        well_known,
    })
}

struct ResolvedClass {
    super_class: Option<Type>,
    interfaces: Vec<Type>,
    methods: Vec<MethodDef>,
    constructors: Vec<ConstructorDef>,
}

fn resolve_class(
    desc: &ClassDescription,
    id: ClassId,
    classes: &[ClassDef],
    by_name: &HashMap<String, ClassId>,
    type_params: &mut Vec<TypeParamDef>,
    object: ClassId,
) -> Result<ResolvedClass> {
    let kind = classes[id.index()].kind;
    let scope = Scope {
        class: Some(id),
        locals: vec![],
    };
    let context = format!("supertypes of {}", desc.name);

    let (super_class, interfaces) = {
        let resolver = Resolver {
            classes,
            by_name,
            type_params,
            object,
        };
        let super_class = match (&desc.superclass, kind) {
            (Some(_), ClassKind::Interface) => {
                return Err(DescriptionError::invalid(
                    &desc.name,
                    "interfaces cannot declare a superclass",
                ));
            }
            (Some(text), _) => Some(resolver.resolve(&syntax::parse_type(text)?, &scope, &context)?),
            (None, ClassKind::Class) if id != object => Some(Type::Class(object)),
            (None, _) => None,
        };
        let mut interfaces = Vec::with_capacity(desc.interfaces.len());
        for text in &desc.interfaces {
            interfaces.push(resolver.resolve(&syntax::parse_type(text)?, &scope, &context)?);
        }
        (super_class, interfaces)
    };

    let mut methods = Vec::with_capacity(desc.methods.len());
    for method in &desc.methods {
        methods.push(resolve_method(
            desc, method, id, kind, classes, by_name, type_params, object,
        )?);
    }

    let constructors = match (&desc.constructors, kind) {
        (_, ClassKind::Interface | ClassKind::Primitive) => vec![],
        (None, ClassKind::Class) => vec![ConstructorDef {
            type_params: vec![],
            params: vec![],
            exceptions: vec![],
            access: Access::Public,
            is_varargs: false,
        }],
        (Some(list), ClassKind::Class) => {
            let mut constructors = Vec::with_capacity(list.len());
            for ctor in list {
                constructors.push(resolve_constructor(
                    desc, ctor, id, classes, by_name, type_params, object,
                )?);
            }
            constructors
        }
    };

    Ok(ResolvedClass {
        super_class,
        interfaces,
        methods,
        constructors,
    })
}

/// Resolved pieces shared by methods and constructors.
struct Signature {
    type_params: Vec<TypeVarId>,
    params: Vec<Type>,
    exceptions: Vec<Type>,
    is_varargs: bool,
    scope: Scope,
}

#[allow(clippy::too_many_arguments)]
fn resolve_signature(
    context: &str,
    clause: &str,
    parameters: &[String],
    throws: &[String],
    class: ClassId,
    classes: &[ClassDef],
    by_name: &HashMap<String, ClassId>,
    type_params: &mut Vec<TypeParamDef>,
    object: ClassId,
) -> Result<Signature> {
    let exprs = syntax::parse_type_params(clause)?;
    let locals = declare(type_params, &exprs);
    let scope = Scope {
        class: Some(class),
        locals: locals.clone(),
    };
    let bounds = {
        let resolver = Resolver {
            classes,
            by_name,
            type_params,
            object,
        };
        resolve_bounds(&resolver, &exprs, &scope, context)?
    };
    patch_bounds(type_params, &locals, bounds);

    let resolver = Resolver {
        classes,
        by_name,
        type_params,
        object,
    };
    let mut params = Vec::with_capacity(parameters.len());
    let mut is_varargs = false;
    for (index, text) in parameters.iter().enumerate() {
        let param = syntax::parse_param(text)?;
        if param.is_varargs && index + 1 != parameters.len() {
            return Err(DescriptionError::invalid(
                context,
                "only the last parameter may be variable arity",
            ));
        }
        is_varargs |= param.is_varargs;
        params.push(resolver.resolve(&param.ty, &scope, context)?);
    }
    let mut exceptions = Vec::with_capacity(throws.len());
    for text in throws {
        exceptions.push(resolver.resolve(&syntax::parse_type(text)?, &scope, context)?);
    }
    Ok(Signature {
        type_params: locals,
        params,
        exceptions,
        is_varargs,
        scope,
    })
}

#[allow(clippy::too_many_arguments)]
fn resolve_method(
    desc: &ClassDescription,
    method: &MethodDescription,
    class: ClassId,
    kind: ClassKind,
    classes: &[ClassDef],
    by_name: &HashMap<String, ClassId>,
    type_params: &mut Vec<TypeParamDef>,
    object: ClassId,
) -> Result<MethodDef> {
    let context = format!("{}.{}", desc.name, method.name);
    let sig = resolve_signature(
        &context,
        &method.type_parameters,
        &method.parameters,
        &method.throws,
        class,
        classes,
        by_name,
        type_params,
        object,
    )?;
    let return_type = Resolver {
        classes,
        by_name,
        type_params,
        object,
    }
    .resolve(&syntax::parse_type(&method.return_type)?, &sig.scope, &context)?;

    let is_static = method.has_modifier("static");
    let is_default = method.has_modifier("default");
    let (access, is_abstract) = match kind {
        ClassKind::Interface => {
            let access = Access::from_modifiers(&method.modifiers).unwrap_or(Access::Public);
            let has_body = is_static || is_default || access == Access::Private;
            (access, method.has_modifier("abstract") || !has_body)
        }
        _ => (
            Access::from_modifiers(&method.modifiers).unwrap_or(Access::PackagePrivate),
            method.has_modifier("abstract"),
        ),
    };
    if is_abstract && (is_static || access == Access::Private) {
        return Err(DescriptionError::invalid(
            &context,
            "abstract methods cannot be static or private",
        ));
    }

    Ok(MethodDef {
        name: method.name.clone(),
        type_params: sig.type_params,
        params: sig.params,
        return_type,
        exceptions: sig.exceptions,
        access,
        is_abstract,
        is_default,
        is_static,
        is_varargs: sig.is_varargs,
    })
}

fn resolve_constructor(
    desc: &ClassDescription,
    ctor: &ConstructorDescription,
    class: ClassId,
    classes: &[ClassDef],
    by_name: &HashMap<String, ClassId>,
    type_params: &mut Vec<TypeParamDef>,
    object: ClassId,
) -> Result<ConstructorDef> {
    let context = format!("constructor of {}", desc.name);
    let sig = resolve_signature(
        &context,
        &ctor.type_parameters,
        &ctor.parameters,
        &ctor.throws,
        class,
        classes,
        by_name,
        type_params,
        object,
    )?;
    Ok(ConstructorDef {
        type_params: sig.type_params,
        params: sig.params,
        exceptions: sig.exceptions,
        access: Access::from_modifiers(&ctor.modifiers).unwrap_or(Access::PackagePrivate),
        is_varargs: sig.is_varargs,
    })
}

fn resolve_bounds(
    resolver: &Resolver<'_>,
    exprs: &[TypeParamExpr],
    scope: &Scope,
    context: &str,
) -> Result<Vec<Vec<Type>>> {
    exprs
        .iter()
        .map(|tp| resolver.resolve_all(&tp.bounds, scope, context))
        .collect()
}

/// Allocate type variables with empty bounds so siblings can refer to each other.
fn declare(type_params: &mut Vec<TypeParamDef>, exprs: &[TypeParamExpr]) -> Vec<TypeVarId> {
    exprs
        .iter()
        .map(|tp| {
            let id = TypeVarId::declared(type_params.len() as u32);
            type_params.push(TypeParamDef {
                name: tp.name.clone(),
                bounds: vec![],
            });
            id
        })
        .collect()
}

fn patch_bounds(type_params: &mut [TypeParamDef], ids: &[TypeVarId], bounds: Vec<Vec<Type>>) {
    for (id, bounds) in ids.iter().zip(bounds) {
        if let Some(tp) = id.declared_index().and_then(|i| type_params.get_mut(i)) {
            tp.bounds = bounds;
        }
    }
}

/// Fill empty bound lists with `java.lang.Object`.
fn default_bounds(type_params: &mut [TypeParamDef], object: ClassId) {
    for tp in type_params {
        if tp.bounds.is_empty() {
            tp.bounds.push(Type::Class(object));
        }
    }
}

fn primitive(name: &str) -> ClassDef {
    ClassDef {
        name: name.to_string(),
        simple_name: name.to_string(),
        package: String::new(),
        kind: ClassKind::Primitive,
        access: Access::Public,
        is_abstract: true,
        is_final: true,
        is_static: false,
        type_params: vec![],
        super_class: None,
        interfaces: vec![],
        enclosing: None,
        methods: vec![],
        constructors: vec![],
    }
}

fn shell(desc: &ClassDescription) -> Result<ClassDef> {
    if desc.kind == ClassKind::Primitive {
        return Err(DescriptionError::invalid(
            &desc.name,
            "primitive types are built in and cannot be described",
        ));
    }
    let simple_name = desc
        .name
        .rsplit('.')
        .next()
        .unwrap_or(&desc.name)
        .to_string();
    let is_interface = desc.kind == ClassKind::Interface;
    Ok(ClassDef {
        name: desc.name.clone(),
        simple_name,
        package: String::new(),
        kind: desc.kind,
        access: Access::from_modifiers(&desc.modifiers).unwrap_or(Access::PackagePrivate),
        is_abstract: is_interface || desc.has_modifier("abstract"),
        is_final: desc.has_modifier("final"),
        is_static: is_interface || desc.has_modifier("static"),
        type_params: vec![],
        super_class: None,
        interfaces: vec![],
        enclosing: None,
        methods: vec![],
        constructors: vec![],
    })
}

/// Link member types to their enclosing class and derive packages. Member
/// types of interfaces are implicitly public and static.
fn link_enclosing(
    classes: &mut [ClassDef],
    by_name: &HashMap<String, ClassId>,
    descriptions: &[ClassDescription],
    first_described: usize,
) -> Result<()> {
    for (offset, desc) in descriptions.iter().enumerate() {
        let Some(outer_name) = &desc.enclosing else {
            continue;
        };
        let outer = *by_name
            .get(outer_name)
            .ok_or_else(|| DescriptionError::UnknownType {
                name: outer_name.clone(),
                context: format!("enclosing class of {}", desc.name),
            })?;
        let outer_is_interface = classes[outer.index()].is_interface();
        let class = &mut classes[first_described + offset];
        class.enclosing = Some(outer);
        if outer_is_interface {
            class.is_static = true;
            if Access::from_modifiers(&desc.modifiers).is_none() {
                class.access = Access::Public;
            }
        }
    }

    for (offset, desc) in descriptions.iter().enumerate() {
        let mut outermost = first_described + offset;
        let mut steps = 0;
        while let Some(outer) = classes[outermost].enclosing {
            outermost = outer.index();
            steps += 1;
            if steps > classes.len() {
                return Err(DescriptionError::invalid(
                    &desc.name,
                    "enclosing classes form a cycle",
                ));
            }
        }
        let package = match (&desc.package, outermost.checked_sub(first_described)) {
            (Some(package), _) => package.clone(),
            (None, Some(outer_offset)) => match &descriptions[outer_offset].package {
                Some(package) => package.clone(),
                None => package_prefix(&descriptions[outer_offset].name),
            },
            (None, None) => package_prefix(&desc.name),
        };
        classes[first_described + offset].package = package;
    }
    Ok(())
}

fn package_prefix(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(package, _)| package.to_string())
        .unwrap_or_default()
}

fn well_known(by_name: &HashMap<String, ClassId>, name: &'static str) -> Result<ClassId> {
    by_name
        .get(name)
        .copied()
        .ok_or(DescriptionError::MissingWellKnown(name))
}
