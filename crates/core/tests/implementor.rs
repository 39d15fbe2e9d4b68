use implscope_api::TypeProvider;
use implscope_core::{Implementation, Implementor, ImplErrorKind, Result};
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
    let root = ts.class_by_name(name).unwrap();
    Implementor::new(ts).analyze(root)
}

fn heads(implementation: &Implementation) -> Vec<String> {
    implementation.methods.iter().map(ToString::to_string).collect()
}

#[test]
fn bounded_generic_method_keeps_its_bounds() {
    let ts = store(vec![ClassDescription::interface("demo.Maths").method(
        MethodDescription::new("max", "T")
            .type_parameters("<T extends Number & Comparable<? super T>>")
            .parameters(&["T", "T"]),
    )]);
    let implementation = analyze(&ts, "demo.Maths").unwrap();
    assert_eq!(implementation.methods.len(), 1);
    let max = &implementation.methods[0];
    assert_eq!(
        max.type_params,
        vec!["Var0 extends java.lang.Number & java.lang.Comparable<? super Var0>".to_string()]
    );
    assert_eq!(max.return_type, "Var0");
    assert_eq!(max.parameter_types, vec!["Var0".to_string(), "Var0".to_string()]);
    assert!(implementation.constructor.is_none());
    assert!(implementation.header.is_interface);
}

#[test]
fn alpha_equivalent_methods_share_one_stub() {
    let ts = store(vec![
        ClassDescription::interface("demo.First")
            .method(MethodDescription::new("get", "T").type_parameters("<T>")),
        ClassDescription::interface("demo.Second")
            .method(MethodDescription::new("get", "U").type_parameters("<U>")),
        ClassDescription::interface("demo.Both")
            .implements("First")
            .implements("Second"),
    ]);
    let implementation = analyze(&ts, "demo.Both").unwrap();
    assert_eq!(heads(&implementation), vec!["public <Var0> Var0 get()".to_string()]);
}

#[test]
fn fresh_names_avoid_the_type_parameters_of_the_root() {
    let ts = store(vec![ClassDescription::interface("demo.Mapper")
        .type_parameters("<Var0>")
        .method(
            MethodDescription::new("map", "R")
                .type_parameters("<R>")
                .parameters(&["Var0", "java.util.List<R>"]),
        )]);
    let implementation = analyze(&ts, "demo.Mapper").unwrap();
    assert_eq!(
        heads(&implementation),
        vec!["public <Var1> Var1 map(Var0 var0, java.util.List<Var1> var1)".to_string()]
    );
    assert_eq!(implementation.header.type_params, vec!["Var0".to_string()]);
}

#[test]
fn inherited_generic_methods_render_in_root_terms() {
    let ts = store(vec![
        ClassDescription::interface("demo.Sink")
            .type_parameters("<S>")
            .method(MethodDescription::new("accept", "void").parameters(&["S"]))
            .method(MethodDescription::new("drain", "java.util.List<S>")),
        ClassDescription::interface("demo.ListSink")
            .type_parameters("<E>")
            .implements("Sink<java.util.List<E>>"),
    ]);
    let implementation = analyze(&ts, "demo.ListSink").unwrap();
    assert_eq!(
        heads(&implementation),
        vec![
            "public void accept(java.util.List<E> var0)".to_string(),
            "public java.util.List<java.util.List<E>> drain()".to_string(),
        ]
    );
}

#[test]
fn abstract_list_needs_get_and_size() {
    let ts = TypeStore::with_minimal_jdk().unwrap();
    let implementation = analyze(&ts, "java.util.AbstractList").unwrap();
    let mut stubs = heads(&implementation);
    stubs.sort();
    assert_eq!(
        stubs,
        vec!["public E get(int var0)".to_string(), "public int size()".to_string()]
    );
    let constructor = implementation.constructor.unwrap();
    assert_eq!(constructor.access.keyword(), "protected");
    assert_eq!(implementation.header.canonical_name, "java.util.AbstractList");
}

#[test]
fn concrete_superclass_satisfies_interface_methods() {
    let ts = store(vec![
        ClassDescription::interface("demo.Task").method(MethodDescription::new("run", "void")),
        ClassDescription::class("demo.Worker")
            .modifiers(&["public"])
            .method(MethodDescription::new("run", "void").modifiers(&["public"])),
        ClassDescription::class("demo.Job")
            .modifiers(&["public", "abstract"])
            .extends("Worker")
            .implements("Task")
            .method(MethodDescription::new("cancel", "boolean").modifiers(&["public", "abstract"])),
    ]);
    let implementation = analyze(&ts, "demo.Job").unwrap();
    assert_eq!(heads(&implementation), vec!["public boolean cancel()".to_string()]);
}

#[test]
fn default_methods_take_part_without_forcing_a_stub() {
    let ts = store(vec![
        ClassDescription::interface("demo.Named")
            .method(MethodDescription::new("name", "String").modifiers(&["default"])),
        ClassDescription::interface("demo.Labeled")
            .implements("Named")
            .method(MethodDescription::new("label", "String")),
    ]);
    let implementation = analyze(&ts, "demo.Labeled").unwrap();
    assert_eq!(heads(&implementation), vec!["public java.lang.String label()".to_string()]);
}

#[test]
fn package_private_abstract_out_of_reach_is_unimplementable() {
    let ts = store(vec![
        ClassDescription::class("lib.Base")
            .modifiers(&["public", "abstract"])
            .method(MethodDescription::new("hook", "void").modifiers(&["abstract"])),
        ClassDescription::class("app.Child")
            .modifiers(&["public", "abstract"])
            .extends("lib.Base"),
    ]);
    let err = analyze(&ts, "app.Child").unwrap_err();
    assert_eq!(err.kind(), ImplErrorKind::UnimplementableHierarchy);
    assert_eq!(
        err.to_string(),
        "Cannot generate non-abstract implementation: method lib.Base.hook is abstract and cannot be overridden"
    );

    let base = analyze(&ts, "lib.Base").unwrap();
    assert_eq!(heads(&base), vec!["void hook()".to_string()]);
}

#[test]
fn raw_parameter_types_are_rejected() {
    let ts = store(vec![ClassDescription::interface("demo.Sink")
        .method(MethodDescription::new("accept", "void").parameters(&["java.util.List"]))]);
    let err = analyze(&ts, "demo.Sink").unwrap_err();
    assert_eq!(err.kind(), ImplErrorKind::RawTypeRequired);
}

#[test]
fn erasure_clash_without_override_is_a_conflict() {
    let ts = store(vec![
        ClassDescription::interface("demo.Strings")
            .method(MethodDescription::new("put", "void").parameters(&["java.util.List<String>"])),
        ClassDescription::interface("demo.Numbers")
            .method(MethodDescription::new("put", "void").parameters(&["java.util.List<Integer>"])),
        ClassDescription::interface("demo.Both")
            .implements("Strings")
            .implements("Numbers"),
    ]);
    let err = analyze(&ts, "demo.Both").unwrap_err();
    assert_eq!(err.kind(), ImplErrorKind::SignatureConflict);
}

#[test]
fn type_without_abstract_members_needs_no_stubs() {
    let ts = store(vec![
        ClassDescription::interface("demo.Marker"),
        ClassDescription::class("demo.Plain")
            .modifiers(&["public"])
            .constructor(ConstructorDescription::new(&["public"]).parameters(&["String..."])),
    ]);
    assert!(analyze(&ts, "demo.Marker").unwrap().methods.is_empty());
    let plain = analyze(&ts, "demo.Plain").unwrap();
    assert!(plain.methods.is_empty());
    let constructor = plain.constructor.unwrap();
    assert!(constructor.is_varargs);
    assert_eq!(constructor.parameter_types, vec!["java.lang.String".to_string()]);
}

#[test]
fn repeated_analysis_is_identical() {
    let ts = TypeStore::with_minimal_jdk().unwrap();
    let first = analyze(&ts, "java.util.AbstractList").unwrap();
    let second = analyze(&ts, "java.util.AbstractList").unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// A generic interface reachable with two different arguments is read with
/// the arguments of the first path visited.
#[test]
fn multiply_reachable_generic_interface_uses_first_path() {
    let ts = store(vec![
        ClassDescription::interface("demo.Holder")
            .type_parameters("<H>")
            .method(MethodDescription::new("value", "H")),
        ClassDescription::interface("demo.Left").implements("Holder<String>"),
        ClassDescription::interface("demo.Right").implements("Holder<Integer>"),
        ClassDescription::interface("demo.Both")
            .implements("Left")
            .implements("Right"),
    ]);
    let implementation = analyze(&ts, "demo.Both").unwrap();
    assert_eq!(
        heads(&implementation),
        vec!["public java.lang.String value()".to_string()]
    );
}

/// The covariant return of an inherited generic method is judged after its
/// type arguments are applied, whatever order the supertypes are declared in.
#[test]
fn return_type_choice_uses_inherited_type_arguments() {
    let plain = || {
        ClassDescription::interface("demo.Plain").method(MethodDescription::new("get", "Number"))
    };
    let generic = || {
        ClassDescription::interface("demo.Generic")
            .type_parameters("<T>")
            .method(MethodDescription::new("get", "T"))
    };
    let root = || {
        ClassDescription::interface("demo.Both")
            .implements("Plain")
            .implements("Generic<Integer>")
    };

    for classes in [
        vec![plain(), generic(), root()],
        vec![generic(), plain(), root()],
    ] {
        let ts = store(classes);
        let implementation = analyze(&ts, "demo.Both").unwrap();
        assert_eq!(
            heads(&implementation),
            vec!["public java.lang.Integer get()".to_string()]
        );
    }
}

#[test]
fn inner_class_named_inside_generic_owner_is_not_raw() {
    let ts = store(vec![
        ClassDescription::class("demo.Outer")
            .modifiers(&["public", "abstract"])
            .type_parameters("<T>")
            .method(MethodDescription::new("make", "Inner").modifiers(&["public", "abstract"])),
        ClassDescription::class("demo.Outer.Inner")
            .modifiers(&["public"])
            .enclosed_in("demo.Outer"),
    ]);
    let implementation = analyze(&ts, "demo.Outer").unwrap();
    assert_eq!(
        heads(&implementation),
        vec!["public demo.Outer.Inner make()".to_string()]
    );
}
