//! Function application: binding, defaults, callees stored as fields and memoization.

use std::cell::Cell;
use std::rc::Rc;

use idmap::{
    Application, Args, Argument, Batch, Callee, Entry, FrozenMap, Function, FunctionError,
    Identifiable, Param, Value,
};

use crate::helpers::{add, counted, map_of};

#[test]
fn test_closure_is_evaluated_once() {
    let (inc, calls) = counted("inc");
    let map = map_of(&[("a", 1)])
        .apply(Application::new(inc).output("b").unwrap())
        .unwrap();

    assert_eq!(calls.get(), 0, "building must not evaluate");
    assert!(!map.get("b").unwrap().is_evaluated());

    assert_eq!(map.value("b").unwrap(), Value::Int(2));
    assert_eq!(map.value("b").unwrap(), Value::Int(2));
    assert_eq!(calls.get(), 1);
    assert!(map.get("b").unwrap().is_evaluated());
}

#[test]
fn test_merged_maps_share_memoized_entries() {
    let (inc, calls) = counted("inc");
    let base = map_of(&[("a", 1)])
        .apply(Application::new(inc).output("b").unwrap())
        .unwrap();
    let extended = base.merge(Batch::new().with("c", 10)).unwrap();

    base.value("b").unwrap();
    extended.value("b").unwrap();
    assert_eq!(calls.get(), 1);
    assert!(base.get("b").unwrap().ptr_eq(extended.get("b").unwrap()));
}

#[test]
fn test_arguments_are_evaluated_before_the_call() {
    let (inc, calls) = counted("inc");
    let map = map_of(&[("a", 1)])
        .apply(Application::new(inc).output("b").unwrap())
        .unwrap()
        .apply(
            Application::new(add())
                .arg(Argument::field("b"))
                .arg(Argument::field("b"))
                .output("c")
                .unwrap(),
        )
        .unwrap();

    assert_eq!(map.value("c").unwrap(), Value::Int(4));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_defaults_fill_omitted_parameters() {
    let scale = Function::new(
        "scale",
        [Param::new("x"), Param::with_default("factor", 10)],
        |args: &Args| Ok(Value::Int(args.i64("x")? * args.i64("factor")?)),
    );

    let map = map_of(&[("x", 3)])
        .apply(Application::new(scale.clone()).output("default").unwrap())
        .unwrap()
        .apply(
            Application::new(scale.clone())
                .kwarg("factor", 2)
                .output("explicit")
                .unwrap(),
        )
        .unwrap()
        .apply(
            Application::new(scale)
                .kwarg("factor", 10)
                .output("same")
                .unwrap(),
        )
        .unwrap();

    assert_eq!(map.value("default").unwrap(), Value::Int(30));
    assert_eq!(map.value("explicit").unwrap(), Value::Int(6));
    // An explicit argument equal to the default is the same computation.
    assert_eq!(map.ids()["default"], map.ids()["same"]);
    assert_ne!(map.ids()["default"], map.ids()["explicit"]);
}

#[test]
fn test_default_argument_is_a_plain_value() {
    let map = map_of(&[("a", 1)])
        .apply(
            Application::new(add())
                .kwarg("b", Argument::default(5))
                .output("c")
                .unwrap(),
        )
        .unwrap();
    assert_eq!(map.value("c").unwrap(), Value::Int(6));
}

#[test]
fn test_callee_stored_as_field() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("f", add())
            .with("x", 2)
            .with("y", 5),
    )
    .unwrap()
    .apply(
        Application::new(Callee::field("f"))
            .arg(Argument::field("x"))
            .arg(Argument::field("y"))
            .output("z")
            .unwrap(),
    )
    .unwrap();
    assert_eq!(map.value("z").unwrap(), Value::Int(7));

    // Same identity as calling the function directly.
    let direct = map_of(&[("x", 2), ("y", 5)])
        .apply(
            Application::new(add())
                .arg(Argument::field("x"))
                .arg(Argument::field("y"))
                .output("z")
                .unwrap(),
        )
        .unwrap();
    assert_eq!(map.ids()["z"], direct.ids()["z"]);
}

#[test]
fn test_callee_field_defined_later_in_batch() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("x", 1)
            .apply(
                Application::new(Callee::field("f"))
                    .arg(Argument::field("x"))
                    .kwarg("b", 1)
                    .output("y")
                    .unwrap(),
            )
            .unwrap()
            .with("f", add()),
    )
    .unwrap();
    assert_eq!(map.value("y").unwrap(), Value::Int(2));
}

#[test]
fn test_callee_field_must_hold_a_function() {
    let err = map_of(&[("f", 1), ("x", 2)])
        .apply(
            Application::new(Callee::field("f"))
                .arg(Argument::field("x"))
                .output("y")
                .unwrap(),
        )
        .unwrap_err();
    assert!(err.is_type_error());
}

/// A zero-argument function returning `function`, so the callee is computed.
fn returning(function: Function) -> Function {
    Function::new("pick", Vec::<Param>::new(), move |_: &Args| {
        Ok(Value::Function(Rc::new(function.clone())))
    })
}

#[test]
fn test_computed_callee_needs_a_signature() {
    let err = map_of(&[("a", 1), ("b", 2)])
        .apply(Application::new(returning(add())).output("f").unwrap())
        .unwrap()
        .apply(Application::new(Callee::field("f")).output("c").unwrap())
        .unwrap_err();
    assert!(err.is_usage_error());
    assert!(err.to_string().contains("with_signature"));
}

#[test]
fn test_computed_callee_reads_fields_by_parameter_name() {
    let concrete = map_of(&[("a", 1), ("b", 2)])
        .merge(Batch::new().with("f", add()))
        .unwrap()
        .apply(Application::new(Callee::field("f")).output("c").unwrap())
        .unwrap();
    assert_eq!(concrete.value("c").unwrap(), Value::Int(3));

    let computed = map_of(&[("a", 1), ("b", 2)])
        .apply(Application::new(returning(add())).output("f").unwrap())
        .unwrap()
        .apply(
            Application::new(Callee::field("f"))
                .with_signature(["a", "b"])
                .output("c")
                .unwrap(),
        )
        .unwrap();
    assert!(matches!(computed.get("f").unwrap(), Entry::Closure(_)));
    assert_eq!(computed.value("c").unwrap(), Value::Int(3));
}

#[test]
fn test_computed_callee_defaults_enter_the_identity() {
    let scale = Function::new(
        "scale",
        [Param::new("x"), Param::with_default("factor", 10)],
        |args: &Args| Ok(Value::Int(args.i64("x")? * args.i64("factor")?)),
    );
    let signature = [Param::new("x"), Param::with_default("factor", 10)];
    let base = map_of(&[("x", 3)])
        .apply(Application::new(returning(scale)).output("f").unwrap())
        .unwrap();

    let omitted = base
        .apply(
            Application::new(Callee::field("f"))
                .with_signature(signature.clone())
                .output("y")
                .unwrap(),
        )
        .unwrap();
    let explicit = base
        .apply(
            Application::new(Callee::field("f"))
                .with_signature(signature)
                .kwarg("factor", 10)
                .output("y")
                .unwrap(),
        )
        .unwrap();

    assert_eq!(omitted.value("y").unwrap(), Value::Int(30));
    assert_eq!(explicit.value("y").unwrap(), Value::Int(30));
    assert_eq!(omitted.ids()["y"], explicit.ids()["y"]);
}

#[test]
fn test_declared_signature_must_match_the_function() {
    // Checked when binding, for a callee known up front.
    let err = map_of(&[("a", 1), ("b", 2)])
        .apply(
            Application::new(add())
                .with_signature(["a"])
                .output("c")
                .unwrap(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        idmap::Error::Function(FunctionError::SignatureMismatch { .. })
    ));

    // Checked on first read, for a computed callee.
    let map = map_of(&[("a", 1), ("b", 2)])
        .apply(Application::new(returning(add())).output("f").unwrap())
        .unwrap()
        .apply(
            Application::new(Callee::field("f"))
                .with_signature(["b", "a"])
                .output("c")
                .unwrap(),
        )
        .unwrap();
    let err = map.value("c").unwrap_err();
    assert!(err.is_usage_error());
    assert!(err.to_string().contains("declared signature (b, a)"));
}

#[test]
fn test_arity_errors_are_usage_errors() {
    let err = map_of(&[("x", 1)])
        .apply(
            Application::new(add())
                .arg(1)
                .arg(2)
                .arg(3)
                .output("y")
                .unwrap(),
        )
        .unwrap_err();
    assert!(err.is_usage_error());

    let err = map_of(&[("x", 1)])
        .apply(Application::new(add()).kwarg("c", 1).output("y").unwrap())
        .unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_failures_are_reported_and_retried() {
    let attempts = Rc::new(Cell::new(0));
    let counter = attempts.clone();
    let flaky = Function::new("flaky", ["a"], move |args: &Args| {
        counter.set(counter.get() + 1);
        if counter.get() == 1 {
            return Err(FunctionError::failed("flaky", "first call fails").into());
        }
        Ok(args.get("a")?.clone())
    });
    let map = map_of(&[("a", 7)])
        .apply(Application::new(flaky).output("b").unwrap())
        .unwrap();

    let err = map.value("b").unwrap_err();
    assert!(err.is_function_failure());
    assert!(!map.get("b").unwrap().is_evaluated());
    assert_eq!(map.value("b").unwrap(), Value::Int(7));
    assert_eq!(attempts.get(), 2);
}

#[test]
fn test_versioned_functions_differ() {
    let v1 = add();
    let v2 = add().with_version("2");
    assert_ne!(v1.identity(), v2.identity());

    let a = map_of(&[("a", 1), ("b", 1)])
        .apply(Application::new(v1).output("c").unwrap())
        .unwrap();
    let b = map_of(&[("a", 1), ("b", 1)])
        .apply(Application::new(v2).output("c").unwrap())
        .unwrap();
    assert_ne!(a.id().unwrap(), b.id().unwrap());
}

#[test]
fn test_nested_applications() {
    let map = map_of(&[("x", 2), ("y", 3)])
        .apply(
            Application::new(add())
                .arg(Application::new(add()).arg(Argument::field("x")).arg(10))
                .arg(Argument::field("y"))
                .output("z")
                .unwrap(),
        )
        .unwrap();
    assert_eq!(map.value("z").unwrap(), Value::Int(15));
}
