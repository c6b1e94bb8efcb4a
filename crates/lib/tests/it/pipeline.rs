//! Pipelines: composition, sampling and caching steps.

use idmap::{Application, Argument, Batch, Expr, Map, Sample, Step, Value, cache};

use crate::helpers::{add, counted, map_of, mul, shared_store};

#[test]
fn test_composition_flattens_steps() {
    let expr = Batch::new().with("a", 1)
        >> (Application::new(add()).kwarg("b", 2).output("c").unwrap()
            >> Application::new(mul())
                .arg(Argument::field("c"))
                .arg(Argument::field("c"))
                .output("d")
                .unwrap());
    assert_eq!(expr.len(), 3);
    assert!(matches!(expr.steps()[0], Step::Batch(_)));
    assert!(matches!(expr.steps()[2], Step::Apply(_)));

    let map = expr.solve().unwrap();
    assert_eq!(map.value("d").unwrap(), Value::Int(9));
}

#[test]
fn test_solving_is_repeatable() {
    let expr = map_of(&[("a", 2), ("b", 3)]) >> Application::new(add()).output("c").unwrap();
    assert_eq!(expr.solve().unwrap(), expr.solve().unwrap());
}

#[test]
fn test_mutable_map_starts_a_pipeline() {
    let mut map = Map::new();
    map.set("a", 4).unwrap();
    map.set("b", 1).unwrap();
    let solved = (map >> Application::new(add()).output("c").unwrap())
        .solve()
        .unwrap();
    assert_eq!(solved.value("c").unwrap(), Value::Int(5));
}

#[test]
fn test_failing_step_stops_the_fold() {
    let expr = Batch::new().with("y", Argument::field("x"))
        >> Batch::new().with("x", 1);
    assert!(expr.solve().unwrap_err().is_illegal_overwrite());
}

#[test]
fn test_sampling_leaves_the_expression_untouched() {
    let expr = Expr::new()
        .then(Batch::new().with("a", Sample::range(1, 3, 1).unwrap()))
        .then(Application::new(add()).kwarg("b", 10).output("c").unwrap());
    let sampled = expr.sample(11).unwrap();

    assert!(!expr.solve().unwrap().is_ready());
    let map = sampled.solve().unwrap();
    let a = map.value("a").unwrap().expect_i64().unwrap();
    assert_eq!(map.value("c").unwrap(), Value::Int(a + 10));
}

#[test]
fn test_cache_step_reuses_stored_values() {
    let (store, shared) = shared_store();

    let (inc, calls) = counted("inc");
    let expr = Batch::new().with("a", 1)
        >> Application::new(inc).output("b").unwrap()
        >> cache(&shared, ["b"]);
    let first = expr.solve().unwrap();
    assert_eq!(first.value("b").unwrap(), Value::Int(2));
    assert_eq!(calls.get(), 1);
    assert_eq!(store.len(), 1);

    // A new pipeline with the same content finds the stored value.
    let (inc, calls) = counted("inc");
    let second = (Batch::new().with("a", 1)
        >> Application::new(inc).output("b").unwrap()
        >> cache(&shared, Vec::<String>::new()))
    .solve()
    .unwrap();
    assert_eq!(second.value("b").unwrap(), Value::Int(2));
    assert_eq!(calls.get(), 0);
    assert_eq!(second.id().unwrap(), first.id().unwrap());
}

#[test]
fn test_cache_step_rejects_unknown_fields() {
    let (_, shared) = shared_store();
    let expr = Batch::new().with("a", 1) >> cache(&shared, ["nope"]);
    assert!(expr.solve().unwrap_err().is_missing_field());
}
