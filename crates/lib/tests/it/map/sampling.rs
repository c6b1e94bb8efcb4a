use std::collections::BTreeSet;

use idmap::{Application, Argument, Batch, Expr, FrozenMap, Sample, Slot, Value};
use rand::{SeedableRng, rngs::StdRng};

use crate::helpers::add;

fn one_to_nine() -> Sample {
    Sample::values(1..=9).unwrap()
}

fn drawn(expr: &Expr, seed: u64) -> i64 {
    let map = expr.sample(seed).unwrap().solve().unwrap();
    map.value("x").unwrap().expect_i64().unwrap()
}

#[test]
fn test_unsampled_fields_are_not_ready() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("x", one_to_nine())
            .with("y", Argument::field("x")),
    )
    .unwrap();
    assert!(matches!(map.slot("x"), Some(Slot::Unsampled(_))));
    assert!(!map.is_ready());

    let err = map.value("x").unwrap_err();
    assert!(err.is_unready());
    // Fields waiting on a draw report the draw.
    assert!(map.value("y").unwrap_err().is_unready());
    assert!(map.identity().unwrap_err().is_unready());
}

#[test]
fn test_same_seed_draws_the_same_value() {
    let expr = Expr::from(Batch::new().with("x", one_to_nine()));
    let first = drawn(&expr, 42);
    assert_eq!(drawn(&expr, 42), first);
    assert!(one_to_nine().contains(&Value::Int(first)));
}

#[test]
fn test_seeds_cover_the_whole_progression() {
    let expr = Expr::from(Batch::new().with("x", one_to_nine()));
    let seen: BTreeSet<i64> = (0..500).map(|seed| drawn(&expr, seed)).collect();
    assert_eq!(seen, (1..=9).collect());
}

#[test]
fn test_sampled_map_resolves_dependents() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("a", Sample::range(10, 20, 5).unwrap())
            .with("b", 1)
            .apply(Application::new(add()).output("c").unwrap())
            .unwrap(),
    )
    .unwrap();
    assert!(!map.is_ready());

    let mut rng = StdRng::seed_from_u64(7);
    let sampled = map.sample(&mut rng).unwrap();
    assert!(sampled.is_ready());
    let a = sampled.value("a").unwrap().expect_i64().unwrap();
    assert!([10, 15, 20].contains(&a));
    assert_eq!(sampled.value("c").unwrap(), Value::Int(a + 1));
}

#[test]
fn test_sampled_application_arguments() {
    let expr = Batch::new().with("a", 1)
        >> Application::new(add())
            .kwarg("b", Sample::values([100, 200]).unwrap())
            .output("c")
            .unwrap();

    let unsampled = expr.solve().unwrap();
    assert!(matches!(unsampled.slot("c"), Some(Slot::Unsampled(_))));

    let a = expr.sample(1).unwrap().solve().unwrap();
    let b = expr.sample(1).unwrap().solve().unwrap();
    assert_eq!(a.id().unwrap(), b.id().unwrap());
    let c = a.value("c").unwrap().expect_i64().unwrap();
    assert!(c == 101 || c == 201);
}

#[test]
fn test_invalid_progressions() {
    assert!(Sample::range(5, 1, 1).unwrap_err().is_usage_error());
    assert!(Sample::range(1, 5, 0).unwrap_err().is_usage_error());
    assert!(Sample::values(Vec::<i64>::new()).unwrap_err().is_usage_error());
}
