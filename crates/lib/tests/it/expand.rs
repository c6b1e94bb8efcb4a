//! Multi-output items: positional, keyed and renamed unpacking.

use idmap::{Application, Argument, Batch, Entry, FrozenMap, Map, Target, Value};

use crate::helpers::{divmod, map_of, stats};

#[test]
fn test_dict_value_unpacks_by_sorted_key() {
    let dict = Value::dict([(1, "a"), (0, "b")]);
    let map = FrozenMap::from_batch(Batch::new().with(["x", "y"], dict)).unwrap();
    assert_eq!(map.value("x").unwrap(), Value::from("b"));
    assert_eq!(map.value("y").unwrap(), Value::from("a"));
}

#[test]
fn test_list_value_unpacks_by_position() {
    let list = Value::List(vec![3.into(), 1.into(), 2.into()]);
    let map = FrozenMap::from_batch(Batch::new().with(["a", "b", "c"], list)).unwrap();
    let values: Vec<Value> = ["a", "b", "c"]
        .iter()
        .map(|name| map.value(name).unwrap())
        .collect();
    assert_eq!(values, vec![3.into(), 1.into(), 2.into()]);
}

#[test]
fn test_unpacked_values_match_plain_fields() {
    let unpacked = FrozenMap::from_batch(
        Batch::new().with(["x", "y"], Value::List(vec![1.into(), 2.into()])),
    )
    .unwrap();
    let plain = map_of(&[("x", 1), ("y", 2)]);
    assert_eq!(unpacked.id().unwrap(), plain.id().unwrap());
}

#[test]
fn test_deferred_outputs_share_one_call() {
    let map = map_of(&[("a", 17), ("b", 5)])
        .apply(Application::new(divmod()).output(["q", "r"]).unwrap())
        .unwrap();

    let Entry::Sub(q) = map.get("q").unwrap() else {
        panic!("expected a sub-entry for q");
    };
    assert_ne!(map.ids()["q"], map.ids()["r"]);
    assert_eq!(map.value("r").unwrap(), Value::Int(2));
    // Reading one output evaluates the shared parent.
    assert!(q.parent().is_evaluated());
    assert!(!q.is_evaluated());
    assert_eq!(map.value("q").unwrap(), Value::Int(3));
}

#[test]
fn test_deferred_dict_outputs_follow_sorted_keys() {
    let map = FrozenMap::from_batch(
        Batch::new().with("xs", Value::List(vec![4.into(), 9.into(), 1.into()])),
    )
    .unwrap()
    .apply(Application::new(stats()).output(["hi", "lo"]).unwrap())
    .unwrap();
    // Keys sort as "max", "min".
    assert_eq!(map.value("hi").unwrap(), Value::Int(9));
    assert_eq!(map.value("lo").unwrap(), Value::Int(1));
}

#[test]
fn test_renamed_outputs_pick_by_key() {
    let xs = Value::List(vec![4.into(), 9.into(), 1.into()]);
    let map = FrozenMap::from_batch(Batch::new().with("xs", xs))
        .unwrap()
        .apply(
            Application::new(stats())
                .outputs(["smallest=min", "largest=max"])
                .unwrap(),
        )
        .unwrap();
    assert_eq!(map.value("smallest").unwrap(), Value::Int(1));
    assert_eq!(map.value("largest").unwrap(), Value::Int(9));

    // Renaming order does not matter.
    let swapped = FrozenMap::from_batch(
        Batch::new().with("xs", Value::List(vec![4.into(), 9.into(), 1.into()])),
    )
    .unwrap()
    .apply(
        Application::new(stats())
            .outputs(["largest=max", "smallest=min"])
            .unwrap(),
    )
    .unwrap();
    assert_eq!(map.ids()["largest"], swapped.ids()["largest"]);
}

#[test]
fn test_renamed_concrete_dict() {
    let target = Target::renamed([("first", "a"), ("second", "b")]).unwrap();
    let map = FrozenMap::from_batch(
        Batch::new().with(target, Value::dict([("b", 2), ("a", 1)])),
    )
    .unwrap();
    assert_eq!(map.value("first").unwrap(), Value::Int(1));
    assert_eq!(map.value("second").unwrap(), Value::Int(2));
}

#[test]
fn test_cardinality_mismatch_leaves_no_partial_state() {
    let mut map = Map::new();
    map.set("a", 1).unwrap();

    let two = Value::List(vec![1.into(), 2.into()]);
    let err = map.set(["p", "q", "r"], two).unwrap_err();
    assert!(err.is_cardinality_error());
    assert_eq!(map.len(), 1);
    for name in ["p", "q", "r"] {
        assert!(!map.frozen().contains(name), "{name} was assigned");
    }
}

#[test]
fn test_deferred_cardinality_mismatch_fails_on_read() {
    let map = map_of(&[("a", 17), ("b", 5)])
        .apply(Application::new(divmod()).output(["q", "r", "s"]).unwrap())
        .unwrap();
    let err = map.value("q").unwrap_err();
    assert!(err.is_cardinality_error());
}

#[test]
fn test_outputs_can_feed_later_items() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("total", Argument::field("q"))
            .with("a", 17)
            .with("b", 5)
            .apply(Application::new(divmod()).output(["q", "r"]).unwrap())
            .unwrap(),
    )
    .unwrap();
    assert_eq!(map.value("total").unwrap(), Value::Int(3));
}

#[test]
fn test_mixed_renaming_is_rejected() {
    let err = Application::new(stats())
        .outputs(["lo=min", "max"])
        .unwrap_err();
    assert!(err.is_usage_error());
}
