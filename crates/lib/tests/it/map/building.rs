use idmap::{Application, Argument, Batch, FrozenMap, Map, Slot, Value};

use crate::helpers::{add, map_of, mul};

#[test]
fn test_forward_reference_in_one_batch() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .with("y", Argument::field("x"))
            .with("x", 5),
    )
    .unwrap();
    assert_eq!(map.value("y").unwrap(), Value::Int(5));
    assert!(map.is_ready());
    // Batch order is kept.
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["y", "x"]);
}

#[test]
fn test_forward_references_chain_through_applications() {
    let map = FrozenMap::from_batch(
        Batch::new()
            .apply(
                Application::new(mul())
                    .arg(Argument::field("c"))
                    .arg(2)
                    .output("d")
                    .unwrap(),
            )
            .unwrap()
            .apply(Application::new(add()).output("c").unwrap())
            .unwrap()
            .with("a", 1)
            .with("b", 2),
    )
    .unwrap();
    assert_eq!(map.value("d").unwrap(), Value::Int(6));
    assert!(map.is_ready());
}

#[test]
fn test_reference_to_a_later_batch_stays_missing() {
    let map = FrozenMap::from_batch(Batch::new().with("y", Argument::field("x"))).unwrap();
    assert!(!map.is_ready());
    assert_eq!(map.missing(), vec!["x"]);
    assert!(matches!(map.slot("y"), Some(Slot::Delayed(_))));

    let err = map.value("y").unwrap_err();
    assert!(err.is_missing_field());
    assert!(err.to_string().contains("'x'"));
}

#[test]
fn test_cycles_are_rejected() {
    let err = FrozenMap::from_batch(
        Batch::new()
            .with("a", Argument::field("b"))
            .with("b", Argument::field("a")),
    )
    .unwrap_err();
    assert!(err.is_usage_error());

    let err = FrozenMap::from_batch(Batch::new().with("a", Argument::field("a"))).unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_overwriting_a_missing_field_is_illegal() {
    let map = FrozenMap::from_batch(Batch::new().with("y", Argument::field("x"))).unwrap();
    let err = map.merge(Batch::new().with("x", 1)).unwrap_err();
    assert!(err.is_illegal_overwrite());

    let err = map.merge(Batch::new().with("y", 1)).unwrap_err();
    assert!(err.is_illegal_overwrite());
}

#[test]
fn test_provide_fills_missing_fields() {
    let map = FrozenMap::from_batch(Batch::new().with("y", Argument::field("x"))).unwrap();
    let filled = map.provide(Batch::new().with("x", 4)).unwrap();
    assert_eq!(filled.value("y").unwrap(), Value::Int(4));

    // Provided items never replace ready fields.
    let kept = filled.provide(Batch::new().with("x", 100)).unwrap();
    assert_eq!(kept.value("x").unwrap(), Value::Int(4));
}

#[test]
fn test_provided_batch_on_the_left_of_a_template() {
    let template = FrozenMap::from_batch(
        Batch::new().apply(Application::new(add()).output("c").unwrap()).unwrap(),
    )
    .unwrap();
    assert_eq!(template.missing(), vec!["a", "b"]);

    let map = (Batch::new().with("a", 2).with("b", 3) >> template)
        .solve()
        .unwrap();
    assert_eq!(map.value("c").unwrap(), Value::Int(5));
}

#[test]
fn test_ready_fields_may_be_overwritten() {
    let map = map_of(&[("x", 1)]);
    let replaced = map.merge(Batch::new().with("x", 2)).unwrap();
    assert_eq!(replaced.value("x").unwrap(), Value::Int(2));
    assert_ne!(map.ids()["x"], replaced.ids()["x"]);
}

#[test]
fn test_application_with_outputs_nested_in_batch_is_rejected() {
    let app = Application::new(add()).output("c").unwrap();
    let err = FrozenMap::from_batch(Batch::new().with("d", app)).unwrap_err();
    assert!(err.is_conflicting_output());
}

#[test]
fn test_invalid_field_names() {
    for name in ["", "_x", "__"] {
        let err = FrozenMap::from_batch(Batch::new().with(name, 1)).unwrap_err();
        assert!(err.is_usage_error(), "{name:?} accepted");
    }
}

#[test]
fn test_remove_fields() {
    let map = map_of(&[("x", 1), ("y", 2)]);
    let smaller = map.remove(["x"]).unwrap();
    assert_eq!(smaller.keys().collect::<Vec<_>>(), vec!["y"]);
    assert_eq!(smaller.id().unwrap(), map_of(&[("y", 2)]).id().unwrap());

    assert!(map.remove(["nope"]).unwrap_err().is_missing_field());
}

#[test]
fn test_nested_maps_are_values() {
    let inner = map_of(&[("a", 1)]);
    let outer = FrozenMap::from_batch(Batch::new().with("inner", inner.clone())).unwrap();
    assert_eq!(outer.ids()["inner"], inner.id().unwrap());
    match outer.value("inner").unwrap() {
        Value::Map(map) => assert_eq!(map.value("a").unwrap(), Value::Int(1)),
        other => panic!("expected a map, got {other}"),
    }

    let unready = FrozenMap::from_batch(Batch::new().with("y", Argument::field("x"))).unwrap();
    let err = FrozenMap::from_batch(Batch::new().with("inner", unready)).unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_mutable_map_tracks_its_frozen_snapshots() {
    let mut map = Map::new();
    map.set("a", 1).unwrap();
    map.set("b", 2).unwrap();
    let snapshot = map.frozen().clone();
    map.apply(Application::new(add()).output("c").unwrap()).unwrap();

    assert_eq!(map.value("c").unwrap(), Value::Int(3));
    assert!(!snapshot.contains("c"));

    map.remove("c").unwrap();
    assert_eq!(map.id().unwrap(), snapshot.id().unwrap());
    assert_eq!(map.freeze(), snapshot);
}
