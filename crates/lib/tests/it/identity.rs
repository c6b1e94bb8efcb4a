//! Identity determinism across the public API.

use idmap::{Application, Argument, Batch, FrozenMap, ID, Identifiable, Identity, Value};

use crate::helpers::{add, map_of};

fn applied(app: Application) -> ID {
    let map = map_of(&[("x", 3), ("y", 4)])
        .apply(app.output("z").unwrap())
        .unwrap();
    map.ids()["z"].clone()
}

#[test]
fn test_application_identity_ignores_argument_style() {
    let positional = applied(
        Application::new(add())
            .arg(Argument::field("x"))
            .arg(Argument::field("y")),
    );
    let named = applied(
        Application::new(add())
            .kwarg("a", Argument::field("x"))
            .kwarg("b", Argument::field("y")),
    );
    let reversed = applied(
        Application::new(add())
            .kwarg("b", Argument::field("y"))
            .kwarg("a", Argument::field("x")),
    );
    let mixed = applied(
        Application::new(add())
            .arg(Argument::field("x"))
            .kwarg("b", Argument::field("y")),
    );

    assert_eq!(positional, named);
    assert_eq!(named, reversed);
    assert_eq!(reversed, mixed);
}

#[test]
fn test_swapped_arguments_change_identity() {
    let xy = applied(
        Application::new(add())
            .arg(Argument::field("x"))
            .arg(Argument::field("y")),
    );
    let yx = applied(
        Application::new(add())
            .arg(Argument::field("y"))
            .arg(Argument::field("x")),
    );
    assert_ne!(xy, yx);
}

#[test]
fn test_field_reference_and_value_share_identity() {
    // Referencing x is the same computation as passing x's value.
    let by_field = applied(
        Application::new(add())
            .arg(Argument::field("x"))
            .arg(Argument::field("y")),
    );
    let by_value = applied(Application::new(add()).arg(3).arg(4));
    assert_eq!(by_field, by_value);
}

#[test]
fn test_implicit_fields_match_explicit_ones() {
    let map = FrozenMap::from_batch(Batch::new().with("a", 1).with("b", 2)).unwrap();
    let implicit = map
        .apply(Application::new(add()).output("c").unwrap())
        .unwrap();
    let explicit = map
        .apply(
            Application::new(add())
                .kwarg("a", Argument::field("a"))
                .kwarg("b", Argument::field("b"))
                .output("c")
                .unwrap(),
        )
        .unwrap();
    assert_eq!(implicit.id().unwrap(), explicit.id().unwrap());
    assert_eq!(implicit.value("c").unwrap(), Value::Int(3));
}

#[test]
fn test_field_name_never_collides_with_equal_text() {
    for name in ["x", "value", "1", ""] {
        let as_name = Identity::of_name(name);
        let as_value = Value::from(name).identity().unwrap();
        assert_ne!(as_name, as_value, "collision for {name:?}");
    }
}

#[test]
fn test_value_identity_is_structural() {
    let a = Value::List(vec![1.into(), "x".into()]).identity().unwrap();
    let b = Value::List(vec![1.into(), "x".into()]).identity().unwrap();
    let c = Value::List(vec!["x".into(), 1.into()]).identity().unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    // Int and float are different encodings.
    assert_ne!(
        Value::Int(1).identity().unwrap(),
        Value::Float(1.0).identity().unwrap()
    );
}

#[test]
fn test_function_identity_is_reversed_in_applications() {
    let f = add();
    let map = map_of(&[("a", 1), ("b", 2)])
        .apply(Application::new(f.clone()).output("c").unwrap())
        .unwrap();
    let a = map.get("a").unwrap().identity();
    let b = map.get("b").unwrap().identity();
    let expected = a * b * f.identity().reverse();
    assert_eq!(map.get("c").unwrap().identity(), expected);
}

#[test]
fn test_ids_parse_back() {
    let identity = Value::from("payload").identity().unwrap();
    let id = identity.id();
    assert_eq!(id.len(), 40);
    assert_eq!(Identity::from_id(&id).unwrap(), identity);
    assert!(Identity::from_id("not an id").is_err());
}
