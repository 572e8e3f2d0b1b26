//! Reconstruction: copy-with-overrides, idempotence, unknown-field
//! rejection, and map-supplied overrides.

use recspec::prelude::*;

fn base_record() -> Record {
    let spec = RecordSpec::builder("A")
        .field("a").default(3)
        .field("b").default(4)
        .build()
        .unwrap();
    keyword(&spec, Bindings::new()).unwrap()
}

#[test]
fn reconstruct_overrides_named_fields() {
    let a = base_record();
    let b = reconstruct(&a, Bindings::from_pairs([("b", 99)])).unwrap();
    assert_eq!(b.get("a"), Some(&Value::Number(3.0)));
    assert_eq!(b.get("b"), Some(&Value::Number(99.0)));
    // The original is untouched.
    assert_eq!(a.get("b"), Some(&Value::Number(4.0)));
}

#[test]
fn reconstruct_with_no_overrides_is_identity() {
    let a = base_record();
    let copy = reconstruct(&a, Bindings::new()).unwrap();
    assert_eq!(copy, a);
}

#[test]
fn reconstruct_with_current_values_is_identity() {
    let a = base_record();
    let copy = reconstruct(&a, a.to_bindings()).unwrap();
    assert_eq!(copy, a);
}

#[test]
fn unknown_override_fails_and_preserves_original() {
    let a = base_record();
    let before = a.clone();
    let err = reconstruct(&a, Bindings::from_pairs([("zz", 1)])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownField { field, .. } if field == "zz"));
    assert_eq!(a, before);
}

#[test]
fn overrides_can_come_from_a_map() {
    let a = base_record();
    let mut overrides = im::HashMap::new();
    overrides.insert("a".to_string(), Value::Number(7.0));
    let b = reconstruct(&a, overrides).unwrap();
    assert_eq!(b.get("a"), Some(&Value::Number(7.0)));
}

#[test]
fn reconstruct_reruns_validation() {
    let spec = RecordSpec::builder("Ordered")
        .field("hi").default(10)
        .field("lo").default(1)
        .assert_expr("hi > lo")
        .build()
        .unwrap();
    let record = keyword(&spec, Bindings::new()).unwrap();
    let err = reconstruct(&record, Bindings::from_pairs([("lo", 50)])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::ValidationFailed { .. }));
}

#[test]
fn reconstruct_does_not_reevaluate_defaults_for_kept_fields() {
    // c defaults to a + b, but reconstruction carries the current value of
    // every non-overridden field, so changing a leaves c alone.
    let spec = RecordSpec::builder("Para")
        .field("a").default(5)
        .field("b").default(1)
        .field("c").default_expr("a + b")
        .build()
        .unwrap();
    let record = keyword(&spec, Bindings::new()).unwrap();
    assert_eq!(record.get("c"), Some(&Value::Number(6.0)));
    let shifted = reconstruct(&record, Bindings::from_pairs([("a", 100)])).unwrap();
    assert_eq!(shifted.get("c"), Some(&Value::Number(6.0)));
}

#[test]
fn round_trip_through_map_and_back() {
    let a = base_record();
    let map = to_map(&a);
    let rebuilt = keyword(a.spec(), Bindings::from(map)).unwrap();
    assert_eq!(rebuilt, a);
}
