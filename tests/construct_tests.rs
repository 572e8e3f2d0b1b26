//! Constructor behavior: positional/keyword agreement, lazy left-to-right
//! defaults, missing fields, type checks, and validation predicates.

use recspec::prelude::*;

fn para_spec() -> std::sync::Arc<RecordSpec> {
    // [a: default 5, b: no default, c: default = a + b]
    RecordSpec::builder("Para")
        .field("a").default(5)
        .field("b")
        .field("c").default_expr("a + b")
        .build()
        .unwrap()
}

#[test]
fn keyword_fills_defaults_left_to_right() {
    let spec = para_spec();
    let pa = keyword(&spec, Bindings::from_pairs([("b", 7)])).unwrap();
    assert_eq!(pa.get("a"), Some(&Value::Number(5.0)));
    assert_eq!(pa.get("b"), Some(&Value::Number(7.0)));
    assert_eq!(pa.get("c"), Some(&Value::Number(12.0)));
}

#[test]
fn missing_field_names_the_field() {
    let spec = para_spec();
    let err = keyword(&spec, Bindings::new()).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::MissingField { type_name, field } if type_name == "Para" && field == "b"
    ));
}

#[test]
fn explicit_value_overrides_computed_default() {
    let spec = para_spec();
    let pa = keyword(&spec, Bindings::from_pairs([("a", 1), ("b", 2), ("c", 100)])).unwrap();
    assert_eq!(pa.get("c"), Some(&Value::Number(100.0)));
}

#[test]
fn keyword_and_positional_agree_on_fully_specified_values() {
    let spec = para_spec();
    let by_keyword =
        keyword(&spec, Bindings::from_pairs([("a", 1), ("b", 2), ("c", 3)])).unwrap();
    let by_position = positional(
        &spec,
        vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
    )
    .unwrap();
    assert_eq!(by_keyword, by_position);
}

#[test]
fn supplied_values_shadow_defaults_in_later_expressions() {
    // c's default sees the caller-supplied a, not a's own default.
    let spec = para_spec();
    let pa = keyword(&spec, Bindings::from_pairs([("a", 10), ("b", 1)])).unwrap();
    assert_eq!(pa.get("c"), Some(&Value::Number(11.0)));
}

#[test]
fn later_defaults_never_affect_earlier_fields() {
    let spec = RecordSpec::builder("Chain")
        .field("a").default(1)
        .field("b").default_expr("a + 1")
        .field("c").default_expr("b * 10")
        .build()
        .unwrap();
    let with_late_override = keyword(&spec, Bindings::from_pairs([("c", 0)])).unwrap();
    let plain = keyword(&spec, Bindings::new()).unwrap();
    assert_eq!(with_late_override.get("a"), plain.get("a"));
    assert_eq!(with_late_override.get("b"), plain.get("b"));
}

#[test]
fn unknown_keyword_argument_is_rejected() {
    let spec = para_spec();
    let err = keyword(&spec, Bindings::from_pairs([("b", 7), ("zz", 1)])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnknownField { field, .. } if field == "zz"));
}

#[test]
fn positional_arity_is_checked() {
    let spec = para_spec();
    let err = positional(&spec, vec![Value::Number(1.0)]).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ArityMismatch { expected: 3, actual: 1, .. }
    ));
}

#[test]
fn validation_predicate_runs_after_all_fields_are_bound() {
    let spec = RecordSpec::builder("Ordered")
        .field("a").default(1000)
        .assert_expr("a > b")
        .field("b").default(900)
        .build()
        .unwrap();

    // Defaults alone satisfy the predicate.
    assert!(keyword(&spec, Bindings::new()).is_ok());

    let err = keyword(&spec, Bindings::from_pairs([("b", 1001)])).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ValidationFailed { predicate, .. } if predicate == "a > b"
    ));
}

#[test]
fn first_failing_predicate_is_reported() {
    let spec = RecordSpec::builder("Multi")
        .field("a").default(1)
        .assert_expr("a > 0")
        .assert_expr("a > 10")
        .assert_expr("a > 100")
        .build()
        .unwrap();
    let err = keyword(&spec, Bindings::new()).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ValidationFailed { predicate, .. } if predicate == "a > 10"
    ));
}

#[test]
fn predicates_run_once_through_the_keyword_path() {
    // A native predicate that fails on its own evaluation error would
    // surface twice if validation ran in both paths; counting is not
    // observable with fn pointers, so assert the equivalent: a keyword
    // construction whose supplied values violate the predicate fails
    // identically to the positional call with the same values.
    let spec = RecordSpec::builder("Gate")
        .field("a").default(1)
        .assert_expr("a > 0")
        .build()
        .unwrap();
    let kw = keyword(&spec, Bindings::from_pairs([("a", -1)])).unwrap_err();
    let pos = positional(&spec, vec![Value::Number(-1.0)]).unwrap_err();
    assert_eq!(kw.kind(), pos.kind());
}

#[test]
fn declared_types_are_enforced_at_construction() {
    let spec = RecordSpec::builder("Typed")
        .field("name").ty(TypeTag::String)
        .field("count").ty(TypeTag::Number).default(0)
        .build()
        .unwrap();
    let err = keyword(&spec, Bindings::from_pairs([("name", 42)])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));

    let ok = keyword(&spec, Bindings::from_pairs([("name", "x")])).unwrap();
    assert_eq!(ok.get("count"), Some(&Value::Number(0.0)));
}

#[test]
fn shared_default_type_checks_untyped_fields() {
    let spec = RecordSpec::builder("Deftype")
        .default_type(TypeTag::Number)
        .field("rw").default(1000.0)
        .field("ri")
        .build()
        .unwrap();
    let err = keyword(&spec, Bindings::from_pairs([("ri", "not a number")])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
}

#[test]
fn native_defaults_see_earlier_fields() {
    let spec = RecordSpec::builder("Native")
        .field("base").default(10)
        .field("double").default_fn(|env| {
            let base = env.get("base").and_then(Value::as_number).unwrap_or(0.0);
            Ok(Value::Number(base * 2.0))
        })
        .build()
        .unwrap();
    let record = keyword(&spec, Bindings::new()).unwrap();
    assert_eq!(record.get("double"), Some(&Value::Number(20.0)));
}

#[test]
fn custom_constructor_hook_adjusts_positional_values() {
    let spec = RecordSpec::builder("Clamped")
        .field("level").default(5)
        .constructor(|mut values| {
            if let Some(Value::Number(n)) = values.first().cloned() {
                values[0] = Value::Number(n.clamp(0.0, 10.0));
            }
            Ok(values)
        })
        .build()
        .unwrap();
    let record = keyword(&spec, Bindings::from_pairs([("level", 99)])).unwrap();
    assert_eq!(record.get("level"), Some(&Value::Number(10.0)));
}

#[test]
fn defaults_are_not_evaluated_at_definition_time() {
    // The default divides by zero; building the spec must still succeed,
    // and the error must only surface when construction needs the default.
    let spec = RecordSpec::builder("Lazy")
        .field("a").default(0)
        .field("b").default_expr("1 / a")
        .build()
        .unwrap();
    assert!(keyword(&spec, Bindings::from_pairs([("b", 1)])).is_ok());
    let err = keyword(&spec, Bindings::new()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::DivisionByZero);
}
