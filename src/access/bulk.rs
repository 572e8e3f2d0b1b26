//! Bulk field access.
//!
//! [`unpack`] and [`pack`] operate on an ordered list of field tokens and are
//! the preferred bulk forms: the caller states exactly which fields move.
//! Both are non-transactional by design: tokens are processed independently
//! and in order, and a failure partway through leaves the reads/writes
//! already performed in place.
//!
//! [`unpack_all`] and [`pack_all`] are the all-declared-fields convenience
//! scoped to one record's spec. They are layered strictly on top of the
//! named operations and are the discouraged form: the set of names they move
//! tracks the spec's field list, so any change to the spec silently changes
//! what every call site binds, and bindings can shadow names the caller
//! already uses. Prefer the named forms.

use crate::access::{FieldAccess, FieldToken};
use crate::ast::Value;
use crate::errors::{arity_mismatch, RecspecError};
use crate::runtime::eval::Bindings;
use crate::runtime::instance::Record;

/// Reads the named fields in order, returning their values in the same
/// order. Fails fast on the first absent field; values read before the
/// failure are discarded with the error.
///
/// # Examples
///
/// ```rust
/// use recspec::access::{unpack, FieldToken};
/// use recspec::ast::Value;
/// let mut map = im::HashMap::new();
/// map.insert("a".to_string(), Value::Number(5.0));
/// map.insert("c".to_string(), Value::String("Hi!".to_string()));
/// let values = unpack(&map, &[FieldToken::new("a"), FieldToken::new("c")]).unwrap();
/// assert_eq!(values, vec![Value::Number(5.0), Value::String("Hi!".to_string())]);
/// ```
pub fn unpack<A: FieldAccess + ?Sized>(
    container: &A,
    fields: &[FieldToken],
) -> Result<Vec<Value>, RecspecError> {
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        values.push(container.read(field)?);
    }
    Ok(values)
}

/// Writes one value per named field, in order. The value list must match
/// the token list in length. Non-transactional: writes performed before a
/// failure stay applied.
pub fn pack<A: FieldAccess + ?Sized>(
    container: &mut A,
    fields: &[FieldToken],
    values: Vec<Value>,
) -> Result<(), RecspecError> {
    if fields.len() != values.len() {
        return Err(arity_mismatch("pack", fields.len(), values.len()));
    }
    for (field, value) in fields.iter().zip(values) {
        container.write(field, value)?;
    }
    Ok(())
}

/// Reads every field the record's spec declares, in declaration order,
/// into ordered bindings. The discouraged all-fields form; see the module
/// docs.
pub fn unpack_all(record: &Record) -> Result<Bindings, RecspecError> {
    let names: Vec<FieldToken> = record.spec().field_names().map(FieldToken::new).collect();
    let values = unpack(record, &names)?;
    Ok(names
        .into_iter()
        .zip(values)
        .map(|(token, value)| (token.name().to_string(), value))
        .collect())
}

/// Writes every declared field that appears in `bindings` back into the
/// record, in declaration order. Binding names that are not declared fields
/// are ignored, matching how caller-local state is packed selectively.
pub fn pack_all(record: &mut Record, bindings: &Bindings) -> Result<(), RecspecError> {
    let names: Vec<String> = record
        .spec()
        .field_names()
        .filter(|name| bindings.has(name))
        .map(str::to_string)
        .collect();
    for name in names {
        let value = bindings.get(&name).cloned().unwrap_or_default();
        record.write(&FieldToken::new(&name), value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::runtime::construct::keyword;
    use crate::spec::{RecordSpec, TypeTag};

    fn sample() -> Record {
        let spec = RecordSpec::builder("Sample")
            .mutable()
            .field("a").default(1)
            .field("b").default(2)
            .field("c").default(3)
            .build()
            .unwrap();
        keyword(&spec, Bindings::new()).unwrap()
    }

    #[test]
    fn unpack_preserves_token_order() {
        let record = sample();
        let tokens = [FieldToken::new("c"), FieldToken::new("a")];
        let values = unpack(&record, &tokens).unwrap();
        assert_eq!(values, vec![Value::Number(3.0), Value::Number(1.0)]);
    }

    #[test]
    fn pack_requires_matching_lengths() {
        let mut record = sample();
        let err = pack(&mut record, &[FieldToken::new("a")], vec![]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ArityMismatch { .. }));
    }

    #[test]
    fn pack_is_non_transactional() {
        let mut record = sample();
        let tokens = [FieldToken::new("a"), FieldToken::new("ghost")];
        let values = vec![Value::Number(99.0), Value::Number(0.0)];
        let err = pack(&mut record, &tokens, values).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::FieldNotFound { .. }));
        // The write to `a` happened before the failure and stays applied.
        assert_eq!(record.get("a"), Some(&Value::Number(99.0)));
    }

    #[test]
    fn unpack_all_binds_every_declared_field_in_order() {
        let record = sample();
        let bindings = unpack_all(&record).unwrap();
        let names: Vec<&str> = bindings.names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn pack_all_ignores_unrelated_binding_names() {
        let mut record = sample();
        let bindings = Bindings::from_pairs([("b", 42), ("unrelated_local", 7)]);
        pack_all(&mut record, &bindings).unwrap();
        assert_eq!(record.get("b"), Some(&Value::Number(42.0)));
        assert_eq!(record.get("a"), Some(&Value::Number(1.0)));
    }
}
