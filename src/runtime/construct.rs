//! Constructors derived from a record spec.
//!
//! Three entry points, mirroring the three call conventions a spec provides:
//!
//! - [`positional`]: full arity, binds arguments in declaration order, then
//!   runs validation predicates in declaration order;
//! - [`keyword`]: any subset of fields by name; defaults are evaluated
//!   lazily, strictly left to right, each seeing only the fields already
//!   resolved; delegates to `positional`, so predicates run exactly once,
//!   against fully resolved values, and the two paths can never diverge on
//!   invariant enforcement;
//! - [`reconstruct`]: copy-with-overrides over an existing instance.
//!
//! Nothing here runs at definition time; every error surfaces at the call
//! attempting construction.

use std::sync::Arc;

use crate::ast::Value;
use crate::errors::{
    arity_mismatch, missing_field, type_mismatch, unknown_field, validation_failed, RecspecError,
};
use crate::runtime::eval::{eval, Bindings};
use crate::runtime::instance::Record;
use crate::spec::{AssertKind, DefaultDef, RecordSpec};

// ============================================================================
// POSITIONAL CONSTRUCTOR
// ============================================================================

/// Constructs a record from one value per field, in declaration order.
///
/// Checks arity, applies the custom constructor hook if the spec has one,
/// checks declared field types, then runs every validation predicate. The
/// first failing predicate aborts construction, named in the error.
pub fn positional(spec: &Arc<RecordSpec>, values: Vec<Value>) -> Result<Record, RecspecError> {
    if values.len() != spec.arity() {
        return Err(arity_mismatch(&spec.name, spec.arity(), values.len()));
    }

    let values = match spec.ctor {
        Some(ctor) => {
            let adjusted = ctor(values)?;
            if adjusted.len() != spec.arity() {
                return Err(arity_mismatch(&spec.name, spec.arity(), adjusted.len())
                    .with_help("a custom constructor must return one value per declared field"));
            }
            adjusted
        }
        None => values,
    };

    for (field, value) in spec.fields.iter().zip(values.iter()) {
        if !field.ty.matches(value) {
            return Err(type_mismatch(
                &format!("field `{}` of `{}`", field.name, spec.name),
                field.ty.name(),
                value.type_name(),
            ));
        }
    }

    if !spec.asserts.is_empty() {
        let env: Bindings = spec
            .field_names()
            .zip(values.iter())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        for assert in &spec.asserts {
            let holds = match &assert.pred {
                AssertKind::Native(pred) => pred(&env)?,
                AssertKind::Expr(expr) => {
                    let result = eval(expr, &env)?;
                    result.as_bool().ok_or_else(|| {
                        type_mismatch(
                            &format!("predicate `{}`", assert.label),
                            "Bool",
                            result.type_name(),
                        )
                    })?
                }
            };
            if !holds {
                return Err(validation_failed(&spec.name, &assert.label));
            }
        }
    }

    Ok(Record::from_parts(Arc::clone(spec), values))
}

// ============================================================================
// KEYWORD CONSTRUCTOR
// ============================================================================

/// Constructs a record from named arguments, resolving the rest from
/// defaults.
///
/// Resolution is strictly left to right over the spec: a caller-supplied
/// value wins; otherwise the field's default is evaluated in an environment
/// containing every earlier field, whether supplied or defaulted. A field
/// with neither is a `MissingField` error naming the field. Names not
/// declared by the spec are rejected up front.
pub fn keyword(spec: &Arc<RecordSpec>, supplied: Bindings) -> Result<Record, RecspecError> {
    for name in supplied.names() {
        if !spec.has_field(name) {
            return Err(unknown_field(&spec.name, name));
        }
    }

    let mut resolved = Bindings::new();
    let mut values = Vec::with_capacity(spec.arity());

    for field in &spec.fields {
        let value = match supplied.get(&field.name) {
            Some(value) => value.clone(),
            None => match &field.default {
                Some(DefaultDef::Value(value)) => value.clone(),
                Some(DefaultDef::Expr(expr)) => eval(expr, &resolved)?,
                Some(DefaultDef::Native(default)) => default(&resolved)?,
                None => return Err(missing_field(&spec.name, &field.name)),
            },
        };
        resolved.set(field.name.clone(), value.clone());
        values.push(value);
    }

    positional(spec, values)
}

// ============================================================================
// RECONSTRUCTION
// ============================================================================

/// Produces a new instance equal to `record` except for the overridden
/// fields.
///
/// Overrides can come from anything convertible to [`Bindings`], including
/// a name-to-value map. An override naming an undeclared field fails with
/// `UnknownField` and leaves the original untouched. Validation predicates
/// run against the merged values, exactly as in any keyword construction.
pub fn reconstruct(
    record: &Record,
    overrides: impl Into<Bindings>,
) -> Result<Record, RecspecError> {
    let overrides = overrides.into();
    let spec = record.spec();

    for name in overrides.names() {
        if !spec.has_field(name) {
            return Err(unknown_field(&spec.name, name));
        }
    }

    let mut merged = record.to_bindings();
    for (name, value) in overrides.iter() {
        merged.set(name.to_string(), value.clone());
    }
    keyword(spec, merged)
}
