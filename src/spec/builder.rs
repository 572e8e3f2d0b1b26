//! Fluent builder for [`RecordSpec`].
//!
//! The builder is the definition-time half of the library: it collects field
//! declarations, defaults, and predicates, then validates the whole spec in
//! [`RecordSpecBuilder::build`]. Expression sources are parsed at build time;
//! nothing is evaluated until construction.
//!
//! Definition-time guarantees enforced here:
//! - field names are unique;
//! - a default expression references only fields declared earlier;
//! - predicates reference only declared fields;
//! - a custom constructor and declared predicates are mutually exclusive
//!   (ambiguous ownership of invariant enforcement).

use std::sync::Arc;

use crate::ast::Value;
use crate::errors::{ErrorKind, RecspecError};
use crate::spec::{
    AssertDef, AssertFn, AssertKind, CtorFn, DefaultDef, DefaultFn, FieldSpec, RecordSpec, TypeTag,
};
use crate::syntax::parse_expression;

// ============================================================================
// BUILDER STATE
// ============================================================================

/// A field as declared, before effective-type resolution.
struct PendingField {
    name: String,
    ty: Option<TypeTag>,
    default: Option<PendingDefault>,
}

enum PendingDefault {
    Value(Value),
    Source(String),
    Native(DefaultFn),
}

enum PendingAssert {
    Source(String),
    Native(String, AssertFn),
}

/// Fluent builder. Field modifiers (`ty`, `default`, `default_expr`,
/// `default_fn`) apply to the most recently declared field.
///
/// # Examples
///
/// ```rust
/// use recspec::spec::{RecordSpec, TypeTag};
/// let spec = RecordSpec::builder("Para")
///     .field("a").default(5)
///     .field("b")
///     .field("c").default_expr("a + b")
///     .build()
///     .unwrap();
/// assert_eq!(spec.arity(), 3);
/// ```
pub struct RecordSpecBuilder {
    name: String,
    fields: Vec<PendingField>,
    asserts: Vec<PendingAssert>,
    default_type: Option<TypeTag>,
    mutable: bool,
    ctor: Option<CtorFn>,
    pending_error: Option<RecspecError>,
}

impl RecordSpecBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            asserts: Vec::new(),
            default_type: None,
            mutable: false,
            ctor: None,
            pending_error: None,
        }
    }

    // ------------------------------------------------------------------------
    // Field declaration and modifiers
    // ------------------------------------------------------------------------

    /// Declares a field with no declared type and no default.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            ty: None,
            default: None,
        });
        self
    }

    /// Sets the declared type of the most recently declared field.
    pub fn ty(mut self, ty: TypeTag) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.ty = Some(ty);
        } else {
            self.set_misuse("`ty` called before any field was declared");
        }
        self
    }

    /// Sets a literal default value on the most recently declared field.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.set_default(PendingDefault::Value(value.into()));
        self
    }

    /// Sets a default expression (parsed at build time) on the most recently
    /// declared field. The expression may reference earlier fields only.
    pub fn default_expr(mut self, source: impl Into<String>) -> Self {
        self.set_default(PendingDefault::Source(source.into()));
        self
    }

    /// Sets a native default function on the most recently declared field.
    pub fn default_fn(mut self, f: DefaultFn) -> Self {
        self.set_default(PendingDefault::Native(f));
        self
    }

    fn set_default(&mut self, default: PendingDefault) {
        let problem = match self.fields.last_mut() {
            Some(field) if field.default.is_none() => {
                field.default = Some(default);
                None
            }
            Some(field) => Some(format!(
                "field `{}` declares more than one default",
                field.name
            )),
            None => Some("default declared before any field".to_string()),
        };
        if let Some(message) = problem {
            self.set_misuse(&message);
        }
    }

    // ------------------------------------------------------------------------
    // Spec-level options
    // ------------------------------------------------------------------------

    /// Declares a validation predicate from expression text. The position of
    /// the declaration fixes the run order but not visibility: every
    /// predicate sees all fields, and all predicates run after all fields
    /// are bound.
    pub fn assert_expr(mut self, source: impl Into<String>) -> Self {
        self.asserts.push(PendingAssert::Source(source.into()));
        self
    }

    /// Declares a native validation predicate with a label used in error
    /// messages.
    pub fn assert_fn(mut self, label: impl Into<String>, f: AssertFn) -> Self {
        self.asserts.push(PendingAssert::Native(label.into(), f));
        self
    }

    /// Sets the shared default type: fields declared without an explicit
    /// type get this tag instead of `Any`.
    pub fn default_type(mut self, ty: TypeTag) -> Self {
        self.default_type = Some(ty);
        self
    }

    /// Makes constructed instances mutable (field writes allowed).
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    /// Installs a custom positional constructor hook. Incompatible with
    /// declared predicates; `build` rejects the combination.
    pub fn constructor(mut self, f: CtorFn) -> Self {
        self.ctor = Some(f);
        self
    }

    fn set_misuse(&mut self, message: &str) {
        if self.pending_error.is_none() {
            self.pending_error = Some(RecspecError::new(ErrorKind::MalformedSpec {
                type_name: self.name.clone(),
                message: message.to_string(),
            }));
        }
    }

    // ------------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------------

    /// Validates the spec and produces the shared `RecordSpec`.
    pub fn build(self) -> Result<Arc<RecordSpec>, RecspecError> {
        if let Some(err) = self.pending_error {
            return Err(err);
        }

        if self.ctor.is_some() && !self.asserts.is_empty() {
            return Err(RecspecError::new(ErrorKind::ConflictingConstructor {
                type_name: self.name.clone(),
            })
            .with_help(
                "move the invariants into the custom constructor, or drop it and keep the predicates",
            ));
        }

        let mut fields: Vec<FieldSpec> = Vec::with_capacity(self.fields.len());
        for pending in self.fields {
            if fields.iter().any(|f| f.name == pending.name) {
                return Err(RecspecError::new(ErrorKind::DuplicateField {
                    type_name: self.name.clone(),
                    field: pending.name,
                }));
            }

            let default = match pending.default {
                None => None,
                Some(PendingDefault::Value(v)) => Some(DefaultDef::Value(v)),
                Some(PendingDefault::Native(f)) => Some(DefaultDef::Native(f)),
                Some(PendingDefault::Source(src)) => {
                    let expr = parse_expression(&src)?;
                    // Defaults resolve left to right; a reference to a field
                    // not declared yet can never be bound.
                    for referenced in expr.field_refs() {
                        if !fields.iter().any(|f| f.name == referenced) {
                            return Err(RecspecError::new(ErrorKind::ForwardFieldReference {
                                type_name: self.name.clone(),
                                field: pending.name.clone(),
                                referenced,
                            })
                            .with_help(
                                "a default may reference only fields declared earlier in the spec",
                            ));
                        }
                    }
                    Some(DefaultDef::Expr(expr))
                }
            };

            let ty = pending.ty.or(self.default_type).unwrap_or_default();
            fields.push(FieldSpec {
                name: pending.name,
                ty,
                default,
            });
        }

        let mut asserts = Vec::with_capacity(self.asserts.len());
        for pending in self.asserts {
            let assert = match pending {
                PendingAssert::Native(label, f) => AssertDef {
                    label,
                    pred: AssertKind::Native(f),
                },
                PendingAssert::Source(src) => {
                    let expr = parse_expression(&src)?;
                    for referenced in expr.field_refs() {
                        if !fields.iter().any(|f| f.name == referenced) {
                            return Err(crate::errors::unknown_field(&self.name, &referenced)
                                .with_help("predicates may only reference declared fields"));
                        }
                    }
                    AssertDef {
                        label: src,
                        pred: AssertKind::Expr(expr),
                    }
                }
            };
            asserts.push(assert);
        }

        Ok(Arc::new(RecordSpec {
            name: self.name,
            fields,
            asserts,
            mutable: self.mutable,
            ctor: self.ctor,
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_field_names_are_rejected() {
        let err = RecordSpec::builder("T")
            .field("a")
            .field("a")
            .build()
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DuplicateField { field, .. } if field == "a"));
    }

    #[test]
    fn forward_references_in_defaults_are_rejected() {
        let err = RecordSpec::builder("T")
            .field("a").default_expr("b + 1")
            .field("b")
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ForwardFieldReference { referenced, .. } if referenced == "b"
        ));
    }

    #[test]
    fn predicates_may_reference_any_declared_field() {
        // Declared before the fields it mentions: position is irrelevant.
        let spec = RecordSpec::builder("T")
            .assert_expr("a > b")
            .field("a").default(1000)
            .field("b").default(900)
            .build()
            .unwrap();
        assert_eq!(spec.asserts.len(), 1);
        assert_eq!(spec.asserts[0].label, "a > b");
    }

    #[test]
    fn custom_constructor_conflicts_with_predicates() {
        let err = RecordSpec::builder("T")
            .field("a")
            .assert_expr("a > 0")
            .constructor(|values| Ok(values))
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ConflictingConstructor { .. }
        ));
    }

    #[test]
    fn shared_default_type_applies_to_untyped_fields_only() {
        let spec = RecordSpec::builder("T")
            .default_type(TypeTag::Number)
            .field("a")
            .field("b").ty(TypeTag::String)
            .build()
            .unwrap();
        assert_eq!(spec.field("a").unwrap().ty, TypeTag::Number);
        assert_eq!(spec.field("b").unwrap().ty, TypeTag::String);
    }

    #[test]
    fn modifier_before_field_is_a_malformed_spec() {
        let err = RecordSpec::builder("T").default(1).field("a").build().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedSpec { .. }));
    }
}
