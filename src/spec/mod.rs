//! Record specifications.
//!
//! A [`RecordSpec`] is the definition-time description of a record type: an
//! ordered list of fields with optional declared types and optional defaults,
//! plus validation predicates that run once per construction, after all
//! fields are bound. Specs are built once (via [`RecordSpecBuilder`]),
//! validated at build time, and then shared behind `Arc` for the lifetime of
//! the program. No default expression is ever evaluated at definition time.

use std::sync::Arc;

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Value};
use crate::errors::RecspecError;
use crate::runtime::eval::Bindings;

pub mod builder;

pub use builder::RecordSpecBuilder;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Declared type of a field, checked at construction and on field writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TypeTag {
    #[default]
    Any,
    Number,
    String,
    Bool,
    List,
    Map,
}

impl TypeTag {
    /// Returns true if `value` conforms to this tag. `Any` admits
    /// everything, including Nil.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeTag::Any => true,
            TypeTag::Number => matches!(value, Value::Number(_)),
            TypeTag::String => matches!(value, Value::String(_)),
            TypeTag::Bool => matches!(value, Value::Bool(_)),
            TypeTag::List => matches!(value, Value::List(_)),
            TypeTag::Map => matches!(value, Value::Map(_)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Any => "Any",
            TypeTag::Number => "Number",
            TypeTag::String => "String",
            TypeTag::Bool => "Bool",
            TypeTag::List => "List",
            TypeTag::Map => "Map",
        }
    }
}

/// A native default: computes a field value from the already-resolved
/// earlier fields.
pub type DefaultFn = fn(&Bindings) -> Result<Value, RecspecError>;

/// A native validation predicate over the fully-bound fields.
pub type AssertFn = fn(&Bindings) -> Result<bool, RecspecError>;

/// A custom positional constructor hook. Receives the fully-resolved
/// positional values and may adjust them; it must return the same arity.
pub type CtorFn = fn(Vec<Value>) -> Result<Vec<Value>, RecspecError>;

/// The default of one field: a plain value, a parsed expression over
/// earlier fields, or a native function.
///
/// Mirrors the two macro flavors elsewhere in the ecosystem: declarative
/// (expression template) and native (function pointer).
#[derive(Debug, Clone)]
pub enum DefaultDef {
    Value(Value),
    Expr(Expr),
    Native(DefaultFn),
}

/// How a predicate is expressed.
#[derive(Debug, Clone)]
pub enum AssertKind {
    Expr(Expr),
    Native(AssertFn),
}

/// One validation predicate. The label is the predicate's source text (or a
/// caller-supplied name for native predicates) and is reported verbatim when
/// the predicate fails.
#[derive(Debug, Clone)]
pub struct AssertDef {
    pub label: String,
    pub pred: AssertKind,
}

/// One field: name, effective type, optional default.
///
/// The effective type is the explicitly declared tag, else the spec's shared
/// default type, else `Any`; resolution happens in the builder.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeTag,
    pub default: Option<DefaultDef>,
}

/// A complete record specification. Fixed after `build()`; constructors and
/// accessors only read it.
#[derive(Debug, Clone)]
pub struct RecordSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub asserts: Vec<AssertDef>,
    pub mutable: bool,
    pub ctor: Option<CtorFn>,
}

impl RecordSpec {
    /// Starts a builder for a spec with the given type name.
    pub fn builder(name: impl Into<String>) -> RecordSpecBuilder {
        RecordSpecBuilder::new(name)
    }

    /// Number of fields, which is also the positional constructor arity.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Index of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Looks up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }
}

// ============================================================================
// SPEC REGISTRY
// ============================================================================

/// Registry of named record specs, inspectable at runtime.
///
/// Specs are typically defined once at program startup; the registry makes
/// them discoverable by type name.
#[derive(Default)]
pub struct SpecRegistry {
    specs: HashMap<String, Arc<RecordSpec>>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: Arc<RecordSpec>) {
        self.specs.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RecordSpec>> {
        self.specs.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn list(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<RecordSpec>> {
        self.specs.remove(name)
    }
}
