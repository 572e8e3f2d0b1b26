//! Constructed record instances.

use std::sync::Arc;

use crate::ast::Value;
use crate::runtime::eval::Bindings;
use crate::spec::RecordSpec;

/// A constructed instance of a [`RecordSpec`].
///
/// Holds the spec it was built from plus one value per field, in declaration
/// order. Instances are immutable unless the spec was declared mutable; the
/// accessor layer enforces this on writes. Validation predicates are
/// guaranteed to have held at construction time, but a mutable instance can
/// be driven out of its invariants by later writes.
#[derive(Debug, Clone)]
pub struct Record {
    spec: Arc<RecordSpec>,
    values: Vec<Value>,
}

impl Record {
    /// Internal constructor; callers go through `runtime::construct`.
    pub(crate) fn from_parts(spec: Arc<RecordSpec>, values: Vec<Value>) -> Self {
        debug_assert_eq!(spec.arity(), values.len());
        Self { spec, values }
    }

    pub fn spec(&self) -> &Arc<RecordSpec> {
        &self.spec
    }

    /// The record's type name, from its spec.
    pub fn type_name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_mutable(&self) -> bool {
        self.spec.mutable
    }

    /// Current value of a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.spec
            .field_index(name)
            .map(|index| &self.values[index])
    }

    /// All field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// All fields as ordered bindings, in declaration order.
    pub fn to_bindings(&self) -> Bindings {
        self.spec
            .field_names()
            .zip(self.values.iter())
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Raw positional write; type and mutability checks live in the
    /// accessor layer.
    pub(crate) fn set_raw(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }
}

/// Two records are equal when they share a spec name and all field values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.spec.name == other.spec.name && self.values == other.values
    }
}
