//! Protocol implementations for string-keyed maps.
//!
//! Maps match a token against both key forms: the bare name and the
//! symbol-styled `:name`. A write that finds an existing entry under either
//! form overwrites that entry; otherwise it inserts under the bare name.
//! Maps are always writable.

use crate::access::{FieldAccess, FieldToken};
use crate::ast::Value;
use crate::errors::{field_not_found, type_mismatch, RecspecError};

/// Picks the key a token resolves to in a map, preferring the bare name.
fn resolve_key(contains: impl Fn(&str) -> bool, field: &FieldToken) -> Option<String> {
    if contains(field.name()) {
        return Some(field.name().to_string());
    }
    let symbol = field.symbol_key();
    if contains(&symbol) {
        return Some(symbol);
    }
    None
}

impl FieldAccess for im::HashMap<String, Value> {
    fn container_kind(&self) -> String {
        "map".to_string()
    }

    fn read(&self, field: &FieldToken) -> Result<Value, RecspecError> {
        let key = resolve_key(|k| self.contains_key(k), field)
            .ok_or_else(|| field_not_found("map", field.name()))?;
        Ok(self[&key].clone())
    }

    fn write(&mut self, field: &FieldToken, value: Value) -> Result<Value, RecspecError> {
        let key =
            resolve_key(|k| self.contains_key(k), field).unwrap_or_else(|| field.name().to_string());
        self.insert(key, value.clone());
        Ok(value)
    }
}

impl FieldAccess for std::collections::HashMap<String, Value> {
    fn container_kind(&self) -> String {
        "map".to_string()
    }

    fn read(&self, field: &FieldToken) -> Result<Value, RecspecError> {
        let key = resolve_key(|k| self.contains_key(k), field)
            .ok_or_else(|| field_not_found("map", field.name()))?;
        Ok(self[&key].clone())
    }

    fn write(&mut self, field: &FieldToken, value: Value) -> Result<Value, RecspecError> {
        let key =
            resolve_key(|k| self.contains_key(k), field).unwrap_or_else(|| field.name().to_string());
        self.insert(key, value.clone());
        Ok(value)
    }
}

/// `Value` joins the protocol through its `Map` variant. Reads on any other
/// variant report the field as absent; writes on any other variant are a
/// type error, since the container cannot hold named fields.
impl FieldAccess for Value {
    fn container_kind(&self) -> String {
        format!("value of type {}", self.type_name())
    }

    fn read(&self, field: &FieldToken) -> Result<Value, RecspecError> {
        match self {
            Value::Map(entries) => entries.read(field),
            other => Err(field_not_found(&other.container_kind(), field.name())),
        }
    }

    fn write(&mut self, field: &FieldToken, value: Value) -> Result<Value, RecspecError> {
        match self {
            Value::Map(entries) => entries.write(field, value),
            other => Err(type_mismatch(
                &format!("write of `{}`", field.name()),
                "Map",
                other.type_name(),
            )),
        }
    }
}
