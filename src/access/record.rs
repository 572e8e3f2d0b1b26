//! Protocol implementation for record instances.

use crate::access::{FieldAccess, FieldToken};
use crate::ast::Value;
use crate::errors::{field_not_found, immutable_field, type_mismatch, RecspecError};
use crate::runtime::instance::Record;

impl FieldAccess for Record {
    fn container_kind(&self) -> String {
        format!("record {}", self.type_name())
    }

    fn read(&self, field: &FieldToken) -> Result<Value, RecspecError> {
        self.get(field.name())
            .cloned()
            .ok_or_else(|| field_not_found(&self.container_kind(), field.name()))
    }

    fn write(&mut self, field: &FieldToken, value: Value) -> Result<Value, RecspecError> {
        let spec = self.spec().clone();
        let Some(index) = spec.field_index(field.name()) else {
            return Err(field_not_found(&self.container_kind(), field.name()));
        };
        if !self.is_mutable() {
            return Err(immutable_field(&self.container_kind(), field.name()));
        }
        // Writes respect the declared type, same as construction.
        let field_spec = &spec.fields[index];
        if !field_spec.ty.matches(&value) {
            return Err(type_mismatch(
                &format!("field `{}` of `{}`", field_spec.name, spec.name),
                field_spec.ty.name(),
                value.type_name(),
            ));
        }
        self.set_raw(index, value.clone());
        Ok(value)
    }
}
