//! Diagnostic rendering and map conversion for record instances.
//!
//! Purely presentational: nothing here mutates state or runs validation.

use std::fmt;

use im::HashMap;

use crate::ast::Value;
use crate::runtime::instance::Record;

/// Renders a record deterministically: type-name header, then one
/// `name: Type value` line per field in declaration order.
///
/// # Examples
///
/// ```rust
/// use recspec::spec::RecordSpec;
/// use recspec::runtime::{keyword, Bindings};
/// use recspec::display::render;
/// let spec = RecordSpec::builder("A")
///     .field("a").default(6)
///     .field("b").default(-1.1)
///     .build()
///     .unwrap();
/// let a = keyword(&spec, Bindings::new()).unwrap();
/// assert_eq!(render(&a), "A\n  a: Any 6\n  b: Any -1.1");
/// ```
pub fn render(record: &Record) -> String {
    let mut out = record.type_name().to_string();
    for (field, value) in record.spec().fields.iter().zip(record.values()) {
        out.push_str(&format!("\n  {}: {} {}", field.name, field.ty.name(), value));
    }
    out
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(self))
    }
}

/// Transforms a record instance into a string-keyed map of its current
/// field values.
pub fn to_map(record: &Record) -> HashMap<String, Value> {
    record
        .spec()
        .field_names()
        .zip(record.values().iter())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::construct::keyword;
    use crate::runtime::eval::Bindings;
    use crate::spec::{RecordSpec, TypeTag};

    #[test]
    fn rendering_is_deterministic_and_ordered() {
        let spec = RecordSpec::builder("PhysicalPara")
            .default_type(TypeTag::Number)
            .field("rw").default(1000.0)
            .field("ri").default(900.0)
            .build()
            .unwrap();
        let para = keyword(&spec, Bindings::new()).unwrap();
        assert_eq!(
            render(&para),
            "PhysicalPara\n  rw: Number 1000\n  ri: Number 900"
        );
        assert_eq!(para.to_string(), render(&para));
    }

    #[test]
    fn to_map_carries_every_field() {
        let spec = RecordSpec::builder("T")
            .field("a").default(4)
            .field("b").default(5)
            .build()
            .unwrap();
        let record = keyword(&spec, Bindings::new()).unwrap();
        let map = to_map(&record);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], Value::Number(4.0));
        assert_eq!(map["b"], Value::Number(5.0));
    }
}
