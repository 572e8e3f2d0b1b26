//! # Field Accessor Protocol
//!
//! A small open protocol with two operations: read a named field from a
//! container, and write a named field into a container. Built-in
//! implementations cover record instances and string-keyed maps; any other
//! container kind joins the protocol by implementing [`FieldAccess`],
//! without touching the existing implementations.
//!
//! ## Module Structure
//!
//! - **`record`**: protocol implementation for [`Record`] instances
//! - **`map`**: implementations for string-keyed maps and `Value::Map`
//! - **`bulk`**: ordered bulk unpack/pack, plus the all-fields convenience
//!
//! Not suitable for hot loops: every access resolves the field name at call
//! time.

use std::fmt;

use crate::ast::Value;
use crate::errors::RecspecError;

pub mod bulk;
pub mod map;
pub mod record;

pub use bulk::{pack, pack_all, unpack, unpack_all};

// ============================================================================
// FIELD TOKENS
// ============================================================================

/// A field-name token.
///
/// Tokens are symbol-like: `FieldToken::new(":a")` and `FieldToken::new("a")`
/// denote the same field. Map-backed containers additionally match both the
/// bare key `"a"` and the symbol-styled key `":a"`, so a symbol token finds
/// its entry in a string-keyed map and vice versa. Records match on the bare
/// name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldToken {
    name: String,
}

impl FieldToken {
    /// Creates a token, normalizing away a leading `:`.
    pub fn new(name: impl AsRef<str>) -> Self {
        let raw = name.as_ref();
        Self {
            name: raw.strip_prefix(':').unwrap_or(raw).to_string(),
        }
    }

    /// The bare field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol-styled key form (`:name`), tried as a fallback by
    /// map-backed containers.
    pub fn symbol_key(&self) -> String {
        format!(":{}", self.name)
    }
}

impl fmt::Display for FieldToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for FieldToken {
    fn from(name: &str) -> Self {
        FieldToken::new(name)
    }
}

impl From<String> for FieldToken {
    fn from(name: String) -> Self {
        FieldToken::new(name)
    }
}

// ============================================================================
// THE PROTOCOL
// ============================================================================

/// Read/write access to named fields of a container.
///
/// The extension point of the accessor layer: implement this for a new
/// container kind and the bulk operations in [`bulk`] work with it
/// unchanged. Implementations must be synchronous and must not retry or
/// recover internally; errors surface to the caller at the failing
/// operation.
pub trait FieldAccess {
    /// A short description of the container for error messages, e.g.
    /// `"record Para"` or `"map"`.
    fn container_kind(&self) -> String;

    /// Returns the named field's current value, or `FieldNotFound`.
    fn read(&self, field: &FieldToken) -> Result<Value, RecspecError>;

    /// Sets the named field and returns the written value. Fails with
    /// `ImmutableField` if the container is not mutable at that field, or
    /// `FieldNotFound` where the field cannot be created.
    fn write(&mut self, field: &FieldToken, value: Value) -> Result<Value, RecspecError>;
}
