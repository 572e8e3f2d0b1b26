//! # recspec
//!
//! Declarative record specifications: a [`spec::RecordSpec`] describes a
//! record's fields, defaults, and invariants once, at definition time; the
//! runtime derives a positional constructor, a keyword constructor with
//! lazily evaluated defaults, reconstruction (copy-with-overrides), and a
//! diagnostic formatter. The [`access`] module adds an open read/write
//! protocol over records and string-keyed maps.
//!
//! Keyword construction resolves fields strictly left to right, so a default
//! may be expressed in terms of earlier fields:
//!
//! ```rust
//! use recspec::prelude::*;
//!
//! let spec = RecordSpec::builder("Para")
//!     .field("a").default(5)
//!     .field("b")
//!     .field("c").default_expr("a + b")
//!     .build()?;
//!
//! let pa = keyword(&spec, Bindings::from_pairs([("b", 7)]))?;
//! assert_eq!(pa.get("c"), Some(&Value::Number(12.0)));
//! # Ok::<(), recspec::RecspecError>(())
//! ```

pub use crate::errors::{ErrorCategory, ErrorKind, RecspecError};

pub mod access;
pub mod ast;
pub mod display;
pub mod errors;
pub mod runtime;
pub mod spec;
pub mod syntax;

/// Convenience re-exports of the crate's main surface.
pub mod prelude {
    pub use crate::access::{pack, pack_all, unpack, unpack_all, FieldAccess, FieldToken};
    pub use crate::ast::Value;
    pub use crate::display::{render, to_map};
    pub use crate::errors::{ErrorCategory, ErrorKind, RecspecError};
    pub use crate::runtime::{keyword, positional, reconstruct, Bindings, Record};
    pub use crate::spec::{RecordSpec, RecordSpecBuilder, SpecRegistry, TypeTag};
    pub use crate::syntax::parse_expression;
}
