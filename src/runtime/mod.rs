//! Runtime half of the library: expression evaluation, constructed
//! instances, and the constructors derived from a spec.

pub mod construct;
pub mod eval;
pub mod instance;

pub use construct::{keyword, positional, reconstruct};
pub use eval::{eval as eval_expression, Bindings};
pub use instance::Record;
