//! Expression syntax layer: pest grammar and parser.

pub mod parser;

pub use parser::parse_expression;
