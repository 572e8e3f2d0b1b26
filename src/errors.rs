//! Unified error handling for record specifications.
//!
//! Every failure in the crate, from definition-time spec validation through
//! construction and field access, is reported as a single [`RecspecError`]
//! carrying a structured [`ErrorKind`], an optional source span (for
//! expression parse errors), and diagnostic metadata. Errors are raised
//! synchronously at the failing operation and never retried or recovered
//! internally.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

// ============================================================================
// ERROR KIND - the full taxonomy
// ============================================================================

/// All error kinds as a structured enum. Every variant that concerns a field
/// carries the offending field name to aid diagnosis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Definition errors - raised by `RecordSpecBuilder::build`
    #[error("duplicate field `{field}` in record spec `{type_name}`")]
    DuplicateField { type_name: String, field: String },
    #[error(
        "default for field `{field}` of `{type_name}` references `{referenced}`, which is not declared earlier"
    )]
    ForwardFieldReference {
        type_name: String,
        field: String,
        referenced: String,
    },
    #[error("record spec `{type_name}` declares both a custom constructor and validation predicates")]
    ConflictingConstructor { type_name: String },
    #[error("malformed record spec `{type_name}`: {message}")]
    MalformedSpec { type_name: String, message: String },

    // Expression parse errors
    #[error("invalid {literal_type} literal '{value}'")]
    InvalidLiteral { literal_type: String, value: String },
    #[error("unexpected token: {message}")]
    UnexpectedToken { message: String },
    #[error("empty expression")]
    EmptyExpression,

    // Expression evaluation errors
    #[error("unknown builtin function `{name}`")]
    UnknownBuiltin { name: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    // Construction errors
    #[error("missing field `{field}`: no value supplied and no default declared for `{type_name}`")]
    MissingField { type_name: String, field: String },
    #[error("unknown field `{field}`: not declared by `{type_name}`")]
    UnknownField { type_name: String, field: String },
    #[error("arity mismatch in {context}: expected {expected} values, got {actual}")]
    ArityMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },
    #[error("validation failed for `{type_name}`: predicate `{predicate}` was false")]
    ValidationFailed {
        type_name: String,
        predicate: String,
    },

    // Access errors
    #[error("field `{field}` not found in {container}")]
    FieldNotFound { container: String, field: String },
    #[error("cannot write field `{field}`: {container} is immutable")]
    ImmutableField { container: String, field: String },
}

/// Coarse error categories, primarily for test assertions and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Definition,
    Parse,
    Eval,
    Construction,
    Access,
}

impl ErrorKind {
    /// Get the error category for this kind.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateField { .. }
            | Self::ForwardFieldReference { .. }
            | Self::ConflictingConstructor { .. }
            | Self::MalformedSpec { .. } => ErrorCategory::Definition,

            Self::InvalidLiteral { .. } | Self::UnexpectedToken { .. } | Self::EmptyExpression => {
                ErrorCategory::Parse
            }

            Self::UnknownBuiltin { .. } | Self::DivisionByZero | Self::TypeMismatch { .. } => {
                ErrorCategory::Eval
            }

            Self::MissingField { .. }
            | Self::UnknownField { .. }
            | Self::ArityMismatch { .. }
            | Self::ValidationFailed { .. } => ErrorCategory::Construction,

            Self::FieldNotFound { .. } | Self::ImmutableField { .. } => ErrorCategory::Access,
        }
    }

    /// Get error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::DuplicateField { .. } => "duplicate_field",
            Self::ForwardFieldReference { .. } => "forward_field_reference",
            Self::ConflictingConstructor { .. } => "conflicting_constructor",
            Self::MalformedSpec { .. } => "malformed_spec",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::EmptyExpression => "empty_expression",
            Self::UnknownBuiltin { .. } => "unknown_builtin",
            Self::DivisionByZero => "division_by_zero",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MissingField { .. } => "missing_field",
            Self::UnknownField { .. } => "unknown_field",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::FieldNotFound { .. } => "field_not_found",
            Self::ImmutableField { .. } => "immutable_field",
        }
    }

    /// The field name this error concerns, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::DuplicateField { field, .. }
            | Self::ForwardFieldReference { field, .. }
            | Self::MissingField { field, .. }
            | Self::UnknownField { field, .. }
            | Self::FieldNotFound { field, .. }
            | Self::ImmutableField { field, .. } => Some(field),
            _ => None,
        }
    }
}

// ============================================================================
// SOURCE CONTEXT - expression text for parse diagnostics
// ============================================================================

/// Source attachment for errors that point into expression text.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub span: SourceSpan,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// The single error type for the crate.
#[derive(Debug, Clone)]
pub struct RecspecError {
    pub kind: ErrorKind,
    pub source_info: Option<SourceInfo>,
    pub diagnostic_info: DiagnosticInfo,
}

impl RecspecError {
    /// Creates an error from a kind, populating the diagnostic code.
    pub fn new(kind: ErrorKind) -> Self {
        let error_code = format!("recspec::{}", kind.code_suffix());
        Self {
            kind,
            source_info: None,
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }

    /// Attaches a help message.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }

    /// Attaches expression source text and a span, for parse diagnostics.
    pub fn with_source(mut self, name: impl AsRef<str>, text: impl Into<String>, span: Span) -> Self {
        self.source_info = Some(SourceInfo {
            source: Arc::new(NamedSource::new(name.as_ref(), text.into())),
            span: to_source_span(span),
        });
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<ErrorKind> for RecspecError {
    fn from(kind: ErrorKind) -> Self {
        RecspecError::new(kind)
    }
}

/// Converts an AST span into a miette source span.
pub fn to_source_span(span: Span) -> SourceSpan {
    (span.start, span.len()).into()
}

impl fmt::Display for RecspecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for RecspecError {}

impl Diagnostic for RecspecError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let info = self.source_info.as_ref()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            info.span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|i| &*i.source as &dyn miette::SourceCode)
    }
}

impl RecspecError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::UnexpectedToken { .. } => "unexpected here".into(),
            ErrorKind::EmptyExpression => "empty".into(),
            _ => "here".into(),
        }
    }
}

// ============================================================================
// CONSTRUCTION HELPERS - canonical builders with help text
// ============================================================================

pub fn missing_field(type_name: &str, field: &str) -> RecspecError {
    RecspecError::new(ErrorKind::MissingField {
        type_name: type_name.to_string(),
        field: field.to_string(),
    })
    .with_help(format!(
        "supply a value for `{}` at construction or declare a default in the spec",
        field
    ))
}

pub fn unknown_field(type_name: &str, field: &str) -> RecspecError {
    RecspecError::new(ErrorKind::UnknownField {
        type_name: type_name.to_string(),
        field: field.to_string(),
    })
}

pub fn validation_failed(type_name: &str, predicate: &str) -> RecspecError {
    RecspecError::new(ErrorKind::ValidationFailed {
        type_name: type_name.to_string(),
        predicate: predicate.to_string(),
    })
}

pub fn field_not_found(container: &str, field: &str) -> RecspecError {
    RecspecError::new(ErrorKind::FieldNotFound {
        container: container.to_string(),
        field: field.to_string(),
    })
}

pub fn immutable_field(container: &str, field: &str) -> RecspecError {
    RecspecError::new(ErrorKind::ImmutableField {
        container: container.to_string(),
        field: field.to_string(),
    })
    .with_help("declare the record spec with `.mutable()` to allow field writes")
}

pub fn type_mismatch(context: &str, expected: &str, actual: &str) -> RecspecError {
    RecspecError::new(ErrorKind::TypeMismatch {
        context: context.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    })
}

pub fn arity_mismatch(context: &str, expected: usize, actual: usize) -> RecspecError {
    RecspecError::new(ErrorKind::ArityMismatch {
        context: context.to_string(),
        expected,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_partition_the_taxonomy() {
        let cases = [
            (
                ErrorKind::DuplicateField {
                    type_name: "T".into(),
                    field: "a".into(),
                },
                ErrorCategory::Definition,
            ),
            (ErrorKind::EmptyExpression, ErrorCategory::Parse),
            (ErrorKind::DivisionByZero, ErrorCategory::Eval),
            (
                ErrorKind::MissingField {
                    type_name: "T".into(),
                    field: "b".into(),
                },
                ErrorCategory::Construction,
            ),
            (
                ErrorKind::ImmutableField {
                    container: "record T".into(),
                    field: "a".into(),
                },
                ErrorCategory::Access,
            ),
        ];
        for (kind, category) in cases {
            assert_eq!(kind.category(), category);
        }
    }

    #[test]
    fn errors_carry_the_offending_field_name() {
        let err = missing_field("Para", "b");
        assert_eq!(err.kind().field(), Some("b"));
        assert!(err.to_string().contains("`b`"));
        assert_eq!(err.diagnostic_info.error_code, "recspec::missing_field");
    }
}
