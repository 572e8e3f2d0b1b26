//! AST for default-value and predicate expressions.
//!
//! A `RecordSpec` may attach small expressions to fields (default values) and
//! to the spec as a whole (validation predicates). These expressions are
//! parsed once at definition time and evaluated against resolved field
//! bindings at construction time. All nodes carry a span into the original
//! expression text for diagnostics.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

pub mod value;

pub use value::Value;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// A byte range in the expression source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Numeric negation (`-x`)
    Neg,
    /// Boolean negation (`not x`, `!x`)
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }
}

/// Binary operators, in ascending precedence groups: logic, comparison,
/// additive, multiplicative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// An expression over record fields.
///
/// # Examples
///
/// ```rust
/// use recspec::ast::{Expr, Span};
/// let expr = Expr::Number(42.0, Span::new(0, 2));
/// assert_eq!(expr.span().start, 0);
/// assert_eq!(expr.span().end, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64, Span),
    String(String, Span),
    Bool(bool, Span),
    Nil(Span),
    /// Reference to a record field by name.
    Field(String, Span),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Call to a builtin function (`min`, `max`, `abs`, `len`, ...).
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Expr {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, span) => *span,
            Expr::String(_, span) => *span,
            Expr::Bool(_, span) => *span,
            Expr::Nil(span) => *span,
            Expr::Field(_, span) => *span,
            Expr::Unary { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Call { span, .. } => *span,
        }
    }

    /// Collects the names of all fields this expression references, in
    /// first-occurrence order, without duplicates.
    ///
    /// Used at definition time to enforce that default expressions only
    /// reference earlier fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recspec::syntax::parse_expression;
    /// let expr = parse_expression("a + b * a").unwrap();
    /// assert_eq!(expr.field_refs(), vec!["a".to_string(), "b".to_string()]);
    /// ```
    pub fn field_refs(&self) -> Vec<String> {
        let mut refs = Vec::new();
        self.collect_field_refs(&mut refs);
        refs
    }

    fn collect_field_refs(&self, refs: &mut Vec<String>) {
        match self {
            Expr::Field(name, _) => {
                if !refs.iter().any(|r| r == name) {
                    refs.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_field_refs(refs),
            Expr::Binary { left, right, .. } => {
                left.collect_field_refs(refs);
                right.collect_field_refs(refs);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_field_refs(refs);
                }
            }
            Expr::Number(..) | Expr::String(..) | Expr::Bool(..) | Expr::Nil(..) => {}
        }
    }

    /// Pretty-prints the expression as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recspec::syntax::parse_expression;
    /// let expr = parse_expression("a + b").unwrap();
    /// assert_eq!(expr.pretty(), "(a + b)");
    /// ```
    pub fn pretty(&self) -> String {
        match self {
            Expr::Number(n, _) => n.to_string(),
            Expr::String(s, _) => format!("\"{}\"", s),
            Expr::Bool(b, _) => b.to_string(),
            Expr::Nil(_) => "nil".to_string(),
            Expr::Field(name, _) => name.clone(),
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Neg => format!("-{}", operand.pretty()),
                UnaryOp::Not => format!("(not {})", operand.pretty()),
            },
            Expr::Binary {
                op, left, right, ..
            } => {
                format!("({} {} {})", left.pretty(), op.symbol(), right.pretty())
            }
            Expr::Call { name, args, .. } => {
                let inner = args
                    .iter()
                    .map(Expr::pretty)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", name, inner)
            }
        }
    }
}
