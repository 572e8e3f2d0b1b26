//! Expression parser.
//!
//! Converts default-value and predicate expression text into [`Expr`] trees
//! with source location tracking. Purely syntactic: no name resolution or
//! type checking happens here.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{BinaryOp, Expr, Span, UnaryOp};
use crate::errors::{ErrorKind, RecspecError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct ExprParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse one expression into an AST.
///
/// # Examples
///
/// ```rust
/// use recspec::syntax::parse_expression;
/// let expr = parse_expression("a + b").unwrap();
/// assert_eq!(expr.field_refs(), vec!["a".to_string(), "b".to_string()]);
/// ```
pub fn parse_expression(source_text: &str) -> Result<Expr, RecspecError> {
    if source_text.trim().is_empty() {
        return Err(RecspecError::new(ErrorKind::EmptyExpression)
            .with_help("an expression must contain at least one literal or field reference"));
    }

    let pairs = ExprParser::parse(Rule::program, source_text)
        .map_err(|e| convert_parse_error(e, source_text))?;

    // The program rule always wraps exactly one expression.
    let program = pairs.peek().ok_or(ErrorKind::EmptyExpression)?;
    let expression = program
        .into_inner()
        .find(|p| p.as_rule() == Rule::expression)
        .ok_or(ErrorKind::EmptyExpression)?;

    build_expr(expression, source_text)
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_expr(pair: Pair<Rule>, source: &str) -> Result<Expr, RecspecError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::expression => {
            let inner = pair.into_inner().next().ok_or(ErrorKind::EmptyExpression)?;
            build_expr(inner, source)
        }

        Rule::or_expr | Rule::and_expr | Rule::add_expr | Rule::mul_expr => {
            build_binary_chain(pair, source)
        }

        Rule::cmp_expr => {
            let mut inner = pair.into_inner();
            let first = inner.next().ok_or(ErrorKind::EmptyExpression)?;
            let left = build_expr(first, source)?;
            match inner.next() {
                None => Ok(left),
                Some(op_pair) => {
                    let op = binary_op(op_pair.as_str(), &op_pair, source)?;
                    let right_pair = inner.next().ok_or_else(|| {
                        missing_operand(span, source)
                    })?;
                    let right = build_expr(right_pair, source)?;
                    Ok(Expr::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                        span,
                    })
                }
            }
        }

        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = inner.next().ok_or(ErrorKind::EmptyExpression)?;
            match first.as_rule() {
                Rule::neg_op | Rule::not_op => {
                    let op = if first.as_rule() == Rule::neg_op {
                        UnaryOp::Neg
                    } else {
                        UnaryOp::Not
                    };
                    let operand_pair =
                        inner.next().ok_or_else(|| missing_operand(span, source))?;
                    let operand = build_expr(operand_pair, source)?;
                    Ok(Expr::Unary {
                        op,
                        operand: Box::new(operand),
                        span,
                    })
                }
                _ => build_expr(first, source),
            }
        }

        Rule::primary => {
            let inner = pair.into_inner().next().ok_or(ErrorKind::EmptyExpression)?;
            build_expr(inner, source)
        }

        Rule::group => {
            let inner = pair.into_inner().next().ok_or(ErrorKind::EmptyExpression)?;
            build_expr(inner, source)
        }

        Rule::number => {
            let text = pair.as_str();
            let value = text.parse::<f64>().map_err(|_| {
                RecspecError::new(ErrorKind::InvalidLiteral {
                    literal_type: "number".into(),
                    value: text.into(),
                })
                .with_source("expression", source.to_string(), span)
            })?;
            Ok(Expr::Number(value, span))
        }

        Rule::boolean => Ok(Expr::Bool(pair.as_str() == "true", span)),

        Rule::nil => Ok(Expr::Nil(span)),

        Rule::string => {
            let content = unescape_string(pair.as_str(), span, source)?;
            Ok(Expr::String(content, span))
        }

        Rule::field => Ok(Expr::Field(pair.as_str().to_string(), span)),

        Rule::call => {
            let mut inner = pair.into_inner();
            let name = inner
                .next()
                .ok_or(ErrorKind::EmptyExpression)?
                .as_str()
                .to_string();
            let mut args = Vec::new();
            if let Some(call_args) = inner.next() {
                for arg in call_args.into_inner() {
                    args.push(build_expr(arg, source)?);
                }
            }
            Ok(Expr::Call { name, args, span })
        }

        other => Err(RecspecError::new(ErrorKind::UnexpectedToken {
            message: format!("unhandled grammar rule {:?}", other),
        })
        .with_source("expression", source.to_string(), span)),
    }
}

/// Folds a left-associative operator chain: operand (op operand)*.
fn build_binary_chain(pair: Pair<Rule>, source: &str) -> Result<Expr, RecspecError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let first = inner.next().ok_or(ErrorKind::EmptyExpression)?;
    let mut result = build_expr(first, source)?;

    while let Some(op_pair) = inner.next() {
        let op = binary_op(op_pair.as_str(), &op_pair, source)?;
        let right_pair = inner.next().ok_or_else(|| missing_operand(span, source))?;
        let right = build_expr(right_pair, source)?;
        let combined = Span::new(result.span().start, right.span().end);
        result = Expr::Binary {
            op,
            left: Box::new(result),
            right: Box::new(right),
            span: combined,
        };
    }
    Ok(result)
}

// ============================================================================
// HELPERS
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn binary_op(text: &str, pair: &Pair<Rule>, source: &str) -> Result<BinaryOp, RecspecError> {
    let op = match text {
        "or" | "||" => BinaryOp::Or,
        "and" | "&&" => BinaryOp::And,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Rem,
        other => {
            return Err(RecspecError::new(ErrorKind::UnexpectedToken {
                message: format!("unknown operator '{}'", other),
            })
            .with_source("expression", source.to_string(), get_span(pair)))
        }
    };
    Ok(op)
}

fn missing_operand(span: Span, source: &str) -> RecspecError {
    RecspecError::new(ErrorKind::UnexpectedToken {
        message: "operator is missing its right operand".into(),
    })
    .with_source("expression", source.to_string(), span)
}

fn unescape_string(raw: &str, span: Span, source: &str) -> Result<String, RecspecError> {
    // raw includes the surrounding quotes.
    let body = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            other => {
                return Err(RecspecError::new(ErrorKind::InvalidLiteral {
                    literal_type: "string escape".into(),
                    value: format!("\\{}", other.map(String::from).unwrap_or_default()),
                })
                .with_source("expression", source.to_string(), span))
            }
        }
    }
    Ok(out)
}

fn convert_parse_error(error: pest::error::Error<Rule>, source: &str) -> RecspecError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span::new(pos, pos),
        pest::error::InputLocation::Span((start, end)) => Span::new(start, end),
    };
    RecspecError::new(ErrorKind::UnexpectedToken {
        message: error.variant.message().to_string(),
    })
    .with_source("expression", source.to_string(), span)
}

// ============================================================================
// TESTS
// ============================================================================
