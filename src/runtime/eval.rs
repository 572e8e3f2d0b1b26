//! Expression evaluation against resolved field bindings.
//!
//! Defaults and predicates are pure functions of their inputs: an [`Expr`]
//! plus a [`Bindings`] environment of already-resolved fields. Evaluation is
//! strict except for `and`/`or`, which short-circuit.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::ast::{BinaryOp, Expr, UnaryOp, Value};
use crate::errors::{type_mismatch, ErrorKind, RecspecError};

// ============================================================================
// BINDINGS: ordered name -> value environment
// ============================================================================

/// An ordered set of name/value bindings.
///
/// During keyword construction this is the left-to-right environment that
/// default expressions see; it is also the currency of the all-fields
/// unpack/pack convenience forms. Lookup is linear, which is fine for the
/// handful of fields a record has.
///
/// # Examples
///
/// ```rust
/// use recspec::runtime::eval::Bindings;
/// use recspec::ast::Value;
/// let mut env = Bindings::new();
/// env.set("a", Value::Number(5.0));
/// assert_eq!(env.get("a"), Some(&Value::Number(5.0)));
/// assert_eq!(env.get("b"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds bindings from name/value pairs, in order.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        let mut bindings = Self::new();
        for (name, value) in pairs {
            bindings.set(name, value);
        }
        bindings
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or replaces a binding. Insertion order is preserved;
    /// replacement keeps the original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<im::HashMap<String, Value>> for Bindings {
    fn from(map: im::HashMap<String, Value>) -> Self {
        // Sorted for determinism; im's iteration order is unspecified.
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        let mut bindings = Bindings::new();
        for name in names {
            bindings.set(name.clone(), map[name].clone());
        }
        bindings
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

// ============================================================================
// BUILTIN FUNCTIONS
// ============================================================================

type BuiltinFn = fn(&[Value]) -> Result<Value, RecspecError>;

static BUILTINS: Lazy<HashMap<&'static str, BuiltinFn>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, BuiltinFn> = HashMap::new();
    table.insert("abs", builtin_abs);
    table.insert("min", builtin_min);
    table.insert("max", builtin_max);
    table.insert("floor", builtin_floor);
    table.insert("ceil", builtin_ceil);
    table.insert("len", builtin_len);
    table
});

fn expect_number(value: &Value, context: &str) -> Result<f64, RecspecError> {
    value
        .as_number()
        .ok_or_else(|| type_mismatch(context, "Number", value.type_name()))
}

fn expect_arity(args: &[Value], expected: usize, context: &str) -> Result<(), RecspecError> {
    if args.len() != expected {
        return Err(crate::errors::arity_mismatch(context, expected, args.len()));
    }
    Ok(())
}

fn builtin_abs(args: &[Value]) -> Result<Value, RecspecError> {
    expect_arity(args, 1, "abs")?;
    Ok(Value::Number(expect_number(&args[0], "abs")?.abs()))
}

fn builtin_min(args: &[Value]) -> Result<Value, RecspecError> {
    fold_numeric(args, "min", f64::min)
}

fn builtin_max(args: &[Value]) -> Result<Value, RecspecError> {
    fold_numeric(args, "max", f64::max)
}

fn fold_numeric(
    args: &[Value],
    context: &str,
    combine: fn(f64, f64) -> f64,
) -> Result<Value, RecspecError> {
    if args.is_empty() {
        return Err(crate::errors::arity_mismatch(context, 1, 0));
    }
    let mut acc = expect_number(&args[0], context)?;
    for arg in &args[1..] {
        acc = combine(acc, expect_number(arg, context)?);
    }
    Ok(Value::Number(acc))
}

fn builtin_floor(args: &[Value]) -> Result<Value, RecspecError> {
    expect_arity(args, 1, "floor")?;
    Ok(Value::Number(expect_number(&args[0], "floor")?.floor()))
}

fn builtin_ceil(args: &[Value]) -> Result<Value, RecspecError> {
    expect_arity(args, 1, "ceil")?;
    Ok(Value::Number(expect_number(&args[0], "ceil")?.ceil()))
}

fn builtin_len(args: &[Value]) -> Result<Value, RecspecError> {
    expect_arity(args, 1, "len")?;
    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        other => return Err(type_mismatch("len", "String, List, or Map", other.type_name())),
    };
    Ok(Value::Number(len as f64))
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Evaluates an expression against resolved bindings.
///
/// Referencing a name absent from `env` is an error: during keyword
/// construction the environment holds exactly the fields resolved so far, so
/// this is how "defaults see only earlier fields" is enforced at runtime.
///
/// # Examples
///
/// ```rust
/// use recspec::runtime::eval::{eval, Bindings};
/// use recspec::syntax::parse_expression;
/// use recspec::ast::Value;
/// let expr = parse_expression("a + b").unwrap();
/// let env = Bindings::from_pairs([("a", 5), ("b", 7)]);
/// assert_eq!(eval(&expr, &env).unwrap(), Value::Number(12.0));
/// ```
pub fn eval(expr: &Expr, env: &Bindings) -> Result<Value, RecspecError> {
    match expr {
        Expr::Number(n, _) => Ok(Value::Number(*n)),
        Expr::String(s, _) => Ok(Value::String(s.clone())),
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Nil(_) => Ok(Value::Nil),

        Expr::Field(name, _) => env.get(name).cloned().ok_or_else(|| {
            RecspecError::new(ErrorKind::UnknownField {
                type_name: "expression environment".to_string(),
                field: name.clone(),
            })
            .with_help("only fields resolved earlier in declaration order are visible here")
        }),

        Expr::Unary { op, operand, .. } => {
            let value = eval(operand, env)?;
            match op {
                UnaryOp::Neg => Ok(Value::Number(-expect_number(&value, "-")?)),
                UnaryOp::Not => match value.as_bool() {
                    Some(b) => Ok(Value::Bool(!b)),
                    None => Err(type_mismatch("not", "Bool", value.type_name())),
                },
            }
        }

        Expr::Binary {
            op, left, right, ..
        } => eval_binary(*op, left, right, env),

        Expr::Call { name, args, .. } => {
            let builtin = BUILTINS.get(name.as_str()).ok_or_else(|| {
                RecspecError::new(ErrorKind::UnknownBuiltin { name: name.clone() })
            })?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, env)?);
            }
            builtin(&values)
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    env: &Bindings,
) -> Result<Value, RecspecError> {
    // Short-circuit logic first.
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let lhs = eval(left, env)?;
        let Some(lhs) = lhs.as_bool() else {
            return Err(type_mismatch(op.symbol(), "Bool", lhs.type_name()));
        };
        if (op == BinaryOp::And && !lhs) || (op == BinaryOp::Or && lhs) {
            return Ok(Value::Bool(lhs));
        }
        let rhs = eval(right, env)?;
        return match rhs.as_bool() {
            Some(b) => Ok(Value::Bool(b)),
            None => Err(type_mismatch(op.symbol(), "Bool", rhs.type_name())),
        };
    }

    let lhs = eval(left, env)?;
    let rhs = eval(right, env)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),

        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let a = expect_number(&lhs, op.symbol())?;
            let b = expect_number(&rhs, op.symbol())?;
            let result = match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            };
            Ok(Value::Bool(result))
        }

        BinaryOp::Add => match (&lhs, &rhs) {
            // `+` concatenates strings, mirroring how specs compose labels.
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => {
                let a = expect_number(&lhs, "+")?;
                let b = expect_number(&rhs, "+")?;
                Ok(Value::Number(a + b))
            }
        },

        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let a = expect_number(&lhs, op.symbol())?;
            let b = expect_number(&rhs, op.symbol())?;
            match op {
                BinaryOp::Sub => Ok(Value::Number(a - b)),
                BinaryOp::Mul => Ok(Value::Number(a * b)),
                BinaryOp::Div => {
                    if b == 0.0 {
                        Err(RecspecError::new(ErrorKind::DivisionByZero))
                    } else {
                        Ok(Value::Number(a / b))
                    }
                }
                _ => {
                    if b == 0.0 {
                        Err(RecspecError::new(ErrorKind::DivisionByZero))
                    } else {
                        Ok(Value::Number(a % b))
                    }
                }
            }
        }

        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_expression;

    fn run(src: &str, env: &Bindings) -> Result<Value, RecspecError> {
        eval(&parse_expression(src).unwrap(), env)
    }

    #[test]
    fn arithmetic_and_comparison() {
        let env = Bindings::from_pairs([("a", 5), ("b", 7)]);
        assert_eq!(run("a + b", &env).unwrap(), Value::Number(12.0));
        assert_eq!(run("a * 2 - b", &env).unwrap(), Value::Number(3.0));
        assert_eq!(run("a < b", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("a >= b", &env).unwrap(), Value::Bool(false));
    }

    #[test]
    fn logic_short_circuits() {
        let env = Bindings::from_pairs([("ok", true)]);
        // The right side would fail (unknown field), but is never reached.
        assert_eq!(run("ok or missing", &env).unwrap(), Value::Bool(true));
        let env = Bindings::from_pairs([("ok", false)]);
        assert_eq!(run("ok and missing", &env).unwrap(), Value::Bool(false));
    }

    #[test]
    fn unknown_field_reference_fails() {
        let env = Bindings::new();
        let err = run("ghost + 1", &env).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownField { field, .. } if field == "ghost"));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let env = Bindings::from_pairs([("a", 1)]);
        let err = run("a / 0", &env).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DivisionByZero);
    }

    #[test]
    fn builtins_work_and_unknown_calls_fail() {
        let env = Bindings::from_pairs([("a", -3), ("b", 10)]);
        assert_eq!(run("abs(a)", &env).unwrap(), Value::Number(3.0));
        assert_eq!(run("max(a, b, 4)", &env).unwrap(), Value::Number(10.0));
        assert_eq!(run("min(a, b)", &env).unwrap(), Value::Number(-3.0));
        let err = run("frobnicate(a)", &env).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownBuiltin { name } if name == "frobnicate"));
    }

    #[test]
    fn string_concatenation_and_len() {
        let env = Bindings::from_pairs([("first", "Ada"), ("last", "Lovelace")]);
        assert_eq!(
            run("first + \" \" + last", &env).unwrap(),
            Value::String("Ada Lovelace".into())
        );
        assert_eq!(run("len(first)", &env).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn bindings_replacement_keeps_position() {
        let mut env = Bindings::from_pairs([("a", 1), ("b", 2)]);
        env.set("a", 99);
        let names: Vec<&str> = env.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(env.get("a"), Some(&Value::Number(99.0)));
    }
}
