//! Expression and condition evaluation
//!
//! The only arithmetic form is `identifier op integer` with op one of `+`,
//! `-`, `*`. Conditions compare an `int` variable against an integer literal.

use crate::context::ExecutionContext;
use crate::error::{Result, ScorpkError};
use crate::grammar::Condition;
use crate::types::{TypeTag, Value};

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

impl BinOp {
    fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            BinOp::Add => left.checked_add(right),
            BinOp::Sub => left.checked_sub(right),
            BinOp::Mul => left.checked_mul(right),
        }
    }
}

/// A parsed `identifier op integer` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub var: String,
    pub op: BinOp,
    pub rhs: i64,
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse an expression, rejecting anything outside the binary form
pub fn parse_expression(expression: &str) -> Result<BinaryExpr> {
    let expr = expression.trim();
    let invalid = || ScorpkError::InvalidExpression(expr.to_string());

    for (symbol, op) in [('+', BinOp::Add), ('-', BinOp::Sub), ('*', BinOp::Mul)] {
        if let Some((left, right)) = expr.split_once(symbol) {
            let left = left.trim();
            let right = right.trim();
            let is_literal = !right.is_empty() && right.bytes().all(|b| b.is_ascii_digit());
            if !is_identifier(left) || !is_literal {
                return Err(invalid());
            }
            let rhs = right.parse().map_err(|_| invalid())?;
            return Ok(BinaryExpr {
                var: left.to_string(),
                op,
                rhs,
            });
        }
    }

    Err(invalid())
}

/// Evaluate an expression against the current variable store
pub fn evaluate_expression(expression: &str, ctx: &ExecutionContext) -> Result<Value> {
    let parsed = parse_expression(expression)?;
    let left = ctx
        .read_variable(&parsed.var)?
        .as_int()
        .ok_or_else(|| ScorpkError::InvalidExpression(expression.trim().to_string()))?;

    parsed
        .op
        .apply(left, parsed.rhs)
        .map(Value::Int)
        .ok_or_else(|| ScorpkError::InvalidExpression(expression.trim().to_string()))
}

/// Evaluate a condition; the guard variable must be declared `int`
pub fn evaluate_condition(cond: &Condition, ctx: &ExecutionContext) -> Result<bool> {
    let var = ctx
        .variable(&cond.var)
        .ok_or_else(|| ScorpkError::UndefinedVariable(cond.var.clone()))?;

    let left = match (var.ty, &var.value) {
        (TypeTag::Int, Value::Int(n)) => *n,
        (ty, value) => {
            return Err(ScorpkError::TypeMismatch {
                name: cond.var.clone(),
                expected: TypeTag::Int.to_string(),
                actual: if ty == TypeTag::Int {
                    value.kind().to_string()
                } else {
                    ty.to_string()
                },
            })
        }
    };

    Ok(cond.op.holds(left, cond.rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CmpOp;

    fn ctx_with(name: &str, value: Value, ty: TypeTag) -> ExecutionContext {
        let ctx = ExecutionContext::new();
        ctx.declare_variable(name, value, ty, false);
        ctx
    }

    #[test]
    fn test_binary_forms() {
        let ctx = ctx_with("a", Value::Int(3), TypeTag::Int);
        assert_eq!(evaluate_expression("a + 2", &ctx).unwrap(), Value::Int(5));
        assert_eq!(evaluate_expression("a - 5", &ctx).unwrap(), Value::Int(-2));
        assert_eq!(evaluate_expression("a*4", &ctx).unwrap(), Value::Int(12));
    }

    #[test]
    fn test_other_shapes_are_invalid() {
        let ctx = ctx_with("a", Value::Int(3), TypeTag::Int);
        for expr in ["5", "a", "2 + a", "a + b", "a / 2", "a + -1", "a + 2 + 3"] {
            assert!(
                matches!(
                    evaluate_expression(expr, &ctx),
                    Err(ScorpkError::InvalidExpression(_))
                ),
                "{expr} should be invalid"
            );
        }
    }

    #[test]
    fn test_text_operand_is_invalid() {
        let ctx = ctx_with("s", Value::from("hi"), TypeTag::String);
        assert!(matches!(
            evaluate_expression("s + 1", &ctx),
            Err(ScorpkError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_overflow_is_invalid() {
        let ctx = ctx_with("a", Value::Int(i64::MAX), TypeTag::Int);
        assert!(evaluate_expression("a + 1", &ctx).is_err());
    }

    #[test]
    fn test_undefined_operand() {
        let ctx = ExecutionContext::new();
        assert!(matches!(
            evaluate_expression("a + 1", &ctx),
            Err(ScorpkError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn test_condition_requires_int() {
        let cond = Condition {
            var: "s".to_string(),
            op: CmpOp::Eq,
            rhs: 1,
        };
        let ctx = ctx_with("s", Value::from("1"), TypeTag::String);
        assert!(matches!(
            evaluate_condition(&cond, &ctx),
            Err(ScorpkError::TypeMismatch { .. })
        ));

        let ctx = ctx_with("s", Value::Int(1), TypeTag::Int);
        assert!(evaluate_condition(&cond, &ctx).unwrap());
    }

    #[test]
    fn test_comparisons() {
        let ctx = ctx_with("x", Value::Int(7), TypeTag::Int);
        let check = |op, rhs| {
            let cond = Condition {
                var: "x".to_string(),
                op,
                rhs,
            };
            evaluate_condition(&cond, &ctx).unwrap()
        };
        assert!(check(CmpOp::Gt, 5));
        assert!(!check(CmpOp::Lt, 5));
        assert!(check(CmpOp::Eq, 7));
    }
}
