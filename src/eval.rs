//! Tree-walking evaluator for parsed formulas.
//!
//! Evaluation is a pure function of the tree and the value of `x`. Every
//! intermediate result is checked, so a failure anywhere in the tree surfaces
//! as an [`EvalError`] instead of a NaN or infinity travelling up to the caller.

use crate::Real;
use crate::error::EvalError;
use crate::functions::{add, div, mul, neg, pow, sub};
use crate::types::{AstExpr, BinaryOp};

/// Evaluates `ast` with the free variable bound to `x`.
///
/// A non-finite `x` is rejected up front with [`EvalError::Domain`].
///
/// # Examples
///
/// ```
/// use exp_curve::engine::parse_expression;
/// use exp_curve::eval::eval_ast;
///
/// let ast = parse_expression("x^2 + 1").unwrap();
/// assert_eq!(eval_ast(&ast, 3.0).unwrap(), 10.0);
/// ```
pub fn eval_ast(ast: &AstExpr, x: Real) -> Result<Real, EvalError> {
    if !x.is_finite() {
        return Err(EvalError::Domain { operation: "x" });
    }
    eval_node(ast, x)
}

fn eval_node(ast: &AstExpr, x: Real) -> Result<Real, EvalError> {
    match ast {
        AstExpr::Constant(val) => Ok(*val),
        AstExpr::Variable => Ok(x),
        AstExpr::Named(constant) => Ok(constant.value()),
        AstExpr::Negate(inner) => Ok(neg(eval_node(inner, x)?)),
        AstExpr::Binary { op, left, right } => {
            let a = eval_node(left, x)?;
            let b = eval_node(right, x)?;
            eval_binary(*op, a, b)
        }
        AstExpr::Function { func, arg } => func.apply(eval_node(arg, x)?),
    }
}

fn eval_binary(op: BinaryOp, a: Real, b: Real) -> Result<Real, EvalError> {
    match op {
        BinaryOp::Add => add(a, b),
        BinaryOp::Sub => sub(a, b),
        BinaryOp::Mul => mul(a, b),
        BinaryOp::Div => div(a, b),
        BinaryOp::Pow => pow(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::engine::parse_expression;

    fn eval_str(source: &str, x: Real) -> Result<Real, EvalError> {
        let ast = parse_expression(source).unwrap_or_else(|e| panic!("Parse error: {}", e));
        eval_ast(&ast, x)
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eq!(eval_str("2 + 3 * 4", 0.0), Ok(14.0));
        assert_eq!(eval_str("2 * (3 + 4)", 0.0), Ok(14.0));
        assert_eq!(eval_str("10 / 4 - x", 0.5), Ok(2.0));
        assert_eq!(eval_str("-x^2", 3.0), Ok(-9.0));
        assert_eq!(eval_str("2^3^2", 0.0), Ok(512.0));
        assert_eq!(eval_str("x**2", 4.0), eval_str("x^2", 4.0));
    }

    #[test]
    fn test_eval_functions_take_expressions() {
        assert_approx_eq!(eval_str("sin(x^2)", 0.0).unwrap(), 0.0);
        assert_approx_eq!(eval_str("sqrt(x*x + 16)", 3.0).unwrap(), 5.0);
        assert_approx_eq!(eval_str("abs(x - 10)", 3.0).unwrap(), 7.0);
        assert_approx_eq!(eval_str("cos(pi)", 0.0).unwrap(), -1.0);
        assert_approx_eq!(eval_str("tan(x)", 0.0).unwrap(), 0.0);
        assert_approx_eq!(eval_str("e", 0.0).unwrap(), crate::constants::E);
    }

    #[test]
    fn test_eval_divide_by_zero_is_an_error() {
        for x in [-1.0, 0.0, 1.0, 1e6] {
            assert_eq!(eval_str("1/0", x), Err(EvalError::DivideByZero));
        }
        assert_eq!(eval_str("1/x", 0.0), Err(EvalError::DivideByZero));
        assert_eq!(eval_str("x^-1", 0.0), Err(EvalError::DivideByZero));
    }

    #[test]
    fn test_eval_domain_errors() {
        assert_eq!(eval_str("sqrt(x)", -4.0), Err(EvalError::Domain { operation: "sqrt" }));
        assert_eq!(eval_str("x^0.5", -4.0), Err(EvalError::Domain { operation: "^" }));
        assert_eq!(eval_str("x", Real::NAN), Err(EvalError::Domain { operation: "x" }));
        assert_eq!(eval_str("1", Real::INFINITY), Err(EvalError::Domain { operation: "x" }));
    }

    #[test]
    fn test_eval_errors_propagate_from_subtrees() {
        // The failing branch is buried under a function call and an addition
        assert_eq!(eval_str("1 + sin(sqrt(x))", -1.0), Err(EvalError::Domain { operation: "sqrt" }));
        assert_eq!(eval_str("10^400 - 1", 0.0), Err(EvalError::Overflow { operation: "^" }));
    }

    #[test]
    fn test_eval_is_deterministic() {
        let ast = parse_expression("0.001*x**2 + 0.1*sin(0.1*x) + 200").unwrap();
        let first = eval_ast(&ast, 123.456).unwrap();
        for _ in 0..10 {
            assert_eq!(eval_ast(&ast, 123.456).unwrap().to_bits(), first.to_bits());
        }
    }
}
