//! Built-in mathematical functions for expression evaluation.
//!
//! This module provides the allow-listed functions that may be called from a
//! formula, together with the checked arithmetic primitives the evaluator uses
//! for binary operators. Unlike IEEE arithmetic, nothing here quietly returns
//! NaN or infinity: undefined results are reported as [`EvalError::Domain`],
//! division by zero as [`EvalError::DivideByZero`], and finite operands that
//! overflow as [`EvalError::Overflow`].
//!
//! With the `libm` feature (on by default) the transcendental functions come
//! from the `libm` crate; without it the inherent `f64` methods are used.

use core::fmt;

use crate::Real;
use crate::error::EvalError;

#[cfg(feature = "libm")]
use libm::{
    cos as libm_cos, fabs as libm_abs, floor as libm_floor, pow as libm_pow, sin as libm_sin,
    sqrt as libm_sqrt, tan as libm_tan,
};

#[cfg(not(feature = "libm"))]
mod fallback {
    use crate::Real;

    pub fn libm_cos(a: Real) -> Real {
        a.cos()
    }
    pub fn libm_abs(a: Real) -> Real {
        a.abs()
    }
    pub fn libm_floor(a: Real) -> Real {
        a.floor()
    }
    pub fn libm_pow(a: Real, b: Real) -> Real {
        a.powf(b)
    }
    pub fn libm_sin(a: Real) -> Real {
        a.sin()
    }
    pub fn libm_sqrt(a: Real) -> Real {
        a.sqrt()
    }
    pub fn libm_tan(a: Real) -> Real {
        a.tan()
    }
}
#[cfg(not(feature = "libm"))]
use fallback::*;

/// The allow-listed functions callable from a formula. Each takes exactly one argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Abs,
}

impl Function {
    /// Every built-in, in the order they are documented.
    pub const ALL: [Function; 5] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Sqrt,
        Function::Abs,
    ];

    /// Looks up a function by its exact, whole-token name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "sqrt" => Some(Function::Sqrt),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
        }
    }

    pub const fn arity(self) -> usize {
        1
    }

    /// Applies the function to an already-evaluated argument.
    pub fn apply(self, a: Real) -> Result<Real, EvalError> {
        match self {
            Function::Sin => sin(a),
            Function::Cos => cos(a),
            Function::Tan => tan(a),
            Function::Sqrt => sqrt(a),
            Function::Abs => Ok(abs(a)),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn finite(result: Real, operation: &'static str) -> Result<Real, EvalError> {
    if result.is_finite() {
        Ok(result)
    } else if result.is_nan() {
        Err(EvalError::Domain { operation })
    } else {
        Err(EvalError::Overflow { operation })
    }
}

pub fn add(a: Real, b: Real) -> Result<Real, EvalError> {
    finite(a + b, "+")
}

pub fn sub(a: Real, b: Real) -> Result<Real, EvalError> {
    finite(a - b, "-")
}

pub fn mul(a: Real, b: Real) -> Result<Real, EvalError> {
    finite(a * b, "*")
}

/// Divides the first value by the second.
///
/// # Parameters
///
/// * `a` - Numerator
/// * `b` - Denominator
///
/// # Returns
///
/// The quotient `a / b`, or [`EvalError::DivideByZero`] when `b` is zero
/// (including `0/0`).
pub fn div(a: Real, b: Real) -> Result<Real, EvalError> {
    if b == 0.0 {
        return Err(EvalError::DivideByZero);
    }
    finite(a / b, "/")
}

pub fn neg(a: Real) -> Real {
    -a
}

pub fn abs(a: Real) -> Real {
    libm_abs(a)
}

pub fn sin(a: Real) -> Result<Real, EvalError> {
    finite(libm_sin(a), "sin")
}

pub fn cos(a: Real) -> Result<Real, EvalError> {
    finite(libm_cos(a), "cos")
}

pub fn tan(a: Real) -> Result<Real, EvalError> {
    finite(libm_tan(a), "tan")
}

pub fn sqrt(a: Real) -> Result<Real, EvalError> {
    if a < 0.0 {
        return Err(EvalError::Domain { operation: "sqrt" });
    }
    finite(libm_sqrt(a), "sqrt")
}

/// Raises a value to a power.
///
/// This function computes `a` raised to the power of `b` (a^b).
/// It handles the special cases that IEEE `pow` would turn into NaN or
/// infinity:
///
/// - 0^0 = 1 (by mathematical convention)
/// - Zero raised to a negative power is a division by zero
/// - Negative base with non-integer exponent is a domain error
/// - Finite operands whose power overflows report [`EvalError::Overflow`]
///
/// # Parameters
///
/// * `a` - Base value
/// * `b` - Exponent
pub fn pow(a: Real, b: Real) -> Result<Real, EvalError> {
    if a == 0.0 && b == 0.0 {
        return Ok(1.0);
    }
    if a == 0.0 && b < 0.0 {
        return Err(EvalError::DivideByZero);
    }
    if a < 0.0 && b != libm_floor(b) {
        return Err(EvalError::Domain { operation: "^" });
    }
    finite(libm_pow(a, b), "^")
}
