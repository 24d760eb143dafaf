#![doc = r#"
# exp-curve

A safe single-variable expression evaluator with polynomial curve fitting and
classic root finders.

## Overview

exp-curve turns untrusted formula text such as `sin(x) * 50 + x/2` into a
closed syntax tree that can only ever compute a number from `x`. Nothing in
the grammar can reach the host program: the only identifiers are `x`, the
constants `pi` and `e`, and the functions `sin`, `cos`, `tan`, `sqrt` and
`abs`. Alongside the evaluator the crate fits curves through sample points,
either by least squares or by Lagrange interpolation, and finds roots by
bisection, Newton-Raphson or the secant method.

Key features:
- Pratt parser with positioned, typed parse errors
- Checked evaluation: domain errors, division by zero and overflow are reported, never turned into NaN
- Least-squares polynomial fits of degree 1 to 10 solved by SVD
- Lagrange interpolation through distinct points
- A [`Curve`] trait shared by typed formulas and fitted models
- Root finders that return the full trace of approximations

## Quick Start

```rust
use exp_curve::Expression;

let curve = Expression::parse("2*x + 3").unwrap();
assert_eq!(curve.eval(4.0), Ok(11.0));

// Parse once, evaluate many times
let wave = Expression::parse("sin(x) * 50 + x/2").unwrap();
let ys: Vec<f64> = (0..4).map(|i| wave.eval(i as f64).unwrap()).collect();
assert_eq!(ys.len(), 4);
```

## Fitting Points

```rust
use exp_curve::{fit, Curve, FittingConfiguration, Point};

let points = [
    Point::new(0.0, 1.0),
    Point::new(1.0, 0.0),
    Point::new(2.0, 1.0),
];
let model = fit(&points, &FittingConfiguration::least_squares(2)).unwrap();
assert!((model.eval(3.0).unwrap() - 4.0).abs() < 1e-9);
assert_eq!(model.to_formula(), "1*x^2 - 2*x + 1");

let interpolant = fit(&points, &FittingConfiguration::lagrange()).unwrap();
assert!((interpolant.eval(1.0).unwrap()).abs() < 1e-12);
```

## Error Handling

Every stage reports a typed error. Deciding what to draw when a formula fails
belongs to the caller:

```rust
use exp_curve::{Expression, EvalError, ParseError};

assert!(matches!(
    Expression::parse("2 +"),
    Err(ParseError::UnexpectedToken { .. })
));
assert!(matches!(
    Expression::parse("__import__(x)"),
    Err(ParseError::UnknownIdentifier { .. })
));

let reciprocal = Expression::parse("1/x").unwrap();
assert_eq!(reciprocal.eval(0.0), Err(EvalError::DivideByZero));
let y = reciprocal.eval(0.0).unwrap_or(300.0);
assert_eq!(y, 300.0);
```

## Supported Grammar

### Operator Precedence and Associativity

From lowest to highest precedence:

| Precedence | Operators       | Associativity |
|------------|-----------------|---------------|
| 9          | `+` `-`         | Left          |
| 10         | `*` `/`         | Left          |
| 14         | unary `+` `-`   | Right (unary) |
| 15         | `^` `**`        | Right         |

Exponentiation binds tighter than unary minus, so `-2^2` is `-4`.

### Built-in Functions

`sin`, `cos`, `tan`, `sqrt`, `abs`, each taking exactly one argument.

### Built-in Constants

- `pi`: 3.14159... (π)
- `e`: 2.71828... (Euler's number)

## Feature Flags

- `libm` (default): transcendental functions use the `libm` crate. Without it
  the `f64` inherent methods are used.
"#]

pub mod coords;
pub mod curve;
pub mod display;
pub mod engine;
pub mod error;
pub mod eval;
pub mod fit;
pub mod functions;
pub mod lexer;
pub mod rootfinding;
pub mod types;

pub use coords::Viewport;
pub use curve::Curve;
pub use engine::*;
pub use error::{Error, EvalError, FitError, ParseError, RootFindError};
pub use fit::{
    FitMethod, FitModel, FittingConfiguration, LagrangeFit, PolynomialFit, fit, fit_points,
};
pub use functions::Function;
pub use rootfinding::{RootResult, bisection, central_difference, newton_raphson, secant};
pub use types::*;

/// The floating-point type used for every coordinate and coefficient.
pub type Real = f64;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f64::consts::PI;
    pub const E: Real = core::f64::consts::E;
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check if two floating point values are approximately equal
/// within a specified epsilon. Supports optional format arguments like assert_eq!.
#[macro_export]
macro_rules! assert_approx_eq {
    // assert_approx_eq!(left, right) uses the default epsilon
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if !(left_val.is_nan() && right_val.is_nan()) && left_val != right_val {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $($arg:tt)+) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if !(left_val.is_nan() && right_val.is_nan()) && left_val != right_val {
            assert!((left_val - right_val).abs() < eps, $($arg)+);
        }
    }};
}
