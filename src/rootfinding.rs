//! One-dimensional root finders.
//!
//! Bisection, Newton-Raphson and the secant method, each returning the root
//! together with the full sequence of approximations so callers can plot the
//! convergence or check its order in tests.
//!
//! The functions accept any `FnMut(Real) -> Real`. To search a parsed curve,
//! wrap it in a closure and apply your own policy for evaluation failures:
//!
//! ```
//! use exp_curve::Expression;
//! use exp_curve::rootfinding::{bisection, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
//!
//! let curve = Expression::parse("x^2 - 2").unwrap();
//! let result = bisection(
//!     |x| curve.eval(x).unwrap_or(f64::NAN),
//!     0.0,
//!     2.0,
//!     DEFAULT_TOLERANCE,
//!     DEFAULT_MAX_ITERATIONS,
//! )
//! .unwrap();
//! assert!((result.root - 2f64.sqrt()).abs() < 1e-6);
//! ```

use crate::Real;
use crate::error::RootFindError;

pub const DEFAULT_TOLERANCE: Real = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Newton-Raphson gives up when `|f'(x)|` falls below this.
pub const DERIVATIVE_EPSILON: Real = 1e-10;

/// The secant method gives up when successive function values differ by less than this.
pub const SECANT_EPSILON: Real = 1e-10;

/// A converged root.
#[derive(Debug, Clone, PartialEq)]
pub struct RootResult {
    pub root: Real,
    /// Completed steps before the one that met the tolerance.
    pub iterations: usize,
    /// Every approximation produced, in order.
    pub trace: Vec<Real>,
}

/// Finds a root of `f` in `[a, b]` by repeated halving.
///
/// `f(a)` and `f(b)` must have opposite signs (or one of them be zero);
/// otherwise [`RootFindError::InvalidBracket`] is returned after evaluating
/// only the two endpoints. The endpoints may be given in either order.
pub fn bisection<F>(
    mut f: F,
    a: Real,
    b: Real,
    tolerance: Real,
    max_iterations: usize,
) -> Result<RootResult, RootFindError>
where
    F: FnMut(Real) -> Real,
{
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };
    let mut fa = f(a);
    let fb = f(b);

    if fa.is_nan() || fb.is_nan() || (fa != 0.0 && fb != 0.0 && fa.signum() == fb.signum()) {
        return Err(RootFindError::InvalidBracket { a, b });
    }
    if fa == 0.0 {
        return Ok(RootResult { root: a, iterations: 0, trace: vec![a] });
    }
    if fb == 0.0 {
        return Ok(RootResult { root: b, iterations: 0, trace: vec![b] });
    }

    let mut iterations = 0;
    let mut trace = Vec::new();

    while (b - a) / 2.0 > tolerance && iterations < max_iterations {
        let c = (a + b) / 2.0;
        trace.push(c);
        let fc = f(c);
        log::trace!("bisection step {}: [{}, {}] -> {}", iterations, a, b, c);

        if fc == 0.0 {
            return Ok(RootResult { root: c, iterations, trace });
        } else if fa.signum() != fc.signum() {
            b = c;
        } else {
            a = c;
            fa = fc;
        }
        iterations += 1;
    }

    let root = (a + b) / 2.0;
    if (b - a) / 2.0 > tolerance {
        return Err(RootFindError::MaxIterationsExceeded { last: root, iterations });
    }
    trace.push(root);
    Ok(RootResult { root, iterations, trace })
}

/// Finds a root of `f` from the initial guess `x0` using its derivative `df`.
///
/// Converges quadratically near a simple root. Fails with
/// [`RootFindError::DerivativeNearZero`] when `|df(x)| < 1e-10`.
pub fn newton_raphson<F, D>(
    mut f: F,
    mut df: D,
    x0: Real,
    tolerance: Real,
    max_iterations: usize,
) -> Result<RootResult, RootFindError>
where
    F: FnMut(Real) -> Real,
    D: FnMut(Real) -> Real,
{
    let mut x = x0;
    let mut iterations = 0;
    let mut trace = vec![x0];

    while iterations < max_iterations {
        let slope = df(x);
        // Also catches a NaN slope
        if !(slope.abs() >= DERIVATIVE_EPSILON) {
            return Err(RootFindError::DerivativeNearZero { at: x, iterations });
        }

        let x_new = x - f(x) / slope;
        trace.push(x_new);
        log::trace!("newton step {}: {} -> {}", iterations, x, x_new);

        if (x_new - x).abs() < tolerance {
            return Ok(RootResult { root: x_new, iterations, trace });
        }
        x = x_new;
        iterations += 1;
    }

    Err(RootFindError::MaxIterationsExceeded { last: x, iterations })
}

/// Finds a root of `f` from two initial guesses without a derivative.
///
/// Fails with [`RootFindError::StagnantSecant`] when `|f(x1) - f(x0)| < 1e-10`.
pub fn secant<F>(
    mut f: F,
    x0: Real,
    x1: Real,
    tolerance: Real,
    max_iterations: usize,
) -> Result<RootResult, RootFindError>
where
    F: FnMut(Real) -> Real,
{
    let (mut x0, mut x1) = (x0, x1);
    let mut iterations = 0;
    let mut trace = vec![x0, x1];

    while iterations < max_iterations {
        let f_x0 = f(x0);
        let f_x1 = f(x1);

        let delta = f_x1 - f_x0;
        if !(delta.abs() >= SECANT_EPSILON) {
            return Err(RootFindError::StagnantSecant { at: x1, iterations });
        }

        let x_new = x1 - f_x1 * (x1 - x0) / delta;
        trace.push(x_new);
        log::trace!("secant step {}: ({}, {}) -> {}", iterations, x0, x1, x_new);

        if (x_new - x1).abs() < tolerance {
            return Ok(RootResult { root: x_new, iterations, trace });
        }
        x0 = x1;
        x1 = x_new;
        iterations += 1;
    }

    Err(RootFindError::MaxIterationsExceeded { last: x1, iterations })
}

/// Symmetric difference quotient `(f(x + h) - f(x - h)) / 2h`.
///
/// Lets Newton-Raphson run on a curve that has no symbolic derivative.
pub fn central_difference<F>(mut f: F, x: Real, h: Real) -> Real
where
    F: FnMut(Real) -> Real,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}
