//! A common interface over everything that can be evaluated as `y = f(x)`.
//!
//! Both typed formulas ([`Expression`]) and fitted models
//! ([`FitModel`](crate::fit::FitModel)) implement [`Curve`], so the code that
//! draws the path or steps the ball does not care where the curve came from.

use core::ops::RangeInclusive;

use crate::Real;
use crate::engine::Expression;
use crate::error::EvalError;

/// A real-valued function of one variable.
pub trait Curve {
    /// Evaluates the curve at `x`.
    fn eval(&self, x: Real) -> Result<Real, EvalError>;

    /// Evaluates the curve at `count` evenly spaced points across `range`,
    /// endpoints included.
    ///
    /// Failed samples are returned as errors alongside their x so the caller
    /// can decide per sample whether to skip, clamp or substitute a default.
    /// A `count` of one samples only the start of the range.
    fn sample(&self, range: RangeInclusive<Real>, count: usize) -> Vec<(Real, Result<Real, EvalError>)> {
        sample_xs(range, count)
            .map(|x| (x, self.eval(x)))
            .collect()
    }
}

/// Evenly spaced x-values across `range`, endpoints included.
pub fn sample_xs(range: RangeInclusive<Real>, count: usize) -> impl Iterator<Item = Real> {
    let (start, end) = range.into_inner();
    let step = if count > 1 {
        (end - start) / (count - 1) as Real
    } else {
        0.0
    };
    (0..count).map(move |i| {
        // Pin the last sample to the endpoint instead of accumulating rounding error
        if count > 1 && i == count - 1 {
            end
        } else {
            start + step * i as Real
        }
    })
}

impl Curve for Expression {
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        Expression::eval(self, x)
    }
}

impl<C: Curve + ?Sized> Curve for &C {
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        (**self).eval(x)
    }
}

impl<C: Curve + ?Sized> Curve for Box<C> {
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        (**self).eval(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_xs_includes_endpoints() {
        let xs: Vec<Real> = sample_xs(-1.0..=1.0, 5).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(sample_xs(0.0..=1.0, 1).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(sample_xs(0.0..=1.0, 0).count(), 0);
    }

    #[test]
    fn test_sample_reports_failures_per_point() {
        let expr = Expression::parse("1/x").unwrap();
        let samples = expr.sample(-1.0..=1.0, 3);
        assert_eq!(samples[0], (-1.0, Ok(-1.0)));
        assert_eq!(samples[1], (0.0, Err(EvalError::DivideByZero)));
        assert_eq!(samples[2], (1.0, Ok(1.0)));
    }

    #[test]
    fn test_boxed_curves_are_curves() {
        let curves: Vec<Box<dyn Curve>> = vec![
            Box::new(Expression::parse("x").unwrap()),
            Box::new(Expression::parse("2*x").unwrap()),
        ];
        let ys: Vec<Real> = curves.iter().map(|c| c.eval(2.0).unwrap()).collect();
        assert_eq!(ys, vec![2.0, 4.0]);
    }
}
