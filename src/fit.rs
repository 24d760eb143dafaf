//! Curve fitting: least-squares polynomial regression and Lagrange interpolation.
//!
//! Turns a set of user-placed points into a [`FitModel`] that can be evaluated
//! like any other [`Curve`] and rendered back to text.
//!
//! # Examples
//!
//! ```
//! use exp_curve::fit::{FitMethod, fit_points};
//! use exp_curve::Curve;
//!
//! // Two points only support a line, whatever degree was asked for
//! let model = fit_points(&[(0.0, 0.0), (1.0, 1.0)], FitMethod::LeastSquares, 5).unwrap();
//! assert_eq!(model.degree(), 1);
//! assert!((model.eval(0.5).unwrap() - 0.5).abs() < 1e-9);
//! assert_eq!(model.to_formula(), "1*x");
//! ```

use core::fmt;
use core::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Deserializer, Serialize};

use crate::Real;
use crate::curve::Curve;
use crate::display::{format_lagrange, format_polynomial};
use crate::error::{EvalError, FitError};
use crate::functions::{add, div, mul, sub};
use crate::types::Point;

/// Lowest polynomial degree a least-squares fit will use.
pub const MIN_DEGREE: usize = 1;

/// Highest polynomial degree a least-squares fit will use.
pub const MAX_DEGREE: usize = 10;

/// Above this many points Lagrange interpolation becomes badly conditioned.
pub const LAGRANGE_STABLE_POINTS: usize = 15;

/// Which model [`fit`] produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Polynomial regression of a fixed degree.
    #[default]
    LeastSquares,
    /// The interpolating polynomial through every point.
    Lagrange,
}

impl FitMethod {
    pub fn name(self) -> &'static str {
        match self {
            FitMethod::LeastSquares => "least_squares",
            FitMethod::Lagrange => "lagrange",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitMethod {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "least_squares" => Ok(FitMethod::LeastSquares),
            "lagrange" => Ok(FitMethod::Lagrange),
            _ => Err(FitError::UnknownMethod { name: s.to_string() }),
        }
    }
}

/// How to fit a set of points.
///
/// The degree is only used by [`FitMethod::LeastSquares`]. It is clamped into
/// `[MIN_DEGREE, MAX_DEGREE]` on construction and on deserialisation, and
/// clamped again against the number of points when fitting.
///
/// ```
/// use exp_curve::fit::{FitMethod, FittingConfiguration};
///
/// let config = FittingConfiguration::new(FitMethod::LeastSquares, 42);
/// assert_eq!(config.degree, 10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FittingConfiguration {
    pub method: FitMethod,
    #[serde(deserialize_with = "deserialize_degree")]
    pub degree: usize,
}

impl Default for FittingConfiguration {
    fn default() -> Self {
        Self {
            method: FitMethod::LeastSquares,
            degree: 2,
        }
    }
}

impl FittingConfiguration {
    pub fn new(method: FitMethod, degree: usize) -> Self {
        Self {
            method,
            degree: degree.clamp(MIN_DEGREE, MAX_DEGREE),
        }
    }

    pub fn least_squares(degree: usize) -> Self {
        Self::new(FitMethod::LeastSquares, degree)
    }

    pub fn lagrange() -> Self {
        Self {
            method: FitMethod::Lagrange,
            ..Self::default()
        }
    }

    /// The degree a least-squares fit over `point_count` points will use.
    ///
    /// A degree-`d` polynomial needs `d + 1` points, so the configured degree
    /// is reduced rather than producing an underdetermined system.
    pub fn effective_degree(&self, point_count: usize) -> usize {
        let ceiling = MAX_DEGREE.min(point_count.saturating_sub(1)).max(MIN_DEGREE);
        self.degree.clamp(MIN_DEGREE, ceiling)
    }
}

fn deserialize_degree<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(MIN_DEGREE as i64, MAX_DEGREE as i64) as usize)
}

/// A polynomial with coefficients ordered from the highest power down to the
/// constant term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFit {
    coefficients: Vec<Real>,
}

impl PolynomialFit {
    pub fn new(coefficients: Vec<Real>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// The formula text, in the grammar accepted by [`Expression::parse`](crate::Expression::parse).
    ///
    /// Coefficients are rounded to six decimals, so the parsed text agrees
    /// with [`eval`](Curve::eval) only approximately: each term is off by at
    /// most `5e-7 * |x|^p`. That keeps the difference below `1e-4` for
    /// `|x| <= 2` up to degree 6, but at screen-scale `|x|` of a few hundred a
    /// cubic term alone can be off by whole units. Evaluate the fit itself
    /// rather than its text when accuracy matters.
    pub fn to_formula(&self) -> String {
        format_polynomial(&self.coefficients)
    }
}

impl Curve for PolynomialFit {
    /// Horner evaluation with the full-precision coefficients.
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        if !x.is_finite() {
            return Err(EvalError::Domain { operation: "x" });
        }
        self.coefficients
            .iter()
            .try_fold(0.0, |acc, &c| add(mul(acc, x)?, c))
    }
}

/// The Lagrange interpolating polynomial, kept as its points and evaluated
/// directly from them.
///
/// Numerically fine for small point counts; beyond roughly
/// [`LAGRANGE_STABLE_POINTS`] points the basis products become badly
/// conditioned and the curve oscillates between samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LagrangeFit {
    points: Vec<Point>,
}

impl LagrangeFit {
    /// The interpolated points, sorted by x.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn degree(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// A description of the fit. Not a parseable formula.
    pub fn to_formula(&self) -> String {
        format_lagrange(&self.points)
    }
}

impl Curve for LagrangeFit {
    /// `sum_i y_i * prod_{j != i} (x - x_j) / (x_i - x_j)`
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        if !x.is_finite() {
            return Err(EvalError::Domain { operation: "x" });
        }
        let mut result = 0.0;
        for (i, pi) in self.points.iter().enumerate() {
            let mut term = pi.y;
            for (j, pj) in self.points.iter().enumerate() {
                if i != j {
                    term = mul(term, div(sub(x, pj.x)?, sub(pi.x, pj.x)?)?)?;
                }
            }
            result = add(result, term)?;
        }
        Ok(result)
    }
}

/// A fitted curve. Regenerated, never mutated, whenever the input points or
/// configuration change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitModel {
    Polynomial(PolynomialFit),
    Lagrange(LagrangeFit),
}

impl FitModel {
    pub fn method(&self) -> FitMethod {
        match self {
            FitModel::Polynomial(_) => FitMethod::LeastSquares,
            FitModel::Lagrange(_) => FitMethod::Lagrange,
        }
    }

    /// Polynomial degree of the model. For Lagrange fits this is one less
    /// than the number of points.
    pub fn degree(&self) -> usize {
        match self {
            FitModel::Polynomial(poly) => poly.degree(),
            FitModel::Lagrange(lagrange) => lagrange.degree(),
        }
    }

    /// Coefficients, highest power first, for least-squares fits.
    pub fn coefficients(&self) -> Option<&[Real]> {
        match self {
            FitModel::Polynomial(poly) => Some(poly.coefficients()),
            FitModel::Lagrange(_) => None,
        }
    }

    /// Interpolated points, for Lagrange fits.
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            FitModel::Polynomial(_) => None,
            FitModel::Lagrange(lagrange) => Some(lagrange.points()),
        }
    }

    /// Display text for the model.
    ///
    /// Only least-squares output is guaranteed to parse as an
    /// [`Expression`](crate::Expression).
    pub fn to_formula(&self) -> String {
        match self {
            FitModel::Polynomial(poly) => poly.to_formula(),
            FitModel::Lagrange(lagrange) => lagrange.to_formula(),
        }
    }
}

impl Curve for FitModel {
    fn eval(&self, x: Real) -> Result<Real, EvalError> {
        match self {
            FitModel::Polynomial(poly) => poly.eval(x),
            FitModel::Lagrange(lagrange) => lagrange.eval(x),
        }
    }
}

impl fmt::Display for FitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formula())
    }
}

/// Fits `points` according to `config`.
///
/// Insertion order does not matter: points are sorted by x (then y) first, so
/// the same set always yields bit-identical results.
///
/// # Errors
///
/// - [`FitError::InsufficientPoints`] for fewer than two points
/// - [`FitError::NonFinitePoint`] if any coordinate is NaN or infinite
/// - [`FitError::DuplicateAbscissa`] for a Lagrange fit with a repeated x
/// - [`FitError::SingularFit`] if the least-squares system is rank deficient
pub fn fit(points: &[Point], config: &FittingConfiguration) -> Result<FitModel, FitError> {
    if points.len() < 2 {
        return Err(FitError::InsufficientPoints {
            found: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(FitError::NonFinitePoint { index });
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    match config.method {
        FitMethod::Lagrange => fit_lagrange(sorted).map(FitModel::Lagrange),
        FitMethod::LeastSquares => {
            let degree = config.effective_degree(sorted.len());
            log::debug!(
                "least squares fit over {} points: requested degree {}, using {}",
                sorted.len(),
                config.degree,
                degree
            );
            let coefficients = solve_least_squares(&sorted, degree)?;
            Ok(FitModel::Polynomial(PolynomialFit::new(coefficients)))
        }
    }
}

fn fit_lagrange(sorted: Vec<Point>) -> Result<LagrangeFit, FitError> {
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].x == pair[1].x) {
        return Err(FitError::DuplicateAbscissa { x: pair[1].x });
    }
    log::debug!("lagrange fit through {} points", sorted.len());
    if sorted.len() > LAGRANGE_STABLE_POINTS {
        log::warn!(
            "lagrange fit through {} points is ill-conditioned (stable up to about {})",
            sorted.len(),
            LAGRANGE_STABLE_POINTS
        );
    }
    Ok(LagrangeFit { points: sorted })
}

/// Least-squares solve of the Vandermonde system via SVD.
///
/// Columns are scaled to unit norm before decomposition; powers of large x
/// otherwise differ by many orders of magnitude and swamp the rank test.
fn solve_least_squares(points: &[Point], degree: usize) -> Result<Vec<Real>, FitError> {
    let singular = FitError::SingularFit {
        points: points.len(),
        degree,
    };
    let n = points.len();
    let k = degree + 1;

    // Column j holds x^(degree - j), matching the coefficient order
    let mut design = DMatrix::<Real>::zeros(n, k);
    for (i, p) in points.iter().enumerate() {
        let mut power = 1.0;
        for j in (0..k).rev() {
            design[(i, j)] = power;
            power *= p.x;
        }
    }

    let mut scales = Vec::with_capacity(k);
    for j in 0..k {
        let norm = design.column(j).norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(singular);
        }
        design.column_mut(j).scale_mut(1.0 / norm);
        scales.push(norm);
    }

    let rhs = DVector::from_iterator(n, points.iter().map(|p| p.y));
    let svd = design.svd(true, true);
    let eps = svd.singular_values.max() * n.max(k) as Real * Real::EPSILON;
    if svd.rank(eps) < k {
        return Err(singular);
    }
    let solution = svd.solve(&rhs, eps).map_err(|_| singular.clone())?;

    let coefficients: Vec<Real> = solution
        .iter()
        .zip(&scales)
        .map(|(z, scale)| z / scale)
        .collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(singular);
    }
    Ok(coefficients)
}

/// Fits raw `(x, y)` pairs with the given method and degree.
///
/// Convenience entry point for callers that do not build a
/// [`FittingConfiguration`] themselves. The degree is clamped as described
/// on [`FittingConfiguration`].
pub fn fit_points(
    points: &[(Real, Real)],
    method: FitMethod,
    degree: usize,
) -> Result<FitModel, FitError> {
    let points: Vec<Point> = points.iter().copied().map(Point::from).collect();
    fit(&points, &FittingConfiguration::new(method, degree))
}
