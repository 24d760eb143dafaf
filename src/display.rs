//! Text rendering for fitted models.
//!
//! Least-squares polynomials render in the same grammar the parser accepts,
//! so the user can see and edit the formula of a freehand fit:
//!
//! ```text
//! 0.5*x^2 - 3*x + 1.25
//! ```
//!
//! Lagrange fits render as a description of the points they pass through.
//! That text is for display only and does not parse.

use crate::Real;
use crate::types::Point;

/// Coefficients with a smaller magnitude are left out of the rendered formula.
pub const NEGLIGIBLE_COEFFICIENT: Real = 1e-10;

/// Decimal digits kept when rendering a coefficient.
pub const COEFFICIENT_DIGITS: usize = 6;

/// Formats a number with six decimal digits, then strips trailing zeros and a
/// trailing decimal point.
///
/// # Examples
///
/// ```
/// use exp_curve::display::format_coefficient;
///
/// assert_eq!(format_coefficient(2.5), "2.5");
/// assert_eq!(format_coefficient(3.0), "3");
/// assert_eq!(format_coefficient(-0.1234567), "-0.123457");
/// ```
pub fn format_coefficient(value: Real) -> String {
    let mut text = format!("{:.*}", COEFFICIENT_DIGITS, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    // Rounding can leave a bare negative zero, e.g. -1e-9
    if text == "-0" {
        text.remove(0);
    }
    text
}

/// Renders polynomial coefficients, ordered from the highest power down to the
/// constant term, as a formula string.
///
/// Terms are `c` (power 0), `c*x` (power 1) or `c*x^p`, joined with `" + "`;
/// `"+ -"` is then rewritten to `"- "`. Coefficients below
/// [`NEGLIGIBLE_COEFFICIENT`] in magnitude are skipped, and a polynomial with
/// no remaining terms renders as `"0"`.
pub fn format_polynomial(coefficients: &[Real]) -> String {
    let degree = coefficients.len().saturating_sub(1);
    let terms: Vec<String> = coefficients
        .iter()
        .enumerate()
        .filter(|(_, c)| c.abs() >= NEGLIGIBLE_COEFFICIENT)
        .map(|(i, &c)| {
            let power = degree - i;
            let coeff = format_coefficient(c);
            match power {
                0 => coeff,
                1 => format!("{}*x", coeff),
                _ => format!("{}*x^{}", coeff, power),
            }
        })
        .collect();

    if terms.is_empty() {
        return "0".to_string();
    }
    terms.join(" + ").replace("+ -", "- ")
}

/// Describes a Lagrange fit by the points it interpolates.
pub fn format_lagrange(points: &[Point]) -> String {
    let listed: Vec<String> = points
        .iter()
        .map(|p| format!("({}, {})", format_coefficient(p.x), format_coefficient(p.y)))
        .collect();
    format!("Lagrange polynomial through {}", listed.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coefficient_strips_zeros() {
        assert_eq!(format_coefficient(1.0), "1");
        assert_eq!(format_coefficient(0.5), "0.5");
        assert_eq!(format_coefficient(-12.25), "-12.25");
        assert_eq!(format_coefficient(100.0), "100");
        assert_eq!(format_coefficient(1.0000004), "1");
        assert_eq!(format_coefficient(1.0000006), "1.000001");
        assert_eq!(format_coefficient(-1e-9), "0");
        assert_eq!(format_coefficient(0.0), "0");
    }

    #[test]
    fn test_format_polynomial_terms() {
        assert_eq!(format_polynomial(&[2.0, -3.0, 1.0]), "2*x^2 - 3*x + 1");
        assert_eq!(format_polynomial(&[1.0, 0.0]), "1*x");
        assert_eq!(format_polynomial(&[-0.5, 0.0, 0.0, 4.0]), "-0.5*x^3 + 4");
        assert_eq!(format_polynomial(&[1e-12, 3.0]), "3");
        assert_eq!(format_polynomial(&[1e-12, -1e-11]), "0");
        assert_eq!(format_polynomial(&[]), "0");
    }

    #[test]
    fn test_format_polynomial_parses_back() {
        let text = format_polynomial(&[0.25, -1.5, 0.0, 2.0]);
        assert_eq!(text, "0.25*x^3 - 1.5*x^2 + 2");
        let expr = crate::Expression::parse(&text).unwrap();
        assert_eq!(expr.eval(2.0), Ok(0.25 * 8.0 - 1.5 * 4.0 + 2.0));
    }

    #[test]
    fn test_format_lagrange_lists_points() {
        let points = [Point::new(0.0, 1.0), Point::new(2.5, -3.0)];
        assert_eq!(
            format_lagrange(&points),
            "Lagrange polynomial through (0, 1), (2.5, -3)"
        );
    }
}
