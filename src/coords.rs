//! Mapping between the real coordinate space of curves and screen pixels.
//!
//! Real space is origin-centred with y pointing up; screen space has its
//! origin in the top-left corner with y pointing down. One real unit is one
//! pixel. The screen geometry is an explicit [`Viewport`] value rather than
//! global state so the numeric core never depends on it.

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::Real;
use crate::curve::Curve;
use crate::error::EvalError;
use crate::types::Point;

/// Number of samples used to draw a curve across the viewport.
pub const DEFAULT_PATH_SAMPLES: usize = 400;

/// Screen geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: Real,
    pub height: Real,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub const fn new(width: Real, height: Real) -> Self {
        Viewport { width, height }
    }

    /// Converts a real-space point to screen coordinates.
    pub fn to_screen(&self, point: Point) -> (Real, Real) {
        (point.x + self.width / 2.0, self.height / 2.0 - point.y)
    }

    /// Converts screen coordinates to a real-space point.
    pub fn to_real(&self, screen_x: Real, screen_y: Real) -> Point {
        Point::new(screen_x - self.width / 2.0, self.height / 2.0 - screen_y)
    }

    /// The real x-values visible across the screen width.
    pub fn x_range(&self) -> RangeInclusive<Real> {
        let half = self.width / 2.0;
        -half..=half
    }

    /// Samples `curve` across the visible x-range and maps each sample to
    /// screen coordinates.
    ///
    /// Failed samples are kept in place so the caller can break the drawn path
    /// or substitute its own default.
    pub fn sample_path<C>(&self, curve: &C, count: usize) -> Vec<Result<(Real, Real), EvalError>>
    where
        C: Curve + ?Sized,
    {
        curve
            .sample(self.x_range(), count)
            .into_iter()
            .map(|(x, y)| y.map(|y| self.to_screen(Point::new(x, y))))
            .collect()
    }
}
