//! Ordinary least-squares fit of a straight line `y = a + b·x`.
//!
//! Both calibrators reduce their nonlinear problems to repeated straight-line
//! regressions (log-log inside Kelessidis, τ on γ̇ⁿ inside Mullineux), so this
//! is deliberately small and allocation-free.
//!
//! Implementation choices:
//! - Two points: closed form through the pair (slope 0 when both x coincide,
//!   which avoids a division by zero on degenerate input).
//! - More points: the two-pass centered algorithm (means first, then
//!   `Σ(x−x̄)(y−ȳ)/Σ(x−x̄)²`), which is numerically stabler than the naive
//!   single-pass normal equations.

use crate::math::compare;

/// A fitted line `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub intercept: f64,
    pub slope: f64,
}

impl Line {
    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares line through `points`.
///
/// Returns `None` when fewer than two points are supplied; the caller decides
/// what "undefined" means in its context.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<Line> {
    match points.len() {
        0 | 1 => None,
        2 => {
            let (x0, y0) = points[0];
            let (x1, y1) = points[1];
            let slope = if compare::eq(x0, x1, compare::DEFAULT_EPS) {
                0.0
            } else {
                (y1 - y0) / (x1 - x0)
            };
            Some(Line {
                intercept: y0 - slope * x0,
                slope,
            })
        }
        n => {
            let n_f = n as f64;
            let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n_f;
            let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n_f;

            let mut cov = 0.0;
            let mut var = 0.0;
            for &(x, y) in points {
                let dx = x - x_mean;
                cov += dx * (y - y_mean);
                var += dx * dx;
            }

            // All x equal: horizontal line through the mean.
            let slope = if compare::eq(var, 0.0, compare::DEFAULT_EPS) {
                0.0
            } else {
                cov / var
            };
            Some(Line {
                intercept: y_mean - slope * x_mean,
                slope,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_points_reproduce_the_exact_line() {
        let line = linear_regression(&[(1.0, 3.0), (3.0, 7.0)]).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_points_with_equal_x_fall_back_to_zero_slope() {
        let line = linear_regression(&[(2.0, 1.0), (2.0, 5.0)]).unwrap();
        assert_eq!(line.slope, 0.0);
        assert!((line.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn collinear_points_fit_with_zero_residual() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 0.5 + 1.5 * i as f64)).collect();
        let line = linear_regression(&points).unwrap();
        assert!((line.slope - 1.5).abs() < 1e-10);
        assert!((line.intercept - 0.5).abs() < 1e-10);
        for (x, y) in points {
            assert!((line.eval(x) - y).abs() < 1e-9);
        }
    }

    #[test]
    fn fewer_than_two_points_is_undefined() {
        assert!(linear_regression(&[]).is_none());
        assert!(linear_regression(&[(1.0, 1.0)]).is_none());
    }
}
