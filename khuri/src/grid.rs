//! Gauss-Legendre sampling of a contour.
//!
//! A grid lives in the `(x, z)`-plane: `x` runs along a curve in the complex
//! `s`-plane, `z` is the cosine of the scattering angle and runs over
//! `[-1, 1]`. The nodes along the curve are placed segment by segment, so that
//! the kinks of piecewise curves coincide with the ends of the subintervals.

use num::complex::Complex64;

use crate::contour::Curve;
use crate::error::{Error, Result};
use crate::integration::GaussLegendre;

const Z_LOWER: f64 = -1.0;
const Z_UPPER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Complex64,
    pub x_weight: f64,
    pub x_derivative: Complex64,
    pub z: f64,
    pub z_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Knot {
    parameter: f64,
    x: Complex64,
    weight: f64,
    derivative: Complex64,
}

#[derive(Debug, Clone)]
pub struct Grid<'a> {
    curve: &'a Curve,
    x_knots: Vec<Knot>,
    z_knots: Vec<(f64, f64)>,
}

fn index_error(what: &'static str, index: usize, size: usize) -> Error {
    Error::domain(what, index as f64, format!("[0, {size})"))
}

impl<'a> Grid<'a> {
    /// Sample `curve` with `x_sizes[k]` nodes on its `k`-th segment and the
    /// angular variable with `z_size` nodes.
    pub fn new(curve: &'a Curve, x_sizes: Vec<usize>, z_size: usize) -> Result<Self> {
        let boundaries = curve.boundaries();
        if boundaries.len() != x_sizes.len() + 1 {
            return Err(Error::InvalidCurve(format!(
                "each of the {} segments requires a number of knots, got {}",
                boundaries.len() - 1,
                x_sizes.len()
            )));
        }

        let mut x_knots = Vec::with_capacity(x_sizes.iter().sum());
        for (bounds, &size) in boundaries.windows(2).zip(&x_sizes) {
            let rule = GaussLegendre::new(size);
            for (parameter, weight) in rule.points(bounds[0], bounds[1]) {
                x_knots.push(Knot {
                    parameter,
                    x: curve.curve_func(parameter)?,
                    weight,
                    derivative: curve.derivative_func(parameter)?,
                });
            }
        }

        let z_knots = GaussLegendre::new(z_size)
            .points(Z_LOWER, Z_UPPER)
            .collect();

        Ok(Self {
            curve,
            x_knots,
            z_knots,
        })
    }

    pub fn curve(&self) -> &Curve {
        self.curve
    }

    fn x_knot(&self, i: usize) -> Result<&Knot> {
        self.x_knots
            .get(i)
            .ok_or_else(|| index_error("x index", i, self.x_size()))
    }

    fn z_knot(&self, j: usize) -> Result<(f64, f64)> {
        self.z_knots
            .get(j)
            .copied()
            .ok_or_else(|| index_error("z index", j, self.z_size()))
    }

    pub fn point(&self, i: usize, j: usize) -> Result<Point> {
        let x = self.x_knot(i)?;
        let (z, z_weight) = self.z_knot(j)?;
        Ok(Point {
            x: x.x,
            x_weight: x.weight,
            x_derivative: x.derivative,
            z,
            z_weight,
        })
    }

    pub fn x(&self, i: usize) -> Result<Complex64> {
        Ok(self.x_knot(i)?.x)
    }

    pub fn x_weight(&self, i: usize) -> Result<f64> {
        Ok(self.x_knot(i)?.weight)
    }

    pub fn derivative(&self, i: usize) -> Result<Complex64> {
        Ok(self.x_knot(i)?.derivative)
    }

    pub fn z(&self, j: usize) -> Result<f64> {
        Ok(self.z_knot(j)?.0)
    }

    pub fn z_weight(&self, j: usize) -> Result<f64> {
        Ok(self.z_knot(j)?.1)
    }

    pub fn x_size(&self) -> usize {
        self.x_knots.len()
    }

    pub fn z_size(&self) -> usize {
        self.z_knots.len()
    }

    pub fn x_parameter_lower(&self) -> f64 {
        self.curve.lower()
    }

    pub fn x_parameter_upper(&self) -> f64 {
        self.curve.upper()
    }

    /// Curve parameters of the nodes along the curve.
    pub fn x_parameter_values(&self) -> Vec<f64> {
        self.x_knots.iter().map(|k| k.parameter).collect()
    }
}
