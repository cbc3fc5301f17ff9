//! Dispersive integrals along contours.
//!
//! The integrals are of the form
//!
//! ```text
//! sⁿ ∫ f(x) / (z(x)ⁿ (z(x) - s)) z'(x) dx
//! ```
//!
//! where `z` is a curve in the `s`-plane parametrised by `x` and `n` is the
//! number of subtractions. The integrand `f` is a function of the curve
//! parameter. If `s` lies on a real segment of the curve, the integral is
//! understood as the limit from above.

use std::f64::consts::PI;

use num::complex::Complex64;

use crate::contour::Curve;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::integration::Integrator;

const NAN: Complex64 = Complex64::new(f64::NAN, f64::NAN);

fn check_range(curve: &Curve, lower: f64, upper: f64) -> Result<()> {
    for x in [lower, upper] {
        if !(x >= curve.lower() && x <= curve.upper()) {
            return Err(Error::domain(
                "curve parameter",
                x,
                format!("[{}, {}]", curve.lower(), curve.upper()),
            ));
        }
    }
    Ok(())
}

/// The integral over `[lower, upper]` for `s` off the curve.
pub fn ordinary_prescription(
    curve: &Curve,
    lower: f64,
    upper: f64,
    s: Complex64,
    f: impl Fn(f64) -> Complex64,
    subtractions: i32,
    integrator: &Integrator,
) -> Result<Complex64> {
    check_range(curve, lower, upper)?;
    let integrand = |x: f64| {
        let (Ok(z), Ok(dz)) = (curve.curve_func(x), curve.derivative_func(x)) else {
            return NAN;
        };
        f(x) / z.powi(subtractions) / (z - s) * dz
    };
    let result = integrator.c_integrate(integrand, lower, upper)?;
    Ok(s.powi(subtractions) * result.value)
}

/// The integral over `[lower, upper]` for real `s` on that part of the curve,
/// which needs to run along the real axis.
pub fn cut_prescription(
    curve: &Curve,
    lower: f64,
    upper: f64,
    s: f64,
    f: impl Fn(f64) -> Complex64,
    subtractions: i32,
    integrator: &Integrator,
) -> Result<Complex64> {
    check_range(curve, lower, upper)?;
    let start = curve.curve_func(lower)?;
    let end = curve.curve_func(upper)?;
    if start.im != 0.0 || end.im != 0.0 {
        return Err(Error::InvalidCurve(format!(
            "segment from {start} to {end} does not lie on the real axis"
        )));
    }
    let (start, end) = (start.re, end.re);
    if !(start < s && s < end) {
        return Err(Error::domain("s", s, format!("({start}, {end})")));
    }

    let singularity = curve.locate(s, lower, upper)?;
    let fs = f(singularity);
    let sub = subtractions - 1;
    // the located point instead of s, so that f = zⁿ⁻¹ cancels exactly
    let gs = fs / curve.curve_func(singularity)?.powi(sub);

    let integrand = |x: f64| {
        if x == singularity {
            return Complex64::new(0.0, 0.0);
        }
        let (Ok(z), Ok(dz)) = (curve.curve_func(x), curve.derivative_func(x)) else {
            return NAN;
        };
        (f(x) / z.powi(sub) - gs) / z / (z - s) * dz
    };
    let result = integrator.c_integrate(integrand, lower, upper)?;

    let l = Complex64::from((1.0 - s / end) / (s / start - 1.0)).ln();
    Ok(s.powi(subtractions) * result.value + fs * (Complex64::new(0.0, PI) + l))
}

/// Whether the segment between `lower` and `upper` runs along the real axis.
/// Segments leave the axis in their interior, so the midpoint is checked too.
fn on_real_axis(curve: &Curve, lower: f64, upper: f64) -> Result<bool> {
    for x in [lower, 0.5 * (lower + upper), upper] {
        if curve.curve_func(x)?.im != 0.0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The integral along the whole curve, split at the boundaries of its segments.
pub fn dispersive_integral(
    curve: &Curve,
    s: Complex64,
    f: impl Fn(f64) -> Complex64,
    subtractions: i32,
    integrator: &Integrator,
) -> Result<Complex64> {
    let boundaries = curve.boundaries();

    if let Some((x1, x2)) = curve.hits(s) {
        if !(s.im == 0.0 && on_real_axis(curve, x1, x2)?) {
            return Err(Error::domain(
                "Im s",
                s.im,
                "points off the complex part of the contour",
            ));
        }
        let n = subtractions;
        let mut result = cut_prescription(curve, x1, x2, s.re, &f, n, integrator)?;
        for w in boundaries.windows(2) {
            if w[1] <= x1 || w[0] >= x2 {
                let s = Complex64::from(s.re);
                result += ordinary_prescription(curve, w[0], w[1], s, &f, n, integrator)?;
            }
        }
        return Ok(result);
    }

    let mut result = Complex64::new(0.0, 0.0);
    for w in boundaries.windows(2) {
        result += ordinary_prescription(curve, w[0], w[1], s, &f, subtractions, integrator)?;
    }
    Ok(result)
}

/// The integral along the curve of `grid` as a Gauss-Legendre sum over the
/// integrand `values` at the nodes of the grid.
pub fn on_grid(
    grid: &Grid<'_>,
    values: &[Complex64],
    s: Complex64,
    subtractions: i32,
) -> Result<Complex64> {
    if values.len() != grid.x_size() {
        return Err(Error::domain(
            "number of values",
            values.len() as f64,
            format!("{{{}}}", grid.x_size()),
        ));
    }
    let mut sum = Complex64::new(0.0, 0.0);
    for (i, value) in values.iter().enumerate() {
        let x = grid.x(i)?;
        sum += grid.x_weight(i)? * *value / x.powi(subtractions) / (x - s) * grid.derivative(i)?;
    }
    Ok(s.powi(subtractions) * sum)
}
