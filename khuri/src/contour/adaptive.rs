//! A contour that dips below the complex singularities of the decay.
//!
//! Starting at threshold the curve descends with a smoothstep profile, runs
//! below the lower singularity branch at a fixed minimal distance and climbs
//! back to the real axis. The remainder up to the cut lies on the real axis.
//! Both the dip and the tail are parametrised on unit intervals, so the curve
//! is defined on `[0, 2]`, or on `[0, 1]` if there is nothing to avoid. The
//! tail starts with the speed the dip ends with, so the parametrisation is
//! continuously differentiable.

use itertools::{Itertools, MinMaxResult};
use num::complex::Complex64;

use super::piecewise::in_between;
use crate::error::{Error, Result};
use crate::singularity;

/// Imaginary parts below this size count as real.
const REAL: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
enum Tail {
    /// Coefficient of the quadratic term.
    Quadratic(f64),
    /// `v / (a + (1 - a) v)`, for tails too short for a monotonic quadratic.
    Rational(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Dip {
    end: f64,
    depth: f64,
    /// Parameter values where the plateau starts and ends.
    left: f64,
    right: f64,
    tail: Tail,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Adaptive {
    mass: f64,
    virtuality: f64,
    cut: f64,
    minimal_distance: f64,
    threshold: f64,
    dip: Option<Dip>,
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn smoothstep_derivative(t: f64) -> f64 {
    6.0 * t * (1.0 - t)
}

impl Dip {
    fn profile(&self, u: f64) -> f64 {
        if u < self.left {
            smoothstep(u / self.left)
        } else if u <= self.right {
            1.0
        } else {
            smoothstep((1.0 - u) / (1.0 - self.right))
        }
    }

    fn profile_derivative(&self, u: f64) -> f64 {
        if u < self.left {
            smoothstep_derivative(u / self.left) / self.left
        } else if u <= self.right {
            0.0
        } else {
            -smoothstep_derivative((1.0 - u) / (1.0 - self.right)) / (1.0 - self.right)
        }
    }
}

impl Adaptive {
    /// Contour for a decay of a particle with squared mass `virtuality` into
    /// three particles of mass `mass`, ending at `cut`.
    pub fn new(mass: f64, virtuality: f64, cut: f64, minimal_distance: f64) -> Result<Self> {
        let threshold = 4.0 * mass * mass;
        if !(minimal_distance > 0.0) {
            return Err(Error::domain("minimal distance", minimal_distance, "(0, ∞)"));
        }
        if !(cut.is_finite() && cut > threshold) {
            return Err(Error::InvalidCurve(format!(
                "cut {cut} needs to be finite and above threshold {threshold}"
            )));
        }

        let curves =
            singularity::singularity_curves(virtuality, mass * mass, singularity::DEFAULT_POINTS)?;
        let lower = curves.lower_half_plane(REAL);

        let (leftmost, rightmost) = match lower.iter().map(|z| z.re).minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => {
                log::debug!("No complex singularities for virtuality {virtuality}");
                return Ok(Self {
                    mass,
                    virtuality,
                    cut,
                    minimal_distance,
                    threshold,
                    dip: None,
                });
            }
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(x, y) => (x, y),
        };
        let deepest = lower.iter().map(|z| -z.im).fold(0.0, f64::max);

        let mut plateau_start = leftmost - minimal_distance;
        let plateau_end = rightmost + minimal_distance;
        let mut flank = plateau_start - threshold;
        if flank <= 0.0 {
            log::warn!(
                "Singularities reach below threshold ({leftmost} < {threshold}), \
                 contour cannot keep a distance of {minimal_distance}"
            );
            flank = minimal_distance;
            plateau_start = threshold + flank;
        }
        let plateau_end = plateau_end.max(plateau_start);
        let end = plateau_end + flank;
        let width = end - threshold;

        if cut <= end {
            return Err(Error::InvalidCurve(format!(
                "cut {cut} needs to lie beyond the singularities, which extend to {end}"
            )));
        }

        let q = cut - end - width;
        let tail = if width + 2.0 * q > 0.0 {
            Tail::Quadratic(q)
        } else {
            Tail::Rational((cut - end) / width)
        };

        Ok(Self {
            mass,
            virtuality,
            cut,
            minimal_distance,
            threshold,
            dip: Some(Dip {
                end,
                depth: deepest + minimal_distance,
                left: (plateau_start - threshold) / width,
                right: (plateau_end - threshold) / width,
                tail,
            }),
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn virtuality(&self) -> f64 {
        self.virtuality
    }

    pub fn cut(&self) -> f64 {
        self.cut
    }

    pub fn minimal_distance(&self) -> f64 {
        self.minimal_distance
    }

    /// Whether the contour leaves the real axis.
    pub fn is_deformed(&self) -> bool {
        self.dip.is_some()
    }

    pub fn lower(&self) -> f64 {
        0.0
    }

    pub fn upper(&self) -> f64 {
        if self.dip.is_some() {
            2.0
        } else {
            1.0
        }
    }

    pub fn boundaries(&self) -> Vec<f64> {
        if self.dip.is_some() {
            vec![0.0, 1.0, 2.0]
        } else {
            vec![0.0, 1.0]
        }
    }

    fn check(&self, x: f64) -> Result<()> {
        if x >= self.lower() && x <= self.upper() {
            Ok(())
        } else {
            Err(Error::domain(
                "curve parameter",
                x,
                format!("[{}, {}]", self.lower(), self.upper()),
            ))
        }
    }

    pub fn curve_func(&self, x: f64) -> Result<Complex64> {
        self.check(x)?;
        let a = self.threshold;
        let Some(dip) = &self.dip else {
            return Ok(Complex64::from(a + (self.cut - a) * x));
        };
        let width = dip.end - a;
        if x <= 1.0 {
            return Ok(Complex64::new(a + width * x, -dip.depth * dip.profile(x)));
        }
        let v = x - 1.0;
        let re = match dip.tail {
            Tail::Quadratic(q) => dip.end + width * v + q * v * v,
            Tail::Rational(a) => dip.end + (self.cut - dip.end) * v / (a + (1.0 - a) * v),
        };
        Ok(Complex64::from(re))
    }

    pub fn derivative_func(&self, x: f64) -> Result<Complex64> {
        self.check(x)?;
        let a = self.threshold;
        let Some(dip) = &self.dip else {
            return Ok(Complex64::from(self.cut - a));
        };
        let width = dip.end - a;
        if x <= 1.0 {
            return Ok(Complex64::new(width, -dip.depth * dip.profile_derivative(x)));
        }
        let v = x - 1.0;
        let re = match dip.tail {
            Tail::Quadratic(q) => width + 2.0 * q * v,
            Tail::Rational(a) => {
                let denominator = a + (1.0 - a) * v;
                (self.cut - dip.end) * a / (denominator * denominator)
            }
        };
        Ok(Complex64::from(re))
    }

    /// Imaginary part of the dip at real part `re`, if the dip spans `re`.
    fn dip_at(&self, re: f64) -> Option<f64> {
        let dip = self.dip.as_ref()?;
        let a = self.threshold;
        if re < a || re > dip.end {
            return None;
        }
        Some(-dip.depth * dip.profile((re - a) / (dip.end - a)))
    }

    pub fn hits(&self, s: Complex64) -> Option<(f64, f64)> {
        let a = Complex64::from(self.threshold);
        let cut = Complex64::from(self.cut);
        let Some(dip) = &self.dip else {
            return in_between(s, a, cut).then_some((0.0, 1.0));
        };
        if let Some(im) = self.dip_at(s.re) {
            if (s.im - im).abs() < 1e-10 {
                return Some((0.0, 1.0));
            }
        }
        in_between(s, Complex64::from(dip.end), cut).then_some((1.0, 2.0))
    }

    /// Whether `s` lies between the dip and the real axis.
    pub fn encloses(&self, s: Complex64) -> bool {
        if !(s.im < 0.0) || s.re <= self.threshold {
            return false;
        }
        match self.dip_at(s.re) {
            Some(im) => im < s.im,
            None => false,
        }
    }

    pub fn knots(&self) -> Vec<Complex64> {
        self.boundaries()
            .into_iter()
            .filter_map(|x| self.curve_func(x).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const MASS: f64 = 1.0;
    const VIRTUALITY: f64 = 30.0;
    const CUT: f64 = 100.0;
    const DISTANCE: f64 = 0.5;

    fn curve() -> Adaptive {
        Adaptive::new(MASS, VIRTUALITY, CUT, DISTANCE).unwrap()
    }

    #[test]
    fn endpoints() {
        let curve = curve();
        assert!(curve.is_deformed());
        assert_eq!(curve.boundaries(), vec![0.0, 1.0, 2.0]);
        assert_eq!(curve.curve_func(0.0).unwrap(), Complex64::from(4.0));
        assert_abs_diff_eq!(curve.curve_func(2.0).unwrap().re, CUT, epsilon = 1e-12);
        assert_eq!(curve.curve_func(1.0).unwrap().im, 0.0);
        assert!(curve.curve_func(2.1).is_err());
    }

    #[test]
    fn keeps_its_distance() {
        let curve = curve();
        let singularities =
            singularity::singularity_curves(VIRTUALITY, MASS * MASS, singularity::DEFAULT_POINTS)
                .unwrap()
                .lower_half_plane(REAL);
        assert!(!singularities.is_empty());
        for i in 0..=2000 {
            let z = curve.curve_func(i as f64 / 1000.0).unwrap();
            for p in &singularities {
                assert!((z - p).norm() >= DISTANCE * (1.0 - 1e-9), "{z} too close to {p}");
            }
        }
        for p in &singularities {
            assert!(curve.encloses(*p));
        }
    }

    #[test]
    fn derivative_is_continuous() {
        let curve = curve();
        for x in [0.0, 1.0] {
            let below = if x > 0.0 { x - 1e-9 } else { x };
            let above = x + 1e-9;
            let a = curve.derivative_func(below).unwrap();
            let b = curve.derivative_func(above).unwrap();
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-5);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-5);
        }
    }

    #[test]
    fn derivative_matches_finite_differences() {
        let curve = curve();
        let h = 1e-6;
        for i in 1..40 {
            let x = i as f64 * 0.05;
            let numeric = (curve.curve_func(x + h).unwrap() - curve.curve_func(x - h).unwrap())
                / (2.0 * h);
            let exact = curve.derivative_func(x).unwrap();
            assert!((numeric - exact).norm() < 1e-4 * (1.0 + exact.norm()), "{x}");
        }
    }

    #[test]
    fn short_tail_is_smooth() {
        let end = curve().curve_func(1.0).unwrap().re;
        let width = end - 4.0;
        let cut = end + 0.25 * width;
        let curve = Adaptive::new(MASS, VIRTUALITY, cut, DISTANCE).unwrap();
        assert_eq!(curve.curve_func(1.0).unwrap().re, end);
        assert_abs_diff_eq!(curve.curve_func(2.0).unwrap().re, cut, epsilon = 1e-12);

        let a = curve.derivative_func(1.0 - 1e-9).unwrap();
        let b = curve.derivative_func(1.0 + 1e-9).unwrap();
        assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-5);
        assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-5);

        let h = 1e-6;
        let mut previous = end;
        for i in 1..20 {
            let x = 1.0 + i as f64 * 0.05;
            let re = curve.curve_func(x).unwrap().re;
            assert!(re > previous);
            previous = re;
            let (right, left) = (curve.curve_func(x + h), curve.curve_func(x - h));
            let numeric = (right.unwrap().re - left.unwrap().re) / (2.0 * h);
            let exact = curve.derivative_func(x).unwrap().re;
            assert!((numeric - exact).abs() < 1e-4 * (1.0 + exact.abs()), "{x}");
        }
    }

    #[test]
    fn hits_the_real_tail() {
        let curve = curve();
        assert_eq!(curve.hits(Complex64::from(60.0)), Some((1.0, 2.0)));
        assert_eq!(curve.hits(Complex64::from(4.0)), Some((0.0, 1.0)));
        assert_eq!(curve.hits(Complex64::from(10.0)), None);
        assert_eq!(curve.hits(Complex64::new(60.0, 1.0)), None);
        let on_dip = curve.curve_func(0.5).unwrap();
        assert_eq!(curve.hits(on_dip), Some((0.0, 1.0)));
    }

    #[test]
    fn spacelike_is_real() {
        let curve = Adaptive::new(MASS, -10.0, CUT, DISTANCE).unwrap();
        assert!(!curve.is_deformed());
        assert_eq!(curve.boundaries(), vec![0.0, 1.0]);
        assert_eq!(curve.derivative_func(0.3).unwrap(), Complex64::from(CUT - 4.0));
        assert_eq!(curve.hits(Complex64::from(10.0)), Some((0.0, 1.0)));
        assert!(!curve.encloses(Complex64::new(10.0, -1.0)));
    }

    #[test]
    fn invalid_arguments() {
        assert!(Adaptive::new(MASS, VIRTUALITY, 30.0, DISTANCE).is_err());
        assert!(Adaptive::new(MASS, VIRTUALITY, CUT, 0.0).is_err());
        assert!(Adaptive::new(MASS, VIRTUALITY, f64::INFINITY, DISTANCE).is_err());
    }
}
