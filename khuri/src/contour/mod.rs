//! Integration contours in the complex `s`-plane.

use std::fmt;
use std::str::FromStr;

use num::complex::Complex64;

use crate::error::{Error, Result};

mod adaptive;
mod piecewise;

pub use adaptive::Adaptive;
pub use piecewise::{in_between, Para, Piecewise};

/// Upper end of the region in which `t` is complex for the scattering of a
/// particle of squared mass `virtuality` off a particle of mass `mass`.
pub fn s_greater(mass: f64, virtuality: f64) -> Result<f64> {
    if !(virtuality >= 0.0) {
        return Err(Error::domain("virtuality", virtuality, "[0, ∞)"));
    }
    Ok((virtuality.sqrt() + mass).powi(2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CurveType {
    Real,
    VectorDecay,
    Adaptive,
}

impl FromStr for CurveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "real" => Ok(Self::Real),
            "vector_decay" => Ok(Self::VectorDecay),
            "adaptive" => Ok(Self::Adaptive),
            _ => Err(Error::UnknownCurve(s.to_owned())),
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::VectorDecay => write!(f, "vector_decay"),
            Self::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// Minimal distance of the adaptive contour from the singularities, in units
/// of the squared mass.
pub const ADAPTIVE_DISTANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Curve {
    /// Straight line along the real axis.
    Real(Piecewise),
    /// Rectangular detour below the singularities of a vector decay.
    VectorDecay(Piecewise),
    Adaptive(Adaptive),
    /// Any other piecewise curve.
    Piecewise(Piecewise),
}

impl Curve {
    /// The real segment `[lower, upper]`.
    pub fn real(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(Error::InvalidCurve(format!(
                "[{lower}, {upper}] is not a finite interval"
            )));
        }
        Ok(Self::Real(Piecewise::linear(vec![lower.into(), upper.into()])?))
    }

    pub fn vector_decay(mass: f64, virtuality: f64, cut: f64) -> Result<Self> {
        let m2 = mass * mass;
        let a = virtuality - 2.5 * m2;
        let b = -7.0 * m2;
        let upper = s_greater(mass, virtuality)?;
        if !(cut.is_finite() && cut > upper) {
            return Err(Error::InvalidCurve(format!(
                "cut {cut} needs to be finite and above {upper}"
            )));
        }
        let knots = vec![
            Complex64::from(4.0 * m2),
            Complex64::new(5.0 * m2, b),
            Complex64::new(a, b),
            Complex64::from(a),
            Complex64::from(upper),
            Complex64::from(cut),
        ];
        Ok(Self::VectorDecay(Piecewise::linear(knots)?))
    }

    pub fn adaptive(mass: f64, virtuality: f64, cut: f64, minimal_distance: f64) -> Result<Self> {
        Ok(Self::Adaptive(Adaptive::new(
            mass,
            virtuality,
            cut,
            minimal_distance,
        )?))
    }

    /// Curve of the given type from threshold `4 mass²` to `cut`.
    pub fn from_type(typ: CurveType, mass: f64, virtuality: f64, cut: f64) -> Result<Self> {
        match typ {
            CurveType::Real => Self::real(4.0 * mass * mass, cut),
            CurveType::VectorDecay => Self::vector_decay(mass, virtuality, cut),
            CurveType::Adaptive => {
                Self::adaptive(mass, virtuality, cut, ADAPTIVE_DISTANCE * mass * mass)
            }
        }
    }

    pub fn curve_type(&self) -> Option<CurveType> {
        match self {
            Self::Real(_) => Some(CurveType::Real),
            Self::VectorDecay(_) => Some(CurveType::VectorDecay),
            Self::Adaptive(_) => Some(CurveType::Adaptive),
            Self::Piecewise(_) => None,
        }
    }

    pub fn lower(&self) -> f64 {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.lower(),
            Self::Adaptive(a) => a.lower(),
        }
    }

    pub fn upper(&self) -> f64 {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.upper(),
            Self::Adaptive(a) => a.upper(),
        }
    }

    /// Parameter values of the start, the joints and the end of the curve.
    pub fn boundaries(&self) -> Vec<f64> {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.boundaries(),
            Self::Adaptive(a) => a.boundaries(),
        }
    }

    pub fn curve_func(&self, x: f64) -> Result<Complex64> {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.curve_func(x),
            Self::Adaptive(a) => a.curve_func(x),
        }
    }

    pub fn derivative_func(&self, x: f64) -> Result<Complex64> {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.derivative_func(x),
            Self::Adaptive(a) => a.derivative_func(x),
        }
    }

    /// Parameter bounds of the segment that `s` lies on, if any.
    pub fn hits(&self, s: Complex64) -> Option<(f64, f64)> {
        match self {
            Self::Real(p) | Self::VectorDecay(p) | Self::Piecewise(p) => p.hits(s),
            Self::Adaptive(a) => a.hits(s),
        }
    }

    /// Whether `s` lies strictly between the curve and the real axis.
    pub fn encloses(&self, s: Complex64) -> bool {
        match self {
            Self::Real(_) => false,
            Self::VectorDecay(p) | Self::Piecewise(p) => p.encloses(s),
            Self::Adaptive(a) => a.encloses(s),
        }
    }

    /// The points at the first `size` boundaries.
    pub fn first_points(&self, size: usize) -> Result<Vec<Complex64>> {
        let boundaries = self.boundaries();
        if boundaries.len() < size {
            return Err(Error::InvalidCurve(format!(
                "tried to retrieve {size} points, but the curve has only {} boundary points",
                boundaries.len()
            )));
        }
        boundaries[..size]
            .iter()
            .map(|&x| self.curve_func(x))
            .collect()
    }

    /// Parameter of the real point `s` on the segment `[lower, upper]`, which
    /// needs to run along the real axis in increasing direction.
    pub fn locate(&self, s: f64, lower: f64, upper: f64) -> Result<f64> {
        let (mut a, mut b) = (lower, upper);
        let start = self.curve_func(a)?.re;
        let end = self.curve_func(b)?.re;
        if !(start <= s && s <= end) {
            return Err(Error::domain("s", s, format!("[{start}, {end}]")));
        }
        for _ in 0..200 {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            if self.curve_func(mid)?.re < s {
                a = mid;
            } else {
                b = mid;
            }
        }
        Ok(0.5 * (a + b))
    }
}

impl From<Piecewise> for Curve {
    fn from(piecewise: Piecewise) -> Self {
        Self::Piecewise(piecewise)
    }
}

impl From<Adaptive> for Curve {
    fn from(adaptive: Adaptive) -> Self {
        Self::Adaptive(adaptive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_curve_types() {
        for typ in [CurveType::Real, CurveType::VectorDecay, CurveType::Adaptive] {
            assert_eq!(typ.to_string().parse::<CurveType>().unwrap(), typ);
        }
        assert_eq!(
            "circle".parse::<CurveType>(),
            Err(Error::UnknownCurve("circle".to_owned()))
        );
    }

    #[test]
    fn vector_decay_knots() {
        let curve = Curve::vector_decay(1.0, 30.0, 100.0).unwrap();
        assert_eq!(curve.boundaries(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let points = curve.first_points(6).unwrap();
        assert_eq!(points[0], Complex64::from(4.0));
        assert_eq!(points[1], Complex64::new(5.0, -7.0));
        assert_eq!(points[2], Complex64::new(27.5, -7.0));
        assert_eq!(points[3], Complex64::from(27.5));
        assert_abs_diff_eq!(points[4].re, (30.0_f64.sqrt() + 1.0).powi(2), epsilon = 1e-12);
        assert_eq!(points[5], Complex64::from(100.0));
        assert!(curve.first_points(7).is_err());

        assert!(curve.encloses(Complex64::new(10.0, -3.0)));
        assert!(!curve.encloses(Complex64::new(10.0, 3.0)));
        assert_eq!(curve.hits(Complex64::from(50.0)), Some((4.0, 5.0)));
        assert_eq!(curve.hits(Complex64::new(15.0, -7.0)), Some((1.0, 2.0)));
    }

    #[test]
    fn invalid_curves() {
        assert!(matches!(
            Curve::vector_decay(1.0, -1.0, 100.0),
            Err(Error::Domain { .. })
        ));
        assert!(Curve::vector_decay(1.0, 30.0, 40.0).is_err());
        assert!(Curve::real(4.0, 4.0).is_err());
        assert!(Curve::real(4.0, f64::INFINITY).is_err());
    }

    #[test]
    fn from_type() {
        for typ in [CurveType::Real, CurveType::VectorDecay, CurveType::Adaptive] {
            let curve = Curve::from_type(typ, 1.0, 30.0, 100.0).unwrap();
            assert_eq!(curve.curve_type(), Some(typ));
            assert_eq!(curve.curve_func(curve.lower()).unwrap(), Complex64::from(4.0));
            let end = curve.curve_func(curve.upper()).unwrap();
            assert_abs_diff_eq!(end.re, 100.0, epsilon = 1e-12);
        }
        let real = Curve::from_type(CurveType::Real, 1.0, 30.0, 100.0).unwrap();
        assert!(!real.encloses(Complex64::new(10.0, -1.0)));
    }

    #[test]
    fn locate_on_real_segments() {
        let real = Curve::real(4.0, 100.0).unwrap();
        assert_abs_diff_eq!(real.locate(52.0, 0.0, 1.0).unwrap(), 0.5, epsilon = 1e-12);
        assert!(real.locate(200.0, 0.0, 1.0).is_err());

        let adaptive = Curve::adaptive(1.0, 30.0, 100.0, 0.5).unwrap();
        let x = adaptive.locate(60.0, 1.0, 2.0).unwrap();
        assert_abs_diff_eq!(adaptive.curve_func(x).unwrap().re, 60.0, epsilon = 1e-9);
    }
}
