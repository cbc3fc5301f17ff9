use num::complex::Complex64;

use crate::error::{Error, Result};

/// Distance below which a point counts as lying on a straight connection.
const ON_LINE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Para {
    Linear,
    Quadratic,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
struct Piece {
    difference: Complex64,
    start: Complex64,
    para: Para,
}

/// Curve through a sequence of knots. The parameter `x = k` corresponds to
/// knot `k`, so the curve is defined on `[0, n]` for `n + 1` knots.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Piecewise {
    knots: Vec<Complex64>,
    pieces: Vec<Piece>,
}

/// Whether `x` lies on the straight line between `a` and `b`.
pub fn in_between(x: Complex64, a: Complex64, b: Complex64) -> bool {
    let difference = (x - a).norm() + (x - b).norm() - (a - b).norm();
    difference.abs() < ON_LINE
}

impl Piecewise {
    pub fn new(knots: Vec<Complex64>, parametrisations: Vec<Para>) -> Result<Self> {
        if parametrisations.is_empty() {
            return Err(Error::InvalidCurve(
                "a piecewise curve needs at least one segment".to_owned(),
            ));
        }
        if parametrisations.len() + 1 != knots.len() {
            return Err(Error::InvalidCurve(format!(
                "{} knots need {} parametrisations, got {}",
                knots.len(),
                knots.len().saturating_sub(1),
                parametrisations.len()
            )));
        }
        let pieces = knots
            .windows(2)
            .zip(parametrisations)
            .map(|(w, para)| Piece {
                difference: w[1] - w[0],
                start: w[0],
                para,
            })
            .collect();
        Ok(Self { knots, pieces })
    }

    pub fn linear(knots: Vec<Complex64>) -> Result<Self> {
        let n = knots.len().saturating_sub(1);
        Self::new(knots, vec![Para::Linear; n])
    }

    pub fn knots(&self) -> &[Complex64] {
        &self.knots
    }

    pub fn parametrisations(&self) -> impl Iterator<Item = Para> + '_ {
        self.pieces.iter().map(|p| p.para)
    }

    pub fn lower(&self) -> f64 {
        0.0
    }

    pub fn upper(&self) -> f64 {
        self.pieces.len() as f64
    }

    pub fn boundaries(&self) -> Vec<f64> {
        (0..=self.pieces.len()).map(|k| k as f64).collect()
    }

    /// Index of the segment containing `x`; the upper end belongs to the last one.
    pub fn piece_index(&self, x: f64) -> Result<usize> {
        if !(x >= self.lower() && x <= self.upper()) {
            return Err(Error::domain(
                "curve parameter",
                x,
                format!("[{}, {}]", self.lower(), self.upper()),
            ));
        }
        let index = x as usize;
        Ok(if index == self.pieces.len() {
            index - 1
        } else {
            index
        })
    }

    pub fn curve_func(&self, x: f64) -> Result<Complex64> {
        let k = self.piece_index(x)?;
        let piece = &self.pieces[k];
        let t = x - k as f64;
        Ok(match piece.para {
            Para::Linear => piece.difference * t + piece.start,
            Para::Quadratic => piece.difference * (t * t) + piece.start,
        })
    }

    pub fn derivative_func(&self, x: f64) -> Result<Complex64> {
        let k = self.piece_index(x)?;
        let piece = &self.pieces[k];
        let t = x - k as f64;
        Ok(match piece.para {
            Para::Linear => piece.difference,
            Para::Quadratic => 2.0 * piece.difference * t,
        })
    }

    /// Parameter bounds of the first segment whose straight connection contains `s`.
    pub fn hits(&self, s: Complex64) -> Option<(f64, f64)> {
        let k = self
            .knots
            .windows(2)
            .position(|w| in_between(s, w[0], w[1]))?;
        Some((k as f64, k as f64 + 1.0))
    }

    /// Whether `s` lies inside the rectangle spanned by the first four knots
    /// and the real axis. Curves with fewer knots enclose nothing.
    pub fn encloses(&self, s: Complex64) -> bool {
        let (p0, p1, p3) = match self.knots[..] {
            [p0, p1, _, p3, ..] => (p0, p1, p3),
            _ => return false,
        };
        p0.re < s.re && s.re < p3.re && p1.im < s.im && s.im < 0.0
    }

    pub fn conj(&self) -> Self {
        Self {
            knots: self.knots.iter().map(|z| z.conj()).collect(),
            pieces: self
                .pieces
                .iter()
                .map(|p| Piece {
                    difference: p.difference.conj(),
                    start: p.start.conj(),
                    para: p.para,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const LOWER: f64 = 4.0;
    const UPPER: f64 = 100.0;

    fn real() -> Piecewise {
        Piecewise::linear(vec![LOWER.into(), UPPER.into()]).unwrap()
    }

    #[test]
    fn boundaries() {
        let curve = real();
        assert_eq!(curve.lower(), 0.0);
        assert_eq!(curve.upper(), 1.0);
        assert_eq!(curve.boundaries(), vec![0.0, 1.0]);
    }

    #[test]
    fn hits() {
        let curve = real();
        assert_eq!(curve.hits(Complex64::i()), None);
        assert_eq!(curve.hits(Complex64::from(10.0)), Some((0.0, 1.0)));
        assert_eq!(curve.hits(Complex64::from(LOWER)), Some((0.0, 1.0)));
        assert_eq!(curve.hits(Complex64::from(101.0)), None);
    }

    #[test]
    fn evaluate() {
        let curve = real();
        assert_eq!(curve.curve_func(0.0).unwrap(), Complex64::from(LOWER));
        assert_relative_eq!(curve.curve_func(0.5).unwrap().re, 0.5 * (LOWER + UPPER));
        assert_eq!(curve.curve_func(1.0).unwrap(), Complex64::from(UPPER));
        for i in 0..20 {
            let x = i as f64 / 19.0;
            assert_eq!(
                curve.derivative_func(x).unwrap(),
                Complex64::from(UPPER - LOWER)
            );
        }
        assert!(curve.curve_func(1.5).is_err());
        assert!(curve.curve_func(-1e-9).is_err());
        assert!(curve.derivative_func(f64::NAN).is_err());
    }

    #[test]
    fn quadratic_segment() {
        let knots = vec![
            Complex64::new(0.0, 0.0),
            Complex64::new(2.0, -2.0),
            Complex64::new(6.0, -2.0),
        ];
        let curve = Piecewise::new(knots, vec![Para::Linear, Para::Quadratic]).unwrap();
        assert_eq!(curve.boundaries(), vec![0.0, 1.0, 2.0]);
        assert_eq!(curve.curve_func(1.5).unwrap(), Complex64::new(3.0, -2.0));
        assert_eq!(curve.derivative_func(1.5).unwrap(), Complex64::new(4.0, 0.0));
        assert_eq!(curve.derivative_func(1.0).unwrap(), Complex64::new(0.0, 0.0));
        assert_eq!(curve.curve_func(2.0).unwrap(), Complex64::new(6.0, -2.0));
        assert_eq!(curve.hits(Complex64::new(1.0, -1.0)), Some((0.0, 1.0)));
        assert_eq!(curve.hits(Complex64::new(5.0, -2.0)), Some((1.0, 2.0)));
    }

    #[test]
    fn rectangle() {
        let knots = vec![
            Complex64::new(4.0, 0.0),
            Complex64::new(5.0, -7.0),
            Complex64::new(27.5, -7.0),
            Complex64::new(27.5, 0.0),
            Complex64::new(42.0, 0.0),
        ];
        let curve = Piecewise::linear(knots).unwrap();
        assert!(curve.encloses(Complex64::new(10.0, -1.0)));
        assert!(!curve.encloses(Complex64::new(10.0, 1.0)));
        assert!(!curve.encloses(Complex64::new(10.0, -8.0)));
        assert!(!curve.encloses(Complex64::new(30.0, -1.0)));
        assert!(!real().encloses(Complex64::new(10.0, -1.0)));
        assert!(curve.conj().knots().iter().all(|z| z.im >= 0.0));
    }

    #[test]
    fn invalid_construction() {
        assert!(Piecewise::new(vec![0.0.into(), 1.0.into()], vec![]).is_err());
        assert!(Piecewise::new(vec![0.0.into()], vec![Para::Linear]).is_err());
        assert!(Piecewise::linear(vec![]).is_err());
    }
}
