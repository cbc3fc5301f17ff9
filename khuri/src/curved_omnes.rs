//! Omnes functions with a deformed integration contour.
//!
//! Deforming the contour from the real axis into the lower half plane drags
//! the cut along. Between the real axis and the contour the function then
//! takes the values of the straight Omnes function continued onto its second
//! sheet.

use num::complex::Complex64;
use rayon::prelude::*;

use crate::amplitude::{Amplitude, Phase};
use crate::contour::Curve;
use crate::error::{Error, Result};
use crate::omnes::{second_sheet, Omnes};

/// Knots a bare piecewise curve needs to describe a detour below the real axis.
const ENCLOSING_KNOTS: usize = 4;

/// Allowed mismatch between the start of the curve and the threshold, in
/// units of the threshold.
const START_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CurvedOmnes<P, A> {
    omnes: Omnes<P>,
    amplitude: A,
    curve: Curve,
}

impl<P: Phase, A: Amplitude> CurvedOmnes<P, A> {
    /// `amplitude` is the partial wave on the first sheet whose phase
    /// defines `omnes`.
    pub fn new(omnes: Omnes<P>, amplitude: A, curve: Curve) -> Result<Self> {
        if let Curve::Piecewise(_) = curve {
            curve.first_points(ENCLOSING_KNOTS)?;
        }
        let start = curve.curve_func(curve.lower())?;
        let threshold = omnes.threshold();
        if (start - threshold).norm() > START_TOLERANCE * threshold {
            return Err(Error::InvalidCurve(format!(
                "curve starts at {start} instead of the threshold {threshold}"
            )));
        }
        Ok(Self {
            omnes,
            amplitude,
            curve,
        })
    }

    pub fn evaluate(&self, s: impl Into<Complex64>) -> Result<Complex64> {
        let s = s.into();
        if self.curve.encloses(s) {
            second_sheet(&self.omnes, &self.amplitude, s)
        } else {
            self.omnes.evaluate(s)
        }
    }

    pub fn evaluate_many(&self, s: &[Complex64]) -> Result<Vec<Complex64>>
    where
        P: Sync,
        A: Sync,
    {
        s.par_iter().map(|&s| self.evaluate(s)).collect()
    }
}

impl<P, A> CurvedOmnes<P, A> {
    /// The Omnes function along the real axis.
    pub fn original(&self) -> &Omnes<P> {
        &self.omnes
    }

    pub fn amplitude(&self) -> &A {
        &self.amplitude
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }
}
