//! The Omnes function of an arbitrary phase.
//!
//! ```text
//! Ω(s) = exp(s/π ∫ δ(z) / (z (z - s)) dz)
//! ```
//!
//! with the integral running from `threshold` to infinity. Optionally the
//! phase is set equal to a constant above a cut, in which case the part of
//! the integral above the cut is done analytically.

use std::f64::consts::PI;

use num::complex::Complex64;
use rayon::prelude::*;

use crate::amplitude::{unitarity_factor, Amplitude, Phase};
use crate::error::{Error, Result};
use crate::integration::{IntegrationRoutine, Integrator, Settings};

/// Default half width of the band around the cut in which the limit onto the
/// cut is taken.
pub const MINIMAL_DISTANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Options {
    /// Half the width of a band around the cut. For arguments in the band
    /// the Omnes function is evaluated on the cut instead.
    pub minimal_distance: f64,
    pub integrator: Integrator,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            minimal_distance: MINIMAL_DISTANCE,
            integrator: Integrator::default(),
        }
    }
}

impl Options {
    pub fn with_routine(routine: IntegrationRoutine) -> Self {
        Self {
            integrator: Integrator::new(routine, Settings::default()),
            ..Self::default()
        }
    }
}

/// The phase equals `constant` above `cut`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Asymptotic {
    pub constant: f64,
    pub cut: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Omnes<P> {
    phase: P,
    threshold: f64,
    asymptotic: Option<Asymptotic>,
    minimal_distance: f64,
    integrator: Integrator,
    derivative: f64,
}

/// `ln |1 / (1 - s / value)|`
fn log_inverse(s: f64, value: f64) -> f64 {
    -(1.0 - s / value).abs().ln()
}

impl<P: Phase> Omnes<P> {
    pub fn new(phase: P, threshold: f64, options: Options) -> Result<Self> {
        Self::build(phase, threshold, None, options)
    }

    /// The Omnes function of a phase that equals `constant` above `cut`.
    pub fn with_cut(
        phase: P,
        threshold: f64,
        constant: f64,
        cut: f64,
        options: Options,
    ) -> Result<Self> {
        Self::build(phase, threshold, Some(Asymptotic { constant, cut }), options)
    }

    fn build(
        phase: P,
        threshold: f64,
        asymptotic: Option<Asymptotic>,
        options: Options,
    ) -> Result<Self> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::domain("threshold", threshold, "(0, ∞)"));
        }
        if let Some(Asymptotic { constant, cut }) = asymptotic {
            if !(cut.is_finite() && cut > threshold) {
                return Err(Error::domain("cut", cut, format!("({threshold}, ∞)")));
            }
            if !constant.is_finite() {
                return Err(Error::domain("constant", constant, "(-∞, ∞)"));
            }
        }
        let minimal_distance = options.minimal_distance;
        if !(minimal_distance.is_finite() && minimal_distance > 0.0) {
            return Err(Error::domain("minimal distance", minimal_distance, "(0, ∞)"));
        }

        let mut omnes = Self {
            phase,
            threshold,
            asymptotic,
            minimal_distance,
            integrator: options.integrator,
            derivative: 0.0,
        };
        omnes.derivative = omnes.derivative_from_phase()?;
        log::debug!(
            "Omnes function with threshold {threshold}, derivative at zero {}",
            omnes.derivative
        );
        Ok(omnes)
    }

    fn derivative_from_phase(&self) -> Result<f64> {
        let integral = self.integrator.integrate(
            |x| self.phase.phase(x) / (x * x),
            self.threshold,
            self.upper_limit(),
        )?;
        let above = self.asymptotic.map_or(0.0, |a| a.constant / a.cut);
        Ok((integral.value + above) / PI)
    }

    fn upper_limit(&self) -> f64 {
        self.asymptotic.map_or(f64::INFINITY, |a| a.cut)
    }

    pub fn evaluate(&self, s: impl Into<Complex64>) -> Result<Complex64> {
        let s = s.into();
        // Schwarz reflection
        if s.im < 0.0 {
            return Ok(self.upper(s.conj())?.conj());
        }
        self.upper(s)
    }

    /// Evaluate at all points of `s` in parallel.
    pub fn evaluate_many(&self, s: &[Complex64]) -> Result<Vec<Complex64>>
    where
        P: Sync,
    {
        s.par_iter().map(|&s| self.evaluate(s)).collect()
    }

    fn upper(&self, s: Complex64) -> Result<Complex64> {
        let distance = self.minimal_distance;
        if (s - self.threshold).norm() <= distance {
            let above = self.cut_prescription(self.threshold + distance)?;
            let below = self.ordinary_prescription((self.threshold - distance).into())?;
            return Ok((above + below) / 2.0);
        }
        if s.re >= self.threshold && s.im.abs() <= distance {
            return self.cut_prescription(s.re);
        }
        self.ordinary_prescription(s)
    }

    fn ordinary_prescription(&self, s: Complex64) -> Result<Complex64> {
        let integral = self.integrator.c_integrate(
            |z| self.phase.phase(z) / (z * (z - s)),
            self.threshold,
            self.upper_limit(),
        )?;
        let above = match self.asymptotic {
            Some(Asymptotic { constant, cut }) => constant * (1.0 - s / cut).ln(),
            None => Complex64::new(0.0, 0.0),
        };
        Ok(((s * integral.value - above) / PI).exp())
    }

    /// The limit onto the cut from above.
    fn cut_prescription(&self, s: f64) -> Result<Complex64> {
        let phase = self.phase_at(s);
        let integral = self.integrator.integrate(
            |z| {
                if z == s {
                    0.0
                } else {
                    (self.phase.phase(z) - phase) / (z * (z - s))
                }
            },
            self.threshold,
            self.upper_limit(),
        )?;
        let above = match self.asymptotic {
            Some(Asymptotic { constant, cut }) if s < cut => {
                (constant - phase) * log_inverse(s, cut)
            }
            _ => 0.0,
        };
        let exponent = s * integral.value + above + phase * log_inverse(s, self.threshold);
        let modulus = (exponent / PI).exp();
        Ok(Complex64::from_polar(modulus, phase))
    }

    /// The phase along the cut, including the constant part above `cut`.
    pub fn phase_at(&self, s: f64) -> f64 {
        match self.asymptotic {
            Some(Asymptotic { constant, cut }) if s >= cut => constant,
            _ => self.phase.phase(s),
        }
    }

    pub fn derivative_at_zero(&self) -> f64 {
        self.derivative
    }
}

impl<P> Omnes<P> {
    pub fn phase(&self) -> &P {
        &self.phase
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cut(&self) -> Option<f64> {
        self.asymptotic.map(|a| a.cut)
    }

    pub fn constant(&self) -> Option<f64> {
        self.asymptotic.map(|a| a.constant)
    }

    pub fn minimal_distance(&self) -> f64 {
        self.minimal_distance
    }

    pub fn routine(&self) -> IntegrationRoutine {
        self.integrator.routine
    }

    pub fn settings(&self) -> Settings {
        self.integrator.settings
    }
}

/// `omnes` continued through its cut onto the second sheet, where `amplitude`
/// is the partial wave on the first sheet whose phase defines `omnes`.
pub fn second_sheet<P, A>(
    omnes: &Omnes<P>,
    amplitude: &A,
    s: impl Into<Complex64>,
) -> Result<Complex64>
where
    P: Phase,
    A: Amplitude,
{
    let s = s.into();
    let mass = omnes.threshold.sqrt() / 2.0;
    let value = omnes.evaluate(s)?;
    Ok(value / unitarity_factor(mass, s, amplitude.amplitude(s)))
}
