//! Poles and couplings of partial waves for the scattering of equal mass
//! particles.
//!
//! A pole on the second sheet is a root of `D(s) = 1 + 2i rho(s) f(s)`, where
//! `f` is the partial wave on the first sheet. Besides the resonance `D`
//! often has a root at threshold, which is no pole since the numerator of
//! the partial wave vanishes there as well. Roots close to threshold are
//! reported with a warning and left to the caller to sort out.

use std::f64::consts::PI;

use num::complex::Complex64;

use crate::amplitude::{unitarity_factor, Amplitude};
use crate::error::{Error, Result};
use crate::root;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoleSearch {
    /// Largest `|D|` accepted at a root.
    pub tolerance: f64,
    /// Radius of the disk around threshold, in units of the threshold, in
    /// which roots are suspicious.
    pub threshold_radius: f64,
    /// Step of the central difference for `D'`.
    pub derivative_step: f64,
    pub solver: root::Options,
}

impl Default for PoleSearch {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            threshold_radius: 1.0,
            derivative_step: 1e-3,
            solver: root::Options::default(),
        }
    }
}

/// Mirror `z` into the lower half plane.
pub fn lower(z: Complex64) -> Complex64 {
    Complex64::new(z.re, -z.im.abs())
}

/// Whether any of `poles` lies within `radius` of the threshold `4 mass²`,
/// measured in units of the threshold.
pub fn near_threshold(poles: &[Complex64], mass: f64, radius: f64) -> bool {
    let threshold = 4.0 * mass * mass;
    poles
        .iter()
        .any(|&pole| (pole - threshold).norm() / threshold < radius)
}

impl PoleSearch {
    /// The pole on the second sheet closest to `guess`, given the partial wave
    /// on the first sheet.
    pub fn pole<A: Amplitude>(
        &self,
        amplitude: &A,
        mass: f64,
        guess: Complex64,
    ) -> Result<Complex64> {
        let denominator = |s: Complex64| unitarity_factor(mass, s, amplitude.amplitude(s));
        let solution = root::levenberg_marquardt(
            |x| {
                let value = denominator(Complex64::new(x[0], x[1]));
                [value.re, value.im]
            },
            [guess.re, guess.im],
            &self.solver,
        );
        let location = Complex64::new(solution.x[0], solution.x[1]);
        let residual = denominator(location).norm();
        log::debug!(
            "Root search from {guess} ended at {location} after {} evaluations, |D| = {residual:e}",
            solution.evaluations
        );
        // the solver may report success at a point that is no root
        if !solution.success || !(residual <= self.tolerance) {
            return Err(Error::PoleNotFound {
                guess,
                location,
                residual,
            });
        }

        let pole = lower(location);
        if near_threshold(&[pole], mass, self.threshold_radius) {
            log::warn!(
                "The pole at {pole} is close to threshold {}, it might be artificial",
                4.0 * mass * mass
            );
        }
        Ok(pole)
    }

    /// The squared coupling of a P-wave resonance at `pole`. With
    /// `compute_pole` the pole is searched for first, using `pole` as the guess.
    pub fn coupling<A: Amplitude>(
        &self,
        amplitude: &A,
        mass: f64,
        pole: Complex64,
        compute_pole: bool,
    ) -> Result<Complex64> {
        let pole = if compute_pole {
            self.pole(amplitude, mass, pole)?
        } else {
            pole
        };
        let denominator = |s: Complex64| unitarity_factor(mass, s, amplitude.amplitude(s));
        let h = self.derivative_step;
        let derivative = (denominator(pole + h) - denominator(pole - h)) / (2.0 * h);
        let residue = amplitude.amplitude(pole) / derivative;
        let threshold = 4.0 * mass * mass;
        Ok(lower(-48.0 * PI / (pole - threshold) * residue))
    }

    pub fn pole_and_coupling<A: Amplitude>(
        &self,
        amplitude: &A,
        mass: f64,
        guess: Complex64,
    ) -> Result<(Complex64, Complex64)> {
        let pole = self.pole(amplitude, mass, guess)?;
        let coupling = self.coupling(amplitude, mass, pole, false)?;
        Ok((pole, coupling))
    }
}

pub fn pole<A: Amplitude>(amplitude: &A, mass: f64, guess: Complex64) -> Result<Complex64> {
    PoleSearch::default().pole(amplitude, mass, guess)
}

pub fn coupling<A: Amplitude>(
    amplitude: &A,
    mass: f64,
    pole: Complex64,
    compute_pole: bool,
) -> Result<Complex64> {
    PoleSearch::default().coupling(amplitude, mass, pole, compute_pole)
}

pub fn pole_and_coupling<A: Amplitude>(
    amplitude: &A,
    mass: f64,
    guess: Complex64,
) -> Result<(Complex64, Complex64)> {
    PoleSearch::default().pole_and_coupling(amplitude, mass, guess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase_space::rho;
    use approx::assert_relative_eq;

    const MASS: f64 = 1.0;

    /// Elastic partial wave with a narrow resonance near `s = 30`.
    fn partial_wave(s: Complex64) -> Complex64 {
        let width = 0.05 * (s - 4.0 * MASS * MASS);
        -width / (s - 30.0 + Complex64::i() * width * rho(MASS, s))
    }

    #[test]
    fn mirror() {
        assert_eq!(lower(Complex64::new(1.0, 2.0)), Complex64::new(1.0, -2.0));
        assert_eq!(lower(Complex64::new(1.0, -2.0)), Complex64::new(1.0, -2.0));
    }

    #[test]
    fn close_to_threshold() {
        let poles = [Complex64::new(30.0, -1.0), Complex64::new(5.0, -1.0)];
        assert!(near_threshold(&poles, MASS, 1.0));
        assert!(!near_threshold(&poles[..1], MASS, 1.0));
        assert!(near_threshold(&poles[..1], MASS, 10.0));
        assert!(!near_threshold(&[], MASS, 10.0));
    }

    #[test]
    fn resonance() {
        let search = PoleSearch::default();
        let guess = Complex64::new(30.0, -1.0);
        let pole = search.pole(&partial_wave, MASS, guess).unwrap();
        assert!(pole.im < 0.0);
        assert!((pole - guess).norm() < 2.0);
        let d = unitarity_factor(MASS, pole, partial_wave(pole));
        assert!(d.norm() <= 1e-10);

        // started in the upper half plane the conjugate root is found and mirrored
        let mirrored = search.pole(&partial_wave, MASS, guess.conj()).unwrap();
        assert_relative_eq!(mirrored.re, pole.re, max_relative = 1e-8);
        assert_relative_eq!(mirrored.im, pole.im, max_relative = 1e-8);

        let (same, coupling) = search.pole_and_coupling(&partial_wave, MASS, guess).unwrap();
        assert_eq!(same, pole);
        assert!(coupling.im <= 0.0);
        let again = search.coupling(&partial_wave, MASS, guess, true).unwrap();
        assert_relative_eq!(again.re, coupling.re, max_relative = 1e-6);
        assert_relative_eq!(again.im, coupling.im, max_relative = 1e-6);
    }

    #[test]
    fn no_pole() {
        let zero = |_: Complex64| Complex64::new(0.0, 0.0);
        let result = pole(&zero, MASS, Complex64::new(30.0, -1.0));
        assert!(matches!(result, Err(Error::PoleNotFound { .. })));
        assert!(coupling(&zero, MASS, Complex64::new(30.0, -1.0), true).is_err());
    }
}
