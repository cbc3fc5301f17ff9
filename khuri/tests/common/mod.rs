#![allow(dead_code)]

use khuri::phase_space::rho;
use khuri::{Amplitude, Phase};
use num::complex::Complex64;

pub const PION_MASS: f64 = 0.14;

pub fn threshold() -> f64 {
    4.0 * PION_MASS * PION_MASS
}

/// P-wave Breit-Wigner partial wave with an energy dependent width. The
/// coupling is fixed by elastic unitarity, `Im f = rho |f|²`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BreitWigner {
    pub mass: f64,
    pub width: f64,
    pub pion_mass: f64,
}

impl BreitWigner {
    pub fn rho() -> Self {
        Self {
            mass: 0.77,
            width: 0.15,
            pion_mass: PION_MASS,
        }
    }

    fn momentum(&self, s: Complex64) -> Complex64 {
        (s / 4.0 - self.pion_mass * self.pion_mass).sqrt()
    }

    fn width_at(&self, s: Complex64) -> Complex64 {
        let ratio = self.momentum(s) / self.momentum(Complex64::from(self.mass * self.mass));
        self.width * ratio.powi(3) * self.mass / s.sqrt()
    }
}

impl Amplitude for BreitWigner {
    fn amplitude(&self, s: Complex64) -> Complex64 {
        let width = self.width_at(s) * self.mass;
        -width / (s - self.mass * self.mass + Complex64::i() * width * rho(self.pion_mass, s))
    }
}

/// The phase of a partial wave along its cut.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseOf<A>(pub A);

impl<A: Amplitude> Phase for PhaseOf<A> {
    fn phase(&self, s: f64) -> f64 {
        if s <= threshold() {
            return 0.0;
        }
        self.0.amplitude(Complex64::from(s)).arg()
    }
}

pub fn assert_close(a: Complex64, b: Complex64, relative: f64) {
    assert!(
        (a - b).norm() <= relative * b.norm(),
        "{a} and {b} differ by more than {relative:e}"
    );
}
