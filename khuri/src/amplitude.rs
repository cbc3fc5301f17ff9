//! Two particle into two particle partial waves of equal mass particles.
//!
//! Partial waves are built from one another by ordinary higher order
//! functions. Every function that maps `s` to a complex value is an
//! [`Amplitude`], every function that maps real `s` to a real value is a
//! [`Phase`], so closures can be passed wherever a struct would do.

use num::complex::Complex64;

use crate::phase_space::rho;

pub trait Phase {
    fn phase(&self, s: f64) -> f64;
}

impl<F> Phase for F
where
    F: Fn(f64) -> f64,
{
    fn phase(&self, s: f64) -> f64 {
        self(s)
    }
}

pub trait Amplitude {
    fn amplitude(&self, s: Complex64) -> Complex64;
}

impl<F> Amplitude for F
where
    F: Fn(Complex64) -> Complex64,
{
    fn amplitude(&self, s: Complex64) -> Complex64 {
        self(s)
    }
}

/// `1 + 2i rho f`, which vanishes at the poles of the amplitude on the second sheet.
pub(crate) fn unitarity_factor(mass: f64, s: Complex64, value: Complex64) -> Complex64 {
    1.0 + 2.0 * Complex64::i() * rho(mass, s) * value
}

/// Elastic partial wave with the given phase shift.
pub fn from_phase<P>(mass: f64, phase: P) -> impl Fn(Complex64) -> Complex64
where
    P: Fn(Complex64) -> Complex64,
{
    from_phase_inelastic(mass, phase, |_| 1.0)
}

/// Partial wave with phase shift `phase` and inelasticity `eta`.
pub fn from_phase_inelastic<P, E>(mass: f64, phase: P, eta: E) -> impl Fn(Complex64) -> Complex64
where
    P: Fn(Complex64) -> Complex64,
    E: Fn(Complex64) -> f64,
{
    move |s| {
        let numerator = eta(s) * (2.0 * Complex64::i() * phase(s)).exp() - 1.0;
        numerator / rho(mass, s) / (2.0 * Complex64::i())
    }
}

/// Elastic partial wave from the cotangent of the phase shift.
pub fn from_cot<C>(mass: f64, cot: C) -> impl Fn(Complex64) -> Complex64
where
    C: Fn(Complex64) -> Complex64,
{
    move |s| 1.0 / (cot(s) - Complex64::i()) / rho(mass, s)
}

/// Continue a partial wave from the first to the second sheet.
pub fn second_sheet<A>(mass: f64, first: A) -> impl Fn(Complex64) -> Complex64
where
    A: Amplitude,
{
    move |s| {
        let value = first.amplitude(s);
        value / unitarity_factor(mass, s, value)
    }
}

/// Continue a partial wave from the second to the first sheet.
pub fn first_sheet<A>(mass: f64, second: A) -> impl Fn(Complex64) -> Complex64
where
    A: Amplitude,
{
    move |s| {
        let value = second.amplitude(s);
        value / (1.0 - 2.0 * Complex64::i() * rho(mass, s) * value)
    }
}

/// The denominator of the partial wave on the second sheet, given the one
/// on the first.
pub fn denominator<A>(mass: f64, first: A) -> impl Fn(Complex64) -> Complex64
where
    A: Amplitude,
{
    move |s| unitarity_factor(mass, s, first.amplitude(s))
}
