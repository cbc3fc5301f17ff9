mod common;

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use khuri::omnes::{second_sheet, Options};
use khuri::{Amplitude, Curve, CurvedOmnes, IntegrationRoutine, Omnes, Phase};
use num::complex::Complex64;

use common::{assert_close, threshold, BreitWigner, PhaseOf, PION_MASS};

type BreitWignerOmnes = Omnes<PhaseOf<BreitWigner>>;

fn phase() -> PhaseOf<BreitWigner> {
    PhaseOf(BreitWigner::rho())
}

fn all_omnes() -> Vec<BreitWignerOmnes> {
    let mut functions = vec![];
    for (routine, cut) in [
        (IntegrationRoutine::Cquad, 1e10),
        (IntegrationRoutine::Qag, 5e3),
    ] {
        let options = Options::with_routine(routine);
        functions.push(Omnes::with_cut(phase(), threshold(), PI, cut, options).unwrap());
        functions.push(Omnes::new(phase(), threshold(), options).unwrap());
    }
    functions
}

#[test]
fn omnes_at_zero() {
    for omnes in all_omnes() {
        let value = omnes.evaluate(0.0).unwrap();
        assert_abs_diff_eq!(value.re, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(value.im, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn omnes_phase() {
    let phase = phase();
    for omnes in all_omnes() {
        for i in 1..20 {
            let s = threshold() + (0.9 - threshold()) * i as f64 / 19.0;
            let value = omnes.evaluate(s).unwrap();
            assert_abs_diff_eq!(value.arg(), phase.phase(s), epsilon = 1e-12);
        }
    }
}

#[test]
fn schwarz_reflection() {
    for omnes in all_omnes() {
        for i in 0..20 {
            let s = Complex64::new(0.76 * 0.76, -1e4 + 2e4 * i as f64 / 19.0);
            let a = omnes.evaluate(s).unwrap();
            let b = omnes.evaluate(s.conj()).unwrap().conj();
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-14);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-14);
        }
    }
}

#[test]
fn batch_matches_pointwise() {
    let functions = all_omnes();
    let omnes = &functions[0];
    let s: Vec<_> = (0..12)
        .map(|i| Complex64::new(-0.5 + 0.1 * i as f64, 0.05 - 0.01 * i as f64))
        .collect();
    let values = omnes.evaluate_many(&s).unwrap();
    for (s, value) in s.iter().zip(&values) {
        assert_eq!(*value, omnes.evaluate(*s).unwrap());
    }
}

fn curved() -> CurvedOmnes<PhaseOf<BreitWigner>, BreitWigner> {
    let omnes = Omnes::with_cut(phase(), threshold(), PI, 1e3, Options::default()).unwrap();
    let curve = Curve::vector_decay(PION_MASS, 0.6, 10.0).unwrap();
    CurvedOmnes::new(omnes, BreitWigner::rho(), curve).unwrap()
}

#[test]
fn curved_omnes() {
    let curved = curved();
    let omnes = curved.original();
    assert_eq!(curved.evaluate(0.0).unwrap(), Complex64::new(1.0, 0.0));

    for s in [
        Complex64::new(0.3, 0.05),
        Complex64::new(0.3, -0.5),
        Complex64::new(2.0, -0.05),
        Complex64::from(-1.0),
    ] {
        assert_eq!(curved.evaluate(s).unwrap(), omnes.evaluate(s).unwrap());
    }

    let s = Complex64::new(0.3, -0.05);
    let expected = second_sheet(omnes, &BreitWigner::rho(), s).unwrap();
    assert_eq!(curved.evaluate(s).unwrap(), expected);
}

#[test]
fn curved_omnes_is_continuous_across_the_cut() {
    let curved = curved();
    let amplitude = BreitWigner::rho();
    for s in [0.1, 0.3, 0.5] {
        let below = curved.evaluate(Complex64::new(s, -1e-12)).unwrap();
        let above = curved.evaluate(s).unwrap();
        assert_close(below, above, 1e-8);
        // the value above the cut carries the phase of the partial wave
        assert_abs_diff_eq!(
            above.arg(),
            amplitude.amplitude(Complex64::from(s)).arg(),
            epsilon = 1e-12
        );
    }
}
