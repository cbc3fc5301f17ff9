//! Singularities of the Khuri-Treiman integrands.
//!
//! For a decay of a particle with squared mass `decay_mass_2` into three
//! particles with squared mass `mass_2` the boundary of the region in which the
//! angular integrals can be performed along straight lines is given by the
//! roots of a cubic in `s`, parametrised by the squared cosine of the
//! scattering angle. The three roots are labelled `0`, `1` and `2`.
//!
//! The closed-form solution degenerates at `cos² = 0` and `cos² = 1`; only the
//! open interval between them is accepted.

use num::complex::Complex64;
use num::Zero;

use crate::error::{Error, Result};

/// Cube roots of unity, indexed by branch.
const UNITY: [Complex64; 3] = [
    Complex64::new(1.0, 0.0),
    Complex64::new(-0.5, 0.866_025_403_784_438_6),
    Complex64::new(-0.5, -0.866_025_403_784_438_6),
];

/// Below this magnitude the cube root is treated as collapsed.
const DEGENERATE: f64 = 1e-20;

/// Distance of the sampled curves from the degenerate endpoints.
pub const ENDPOINT_OFFSET: f64 = 1e-3;

pub const DEFAULT_POINTS: usize = 1000;

/// Principal cube root, `exp(ln(z) / 3)`, with `0 ↦ 0`.
pub fn cube_root(z: Complex64) -> Complex64 {
    if z.is_zero() {
        return Complex64::zero();
    }
    (z.ln() / 3.0).exp()
}

/// Coefficients `[c0, c1, c2, c3]` of `c3 x³ + c2 x² + c1 x + c0`.
pub fn coefficients(cos2: f64, decay_mass_2: f64, mass_2: f64) -> [f64; 4] {
    let outer = decay_mass_2 - 5.0 * mass_2;
    let inner = cos2 * (decay_mass_2 + 3.0 * mass_2);
    let c0 = -(2.0 * cos2 * mass_2 * (decay_mass_2 - mass_2)).powi(2);
    let c1 = inner * inner - outer * outer;
    let c2 = 2.0 * (outer - inner);
    let c3 = cos2 - 1.0;
    [c0, c1, c2, c3]
}

/// Root `number` (0, 1 or 2) of the cubic with coefficients `[c0, c1, c2, c3]`.
///
/// Of the two values `(Δ1 ± √(Δ1² - 4Δ0³)) / 2` the one with the larger
/// modulus is used, so that the labelling of the roots does not jump as the
/// coefficients vary smoothly. Should its cube root vanish the other sign is
/// taken, and if both vanish the triple root is returned.
pub fn cubic_equation(coefficients: [f64; 4], number: usize) -> Result<Complex64> {
    let Some(unity) = UNITY.get(number) else {
        return Err(Error::domain("root number", number as f64, "{0, 1, 2}"));
    };
    let [c0, c1, c2, c3] = coefficients;

    let delta0 = c2 * c2 - 3.0 * c3 * c1;
    let delta1 = 2.0 * c2.powi(3) - 9.0 * c3 * c2 * c1 + 27.0 * c3 * c3 * c0;
    let sqr = Complex64::from(delta1 * delta1 - 4.0 * delta0.powi(3)).sqrt();

    let plus = (delta1 + sqr) / 2.0;
    let minus = (delta1 - sqr) / 2.0;
    let (first, second) = if minus.norm() > plus.norm() {
        (minus, plus)
    } else {
        (plus, minus)
    };

    let mut delta = cube_root(first);
    if delta.norm() < DEGENERATE {
        log::debug!("Cube root collapsed, switching sign (Δ0 = {delta0}, Δ1 = {delta1})");
        delta = cube_root(second);
    }
    if delta.norm() < DEGENERATE {
        return Ok(Complex64::from(-c2 / (3.0 * c3)));
    }

    let delta = delta * unity;
    Ok(-(c2 + delta + delta0 / delta) / (3.0 * c3))
}

/// Singularity `number` for the given squared cosine `cos2 ∈ (0, 1)`.
pub fn singularity(cos2: f64, decay_mass_2: f64, mass_2: f64, number: usize) -> Result<Complex64> {
    if !(cos2 > 0.0 && cos2 < 1.0) {
        return Err(Error::domain("cos²", cos2, "(0, 1)"));
    }
    cubic_equation(coefficients(cos2, decay_mass_2, mass_2), number)
}

/// The three singularity curves sampled at the same values of `cos²`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SingularityCurves {
    pub cos2: Vec<f64>,
    pub branches: [Vec<Complex64>; 3],
}

impl SingularityCurves {
    pub fn branch(&self, number: usize) -> Option<&[Complex64]> {
        self.branches.get(number).map(|b| &b[..])
    }

    /// All sampled points off the real axis in the lower half plane.
    pub fn lower_half_plane(&self, tolerance: f64) -> Vec<Complex64> {
        self.branches
            .iter()
            .flatten()
            .copied()
            .filter(|z| z.im < -tolerance)
            .collect()
    }
}

/// Sample all three singularity curves at `points` values of `cos²`, spread
/// uniformly over `[ε, 1 - ε]` with `ε = ENDPOINT_OFFSET`.
pub fn singularity_curves(
    decay_mass_2: f64,
    mass_2: f64,
    points: usize,
) -> Result<SingularityCurves> {
    let lower = ENDPOINT_OFFSET;
    let upper = 1.0 - ENDPOINT_OFFSET;
    let step = if points > 1 {
        (upper - lower) / (points - 1) as f64
    } else {
        0.0
    };
    let cos2 = (0..points)
        .map(|i| lower + i as f64 * step)
        .collect::<Vec<_>>();

    let mut branches: [Vec<Complex64>; 3] = Default::default();
    for (number, branch) in branches.iter_mut().enumerate() {
        *branch = cos2
            .iter()
            .map(|&c| singularity(c, decay_mass_2, mass_2, number))
            .collect::<Result<Vec<_>>>()?;
    }

    Ok(SingularityCurves { cos2, branches })
}
