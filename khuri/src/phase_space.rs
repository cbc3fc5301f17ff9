//! Two-body phase space factors with different cut structures.

use num::complex::Complex64;

/// Signum of the imaginary part, with the real axis counted as the upper half plane.
pub fn signum_im(z: Complex64) -> f64 {
    if z.im >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Square root with its cut along the positive real axis.
pub fn alt_sqrt(z: Complex64) -> Complex64 {
    // a negative zero imaginary part would select the lower lip of the principal cut
    let z = if z.im == 0.0 {
        Complex64::new(z.re, 0.0)
    } else {
        z
    };
    signum_im(z) * z.sqrt()
}

/// Phase space with cuts along `[4 mass², ∞)` and `(-∞, 0]`.
pub fn rho(mass: f64, s: impl Into<Complex64>) -> Complex64 {
    let s = s.into();
    alt_sqrt(1.0 - 4.0 * mass * mass / s)
}

/// Phase space with a single cut along `[0, 4 mass²]`.
pub fn sigma(mass: f64, s: impl Into<Complex64>) -> Complex64 {
    let s = s.into();
    let z = 1.0 - 4.0 * mass * mass / s;
    let z = if z.im == 0.0 {
        Complex64::new(z.re, 0.0)
    } else {
        z
    };
    z.sqrt()
}
