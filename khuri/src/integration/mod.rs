//! Numerical integration over real intervals.

use std::fmt;
use std::str::FromStr;

use num::complex::Complex64;

use crate::error::Error;

pub mod gauss_legendre;
pub mod kronrod;

pub use gauss_legendre::GaussLegendre;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("maximum number of {intervals} subintervals reached (value {value}, error {error:e})")]
    SubdivisionLimit {
        intervals: usize,
        value: f64,
        error: f64,
    },
    #[error("integrand is not finite at {at}")]
    NonFinite { at: f64 },
    #[error("interval too small to subdivide further (value {value}, error {error:e})")]
    Roundoff { value: f64, error: f64 },
    #[error("cannot integrate over [{lower}, {upper}]")]
    InvalidInterval { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    pub absolute_precision: f64,
    pub relative_precision: f64,
    /// Maximal number of subintervals.
    pub space: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            absolute_precision: 0.0,
            relative_precision: 1e-7,
            space: 1000,
        }
    }
}

impl Settings {
    pub(crate) fn tolerance(&self, value: f64) -> f64 {
        self.absolute_precision
            .max(self.relative_precision * value.abs())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IntegrationRoutine {
    /// Doubly adaptive, tolerates integrable singularities at the endpoints.
    #[default]
    Cquad,
    /// Globally adaptive 15-point Gauss-Kronrod.
    Qag,
}

impl FromStr for IntegrationRoutine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cquad" => Ok(Self::Cquad),
            "qag" => Ok(Self::Qag),
            _ => Err(Error::UnknownRoutine(s.to_owned())),
        }
    }
}

impl fmt::Display for IntegrationRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cquad => write!(f, "cquad"),
            Self::Qag => write!(f, "qag"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexEstimate {
    pub value: Complex64,
    pub error_re: f64,
    pub error_im: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Integrator {
    pub routine: IntegrationRoutine,
    pub settings: Settings,
}

impl Integrator {
    pub fn new(routine: IntegrationRoutine, settings: Settings) -> Self {
        Self { routine, settings }
    }

    /// Integrate `f` over `[lower, upper]`. The upper limit may be `+∞`.
    pub fn integrate(
        &self,
        f: impl Fn(f64) -> f64,
        lower: f64,
        upper: f64,
    ) -> Result<Estimate, IntegrationError> {
        if lower.is_nan() || upper.is_nan() || lower.is_infinite() {
            return Err(IntegrationError::InvalidInterval { lower, upper });
        }
        if lower == upper {
            return Ok(Estimate {
                value: 0.0,
                error: 0.0,
            });
        }
        if upper < lower {
            let estimate = self.integrate(f, upper, lower)?;
            return Ok(Estimate {
                value: -estimate.value,
                ..estimate
            });
        }
        if upper == f64::INFINITY {
            // x = lower + t / (1 - t)
            let g = |t: f64| {
                let u = 1.0 - t;
                f(lower + t / u) / (u * u)
            };
            return self.finite(g, 0.0, 1.0);
        }
        self.finite(f, lower, upper)
    }

    fn finite(
        &self,
        f: impl Fn(f64) -> f64,
        lower: f64,
        upper: f64,
    ) -> Result<Estimate, IntegrationError> {
        match self.routine {
            IntegrationRoutine::Cquad => kronrod::cquad(f, lower, upper, &self.settings),
            IntegrationRoutine::Qag => kronrod::qag(f, lower, upper, &self.settings),
        }
    }

    /// Integrate a complex valued `f`, real and imaginary parts separately.
    pub fn c_integrate(
        &self,
        f: impl Fn(f64) -> Complex64,
        lower: f64,
        upper: f64,
    ) -> Result<ComplexEstimate, IntegrationError> {
        let re = self.integrate(|x| f(x).re, lower, upper)?;
        let im = self.integrate(|x| f(x).im, lower, upper)?;
        Ok(ComplexEstimate {
            value: Complex64::new(re.value, im.value),
            error_re: re.error,
            error_im: im.error,
        })
    }
}
