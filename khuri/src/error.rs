use num::complex::Complex64;

use crate::integration::IntegrationError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{what} = {value} is outside of the domain {domain}")]
    Domain {
        what: &'static str,
        value: f64,
        domain: String,
    },
    #[error("unknown integration routine '{0}', expected 'cquad' or 'qag'")]
    UnknownRoutine(String),
    #[error("unknown curve type '{0}', expected 'real', 'vector_decay' or 'adaptive'")]
    UnknownCurve(String),
    #[error("invalid curve: {0}")]
    InvalidCurve(String),
    #[error("no pole found near {guess} (|D| = {residual:e} at {location})")]
    PoleNotFound {
        guess: Complex64,
        location: Complex64,
        residual: f64,
    },
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error("could not save state: {0}")]
    Encode(String),
    #[error("could not restore state: {0}")]
    Decode(String),
}

impl Error {
    pub(crate) fn domain(what: &'static str, value: f64, domain: impl Into<String>) -> Self {
        Self::Domain {
            what,
            value,
            domain: domain.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
