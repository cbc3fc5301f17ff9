#![warn(clippy::all, rust_2018_idioms)]

pub mod amplitude;
pub mod cauchy;
pub mod contour;
mod curved_omnes;
mod error;
pub mod grid;
pub mod integration;
pub mod omnes;
pub mod persist;
pub mod phase_space;
pub mod pole;
pub mod root;
pub mod singularity;

pub use amplitude::{Amplitude, Phase};
pub use contour::{Curve, CurveType};
pub use curved_omnes::CurvedOmnes;
pub use error::{Error, Result};
pub use grid::Grid;
pub use integration::{IntegrationRoutine, Integrator, Settings};
pub use omnes::Omnes;
pub use pole::PoleSearch;
