//! Data model and reader for S20RTS-family mantle tomography.
//!
//! Models such as S20RTS, S40RTS and SP12RTS expand shear- or
//! compressional-velocity perturbations in spherical harmonics laterally and
//! cubic splines radially. Their coefficients are distributed as `.sph`
//! text files, which [`CoefficientModel`] loads into a dense
//! `[knot, component, degree, order]` array.
//!
//! ```no_run
//! use rts_sph::{CoefficientModel, Component};
//!
//! let model = CoefficientModel::from_sph_file("S20RTS.sph", None)?;
//! let c00 = model.coefficient(0, Component::Real, 0, 0);
//! # Ok::<(), rts_sph::SphError>(())
//! ```

pub mod config;
pub mod data;
pub mod summary;

pub use config::ModelConfig;
pub use data::error::{Result, SphError};
pub use data::loader::{ParsedSph, SphHeader, SphParser};
pub use data::model::{
    CoefficientModel, Component, DEFAULT_INNER_RADIUS, DEFAULT_KNOTS, DEFAULT_OUTER_RADIUS,
};
pub use summary::ModelSummary;
