use std::io::BufRead;
use std::path::Path;

use log::debug;
use ndarray::Array4;

use super::error::{Result, SphError};
use super::loader::SphParser;
use crate::config::ModelConfig;

// ---------------------------------------------------------------------------
// Published defaults
// ---------------------------------------------------------------------------

/// Radial spline knots shared by S20RTS, S40RTS and SP12RTS, ordered from the
/// outer boundary (+1) to the core-mantle boundary (-1).
pub const DEFAULT_KNOTS: [f64; 21] = [
    1.00000, 0.96512, 0.92675, 0.88454, 0.83810, 0.78701, 0.73081, 0.66899, 0.60097, 0.52615,
    0.44384, 0.35329, 0.25367, 0.14409, 0.02353, -0.010909, -0.25499, -0.41550, -0.59207,
    -0.78631, -1.00000,
];

/// Core-mantle boundary radius in km.
pub const DEFAULT_INNER_RADIUS: f64 = 3480.0;

/// Near-surface reference radius in km.
pub const DEFAULT_OUTER_RADIUS: f64 = 6346.691;

// ---------------------------------------------------------------------------
// Component – real or imaginary plane of the array
// ---------------------------------------------------------------------------

/// Second axis of the coefficient array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Real = 0,
    Imaginary = 1,
}

impl Component {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Zero-filled `[knot, component, degree, order]` array.
///
/// Storage is dense: entries with `order > degree` exist but are never written.
/// Fails instead of aborting when the shape cannot be held in memory.
pub fn allocate_coefficients(knot_count: usize, degree: usize) -> Result<Array4<f64>> {
    debug!("allocating coefficients for {knot_count} knots up to degree {degree}");
    let failed = || SphError::AllocationFailed {
        knots: knot_count,
        degree,
    };

    let side = degree.checked_add(1).ok_or_else(failed)?;
    let len = side
        .checked_mul(side)
        .and_then(|plane| plane.checked_mul(2))
        .and_then(|knot| knot.checked_mul(knot_count))
        .ok_or_else(failed)?;

    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| failed())?;
    data.resize(len, 0.0);
    Array4::from_shape_vec((knot_count, 2, side, side), data).map_err(|_| failed())
}

/// Reject empty tables and knots outside the normalised radius range.
pub fn validate_knots(knots: &[f64]) -> Result<()> {
    if knots.is_empty() {
        return Err(SphError::configuration("knot table is empty"));
    }
    if let Some((i, k)) = knots
        .iter()
        .enumerate()
        .find(|(_, k)| !k.is_finite() || !(-1.0..=1.0).contains(*k))
    {
        return Err(SphError::configuration(format!(
            "knot {i} ({k}) is outside [-1, 1]"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CoefficientModel
// ---------------------------------------------------------------------------

/// Spherical-harmonic / radial-spline coefficients for one tomography model.
///
/// A value of this type always carries an allocated array whose shape is
/// `(knots.len(), 2, degree + 1, degree + 1)`; the shape never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientModel {
    knots: Vec<f64>,
    degree: usize,
    coefs: Array4<f64>,
    inner_radius: f64,
    outer_radius: f64,
}

impl CoefficientModel {
    /// Build a model from construction options.
    ///
    /// An explicit `degree` allocates immediately. A `filename` is then
    /// parsed, checking its header against that degree or, when no degree
    /// was given, taking the degree from the header. With neither there is
    /// no shape to allocate and construction fails.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let knots = match &config.knots {
            Some(knots) => knots.clone(),
            None => DEFAULT_KNOTS.to_vec(),
        };
        validate_knots(&knots)?;

        let mut shaped = config
            .degree
            .map(|degree| allocate_coefficients(knots.len(), degree).map(|c| (degree, c)))
            .transpose()?;

        if let Some(path) = &config.filename {
            let expected = shaped.as_ref().map(|(degree, _)| *degree);
            let parsed = SphParser::new(knots.len(), expected).parse_file(path)?;
            shaped = Some((parsed.degree, parsed.coefficients));
        }

        let (degree, coefs) = shaped.ok_or_else(|| {
            SphError::configuration(
                "no shape information available: supply a degree or an sph file",
            )
        })?;

        Ok(Self {
            knots,
            degree,
            coefs,
            inner_radius: config.inner_radius,
            outer_radius: config.outer_radius,
        })
    }

    /// Empty model of the given degree. `None` knots selects [`DEFAULT_KNOTS`].
    pub fn new(degree: usize, knots: Option<Vec<f64>>) -> Result<Self> {
        Self::from_config(&ModelConfig {
            degree: Some(degree),
            knots,
            ..ModelConfig::default()
        })
    }

    /// Model whose degree is taken from the header of `path`.
    pub fn from_sph_file(path: impl AsRef<Path>, knots: Option<Vec<f64>>) -> Result<Self> {
        Self::from_config(&ModelConfig {
            filename: Some(path.as_ref().to_path_buf()),
            knots,
            ..ModelConfig::default()
        })
    }

    /// Model whose degree is taken from the header of an in-memory stream.
    pub fn from_sph_stream<R: BufRead>(reader: R, knots: Option<Vec<f64>>) -> Result<Self> {
        let knots = knots.unwrap_or_else(|| DEFAULT_KNOTS.to_vec());
        validate_knots(&knots)?;
        let parsed = SphParser::new(knots.len(), None).parse(reader)?;
        Ok(Self {
            knots,
            degree: parsed.degree,
            coefs: parsed.coefficients,
            inner_radius: DEFAULT_INNER_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
        })
    }

    /// Replace the coefficients with those of another sph file of the same shape.
    pub fn read_sph_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let parsed = SphParser::new(self.knots.len(), Some(self.degree)).parse_file(path)?;
        self.coefs = parsed.coefficients;
        Ok(())
    }

    /// Stream variant of [`read_sph_file`](Self::read_sph_file). On error the
    /// current coefficients are left as they were.
    pub fn read_sph_stream<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let parsed = SphParser::new(self.knots.len(), Some(self.degree)).parse(reader)?;
        self.coefs = parsed.coefficients;
        Ok(())
    }

    pub fn with_radii(mut self, inner_radius: f64, outer_radius: f64) -> Self {
        self.inner_radius = inner_radius;
        self.outer_radius = outer_radius;
        self
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Raw `[knot, component, degree, order]` array.
    pub fn coefficients(&self) -> &Array4<f64> {
        &self.coefs
    }

    /// Single coefficient, `None` when any index is out of range.
    pub fn coefficient(
        &self,
        knot: usize,
        component: Component,
        degree: usize,
        order: usize,
    ) -> Option<f64> {
        self.coefs
            .get([knot, component.index(), degree, order])
            .copied()
    }

    pub fn shape(&self) -> [usize; 4] {
        let dim = self.coefs.dim();
        [dim.0, dim.1, dim.2, dim.3]
    }

    /// Inner model radius in km.
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    /// Outer model radius in km.
    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }
}
