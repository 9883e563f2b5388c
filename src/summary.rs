use std::fmt;

use serde::Serialize;

use crate::data::model::CoefficientModel;

// ---------------------------------------------------------------------------
// ModelSummary – read-only statistics for reporting
// ---------------------------------------------------------------------------

/// Shape and magnitude overview of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub degree: usize,
    pub knot_count: usize,
    pub knots: Vec<f64>,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub shape: [usize; 4],
    /// Non-zero entries across the whole array.
    pub nonzero: usize,
    /// Largest |coefficient| at each knot, outer to inner.
    pub max_abs_per_knot: Vec<f64>,
}

impl ModelSummary {
    pub fn from_model(model: &CoefficientModel) -> Self {
        let coefs = model.coefficients();
        let max_abs_per_knot = coefs
            .outer_iter()
            .map(|knot| knot.iter().fold(0.0_f64, |acc, c| acc.max(c.abs())))
            .collect();

        ModelSummary {
            degree: model.degree(),
            knot_count: model.knots().len(),
            knots: model.knots().to_vec(),
            inner_radius: model.inner_radius(),
            outer_radius: model.outer_radius(),
            shape: model.shape(),
            nonzero: coefs.iter().filter(|&&c| c != 0.0).count(),
            max_abs_per_knot,
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "degree:        {}", self.degree)?;
        writeln!(f, "knots:         {}", self.knot_count)?;
        writeln!(
            f,
            "radii (km):    {:.3} – {:.3}",
            self.inner_radius, self.outer_radius
        )?;
        writeln!(f, "array shape:   {:?}", self.shape)?;
        writeln!(f, "non-zero:      {}", self.nonzero)?;
        writeln!(f, "knot      max |c|")?;
        for (knot, max_abs) in self.knots.iter().zip(&self.max_abs_per_knot) {
            writeln!(f, "{knot:>9.5} {max_abs:.6e}")?;
        }
        Ok(())
    }
}
