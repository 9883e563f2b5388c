/// Data layer: coefficient model, sph parsing, and errors.
///
/// Architecture:
/// ```text
///   .sph text file / BufRead
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  header → reconcile shape → token groups → coefficients
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ CoefficientModel  │  knots, degree, [knot, re/im, l, m] array, radii
///   └──────────────────┘
/// ```

pub mod error;
pub mod loader;
pub mod model;
