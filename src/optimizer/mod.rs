//! # Borehole Array Optimizer
//!
//! Sizes an array of identical boreholes: an analytical count estimate from
//! the design peak load, followed by a one-year simulation at that count to
//! locate the critical radius. The radial ground field is advanced by a
//! [`GroundFieldSolver`] chosen with [`FieldMethod`].

pub mod analytical;
pub mod array;
pub mod estimate;
pub mod field;
pub mod finite_difference;
pub mod sweep;
pub mod types;

pub use analytical::AnalyticalField;
pub use array::ArrayConfigOptimizer;
pub use estimate::estimate_borehole_count;
pub use field::{FieldStep, GroundFieldSolver, RadialTemperatureField};
pub use finite_difference::{FiniteDifferenceField, FOURIER_STABILITY_LIMIT};
pub use sweep::{DepthRange, LayeredSoilProfile, ParameterSweep, SoilLayer, SweepParameters, SweepPoint, SweepRow};
pub use types::*;
