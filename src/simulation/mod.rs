//! # Ground-Source Heat Pump Thermal Model
//!
//! Physical models for a vertical borehole heat exchanger and the heat pump
//! it feeds.
//!
//! ## Components
//!
//! - **Building load**: periodic annual heating demand profile
//! - **Ground load**: building load to ground heat exchange through the COP
//! - **Line source**: transient ground temperature from the load history
//! - **Outlet**: fluid temperature through the borehole resistances
//! - **COP**: heat pump performance against source water temperature
//! - **Borehole**: the time-stepped feedback loop tying them together
//!
//! ## Usage
//!
//! ```rust,no_run
//! use renewable_sizing::domain::*;
//! use renewable_sizing::simulation::*;
//!
//! let geometry = BoreholeGeometry::default();
//! let thermal = ThermalProperties::derive(
//!     &geometry,
//!     &MaterialProperties::reference_soil(),
//!     &MaterialProperties::reference_grout(),
//!     &PipeProperties::default(),
//!     &FluidProperties::default(),
//!     &ResistanceOverrides::default(),
//! )?;
//! let simulator = SingleBoreholeSimulator::new(geometry, thermal, CopModel::default())?;
//! let series = simulator.run(
//!     &SimulationParameters::default(),
//!     &QuadraticAnnualLoad::default(),
//!     &RunControl::unbounded(),
//! )?;
//! println!("{} steps", series.len());
//! # Ok::<(), renewable_sizing::SizingError>(())
//! ```

pub mod borehole;
pub mod building_load;
pub mod control;
pub mod cop;
pub mod ground_load;
pub mod line_source;
pub mod outlet;

pub use borehole::{SimulationParameters, SingleBoreholeSimulator};
pub use building_load::{BuildingLoadModel, ConstantLoad, QuadraticAnnualLoad, SECONDS_IN_YEAR};
pub use control::RunControl;
pub use cop::{CopLimit, CopModel};
pub use ground_load::{electrical_power_w, ground_load_w, OperatingMode};
pub use line_source::LineSourceKernel;
pub use outlet::outlet_temperature_k;
