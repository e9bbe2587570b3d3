//! # Single Borehole Simulation
//!
//! Steps one borehole through time with the ground / water / COP feedback loop:
//!
//! 1. Building load per borehole from the load profile
//! 2. Ground load from the current COP
//! 3. Interface temperature from the line-source response to the load history
//! 4. Outlet water temperature through the borehole resistances
//! 5. COP for the next step from the outlet temperature

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    electrical_power_w, ground_load_w, outlet_temperature_k, BuildingLoadModel, CopModel,
    LineSourceKernel, OperatingMode, RunControl, SECONDS_IN_YEAR,
};
use crate::domain::{
    BoreholeGeometry, HistoryWindow, LoadHistory, SimulationRecord, SimulationTimeSeries,
    ThermalProperties,
};
use crate::error::{ensure_positive, ensure_step_count, SizingError};

/// Per-run inputs for [`SingleBoreholeSimulator::run`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Undisturbed ground temperature (K)
    pub ground_temperature_k: f64,
    pub time_step_s: f64,
    pub duration_s: f64,
    pub mode: OperatingMode,
    pub history: HistoryWindow,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            ground_temperature_k: 288.0,
            time_step_s: 8.0 * 3600.0,
            duration_s: SECONDS_IN_YEAR,
            mode: OperatingMode::Heating,
            history: HistoryWindow::Full,
        }
    }
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive("simulation.ground_temperature_k", self.ground_temperature_k)?;
        ensure_positive("simulation.time_step_s", self.time_step_s)?;
        ensure_positive("simulation.duration_s", self.duration_s)?;
        ensure_step_count("simulation.time_step_s", self.duration_s, self.time_step_s)?;
        Ok(())
    }

    /// Index of the last step; the run records `steps() + 1` rows
    pub fn steps(&self) -> usize {
        (self.duration_s / self.time_step_s).floor() as usize
    }
}

/// One borehole of an array of identical, thermally independent boreholes
#[derive(Debug, Clone)]
pub struct SingleBoreholeSimulator {
    geometry: BoreholeGeometry,
    thermal: ThermalProperties,
    cop_model: CopModel,
}

impl SingleBoreholeSimulator {
    pub fn new(
        geometry: BoreholeGeometry,
        thermal: ThermalProperties,
        cop_model: CopModel,
    ) -> Result<Self, SizingError> {
        geometry.validate()?;
        cop_model.validate()?;
        Ok(Self {
            geometry,
            thermal,
            cop_model,
        })
    }

    pub fn geometry(&self) -> &BoreholeGeometry {
        &self.geometry
    }

    pub fn thermal(&self) -> &ThermalProperties {
        &self.thermal
    }

    /// Run the simulation. Any numeric failure aborts the whole run.
    pub fn run(
        &self,
        params: &SimulationParameters,
        load: &dyn BuildingLoadModel,
        control: &RunControl,
    ) -> Result<SimulationTimeSeries, SizingError> {
        params.validate()?;

        let n = params.steps();
        let dt = params.time_step_s;
        let t_ground = params.ground_temperature_k;
        let count = self.geometry.count as f64;
        let sign = params.mode.extraction_sign();
        let r_total = self.thermal.resistances.total_k_per_w();

        let kernel = LineSourceKernel::new(
            self.thermal.grout_conductivity_w_per_m_k,
            self.thermal.grout_diffusivity_m2_per_s,
            self.geometry.depth_m,
        )?
        .with_window(params.history);

        let mut history = LoadHistory::with_capacity(n + 1);
        let mut series = SimulationTimeSeries::with_capacity(n + 1);
        let mut cop = self
            .cop_model
            .cop(outlet_temperature_k(t_ground, 0.0, r_total))
            .map_err(|e| e.at_step(0))?;

        for i in 0..=n {
            control.check(i)?;

            let t = i as f64 * dt;
            let building_load_w = load.load_w(t) / count;
            if !building_load_w.is_finite() {
                return Err(SizingError::domain("building load", building_load_w).at_step(i));
            }

            let ground_load = sign * ground_load_w(building_load_w, cop, params.mode).map_err(|e| e.at_step(i))?;
            let electrical = electrical_power_w(building_load_w, cop).map_err(|e| e.at_step(i))?;
            history.push(-ground_load);

            let interface_temp_k = t_ground
                + kernel
                    .delta_t_k(self.geometry.radius_m, dt, i, history.as_slice())
                    .map_err(|e| e.at_step(i))?;
            let outlet_temp_k = outlet_temperature_k(interface_temp_k, ground_load, r_total);

            series.push(SimulationRecord {
                time_s: t,
                building_load_w,
                interface_temp_k,
                outlet_temp_k,
                cop,
                ground_load_w: ground_load,
                electrical_power_w: electrical,
            });

            cop = self.cop_model.cop(outlet_temp_k).map_err(|e| e.at_step(i))?;
        }

        debug!(
            steps = series.len(),
            boreholes = self.geometry.count,
            approximate_history = params.history.is_approximate(),
            "single borehole simulation complete"
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FluidProperties, MaterialProperties, PipeProperties, ResistanceOverrides};
    use crate::simulation::{ConstantLoad, CopLimit, QuadraticAnnualLoad};

    fn simulator(geometry: BoreholeGeometry, cop_model: CopModel) -> SingleBoreholeSimulator {
        let thermal = ThermalProperties::derive(
            &geometry,
            &MaterialProperties::reference_soil(),
            &MaterialProperties::reference_grout(),
            &PipeProperties::default(),
            &FluidProperties::default(),
            &ResistanceOverrides::default(),
        )
        .unwrap();
        SingleBoreholeSimulator::new(geometry, thermal, cop_model).unwrap()
    }

    fn month_at_daily_steps() -> SimulationParameters {
        SimulationParameters {
            time_step_s: 86400.0,
            duration_s: 30.0 * 86400.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_row_count_and_times() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let params = month_at_daily_steps();
        let series = sim
            .run(&params, &QuadraticAnnualLoad::default(), &RunControl::unbounded())
            .unwrap();
        assert_eq!(series.len(), 31);
        assert_eq!(series.records()[0].time_s, 0.0);
        assert_eq!(series.records()[30].time_s, 30.0 * 86400.0);
    }

    #[test]
    fn test_first_step_sees_undisturbed_ground() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let series = sim
            .run(&month_at_daily_steps(), &QuadraticAnnualLoad::default(), &RunControl::unbounded())
            .unwrap();
        let first = series.records()[0];
        assert_eq!(first.interface_temp_k, 288.0);
        // Initial COP from the undisturbed ground at zero load
        assert!((first.cop - CopModel::default().cop(288.0).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_heating_draws_ground_down() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let series = sim
            .run(&month_at_daily_steps(), &ConstantLoad::new(50_000.0), &RunControl::unbounded())
            .unwrap();
        let records = series.records();
        for pair in records.windows(2).skip(1) {
            assert!(pair[1].interface_temp_k < pair[0].interface_temp_k);
        }
        for r in records {
            assert!(r.ground_load_w > 0.0);
            assert!(r.outlet_temp_k < r.interface_temp_k);
        }
    }

    #[test]
    fn test_cooling_warms_ground() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let params = SimulationParameters {
            mode: OperatingMode::Cooling,
            ..month_at_daily_steps()
        };
        let series = sim
            .run(&params, &ConstantLoad::new(30_000.0), &RunControl::unbounded())
            .unwrap();
        let last = series.records().last().unwrap();
        assert!(last.ground_load_w < 0.0);
        assert!(last.interface_temp_k > 288.0);
        assert!(last.outlet_temp_k > last.interface_temp_k);
    }

    #[test]
    fn test_cop_follows_previous_outlet_temperature() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let series = sim
            .run(&month_at_daily_steps(), &QuadraticAnnualLoad::default(), &RunControl::unbounded())
            .unwrap();
        for pair in series.records().windows(2) {
            let expected = CopModel::default().cop(pair[0].outlet_temp_k).unwrap();
            assert!((pair[1].cop - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reject_policy_fails_with_step_index() {
        // A single borehole carrying the whole building pulls the fluid far below freezing
        let geometry = BoreholeGeometry::default().with_count(1);
        let sim = simulator(geometry, CopModel::default().with_limit(CopLimit::Reject { floor: 2.5 }));
        let err = sim
            .run(&month_at_daily_steps(), &QuadraticAnnualLoad::default(), &RunControl::unbounded())
            .unwrap_err();
        match err {
            SizingError::NumericDomain { step, quantity, .. } => {
                assert_eq!(quantity, "cop");
                assert!(step.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_parameters_rejected_before_running() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let params = SimulationParameters {
            time_step_s: 0.0,
            ..Default::default()
        };
        let err = sim
            .run(&params, &QuadraticAnnualLoad::default(), &RunControl::unbounded())
            .unwrap_err();
        assert!(matches!(err, SizingError::InvalidConfig { field: "simulation.time_step_s", .. }));
    }

    #[test]
    fn test_vanishing_time_step_rejected_before_allocating() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        for time_step_s in [1e-300, 1e-3] {
            let params = SimulationParameters {
                time_step_s,
                ..Default::default()
            };
            assert!(params.validate().is_err());
            let err = sim
                .run(&params, &QuadraticAnnualLoad::default(), &RunControl::unbounded())
                .unwrap_err();
            assert!(matches!(err, SizingError::InvalidConfig { field: "simulation.time_step_s", .. }));
        }
    }

    #[test]
    fn test_cancellation_aborts_run() {
        let sim = simulator(BoreholeGeometry::default(), CopModel::default());
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();
        let control = RunControl::unbounded().with_cancellation(token);
        let err = sim
            .run(&month_at_daily_steps(), &QuadraticAnnualLoad::default(), &control)
            .unwrap_err();
        assert!(matches!(err, SizingError::Cancelled { step: 0 }));
    }
}
