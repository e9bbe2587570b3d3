//! # Borehole Array Sizing
//!
//! Estimates the borehole count from the design peak load and the allowable
//! extraction per metre, then simulates one year of operation for that array
//! to find the critical radius: the distance beyond which the ground is
//! undisturbed to within epsilon. Twice the critical radius is the minimum
//! spacing between boreholes for the independence assumption to hold.

use tracing::{info, warn};

use super::{
    estimate_borehole_count, AnalyticalField, ArraySizing, FieldMethod, FieldStep,
    FiniteDifferenceField, GroundFieldSolver, RadialTemperatureField, SizingParameters,
    SizingWarning, FOURIER_STABILITY_LIMIT,
};
use crate::domain::{BoreholeGeometry, LoadHistory, ThermalProperties};
use crate::error::{ensure_positive, SizingError};
use crate::simulation::{
    ground_load_w, outlet_temperature_k, BuildingLoadModel, CopModel, LineSourceKernel,
    OperatingMode, RunControl,
};

/// Sizes a borehole array of the given depth and radius.
///
/// `geometry.count` is ignored: the count is the output.
#[derive(Debug, Clone)]
pub struct ArrayConfigOptimizer {
    geometry: BoreholeGeometry,
    thermal: ThermalProperties,
    cop_model: CopModel,
    params: SizingParameters,
}

/// Tracks steps where the per-borehole ground load exceeded the allowable maximum
#[derive(Debug, Default)]
struct ExceedanceTracker {
    first_step: Option<usize>,
    steps: usize,
    peak_w: f64,
}

impl ExceedanceTracker {
    fn record(&mut self, step: usize, ground_load_w: f64) {
        self.first_step.get_or_insert(step);
        self.steps += 1;
        self.peak_w = self.peak_w.max(ground_load_w.abs());
    }

    fn into_warning(self, allowable_w: f64) -> Option<SizingWarning> {
        self.first_step.map(|first_step| SizingWarning::GroundLoadExceeded {
            first_step,
            steps: self.steps,
            peak_w: self.peak_w,
            allowable_w,
        })
    }
}

impl ArrayConfigOptimizer {
    pub fn new(
        geometry: BoreholeGeometry,
        thermal: ThermalProperties,
        cop_model: CopModel,
        params: SizingParameters,
    ) -> Result<Self, SizingError> {
        ensure_positive("borehole.depth_m", geometry.depth_m)?;
        ensure_positive("borehole.radius_m", geometry.radius_m)?;
        cop_model.validate()?;
        params.validate()?;
        Ok(Self {
            geometry,
            thermal,
            cop_model,
            params,
        })
    }

    pub fn params(&self) -> &SizingParameters {
        &self.params
    }

    /// Allowable heat flow per borehole (W, extraction negative as in the
    /// building-load sign convention)
    pub fn allowable_per_borehole_w(&self) -> f64 {
        -self.params.max_heat_per_metre_w_per_m * self.geometry.depth_m
    }

    /// Design ground load for the whole array (W) and the borehole count it requires
    pub fn estimate(&self, load: &dyn BuildingLoadModel, mode: OperatingMode) -> Result<(f64, u32), SizingError> {
        let peak_building_w = load.load_w(self.params.design_time_s);
        let design_ground_w = ground_load_w(peak_building_w, self.params.design_cop, mode)?;
        let count = estimate_borehole_count(
            design_ground_w,
            self.allowable_per_borehole_w(),
            self.params.safety_factor,
        )?;
        Ok((design_ground_w, count))
    }

    fn build_solver(&self, ground_temperature_k: f64) -> Result<Box<dyn GroundFieldSolver>, SizingError> {
        let field = RadialTemperatureField::uniform(
            self.geometry.radius_m,
            self.params.mesh_spacing_m,
            self.params.mesh_nodes,
            ground_temperature_k,
        );
        let solver: Box<dyn GroundFieldSolver> = match self.params.method {
            FieldMethod::Analytical => {
                let kernel = LineSourceKernel::new(
                    self.thermal.soil_conductivity_w_per_m_k,
                    self.thermal.soil_diffusivity_m2_per_s,
                    self.geometry.depth_m,
                )?;
                Box::new(AnalyticalField::new(kernel, ground_temperature_k, field))
            }
            FieldMethod::FiniteDifference => Box::new(FiniteDifferenceField::new(
                self.thermal.soil_conductivity_w_per_m_k,
                self.thermal.soil_diffusivity_m2_per_s,
                self.params.time_step_s,
                self.geometry.wall_area_m2(),
                ground_temperature_k,
                field,
            )?),
        };
        Ok(solver)
    }

    /// Size the array and simulate one year at the recommended count
    pub fn optimize(
        &self,
        load: &dyn BuildingLoadModel,
        ground_temperature_k: f64,
        mode: OperatingMode,
        control: &RunControl,
    ) -> Result<ArraySizing, SizingError> {
        ensure_positive("simulation.ground_temperature_k", ground_temperature_k)?;

        let (design_ground_load_w, borehole_count) = self.estimate(load, mode)?;
        let allowable_w = self.allowable_per_borehole_w();
        info!(
            borehole_count,
            design_ground_load_w,
            allowable_per_borehole_w = allowable_w,
            method = %self.params.method,
            "estimated borehole count"
        );

        let mut solver = self.build_solver(ground_temperature_k)?;
        let mut warnings = Vec::new();

        let fourier_number = solver.fourier_number();
        let unstable = fourier_number.is_some_and(|fo| fo > FOURIER_STABILITY_LIMIT);
        if let Some(fo) = fourier_number.filter(|_| unstable) {
            warn!(
                fourier_number = fo,
                limit = FOURIER_STABILITY_LIMIT,
                "Fourier number exceeds explicit-scheme stability limit; ground field will be unreliable"
            );
            warnings.push(SizingWarning::StabilityLimitExceeded { fourier_number: fo });
        }

        let n = self.params.steps();
        let dt = self.params.time_step_s;
        let count = borehole_count as f64;
        let sign = mode.extraction_sign();
        let r_total = self.thermal.resistances.total_k_per_w();
        let grout = LineSourceKernel::new(
            self.thermal.grout_conductivity_w_per_m_k,
            self.thermal.grout_diffusivity_m2_per_s,
            self.geometry.depth_m,
        )?;

        let mut history = LoadHistory::with_capacity(n + 1);
        let mut exceedance = ExceedanceTracker::default();
        let mut cop = self
            .cop_model
            .cop(outlet_temperature_k(ground_temperature_k, 0.0, r_total))
            .map_err(|e| e.at_step(0))?;

        for i in 0..=n {
            control.check(i)?;

            let building_load_w = load.load_w(i as f64 * dt) / count;
            let ground_load = sign * ground_load_w(building_load_w, cop, mode).map_err(|e| e.at_step(i))?;
            if ground_load.abs() > allowable_w.abs() {
                exceedance.record(i, ground_load);
            }
            history.push(-ground_load);

            let interface_temp_k = ground_temperature_k
                + grout
                    .delta_t_k(self.geometry.radius_m, dt, i, history.as_slice())
                    .map_err(|e| e.at_step(i))?;
            let outlet_temp_k = outlet_temperature_k(interface_temp_k, ground_load, r_total);
            cop = self.cop_model.cop(outlet_temp_k).map_err(|e| e.at_step(i))?;

            solver
                .advance(&FieldStep {
                    index: i,
                    time_step_s: dt,
                    history: history.as_slice(),
                    heat_into_ground_w: -ground_load,
                })
                .map_err(|e| e.at_step(i))?;
        }

        if let Some(warning) = exceedance.into_warning(allowable_w) {
            warn!(?warning, "ground load exceeded theoretical maximum");
            warnings.push(warning);
        }

        let field = solver.field();
        let critical_radius_m = field.critical_radius(ground_temperature_k, self.params.epsilon_k);
        if critical_radius_m.is_none() {
            let warning = SizingWarning::CriticalRadiusOutsideMesh {
                outermost_radius_m: field.radii_m.last().copied().unwrap_or(self.geometry.radius_m),
                residual_k: field.outer_residual_k(ground_temperature_k),
            };
            warn!(?warning, epsilon_k = self.params.epsilon_k, "ground disturbance extends past the mesh");
            warnings.push(warning);
        }

        info!(borehole_count, ?critical_radius_m, unstable, "array sizing complete");

        Ok(ArraySizing {
            borehole_count,
            critical_radius_m,
            method: self.params.method,
            fourier_number,
            unstable,
            design_ground_load_w,
            allowable_per_borehole_w: allowable_w,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FluidProperties, MaterialProperties, PipeProperties, ResistanceOverrides};
    use crate::simulation::{ConstantLoad, QuadraticAnnualLoad, SECONDS_IN_YEAR};

    fn optimizer(depth_m: f64, params: SizingParameters) -> ArrayConfigOptimizer {
        let geometry = BoreholeGeometry::default().with_depth(depth_m);
        let thermal = ThermalProperties::derive(
            &geometry,
            &MaterialProperties::reference_soil(),
            &MaterialProperties::reference_grout(),
            &PipeProperties::default(),
            &FluidProperties::default(),
            &ResistanceOverrides::default(),
        )
        .unwrap();
        ArrayConfigOptimizer::new(geometry, thermal, CopModel::default(), params).unwrap()
    }

    fn coarse(method: FieldMethod) -> SizingParameters {
        SizingParameters {
            method,
            time_step_s: SECONDS_IN_YEAR / 50.0,
            mesh_spacing_m: 2.0,
            mesh_nodes: 40,
            ..Default::default()
        }
    }

    #[test]
    fn test_estimate_matches_closed_form() {
        let opt = optimizer(100.0, SizingParameters::default());
        let load = QuadraticAnnualLoad::default();
        let (design, count) = opt.estimate(&load, OperatingMode::Heating).unwrap();

        let q_g_max = load.load_w(0.0) * (3.5 - 1.0) / 3.5;
        assert!((design - q_g_max).abs() < 1e-9);
        assert_eq!(count, ((q_g_max / (50.0 * 100.0)) * 1.5).ceil() as u32);
        assert_eq!(count, 21);
    }

    #[test]
    fn test_deeper_boreholes_need_fewer() {
        let load = QuadraticAnnualLoad::default();
        let shallow = optimizer(50.0, SizingParameters::default())
            .estimate(&load, OperatingMode::Heating)
            .unwrap()
            .1;
        let deep = optimizer(200.0, SizingParameters::default())
            .estimate(&load, OperatingMode::Heating)
            .unwrap()
            .1;
        assert!(deep < shallow);
    }

    #[test]
    fn test_analytical_run_finds_critical_radius() {
        let opt = optimizer(100.0, coarse(FieldMethod::Analytical));
        let sizing = opt
            .optimize(&QuadraticAnnualLoad::default(), 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();

        assert_eq!(sizing.method, FieldMethod::Analytical);
        assert!(!sizing.unstable);
        assert!(sizing.fourier_number.is_none());
        let r_crit = sizing.critical_radius_m.expect("field converges inside 78 m");
        assert!(r_crit > 0.06 && r_crit < 80.0);
    }

    #[test]
    fn test_finite_difference_stable_run() {
        let opt = optimizer(100.0, coarse(FieldMethod::FiniteDifference));
        let sizing = opt
            .optimize(&QuadraticAnnualLoad::default(), 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();

        let fo = sizing.fourier_number.unwrap();
        assert!(fo <= 0.5, "Fo = {fo}");
        assert!(!sizing.unstable);
        assert!(!sizing
            .warnings
            .iter()
            .any(|w| matches!(w, SizingWarning::StabilityLimitExceeded { .. })));
        // The far edge is pinned to the ground temperature
        assert!(sizing.critical_radius_m.is_some());
    }

    #[test]
    fn test_finite_difference_unstable_run_is_flagged() {
        let params = SizingParameters {
            mesh_spacing_m: 0.1,
            mesh_nodes: 20,
            ..coarse(FieldMethod::FiniteDifference)
        };
        let sizing = optimizer(100.0, params)
            .optimize(&QuadraticAnnualLoad::default(), 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();

        assert!(sizing.unstable);
        assert!(sizing
            .warnings
            .iter()
            .any(|w| matches!(w, SizingWarning::StabilityLimitExceeded { fourier_number } if *fourier_number > 0.5)));
    }

    #[test]
    fn test_ground_load_exceedance_is_a_warning() {
        // Sized for 100 kW at t = 0, then a constant 400 kW load
        struct Surge;
        impl BuildingLoadModel for Surge {
            fn load_w(&self, t_s: f64) -> f64 {
                if t_s == 0.0 { 100_000.0 } else { 400_000.0 }
            }
        }
        let params = SizingParameters {
            time_step_s: SECONDS_IN_YEAR / 10.0,
            mesh_nodes: 5,
            ..coarse(FieldMethod::Analytical)
        };
        let sizing = optimizer(100.0, params)
            .optimize(&Surge, 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();

        assert_eq!(sizing.borehole_count, 22);
        let (first_step, steps) = sizing
            .warnings
            .iter()
            .find_map(|w| match w {
                SizingWarning::GroundLoadExceeded { first_step, steps, .. } => Some((*first_step, *steps)),
                _ => None,
            })
            .expect("exceedance warning");
        assert_eq!(first_step, 1);
        assert!(steps >= 1 && steps <= 10);
    }

    #[test]
    fn test_short_mesh_reports_outer_residual() {
        let params = SizingParameters {
            mesh_spacing_m: 0.1,
            mesh_nodes: 5,
            ..coarse(FieldMethod::Analytical)
        };
        let sizing = optimizer(100.0, params)
            .optimize(&QuadraticAnnualLoad::default(), 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();

        assert!(sizing.critical_radius_m.is_none());
        let (outermost_radius_m, residual_k) = sizing
            .warnings
            .iter()
            .find_map(|w| match w {
                SizingWarning::CriticalRadiusOutsideMesh {
                    outermost_radius_m,
                    residual_k,
                } => Some((*outermost_radius_m, *residual_k)),
                _ => None,
            })
            .expect("outside-mesh warning");
        assert!((outermost_radius_m - 0.46).abs() < 1e-12);
        // Extraction still draws the ground several kelvin down at 0.46 m
        assert!(residual_k > 1.0 && residual_k < 20.0, "residual = {residual_k}");
    }

    #[test]
    fn test_no_load_leaves_ground_undisturbed() {
        let opt = optimizer(100.0, coarse(FieldMethod::Analytical));
        let sizing = opt
            .optimize(&ConstantLoad::zero(), 288.0, OperatingMode::Heating, &RunControl::unbounded())
            .unwrap();
        assert_eq!(sizing.borehole_count, 1);
        assert_eq!(sizing.critical_radius_m, Some(0.06));
        assert!(sizing.warnings.is_empty());
    }
}
