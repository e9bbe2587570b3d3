use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ensure_positive, ensure_step_count, SizingError};
use crate::simulation::SECONDS_IN_YEAR;

/// How the radial ground temperature field is advanced each step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FieldMethod {
    /// Line-source superposition evaluated at every mesh radius
    #[default]
    Analytical,
    /// Explicit forward-time central-space radial diffusion
    FiniteDifference,
}

/// Inputs for borehole array sizing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingParameters {
    /// Sustainable heat extraction per metre of borehole (W/m)
    pub max_heat_per_metre_w_per_m: f64,
    pub safety_factor: f64,
    /// COP assumed when estimating the peak ground load
    pub design_cop: f64,
    /// Time at which the building load profile is taken as the design peak (s)
    pub design_time_s: f64,
    /// Convergence tolerance on the ground temperature perturbation (K)
    pub epsilon_k: f64,
    pub method: FieldMethod,
    pub time_step_s: f64,
    pub mesh_spacing_m: f64,
    pub mesh_nodes: usize,
}

impl Default for SizingParameters {
    fn default() -> Self {
        Self {
            max_heat_per_metre_w_per_m: 50.0,
            safety_factor: 1.5,
            design_cop: 3.5,
            design_time_s: 0.0,
            epsilon_k: 1e-5,
            method: FieldMethod::Analytical,
            time_step_s: SECONDS_IN_YEAR / 900.0,
            mesh_spacing_m: 0.1,
            mesh_nodes: 100,
        }
    }
}

impl SizingParameters {
    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive("sizing.max_heat_per_metre_w_per_m", self.max_heat_per_metre_w_per_m)?;
        ensure_positive("sizing.safety_factor", self.safety_factor)?;
        ensure_positive("sizing.design_cop", self.design_cop)?;
        ensure_positive("sizing.epsilon_k", self.epsilon_k)?;
        ensure_positive("sizing.time_step_s", self.time_step_s)?;
        ensure_step_count("sizing.time_step_s", SECONDS_IN_YEAR, self.time_step_s)?;
        ensure_positive("sizing.mesh_spacing_m", self.mesh_spacing_m)?;
        if !self.design_time_s.is_finite() {
            return Err(SizingError::invalid("sizing.design_time_s", self.design_time_s, "must be finite"));
        }
        if self.mesh_nodes < 3 {
            return Err(SizingError::invalid(
                "sizing.mesh_nodes",
                self.mesh_nodes as f64,
                "at least three nodes are required",
            ));
        }
        Ok(())
    }

    /// Steps in one simulated year
    pub fn steps(&self) -> usize {
        (SECONDS_IN_YEAR / self.time_step_s).floor() as usize
    }
}

/// Non-fatal conditions reported alongside a sizing result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingWarning {
    /// Explicit scheme above its stability limit; the field is unreliable
    StabilityLimitExceeded { fourier_number: f64 },
    /// Ground load per borehole exceeded the allowable maximum
    GroundLoadExceeded {
        first_step: usize,
        steps: usize,
        peak_w: f64,
        allowable_w: f64,
    },
    /// No mesh radius converged to within epsilon of the undisturbed ground
    CriticalRadiusOutsideMesh {
        outermost_radius_m: f64,
        residual_k: f64,
    },
}

/// Recommended borehole array configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySizing {
    pub borehole_count: u32,
    pub critical_radius_m: Option<f64>,
    pub method: FieldMethod,
    pub fourier_number: Option<f64>,
    pub unstable: bool,
    /// Design ground load for the whole array (W, extraction positive)
    pub design_ground_load_w: f64,
    pub allowable_per_borehole_w: f64,
    pub warnings: Vec<SizingWarning>,
}
