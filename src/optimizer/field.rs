use serde::{Deserialize, Serialize};

use crate::error::SizingError;

/// Ground temperatures at discrete radii, borehole wall outward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialTemperatureField {
    pub radii_m: Vec<f64>,
    pub temperatures_k: Vec<f64>,
}

impl RadialTemperatureField {
    /// Uniform field at `temperature_k` over `nodes` radii spaced `spacing_m`
    /// apart, starting at the borehole wall
    pub fn uniform(wall_radius_m: f64, spacing_m: f64, nodes: usize, temperature_k: f64) -> Self {
        Self {
            radii_m: (0..nodes).map(|i| wall_radius_m + i as f64 * spacing_m).collect(),
            temperatures_k: vec![temperature_k; nodes],
        }
    }

    pub fn len(&self) -> usize {
        self.radii_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii_m.is_empty()
    }

    /// Smallest radius from which every node outward lies within `epsilon_k`
    /// of `undisturbed_k`. Non-finite temperatures never qualify.
    pub fn critical_radius(&self, undisturbed_k: f64, epsilon_k: f64) -> Option<f64> {
        let mut critical = None;
        for (r, t) in self.radii_m.iter().zip(&self.temperatures_k).rev() {
            if (t - undisturbed_k).abs() <= epsilon_k {
                critical = Some(*r);
            } else {
                break;
            }
        }
        critical
    }

    /// Perturbation at the outermost node
    pub fn outer_residual_k(&self, undisturbed_k: f64) -> f64 {
        self.temperatures_k
            .last()
            .map(|t| (t - undisturbed_k).abs())
            .unwrap_or(0.0)
    }
}

/// Inputs available to a field solver at one time step
#[derive(Debug, Clone, Copy)]
pub struct FieldStep<'a> {
    pub index: usize,
    pub time_step_s: f64,
    /// Heat flow into the ground per borehole, entry 0 = boundary condition
    pub history: &'a [f64],
    /// Heat flow into the ground at this step (W)
    pub heat_into_ground_w: f64,
}

/// Strategy for advancing the radial ground temperature field one step
pub trait GroundFieldSolver: Send {
    fn advance(&mut self, step: &FieldStep<'_>) -> Result<(), SizingError>;

    fn field(&self) -> &RadialTemperatureField;

    /// α·Δt/Δr² for grid-based solvers
    fn fourier_number(&self) -> Option<f64> {
        None
    }
}
