//! # Explicit Radial Diffusion
//!
//! Forward-time central-space discretisation of
//!
//! ∂T/∂t = α·(∂²T/∂r² + (1/r)·∂T/∂r)
//!
//! on nodes `r_i = r_b + i·Δr`. Interior nodes use the flux-conservative form
//!
//! T'ᵢ = Tᵢ + Fo/rᵢ · [r₊(Tᵢ₊₁ − Tᵢ) − r₋(Tᵢ − Tᵢ₋₁)],  r± = rᵢ ± Δr/2
//!
//! Node 0 sits on the borehole wall and carries the known heat flux through a
//! half-cell energy balance over [r_b, r_b + Δr/2]. The last node is held at
//! the undisturbed ground temperature.
//!
//! The scheme is stable only for `Fo = α·Δt/Δr² ≤ 0.5`. That bound keeps the
//! interior nodes monotone. The wall node has its own coefficient
//!
//! c_w = α·Δt·r₊/(h·Δr),  h = (r₊² − r_b²)/2
//!
//! which is roughly 2.6·Fo at Δr = 0.1 m and 3.6·Fo at Δr = 1 m on a 0.06 m
//! borehole. When `c_w > 1` the wall temperature overshoots and rings for the
//! first steps of a load change before settling, even with `Fo ≤ 0.5`.

use super::{FieldStep, GroundFieldSolver, RadialTemperatureField};
use tracing::debug;

use crate::error::{ensure_positive, SizingError};

/// Explicit-scheme stability limit on the Fourier number
pub const FOURIER_STABILITY_LIMIT: f64 = 0.5;

pub struct FiniteDifferenceField {
    fourier: f64,
    diffusivity_m2_per_s: f64,
    time_step_s: f64,
    spacing_m: f64,
    conductivity_w_per_m_k: f64,
    wall_area_m2: f64,
    undisturbed_k: f64,
    field: RadialTemperatureField,
    next: Vec<f64>,
}

impl FiniteDifferenceField {
    pub fn new(
        conductivity_w_per_m_k: f64,
        diffusivity_m2_per_s: f64,
        time_step_s: f64,
        wall_area_m2: f64,
        undisturbed_k: f64,
        field: RadialTemperatureField,
    ) -> Result<Self, SizingError> {
        ensure_positive("fd.conductivity_w_per_m_k", conductivity_w_per_m_k)?;
        ensure_positive("fd.diffusivity_m2_per_s", diffusivity_m2_per_s)?;
        ensure_positive("fd.time_step_s", time_step_s)?;
        ensure_positive("fd.wall_area_m2", wall_area_m2)?;
        if field.len() < 3 {
            return Err(SizingError::invalid("fd.mesh_nodes", field.len() as f64, "at least three nodes are required"));
        }
        let spacing_m = field.radii_m[1] - field.radii_m[0];
        ensure_positive("fd.mesh_spacing_m", spacing_m)?;
        ensure_positive("fd.wall_radius_m", field.radii_m[0])?;

        let fourier = diffusivity_m2_per_s * time_step_s / (spacing_m * spacing_m);
        let next = vec![undisturbed_k; field.len()];

        let solver = Self {
            fourier,
            diffusivity_m2_per_s,
            time_step_s,
            spacing_m,
            conductivity_w_per_m_k,
            wall_area_m2,
            undisturbed_k,
            field,
            next,
        };
        let wall_coefficient = solver.wall_coefficient();
        if wall_coefficient > 1.0 {
            debug!(wall_coefficient, fourier = solver.fourier, "wall node will overshoot on load changes");
        }
        Ok(solver)
    }

    pub fn is_unstable(&self) -> bool {
        self.fourier > FOURIER_STABILITY_LIMIT
    }

    /// Weight of the `T₁ − T₀` term in the wall update
    pub fn wall_coefficient(&self) -> f64 {
        let r0 = self.field.radii_m[0];
        let r_face = r0 + self.spacing_m / 2.0;
        let half_cell = (r_face * r_face - r0 * r0) / 2.0;
        self.diffusivity_m2_per_s * self.time_step_s * r_face / (half_cell * self.spacing_m)
    }
}

impl GroundFieldSolver for FiniteDifferenceField {
    fn advance(&mut self, step: &FieldStep<'_>) -> Result<(), SizingError> {
        let fo = self.fourier;
        let dr = self.spacing_m;
        let t = &self.field.temperatures_k;
        let r = &self.field.radii_m;
        let last = t.len() - 1;

        // Wall flux (W/m²), positive into the ground
        let flux = step.heat_into_ground_w / self.wall_area_m2;
        let r_face = r[0] + dr / 2.0;
        let half_cell = (r_face * r_face - r[0] * r[0]) / 2.0;
        self.next[0] = t[0]
            + self.diffusivity_m2_per_s * self.time_step_s / half_cell
                * (flux * r[0] / self.conductivity_w_per_m_k + r_face * (t[1] - t[0]) / dr);

        for i in 1..last {
            let outer = (r[i] + dr / 2.0) * (t[i + 1] - t[i]);
            let inner = (r[i] - dr / 2.0) * (t[i] - t[i - 1]);
            self.next[i] = t[i] + fo / r[i] * (outer - inner);
        }
        self.next[last] = self.undisturbed_k;

        std::mem::swap(&mut self.field.temperatures_k, &mut self.next);
        Ok(())
    }

    fn field(&self) -> &RadialTemperatureField {
        &self.field
    }

    fn fourier_number(&self) -> Option<f64> {
        Some(self.fourier)
    }
}
