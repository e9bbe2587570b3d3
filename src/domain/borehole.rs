//! # Borehole Heat Exchanger Properties
//!
//! Geometry and material inputs for a single borehole, and the thermal
//! properties derived from them once per run.
//!
//! ## Resistance Model
//!
//! The fluid-to-ground path is three resistances in series, each taken over
//! the borehole wall area `A = 2π·r·L`:
//!
//! - Pipe conduction: `R_p = t / (k_pipe · A)`
//! - Grout conduction: `R_g = (2r - 2t) / (k_grout · A)`
//! - Convection: `R_con = t / (h · A)`
//!
//! where `t` is the pipe wall thickness (a fraction of the borehole radius).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{ensure_non_negative, ensure_positive, SizingError};

/// Borehole array geometry. Immutable per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoreholeGeometry {
    /// Number of boreholes sharing the building load
    pub count: u32,
    /// Borehole depth / active length (m)
    pub depth_m: f64,
    /// Borehole radius (m)
    pub radius_m: f64,
}

impl Default for BoreholeGeometry {
    fn default() -> Self {
        Self {
            count: 11,
            depth_m: 190.0,
            radius_m: 0.06,
        }
    }
}

impl BoreholeGeometry {
    pub fn new(count: u32, depth_m: f64, radius_m: f64) -> Self {
        Self {
            count,
            depth_m,
            radius_m,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_depth(mut self, depth_m: f64) -> Self {
        self.depth_m = depth_m;
        self
    }

    /// Borehole wall area through which heat is exchanged (m²)
    pub fn wall_area_m2(&self) -> f64 {
        2.0 * PI * self.radius_m * self.depth_m
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        if self.count < 1 {
            return Err(SizingError::invalid(
                "borehole.count",
                self.count as f64,
                "at least one borehole is required",
            ));
        }
        ensure_positive("borehole.depth_m", self.depth_m)?;
        ensure_positive("borehole.radius_m", self.radius_m)?;
        Ok(())
    }
}

/// Bulk material properties of soil or grout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub density_kg_per_m3: f64,
    pub specific_heat_j_per_kg_k: f64,
    pub conductivity_w_per_m_k: f64,
}

impl MaterialProperties {
    pub fn new(density_kg_per_m3: f64, specific_heat_j_per_kg_k: f64, conductivity_w_per_m_k: f64) -> Self {
        Self {
            density_kg_per_m3,
            specific_heat_j_per_kg_k,
            conductivity_w_per_m_k,
        }
    }

    /// Sandstone/mudstone mix used for the reference site
    pub fn reference_soil() -> Self {
        Self::new(2200.0, 710.0, 2.3)
    }

    /// Bentonite-cement grout
    pub fn reference_grout() -> Self {
        Self::new(1400.0, 800.0, 1.4)
    }

    pub fn with_conductivity(mut self, conductivity_w_per_m_k: f64) -> Self {
        self.conductivity_w_per_m_k = conductivity_w_per_m_k;
        self
    }

    /// Thermal diffusivity α = k / (ρ·c_p) in m²/s
    pub fn diffusivity_m2_per_s(&self) -> f64 {
        self.conductivity_w_per_m_k / (self.density_kg_per_m3 * self.specific_heat_j_per_kg_k)
    }

    pub fn validate(&self, section: Section) -> Result<(), SizingError> {
        let (density, heat, conductivity) = section.field_names();
        ensure_positive(density, self.density_kg_per_m3)?;
        ensure_positive(heat, self.specific_heat_j_per_kg_k)?;
        ensure_positive(conductivity, self.conductivity_w_per_m_k)?;
        Ok(())
    }
}

/// Which material a [`MaterialProperties`] block describes (for error reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Soil,
    Grout,
}

impl Section {
    fn field_names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Section::Soil => (
                "soil.density_kg_per_m3",
                "soil.specific_heat_j_per_kg_k",
                "soil.conductivity_w_per_m_k",
            ),
            Section::Grout => (
                "grout.density_kg_per_m3",
                "grout.specific_heat_j_per_kg_k",
                "grout.conductivity_w_per_m_k",
            ),
        }
    }
}

/// U-pipe wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeProperties {
    /// Steel: 54 W/mK
    pub conductivity_w_per_m_k: f64,
    /// Wall thickness as a fraction of the borehole radius
    pub thickness_fraction: f64,
}

impl Default for PipeProperties {
    fn default() -> Self {
        Self {
            conductivity_w_per_m_k: 54.0,
            thickness_fraction: 0.25,
        }
    }
}

/// Circulating fluid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    /// Forced convection coefficient (W/m²K)
    pub convective_coefficient_w_per_m2_k: f64,
}

impl Default for FluidProperties {
    fn default() -> Self {
        Self {
            convective_coefficient_w_per_m2_k: 500.0,
        }
    }
}

/// Measured or vendor-supplied resistances that replace the derived ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResistanceOverrides {
    pub pipe_conduction_k_per_w: Option<f64>,
    pub grout_conduction_k_per_w: Option<f64>,
    pub convection_k_per_w: Option<f64>,
}

/// Series resistances between the circulating fluid and the borehole wall (K/W)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalResistanceSet {
    pub pipe_conduction_k_per_w: f64,
    pub grout_conduction_k_per_w: f64,
    pub convection_k_per_w: f64,
}

impl ThermalResistanceSet {
    pub fn total_k_per_w(&self) -> f64 {
        self.pipe_conduction_k_per_w + self.grout_conduction_k_per_w + self.convection_k_per_w
    }

    fn validate(&self) -> Result<(), SizingError> {
        ensure_non_negative("resistances.pipe_conduction_k_per_w", self.pipe_conduction_k_per_w)?;
        ensure_non_negative("resistances.grout_conduction_k_per_w", self.grout_conduction_k_per_w)?;
        ensure_non_negative("resistances.convection_k_per_w", self.convection_k_per_w)?;
        Ok(())
    }
}

/// Thermal properties derived once at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalProperties {
    pub soil_conductivity_w_per_m_k: f64,
    pub soil_diffusivity_m2_per_s: f64,
    pub grout_conductivity_w_per_m_k: f64,
    pub grout_diffusivity_m2_per_s: f64,
    pub resistances: ThermalResistanceSet,
}

impl ThermalProperties {
    /// Validate every input and derive diffusivities and resistances
    pub fn derive(
        geometry: &BoreholeGeometry,
        soil: &MaterialProperties,
        grout: &MaterialProperties,
        pipe: &PipeProperties,
        fluid: &FluidProperties,
        overrides: &ResistanceOverrides,
    ) -> Result<Self, SizingError> {
        geometry.validate()?;
        soil.validate(Section::Soil)?;
        grout.validate(Section::Grout)?;
        ensure_positive("pipe.conductivity_w_per_m_k", pipe.conductivity_w_per_m_k)?;
        ensure_positive("pipe.thickness_fraction", pipe.thickness_fraction)?;
        if pipe.thickness_fraction >= 1.0 {
            return Err(SizingError::invalid(
                "pipe.thickness_fraction",
                pipe.thickness_fraction,
                "pipe wall must be thinner than the borehole radius",
            ));
        }
        ensure_positive(
            "fluid.convective_coefficient_w_per_m2_k",
            fluid.convective_coefficient_w_per_m2_k,
        )?;

        let area = geometry.wall_area_m2();
        let thickness = geometry.radius_m * pipe.thickness_fraction;
        let grout_thickness = 2.0 * geometry.radius_m - 2.0 * thickness;

        let resistances = ThermalResistanceSet {
            pipe_conduction_k_per_w: overrides
                .pipe_conduction_k_per_w
                .unwrap_or(thickness / (pipe.conductivity_w_per_m_k * area)),
            grout_conduction_k_per_w: overrides
                .grout_conduction_k_per_w
                .unwrap_or(grout_thickness / (grout.conductivity_w_per_m_k * area)),
            convection_k_per_w: overrides
                .convection_k_per_w
                .unwrap_or(thickness / (fluid.convective_coefficient_w_per_m2_k * area)),
        };
        resistances.validate()?;

        Ok(Self {
            soil_conductivity_w_per_m_k: soil.conductivity_w_per_m_k,
            soil_diffusivity_m2_per_s: soil.diffusivity_m2_per_s(),
            grout_conductivity_w_per_m_k: grout.conductivity_w_per_m_k,
            grout_diffusivity_m2_per_s: grout.diffusivity_m2_per_s(),
            resistances,
        })
    }
}
