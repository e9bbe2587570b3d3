//! # Depth / Conductivity Sweep
//!
//! Tabulates the borehole count needed at each candidate depth for the
//! weakest and strongest plausible soil. The weak case is the thickness-weighted
//! conductivity of a layered site survey, the strong case a configured maximum.
//! Each point is independent, so callers may evaluate them in any order or in
//! parallel and sort the rows afterwards.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ArrayConfigOptimizer, SizingParameters};
use crate::domain::{
    BoreholeGeometry, FluidProperties, MaterialProperties, PipeProperties, ResistanceOverrides,
    ThermalProperties,
};
use crate::error::{ensure_positive, SizingError};
use crate::simulation::{BuildingLoadModel, CopModel, OperatingMode, RunControl};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    pub thickness_m: f64,
    pub conductivity_w_per_m_k: f64,
}

/// Soil layers from the surface down. The last layer extends indefinitely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredSoilProfile {
    pub layers: Vec<SoilLayer>,
}

impl Default for LayeredSoilProfile {
    fn default() -> Self {
        let layer = |thickness_m, conductivity_w_per_m_k| SoilLayer {
            thickness_m,
            conductivity_w_per_m_k,
        };
        Self {
            layers: vec![layer(17.0, 2.3), layer(27.0, 1.7), layer(106.0, 0.22), layer(50.0, 1.7)],
        }
    }
}

impl LayeredSoilProfile {
    pub fn validate(&self) -> Result<(), SizingError> {
        if self.layers.is_empty() {
            return Err(SizingError::invalid("sweep.profile.layers", 0.0, "at least one layer is required"));
        }
        for layer in &self.layers {
            ensure_positive("sweep.profile.thickness_m", layer.thickness_m)?;
            ensure_positive("sweep.profile.conductivity_w_per_m_k", layer.conductivity_w_per_m_k)?;
        }
        Ok(())
    }

    /// Thickness-weighted mean conductivity of the soil between the surface
    /// and `depth_m`
    pub fn effective_conductivity(&self, depth_m: f64) -> Result<f64, SizingError> {
        ensure_positive("sweep.depth_m", depth_m)?;
        self.validate()?;

        let last = self.layers.len() - 1;
        let mut top = 0.0;
        let mut weighted = 0.0;
        for (i, layer) in self.layers.iter().enumerate() {
            let bottom = if i == last { f64::INFINITY } else { top + layer.thickness_m };
            let span = bottom.min(depth_m) - top;
            weighted += span * layer.conductivity_w_per_m_k;
            if depth_m <= bottom {
                break;
            }
            top = bottom;
        }
        Ok(weighted / depth_m)
    }
}

/// Inclusive depth range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub start_m: f64,
    pub end_m: f64,
    pub step_m: f64,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            start_m: 10.0,
            end_m: 200.0,
            step_m: 10.0,
        }
    }
}

impl DepthRange {
    pub fn depths(&self) -> Result<Vec<f64>, SizingError> {
        ensure_positive("sweep.depths.start_m", self.start_m)?;
        ensure_positive("sweep.depths.step_m", self.step_m)?;
        if !self.end_m.is_finite() || self.end_m < self.start_m {
            return Err(SizingError::invalid("sweep.depths.end_m", self.end_m, "must not be below start_m"));
        }
        let count = ((self.end_m - self.start_m) / self.step_m + 1e-9).floor() as usize + 1;
        Ok((0..count).map(|i| self.start_m + i as f64 * self.step_m).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParameters {
    pub depths: DepthRange,
    pub max_conductivity_w_per_m_k: f64,
    pub profile: LayeredSoilProfile,
    /// Run the full one-year optimizer per point to get the critical radius
    pub critical_radius: bool,
}

impl Default for SweepParameters {
    fn default() -> Self {
        Self {
            depths: DepthRange::default(),
            max_conductivity_w_per_m_k: 3.2,
            profile: LayeredSoilProfile::default(),
            critical_radius: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub depth_m: f64,
    pub soil_conductivity_w_per_m_k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub depth_m: f64,
    pub borehole_count: u32,
    pub soil_conductivity_w_per_m_k: f64,
    pub soil_diffusivity_m2_per_s: f64,
    /// count · allowable extraction per metre · depth (W)
    pub capacity_w: f64,
    pub critical_radius_m: Option<f64>,
}

/// Fixed inputs shared by every sweep point
#[derive(Debug, Clone)]
pub struct ParameterSweep {
    pub radius_m: f64,
    pub soil: MaterialProperties,
    pub grout: MaterialProperties,
    pub pipe: PipeProperties,
    pub fluid: FluidProperties,
    pub overrides: ResistanceOverrides,
    pub cop_model: CopModel,
    pub sizing: SizingParameters,
    pub params: SweepParameters,
}

impl ParameterSweep {
    /// Two points per depth, layered minimum first
    pub fn points(&self) -> Result<Vec<SweepPoint>, SizingError> {
        ensure_positive("sweep.max_conductivity_w_per_m_k", self.params.max_conductivity_w_per_m_k)?;
        let mut points = Vec::new();
        for depth_m in self.params.depths.depths()? {
            let layered = self.params.profile.effective_conductivity(depth_m)?;
            for soil_conductivity_w_per_m_k in [layered, self.params.max_conductivity_w_per_m_k] {
                points.push(SweepPoint {
                    depth_m,
                    soil_conductivity_w_per_m_k,
                });
            }
        }
        Ok(points)
    }

    pub fn evaluate(
        &self,
        point: SweepPoint,
        load: &dyn BuildingLoadModel,
        ground_temperature_k: f64,
        mode: OperatingMode,
        control: &RunControl,
    ) -> Result<SweepRow, SizingError> {
        let geometry = BoreholeGeometry::new(1, point.depth_m, self.radius_m);
        let soil = self.soil.with_conductivity(point.soil_conductivity_w_per_m_k);
        let thermal =
            ThermalProperties::derive(&geometry, &soil, &self.grout, &self.pipe, &self.fluid, &self.overrides)?;
        let optimizer = ArrayConfigOptimizer::new(geometry, thermal, self.cop_model, self.sizing)?;

        let (borehole_count, critical_radius_m) = if self.params.critical_radius {
            let sizing = optimizer.optimize(load, ground_temperature_k, mode, control)?;
            (sizing.borehole_count, sizing.critical_radius_m)
        } else {
            (optimizer.estimate(load, mode)?.1, None)
        };

        debug!(depth_m = point.depth_m, k_s = point.soil_conductivity_w_per_m_k, borehole_count, "sweep point");

        Ok(SweepRow {
            depth_m: point.depth_m,
            borehole_count,
            soil_conductivity_w_per_m_k: point.soil_conductivity_w_per_m_k,
            soil_diffusivity_m2_per_s: thermal.soil_diffusivity_m2_per_s,
            capacity_w: borehole_count as f64 * self.sizing.max_heat_per_metre_w_per_m * point.depth_m,
            critical_radius_m,
        })
    }

    /// Evaluate every point in order
    pub fn run(
        &self,
        load: &dyn BuildingLoadModel,
        ground_temperature_k: f64,
        mode: OperatingMode,
        control: &RunControl,
    ) -> Result<Vec<SweepRow>, SizingError> {
        self.points()?
            .into_iter()
            .map(|point| self.evaluate(point, load, ground_temperature_k, mode, control))
            .collect()
    }
}
