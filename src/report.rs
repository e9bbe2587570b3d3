use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bess::BessSizing;
use crate::domain::{BoreholeGeometry, SeriesSummary, SimulationTimeSeries, ThermalProperties};
use crate::optimizer::{ArraySizing, SweepRow};
use crate::simulation::SimulationParameters;

/// Identifies one run of the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

impl RunMetadata {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    pub geometry: BoreholeGeometry,
    pub thermal: ThermalProperties,
    pub parameters: SimulationParameters,
    pub summary: SeriesSummary,
    pub series: SimulationTimeSeries,
}

impl SimulationReport {
    pub fn new(
        geometry: BoreholeGeometry,
        thermal: ThermalProperties,
        parameters: SimulationParameters,
        series: SimulationTimeSeries,
    ) -> Self {
        let summary = series.summarize(geometry.count, parameters.time_step_s);
        Self {
            metadata: RunMetadata::new(),
            geometry,
            thermal,
            parameters,
            summary,
            series,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingReport {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    pub depth_m: f64,
    pub radius_m: f64,
    pub sizing: ArraySizing,
    /// Twice the critical radius, when one was found
    pub minimum_spacing_m: Option<f64>,
}

impl SizingReport {
    pub fn new(geometry: &BoreholeGeometry, sizing: ArraySizing) -> Self {
        Self {
            metadata: RunMetadata::new(),
            depth_m: geometry.depth_m,
            radius_m: geometry.radius_m,
            minimum_spacing_m: sizing.critical_radius_m.map(|r| 2.0 * r),
            sizing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    pub rows: Vec<SweepRow>,
}

impl SweepReport {
    /// Rows are ordered by depth, then conductivity
    pub fn new(mut rows: Vec<SweepRow>) -> Self {
        rows.sort_by(|a, b| {
            a.depth_m
                .total_cmp(&b.depth_m)
                .then(a.soil_conductivity_w_per_m_k.total_cmp(&b.soil_conductivity_w_per_m_k))
        });
        Self {
            metadata: RunMetadata::new(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BessReport {
    #[serde(flatten)]
    pub metadata: RunMetadata,
    pub sizing: BessSizing,
}

impl BessReport {
    pub fn new(sizing: BessSizing) -> Self {
        Self {
            metadata: RunMetadata::new(),
            sizing,
        }
    }
}
