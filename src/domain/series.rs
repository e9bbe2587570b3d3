use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// One simulated time step for a single borehole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Seconds since the start of the run
    pub time_s: f64,
    /// Building load carried by this borehole (W)
    pub building_load_w: f64,
    /// Borehole/soil interface temperature (K)
    pub interface_temp_k: f64,
    /// Borehole outlet / heat pump inlet temperature (K)
    pub outlet_temp_k: f64,
    /// Heat pump COP used during this step
    pub cop: f64,
    /// Heat exchanged with the ground, positive = extraction (W)
    pub ground_load_w: f64,
    /// Heat pump electrical input (W)
    pub electrical_power_w: f64,
}

/// Append-only per-step record of a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationTimeSeries {
    records: Vec<SimulationRecord>,
}

impl SimulationTimeSeries {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            records: Vec::with_capacity(steps),
        }
    }

    pub(crate) fn push(&mut self, record: SimulationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationRecord> {
        self.records.iter()
    }

    /// Whole-array statistics, scaling per-borehole values by `borehole_count`
    pub fn summarize(&self, borehole_count: u32, time_step_s: f64) -> SeriesSummary {
        let n = self.records.len();
        let count = borehole_count as f64;

        let sum = |f: fn(&SimulationRecord) -> f64| self.records.iter().map(f).sum::<f64>();
        let max = |f: fn(&SimulationRecord) -> f64| {
            self.records.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
        };
        let mean = |total: f64| if n == 0 { 0.0 } else { total / n as f64 };

        let building_sum = sum(|r| r.building_load_w);
        let electrical_sum = sum(|r| r.electrical_power_w);
        let ground_sum = sum(|r| r.ground_load_w);

        let total_building_heat_j = building_sum * time_step_s * count;
        let total_electrical_energy_j = electrical_sum * time_step_s * count;

        let cop_range = match self.records.iter().map(|r| r.cop).minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(c) => Some((c, c)),
            MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
        };

        SeriesSummary {
            steps: n,
            total_building_heat_j,
            total_electrical_energy_j,
            peak_electrical_power_w: if n == 0 { 0.0 } else { max(|r| r.electrical_power_w) * count },
            mean_electrical_power_w: mean(electrical_sum) * count,
            peak_ground_load_w: if n == 0 { 0.0 } else { max(|r| r.ground_load_w) * count },
            mean_ground_load_w: mean(ground_sum) * count,
            seasonal_performance_factor: if total_electrical_energy_j > 0.0 {
                Some(total_building_heat_j / total_electrical_energy_j)
            } else {
                None
            },
            cop_range,
        }
    }
}

/// Annual totals for the whole borehole array, SI units only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub steps: usize,
    pub total_building_heat_j: f64,
    pub total_electrical_energy_j: f64,
    pub peak_electrical_power_w: f64,
    pub mean_electrical_power_w: f64,
    pub peak_ground_load_w: f64,
    pub mean_ground_load_w: f64,
    /// Heat delivered per unit of electricity over the run
    pub seasonal_performance_factor: Option<f64>,
    pub cop_range: Option<(f64, f64)>,
}
