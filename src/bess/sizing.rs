use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{HourlyProfile, HOURS_PER_DAY};
use crate::error::{ensure_non_negative, ensure_positive, SizingError};

/// One battery unit as installed, after ageing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryUnit {
    pub nominal_capacity_kwh: f64,
    /// Fraction of nominal capacity lost to ageing
    pub degradation: f64,
    /// Round-trip charging efficiency in (0, 1]
    pub efficiency: f64,
    pub depth_of_discharge: f64,
}

impl Default for BatteryUnit {
    fn default() -> Self {
        Self {
            nominal_capacity_kwh: 32.6,
            degradation: 0.15,
            efficiency: 0.85,
            depth_of_discharge: 0.8,
        }
    }
}

impl BatteryUnit {
    pub fn usable_capacity_kwh(&self) -> f64 {
        self.nominal_capacity_kwh * (1.0 - self.degradation)
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        ensure_positive("bess.battery.nominal_capacity_kwh", self.nominal_capacity_kwh)?;
        ensure_non_negative("bess.battery.degradation", self.degradation)?;
        if self.degradation >= 1.0 {
            return Err(SizingError::invalid("bess.battery.degradation", self.degradation, "must be below 1"));
        }
        ensure_fraction("bess.battery.efficiency", self.efficiency)?;
        ensure_fraction("bess.battery.depth_of_discharge", self.depth_of_discharge)?;
        Ok(())
    }
}

fn ensure_fraction(field: &'static str, value: f64) -> Result<(), SizingError> {
    ensure_positive(field, value)?;
    if value > 1.0 {
        return Err(SizingError::invalid(field, value, "must not exceed 1"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEnergy {
    pub days: u32,
    pub consumption_kwh: f64,
    pub daily_generation_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BessInputs {
    pub months: Vec<MonthlyEnergy>,
    pub consumption_profile: HourlyProfile,
    pub generation_profile: HourlyProfile,
    pub battery: BatteryUnit,
    pub safety_margin: f64,
}

impl Default for BessInputs {
    /// Site survey for a winter-peaking household with rooftop PV
    fn default() -> Self {
        const CONSUMPTION_KWH: [f64; 12] = [
            16360.0, 14138.0, 13848.0, 12497.0, 11046.0, 9787.0, 9376.0, 9374.0, 9826.0, 11628.0, 13108.0,
            15018.0,
        ];
        const GENERATION_KWH_PER_DAY: [f64; 12] =
            [180.0, 280.0, 420.0, 562.0, 664.0, 706.0, 686.0, 605.0, 474.0, 325.0, 204.0, 150.0];
        const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

        let months = DAYS
            .iter()
            .zip(CONSUMPTION_KWH)
            .zip(GENERATION_KWH_PER_DAY)
            .map(|((&days, consumption_kwh), daily_generation_kwh)| MonthlyEnergy {
                days,
                consumption_kwh,
                daily_generation_kwh,
            })
            .collect();

        Self {
            months,
            consumption_profile: HourlyProfile::reference_consumption(),
            generation_profile: HourlyProfile::reference_generation(),
            battery: BatteryUnit::default(),
            safety_margin: 0.1,
        }
    }
}

impl BessInputs {
    pub fn validate(&self) -> Result<(), SizingError> {
        if self.months.is_empty() {
            return Err(SizingError::invalid("bess.months", 0.0, "at least one month is required"));
        }
        for month in &self.months {
            if month.days == 0 {
                return Err(SizingError::invalid("bess.months.days", 0.0, "must be positive"));
            }
            ensure_non_negative("bess.months.consumption_kwh", month.consumption_kwh)?;
            ensure_non_negative("bess.months.daily_generation_kwh", month.daily_generation_kwh)?;
        }
        ensure_non_negative("bess.safety_margin", self.safety_margin)?;
        self.battery.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStorageRow {
    /// 1-based
    pub month: usize,
    pub daily_consumption_kwh: f64,
    pub daily_generation_kwh: f64,
    /// Demand the battery could not meet over the representative day
    pub shortfall_kwh: f64,
    /// Shortfall grossed up for depth of discharge, efficiency and margin
    pub required_storage_kwh: f64,
    pub units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BessSizing {
    pub usable_unit_capacity_kwh: f64,
    pub months: Vec<MonthlyStorageRow>,
    pub units: u32,
    pub total_capacity_kwh: f64,
}

/// Hour-by-hour battery run over one day starting empty; returns the unmet demand
fn daily_shortfall_kwh(
    consumption: &[f64; HOURS_PER_DAY],
    generation: &[f64; HOURS_PER_DAY],
    battery: &BatteryUnit,
) -> f64 {
    let capacity = battery.usable_capacity_kwh();
    let mut soc = 0.0;
    let mut shortfall = 0.0;

    for (used, generated) in consumption.iter().zip(generation) {
        let net = generated - used;
        if net > 0.0 {
            soc = (soc + net * battery.efficiency).min(capacity);
        } else {
            soc += net;
            if soc < 0.0 {
                shortfall -= soc;
                soc = 0.0;
            }
        }
    }
    shortfall
}

pub fn size_storage(inputs: &BessInputs) -> Result<BessSizing, SizingError> {
    inputs.validate()?;
    let battery = &inputs.battery;
    let unit_kwh = battery.usable_capacity_kwh();

    let months = inputs
        .months
        .iter()
        .enumerate()
        .map(|(i, month)| {
            let daily_consumption_kwh = month.consumption_kwh / month.days as f64;
            let consumption = inputs.consumption_profile.distribute(daily_consumption_kwh);
            let generation = inputs.generation_profile.distribute(month.daily_generation_kwh);

            let shortfall_kwh = daily_shortfall_kwh(&consumption, &generation, battery);
            let required_storage_kwh = shortfall_kwh / (battery.depth_of_discharge * battery.efficiency)
                * (1.0 + inputs.safety_margin);
            let units = (required_storage_kwh / unit_kwh).ceil() as u32;

            debug!(month = i + 1, shortfall_kwh, required_storage_kwh, units, "month sized");
            MonthlyStorageRow {
                month: i + 1,
                daily_consumption_kwh,
                daily_generation_kwh: month.daily_generation_kwh,
                shortfall_kwh,
                required_storage_kwh,
                units,
            }
        })
        .collect::<Vec<_>>();

    let units = months.iter().map(|m| m.units).max().unwrap_or(0);

    Ok(BessSizing {
        usable_unit_capacity_kwh: unit_kwh,
        months,
        units,
        total_capacity_kwh: unit_kwh * units as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_site() {
        let sizing = size_storage(&BessInputs::default()).unwrap();

        assert!((sizing.usable_unit_capacity_kwh - 27.71).abs() < 1e-9);
        let units: Vec<u32> = sizing.months.iter().map(|m| m.units).collect();
        assert_eq!(units, vec![21, 16, 13, 12, 10, 9, 8, 8, 9, 11, 14, 20]);
        assert_eq!(sizing.units, 21);
        assert!((sizing.total_capacity_kwh - 581.91).abs() < 1e-9);

        let january = &sizing.months[0];
        assert_eq!(january.month, 1);
        assert!((january.daily_consumption_kwh - 16360.0 / 31.0).abs() < 1e-12);
        assert!((january.shortfall_kwh - 347.8199).abs() < 1e-3);
        assert!((january.required_storage_kwh - 562.6498).abs() < 1e-3);
    }

    #[test]
    fn test_surplus_day_needs_no_storage() {
        let mut inputs = BessInputs::default();
        inputs.months = vec![MonthlyEnergy {
            days: 30,
            consumption_kwh: 0.0,
            daily_generation_kwh: 500.0,
        }];
        let sizing = size_storage(&inputs).unwrap();
        assert_eq!(sizing.units, 0);
        assert_eq!(sizing.total_capacity_kwh, 0.0);
    }

    #[test]
    fn test_no_generation_shortfall_is_whole_day() {
        let mut inputs = BessInputs::default();
        inputs.months = vec![MonthlyEnergy {
            days: 10,
            consumption_kwh: 1000.0,
            daily_generation_kwh: 0.0,
        }];
        let sizing = size_storage(&inputs).unwrap();
        assert!((sizing.months[0].shortfall_kwh - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_charge_is_capped_at_unit_capacity() {
        let battery = BatteryUnit {
            nominal_capacity_kwh: 10.0,
            degradation: 0.0,
            efficiency: 1.0,
            depth_of_discharge: 1.0,
        };
        let mut generation = [0.0; HOURS_PER_DAY];
        generation[0] = 50.0;
        let mut consumption = [0.0; HOURS_PER_DAY];
        consumption[1] = 25.0;
        assert!((daily_shortfall_kwh(&consumption, &generation, &battery) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut inputs = BessInputs::default();
        inputs.battery.efficiency = 1.2;
        assert!(size_storage(&inputs).is_err());

        let mut inputs = BessInputs::default();
        inputs.battery.depth_of_discharge = 0.0;
        assert!(size_storage(&inputs).is_err());

        let mut inputs = BessInputs::default();
        inputs.months[3].days = 0;
        assert!(size_storage(&inputs).is_err());

        let mut inputs = BessInputs::default();
        inputs.months.clear();
        assert!(size_storage(&inputs).is_err());
    }
}
