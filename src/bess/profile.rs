use serde::{Deserialize, Serialize};

use crate::error::SizingError;

pub const HOURS_PER_DAY: usize = 24;

/// Share of a day's energy in each hour, summing to one.
///
/// Deserialises from raw weights, which are normalised on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct HourlyProfile([f64; HOURS_PER_DAY]);

impl HourlyProfile {
    pub fn normalized(weights: &[f64]) -> Result<Self, SizingError> {
        if weights.len() != HOURS_PER_DAY {
            return Err(SizingError::invalid(
                "bess.profile",
                weights.len() as f64,
                "exactly 24 hourly weights are required",
            ));
        }
        if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SizingError::invalid("bess.profile", bad, "weights must be finite and non-negative"));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SizingError::invalid("bess.profile", total, "weights must have a positive sum"));
        }

        let mut shares = [0.0; HOURS_PER_DAY];
        for (share, w) in shares.iter_mut().zip(weights) {
            *share = w / total;
        }
        Ok(Self(shares))
    }

    /// Household consumption with morning and evening peaks
    pub fn reference_consumption() -> Self {
        Self::from_weights_unchecked(&[
            5.0, 4.0, 3.0, 3.0, 4.0, 5.0, 8.0, 10.0, 12.0, 10.0, 8.0, 5.0, 5.0, 4.0, 3.0, 3.0, 4.0, 5.0, 8.0,
            10.0, 12.0, 10.0, 8.0, 5.0,
        ])
    }

    /// Solar generation centred on late morning
    pub fn reference_generation() -> Self {
        Self::from_weights_unchecked(&[
            0.0, 0.0, 0.0, 0.0, 2.0, 5.0, 10.0, 15.0, 20.0, 20.0, 15.0, 10.0, 5.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ])
    }

    fn from_weights_unchecked(weights: &[f64; HOURS_PER_DAY]) -> Self {
        let total: f64 = weights.iter().sum();
        Self(weights.map(|w| w / total))
    }

    /// Spread `daily_kwh` over the day
    pub fn distribute(&self, daily_kwh: f64) -> [f64; HOURS_PER_DAY] {
        self.0.map(|share| share * daily_kwh)
    }

    pub fn shares(&self) -> &[f64; HOURS_PER_DAY] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for HourlyProfile {
    type Error = SizingError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::normalized(&weights)
    }
}

impl From<HourlyProfile> for Vec<f64> {
    fn from(profile: HourlyProfile) -> Self {
        profile.0.to_vec()
    }
}
