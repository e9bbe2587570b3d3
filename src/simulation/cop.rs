//! # Heat Pump COP Curve
//!
//! Linear fit of manufacturer COP against source water temperature:
//!
//! cop = m·T_w[°C] + c,  m = 1.3/15, c = 3.75
//!
//! The fit is only meaningful over the manufacturer's test range. Far outside
//! it the line drops below 1 and eventually below 0, which would make the
//! ground-load conversion non-physical. [`CopLimit`] makes the handling of
//! that region explicit.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SizingError};

const KELVIN_OFFSET: f64 = 273.15;

/// What to do when the linear fit drops below a physical floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CopLimit {
    /// Use the raw fit. Values ≤ 0 still fail the ground-load conversion.
    Unclamped,
    /// Hold the COP at `floor`
    Clamp { floor: f64 },
    /// Abort the run with a numeric domain error
    Reject { floor: f64 },
}

impl Default for CopLimit {
    fn default() -> Self {
        CopLimit::Clamp { floor: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopModel {
    pub slope_per_k: f64,
    pub intercept: f64,
    pub limit: CopLimit,
}

impl Default for CopModel {
    fn default() -> Self {
        Self {
            slope_per_k: 1.3 / 15.0,
            intercept: 3.75,
            limit: CopLimit::default(),
        }
    }
}

impl CopModel {
    pub fn with_limit(mut self, limit: CopLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Unlimited linear fit
    pub fn raw_cop(&self, outlet_temp_k: f64) -> f64 {
        self.slope_per_k * (outlet_temp_k - KELVIN_OFFSET) + self.intercept
    }

    /// COP at the given heat pump inlet temperature, with the limit policy applied
    pub fn cop(&self, outlet_temp_k: f64) -> Result<f64, SizingError> {
        if !outlet_temp_k.is_finite() {
            return Err(SizingError::domain("outlet temperature", outlet_temp_k));
        }
        let raw = self.raw_cop(outlet_temp_k);
        match self.limit {
            CopLimit::Unclamped => Ok(raw),
            CopLimit::Clamp { floor } => Ok(raw.max(floor)),
            CopLimit::Reject { floor } if raw < floor => Err(SizingError::domain("cop", raw)),
            CopLimit::Reject { .. } => Ok(raw),
        }
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        if !self.slope_per_k.is_finite() {
            return Err(SizingError::invalid("cop.slope_per_k", self.slope_per_k, "must be finite"));
        }
        if !self.intercept.is_finite() {
            return Err(SizingError::invalid("cop.intercept", self.intercept, "must be finite"));
        }
        match self.limit {
            CopLimit::Unclamped => Ok(()),
            CopLimit::Clamp { floor } | CopLimit::Reject { floor } => ensure_positive("cop.limit.floor", floor),
        }
    }
}
