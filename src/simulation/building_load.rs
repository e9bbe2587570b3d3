//! # Building Load Profile
//!
//! Instantaneous heating demand as a function of time since 00:00 on 1 January.
//! The reference profile is a quadratic fitted to monthly domestic heating
//! demand for the reference block of flats:
//!
//! Q_b(t) = a·(b - t)² + c,  t reduced modulo one year

use serde::{Deserialize, Serialize};

/// One year as used throughout the thermal model (365.2 days)
pub const SECONDS_IN_YEAR: f64 = 3600.0 * 24.0 * 365.2;

/// Maps elapsed time (s) to building load (W), positive = heat demand
pub trait BuildingLoadModel: Send + Sync {
    fn load_w(&self, t_s: f64) -> f64;
}

/// Periodic annual quadratic load curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticAnnualLoad {
    /// Curvature (W/s²)
    pub a: f64,
    /// Time of minimum demand (s)
    pub b: f64,
    /// Minimum demand (W)
    pub c: f64,
    /// Period (s)
    pub period_s: f64,
}

impl Default for QuadraticAnnualLoad {
    fn default() -> Self {
        Self {
            a: 1.8e-10,
            b: 2.6e6 * 6.0,
            c: 53056.0,
            period_s: SECONDS_IN_YEAR,
        }
    }
}

impl BuildingLoadModel for QuadraticAnnualLoad {
    fn load_w(&self, t_s: f64) -> f64 {
        let t = t_s.rem_euclid(self.period_s);
        self.a * (self.b - t).powi(2) + self.c
    }
}

/// Flat load, mostly useful for idle-system and step-response runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantLoad {
    pub load_w: f64,
}

impl ConstantLoad {
    pub fn new(load_w: f64) -> Self {
        Self { load_w }
    }

    pub fn zero() -> Self {
        Self { load_w: 0.0 }
    }
}

impl BuildingLoadModel for ConstantLoad {
    fn load_w(&self, _t_s: f64) -> f64 {
        self.load_w
    }
}

impl<F> BuildingLoadModel for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn load_w(&self, t_s: f64) -> f64 {
        self(t_s)
    }
}
