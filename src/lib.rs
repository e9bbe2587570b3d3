//! Sizing models for renewable heating and storage installations: a
//! ground-source heat pump borehole field and a battery bank.

pub mod bess;
pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod simulation;
pub mod telemetry;
pub mod utils;

pub use error::SizingError;
