//! # Battery Energy Storage Sizing
//!
//! Sizes a battery bank from monthly consumption and generation totals. Each
//! month is reduced to one representative day, spread over 24 hourly buckets
//! by fixed shape profiles, and simulated from an empty battery. Energy the
//! battery cannot supply is the storage shortfall for that month.
//!
//! ## Sizing
//!
//! ```text
//! adjusted = shortfall / (DoD · η) · (1 + margin)
//! units    = ceil(adjusted / usable_unit_capacity)
//! ```
//!
//! The installed bank is the largest monthly unit count.

pub mod profile;
pub mod sizing;

pub use profile::{HourlyProfile, HOURS_PER_DAY};
pub use sizing::{size_storage, BatteryUnit, BessInputs, BessSizing, MonthlyEnergy, MonthlyStorageRow};
