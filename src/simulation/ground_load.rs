use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::SizingError;

/// Whether the heat pump is delivering heat to, or removing heat from, the building
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OperatingMode {
    #[default]
    Heating,
    Cooling,
}

impl OperatingMode {
    /// Sign that turns a ground load magnitude into the extraction-positive
    /// convention: heating extracts heat, cooling rejects it.
    pub fn extraction_sign(&self) -> f64 {
        match self {
            OperatingMode::Heating => 1.0,
            OperatingMode::Cooling => -1.0,
        }
    }
}

/// Heat exchanged with the ground to serve `building_load_w` at the given COP.
///
/// - Heating: `Q_b·(cop − 1)/cop` (building heat minus compressor work)
/// - Cooling: `Q_b·(cop + 1)/cop` (building heat plus compressor work)
pub fn ground_load_w(building_load_w: f64, cop: f64, mode: OperatingMode) -> Result<f64, SizingError> {
    ensure_valid_cop(cop)?;
    Ok(match mode {
        OperatingMode::Heating => building_load_w * (cop - 1.0) / cop,
        OperatingMode::Cooling => building_load_w * (cop + 1.0) / cop,
    })
}

/// Compressor electrical input `Q_b / cop`
pub fn electrical_power_w(building_load_w: f64, cop: f64) -> Result<f64, SizingError> {
    ensure_valid_cop(cop)?;
    Ok(building_load_w / cop)
}

fn ensure_valid_cop(cop: f64) -> Result<(), SizingError> {
    if !cop.is_finite() || cop <= 0.0 {
        return Err(SizingError::domain("cop", cop));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(OperatingMode::Heating, 1000.0, 4.0, 750.0)]
    #[case(OperatingMode::Cooling, 1000.0, 4.0, 1250.0)]
    #[case(OperatingMode::Heating, 1000.0, 1.0, 0.0)]
    #[case(OperatingMode::Heating, 0.0, 3.5, 0.0)]
    fn test_ground_load(#[case] mode: OperatingMode, #[case] q_b: f64, #[case] cop: f64, #[case] expected: f64) {
        let q_g = ground_load_w(q_b, cop, mode).unwrap();
        assert!((q_g - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-2.0)]
    #[case(f64::NAN)]
    fn test_rejects_non_positive_cop(#[case] cop: f64) {
        assert!(ground_load_w(1000.0, cop, OperatingMode::Heating).is_err());
        assert!(ground_load_w(1000.0, cop, OperatingMode::Cooling).is_err());
        assert!(electrical_power_w(1000.0, cop).is_err());
    }

    #[test]
    fn test_energy_balance() {
        // Heating: building heat = ground heat + electricity
        let (q_b, cop) = (8000.0, 3.2);
        let q_g = ground_load_w(q_b, cop, OperatingMode::Heating).unwrap();
        let p = electrical_power_w(q_b, cop).unwrap();
        assert!((q_g + p - q_b).abs() < 1e-9);

        // Cooling: rejected heat = building heat + electricity
        let q_g = ground_load_w(q_b, cop, OperatingMode::Cooling).unwrap();
        assert!((q_g - p - q_b).abs() < 1e-9);
    }

    #[test]
    fn test_mode_parses_from_str() {
        assert_eq!("heating".parse::<OperatingMode>().unwrap(), OperatingMode::Heating);
        assert_eq!("Cooling".parse::<OperatingMode>().unwrap(), OperatingMode::Cooling);
        assert_eq!(OperatingMode::Cooling.to_string(), "cooling");
        assert!("defrost".parse::<OperatingMode>().is_err());
    }

    proptest! {
        #[test]
        fn prop_heating_ground_load_below_building_load(q_b in 1.0f64..1.0e6, cop in 1.0001f64..20.0) {
            let q_g = ground_load_w(q_b, cop, OperatingMode::Heating).unwrap();
            prop_assert!(q_g < q_b);
            prop_assert!(q_g > 0.0);
        }
    }
}
