use crate::error::SizingError;

/// Borehole count needed so that each borehole stays within its allowable load.
///
/// `n = ceil(|peak_ground_load| / |allowable_per_borehole| · safety_factor)`,
/// never less than one.
pub fn estimate_borehole_count(
    peak_ground_load_w: f64,
    allowable_per_borehole_w: f64,
    safety_factor: f64,
) -> Result<u32, SizingError> {
    if !peak_ground_load_w.is_finite() {
        return Err(SizingError::domain("peak ground load", peak_ground_load_w));
    }
    if !allowable_per_borehole_w.is_finite() || allowable_per_borehole_w == 0.0 {
        return Err(SizingError::invalid(
            "allowable_per_borehole_w",
            allowable_per_borehole_w,
            "must be finite and non-zero",
        ));
    }
    if !safety_factor.is_finite() || safety_factor <= 0.0 {
        return Err(SizingError::invalid("safety_factor", safety_factor, "must be positive"));
    }

    let boreholes = (peak_ground_load_w.abs() / allowable_per_borehole_w.abs() * safety_factor).ceil();
    if boreholes > u32::MAX as f64 {
        return Err(SizingError::domain("borehole count", boreholes));
    }
    Ok((boreholes as u32).max(1))
}
