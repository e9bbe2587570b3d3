/// Circulating-fluid temperature leaving the borehole (K).
///
/// `T_w = T_interface − Q_ground · R_total`, with `Q_ground` positive for
/// extraction: the fluid runs colder than the wall while heat flows in.
pub fn outlet_temperature_k(interface_temp_k: f64, ground_load_w: f64, total_resistance_k_per_w: f64) -> f64 {
    interface_temp_k - ground_load_w * total_resistance_k_per_w
}
