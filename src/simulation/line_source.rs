//! # Infinite Line-Source Ground Response
//!
//! Temperature perturbation at radius `r` after `n` steps, by superposing the
//! response to every step change in the borehole heat flow:
//!
//! ΔT(r, n) = Σⱼ₌₁ⁿ (Q[j] − Q[j−1]) / (4π·k·L) · E₁(r² / (4·α·Δt·(n − j + 1)))
//!
//! where `Q` is the heat flow *into* the ground (W) and `Q[0] = 0`.
//!
//! The full history is re-summed on every call, so a run of `n` steps costs
//! O(n²) exponential-integral evaluations. [`HistoryWindow::Truncated`] bounds
//! the per-call cost at the price of an approximation.

use std::f64::consts::PI;

use crate::domain::HistoryWindow;
use crate::error::{ensure_positive, SizingError};
use crate::utils::exp_integral_e1;

/// Line-source response of one medium around a borehole of length `L`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSourceKernel {
    conductivity_w_per_m_k: f64,
    diffusivity_m2_per_s: f64,
    length_m: f64,
    window: HistoryWindow,
}

impl LineSourceKernel {
    pub fn new(
        conductivity_w_per_m_k: f64,
        diffusivity_m2_per_s: f64,
        length_m: f64,
    ) -> Result<Self, SizingError> {
        ensure_positive("kernel.conductivity_w_per_m_k", conductivity_w_per_m_k)?;
        ensure_positive("kernel.diffusivity_m2_per_s", diffusivity_m2_per_s)?;
        ensure_positive("kernel.length_m", length_m)?;
        Ok(Self {
            conductivity_w_per_m_k,
            diffusivity_m2_per_s,
            length_m,
            window: HistoryWindow::Full,
        })
    }

    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> HistoryWindow {
        self.window
    }

    /// Temperature change (K) at `radius_m` at step `n`.
    ///
    /// `history` must hold at least `n + 1` samples; entries beyond `n` are
    /// ignored.
    pub fn delta_t_k(
        &self,
        radius_m: f64,
        time_step_s: f64,
        n: usize,
        history: &[f64],
    ) -> Result<f64, SizingError> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(SizingError::domain("kernel radius", radius_m));
        }
        if !time_step_s.is_finite() || time_step_s <= 0.0 {
            return Err(SizingError::domain("kernel elapsed time", time_step_s));
        }
        if history.len() <= n {
            return Err(SizingError::domain("load history length", history.len() as f64));
        }

        let scale = 1.0 / (4.0 * PI * self.conductivity_w_per_m_k * self.length_m);
        let r_sq_over_4a = radius_m * radius_m / (4.0 * self.diffusivity_m2_per_s);
        let first = self.window.first_index(n);

        let mut delta_t = 0.0;

        // Step changes older than the window, lumped into one step at t = 0
        if first > 1 {
            let lumped = history[first - 1] - history[0];
            if lumped != 0.0 {
                let elapsed = time_step_s * n as f64;
                delta_t += lumped * scale * exp_integral_e1(r_sq_over_4a / elapsed)?;
            }
        }

        for j in first..=n {
            let step_change = history[j] - history[j - 1];
            if step_change == 0.0 {
                continue;
            }
            let elapsed = time_step_s * (n - j + 1) as f64;
            delta_t += step_change * scale * exp_integral_e1(r_sq_over_4a / elapsed)?;
        }

        Ok(delta_t)
    }
}
