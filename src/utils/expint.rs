//! Exponential integral E₁(x) for real x > 0.
//!
//! Power series below x = 1, modified Lentz continued fraction above.

use crate::error::SizingError;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const MAX_ITERATIONS: usize = 200;
const TINY: f64 = 1.0e-300;

/// E₁(x) = ∫ₓ^∞ e^(-t)/t dt
///
/// Fails with a numeric domain error for x ≤ 0 or non-finite x.
pub fn exp_integral_e1(x: f64) -> Result<f64, SizingError> {
    if !x.is_finite() || x <= 0.0 {
        return Err(SizingError::domain("exponential integral argument", x));
    }

    if x > 1.0 {
        continued_fraction(x)
    } else {
        power_series(x)
    }
}

fn power_series(x: f64) -> Result<f64, SizingError> {
    let mut sum = -x.ln() - EULER_GAMMA;
    let mut term = 1.0;

    for k in 1..=MAX_ITERATIONS {
        let k = k as f64;
        term *= -x / k;
        let delta = -term / k;
        sum += delta;
        if delta.abs() < sum.abs() * f64::EPSILON {
            return Ok(sum);
        }
    }

    Err(SizingError::domain("exponential integral series (no convergence)", x))
}

fn continued_fraction(x: f64) -> Result<f64, SizingError> {
    let mut b = x + 1.0;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=MAX_ITERATIONS {
        let i = i as f64;
        let a = -i * i;
        b += 2.0;
        d = 1.0 / (a * d + b);
        c = b + a / c;
        let delta = c * d;
        h *= delta;
        if (delta - 1.0).abs() < 4.0 * f64::EPSILON {
            return Ok(h * (-x).exp());
        }
    }

    Err(SizingError::domain("exponential integral fraction (no convergence)", x))
}
