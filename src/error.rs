use thiserror::Error;

/// Errors raised while configuring or running a sizing model
#[derive(Debug, Error)]
pub enum SizingError {
    /// Rejected before any simulation step runs
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A step produced a value outside the domain of the next computation.
    /// The run is aborted and no partial result is returned.
    #[error("Numeric domain error at step {}: {quantity} = {value}", step_label(.step))]
    NumericDomain {
        step: Option<usize>,
        quantity: &'static str,
        value: f64,
    },

    #[error("Run cancelled at step {step}")]
    Cancelled { step: usize },

    #[error("Configuration load failed: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SizingError {
    pub fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        SizingError::InvalidConfig {
            field,
            value,
            reason,
        }
    }

    pub fn domain(quantity: &'static str, value: f64) -> Self {
        SizingError::NumericDomain {
            step: None,
            quantity,
            value,
        }
    }

    /// Attach the simulation step index to a numeric domain error
    pub fn at_step(self, index: usize) -> Self {
        match self {
            SizingError::NumericDomain {
                step: None,
                quantity,
                value,
            } => SizingError::NumericDomain {
                step: Some(index),
                quantity,
                value,
            },
            other => other,
        }
    }
}

impl From<figment::Error> for SizingError {
    fn from(err: figment::Error) -> Self {
        SizingError::Config(Box::new(err))
    }
}

fn step_label(step: &Option<usize>) -> String {
    match step {
        Some(i) => i.to_string(),
        None => "-".to_string(),
    }
}

/// Require a finite, strictly positive value
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), SizingError> {
    if !value.is_finite() {
        return Err(SizingError::invalid(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(SizingError::invalid(field, value, "must be positive"));
    }
    Ok(())
}

/// Longest run accepted. The full-history kernel costs O(n²) per run.
pub const MAX_TIME_STEPS: usize = 200_000;

/// Require `duration_s / time_step_s` to be a step count a run can hold
pub(crate) fn ensure_step_count(field: &'static str, duration_s: f64, time_step_s: f64) -> Result<(), SizingError> {
    let steps = (duration_s / time_step_s).floor();
    if !steps.is_finite() || steps > MAX_TIME_STEPS as f64 {
        return Err(SizingError::invalid(field, time_step_s, "too many steps for the run duration"));
    }
    Ok(())
}

/// Require a finite, non-negative value
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), SizingError> {
    if !value.is_finite() {
        return Err(SizingError::invalid(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(SizingError::invalid(field, value, "cannot be negative"));
    }
    Ok(())
}
