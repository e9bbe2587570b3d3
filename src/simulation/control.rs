use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::SizingError;

/// Cancellation and deadline polled once per simulation step
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl RunControl {
    /// No cancellation, no deadline
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn check(&self, step: usize) -> Result<(), SizingError> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(SizingError::Cancelled { step });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SizingError::Cancelled { step });
        }
        Ok(())
    }
}
