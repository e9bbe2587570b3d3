use serde::{Deserialize, Serialize};

/// How much load history the line-source kernel re-sums each step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryWindow {
    /// Every step change since t = 0 (exact superposition, O(n²) per run)
    #[default]
    Full,
    /// Approximation: only the most recent `steps` step changes are
    /// superposed individually. Everything older is lumped into a single
    /// step applied at t = 0.
    Truncated { steps: usize },
}

impl HistoryWindow {
    /// First history index summed individually at step `n`
    pub fn first_index(&self, n: usize) -> usize {
        match *self {
            HistoryWindow::Full => 1,
            HistoryWindow::Truncated { steps } => n.saturating_sub(steps).saturating_add(1).max(1),
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, HistoryWindow::Truncated { .. })
    }
}

/// Heat flow into the ground per borehole (W), one sample per time step.
///
/// Entry 0 is the boundary condition (zero load before the run starts).
/// Append-only and owned by a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadHistory {
    samples: Vec<f64>,
}

impl Default for LoadHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadHistory {
    pub fn new() -> Self {
        Self { samples: vec![0.0] }
    }

    pub fn with_capacity(steps: usize) -> Self {
        let mut samples = Vec::with_capacity(steps + 1);
        samples.push(0.0);
        Self { samples }
    }

    pub fn push(&mut self, heat_flow_w: f64) {
        self.samples.push(heat_flow_w);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: the boundary sample is present from construction
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn last(&self) -> f64 {
        self.samples.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_boundary_sample() {
        let history = LoadHistory::new();
        assert_eq!(history.as_slice(), &[0.0]);
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_push_appends() {
        let mut history = LoadHistory::with_capacity(3);
        history.push(1.0);
        history.push(-2.0);
        assert_eq!(history.as_slice(), &[0.0, 1.0, -2.0]);
        assert_eq!(history.last(), -2.0);
    }

    #[test]
    fn test_window_first_index() {
        assert_eq!(HistoryWindow::Full.first_index(100), 1);
        let window = HistoryWindow::Truncated { steps: 10 };
        assert_eq!(window.first_index(100), 91);
        // Short runs are summed exactly
        assert_eq!(window.first_index(5), 1);
        assert!(window.is_approximate());
        assert!(!HistoryWindow::Full.is_approximate());
    }

    #[test]
    fn test_window_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            history: HistoryWindow,
        }
        let full: Wrapper = toml::from_str(r#"history = { kind = "full" }"#).unwrap();
        assert_eq!(full.history, HistoryWindow::Full);
        let truncated: Wrapper = toml::from_str(r#"history = { kind = "truncated", steps = 200 }"#).unwrap();
        assert_eq!(truncated.history, HistoryWindow::Truncated { steps: 200 });
    }
}
