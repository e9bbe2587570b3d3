use super::{FieldStep, GroundFieldSolver, RadialTemperatureField};
use crate::error::SizingError;
use crate::simulation::LineSourceKernel;

/// Evaluates the soil line-source response at every mesh radius each step
pub struct AnalyticalField {
    kernel: LineSourceKernel,
    undisturbed_k: f64,
    field: RadialTemperatureField,
}

impl AnalyticalField {
    pub fn new(kernel: LineSourceKernel, undisturbed_k: f64, field: RadialTemperatureField) -> Self {
        Self {
            kernel,
            undisturbed_k,
            field,
        }
    }
}

impl GroundFieldSolver for AnalyticalField {
    fn advance(&mut self, step: &FieldStep<'_>) -> Result<(), SizingError> {
        let temperatures = self
            .field
            .radii_m
            .iter()
            .map(|&r| {
                self.kernel
                    .delta_t_k(r, step.time_step_s, step.index, step.history)
                    .map(|dt| self.undisturbed_k + dt)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.field.temperatures_k = temperatures;
        Ok(())
    }

    fn field(&self) -> &RadialTemperatureField {
        &self.field
    }
}
