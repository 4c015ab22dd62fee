use crate::strategy::{last_value, Model, ModelError};

//momentum model
//extrapolates the average per-step drift of the last `lookback` points
#[derive(Debug, Clone)]
pub struct MomentumModel {
    lookback: usize,
}

impl MomentumModel {
    pub fn new(lookback: usize) -> Self {
        MomentumModel {
            lookback: lookback.max(1),
        }
    }
}

impl Default for MomentumModel {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Model for MomentumModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        let last = last_value(window)?;

        if window.len() < self.lookback + 1 {
            return Err(ModelError::InsufficientHistory {
                needed: self.lookback + 1,
                got: window.len(),
            });
        }

        let start = window[window.len() - self.lookback - 1];
        let drift = (last - start) / self.lookback as f64;

        Ok(last + drift)
    }

    fn name(&self) -> &str {
        "Momentum"
    }
}
