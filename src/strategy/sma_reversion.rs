use crate::strategy::{sma, Model, ModelError};

//sma mean reversion model
//forecasts that the next value reverts to the moving average of the last `lookback` points
#[derive(Debug, Clone)]
pub struct SmaReversionModel {
    lookback: usize,
}

impl SmaReversionModel {
    pub fn new(lookback: usize) -> Self {
        SmaReversionModel {
            lookback: lookback.max(1),
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }
}

impl Default for SmaReversionModel {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Model for SmaReversionModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        if window.len() < self.lookback {
            return Err(ModelError::InsufficientHistory {
                needed: self.lookback,
                got: window.len(),
            });
        }

        let recent = &window[window.len() - self.lookback..];
        sma(recent).ok_or(ModelError::InsufficientHistory {
            needed: self.lookback,
            got: 0,
        })
    }

    fn name(&self) -> &str {
        "SMA Reversion"
    }
}
