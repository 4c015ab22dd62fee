use crate::strategy::{last_value, rsi, Model, ModelError};

//rsi mean reversion model
//oversold windows forecast a bounce, overbought windows forecast a pullback
//in the neutral zone the forecast equals the last value (no position)
#[derive(Debug, Clone)]
pub struct RsiReversionModel {
    lookback: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiReversionModel {
    pub fn new(lookback: usize, oversold: f64, overbought: f64) -> Self {
        RsiReversionModel {
            lookback: lookback.max(1),
            oversold,
            overbought,
        }
    }
}

impl Default for RsiReversionModel {
    //standard parameters
    fn default() -> Self {
        Self::new(14, 30.0, 70.0)
    }
}

impl Model for RsiReversionModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        let last = last_value(window)?;

        let rsi_value = rsi(window, self.lookback).ok_or(ModelError::InsufficientHistory {
            needed: self.lookback + 1,
            got: window.len(),
        })?;

        //forecast magnitude is the average absolute move over the lookback
        let recent = &window[window.len() - self.lookback - 1..];
        let avg_move = recent
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum::<f64>()
            / self.lookback as f64;

        let forecast = if rsi_value < self.oversold {
            last + avg_move
        } else if rsi_value > self.overbought {
            last - avg_move
        } else {
            last
        };

        Ok(forecast)
    }

    fn name(&self) -> &str {
        "RSI Reversion"
    }
}
