pub mod momentum;
pub mod rsi_reversion;
pub mod sma_reversion;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model needs at least {needed} points, window has {got}")]
    InsufficientHistory { needed: usize, got: usize },
    #[error("Model failed: {0}")]
    Failed(String),
}

//prediction interface every model implements
//given a training window, returns the forecast for the value right after it
pub trait Model: Send + Sync {
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError>;

    //returns the model name
    fn name(&self) -> &str;
}

//adapts a plain closure into a model
pub struct FnModel<F> {
    name: String,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&[f64]) -> Result<f64, ModelError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnModel {
            name: name.into(),
            f,
        }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(&[f64]) -> Result<f64, ModelError> + Send + Sync,
{
    fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        (self.f)(window)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

//helper function to calculate relative strength index
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let avg_gain: f64 = gains.iter().rev().take(period).sum::<f64>() / period as f64;
    let avg_loss: f64 = losses.iter().rev().take(period).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

//returns the last value of a window or an error for an empty one
pub(crate) fn last_value(window: &[f64]) -> Result<f64, ModelError> {
    window
        .last()
        .copied()
        .ok_or(ModelError::InsufficientHistory { needed: 1, got: 0 })
}
