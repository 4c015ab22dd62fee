pub mod swing;
pub mod trendline;

pub use swing::{detect_swings, SwingPoints};
pub use trendline::{detect_trendlines_ransac, fit_trendline, LineFit, RansacConfig, Trendline};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Swing window must be at least 1, got {0}")]
    InvalidWindow(usize),
    #[error("Non-finite value {value} at index {index}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error("x has {xs} points but y has {ys}")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("Need at least {needed} points, got {got}")]
    InsufficientPoints { needed: usize, got: usize },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub(crate) fn check_finite(values: &[f64]) -> Result<(), ChartError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ChartError::NonFiniteValue {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

//swings plus the support and resistance lines fitted through them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendlineReport {
    pub swings: SwingPoints,

    //lines through swing lows, `support` holds series indices
    pub support: Vec<Trendline>,

    //lines through swing highs, `support` holds series indices
    pub resistance: Vec<Trendline>,
}

//detects swings, then fits support lines through the lows and resistance lines
//through the highs, using the series index as x
pub fn detect_support_resistance(
    values: &[f64],
    swing_window: usize,
    config: &RansacConfig,
) -> Result<TrendlineReport, ChartError> {
    config.validate()?;
    let swings = detect_swings(values, swing_window)?;

    let support = fit_through(values, &swings.lows, config)?;
    let resistance = fit_through(values, &swings.highs, config)?;

    tracing::info!(
        lows = swings.lows.len(),
        highs = swings.highs.len(),
        support = support.len(),
        resistance = resistance.len(),
        "trendline detection finished"
    );

    Ok(TrendlineReport {
        swings,
        support,
        resistance,
    })
}

fn fit_through(
    values: &[f64],
    indices: &[usize],
    config: &RansacConfig,
) -> Result<Vec<Trendline>, ChartError> {
    if indices.len() < 2 {
        return Ok(Vec::new());
    }

    let xs: Vec<f64> = indices.iter().map(|&i| i as f64).collect();
    let ys: Vec<f64> = indices.iter().map(|&i| values[i]).collect();

    let mut lines = detect_trendlines_ransac(&xs, &ys, config)?;
    for line in &mut lines {
        line.support = line.support.iter().map(|&p| indices[p]).collect();
    }
    Ok(lines)
}
