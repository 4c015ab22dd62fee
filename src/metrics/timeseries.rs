use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a point in the equity curve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub drawdown: f64,
    pub returns: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: f64, drawdown: f64, returns: f64) -> Self {
        EquityPoint {
            timestamp,
            equity,
            drawdown,
            returns,
        }
    }
}

//computes the drawdown curve of an equity curve
//each entry is equity / running peak - 1, so every entry is <= 0 and the first is 0
//a nan equity gives a nan entry
pub fn compute_drawdown(equity_curve: &[f64]) -> Vec<f64> {
    let mut drawdown = Vec::with_capacity(equity_curve.len());
    let mut peak = f64::NEG_INFINITY;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }

        let dd = if equity.is_nan() {
            f64::NAN
        } else if peak > 0.0 {
            (equity / peak - 1.0).min(0.0)
        } else {
            0.0
        };
        drawdown.push(dd);
    }

    drawdown
}

//builds timestamped equity points with drawdowns and step returns
pub fn calculate_equity_curve(
    timestamps: &[DateTime<Utc>],
    equity_values: &[f64],
) -> Vec<EquityPoint> {
    let drawdowns = compute_drawdown(equity_values);
    let mut curve = Vec::with_capacity(timestamps.len());
    let mut prev_equity = None;

    for ((&timestamp, &equity), &drawdown) in timestamps
        .iter()
        .zip(equity_values.iter())
        .zip(drawdowns.iter())
    {
        let returns = match prev_equity {
            Some(prev) if prev != 0.0 => equity / prev - 1.0,
            _ => 0.0,
        };

        curve.push(EquityPoint::new(timestamp, equity, drawdown, returns));
        prev_equity = Some(equity);
    }

    curve
}

//most negative entry of a drawdown curve (0 when empty, nan if any entry is nan)
pub fn max_drawdown(drawdown: &[f64]) -> f64 {
    if drawdown.iter().any(|d| d.is_nan()) {
        return f64::NAN;
    }
    drawdown.iter().copied().fold(0.0, f64::min)
}

//calculates returns from equity values
//steps out of zero equity (a ruined account) return 0
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    equity_values
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                0.0
            } else {
                (pair[1] - pair[0]) / pair[0]
            }
        })
        .collect()
}
