use crate::metrics::timeseries::{calculate_returns, max_drawdown, EquityPoint};
use crate::portfolio::StepRecord;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a walk-forward run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub num_steps: usize,
    pub num_trades: usize,
    pub win_rate: f64,
    pub exposure: f64,
    pub total_costs: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the equity curve and step log
    pub fn from_backtest(
        equity_curve: &[EquityPoint],
        steps: &[StepRecord],
        num_trades: usize,
        initial_equity: f64,
    ) -> Self {
        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_equity);

        let total_return = final_equity / initial_equity - 1.0;

        //calculate cagr
        let cagr = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) if equity_curve.len() >= 2 => {
                let duration_days = (last.timestamp - first.timestamp).num_days() as f64;
                let years = duration_days / 365.25;

                if years > 0.0 && final_equity > 0.0 {
                    (final_equity / initial_equity).powf(1.0 / years) - 1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        let drawdowns: Vec<f64> = equity_curve.iter().map(|p| p.drawdown).collect();
        let max_dd = max_drawdown(&drawdowns);

        let equity_values: Vec<f64> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = calculate_returns(&equity_values);

        let sharpe = calculate_sharpe_ratio(&returns);
        let sortino = calculate_sortino_ratio(&returns);

        let in_market: Vec<&StepRecord> =
            steps.iter().filter(|s| !s.position.is_flat()).collect();

        let exposure = if steps.is_empty() {
            0.0
        } else {
            in_market.len() as f64 / steps.len() as f64
        };

        let win_rate = if in_market.is_empty() {
            0.0
        } else {
            in_market.iter().filter(|s| s.net_return > 0.0).count() as f64
                / in_market.len() as f64
        };

        let total_costs = steps.iter().map(|s| s.cost).sum();

        SummaryMetrics {
            initial_equity,
            final_equity,
            total_return,
            cagr,
            max_drawdown: max_dd,
            sharpe_ratio: sharpe,
            sortino_ratio: sortino,
            num_steps: steps.len(),
            num_trades,
            win_rate,
            exposure,
            total_costs,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial Equity", format!("{:.4}", self.initial_equity)),
            ("Final Equity", format!("{:.4}", self.final_equity)),
            ("Total Return", format!("{:.2}%", self.total_return * 100.0)),
            ("CAGR", format!("{:.2}%", self.cagr * 100.0)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Sortino Ratio", format!("{:.3}", self.sortino_ratio)),
            ("Steps", format!("{}", self.num_steps)),
            ("Position Changes", format!("{}", self.num_trades)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Exposure", format!("{:.2}%", self.exposure * 100.0)),
            ("Total Costs", format!("{:.4}", self.total_costs)),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table.printstd();
    }
}

fn calculate_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    //annualize assuming daily returns
    (mean / std_dev) * (252.0_f64).sqrt()
}

fn calculate_sortino_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.mean();

    //downside deviation (only negative returns)
    let negative_returns: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).copied().collect();

    //not enough losing steps to measure downside deviation
    if negative_returns.len() < 2 {
        return 0.0;
    }

    let downside_dev = negative_returns.std_dev();

    if downside_dev == 0.0 {
        return 0.0;
    }

    //annualize
    (mean / downside_dev) * (252.0_f64).sqrt()
}
