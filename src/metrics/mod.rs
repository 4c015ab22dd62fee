pub mod summary;
pub mod timeseries;

pub use summary::SummaryMetrics;
pub use timeseries::{
    calculate_equity_curve, calculate_returns, compute_drawdown, max_drawdown, EquityPoint,
};
