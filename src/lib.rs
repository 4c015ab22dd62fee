//walk-forward backtesting and swing/trendline detection over price series

pub mod chart;
pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::chart::{
        detect_support_resistance, detect_swings, detect_trendlines_ransac, fit_trendline,
        ChartError, LineFit, RansacConfig, SwingPoints, Trendline, TrendlineReport,
    };
    pub use crate::config::{ModelParams, ModelType, RunConfiguration, TrendlineConfig};
    pub use crate::data::{load_csv, SeriesError, SeriesPoint, TimeSeries};
    pub use crate::engine::{
        sweep_train_windows, walk_forward_backtest, BacktestError, BacktestResult,
        WalkForwardConfig, WalkForwardEngine,
    };
    pub use crate::metrics::{
        calculate_equity_curve, compute_drawdown, max_drawdown, EquityPoint, SummaryMetrics,
    };
    pub use crate::portfolio::{Account, Direction, Position, StepRecord};
    pub use crate::strategy::{
        momentum::MomentumModel, rsi_reversion::RsiReversionModel,
        sma_reversion::SmaReversionModel, FnModel, Model, ModelError,
    };
}
