pub mod sweep;
pub mod walk_forward;

pub use sweep::sweep_train_windows;
pub use walk_forward::{
    walk_forward_backtest, BacktestError, BacktestResult, WalkForwardConfig, WalkForwardEngine,
};
