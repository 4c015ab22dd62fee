use crate::data::TimeSeries;
use crate::metrics::{calculate_equity_curve, compute_drawdown, EquityPoint, SummaryMetrics};
use crate::portfolio::{Account, Direction, Position, StepRecord};
use crate::strategy::{Model, ModelError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const INITIAL_EQUITY: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Series has {got} points, walk-forward needs at least {needed}")]
    InsufficientData { needed: usize, got: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Model returned non-finite prediction {value} at step {step}")]
    NonFinitePrediction { step: usize, value: f64 },
    #[error("Last window value at index {index} is zero, step return is undefined")]
    ZeroBaseValue { index: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

//configuration for a walk-forward run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkForwardConfig {
    //number of points handed to the model per step
    pub train_window: usize,

    //cost charged per unit of position change (0.001 = 10 bps)
    pub transaction_cost: f64,

    //exposure multiplier applied to the directional position
    pub position_size: f64,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        WalkForwardConfig {
            train_window: 20,
            transaction_cost: 0.0,
            position_size: 1.0,
        }
    }
}

impl WalkForwardConfig {
    pub fn new(train_window: usize) -> Self {
        WalkForwardConfig {
            train_window,
            ..Default::default()
        }
    }

    pub fn with_transaction_cost(mut self, transaction_cost: f64) -> Self {
        self.transaction_cost = transaction_cost;
        self
    }

    pub fn with_position_size(mut self, position_size: f64) -> Self {
        self.position_size = position_size;
        self
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.train_window == 0 {
            return Err(BacktestError::InvalidConfig(
                "train_window must be at least 1".to_string(),
            ));
        }

        if !self.transaction_cost.is_finite() || self.transaction_cost < 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "transaction_cost must be a non-negative number, got {}",
                self.transaction_cost
            )));
        }

        if !self.position_size.is_finite() || self.position_size <= 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "position_size must be positive, got {}",
                self.position_size
            )));
        }

        Ok(())
    }
}

//result of a walk-forward run
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    //compounded equity, baseline first
    pub equity: Vec<f64>,
    //aligned with `equity`
    pub drawdown: Vec<f64>,
    pub metrics: SummaryMetrics,
    pub equity_curve: Vec<EquityPoint>,
    pub steps: Vec<StepRecord>,
}

//walk-forward engine
//slides a fixed training window over the series, asks the model for the next value
//and trades the predicted direction one step ahead
pub struct WalkForwardEngine {
    config: WalkForwardConfig,
}

impl WalkForwardEngine {
    pub fn new(config: WalkForwardConfig) -> Self {
        WalkForwardEngine { config }
    }

    pub fn config(&self) -> &WalkForwardConfig {
        &self.config
    }

    //runs the walk-forward evaluation of `model` over `series`
    pub fn run(
        &self,
        series: &TimeSeries,
        model: &dyn Model,
    ) -> Result<BacktestResult, BacktestError> {
        self.config.validate()?;

        let train_window = self.config.train_window;
        let needed = train_window + 1;
        if series.len() < needed {
            return Err(BacktestError::InsufficientData {
                needed,
                got: series.len(),
            });
        }

        info!(
            model = model.name(),
            points = series.len(),
            train_window,
            transaction_cost = self.config.transaction_cost,
            position_size = self.config.position_size,
            "starting walk-forward run"
        );

        let values = series.values();
        let mut account = Account::new(INITIAL_EQUITY, self.config.transaction_cost);

        for (step, index) in (train_window..values.len()).enumerate() {
            let window = &values[index - train_window..index];
            let last_value = window[train_window - 1];
            let actual = values[index];

            let prediction = model.predict(window)?;
            if !prediction.is_finite() {
                return Err(BacktestError::NonFinitePrediction {
                    step,
                    value: prediction,
                });
            }

            if last_value == 0.0 {
                return Err(BacktestError::ZeroBaseValue {
                    index: index - 1,
                });
            }

            let direction = Direction::from_forecast(prediction, last_value);
            let position = Position::new(direction, self.config.position_size);

            if position != account.position {
                debug!(step, index, ?direction, "position change");
            }

            account.apply_step(index, prediction, last_value, actual, position);
        }

        let result = self.build_result(series, &account);

        info!(
            steps = result.metrics.num_steps,
            total_return = result.metrics.total_return,
            max_drawdown = result.metrics.max_drawdown,
            "walk-forward run finished"
        );

        Ok(result)
    }

    fn build_result(&self, series: &TimeSeries, account: &Account) -> BacktestResult {
        let equity = account.equity_values();
        let drawdown = compute_drawdown(&equity);

        //baseline sits on the last point of the first training window
        let timestamps = &series.timestamps()[self.config.train_window - 1..];
        let equity_curve = calculate_equity_curve(timestamps, &equity);

        let metrics = SummaryMetrics::from_backtest(
            &equity_curve,
            &account.step_log,
            account.num_position_changes(),
            INITIAL_EQUITY,
        );

        BacktestResult {
            equity,
            drawdown,
            metrics,
            equity_curve,
            steps: account.step_log.clone(),
        }
    }
}

//runs a walk-forward backtest with the given configuration
pub fn walk_forward_backtest(
    series: &TimeSeries,
    model: &dyn Model,
    config: &WalkForwardConfig,
) -> Result<BacktestResult, BacktestError> {
    WalkForwardEngine::new(*config).run(series, model)
}
