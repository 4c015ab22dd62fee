use crate::data::TimeSeries;
use crate::engine::walk_forward::{BacktestError, WalkForwardConfig, WalkForwardEngine};
use crate::metrics::SummaryMetrics;
use crate::strategy::Model;
use indexmap::IndexMap;
use rayon::prelude::*;

//runs one walk-forward backtest per candidate train window in parallel
//results keep the order of `train_windows`; a repeated window keeps its first position
pub fn sweep_train_windows(
    series: &TimeSeries,
    model: &dyn Model,
    base_config: &WalkForwardConfig,
    train_windows: &[usize],
) -> IndexMap<usize, Result<SummaryMetrics, BacktestError>> {
    let results: Vec<(usize, Result<SummaryMetrics, BacktestError>)> = train_windows
        .par_iter()
        .map(|&train_window| {
            let config = WalkForwardConfig {
                train_window,
                ..*base_config
            };
            let outcome = WalkForwardEngine::new(config)
                .run(series, model)
                .map(|result| result.metrics);
            (train_window, outcome)
        })
        .collect();

    let mut sweep = IndexMap::with_capacity(results.len());
    for (train_window, outcome) in results {
        sweep.entry(train_window).or_insert(outcome);
    }

    tracing::info!(windows = sweep.len(), "train window sweep finished");
    sweep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::momentum::MomentumModel;

    fn trending_series(n: usize) -> TimeSeries {
        let values: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 * 0.5 + (i as f64 * 0.7).sin() * 2.0)
            .collect();
        TimeSeries::from_values(&values).unwrap()
    }

    #[test]
    fn test_sweep_keeps_order_and_errors() {
        let series = trending_series(60);
        let model = MomentumModel::new(3);
        let config = WalkForwardConfig::default();

        let sweep = sweep_train_windows(&series, &model, &config, &[40, 5, 100, 5]);

        let keys: Vec<usize> = sweep.keys().copied().collect();
        assert_eq!(keys, vec![40, 5, 100]);
        assert_eq!(sweep[&5].as_ref().unwrap().num_steps, 55);
        assert_eq!(sweep[&40].as_ref().unwrap().num_steps, 20);
        assert!(matches!(
            sweep[&100],
            Err(BacktestError::InsufficientData { needed: 101, got: 60 })
        ));
    }

    #[test]
    fn test_sweep_matches_single_runs() {
        let series = trending_series(80);
        let model = MomentumModel::new(4);
        let config = WalkForwardConfig::new(10).with_transaction_cost(0.001);

        let sweep = sweep_train_windows(&series, &model, &config, &[10, 20]);
        let single = WalkForwardEngine::new(WalkForwardConfig::new(20).with_transaction_cost(0.001))
            .run(&series, &model)
            .unwrap();

        let swept = sweep[&20].as_ref().unwrap();
        assert!((swept.total_return - single.metrics.total_return).abs() < 1e-12);
    }
}
