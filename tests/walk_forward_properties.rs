use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use walkline::prelude::*;

//geometric random walk starting at 100 with steps of at most `step` percent
fn random_walk(rng: &mut StdRng, n: usize, step: f64, drift: f64) -> TimeSeries {
    let mut value = 100.0;
    let values: Vec<f64> = (0..n)
        .map(|_| {
            let current = value;
            value *= 1.0 + drift + rng.gen_range(-step..step);
            current
        })
        .collect();
    TimeSeries::from_values(&values).unwrap()
}

//momentum with a constant bias added to the forecast
fn biased_model(bias: f64) -> impl Model {
    FnModel::new("biased", move |w: &[f64]| {
        let n = w.len();
        Ok(w[n - 1] + (w[n - 1] - w[n - 2]) + bias)
    })
}

#[test]
fn equity_and_drawdown_are_aligned() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let n = rng.gen_range(30..120);
        let train_window = rng.gen_range(2..20);
        let series = random_walk(&mut rng, n, 0.02, 0.0);
        let config = WalkForwardConfig::new(train_window).with_transaction_cost(0.0005);

        let result = walk_forward_backtest(&series, &MomentumModel::new(1), &config).unwrap();

        assert_eq!(result.equity.len(), n - train_window + 1);
        assert_eq!(result.equity.len(), result.drawdown.len());
        assert_eq!(result.drawdown[0], 0.0);
        assert!(result.drawdown.iter().all(|&d| d <= 0.0));
        assert!(result.equity.iter().all(|e| e.is_finite()));
        assert!(result.metrics.max_drawdown <= 0.0);
    }
}

#[test]
fn drawdown_is_negative_after_a_dip() {
    let series = TimeSeries::from_values(&[10.0, 11.0, 12.0, 9.0, 8.0, 13.0]).unwrap();
    let bullish = FnModel::new("bullish", |w: &[f64]| Ok(w[w.len() - 1] * 1.01));
    let result = walk_forward_backtest(&series, &bullish, &WalkForwardConfig::new(1)).unwrap();

    assert!(max_drawdown(&result.drawdown) < 0.0);
}

#[test]
fn transaction_costs_never_help() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let drift = rng.gen_range(-0.002..0.002);
        let series = random_walk(&mut rng, 150, 0.015, drift);
        let bias = rng.gen_range(-0.5..0.5);
        let model = biased_model(bias);
        let base = WalkForwardConfig::new(rng.gen_range(2..15));

        let frictionless = walk_forward_backtest(&series, &model, &base).unwrap();
        for cost in [0.0001, 0.001, 0.01] {
            let config = base.with_transaction_cost(cost);
            let frictional = walk_forward_backtest(&series, &model, &config).unwrap();
            assert!(
                frictional.metrics.total_return <= frictionless.metrics.total_return + 1e-12,
                "cost {} raised return from {} to {}",
                cost,
                frictionless.metrics.total_return,
                frictional.metrics.total_return
            );
        }
    }
}

#[test]
fn costs_never_help_after_a_wipeout() {
    //short into a tripling move, then long into a doubling one
    let series = TimeSeries::from_values(&[10.0, 30.0, 60.0]).unwrap();
    let short_then_long = FnModel::new("short then long", |w: &[f64]| {
        let last = w[w.len() - 1];
        Ok(if last < 20.0 { last - 1.0 } else { last + 1.0 })
    });

    let base = WalkForwardConfig::new(1);
    let frictionless = walk_forward_backtest(&series, &short_then_long, &base).unwrap();
    let frictional =
        walk_forward_backtest(&series, &short_then_long, &base.with_transaction_cost(0.01))
            .unwrap();

    for result in [&frictionless, &frictional] {
        assert!(result.steps[0].position.is_short());
        assert!(result.steps[1].position.is_long());
        assert_eq!(result.equity, vec![1.0, 0.0, 0.0]);
        assert_eq!(result.drawdown, vec![0.0, -1.0, -1.0]);
        assert_eq!(result.metrics.total_return, -1.0);
        assert!(result.metrics.sharpe_ratio.is_finite());
    }
    assert!(frictional.metrics.total_return <= frictionless.metrics.total_return);
}

#[test]
fn smaller_positions_do_not_beat_full_size_on_profitable_runs() {
    let mut rng = StdRng::seed_from_u64(3);
    let bullish = FnModel::new("bullish", |w: &[f64]| Ok(w[w.len() - 1] + 1.0));

    for _ in 0..20 {
        //strictly rising series so the always-long model profits on every step
        let mut value = 50.0;
        let values: Vec<f64> = (0..80)
            .map(|_| {
                value += rng.gen_range(0.01..2.0);
                value
            })
            .collect();
        let series = TimeSeries::from_values(&values).unwrap();

        let full = walk_forward_backtest(&series, &bullish, &WalkForwardConfig::new(5)).unwrap();
        let half = walk_forward_backtest(
            &series,
            &bullish,
            &WalkForwardConfig::new(5).with_position_size(0.5),
        )
        .unwrap();

        assert!(full.metrics.total_return > 0.0);
        assert!(half.metrics.total_return > 0.0);
        assert!(half.metrics.total_return <= full.metrics.total_return + 1e-12);
    }
}

#[test]
fn compute_drawdown_example() {
    let dd = compute_drawdown(&[1.0, 1.2, 1.1, 1.5, 1.0]);
    assert_eq!(dd[0], 0.0);
    let min = dd.iter().copied().fold(f64::INFINITY, f64::min);
    assert!(min < 0.0);
    assert!((min - (1.0 / 1.5 - 1.0)).abs() < 1e-12);
}

#[test]
fn short_series_is_an_input_error() {
    let series = TimeSeries::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let err = walk_forward_backtest(&series, &MomentumModel::new(2), &WalkForwardConfig::new(10))
        .unwrap_err();
    assert_eq!(err, BacktestError::InsufficientData { needed: 11, got: 5 });
}

#[test]
fn built_in_models_run_end_to_end() {
    let mut rng = StdRng::seed_from_u64(21);
    let series = random_walk(&mut rng, 250, 0.02, 0.0005);
    let config = WalkForwardConfig::new(30).with_transaction_cost(0.0005);

    let models: Vec<Box<dyn Model>> = vec![
        Box::new(MomentumModel::new(10)),
        Box::new(SmaReversionModel::new(20)),
        Box::new(RsiReversionModel::default()),
    ];

    for model in &models {
        let result = walk_forward_backtest(&series, model.as_ref(), &config).unwrap();
        assert_eq!(result.steps.len(), 220);
        assert!(result.metrics.exposure >= 0.0 && result.metrics.exposure <= 1.0);
        assert!(result.metrics.total_costs >= 0.0);
    }
}
