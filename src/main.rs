use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use walkline::prelude::*;

#[derive(Parser)]
#[command(name = "walkline")]
#[command(about = "Walk-forward backtesting and trendline detection", long_about = None)]
struct Cli {
    //increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

//options shared by every subcommand
#[derive(Args)]
struct DataArgs {
    //path to csv data file
    #[arg(long)]
    data: Option<PathBuf>,

    //symbol to keep when the csv holds several
    #[arg(long)]
    symbol: Option<String>,

    //json run configuration, flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

//walk-forward options
#[derive(Args)]
struct ModelArgs {
    //model type (momentum, sma, rsi)
    #[arg(long)]
    model: Option<String>,

    //model lookback
    #[arg(long)]
    lookback: Option<usize>,

    //rsi oversold threshold
    #[arg(long)]
    oversold: Option<f64>,

    //rsi overbought threshold
    #[arg(long)]
    overbought: Option<f64>,

    //cost per unit of position change (0.001 = 10 bps)
    #[arg(long)]
    transaction_cost: Option<f64>,

    //exposure multiplier
    #[arg(long)]
    position_size: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    //run a walk-forward backtest
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        //points handed to the model per step
        #[arg(long)]
        train_window: Option<usize>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for the full result as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },

    //compare several train windows
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        //comma separated train windows (eg 10,20,40)
        #[arg(long, value_delimiter = ',', required = true)]
        windows: Vec<usize>,
    },

    //detect swings and support/resistance trendlines
    Trendlines {
        #[command(flatten)]
        data: DataArgs,

        //points on each side of a swing
        #[arg(long)]
        swing_window: Option<usize>,

        //maximum lines per side
        #[arg(long)]
        max_lines: Option<usize>,

        //inlier distance
        #[arg(long)]
        threshold: Option<f64>,

        //minimum inliers per line
        #[arg(long)]
        min_support: Option<usize>,

        //candidate pairs per line
        #[arg(long)]
        max_trials: Option<usize>,

        //sampling seed
        #[arg(long)]
        seed: Option<u64>,

        //output path for the report as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Backtest {
            data,
            model,
            train_window,
            output_equity_csv,
            output_json,
        } => {
            let mut config = load_config(&data)?;
            apply_model_args(&mut config, &model)?;
            if let Some(train_window) = train_window {
                config.walk_forward.train_window = train_window;
            }
            if output_equity_csv.is_some() {
                config.output_equity_csv = output_equity_csv;
            }
            if output_json.is_some() {
                config.output_json = output_json;
            }
            run_backtest(&config)?;
        }
        Commands::Sweep {
            data,
            model,
            windows,
        } => {
            let mut config = load_config(&data)?;
            apply_model_args(&mut config, &model)?;
            run_sweep(&config, &windows)?;
        }
        Commands::Trendlines {
            data,
            swing_window,
            max_lines,
            threshold,
            min_support,
            max_trials,
            seed,
            output_json,
        } => {
            let mut config = load_config(&data)?;
            let trendline = &mut config.trendline;
            if let Some(swing_window) = swing_window {
                trendline.swing_window = swing_window;
            }
            if let Some(max_lines) = max_lines {
                trendline.ransac.max_lines = max_lines;
            }
            if let Some(threshold) = threshold {
                trendline.ransac.threshold = threshold;
            }
            if let Some(min_support) = min_support {
                trendline.ransac.min_support = min_support;
            }
            if let Some(max_trials) = max_trials {
                trendline.ransac.max_trials = max_trials;
            }
            if let Some(seed) = seed {
                trendline.ransac.seed = seed;
            }
            if output_json.is_some() {
                config.output_json = output_json;
            }
            run_trendlines(&config)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(args: &DataArgs) -> Result<RunConfiguration> {
    let mut config = match &args.config {
        Some(path) => RunConfiguration::from_json_file(path)?,
        None => RunConfiguration::default(),
    };

    if args.data.is_some() {
        config.data_path = args.data.clone();
    }
    if args.symbol.is_some() {
        config.symbol = args.symbol.clone();
    }

    Ok(config)
}

fn apply_model_args(config: &mut RunConfiguration, args: &ModelArgs) -> Result<()> {
    if let Some(name) = &args.model {
        config.model =
            ModelType::parse(name).ok_or_else(|| anyhow::anyhow!("Unknown model: {}", name))?;
    }
    if let Some(lookback) = args.lookback {
        config.model_params.lookback = lookback;
    }
    if let Some(oversold) = args.oversold {
        config.model_params.oversold = oversold;
    }
    if let Some(overbought) = args.overbought {
        config.model_params.overbought = overbought;
    }
    if let Some(cost) = args.transaction_cost {
        config.walk_forward.transaction_cost = cost;
    }
    if let Some(size) = args.position_size {
        config.walk_forward.position_size = size;
    }
    Ok(())
}

fn load_series(config: &RunConfiguration) -> Result<TimeSeries> {
    let path = config
        .data_path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("--data (or data_path in the config) is required"))?;

    println!("Loading data from {:?}...", path);
    let series = load_csv(path, config.symbol.as_deref())
        .context(format!("Failed to load data from {:?}", path))?;

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        anyhow::bail!("No data found in {:?}", path);
    };

    println!("Loaded {} points", series.len());
    println!("Date range: {} to {}\n", first.timestamp, last.timestamp);

    Ok(series)
}

fn run_backtest(config: &RunConfiguration) -> Result<()> {
    println!("Walkline Walk-Forward Backtest");
    println!("==============================\n");

    let series = load_series(config)?;
    let model = config.build_model();
    let wf = &config.walk_forward;

    println!("Model: {}", model.name());
    println!("Train window: {}", wf.train_window);
    println!("Transaction cost: {}", wf.transaction_cost);
    println!("Position size: {}\n", wf.position_size);

    let result = walk_forward_backtest(&series, model.as_ref(), wf)?;

    println!("Backtest Results");
    println!("================\n");
    result.metrics.pretty_print_table();

    if let Some(path) = &config.output_equity_csv {
        save_equity_csv(&result.equity_curve, path)?;
        println!("\nEquity curve saved to {:?}", path);
    }

    if let Some(path) = &config.output_json {
        save_json(&result, path)?;
        println!("Result saved to {:?}", path);
    }

    Ok(())
}

fn run_sweep(config: &RunConfiguration, windows: &[usize]) -> Result<()> {
    println!("Walkline Train Window Sweep");
    println!("===========================\n");

    let series = load_series(config)?;
    let model = config.build_model();
    println!("Model: {}\n", model.name());

    let sweep = sweep_train_windows(&series, model.as_ref(), &config.walk_forward, windows);

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Train Window"),
        Cell::new("Total Return"),
        Cell::new("Max Drawdown"),
        Cell::new("Sharpe"),
        Cell::new("Position Changes"),
    ]));

    for (train_window, outcome) in &sweep {
        let cells = match outcome {
            Ok(m) => vec![
                Cell::new(&train_window.to_string()),
                Cell::new(&format!("{:.2}%", m.total_return * 100.0)),
                Cell::new(&format!("{:.2}%", m.max_drawdown * 100.0)),
                Cell::new(&format!("{:.3}", m.sharpe_ratio)),
                Cell::new(&m.num_trades.to_string()),
            ],
            Err(e) => vec![Cell::new(&train_window.to_string()), Cell::new(&e.to_string())],
        };
        table.add_row(Row::new(cells));
    }

    table.printstd();
    Ok(())
}

fn run_trendlines(config: &RunConfiguration) -> Result<()> {
    println!("Walkline Trendline Detection");
    println!("============================\n");

    let series = load_series(config)?;
    let settings = &config.trendline;

    info!(
        swing_window = settings.swing_window,
        seed = settings.ransac.seed,
        "detecting trendlines"
    );
    let report =
        detect_support_resistance(series.values(), settings.swing_window, &settings.ransac)?;

    println!(
        "Swings: {} lows, {} highs\n",
        report.swings.lows.len(),
        report.swings.highs.len()
    );

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Kind"),
        Cell::new("Slope"),
        Cell::new("Intercept"),
        Cell::new("Support"),
        Cell::new("Span"),
        Cell::new("RMS Error"),
    ]));

    let lines = report
        .support
        .iter()
        .map(|l| ("support", l))
        .chain(report.resistance.iter().map(|l| ("resistance", l)));

    for (kind, line) in lines {
        let span = match (line.support.first(), line.support.last()) {
            (Some(first), Some(last)) => format!("{}..{}", first, last),
            _ => String::new(),
        };
        table.add_row(Row::new(vec![
            Cell::new(kind),
            Cell::new(&format!("{:.6}", line.slope)),
            Cell::new(&format!("{:.4}", line.intercept)),
            Cell::new(&line.support_count().to_string()),
            Cell::new(&span),
            Cell::new(&format!("{:.4}", line.error)),
        ]));
    }

    table.printstd();

    if let Some(path) = &config.output_json {
        save_json(&report, path)?;
        println!("\nReport saved to {:?}", path);
    }

    Ok(())
}

fn save_equity_csv(equity_curve: &[EquityPoint], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for point in equity_curve {
        writer.serialize(point)?;
    }

    writer.flush()?;
    Ok(())
}

fn save_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).context(format!("Failed to write {:?}", path))?;
    Ok(())
}
