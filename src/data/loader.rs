use crate::data::series::{SeriesPoint, TimeSeries};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    timestamp: String,
    #[serde(alias = "value")]
    close: f64,
    #[serde(default)]
    symbol: Option<String>,
}

//loads a series from a csv file
//expects `timestamp` (rfc3339) and `close` (or `value`) columns, `symbol` is optional
//when a symbol is given, rows for other symbols are skipped
pub fn load_csv<P: AsRef<Path>>(path: P, symbol: Option<&str>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut points = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        if !matches_symbol(record.symbol.as_deref(), symbol) {
            continue;
        }

        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .context(format!(
                "Failed to parse timestamp '{}' at line {}",
                record.timestamp,
                index + 2
            ))?
            .with_timezone(&Utc);

        points.push(SeriesPoint::new(timestamp, record.close));
    }

    //sort by timestamp to ensure chronological order
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let series = TimeSeries::new(points).context(format!("Invalid series in {:?}", path))?;
    tracing::debug!(path = ?path, points = series.len(), "loaded series");

    Ok(series)
}

fn matches_symbol(row_symbol: Option<&str>, wanted: Option<&str>) -> bool {
    match (row_symbol, wanted) {
        (_, None) => true,
        (Some(row), Some(wanted)) => row.eq_ignore_ascii_case(wanted),
        (None, Some(_)) => false,
    }
}
