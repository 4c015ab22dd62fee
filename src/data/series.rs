use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Non-finite value {value} at index {index}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error("Timestamp at index {index} ({timestamp}) is not after the previous one")]
    NonMonotonicTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },
    #[error("Timestamp at index {index} is out of range")]
    TimestampOverflow { index: usize },
}

//a single observation of the series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        SeriesPoint { timestamp, value }
    }
}

//an ordered, validated (timestamp, value) series
//timestamps are strictly increasing and every value is finite
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    //builds a series from points, validating order and values
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, SeriesError> {
        let mut timestamps = Vec::with_capacity(points.len());
        let mut values = Vec::with_capacity(points.len());

        for (index, point) in points.into_iter().enumerate() {
            if !point.value.is_finite() {
                return Err(SeriesError::NonFiniteValue {
                    index,
                    value: point.value,
                });
            }

            if let Some(prev) = timestamps.last() {
                if point.timestamp <= *prev {
                    return Err(SeriesError::NonMonotonicTimestamp {
                        index,
                        timestamp: point.timestamp,
                    });
                }
            }

            timestamps.push(point.timestamp);
            values.push(point.value);
        }

        Ok(TimeSeries { timestamps, values })
    }

    //builds a series with evenly spaced timestamps starting at `start`
    pub fn from_values_with_start(
        values: &[f64],
        start: DateTime<Utc>,
        step: Duration,
    ) -> Result<Self, SeriesError> {
        let points = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                let timestamp = i32::try_from(index)
                    .ok()
                    .and_then(|i| step.checked_mul(i))
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or(SeriesError::TimestampOverflow { index })?;
                Ok(SeriesPoint::new(timestamp, value))
            })
            .collect::<Result<Vec<_>, SeriesError>>()?;
        Self::new(points)
    }

    //builds a daily series starting at the unix epoch
    pub fn from_values(values: &[f64]) -> Result<Self, SeriesError> {
        Self::from_values_with_start(values, DateTime::<Utc>::UNIX_EPOCH, Duration::days(1))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    //returns the point at index, if any
    pub fn get(&self, index: usize) -> Option<SeriesPoint> {
        Some(SeriesPoint::new(
            *self.timestamps.get(index)?,
            *self.values.get(index)?,
        ))
    }

    pub fn first(&self) -> Option<SeriesPoint> {
        self.get(0)
    }

    pub fn last(&self) -> Option<SeriesPoint> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    //returns the points as an owned vector
    pub fn to_points(&self) -> Vec<SeriesPoint> {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(&timestamp, &value)| SeriesPoint::new(timestamp, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_builds_daily_series() {
        let series = TimeSeries::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
        let ts = series.timestamps();
        assert_eq!(ts[1] - ts[0], Duration::days(1));
        assert_eq!(series.last().unwrap().value, 3.0);
    }

    #[test]
    fn test_rejects_nan() {
        let err = TimeSeries::from_values(&[1.0, f64::NAN, 3.0]).unwrap_err();
        assert!(matches!(err, SeriesError::NonFiniteValue { index: 1, .. }));
    }

    #[test]
    fn test_rejects_repeated_timestamp() {
        let t = DateTime::<Utc>::UNIX_EPOCH;
        let points = vec![SeriesPoint::new(t, 1.0), SeriesPoint::new(t, 2.0)];
        let err = TimeSeries::new(points).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::NonMonotonicTimestamp { index: 1, .. }
        ));
    }

    #[test]
    fn test_timestamp_overflow_is_an_error() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let far = Duration::days(1_000_000_000);
        let err = TimeSeries::from_values_with_start(&[1.0, 2.0], start, far).unwrap_err();
        assert_eq!(err, SeriesError::TimestampOverflow { index: 1 });

        let end = DateTime::<Utc>::MAX_UTC;
        let err = TimeSeries::from_values_with_start(&[1.0, 2.0], end, Duration::days(1)).unwrap_err();
        assert_eq!(err, SeriesError::TimestampOverflow { index: 1 });
    }

    #[test]
    fn test_empty_series() {
        let series = TimeSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.first().is_none());
        assert!(series.last().is_none());
    }
}
