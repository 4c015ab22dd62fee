use crate::chart::{check_finite, ChartError};
use serde::{Deserialize, Serialize};

//indices of local extrema, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingPoints {
    pub lows: Vec<usize>,
    pub highs: Vec<usize>,
}

impl SwingPoints {
    pub fn is_empty(&self) -> bool {
        self.lows.is_empty() && self.highs.is_empty()
    }
}

//detects swing lows and highs using `window` points on each side
//
//index i qualifies only when window <= i < len - window. within its neighborhood
//a low must be strictly below every earlier point and not above any later point,
//so on a flat extremal plateau only the first point is flagged. highs mirror this.
pub fn detect_swings(values: &[f64], window: usize) -> Result<SwingPoints, ChartError> {
    if window == 0 {
        return Err(ChartError::InvalidWindow(window));
    }
    check_finite(values)?;

    let mut swings = SwingPoints::default();
    if values.len() < 2 * window + 1 {
        return Ok(swings);
    }

    for i in window..values.len() - window {
        let value = values[i];
        let before = &values[i - window..i];
        let after = &values[i + 1..=i + window];

        if before.iter().all(|&v| v > value) && after.iter().all(|&v| v >= value) {
            swings.lows.push(i);
        }

        if before.iter().all(|&v| v < value) && after.iter().all(|&v| v <= value) {
            swings.highs.push(i);
        }
    }

    tracing::debug!(
        window,
        lows = swings.lows.len(),
        highs = swings.highs.len(),
        "detected swings"
    );

    Ok(swings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_extrema() {
        let values = [3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0];
        let swings = detect_swings(&values, 2).unwrap();
        assert_eq!(swings.lows, vec![2]);
        assert_eq!(swings.highs, vec![5]);
    }

    #[test]
    fn test_plateau_flags_first_point_only() {
        let values = [5.0, 4.0, 1.0, 1.0, 1.0, 4.0, 5.0];
        let swings = detect_swings(&values, 2).unwrap();
        assert_eq!(swings.lows, vec![2]);

        let values = [1.0, 2.0, 9.0, 9.0, 2.0, 1.0];
        let swings = detect_swings(&values, 1).unwrap();
        assert_eq!(swings.highs, vec![2]);
    }

    #[test]
    fn test_constant_series_has_no_swings() {
        let swings = detect_swings(&[2.0; 20], 3).unwrap();
        assert!(swings.is_empty());
    }

    #[test]
    fn test_short_series_is_empty_not_error() {
        let swings = detect_swings(&[1.0, 0.0, 1.0, 2.0], 2).unwrap();
        assert!(swings.is_empty());
    }

    #[test]
    fn test_edges_are_never_flagged() {
        //global minimum at index 0 and maximum at the end
        let values = [0.0, 5.0, 4.0, 6.0, 3.0, 7.0, 10.0];
        let swings = detect_swings(&values, 1).unwrap();
        assert!(!swings.lows.contains(&0));
        assert!(!swings.highs.contains(&6));
        assert_eq!(swings.lows, vec![2, 4]);
        assert_eq!(swings.highs, vec![1, 3]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            detect_swings(&[1.0, 2.0, 3.0], 0),
            Err(ChartError::InvalidWindow(0))
        );
        assert!(matches!(
            detect_swings(&[1.0, f64::INFINITY, 3.0], 1),
            Err(ChartError::NonFiniteValue { index: 1, .. })
        ));
    }
}
