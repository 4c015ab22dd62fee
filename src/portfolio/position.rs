use serde::{Deserialize, Serialize};

//direction of a held position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
    Flat,
}

impl Direction {
    //derives the direction from a forecast relative to the last observed value
    //a forecast equal to the last value stays flat
    pub fn from_forecast(prediction: f64, last: f64) -> Self {
        if prediction > last {
            Direction::Long
        } else if prediction < last {
            Direction::Short
        } else {
            Direction::Flat
        }
    }

    //converts to position sign (long = +1, short = -1, flat = 0)
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Flat => 0.0,
        }
    }
}

//a position held between two consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,

    //exposure multiplier, always positive
    pub size: f64,
}

impl Position {
    //creates a flat position
    pub fn flat() -> Self {
        Position {
            direction: Direction::Flat,
            size: 0.0,
        }
    }

    pub fn new(direction: Direction, size: f64) -> Self {
        match direction {
            Direction::Flat => Self::flat(),
            _ => Position { direction, size },
        }
    }

    //signed exposure (+size, -size or 0)
    pub fn signed(&self) -> f64 {
        self.direction.sign() * self.size
    }

    pub fn is_flat(&self) -> bool {
        self.direction == Direction::Flat
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == Direction::Short
    }

    //absolute change in signed exposure when moving from `previous` to this position
    pub fn turnover_from(&self, previous: &Position) -> f64 {
        (self.signed() - previous.signed()).abs()
    }

    //return earned holding this position over a move from `base` to `next`
    pub fn step_return(&self, base: f64, next: f64) -> f64 {
        if self.is_flat() {
            return 0.0;
        }
        self.signed() * (next / base - 1.0)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_forecast() {
        assert_eq!(Direction::from_forecast(2.0, 1.0), Direction::Long);
        assert_eq!(Direction::from_forecast(0.5, 1.0), Direction::Short);
        assert_eq!(Direction::from_forecast(1.0, 1.0), Direction::Flat);
    }

    #[test]
    fn test_turnover() {
        let long = Position::new(Direction::Long, 1.0);
        let short = Position::new(Direction::Short, 1.0);
        let flat = Position::flat();

        assert_eq!(short.turnover_from(&long), 2.0);
        assert_eq!(long.turnover_from(&flat), 1.0);
        assert_eq!(long.turnover_from(&long), 0.0);
        assert_eq!(Position::new(Direction::Long, 0.5).turnover_from(&flat), 0.5);
    }

    #[test]
    fn test_step_return_signs() {
        let long = Position::new(Direction::Long, 1.0);
        let short = Position::new(Direction::Short, 0.5);
        assert!((long.step_return(100.0, 110.0) - 0.1).abs() < 1e-12);
        assert!((short.step_return(100.0, 110.0) + 0.05).abs() < 1e-12);
        assert_eq!(Position::flat().step_return(100.0, 110.0), 0.0);
    }

    #[test]
    fn test_flat_ignores_size() {
        let position = Position::new(Direction::Flat, 3.0);
        assert_eq!(position.size, 0.0);
        assert_eq!(position.signed(), 0.0);
    }
}
