pub mod account;
pub mod position;

pub use account::{Account, StepRecord};
pub use position::{Direction, Position};
