pub mod loader;
pub mod series;

pub use loader::load_csv;
pub use series::{SeriesError, SeriesPoint, TimeSeries};
