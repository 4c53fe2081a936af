// Engine-side extensions of the shared data models.
pub mod series;

pub use series::{new_series, validate_series};
