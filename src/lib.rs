pub mod filter;
pub mod generator;
pub mod places;
pub mod record;
pub mod settings;

pub use filter::{accepts, filter_batch, matches, parse_magnitude, FilterSpec};
pub use record::LeadRecord;
