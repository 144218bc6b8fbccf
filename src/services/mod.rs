//! Boundary services around the pipeline core.
//!
//! - `intake`: channel-fed runner consuming the crawl frontier's output
//! - `query`: read contract for the export/report layer

pub mod intake;
pub mod query;

pub use intake::IntakeRunner;
pub use query::{Catalog, ChangeView, ListFilter, SortKey};
