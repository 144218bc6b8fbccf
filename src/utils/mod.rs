//! Shared helpers.

pub mod text;

pub use text::{parse_price, rating_to_number};
