//! Conversions from raw scraped strings to comparable numbers.

use std::sync::OnceLock;

use regex::Regex;

/// Numeric value embedded in a price string, e.g. `"£18.02"` → `18.02`.
///
/// Returns `None` when the string carries no parseable number.
pub fn parse_price(price: &str) -> Option<f64> {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRICE_RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("invalid price regex"));
    re.find(price)?.as_str().parse().ok()
}

/// Numeric form of a rating word: `"Two"` → `2.0`. Case-insensitive.
pub fn rating_to_number(rating: &str) -> Option<f64> {
    match rating.trim().to_lowercase().as_str() {
        "one" => Some(1.0),
        "two" => Some(2.0),
        "three" => Some(3.0),
        "four" => Some(4.0),
        "five" => Some(5.0),
        _ => None,
    }
}
